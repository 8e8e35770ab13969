use room_engine::{PrefError, PreferenceBackend, PreferenceStore};
use wasm_bindgen::JsValue;
use web_sys::Storage;

/// `window.localStorage` as a preference backend.
pub struct LocalStorageBackend {
    storage: Storage,
}

impl LocalStorageBackend {
    /// `None` when storage is disabled (private mode, sandboxed iframe...).
    pub fn open() -> Option<Self> {
        let window = web_sys::window()?;
        match window.local_storage() {
            Ok(Some(storage)) => Some(Self { storage }),
            Ok(None) => None,
            Err(e) => {
                log::warn!("localStorage unavailable: {}", describe(&e));
                None
            }
        }
    }
}

impl PreferenceBackend for LocalStorageBackend {
    fn get_item(&self, key: &str) -> Result<Option<String>, PrefError> {
        self.storage
            .get_item(key)
            .map_err(|e| PrefError::Unavailable(describe(&e)))
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), PrefError> {
        self.storage
            .set_item(key, value)
            .map_err(|e| PrefError::Rejected(describe(&e)))
    }
}

/// Persistent store if the browser allows it, in-memory otherwise.
pub fn open_preferences() -> PreferenceStore {
    match LocalStorageBackend::open() {
        Some(backend) => PreferenceStore::new(Box::new(backend)),
        None => {
            log::warn!("Could not open preference storage, using defaults");
            PreferenceStore::in_memory()
        }
    }
}

pub(crate) fn describe(value: &JsValue) -> String {
    value
        .as_string()
        .unwrap_or_else(|| format!("{value:?}"))
}
