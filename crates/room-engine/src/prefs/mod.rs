//! Persisted visitor preferences.
//!
//! A handful of boolean flags, stored JSON-encoded under namespaced keys.
//! Read and write failures are logged and the default is used instead;
//! nothing here is ever fatal.

use std::collections::HashMap;

use thiserror::Error;

/// Prefix applied to every stored key.
pub const NAMESPACE: &str = "pixelPortfolio_";

#[derive(Debug, Error)]
pub enum PrefError {
    #[error("preference storage unavailable: {0}")]
    Unavailable(String),
    #[error("preference storage rejected write: {0}")]
    Rejected(String),
    #[error("stored value for `{key}` is not a JSON boolean: {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Raw string key-value storage (browser `localStorage`, or memory in tests).
pub trait PreferenceBackend {
    fn get_item(&self, key: &str) -> Result<Option<String>, PrefError>;
    fn set_item(&mut self, key: &str, value: &str) -> Result<(), PrefError>;
}

/// The flags the rooms persist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrefKey {
    BgmMuted,
    HasEverInteracted,
    HasMetCharacter,
}

impl PrefKey {
    pub fn name(self) -> &'static str {
        match self {
            PrefKey::BgmMuted => "bgmMuted",
            PrefKey::HasEverInteracted => "hasEverInteracted",
            PrefKey::HasMetCharacter => "hasMetCharacter",
        }
    }

    /// First-time visitors start muted and have met no one.
    pub fn default_value(self) -> bool {
        match self {
            PrefKey::BgmMuted => true,
            PrefKey::HasEverInteracted | PrefKey::HasMetCharacter => false,
        }
    }

    pub fn storage_key(self) -> String {
        format!("{NAMESPACE}{}", self.name())
    }
}

/// Snapshot of every flag, read at room construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Preferences {
    pub bgm_muted: bool,
    pub has_ever_interacted: bool,
    pub has_met_character: bool,
}

pub struct PreferenceStore {
    backend: Box<dyn PreferenceBackend>,
}

impl PreferenceStore {
    pub fn new(backend: Box<dyn PreferenceBackend>) -> Self {
        Self { backend }
    }

    /// In-memory store, used when no persistent storage is reachable.
    pub fn in_memory() -> Self {
        Self::new(Box::new(MemoryBackend::default()))
    }

    pub fn load_flag(&self, key: PrefKey) -> bool {
        match self.try_load(key) {
            Ok(Some(value)) => value,
            Ok(None) => key.default_value(),
            Err(e) => {
                log::warn!("Could not load preference {}: {e}", key.name());
                key.default_value()
            }
        }
    }

    fn try_load(&self, key: PrefKey) -> Result<Option<bool>, PrefError> {
        let storage_key = key.storage_key();
        match self.backend.get_item(&storage_key)? {
            None => Ok(None),
            Some(raw) => serde_json::from_str::<bool>(&raw)
                .map(Some)
                .map_err(|source| PrefError::Corrupt {
                    key: storage_key,
                    source,
                }),
        }
    }

    pub fn save_flag(&mut self, key: PrefKey, value: bool) {
        let raw = if value { "true" } else { "false" };
        if let Err(e) = self.backend.set_item(&key.storage_key(), raw) {
            log::warn!("Could not save preference {}: {e}", key.name());
        }
    }

    pub fn load_all(&self) -> Preferences {
        Preferences {
            bgm_muted: self.load_flag(PrefKey::BgmMuted),
            has_ever_interacted: self.load_flag(PrefKey::HasEverInteracted),
            has_met_character: self.load_flag(PrefKey::HasMetCharacter),
        }
    }
}

/// HashMap-backed storage. Can be told to fail, to exercise the fallbacks.
#[derive(Debug, Default, Clone)]
pub struct MemoryBackend {
    items: HashMap<String, String>,
    pub fail_reads: bool,
    pub fail_writes: bool,
}

impl MemoryBackend {
    pub fn with_item(mut self, key: &str, value: &str) -> Self {
        self.items.insert(key.to_string(), value.to_string());
        self
    }

    pub fn item(&self, key: &str) -> Option<&str> {
        self.items.get(key).map(String::as_str)
    }
}

impl PreferenceBackend for MemoryBackend {
    fn get_item(&self, key: &str) -> Result<Option<String>, PrefError> {
        if self.fail_reads {
            return Err(PrefError::Unavailable("reads disabled".into()));
        }
        Ok(self.items.get(key).cloned())
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), PrefError> {
        if self.fail_writes {
            return Err(PrefError::Rejected("writes disabled".into()));
        }
        self.items.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Shares its map with the test so writes can be inspected.
    struct SharedBackend(Rc<RefCell<MemoryBackend>>);

    impl PreferenceBackend for SharedBackend {
        fn get_item(&self, key: &str) -> Result<Option<String>, PrefError> {
            self.0.borrow().get_item(key)
        }
        fn set_item(&mut self, key: &str, value: &str) -> Result<(), PrefError> {
            self.0.borrow_mut().set_item(key, value)
        }
    }

    #[test]
    fn missing_mute_flag_defaults_to_muted() {
        let store = PreferenceStore::in_memory();
        assert!(store.load_flag(PrefKey::BgmMuted));
        assert!(!store.load_flag(PrefKey::HasMetCharacter));
    }

    #[test]
    fn stored_values_are_json_and_namespaced() {
        let shared = Rc::new(RefCell::new(MemoryBackend::default()));
        let mut store = PreferenceStore::new(Box::new(SharedBackend(shared.clone())));
        store.save_flag(PrefKey::BgmMuted, false);
        assert_eq!(shared.borrow().item("pixelPortfolio_bgmMuted"), Some("false"));
        assert!(!store.load_flag(PrefKey::BgmMuted));
    }

    #[test]
    fn corrupt_value_falls_back_to_default() {
        let backend = MemoryBackend::default().with_item("pixelPortfolio_hasEverInteracted", "{oops");
        let store = PreferenceStore::new(Box::new(backend));
        assert!(!store.load_flag(PrefKey::HasEverInteracted));
    }

    #[test]
    fn read_failure_falls_back_to_default() {
        let backend = MemoryBackend {
            fail_reads: true,
            ..MemoryBackend::default().with_item("pixelPortfolio_bgmMuted", "false")
        };
        let store = PreferenceStore::new(Box::new(backend));
        assert!(store.load_flag(PrefKey::BgmMuted));
    }

    #[test]
    fn write_failure_is_swallowed() {
        let backend = MemoryBackend {
            fail_writes: true,
            ..MemoryBackend::default()
        };
        let mut store = PreferenceStore::new(Box::new(backend));
        store.save_flag(PrefKey::HasMetCharacter, true);
        assert!(!store.load_flag(PrefKey::HasMetCharacter));
    }
}
