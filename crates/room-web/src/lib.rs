pub mod dom;
pub mod runner;
pub mod storage;

pub use runner::RoomRunner;

/// Generate the `#[wasm_bindgen]` entry points for a room type.
///
/// Generates:
/// - `thread_local!` storage for the [`RoomRunner`]
/// - the animation-frame hook that re-enters it
/// - `room_start(name)` and `room_teardown()` exports
///
/// # Usage
///
/// ```ignore
/// use wasm_bindgen::prelude::*;
///
/// mod rooms;
/// use rooms::MyRooms;
///
/// room_web::export_room!(MyRooms, "my-site");
/// ```
///
/// `$room_type` must implement `room_engine::RoomScript` and provide
/// `fn load(name: &str) -> Result<Self, room_engine::ConfigError>`.
/// The calling crate depends on `log`, `console_log` and
/// `console_error_panic_hook`.
#[macro_export]
macro_rules! export_room {
    ($room_type:ty, $room_name:literal) => {
        use std::cell::RefCell;

        thread_local! {
            static RUNNER: RefCell<Option<$crate::RoomRunner<$room_type>>> = RefCell::new(None);
        }

        /// `None` when no room is running or the runner is already borrowed.
        fn with_runner<R>(f: impl FnOnce(&mut $crate::RoomRunner<$room_type>) -> R) -> Option<R> {
            RUNNER.with(|cell| {
                let mut borrow = cell.try_borrow_mut().ok()?;
                borrow.as_mut().map(f)
            })
        }

        fn frame(timestamp: f64) {
            if with_runner(|r| r.frame(timestamp)).is_none() {
                log::debug!("{}: frame skipped, no runner", $room_name);
            }
        }

        #[wasm_bindgen]
        pub fn room_start(name: &str) -> Result<(), JsValue> {
            console_error_panic_hook::set_once();
            let _ = console_log::init_with_level(log::Level::Info);

            let room = <$room_type>::load(name)
                .map_err(|e| JsValue::from_str(&e.to_string()))?;
            let runner = $crate::RoomRunner::start(room, frame)?;

            RUNNER.with(|cell| {
                if let Some(mut previous) = cell.borrow_mut().replace(runner) {
                    previous.teardown();
                }
            });
            log::info!("{}: room '{}' started", $room_name, name);
            Ok(())
        }

        #[wasm_bindgen]
        pub fn room_teardown() {
            RUNNER.with(|cell| {
                if let Some(mut runner) = cell.borrow_mut().take() {
                    runner.teardown();
                }
            });
        }
    };
}
