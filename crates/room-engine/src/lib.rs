pub mod api;
pub mod assets;
pub mod config;
pub mod core;
pub mod input;
pub mod prefs;
pub mod room;
pub mod script;
pub mod systems;

// Re-export key types at crate root for convenience
pub use api::command::{Outbox, UiCommand};
pub use api::room::{Reaction, RoomContext, RoomScript, ScriptTag};
pub use api::types::{ClickTarget, Control, Facing, Placement, PromptId, Viewport};
pub use assets::preload::{css_background_url, Preloader};
pub use config::{ConfigError, ObjectHandler, ObjectSpec, RoomConfig, Timing};
pub use core::state::RoomState;
pub use core::time::{ClickFilter, Scheduler, TimerKind};
pub use input::queue::{InputQueue, RoomInput};
pub use prefs::{MemoryBackend, PrefError, PrefKey, PreferenceBackend, PreferenceStore, Preferences};
pub use room::RoomController;
pub use script::{ConfirmScript, LinearScript, PagedScript, Prompt, Script, Step};
pub use systems::dialogue::{Answer, DialogueEngine, DialogueState};
pub use systems::overlay::{HotspotRect, HotspotStyle, HotspotVisual, ObjectViewer, OVERLAY_ROOT_ID};
pub use systems::patrol::{Patrol, PatrolBounds};
