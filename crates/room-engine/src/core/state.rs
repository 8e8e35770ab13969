use crate::prefs::Preferences;

/// Mutable per-room runtime state shared by every room.
///
/// Room-specific flags live in the room type itself; patrol, overlay and
/// voice-audio state are owned by their subsystems.
#[derive(Debug, Clone, PartialEq)]
pub struct RoomState {
    /// A character conversation is running.
    pub character_interacting: bool,
    pub help_dialogue_open: bool,
    pub bgm_muted: bool,
    pub bgm_started: bool,
    pub has_ever_interacted: bool,
    pub has_met_character: bool,
    /// Critical images are in; the room is visible.
    pub assets_loaded: bool,
    /// Sprite currently assigned to the character element.
    pub character_sprite: String,
}

impl RoomState {
    pub fn new(prefs: Preferences) -> Self {
        Self {
            character_interacting: false,
            help_dialogue_open: false,
            bgm_muted: prefs.bgm_muted,
            bgm_started: false,
            has_ever_interacted: prefs.has_ever_interacted,
            has_met_character: prefs.has_met_character,
            assets_loaded: false,
            character_sprite: String::new(),
        }
    }
}
