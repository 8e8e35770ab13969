use crate::api::types::{Facing, PromptId};
use crate::systems::overlay::{HotspotRect, HotspotStyle};

/// A presentation change requested by the engine.
/// The web bridge applies these to the DOM in order; the engine never
/// touches the page itself.
#[derive(Debug, Clone, PartialEq)]
pub enum UiCommand {
    // ---- Room view ----
    SetViewOpacity(f32),
    /// Start loading images; the bridge reports each load/error back.
    Preload(Vec<String>),
    /// Apply or remove the blur+darken de-emphasis on elements by id.
    SetBlur { ids: Vec<String>, blurred: bool },

    // ---- Character ----
    SetCharacterSprite(String),
    SetCharacterOpacity(f32),
    /// Wrap the character in its absolutely positioned, clickable container.
    WrapCharacter { padding: String, z_index: String },
    PlaceCharacter { left: f32, bottom: f32, facing: Facing },
    /// Move the container without touching the sprite's facing.
    PlaceContainer { left: f32, bottom: f32 },
    SetCharacterHover(bool),

    // ---- Dialogue box ----
    ShowDialogue { html: String },
    HideDialogue,
    ClearButtons,
    AddButton { prompt: PromptId, index: usize, label: String },

    // ---- Audio ----
    ConfigureAudio { element: String, volume: f32, looping: bool },
    /// Rewind to zero and play.
    PlayAudio { element: String },
    /// Play from the current position (background music).
    ResumeAudio { element: String },
    /// Pause and rewind to zero.
    StopAudio { element: String },
    SetMuted { element: String, muted: bool },
    SetVolumeIcon { muted: bool },

    // ---- Close-up overlay ----
    OpenOverlay { closeup: String },
    LayoutOverlay { width: f32, height: f32 },
    AddHotspot {
        index: usize,
        src: String,
        rect: HotspotRect,
        style: HotspotStyle,
        /// Position among the wrapper's images, used to stagger the idle animation.
        stagger: usize,
    },
    PlaceHotspot { index: usize, rect: HotspotRect },
    SetHotspotImage { index: usize, src: String },
    SetHotspotHover { index: usize, hovered: bool },
    RestartHotspotAnimation { index: usize },
    CloseOverlay,

    // ---- Navigation ----
    Navigate(String),
    OpenExternal(String),
}

/// Ordered list of commands produced during a tick.
#[derive(Debug, Default)]
pub struct Outbox {
    commands: Vec<UiCommand>,
}

impl Outbox {
    pub fn new() -> Self {
        Self {
            commands: Vec::with_capacity(32),
        }
    }

    pub fn push(&mut self, command: UiCommand) {
        self.commands.push(command);
    }

    /// Take every pending command, leaving the outbox empty.
    pub fn drain(&mut self) -> Vec<UiCommand> {
        std::mem::take(&mut self.commands)
    }

    pub fn iter(&self) -> impl Iterator<Item = &UiCommand> {
        self.commands.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }
}
