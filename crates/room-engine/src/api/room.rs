//! The seam between the shared room controller and a concrete room.
//!
//! A room supplies its config and decides what clicks on its objects and
//! hotspots do. Everything else (patrol, dialogue rendering, overlay
//! layout, preferences) is handled by [`RoomController`](crate::room::RoomController).

use std::collections::BTreeMap;

use crate::api::command::{Outbox, UiCommand};
use crate::config::{ObjectHandler, ObjectSpec, RoomConfig, BGM_ELEMENT};
use crate::core::state::RoomState;
use crate::prefs::{PrefKey, PreferenceStore};
use crate::script::{ConfirmScript, LinearScript, PagedScript, Script, EXIT_LABEL};
use crate::systems::overlay::{HotspotStyle, HotspotVisual};

/// What a running dialogue sequence is for. Decides which flags are raised
/// while it runs and what is cleaned up when it ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptTag {
    /// Talking to the character; the patrol is paused for its duration.
    Conversation,
    Help,
    /// Started by clicking a room object (paged text, link confirmation).
    ObjectDialogue,
    /// Hotspot detail inside an open close-up.
    Detail,
    /// Room-defined sequence, identified by a room-chosen number.
    Special(u32),
}

impl ScriptTag {
    /// Sequences that belong to the close-up and end with it.
    pub fn is_overlay_bound(self) -> bool {
        matches!(self, ScriptTag::Detail | ScriptTag::Special(_))
    }
}

/// What the controller should do in response to a room hook.
pub enum Reaction {
    None,
    Start {
        tag: ScriptTag,
        script: Box<dyn Script>,
    },
    OpenViewer {
        closeup: String,
        hotspots: Vec<ObjectSpec>,
    },
}

impl Reaction {
    pub fn start(tag: ScriptTag, script: impl Script + 'static) -> Self {
        Reaction::Start {
            tag,
            script: Box::new(script),
        }
    }
}

/// Mutable view of the shared room state handed to rooms and scripts.
pub struct RoomContext<'a> {
    pub state: &'a mut RoomState,
    prefs: &'a mut PreferenceStore,
    out: &'a mut Outbox,
    audio: &'a BTreeMap<String, String>,
}

impl<'a> RoomContext<'a> {
    pub fn new(
        state: &'a mut RoomState,
        prefs: &'a mut PreferenceStore,
        out: &'a mut Outbox,
        audio: &'a BTreeMap<String, String>,
    ) -> Self {
        Self {
            state,
            prefs,
            out,
            audio,
        }
    }

    pub fn push(&mut self, command: UiCommand) {
        self.out.push(command);
    }

    /// Record the visitor's answer to "want some music?".
    pub fn handle_music_choice(&mut self, wants_music: bool) {
        self.state.has_ever_interacted = true;
        self.state.has_met_character = true;
        self.prefs.save_flag(PrefKey::HasEverInteracted, true);
        self.prefs.save_flag(PrefKey::HasMetCharacter, true);

        self.set_bgm_muted(!wants_music);
        if wants_music {
            self.start_bgm();
            log::info!("BGM started after user chose to enable music");
        } else {
            log::info!("User chose to keep music muted");
        }
    }

    /// Flip the background music mute flag from the volume control.
    pub fn toggle_bgm(&mut self) {
        let muted = !self.state.bgm_muted;
        self.state.has_ever_interacted = true;
        self.prefs.save_flag(PrefKey::HasEverInteracted, true);
        self.set_bgm_muted(muted);
        if !muted && !self.state.bgm_started {
            self.start_bgm();
        }
    }

    /// Apply and persist the mute flag, and update the volume icon.
    pub fn set_bgm_muted(&mut self, muted: bool) {
        self.state.bgm_muted = muted;
        self.prefs.save_flag(PrefKey::BgmMuted, muted);
        self.out.push(UiCommand::SetMuted {
            element: BGM_ELEMENT.to_string(),
            muted,
        });
        self.out.push(UiCommand::SetVolumeIcon { muted });
    }

    pub fn start_bgm(&mut self) {
        self.out.push(UiCommand::ResumeAudio {
            element: BGM_ELEMENT.to_string(),
        });
        self.state.bgm_started = true;
    }

    pub fn set_character_sprite(&mut self, src: &str) {
        if self.state.character_sprite == src {
            return;
        }
        self.state.character_sprite = src.to_string();
        self.out.push(UiCommand::SetCharacterSprite(src.to_string()));
    }

    pub fn open_external(&mut self, url: &str) {
        self.out.push(UiCommand::OpenExternal(url.to_string()));
    }

    /// Rewind and play a room sound by its config key.
    pub fn play_sound(&mut self, key: &str) {
        match self.audio.get(key) {
            Some(element) => self.out.push(UiCommand::PlayAudio {
                element: element.clone(),
            }),
            None => log::debug!("no audio element for key `{key}`"),
        }
    }

    pub fn stop_sound(&mut self, key: &str) {
        if let Some(element) = self.audio.get(key) {
            self.out.push(UiCommand::StopAudio {
                element: element.clone(),
            });
        }
    }

    /// Whether `element` is the audio element behind `key`.
    pub fn is_sound(&self, key: &str, element: &str) -> bool {
        self.audio.get(key).is_some_and(|e| e == element)
    }

    pub fn set_hotspot_image(&mut self, index: usize, src: impl Into<String>) {
        self.out.push(UiCommand::SetHotspotImage {
            index,
            src: src.into(),
        });
    }
}

/// Room-specific behaviour. Every hook has a default that matches a plain
/// room; a room overrides only what it does differently.
pub trait RoomScript {
    fn config(&self) -> &RoomConfig;

    /// The sequence played when the character is clicked.
    fn conversation(&mut self) -> Box<dyn Script> {
        Box::new(LinearScript::conversation(self.config(), EXIT_LABEL))
    }

    /// A room object was clicked. Defaults to the config's object handler.
    fn on_object(&mut self, id: &str, _ctx: &mut RoomContext<'_>) -> Reaction {
        match self.config().object_handlers.get(id) {
            Some(ObjectHandler::Viewer { closeup, hotspots }) => Reaction::OpenViewer {
                closeup: closeup.clone(),
                hotspots: hotspots.clone(),
            },
            Some(ObjectHandler::Pages { title, pages }) => Reaction::start(
                ScriptTag::ObjectDialogue,
                PagedScript::new(title.clone(), pages.clone()),
            ),
            Some(ObjectHandler::Confirm { prompt, url }) => Reaction::start(
                ScriptTag::ObjectDialogue,
                ConfirmScript::new(prompt.clone(), url.clone()),
            ),
            None => {
                log::debug!("no handler for object `{id}`");
                Reaction::None
            }
        }
    }

    /// Blocks character, object and help clicks while true.
    fn is_any_special_interaction(&self) -> bool {
        false
    }

    /// Blocks closing the close-up from its backdrop while true.
    fn is_special_overlay_interaction(&self) -> bool {
        false
    }

    fn hotspot_visual(&self, spec: &ObjectSpec) -> HotspotVisual {
        HotspotVisual {
            src: format!("{}/{}", self.config().hotspot_dir(), spec.file),
            style: HotspotStyle::Jiggle,
        }
    }

    /// A hotspot in the open close-up was clicked. Defaults to paging
    /// through its text.
    fn on_hotspot(
        &mut self,
        _index: usize,
        spec: &ObjectSpec,
        _ctx: &mut RoomContext<'_>,
    ) -> Reaction {
        Reaction::start(ScriptTag::Detail, PagedScript::for_object(spec))
    }

    fn on_audio_ended(&mut self, _element: &str, _ctx: &mut RoomContext<'_>) -> Reaction {
        Reaction::None
    }

    fn on_script_finished(&mut self, _tag: ScriptTag, _ctx: &mut RoomContext<'_>) {}

    fn on_script_cancelled(&mut self, _tag: ScriptTag, _ctx: &mut RoomContext<'_>) {}

    /// Runs after the close-up has been torn down.
    fn on_overlay_close(&mut self, _ctx: &mut RoomContext<'_>) {}
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::config::tests::MINIMAL;
    use crate::prefs::{MemoryBackend, Preferences};

    /// Owns everything a [`RoomContext`] borrows.
    pub(crate) struct Harness {
        pub state: RoomState,
        pub prefs: PreferenceStore,
        pub audio: BTreeMap<String, String>,
    }

    impl Harness {
        pub fn new() -> Self {
            let config = RoomConfig::from_json(MINIMAL).unwrap();
            let prefs = PreferenceStore::new(Box::new(MemoryBackend::default()));
            Self {
                state: RoomState::new(prefs.load_all()),
                prefs,
                audio: config.audio_map(),
            }
        }

        pub fn context<'a>(&'a mut self, out: &'a mut Outbox) -> RoomContext<'a> {
            RoomContext::new(&mut self.state, &mut self.prefs, out, &self.audio)
        }
    }

    struct Plain(RoomConfig);

    impl RoomScript for Plain {
        fn config(&self) -> &RoomConfig {
            &self.0
        }
    }

    #[test]
    fn music_yes_unmutes_and_persists() {
        let mut h = Harness::new();
        let mut out = Outbox::new();
        h.context(&mut out).handle_music_choice(true);
        assert!(!h.state.bgm_muted);
        assert!(h.state.bgm_started);
        assert!(h.state.has_met_character);
        assert_eq!(
            h.prefs.load_all(),
            Preferences {
                bgm_muted: false,
                has_ever_interacted: true,
                has_met_character: true,
            }
        );
        assert!(out.iter().any(|c| *c
            == UiCommand::ResumeAudio {
                element: "bgm".into()
            }));
    }

    #[test]
    fn music_no_stays_muted_without_playing() {
        let mut h = Harness::new();
        let mut out = Outbox::new();
        h.context(&mut out).handle_music_choice(false);
        assert!(h.state.bgm_muted);
        assert!(!h.state.bgm_started);
        assert!(h.prefs.load_flag(PrefKey::HasMetCharacter));
        assert!(!out
            .iter()
            .any(|c| matches!(c, UiCommand::ResumeAudio { .. })));
        assert!(out.iter().any(|c| *c == UiCommand::SetVolumeIcon { muted: true }));
    }

    #[test]
    fn toggle_starts_bgm_only_once() {
        let mut h = Harness::new();
        let mut out = Outbox::new();
        {
            let mut ctx = h.context(&mut out);
            ctx.toggle_bgm(); // unmute
            ctx.toggle_bgm(); // mute
            ctx.toggle_bgm(); // unmute again
        }
        let plays = out
            .iter()
            .filter(|c| matches!(c, UiCommand::ResumeAudio { .. }))
            .count();
        assert_eq!(plays, 1);
        assert!(!h.state.bgm_muted);
        assert!(h.prefs.load_flag(PrefKey::HasEverInteracted));
    }

    #[test]
    fn sprite_change_is_skipped_when_unchanged() {
        let mut h = Harness::new();
        let mut out = Outbox::new();
        {
            let mut ctx = h.context(&mut out);
            ctx.set_character_sprite("a.webp");
            ctx.set_character_sprite("a.webp");
        }
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn default_object_hook_reads_config_handlers() {
        let mut room = Plain(RoomConfig::from_json(MINIMAL).unwrap());
        let mut h = Harness::new();
        let mut out = Outbox::new();
        let mut ctx = h.context(&mut out);
        match room.on_object("drawer", &mut ctx) {
            Reaction::OpenViewer { closeup, hotspots } => {
                assert!(closeup.ends_with("drawerclose.webp"));
                assert_eq!(hotspots.len(), 1);
            }
            _ => panic!("drawer should open a viewer"),
        }
        assert!(matches!(room.on_object("bookshelf", &mut ctx), Reaction::None));
    }

    #[test]
    fn default_hotspot_path_uses_room_directory() {
        let room = Plain(RoomConfig::from_json(MINIMAL).unwrap());
        let spec = ObjectSpec {
            name: "Paper".into(),
            file: "paper.webp".into(),
            x: 0.0,
            y: 0.0,
            w: 1.0,
            h: 1.0,
            pages: Vec::new(),
            kind: None,
        };
        let visual = room.hotspot_visual(&spec);
        assert_eq!(visual.src, "sprites/objects/classroomobjects/paper.webp");
        assert_eq!(visual.style, HotspotStyle::Jiggle);
    }
}
