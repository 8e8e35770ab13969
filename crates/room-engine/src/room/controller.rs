//! Room controller.
//!
//! Owns every subsystem of one room page and wires them together. The
//! bridge pushes [`RoomInput`]s, calls [`RoomController::tick`] once per
//! animation frame and applies whatever [`UiCommand`]s come out.
//!
//! Lifecycle: hide the view, preload critical images (bounded by a
//! timeout), reveal the view, set up audio, then after a short settle delay
//! place the character and start the patrol.

use std::collections::BTreeMap;

use glam::Vec2;

use crate::api::command::{Outbox, UiCommand};
use crate::api::room::{Reaction, RoomContext, RoomScript, ScriptTag};
use crate::api::types::{ClickTarget, Control, PromptId, Viewport};
use crate::assets::preload::{critical_images, Preloader};
use crate::config::{ObjectSpec, Timing, BGM_ELEMENT, BGM_VOLUME};
use crate::core::state::RoomState;
use crate::core::time::{ClickFilter, Scheduler, TimerKind};
use crate::input::queue::{InputQueue, RoomInput};
use crate::prefs::PreferenceStore;
use crate::script::{LinearScript, Prompt, Script, Step};
use crate::systems::dialogue::{Answer, DialogueEngine};
use crate::systems::overlay::{HotspotStyle, ObjectViewer};
use crate::systems::patrol::Patrol;

/// Label of the help dialogue's only button.
pub const HELP_BUTTON: &str = "Got it!";

/// State handed to room hooks and scripts through [`RoomContext`].
struct Shared {
    state: RoomState,
    prefs: PreferenceStore,
    out: Outbox,
    /// Audio key → element id, voice lines and room sounds together.
    audio: BTreeMap<String, String>,
}

impl Shared {
    fn ctx(&mut self) -> RoomContext<'_> {
        RoomContext::new(&mut self.state, &mut self.prefs, &mut self.out, &self.audio)
    }
}

struct ActiveScript {
    tag: ScriptTag,
    script: Box<dyn Script>,
    /// Prompt currently on screen, if the script has shown one.
    prompt: Option<PromptId>,
}

pub struct RoomController<R: RoomScript> {
    room: R,
    shared: Shared,
    timing: Timing,
    patrol: Patrol,
    dialogue: DialogueEngine,
    viewer: ObjectViewer,
    preloader: Preloader,
    scheduler: Scheduler,
    clicks: ClickFilter,
    input: InputQueue,
    viewport: Viewport,
    active: Option<ActiveScript>,
    /// Character placed and clickable.
    character_ready: bool,
    torn_down: bool,
}

impl<R: RoomScript> RoomController<R> {
    pub fn new(room: R, prefs: PreferenceStore, viewport: Viewport) -> Self {
        let config = room.config();
        let audio = config.audio_map();
        let timing = config.timing;
        let patrol = Patrol::new(config.patrol);
        let state = RoomState::new(prefs.load_all());

        Self {
            dialogue: DialogueEngine::new(audio.clone()),
            shared: Shared {
                state,
                prefs,
                out: Outbox::new(),
                audio,
            },
            timing,
            patrol,
            viewer: ObjectViewer::new(),
            preloader: Preloader::new(),
            scheduler: Scheduler::new(),
            clicks: ClickFilter::new(timing.double_click_ms),
            input: InputQueue::new(),
            viewport,
            active: None,
            character_ready: false,
            torn_down: false,
            room,
        }
    }

    // ---- Accessors ----

    pub fn room(&self) -> &R {
        &self.room
    }

    pub fn state(&self) -> &RoomState {
        &self.shared.state
    }

    pub fn patrol(&self) -> &Patrol {
        &self.patrol
    }

    pub fn dialogue(&self) -> &DialogueEngine {
        &self.dialogue
    }

    pub fn viewer(&self) -> &ObjectViewer {
        &self.viewer
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// Tag of the dialogue sequence currently running.
    pub fn active_script(&self) -> Option<ScriptTag> {
        self.active.as_ref().map(|a| a.tag)
    }

    pub fn is_character_ready(&self) -> bool {
        self.character_ready
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    // ---- Driving ----

    /// Hide the room and start preloading. `discovered` lists the extra
    /// images the page declares (scene image, view background).
    pub fn init(&mut self, discovered: &[String]) {
        let config = self.room.config();
        let static_sprite = config.static_sprite.clone();
        let images = critical_images(config, discovered);

        self.shared.out.push(UiCommand::SetViewOpacity(0.0));
        self.shared.ctx().set_character_sprite(&static_sprite);
        self.shared.out.push(UiCommand::SetCharacterOpacity(0.0));

        if self.preloader.begin(images, &mut self.shared.out) {
            self.on_assets_ready();
        } else {
            self.scheduler
                .schedule(TimerKind::PreloadTimeout, self.timing.preload_timeout_ms);
        }
    }

    pub fn push_input(&mut self, event: RoomInput) {
        self.input.push(event);
    }

    /// Latest measured view size. Used for patrol bounds every frame.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    /// One frame: handle queued input, fire due timers, walk the patrol.
    pub fn tick(&mut self, dt: f32) {
        if self.torn_down {
            return;
        }
        self.scheduler.advance(dt);

        for event in self.input.drain() {
            if self.torn_down {
                return;
            }
            self.handle_input(event);
        }
        for timer in self.scheduler.drain_due() {
            if self.torn_down {
                return;
            }
            self.fire(timer);
        }

        if self.character_ready {
            if let Some(p) = self.patrol.update_position(dt, &self.viewport) {
                self.shared.out.push(UiCommand::PlaceCharacter {
                    left: p.left,
                    bottom: p.bottom,
                    facing: p.facing,
                });
            }
        }
    }

    pub fn drain_commands(&mut self) -> Vec<UiCommand> {
        self.shared.out.drain()
    }

    /// Stop everything the room has running. Idempotent.
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.patrol.stop();
        self.cancel_active();
        self.close_overlay();
        self.dialogue.stop_current_audio(&mut self.shared.out);
        self.scheduler.clear();
        self.input.drain();
        self.torn_down = true;
        log::info!("{}: torn down", self.room.config().room_name);
    }

    // ---- Input ----

    fn handle_input(&mut self, event: RoomInput) {
        match event {
            RoomInput::Click { target, at_ms } => self.handle_click(target, at_ms),
            RoomInput::CharacterHover(hovered) => self.character_hover(hovered),
            RoomInput::HotspotHover { index, hovered } => self.hotspot_hover(index, hovered),
            RoomInput::AssetSettled => {
                if self.preloader.settle() {
                    self.on_assets_ready();
                }
            }
            RoomInput::Resize(viewport) => self.resize(viewport),
            RoomInput::CloseupLoaded { width, height } => {
                let room = &self.room;
                self.viewer.image_loaded(
                    Vec2::new(width, height),
                    &self.viewport,
                    |spec| room.hotspot_visual(spec),
                    &mut self.shared.out,
                );
            }
            RoomInput::CloseupFailed => {
                log::error!("Failed to load close-up image");
            }
            RoomInput::AudioEnded { element } => {
                let reaction = self.room.on_audio_ended(&element, &mut self.shared.ctx());
                self.apply(reaction);
            }
        }
    }

    fn handle_click(&mut self, target: ClickTarget, at_ms: f64) {
        if !self.shared.state.assets_loaded {
            log::debug!("click on {target:?} before the room is ready");
            return;
        }
        if !self.clicks.accept(&target, at_ms) {
            return;
        }
        match target {
            ClickTarget::Character => self.click_character(),
            ClickTarget::Object(id) => self.click_object(&id),
            ClickTarget::Control(control) => self.click_control(control),
            ClickTarget::Backdrop => self.click_backdrop(),
            ClickTarget::Hotspot(index) => self.click_hotspot(index),
            ClickTarget::DialogueButton { prompt, index } => self.click_button(prompt, index),
        }
    }

    /// Character, object and help clicks are ignored while this holds.
    fn interaction_blocked(&self) -> bool {
        let state = &self.shared.state;
        state.character_interacting
            || state.help_dialogue_open
            || self.active.is_some()
            || self.room.is_any_special_interaction()
    }

    fn click_character(&mut self) {
        if !self.character_ready || self.interaction_blocked() {
            return;
        }
        let script = self.room.conversation();
        self.start_script(ScriptTag::Conversation, script);
    }

    fn click_object(&mut self, id: &str) {
        if self.interaction_blocked() {
            return;
        }
        let reaction = self.room.on_object(id, &mut self.shared.ctx());
        self.apply(reaction);
    }

    fn click_control(&mut self, control: Control) {
        match control {
            Control::Help => {
                if self.interaction_blocked() {
                    return;
                }
                let help = self.room.config().help_message.clone();
                self.start_script(
                    ScriptTag::Help,
                    Box::new(LinearScript::message(help, HELP_BUTTON)),
                );
            }
            Control::Volume => self.shared.ctx().toggle_bgm(),
            Control::Left => {
                let url = self.room.config().navigation.left.clone();
                self.navigate(url);
            }
            Control::Right => {
                let url = self.room.config().navigation.right.clone();
                self.navigate(url);
            }
        }
    }

    fn click_backdrop(&mut self) {
        if !self.viewer.is_open() {
            return;
        }
        if self.dialogue.is_visible() || self.room.is_special_overlay_interaction() {
            log::debug!("backdrop click ignored while the close-up is busy");
            return;
        }
        self.close_overlay();
    }

    fn click_hotspot(&mut self, index: usize) {
        let Some(spec) = self.viewer.hotspot(index).cloned() else {
            return;
        };
        let reaction = self.room.on_hotspot(index, &spec, &mut self.shared.ctx());
        self.apply(reaction);
    }

    fn click_button(&mut self, prompt: PromptId, index: usize) {
        let current = self.active.as_ref().and_then(|a| a.prompt);
        if current != Some(prompt) {
            log::debug!("button for {prompt:?} no longer on screen");
            return;
        }
        if let Some(answer) = self.dialogue.advance(prompt, index, &mut self.shared.out) {
            self.step_script(Some(answer));
        }
    }

    fn character_hover(&mut self, hovered: bool) {
        self.patrol.set_hovered(hovered);
        if hovered {
            self.scheduler
                .schedule(TimerKind::HoverScale, self.timing.hover_scale_delay_ms);
        } else {
            self.scheduler.cancel(TimerKind::HoverScale);
            self.shared.out.push(UiCommand::SetCharacterHover(false));
        }
    }

    fn hotspot_hover(&mut self, index: usize, hovered: bool) {
        let timer = TimerKind::HotspotAnimation(index);
        self.scheduler.cancel(timer);
        self.shared
            .out
            .push(UiCommand::SetHotspotHover { index, hovered });
        if !hovered && self.viewer.hotspot_style(index) == Some(HotspotStyle::Jiggle) {
            self.scheduler.schedule(timer, self.timing.jiggle_restart_ms);
        }
    }

    fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        if self.character_ready {
            if self.patrol.is_active() {
                self.start_patrol();
            } else {
                let (left, bottom) = self.patrol.reposition_for_resize(&self.viewport);
                self.shared
                    .out
                    .push(UiCommand::PlaceContainer { left, bottom });
            }
        }
        self.viewer.resize(&self.viewport, &mut self.shared.out);
    }

    // ---- Timers ----

    fn fire(&mut self, timer: TimerKind) {
        match timer {
            TimerKind::PreloadTimeout => {
                if self.preloader.expire() {
                    self.on_assets_ready();
                }
            }
            TimerKind::RevealCharacter => self.reveal_character(),
            TimerKind::PatrolRetry => self.start_patrol(),
            TimerKind::HoverScale => {
                if self.patrol.is_hovered() {
                    self.shared.out.push(UiCommand::SetCharacterHover(true));
                }
            }
            TimerKind::HotspotAnimation(index) => {
                if self.viewer.hotspot_style(index) == Some(HotspotStyle::Jiggle) {
                    self.shared
                        .out
                        .push(UiCommand::RestartHotspotAnimation { index });
                }
            }
        }
    }

    // ---- Lifecycle steps ----

    fn on_assets_ready(&mut self) {
        self.scheduler.cancel(TimerKind::PreloadTimeout);
        self.shared.out.push(UiCommand::SetViewOpacity(1.0));
        self.shared.state.assets_loaded = true;

        let config = self.room.config();
        self.shared.out.push(UiCommand::WrapCharacter {
            padding: config.character_padding.clone(),
            z_index: config.character_z_index.clone(),
        });
        self.init_audio();
        self.scheduler
            .schedule(TimerKind::RevealCharacter, self.timing.reveal_delay_ms);
        log::info!("{}: assets ready", self.room.config().room_name);
    }

    fn init_audio(&mut self) {
        let config = self.room.config();
        let out = &mut self.shared.out;
        let state = &mut self.shared.state;

        out.push(UiCommand::ConfigureAudio {
            element: BGM_ELEMENT.to_string(),
            volume: BGM_VOLUME,
            looping: true,
        });
        out.push(UiCommand::SetMuted {
            element: BGM_ELEMENT.to_string(),
            muted: state.bgm_muted,
        });
        // First-time visitors get music only after choosing it.
        if state.has_ever_interacted && !state.bgm_muted {
            out.push(UiCommand::ResumeAudio {
                element: BGM_ELEMENT.to_string(),
            });
            state.bgm_started = true;
        }

        for element in config.character_audio.values() {
            out.push(UiCommand::ConfigureAudio {
                element: element.clone(),
                volume: config.character_audio_volume,
                looping: false,
            });
        }
        for (key, volume) in &config.additional_audio_volumes {
            if let Some(element) = config.additional_audio.get(key) {
                out.push(UiCommand::ConfigureAudio {
                    element: element.clone(),
                    volume: *volume,
                    looping: false,
                });
            }
        }
        out.push(UiCommand::SetVolumeIcon {
            muted: state.bgm_muted,
        });
    }

    fn reveal_character(&mut self) {
        self.character_ready = true;
        let placement = self.patrol.place_initially(&self.viewport);
        self.shared.out.push(UiCommand::PlaceCharacter {
            left: placement.left,
            bottom: placement.bottom,
            facing: placement.facing,
        });
        let walking = self.room.config().walking_sprite.clone();
        self.shared.ctx().set_character_sprite(&walking);
        self.shared.out.push(UiCommand::SetCharacterOpacity(1.0));
        self.start_patrol();
    }

    fn start_patrol(&mut self) {
        if !self.shared.state.assets_loaded {
            self.scheduler
                .schedule(TimerKind::PatrolRetry, self.timing.patrol_retry_ms);
            return;
        }
        self.patrol.start(&self.viewport);
        let walking = self.room.config().walking_sprite.clone();
        self.shared.ctx().set_character_sprite(&walking);
    }

    fn stop_patrol(&mut self) {
        self.patrol.stop();
        let static_sprite = self.room.config().static_sprite.clone();
        self.shared.ctx().set_character_sprite(&static_sprite);
    }

    fn navigate(&mut self, url: String) {
        self.teardown();
        log::info!("navigating to {url}");
        self.shared.out.push(UiCommand::Navigate(url));
    }

    // ---- Overlay ----

    fn open_viewer(&mut self, closeup: String, hotspots: Vec<ObjectSpec>) {
        let blur = self.room.config().blur_targets();
        if !self
            .viewer
            .open(&closeup, hotspots, blur, &mut self.shared.out)
        {
            log::debug!("close-up already open, ignoring {closeup}");
        }
    }

    fn close_overlay(&mut self) {
        let blur = self.room.config().blur_targets();
        if !self.viewer.close(blur, &mut self.shared.out) {
            return;
        }
        if self.active.as_ref().is_some_and(|a| a.tag.is_overlay_bound()) {
            self.cancel_active();
        }
        if self.active.is_none() {
            self.dialogue.hide(&mut self.shared.out);
        }
        self.room.on_overlay_close(&mut self.shared.ctx());
    }

    // ---- Scripts ----

    fn apply(&mut self, reaction: Reaction) {
        match reaction {
            Reaction::None => {}
            Reaction::Start { tag, script } => self.start_script(tag, script),
            Reaction::OpenViewer { closeup, hotspots } => self.open_viewer(closeup, hotspots),
        }
    }

    fn start_script(&mut self, tag: ScriptTag, script: Box<dyn Script>) {
        if self.active.is_some() {
            self.cancel_active();
        }
        match tag {
            ScriptTag::Conversation => {
                self.shared.state.character_interacting = true;
                self.patrol.save_snapshot();
                self.stop_patrol();
            }
            ScriptTag::Help => self.shared.state.help_dialogue_open = true,
            _ => {}
        }
        log::debug!("starting {tag:?} dialogue");
        self.active = Some(ActiveScript {
            tag,
            script,
            prompt: None,
        });
        self.step_script(None);
    }

    fn step_script(&mut self, answer: Option<Answer>) {
        let Some(mut active) = self.active.take() else {
            return;
        };
        let step = active.script.step(answer, &mut self.shared.ctx());
        let out = &mut self.shared.out;
        match step {
            Step::Show(Prompt::Line {
                text,
                audio,
                button,
            }) => {
                active.prompt = Some(self.dialogue.show_line(&text, audio.as_deref(), &button, out));
                self.active = Some(active);
            }
            Step::Show(Prompt::Choice {
                text,
                options,
                audio,
            }) => {
                active.prompt =
                    Some(self.dialogue.show_choice(&text, &options, audio.as_deref(), out));
                self.active = Some(active);
            }
            Step::Finish => {
                self.dialogue.clear(out);
                self.dialogue.hide(out);
                self.end_script(active.tag, false);
                self.room.on_script_finished(active.tag, &mut self.shared.ctx());
            }
        }
    }

    /// Drop the running sequence without letting it finish.
    fn cancel_active(&mut self) {
        let Some(active) = self.active.take() else {
            return;
        };
        self.dialogue.cancel(&mut self.shared.out);
        self.end_script(active.tag, true);
        self.room.on_script_cancelled(active.tag, &mut self.shared.ctx());
    }

    fn end_script(&mut self, tag: ScriptTag, cancelled: bool) {
        match tag {
            ScriptTag::Conversation => {
                if !cancelled {
                    self.patrol.restore_snapshot();
                    self.start_patrol();
                }
                self.shared.state.character_interacting = false;
            }
            ScriptTag::Help => self.shared.state.help_dialogue_open = false,
            _ => {}
        }
    }
}
