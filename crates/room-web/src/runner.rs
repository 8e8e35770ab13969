use std::cell::{Cell, RefCell};
use std::rc::Rc;

use gloo::events::{EventListener, EventListenerOptions, EventListenerPhase};
use gloo::render::{request_animation_frame, AnimationFrame};
use room_engine::{
    ClickTarget, Facing, HotspotRect, HotspotStyle, PromptId, RoomController, RoomInput,
    RoomScript, UiCommand, OVERLAY_ROOT_ID,
};
use wasm_bindgen::JsValue;
use wasm_bindgen_futures::JsFuture;
use web_sys::{
    Element, Event, HtmlButtonElement, HtmlElement, HtmlImageElement, HtmlMediaElement, Node,
};

use crate::dom::{create, px, set_style, set_styles, toggle_class, RoomDom};
use crate::storage::{describe, open_preferences};

/// Inputs collected by DOM listeners until the next frame.
type Inbox = Rc<RefCell<Vec<RoomInput>>>;

/// Longest frame delta fed to the engine, in seconds. Keeps the character
/// from teleporting after the tab was in the background.
const MAX_FRAME_DT: f64 = 0.1;

const BLUR_FILTER: &str = "blur(4px) brightness(0.6)";
const GLOW_FILTER: &str = "drop-shadow(0 0 6px rgba(255, 215, 0, 0.5)) brightness(1.1)";

struct HotspotDom {
    img: HtmlImageElement,
    style: HotspotStyle,
    stagger: usize,
}

/// DOM of an open close-up. Dropping it detaches every listener.
struct OverlayDom {
    root: HtmlElement,
    wrapper: HtmlElement,
    image: HtmlImageElement,
    hotspots: Vec<HotspotDom>,
    listeners: Vec<EventListener>,
}

/// Drives one [`RoomController`] from the browser: forwards DOM events,
/// runs the animation-frame loop and applies the engine's commands.
///
/// Like the game runner it is stored in a `thread_local!` by
/// [`export_room!`](crate::export_room); `frame_hook` re-enters it through
/// that storage on every animation frame.
pub struct RoomRunner<R: RoomScript> {
    controller: RoomController<R>,
    dom: RoomDom,
    inbox: Inbox,
    resized: Rc<Cell<bool>>,
    frame_hook: fn(f64),
    frame: Option<AnimationFrame>,
    /// Handle of the frame currently running; released on the next one.
    spent_frame: Option<AnimationFrame>,
    last_frame_ms: Option<f64>,
    /// Page-lifetime listeners: controls, objects, audio, window.
    listeners: Vec<EventListener>,
    /// Listeners of the buttons currently in the dialogue box.
    button_listeners: Vec<EventListener>,
    /// Preload images, kept alive until they report back.
    preload: Vec<(HtmlImageElement, EventListener, EventListener)>,
    overlay: Option<OverlayDom>,
}

impl<R: RoomScript> RoomRunner<R> {
    pub fn start(room: R, frame_hook: fn(f64)) -> Result<Self, JsValue> {
        let dom = RoomDom::bind(room.config())?;
        let viewport = dom.measure();
        let controller = RoomController::new(room, open_preferences(), viewport);

        let mut runner = Self {
            controller,
            dom,
            inbox: Rc::new(RefCell::new(Vec::new())),
            resized: Rc::new(Cell::new(false)),
            frame_hook,
            frame: None,
            spent_frame: None,
            last_frame_ms: None,
            listeners: Vec::new(),
            button_listeners: Vec::new(),
            preload: Vec::new(),
            overlay: None,
        };
        runner.install_listeners();

        let discovered = runner.dom.discover_images();
        runner.controller.init(&discovered);
        runner.flush();
        runner.schedule_frame();
        Ok(runner)
    }

    /// One animation frame.
    pub fn frame(&mut self, timestamp: f64) {
        self.spent_frame = self.frame.take();
        let dt = match self.last_frame_ms {
            Some(prev) => ((timestamp - prev) / 1000.0).clamp(0.0, MAX_FRAME_DT),
            None => 0.0,
        };
        self.last_frame_ms = Some(timestamp);

        let pending: Vec<RoomInput> = self.inbox.borrow_mut().drain(..).collect();
        for input in pending {
            self.controller.push_input(input);
        }
        let viewport = self.dom.measure();
        if self.resized.replace(false) {
            self.controller.push_input(RoomInput::Resize(viewport));
        }
        self.controller.set_viewport(viewport);
        self.controller.tick(dt as f32);
        self.flush();

        if !self.controller.is_torn_down() {
            self.schedule_frame();
        }
    }

    pub fn teardown(&mut self) {
        self.controller.teardown();
        self.flush();
        self.frame = None;
        self.listeners.clear();
        self.button_listeners.clear();
        self.preload.clear();
        self.overlay = None;
    }

    fn schedule_frame(&mut self) {
        let hook = self.frame_hook;
        self.frame = Some(request_animation_frame(move |timestamp| hook(timestamp)));
    }

    fn flush(&mut self) {
        for command in self.controller.drain_commands() {
            if let Err(e) = self.apply(command) {
                log::warn!("DOM update failed: {}", describe(&e));
            }
        }
    }

    // ---- Listeners ----

    fn install_listeners(&mut self) {
        for (control, el) in &self.dom.controls {
            let listener = click_listener(el, &self.inbox, ClickTarget::Control(*control));
            self.listeners.push(listener);
        }
        for (id, el) in &self.dom.objects {
            let listener = click_listener(el, &self.inbox, ClickTarget::Object(id.clone()));
            self.listeners.push(listener);
        }
        for (id, media) in &self.dom.audio {
            let inbox = self.inbox.clone();
            let element = id.clone();
            self.listeners.push(EventListener::new(media, "ended", move |_| {
                inbox.borrow_mut().push(RoomInput::AudioEnded {
                    element: element.clone(),
                });
            }));
        }
        let resized = self.resized.clone();
        self.listeners
            .push(EventListener::new(&self.dom.window, "resize", move |_| {
                resized.set(true);
            }));
    }

    fn watch_character(&mut self, container: &HtmlElement) {
        let inbox = self.inbox.clone();
        self.listeners
            .push(EventListener::new(container, "mouseenter", move |_| {
                inbox.borrow_mut().push(RoomInput::CharacterHover(true));
            }));
        let inbox = self.inbox.clone();
        self.listeners
            .push(EventListener::new(container, "mouseleave", move |_| {
                inbox.borrow_mut().push(RoomInput::CharacterHover(false));
            }));
        self.listeners
            .push(click_listener(container, &self.inbox, ClickTarget::Character));
    }

    // ---- Commands ----

    fn apply(&mut self, command: UiCommand) -> Result<(), JsValue> {
        match command {
            UiCommand::SetViewOpacity(opacity) => {
                if let Some(view) = &self.dom.view {
                    set_styles(
                        view,
                        &[
                            ("opacity", &opacity.to_string()),
                            ("transition", "opacity 0.2s ease-out"),
                        ],
                    );
                }
            }
            UiCommand::Preload(sources) => self.preload(sources)?,
            UiCommand::SetBlur { ids, blurred } => {
                let filter = if blurred { BLUR_FILTER } else { "" };
                for id in ids {
                    if let Some(el) = self.dom.element(&id) {
                        set_style(&el, "filter", filter);
                    }
                }
            }

            UiCommand::SetCharacterSprite(src) => {
                if let Some(character) = &self.dom.character {
                    character.set_src(&src);
                }
            }
            UiCommand::SetCharacterOpacity(opacity) => {
                let value = opacity.to_string();
                if let Some(character) = &self.dom.character {
                    set_styles(
                        character,
                        &[("transition", "opacity 0.15s ease-out"), ("opacity", &value)],
                    );
                }
                if let Some(container) = &self.dom.container {
                    set_style(container, "opacity", &value);
                }
            }
            UiCommand::WrapCharacter { padding, z_index } => self.wrap_character(&padding, &z_index)?,
            UiCommand::PlaceCharacter {
                left,
                bottom,
                facing,
            } => {
                self.place_container(left, bottom);
                if let Some(character) = &self.dom.character {
                    let transform = match facing {
                        Facing::Right => "scaleX(1)",
                        Facing::Left => "scaleX(-1)",
                    };
                    set_style(character, "transform", transform);
                }
            }
            UiCommand::PlaceContainer { left, bottom } => self.place_container(left, bottom),
            UiCommand::SetCharacterHover(hovered) => {
                if let Some(container) = &self.dom.container {
                    set_style(container, "transform", if hovered { "scale(1.1)" } else { "" });
                }
            }

            UiCommand::ShowDialogue { html } => {
                if let Some(text) = &self.dom.dialogue_text {
                    text.set_inner_html(&html);
                }
                if let Some(dialogue) = &self.dom.dialogue {
                    toggle_class(dialogue, "hidden", false);
                }
            }
            UiCommand::HideDialogue => {
                if let Some(dialogue) = &self.dom.dialogue {
                    toggle_class(dialogue, "hidden", true);
                }
            }
            UiCommand::ClearButtons => {
                self.button_listeners.clear();
                if let Some(buttons) = &self.dom.dialogue_buttons {
                    buttons.set_inner_html("");
                }
            }
            UiCommand::AddButton {
                prompt,
                index,
                label,
            } => self.add_button(prompt, index, &label)?,

            UiCommand::ConfigureAudio {
                element,
                volume,
                looping,
            } => {
                if let Some(media) = self.dom.media(&element) {
                    media.set_volume(f64::from(volume));
                    media.set_loop(looping);
                }
            }
            UiCommand::PlayAudio { element } => {
                if let Some(media) = self.dom.media(&element) {
                    media.set_current_time(0.0);
                    play(media, element);
                }
            }
            UiCommand::ResumeAudio { element } => {
                if let Some(media) = self.dom.media(&element) {
                    play(media, element);
                }
            }
            UiCommand::StopAudio { element } => {
                if let Some(media) = self.dom.media(&element) {
                    media.pause()?;
                    media.set_current_time(0.0);
                }
            }
            UiCommand::SetMuted { element, muted } => {
                if let Some(media) = self.dom.media(&element) {
                    media.set_muted(muted);
                }
            }
            UiCommand::SetVolumeIcon { muted } => {
                if let Some(volume) = self.dom.control(room_engine::Control::Volume) {
                    toggle_class(volume, "muted", muted);
                }
            }

            UiCommand::OpenOverlay { closeup } => self.open_overlay(&closeup)?,
            UiCommand::LayoutOverlay { width, height } => {
                if let Some(overlay) = &self.overlay {
                    let (w, h) = (px(width), px(height));
                    set_styles(
                        &overlay.image,
                        &[
                            ("display", "block"),
                            ("width", &w),
                            ("height", &h),
                            ("image-rendering", "pixelated"),
                            ("opacity", "1"),
                        ],
                    );
                    toggle_class(&overlay.image, "loaded", true);
                    set_styles(&overlay.wrapper, &[("width", &w), ("height", &h)]);
                    if overlay.image.parent_node().is_none() {
                        overlay.wrapper.append_child(&overlay.image)?;
                    }
                }
            }
            UiCommand::AddHotspot {
                index,
                src,
                rect,
                style,
                stagger,
            } => self.add_hotspot(index, &src, rect, style, stagger)?,
            UiCommand::PlaceHotspot { index, rect } => {
                if let Some(hotspot) = self.hotspot(index) {
                    place_hotspot(&hotspot.img, rect);
                }
            }
            UiCommand::SetHotspotImage { index, src } => {
                if let Some(hotspot) = self.hotspot(index) {
                    hotspot.img.set_src(&src);
                    set_style(&hotspot.img, "opacity", "1");
                }
            }
            UiCommand::SetHotspotHover { index, hovered } => {
                if let Some(hotspot) = self.hotspot(index) {
                    match (hotspot.style, hovered) {
                        (HotspotStyle::Jiggle, true) => set_styles(
                            &hotspot.img,
                            &[("animation", "none"), ("transform", "scale(1.1)")],
                        ),
                        (HotspotStyle::Jiggle, false) => set_style(&hotspot.img, "transform", ""),
                        (HotspotStyle::Glow, true) => set_style(&hotspot.img, "filter", GLOW_FILTER),
                        (HotspotStyle::Glow, false) => set_style(&hotspot.img, "filter", ""),
                    }
                }
            }
            UiCommand::RestartHotspotAnimation { index } => {
                if let Some(hotspot) = self.hotspot(index) {
                    let animation = format!(
                        "book-jiggle 2s ease-in-out infinite {}s",
                        hotspot.stagger as f32 * 0.3
                    );
                    set_style(&hotspot.img, "animation", &animation);
                }
            }
            UiCommand::CloseOverlay => {
                if let Some(overlay) = self.overlay.take() {
                    overlay.root.remove();
                }
            }

            UiCommand::Navigate(url) => self.dom.window.location().set_href(&url)?,
            UiCommand::OpenExternal(url) => {
                self.dom.window.open_with_url_and_target(&url, "_blank")?;
            }
        }
        Ok(())
    }

    fn preload(&mut self, sources: Vec<String>) -> Result<(), JsValue> {
        for src in sources {
            let img = HtmlImageElement::new()?;
            let inbox = self.inbox.clone();
            let on_load = EventListener::once(&img, "load", move |_| {
                inbox.borrow_mut().push(RoomInput::AssetSettled);
            });
            let inbox = self.inbox.clone();
            let failed = src.clone();
            let on_error = EventListener::once(&img, "error", move |_| {
                log::warn!("Failed to preload {failed}");
                inbox.borrow_mut().push(RoomInput::AssetSettled);
            });
            img.set_src(&src);
            self.preload.push((img, on_load, on_error));
        }
        Ok(())
    }

    fn wrap_character(&mut self, padding: &str, z_index: &str) -> Result<(), JsValue> {
        let Some(character) = self.dom.character.clone() else {
            return Ok(());
        };
        let Some(parent) = character.parent_node() else {
            return Ok(());
        };
        let container: HtmlElement = create(&self.dom.document, "div")?;
        container.set_id(&format!("{}-container", character.id()));
        set_styles(
            &container,
            &[
                ("position", "absolute"),
                ("bottom", "0"),
                ("left", "20%"),
                ("pointer-events", "auto"),
                ("transform-origin", "center bottom"),
                ("padding", padding),
                ("z-index", z_index),
                ("cursor", "pointer"),
                ("transition", "transform 0.1s ease-out, opacity 0.15s ease-out"),
                ("opacity", "0"),
            ],
        );
        let anchor: &Node = &character;
        parent.insert_before(&container, Some(anchor))?;
        container.append_child(&character)?;
        self.watch_character(&container);
        self.dom.container = Some(container);
        Ok(())
    }

    fn place_container(&self, left: f32, bottom: f32) {
        if let Some(container) = &self.dom.container {
            set_styles(container, &[("left", &px(left)), ("bottom", &px(bottom))]);
        }
    }

    fn add_button(&mut self, prompt: PromptId, index: usize, label: &str) -> Result<(), JsValue> {
        let Some(buttons) = &self.dom.dialogue_buttons else {
            return Ok(());
        };
        let button: HtmlButtonElement = create(&self.dom.document, "button")?;
        button.set_text_content(Some(label));
        buttons.append_child(&button)?;
        self.button_listeners.push(click_listener(
            &button,
            &self.inbox,
            ClickTarget::DialogueButton { prompt, index },
        ));
        Ok(())
    }

    fn open_overlay(&mut self, closeup: &str) -> Result<(), JsValue> {
        let Some(view) = &self.dom.view else {
            return Ok(());
        };
        let document = &self.dom.document;

        let root: HtmlElement = create(document, "div")?;
        root.set_id(OVERLAY_ROOT_ID);
        set_styles(
            &root,
            &[
                ("position", "absolute"),
                ("top", "0"),
                ("left", "0"),
                ("width", "100%"),
                ("height", "100%"),
                ("z-index", "20"),
            ],
        );
        let backdrop: HtmlElement = create(document, "div")?;
        set_styles(
            &backdrop,
            &[
                ("position", "absolute"),
                ("top", "0"),
                ("left", "0"),
                ("width", "100%"),
                ("height", "100%"),
                ("background", "rgba(0,0,0,0.5)"),
                ("pointer-events", "auto"),
            ],
        );
        let wrapper: HtmlElement = create(document, "div")?;
        set_styles(
            &wrapper,
            &[
                ("position", "absolute"),
                ("top", "50%"),
                ("left", "50%"),
                ("transform", "translate(-50%,-50%)"),
                ("pointer-events", "auto"),
            ],
        );
        root.append_child(&backdrop)?;
        root.append_child(&wrapper)?;
        view.append_child(&root)?;

        let image = HtmlImageElement::new()?;
        let mut listeners = vec![click_listener(&backdrop, &self.inbox, ClickTarget::Backdrop)];
        let inbox = self.inbox.clone();
        let loaded = image.clone();
        listeners.push(EventListener::once(&image, "load", move |_| {
            inbox.borrow_mut().push(RoomInput::CloseupLoaded {
                width: loaded.natural_width() as f32,
                height: loaded.natural_height() as f32,
            });
        }));
        let inbox = self.inbox.clone();
        listeners.push(EventListener::once(&image, "error", move |_| {
            inbox.borrow_mut().push(RoomInput::CloseupFailed);
        }));
        image.set_src(closeup);

        self.overlay = Some(OverlayDom {
            root,
            wrapper,
            image,
            hotspots: Vec::new(),
            listeners,
        });
        Ok(())
    }

    fn add_hotspot(
        &mut self,
        index: usize,
        src: &str,
        rect: HotspotRect,
        style: HotspotStyle,
        stagger: usize,
    ) -> Result<(), JsValue> {
        let Some(overlay) = self.overlay.as_mut() else {
            return Ok(());
        };
        let img = HtmlImageElement::new()?;
        img.set_class_name(match style {
            HotspotStyle::Jiggle => "closeup-object",
            HotspotStyle::Glow => "filing-cabinet-object",
        });
        set_styles(
            &img,
            &[
                ("position", "absolute"),
                ("image-rendering", "pixelated"),
                ("cursor", "pointer"),
                ("transition", "transform 0.2s"),
                ("z-index", "25"),
                ("pointer-events", "auto"),
                ("opacity", "1"),
            ],
        );
        if style == HotspotStyle::Jiggle {
            set_style(&img, "animation-delay", &format!("{}s", stagger as f32 * 0.5));
        }
        place_hotspot(&img, rect);

        let marked = img.clone();
        overlay
            .listeners
            .push(EventListener::new(&img, "load", move |_| {
                toggle_class(&marked, "loaded", true);
            }));
        for (event, hovered) in [("mouseenter", true), ("mouseleave", false)] {
            let inbox = self.inbox.clone();
            overlay.listeners.push(EventListener::new(&img, event, move |_| {
                inbox
                    .borrow_mut()
                    .push(RoomInput::HotspotHover { index, hovered });
            }));
        }
        overlay
            .listeners
            .push(click_listener(&img, &self.inbox, ClickTarget::Hotspot(index)));

        img.set_src(src);
        overlay.wrapper.append_child(&img)?;
        overlay.hotspots.push(HotspotDom {
            img,
            style,
            stagger,
        });
        Ok(())
    }

    fn hotspot(&self, index: usize) -> Option<&HotspotDom> {
        self.overlay.as_ref().and_then(|o| o.hotspots.get(index))
    }
}

/// Click handler that swallows the event and queues `target`.
fn click_listener(el: &Element, inbox: &Inbox, target: ClickTarget) -> EventListener {
    let inbox = inbox.clone();
    EventListener::new_with_options(
        el,
        "click",
        EventListenerOptions {
            phase: EventListenerPhase::Bubble,
            passive: false,
        },
        move |event: &Event| {
            event.prevent_default();
            event.stop_propagation();
            inbox.borrow_mut().push(RoomInput::Click {
                target: target.clone(),
                at_ms: event.time_stamp(),
            });
        },
    )
}

fn place_hotspot(img: &HtmlImageElement, rect: HotspotRect) {
    set_styles(
        img,
        &[
            ("left", &px(rect.left)),
            ("top", &px(rect.top)),
            ("width", &px(rect.width)),
            ("height", &px(rect.height)),
        ],
    );
}

/// Start playback. Autoplay rejections are expected and only logged.
fn play(media: &HtmlMediaElement, element: String) {
    match media.play() {
        Ok(promise) => wasm_bindgen_futures::spawn_local(async move {
            if let Err(e) = JsFuture::from(promise).await {
                log::info!("Audio play blocked ({element}): {}", describe(&e));
            }
        }),
        Err(e) => log::info!("Audio play failed ({element}): {}", describe(&e)),
    }
}
