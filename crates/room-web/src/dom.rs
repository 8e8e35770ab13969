//! Element lookups and style helpers.
//!
//! Every lookup is optional: a page missing an element simply loses the
//! behaviour attached to it.

use std::collections::BTreeMap;

use room_engine::{css_background_url, Control, RoomConfig, Viewport};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Element, HtmlElement, HtmlImageElement, HtmlMediaElement, Window};

pub fn by_id<T: JsCast>(document: &Document, id: &str) -> Option<T> {
    document
        .get_element_by_id(id)
        .and_then(|el| el.dyn_into::<T>().ok())
}

pub fn create<T: JsCast>(document: &Document, tag: &str) -> Result<T, JsValue> {
    document
        .create_element(tag)?
        .dyn_into::<T>()
        .map_err(|_| JsValue::from_str(&format!("<{tag}> has an unexpected type")))
}

/// Set several inline style properties at once.
pub fn set_styles(el: &HtmlElement, props: &[(&str, &str)]) {
    let style = el.style();
    for (name, value) in props {
        if let Err(e) = style.set_property(name, value) {
            log::debug!("style {name}: {value} rejected: {e:?}");
        }
    }
}

pub fn set_style(el: &HtmlElement, name: &str, value: &str) {
    set_styles(el, &[(name, value)]);
}

pub fn px(value: f32) -> String {
    format!("{value}px")
}

/// Elements the room's config refers to, resolved once at start-up.
pub struct RoomDom {
    pub window: Window,
    pub document: Document,
    pub view: Option<HtmlElement>,
    pub scene: Option<HtmlElement>,
    pub character: Option<HtmlImageElement>,
    /// Positioning wrapper around the character, created on request.
    pub container: Option<HtmlElement>,
    pub dialogue: Option<HtmlElement>,
    pub dialogue_text: Option<HtmlElement>,
    pub dialogue_buttons: Option<HtmlElement>,
    pub controls: Vec<(Control, HtmlElement)>,
    pub objects: Vec<(String, HtmlElement)>,
    /// Audio element id → element.
    pub audio: BTreeMap<String, HtmlMediaElement>,
}

impl RoomDom {
    pub fn bind(config: &RoomConfig) -> Result<Self, JsValue> {
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        let document = window
            .document()
            .ok_or_else(|| JsValue::from_str("no document"))?;

        let view = by_id::<HtmlElement>(&document, &config.view_id());
        if view.is_none() {
            log::warn!("#{} not found, room layout disabled", config.view_id());
        }
        let character = by_id::<HtmlImageElement>(&document, &config.character_name);
        if character.is_none() {
            log::warn!("#{} not found, character disabled", config.character_name);
        }

        let controls = [
            (Control::Help, "help"),
            (Control::Left, "left"),
            (Control::Right, "right"),
            (Control::Volume, "volume"),
        ]
        .into_iter()
        .filter_map(|(control, id)| by_id::<HtmlElement>(&document, id).map(|el| (control, el)))
        .collect();

        let objects = config
            .objects
            .iter()
            .filter_map(|id| by_id::<HtmlElement>(&document, id).map(|el| (id.clone(), el)))
            .collect();

        let mut ids: Vec<String> = config.audio_map().into_values().collect();
        ids.push(room_engine::config::BGM_ELEMENT.to_string());
        let audio = ids
            .into_iter()
            .filter_map(|id| by_id::<HtmlMediaElement>(&document, &id).map(|el| (id, el)))
            .collect();

        Ok(Self {
            scene: by_id(&document, &config.scene_id()),
            dialogue: by_id(&document, "dialogue"),
            dialogue_text: by_id(&document, "dialogue-text"),
            dialogue_buttons: by_id(&document, "dialogue-buttons"),
            container: None,
            view,
            character,
            controls,
            objects,
            audio,
            window,
            document,
        })
    }

    /// Current view rect and character container width.
    pub fn measure(&self) -> Viewport {
        let Some(view) = &self.view else {
            return Viewport::default();
        };
        let rect = view.get_bounding_client_rect();
        let container_width = self
            .container
            .as_ref()
            .map(|c| c.offset_width() as f32)
            .unwrap_or(0.0);
        Viewport::new(rect.width() as f32, rect.height() as f32, container_width)
    }

    /// Images the page itself declares: the scene `<img>` and the view's
    /// CSS background.
    pub fn discover_images(&self) -> Vec<String> {
        let mut images = Vec::new();
        if let Some(scene) = self
            .scene
            .as_ref()
            .and_then(|s| s.dyn_ref::<HtmlImageElement>())
        {
            let src = scene.src();
            if !src.is_empty() {
                images.push(src);
            }
        }
        if let Some(view) = &self.view {
            let background = self
                .window
                .get_computed_style(view)
                .ok()
                .flatten()
                .and_then(|style| style.get_property_value("background-image").ok());
            if let Some(url) = background.as_deref().and_then(css_background_url) {
                images.push(url);
            }
        }
        images
    }

    pub fn element(&self, id: &str) -> Option<HtmlElement> {
        by_id(&self.document, id)
    }

    pub fn control(&self, control: Control) -> Option<&HtmlElement> {
        self.controls
            .iter()
            .find(|(c, _)| *c == control)
            .map(|(_, el)| el)
    }

    pub fn media(&self, id: &str) -> Option<&HtmlMediaElement> {
        self.audio.get(id)
    }
}

pub fn toggle_class(el: &Element, class: &str, on: bool) {
    if let Err(e) = el.class_list().toggle_with_force(class, on) {
        log::debug!("class {class} toggle failed: {e:?}");
    }
}
