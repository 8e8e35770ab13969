//! Close-up viewer.
//!
//! Opening a room object shows a modal close-up image scaled to fit the view
//! and overlays its hotspots. Hotspot rectangles are authored in the
//! close-up's native pixel space and scaled by the same factor as the image,
//! so they stay aligned with the artwork at any view size.

use glam::Vec2;

use crate::api::command::{Outbox, UiCommand};
use crate::api::types::Viewport;
use crate::config::ObjectSpec;

/// Fraction of the view the close-up may occupy in each dimension.
pub const ZOOM_FACTOR: f32 = 0.7;

/// Element id of the overlay root.
pub const OVERLAY_ROOT_ID: &str = "object-close-container";

/// Uniform scale that fits `natural` into `view * zoom`.
pub fn fit_scale(view: Vec2, natural: Vec2, zoom: f32) -> f32 {
    if natural.x <= 0.0 || natural.y <= 0.0 {
        return 1.0;
    }
    let fit = view * zoom / natural;
    fit.x.min(fit.y)
}

/// On-screen hotspot rectangle relative to the close-up's top-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HotspotRect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl HotspotRect {
    pub fn scaled(spec: &ObjectSpec, scale: f32) -> Self {
        Self {
            left: spec.x * scale,
            top: spec.y * scale,
            width: spec.w * scale,
            height: spec.h * scale,
        }
    }
}

/// Hover treatment of a hotspot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HotspotStyle {
    /// Idle jiggle animation, zoom on hover.
    #[default]
    Jiggle,
    /// No idle animation, golden glow on hover.
    Glow,
}

/// How a hotspot looks, as decided by the room.
#[derive(Debug, Clone, PartialEq)]
pub struct HotspotVisual {
    pub src: String,
    pub style: HotspotStyle,
}

/// Live close-up, present once the image has loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayState {
    /// Natural size of the close-up image.
    pub base: Vec2,
    pub objects: Vec<ObjectSpec>,
    pub styles: Vec<HotspotStyle>,
    pub zoom_factor: f32,
    pub scale: f32,
}

#[derive(Debug)]
enum Phase {
    Loading { objects: Vec<ObjectSpec> },
    Ready(OverlayState),
}

pub struct ObjectViewer {
    phase: Option<Phase>,
    zoom_factor: f32,
}

impl ObjectViewer {
    pub fn new() -> Self {
        Self {
            phase: None,
            zoom_factor: ZOOM_FACTOR,
        }
    }

    pub fn is_open(&self) -> bool {
        self.phase.is_some()
    }

    pub fn state(&self) -> Option<&OverlayState> {
        match &self.phase {
            Some(Phase::Ready(state)) => Some(state),
            _ => None,
        }
    }

    pub fn hotspot(&self, index: usize) -> Option<&ObjectSpec> {
        self.state().and_then(|s| s.objects.get(index))
    }

    pub fn hotspot_style(&self, index: usize) -> Option<HotspotStyle> {
        self.state().and_then(|s| s.styles.get(index).copied())
    }

    /// Open a close-up. A no-op returning false if one is already open.
    pub fn open(
        &mut self,
        closeup: &str,
        objects: Vec<ObjectSpec>,
        blur: Vec<String>,
        out: &mut Outbox,
    ) -> bool {
        if self.is_open() {
            return false;
        }
        out.push(UiCommand::SetBlur {
            ids: blur,
            blurred: true,
        });
        out.push(UiCommand::OpenOverlay {
            closeup: closeup.to_string(),
        });
        self.phase = Some(Phase::Loading { objects });
        true
    }

    /// The close-up reported its natural size: size it and lay out hotspots.
    pub fn image_loaded(
        &mut self,
        natural: Vec2,
        viewport: &Viewport,
        visual: impl Fn(&ObjectSpec) -> HotspotVisual,
        out: &mut Outbox,
    ) {
        let objects = match self.phase.take() {
            Some(Phase::Loading { objects }) => objects,
            other => {
                self.phase = other;
                return;
            }
        };
        let scale = fit_scale(viewport.size, natural, self.zoom_factor);
        let size = natural * scale;
        out.push(UiCommand::LayoutOverlay {
            width: size.x,
            height: size.y,
        });

        let mut styles = Vec::with_capacity(objects.len());
        for (index, spec) in objects.iter().enumerate() {
            let look = visual(spec);
            styles.push(look.style);
            out.push(UiCommand::AddHotspot {
                index,
                src: look.src,
                rect: HotspotRect::scaled(spec, scale),
                style: look.style,
                // the close-up image itself is the wrapper's first image
                stagger: index + 1,
            });
        }
        self.phase = Some(Phase::Ready(OverlayState {
            base: natural,
            objects,
            styles,
            zoom_factor: self.zoom_factor,
            scale,
        }));
    }

    /// Recompute the scale for a new view size and re-place everything.
    pub fn resize(&mut self, viewport: &Viewport, out: &mut Outbox) {
        let Some(Phase::Ready(state)) = self.phase.as_mut() else {
            return;
        };
        let scale = fit_scale(viewport.size, state.base, state.zoom_factor);
        state.scale = scale;
        let size = state.base * scale;
        out.push(UiCommand::LayoutOverlay {
            width: size.x,
            height: size.y,
        });
        for (index, spec) in state.objects.iter().enumerate() {
            out.push(UiCommand::PlaceHotspot {
                index,
                rect: HotspotRect::scaled(spec, scale),
            });
        }
    }

    /// Tear the close-up down. Returns false if nothing was open.
    pub fn close(&mut self, blur: Vec<String>, out: &mut Outbox) -> bool {
        if self.phase.take().is_none() {
            return false;
        }
        out.push(UiCommand::CloseOverlay);
        out.push(UiCommand::SetBlur {
            ids: blur,
            blurred: false,
        });
        true
    }
}

impl Default for ObjectViewer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(x: f32, y: f32, w: f32, h: f32) -> ObjectSpec {
        ObjectSpec {
            name: "Book".into(),
            file: "book.webp".into(),
            x,
            y,
            w,
            h,
            pages: vec!["p1".into()],
            kind: None,
        }
    }

    fn jiggle(spec: &ObjectSpec) -> HotspotVisual {
        HotspotVisual {
            src: format!("dir/{}", spec.file),
            style: HotspotStyle::Jiggle,
        }
    }

    fn opened(out: &mut Outbox) -> ObjectViewer {
        let mut v = ObjectViewer::new();
        assert!(v.open(
            "close.webp",
            vec![spec(170.0, 31.0, 11.0, 49.0), spec(10.0, 20.0, 30.0, 40.0)],
            vec!["scene".into()],
            out
        ));
        v
    }

    #[test]
    fn fit_scale_uses_tighter_dimension() {
        // width-limited: 1000*0.7/350 = 2.0, height 800*0.7/200 = 2.8
        assert_eq!(fit_scale(Vec2::new(1000.0, 800.0), Vec2::new(350.0, 200.0), 0.7), 2.0);
        // height-limited
        let s = fit_scale(Vec2::new(2000.0, 400.0), Vec2::new(100.0, 100.0), 0.7);
        assert!((s - 2.8).abs() < 1e-5);
    }

    #[test]
    fn second_open_is_a_noop() {
        let mut out = Outbox::new();
        let mut v = opened(&mut out);
        out.drain();
        assert!(!v.open("other.webp", vec![], vec![], &mut out));
        assert!(out.is_empty());
    }

    #[test]
    fn hotspots_scale_with_image() {
        let mut out = Outbox::new();
        let mut v = opened(&mut out);
        out.drain();
        let vp = Viewport::new(1000.0, 800.0, 80.0);
        v.image_loaded(Vec2::new(350.0, 200.0), &vp, jiggle, &mut out);
        let cmds = out.drain();
        assert_eq!(
            cmds[0],
            UiCommand::LayoutOverlay {
                width: 700.0,
                height: 400.0
            }
        );
        match &cmds[1] {
            UiCommand::AddHotspot { index, src, rect, stagger, .. } => {
                assert_eq!(*index, 0);
                assert_eq!(src, "dir/book.webp");
                assert_eq!(rect.left, 170.0 * 2.0);
                assert_eq!(rect.top, 31.0 * 2.0);
                assert_eq!(rect.width, 11.0 * 2.0);
                assert_eq!(rect.height, 49.0 * 2.0);
                assert_eq!(*stagger, 1);
            }
            other => panic!("expected hotspot, got {other:?}"),
        }
        assert_eq!(v.state().unwrap().scale, 2.0);
    }

    #[test]
    fn resize_reapplies_new_scale_everywhere() {
        let mut out = Outbox::new();
        let mut v = opened(&mut out);
        let natural = Vec2::new(350.0, 200.0);
        v.image_loaded(natural, &Viewport::new(1000.0, 800.0, 80.0), jiggle, &mut out);
        out.drain();

        let vp = Viewport::new(500.0, 800.0, 80.0);
        v.resize(&vp, &mut out);
        let scale = fit_scale(vp.size, natural, ZOOM_FACTOR);
        assert_eq!(scale, 1.0);
        let cmds = out.drain();
        assert_eq!(
            cmds[0],
            UiCommand::LayoutOverlay {
                width: 350.0 * scale,
                height: 200.0 * scale
            }
        );
        let placed: Vec<_> = cmds
            .iter()
            .filter_map(|c| match c {
                UiCommand::PlaceHotspot { index, rect } => Some((*index, *rect)),
                _ => None,
            })
            .collect();
        assert_eq!(placed.len(), 2);
        assert_eq!(placed[1].1.left, 10.0 * scale);
        assert_eq!(placed[1].1.height, 40.0 * scale);
    }

    #[test]
    fn close_clears_state_and_allows_reopen() {
        let mut out = Outbox::new();
        let mut v = opened(&mut out);
        assert!(v.close(vec!["scene".into()], &mut out));
        assert!(!v.is_open());
        assert!(!v.close(vec![], &mut out));
        assert!(v.open("again.webp", vec![], vec![], &mut out));
    }

    #[test]
    fn load_after_close_is_ignored() {
        let mut out = Outbox::new();
        let mut v = opened(&mut out);
        v.close(vec![], &mut out);
        out.drain();
        v.image_loaded(Vec2::new(10.0, 10.0), &Viewport::new(100.0, 100.0, 10.0), jiggle, &mut out);
        assert!(out.is_empty());
        assert!(v.state().is_none());
    }
}
