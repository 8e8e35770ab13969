//! Character patrol.
//!
//! The character walks left and right between two boundaries expressed as
//! fractions of the view width. Position is kept both as pixels (`x`) and as
//! a resolution-independent ratio of the walkable width (`pos_ratio`), so the
//! character keeps its relative place across resizes.

use crate::api::types::{Facing, Placement, Viewport};
use crate::config::PatrolTuning;

/// Walkable range for the current view size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PatrolBounds {
    /// Smallest allowed `x`.
    pub left: f32,
    /// Largest allowed `x` (`max_x - right boundary`, never below `left`).
    pub right: f32,
    /// View width minus container width.
    pub max_x: f32,
    /// Container `bottom` offset.
    pub bottom: f32,
}

impl PatrolBounds {
    pub fn compute(tuning: &PatrolTuning, viewport: &Viewport) -> Self {
        let width = viewport.width();
        let max_x = width - viewport.container_width;
        let left = width * tuning.left_boundary_pct;
        let right = (max_x - width * tuning.right_boundary_pct).max(left);
        Self {
            left,
            right,
            max_x,
            bottom: viewport.height() * tuning.base_offset_ratio,
        }
    }

    pub fn clamp(&self, x: f32) -> f32 {
        x.min(self.right).max(self.left)
    }

    fn ratio(&self, x: f32) -> f32 {
        if self.max_x > 0.0 {
            x / self.max_x
        } else {
            0.0
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PatrolSnapshot {
    pub x: f32,
    pub dir: Facing,
    pub pos_ratio: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PatrolState {
    pub active: bool,
    pub x: f32,
    pub dir: Facing,
    pub pos_ratio: f32,
    pub saved: PatrolSnapshot,
}

impl Default for PatrolState {
    fn default() -> Self {
        Self {
            active: true,
            x: 0.0,
            dir: Facing::Right,
            pos_ratio: 0.0,
            saved: PatrolSnapshot::default(),
        }
    }
}

pub struct Patrol {
    tuning: PatrolTuning,
    state: PatrolState,
    hovered: bool,
}

impl Patrol {
    pub fn new(tuning: PatrolTuning) -> Self {
        Self {
            tuning,
            state: PatrolState::default(),
            hovered: false,
        }
    }

    pub fn state(&self) -> &PatrolState {
        &self.state
    }

    pub fn is_active(&self) -> bool {
        self.state.active
    }

    pub fn is_hovered(&self) -> bool {
        self.hovered
    }

    pub fn set_hovered(&mut self, hovered: bool) {
        self.hovered = hovered;
    }

    pub fn bounds(&self, viewport: &Viewport) -> PatrolBounds {
        PatrolBounds::compute(&self.tuning, viewport)
    }

    /// Put the character at the left boundary, facing right.
    pub fn place_initially(&mut self, viewport: &Viewport) -> Placement {
        let bounds = self.bounds(viewport);
        self.state.x = bounds.left;
        self.state.pos_ratio = bounds.ratio(bounds.left);
        self.state.dir = Facing::Right;
        Placement {
            left: self.state.x,
            bottom: bounds.bottom,
            facing: Facing::Right,
        }
    }

    /// Activate and clamp the current position into the walkable range.
    pub fn start(&mut self, viewport: &Viewport) {
        let bounds = self.bounds(viewport);
        self.state.active = true;
        if self.state.x == 0.0 {
            self.state.x = self.state.pos_ratio * bounds.max_x;
        }
        self.state.x = bounds.clamp(self.state.x);
    }

    pub fn stop(&mut self) {
        self.state.active = false;
    }

    /// Advance one frame. Returns the new placement, or `None` when the
    /// patrol is stopped or frozen under the pointer.
    pub fn update_position(&mut self, dt: f32, viewport: &Viewport) -> Option<Placement> {
        if !self.state.active || self.hovered {
            return None;
        }
        let bounds = self.bounds(viewport);
        let speed = viewport.width() * self.tuning.speed_pct;
        self.state.x += self.state.dir.sign() * speed * dt;

        if self.state.x >= bounds.right {
            self.state.x = bounds.right;
            self.state.dir = Facing::Left;
        } else if self.state.x <= bounds.left {
            self.state.x = bounds.left;
            self.state.dir = Facing::Right;
        }
        self.state.pos_ratio = bounds.ratio(self.state.x);

        Some(Placement {
            left: self.state.x,
            bottom: bounds.bottom,
            facing: self.state.dir,
        })
    }

    /// Where a stopped character should sit after the view changed size.
    pub fn reposition_for_resize(&self, viewport: &Viewport) -> (f32, f32) {
        let bounds = self.bounds(viewport);
        (bounds.clamp(self.state.pos_ratio * bounds.max_x), bounds.bottom)
    }

    pub fn save_snapshot(&mut self) {
        self.state.saved = PatrolSnapshot {
            x: self.state.x,
            dir: self.state.dir,
            pos_ratio: self.state.pos_ratio,
        };
    }

    pub fn restore_snapshot(&mut self) {
        let saved = self.state.saved;
        self.state.x = saved.x;
        self.state.dir = saved.dir;
        self.state.pos_ratio = saved.pos_ratio;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tuning() -> PatrolTuning {
        PatrolTuning {
            speed_pct: 0.13,
            base_offset_ratio: 16.0 / 176.0,
            left_boundary_pct: 0.001,
            right_boundary_pct: 0.2,
        }
    }

    fn view() -> Viewport {
        Viewport::new(1000.0, 500.0, 100.0)
    }

    #[test]
    fn bounds_for_reference_layout() {
        let b = PatrolBounds::compute(&tuning(), &view());
        assert_eq!(b.max_x, 900.0);
        assert!((b.left - 1.0).abs() < 1e-4);
        assert!((b.right - 700.0).abs() < 1e-4);
    }

    #[test]
    fn never_exceeds_bounds_and_flips_at_them() {
        let mut p = Patrol::new(tuning());
        let vp = view();
        p.place_initially(&vp);
        p.start(&vp);
        let bounds = p.bounds(&vp);
        let mut prev_dir = p.state().dir;
        let mut flips = 0;
        for _ in 0..2000 {
            let placed = p.update_position(1.0 / 30.0, &vp).unwrap();
            let x = p.state().x;
            assert!(x >= bounds.left && x <= bounds.right, "x={x}");
            assert!(x <= 700.0 + 1e-3);
            if p.state().dir != prev_dir {
                flips += 1;
                let at_bound = (x - bounds.left).abs() < 1e-3 || (x - bounds.right).abs() < 1e-3;
                assert!(at_bound, "flipped away from a bound at x={x}");
                prev_dir = p.state().dir;
            }
            assert_eq!(placed.facing, p.state().dir);
        }
        assert!(flips > 2);
    }

    #[test]
    fn reaching_right_bound_turns_left() {
        let mut p = Patrol::new(tuning());
        let vp = view();
        p.place_initially(&vp);
        p.start(&vp);
        // one huge step overshoots; it must clamp exactly onto the bound
        let placed = p.update_position(100.0, &vp).unwrap();
        assert!((placed.left - 700.0).abs() < 1e-3);
        assert_eq!(placed.facing, Facing::Left);
        assert!((p.state().pos_ratio - 700.0 / 900.0).abs() < 1e-4);
    }

    #[test]
    fn hover_freezes_position() {
        let mut p = Patrol::new(tuning());
        let vp = view();
        p.place_initially(&vp);
        p.start(&vp);
        p.update_position(0.1, &vp);
        let x = p.state().x;
        p.set_hovered(true);
        for _ in 0..10 {
            assert!(p.update_position(0.1, &vp).is_none());
            assert_eq!(p.state().x, x);
        }
        p.set_hovered(false);
        p.update_position(0.1, &vp);
        assert!(p.state().x > x);
    }

    #[test]
    fn stopped_patrol_does_not_move() {
        let mut p = Patrol::new(tuning());
        let vp = view();
        p.place_initially(&vp);
        p.stop();
        assert!(p.update_position(0.5, &vp).is_none());
    }

    #[test]
    fn start_recovers_position_from_ratio_and_clamps() {
        let mut p = Patrol::new(tuning());
        let vp = view();
        p.place_initially(&vp);
        p.start(&vp);
        p.update_position(2.0, &vp); // 260px to the right
        let ratio = p.state().pos_ratio;

        // view shrinks: x is stale, start clamps it into the new range
        let small = Viewport::new(500.0, 250.0, 100.0);
        p.start(&small);
        let b = p.bounds(&small);
        assert!(p.state().x <= b.right);
        assert!(ratio > 0.0);

        let (x, bottom) = p.reposition_for_resize(&small);
        assert!(x >= b.left && x <= b.right);
        assert!((bottom - 250.0 * 16.0 / 176.0).abs() < 1e-3);
    }

    #[test]
    fn narrow_view_collapses_range_to_left_bound() {
        let mut p = Patrol::new(tuning());
        let vp = Viewport::new(100.0, 100.0, 95.0);
        p.place_initially(&vp);
        p.start(&vp);
        p.update_position(1.0, &vp);
        let b = p.bounds(&vp);
        assert_eq!(b.right, b.left);
        assert_eq!(p.state().x, b.left);
    }

    #[test]
    fn snapshot_round_trip() {
        let mut p = Patrol::new(tuning());
        let vp = view();
        p.place_initially(&vp);
        p.start(&vp);
        p.update_position(1.0, &vp);
        p.save_snapshot();
        let before = *p.state();
        p.update_position(1.0, &vp);
        p.restore_snapshot();
        assert_eq!(p.state().x, before.x);
        assert_eq!(p.state().dir, before.dir);
        assert_eq!(p.state().pos_ratio, before.pos_ratio);
    }
}
