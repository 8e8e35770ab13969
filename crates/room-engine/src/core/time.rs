use std::collections::HashMap;

use crate::api::types::ClickTarget;

/// Delayed actions the controller arms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKind {
    /// Reveal the room even if some critical images never reported back.
    PreloadTimeout,
    /// Let layout settle, then show the character and start the patrol.
    RevealCharacter,
    /// Patrol was asked to start before assets were ready.
    PatrolRetry,
    /// Apply the hover zoom if the pointer is still over the character.
    HoverScale,
    /// Restart a hotspot's idle animation after the pointer left it.
    HotspotAnimation(usize),
}

/// Millisecond timer wheel advanced by frame deltas.
/// Re-arming a kind replaces the pending one, like clearTimeout + setTimeout.
pub struct Scheduler {
    now_ms: f64,
    timers: Vec<(f64, TimerKind)>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self {
            now_ms: 0.0,
            timers: Vec::new(),
        }
    }

    /// Current engine time in milliseconds.
    pub fn now_ms(&self) -> f64 {
        self.now_ms
    }

    /// Advance the clock by a frame delta in seconds.
    pub fn advance(&mut self, dt: f32) {
        self.now_ms += f64::from(dt.max(0.0)) * 1000.0;
    }

    pub fn schedule(&mut self, kind: TimerKind, delay_ms: f64) {
        self.cancel(kind);
        self.timers.push((self.now_ms + delay_ms.max(0.0), kind));
    }

    pub fn cancel(&mut self, kind: TimerKind) {
        self.timers.retain(|(_, k)| *k != kind);
    }

    pub fn is_pending(&self, kind: TimerKind) -> bool {
        self.timers.iter().any(|(_, k)| *k == kind)
    }

    /// Remove and return every timer whose deadline has passed, earliest first.
    pub fn drain_due(&mut self) -> Vec<TimerKind> {
        let now = self.now_ms;
        let mut due: Vec<(f64, TimerKind)> = Vec::new();
        self.timers.retain(|&(at, kind)| {
            if at <= now {
                due.push((at, kind));
                false
            } else {
                true
            }
        });
        due.sort_by(|a, b| a.0.total_cmp(&b.0));
        due.into_iter().map(|(_, kind)| kind).collect()
    }

    pub fn clear(&mut self) {
        self.timers.clear();
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

/// Drops a second click on the same target that lands inside the window.
pub struct ClickFilter {
    window_ms: f64,
    last: HashMap<ClickTarget, f64>,
}

impl ClickFilter {
    pub fn new(window_ms: f64) -> Self {
        Self {
            window_ms,
            last: HashMap::new(),
        }
    }

    /// Returns true if the click should be handled.
    pub fn accept(&mut self, target: &ClickTarget, at_ms: f64) -> bool {
        if let Some(&prev) = self.last.get(target) {
            if at_ms - prev < self.window_ms {
                return false;
            }
        }
        self.last.insert(target.clone(), at_ms);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::Control;

    #[test]
    fn timer_fires_after_delay() {
        let mut s = Scheduler::new();
        s.schedule(TimerKind::RevealCharacter, 50.0);
        s.advance(0.030);
        assert!(s.drain_due().is_empty());
        s.advance(0.030);
        assert_eq!(s.drain_due(), vec![TimerKind::RevealCharacter]);
        assert!(!s.is_pending(TimerKind::RevealCharacter));
    }

    #[test]
    fn rescheduling_replaces_pending_timer() {
        let mut s = Scheduler::new();
        s.schedule(TimerKind::HoverScale, 20.0);
        s.advance(0.015);
        s.schedule(TimerKind::HoverScale, 20.0);
        s.advance(0.010);
        assert!(s.drain_due().is_empty());
        s.advance(0.015);
        assert_eq!(s.drain_due(), vec![TimerKind::HoverScale]);
    }

    #[test]
    fn due_timers_come_out_in_deadline_order() {
        let mut s = Scheduler::new();
        s.schedule(TimerKind::PreloadTimeout, 40.0);
        s.schedule(TimerKind::PatrolRetry, 10.0);
        s.advance(0.1);
        assert_eq!(
            s.drain_due(),
            vec![TimerKind::PatrolRetry, TimerKind::PreloadTimeout]
        );
    }

    #[test]
    fn click_filter_drops_fast_repeat_only_for_same_target() {
        let mut f = ClickFilter::new(50.0);
        let help = ClickTarget::Control(Control::Help);
        assert!(f.accept(&help, 100.0));
        assert!(!f.accept(&help, 130.0));
        assert!(f.accept(&ClickTarget::Character, 130.0));
        assert!(f.accept(&help, 151.0));
    }
}
