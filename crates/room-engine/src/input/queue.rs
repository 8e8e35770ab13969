use crate::api::types::{ClickTarget, Viewport};

/// Input events the room engine understands.
/// The bridge translates DOM events into these; nothing here is DOM-specific.
#[derive(Debug, Clone, PartialEq)]
pub enum RoomInput {
    /// A click on `target`. `at_ms` is the event timestamp, used for
    /// fast double-click suppression.
    Click { target: ClickTarget, at_ms: f64 },
    /// Pointer entered/left the character's container.
    CharacterHover(bool),
    /// Pointer entered/left a close-up hotspot.
    HotspotHover { index: usize, hovered: bool },
    /// One preloaded image finished, successfully or not.
    AssetSettled,
    /// Window was resized; carries the freshly measured view.
    Resize(Viewport),
    /// The open close-up image finished loading with these natural dimensions.
    CloseupLoaded { width: f32, height: f32 },
    CloseupFailed,
    /// An audio element reached its end.
    AudioEnded { element: String },
}

/// A queue of input events.
/// DOM listeners push into the queue; the controller drains it every frame.
pub struct InputQueue {
    events: Vec<RoomInput>,
}

impl InputQueue {
    pub fn new() -> Self {
        Self {
            events: Vec::with_capacity(16),
        }
    }

    pub fn push(&mut self, event: RoomInput) {
        self.events.push(event);
    }

    /// Drain all pending events. Returns a Vec and clears the queue.
    pub fn drain(&mut self) -> Vec<RoomInput> {
        std::mem::take(&mut self.events)
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }
}

impl Default for InputQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::Control;

    #[test]
    fn push_and_drain() {
        let mut q = InputQueue::new();
        q.push(RoomInput::Click {
            target: ClickTarget::Control(Control::Help),
            at_ms: 10.0,
        });
        q.push(RoomInput::AssetSettled);
        assert_eq!(q.len(), 2);
        let events = q.drain();
        assert_eq!(events.len(), 2);
        assert!(q.is_empty());
        assert_eq!(events[1], RoomInput::AssetSettled);
    }
}
