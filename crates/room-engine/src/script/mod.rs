//! Dialogue sequences.
//!
//! A script is a small state machine that the controller steps each time the
//! visitor answers the prompt on screen. The first step receives `None`;
//! every later step receives the answer to the prompt it returned last.

pub mod confirm;
pub mod linear;
pub mod markup;
pub mod paged;

pub use confirm::ConfirmScript;
pub use linear::LinearScript;
pub use paged::PagedScript;

use crate::api::room::RoomContext;
use crate::systems::dialogue::Answer;

pub const NEXT_LABEL: &str = "Next";
pub const CLOSE_LABEL: &str = "Close";
pub const EXIT_LABEL: &str = "Exit";

/// What to put in the dialogue box next.
#[derive(Debug, Clone, PartialEq)]
pub enum Prompt {
    Line {
        text: String,
        audio: Option<String>,
        button: String,
    },
    Choice {
        text: String,
        options: Vec<String>,
        audio: Option<String>,
    },
}

impl Prompt {
    pub fn line(text: impl Into<String>, audio: Option<&str>, button: impl Into<String>) -> Self {
        Prompt::Line {
            text: text.into(),
            audio: audio.map(str::to_string),
            button: button.into(),
        }
    }

    pub fn choice(text: impl Into<String>, options: &[&str], audio: Option<&str>) -> Self {
        Prompt::Choice {
            text: text.into(),
            options: options.iter().map(|o| o.to_string()).collect(),
            audio: audio.map(str::to_string),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    Show(Prompt),
    /// Sequence complete; the box is cleared and hidden.
    Finish,
}

pub trait Script {
    fn step(&mut self, answer: Option<Answer>, ctx: &mut RoomContext<'_>) -> Step;
}
