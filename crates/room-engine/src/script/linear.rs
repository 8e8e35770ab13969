use super::{Prompt, Script, Step, NEXT_LABEL};
use crate::api::room::RoomContext;
use crate::config::{DialogueLine, RoomConfig};
use crate::systems::dialogue::Answer;

/// Plays lines in order. Every button reads "Next" except the last one.
pub struct LinearScript {
    lines: Vec<DialogueLine>,
    next: usize,
    last_button: String,
}

impl LinearScript {
    pub fn new(lines: Vec<DialogueLine>, last_button: impl Into<String>) -> Self {
        Self {
            lines,
            next: 0,
            last_button: last_button.into(),
        }
    }

    /// The room's configured character dialogue.
    pub fn conversation(config: &RoomConfig, last_button: impl Into<String>) -> Self {
        Self::new(config.character_dialogue.clone(), last_button)
    }

    /// A single message with one acknowledging button.
    pub fn message(text: impl Into<String>, button: impl Into<String>) -> Self {
        Self::new(
            vec![DialogueLine {
                text: text.into(),
                audio: None,
                choices: Vec::new(),
            }],
            button,
        )
    }
}

impl Script for LinearScript {
    fn step(&mut self, _answer: Option<Answer>, _ctx: &mut RoomContext<'_>) -> Step {
        let Some(line) = self.lines.get(self.next) else {
            return Step::Finish;
        };
        self.next += 1;

        if !line.choices.is_empty() {
            return Step::Show(Prompt::Choice {
                text: line.text.clone(),
                options: line.choices.clone(),
                audio: line.audio.clone(),
            });
        }
        let button = if self.next == self.lines.len() {
            self.last_button.as_str()
        } else {
            NEXT_LABEL
        };
        Step::Show(Prompt::line(line.text.as_str(), line.audio.as_deref(), button))
    }
}
