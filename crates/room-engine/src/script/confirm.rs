use super::{Prompt, Script, Step};
use crate::api::room::RoomContext;
use crate::systems::dialogue::Answer;

/// Yes/No question; "Yes" opens `url` in a new tab.
pub struct ConfirmScript {
    prompt: String,
    url: String,
    asked: bool,
}

impl ConfirmScript {
    pub fn new(prompt: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            url: url.into(),
            asked: false,
        }
    }
}

impl Script for ConfirmScript {
    fn step(&mut self, answer: Option<Answer>, ctx: &mut RoomContext<'_>) -> Step {
        if !self.asked {
            self.asked = true;
            return Step::Show(Prompt::choice(self.prompt.as_str(), &["Yes", "No"], None));
        }
        if answer == Some(Answer::Chose(0)) {
            ctx.open_external(&self.url);
        }
        Step::Finish
    }
}
