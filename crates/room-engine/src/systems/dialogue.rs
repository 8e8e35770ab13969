//! Dialogue box state machine.
//!
//! Exactly one line or choice is on screen at a time. Each one is tagged
//! with a fresh [`PromptId`]; a button click advances the machine only if it
//! carries the id of the prompt currently shown. Showing anything new always
//! stops the running voice line and clears the old buttons first.

use std::collections::BTreeMap;

use crate::api::command::{Outbox, UiCommand};
use crate::api::types::PromptId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogueState {
    /// Box may be showing static markup, but nothing waits for a click.
    Idle,
    ShowingLine { prompt: PromptId },
    ShowingChoice { prompt: PromptId, options: usize },
    /// Box hidden.
    Closed,
    /// Interrupted mid-prompt; box hidden.
    Cancelled,
}

/// How a prompt was acknowledged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Answer {
    /// The single button of a line.
    Acknowledged,
    /// Index of the clicked option, in the order the options were given.
    Chose(usize),
}

pub struct DialogueEngine {
    state: DialogueState,
    next_prompt: u32,
    buttons: usize,
    visible: bool,
    /// Audio element id of the voice line currently playing.
    current_audio: Option<String>,
    /// Audio key → element id.
    audio: BTreeMap<String, String>,
}

impl DialogueEngine {
    pub fn new(audio: BTreeMap<String, String>) -> Self {
        Self {
            state: DialogueState::Closed,
            next_prompt: 1,
            buttons: 0,
            visible: false,
            current_audio: None,
            audio,
        }
    }

    pub fn state(&self) -> &DialogueState {
        &self.state
    }

    pub fn button_count(&self) -> usize {
        self.buttons
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn current_audio(&self) -> Option<&str> {
        self.current_audio.as_deref()
    }

    pub fn is_waiting(&self) -> bool {
        matches!(
            self.state,
            DialogueState::ShowingLine { .. } | DialogueState::ShowingChoice { .. }
        )
    }

    /// Remove every button.
    pub fn clear(&mut self, out: &mut Outbox) {
        self.buttons = 0;
        out.push(UiCommand::ClearButtons);
    }

    /// Put markup in the box and make it visible.
    pub fn show(&mut self, html: &str, out: &mut Outbox) {
        self.visible = true;
        out.push(UiCommand::ShowDialogue {
            html: html.to_string(),
        });
    }

    pub fn hide(&mut self, out: &mut Outbox) {
        self.visible = false;
        if !matches!(self.state, DialogueState::Cancelled) {
            self.state = DialogueState::Closed;
        }
        out.push(UiCommand::HideDialogue);
    }

    /// Pause and rewind the voice line, if any.
    pub fn stop_current_audio(&mut self, out: &mut Outbox) {
        if let Some(element) = self.current_audio.take() {
            out.push(UiCommand::StopAudio { element });
        }
    }

    pub fn show_line(
        &mut self,
        text: &str,
        audio_key: Option<&str>,
        button: &str,
        out: &mut Outbox,
    ) -> PromptId {
        let prompt = self.begin_prompt(text, out);
        self.add_button(prompt, 0, button, out);
        self.play_voice(audio_key, out);
        self.state = DialogueState::ShowingLine { prompt };
        prompt
    }

    pub fn show_choice(
        &mut self,
        text: &str,
        options: &[String],
        audio_key: Option<&str>,
        out: &mut Outbox,
    ) -> PromptId {
        let prompt = self.begin_prompt(text, out);
        self.play_voice(audio_key, out);
        for (index, label) in options.iter().enumerate() {
            self.add_button(prompt, index, label, out);
        }
        self.state = DialogueState::ShowingChoice {
            prompt,
            options: options.len(),
        };
        prompt
    }

    /// Handle a button click. Returns the answer if it belongs to the
    /// prompt on screen; stale or out-of-range clicks yield `None`.
    pub fn advance(&mut self, prompt: PromptId, index: usize, out: &mut Outbox) -> Option<Answer> {
        let answer = match self.state {
            DialogueState::ShowingLine { prompt: current } if current == prompt && index == 0 => {
                Answer::Acknowledged
            }
            DialogueState::ShowingChoice {
                prompt: current,
                options,
            } if current == prompt && index < options => Answer::Chose(index),
            _ => {
                log::debug!("ignoring click on stale prompt {prompt:?}");
                return None;
            }
        };
        self.stop_current_audio(out);
        self.state = DialogueState::Idle;
        Some(answer)
    }

    /// Abort whatever is on screen: stop audio, drop buttons, hide.
    pub fn cancel(&mut self, out: &mut Outbox) {
        self.stop_current_audio(out);
        self.clear(out);
        self.state = DialogueState::Cancelled;
        self.hide(out);
    }

    fn begin_prompt(&mut self, text: &str, out: &mut Outbox) -> PromptId {
        self.stop_current_audio(out);
        self.clear(out);
        self.show(text, out);
        let prompt = PromptId(self.next_prompt);
        self.next_prompt = self.next_prompt.wrapping_add(1);
        prompt
    }

    fn add_button(&mut self, prompt: PromptId, index: usize, label: &str, out: &mut Outbox) {
        self.buttons += 1;
        out.push(UiCommand::AddButton {
            prompt,
            index,
            label: label.to_string(),
        });
    }

    fn play_voice(&mut self, audio_key: Option<&str>, out: &mut Outbox) {
        let Some(key) = audio_key else {
            return;
        };
        match self.audio.get(key) {
            Some(element) => {
                self.current_audio = Some(element.clone());
                out.push(UiCommand::PlayAudio {
                    element: element.clone(),
                });
            }
            None => log::debug!("no audio element for key `{key}`"),
        }
    }
}
