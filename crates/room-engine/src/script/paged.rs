use super::markup::page_html;
use super::{Prompt, Script, Step, CLOSE_LABEL, NEXT_LABEL};
use crate::api::room::RoomContext;
use crate::config::ObjectSpec;
use crate::systems::dialogue::Answer;

/// Pages through an object's text. "Next" until the last page, then "Close".
/// Finishing resets to the first page.
pub struct PagedScript {
    title: String,
    pages: Vec<String>,
    page: usize,
    started: bool,
    /// Optional voice line per page.
    voices: Vec<Option<String>>,
    links: bool,
}

impl PagedScript {
    pub fn new(title: impl Into<String>, pages: Vec<String>) -> Self {
        Self {
            title: title.into(),
            pages,
            page: 0,
            started: false,
            voices: Vec::new(),
            links: false,
        }
    }

    pub fn for_object(spec: &ObjectSpec) -> Self {
        Self::new(spec.name.clone(), spec.pages.clone())
    }

    pub fn with_voices(mut self, voices: Vec<Option<String>>) -> Self {
        self.voices = voices;
        self
    }

    /// Render GitHub URLs as links.
    pub fn with_links(mut self) -> Self {
        self.links = true;
        self
    }

    pub fn page(&self) -> usize {
        self.page
    }
}

impl Script for PagedScript {
    fn step(&mut self, answer: Option<Answer>, _ctx: &mut RoomContext<'_>) -> Step {
        if self.started && answer.is_some() {
            self.page += 1;
        }
        self.started = true;

        let Some(text) = self.pages.get(self.page) else {
            self.page = 0;
            self.started = false;
            return Step::Finish;
        };
        let button = if self.page + 1 < self.pages.len() {
            NEXT_LABEL
        } else {
            CLOSE_LABEL
        };
        let voice = self.voices.get(self.page).cloned().flatten();
        Step::Show(Prompt::Line {
            text: page_html(&self.title, text, self.links),
            audio: voice,
            button: button.to_string(),
        })
    }
}
