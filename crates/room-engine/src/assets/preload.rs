//! Critical-image preloading.
//!
//! The room stays hidden until every critical image has reported load or
//! error, or until the preload timeout elapses, whichever comes first.

use regex_lite::Regex;

use crate::api::command::{Outbox, UiCommand};
use crate::config::RoomConfig;

/// Images a room needs before it is revealed: both character sprites, plus
/// whatever scene/background images the page declares.
pub fn critical_images(config: &RoomConfig, discovered: &[String]) -> Vec<String> {
    let mut images = vec![config.static_sprite.clone(), config.walking_sprite.clone()];
    for src in discovered {
        if !images.contains(src) {
            images.push(src.clone());
        }
    }
    images
}

/// Extract the first URL from a computed `background-image` value.
pub fn css_background_url(value: &str) -> Option<String> {
    if value.is_empty() || value == "none" {
        return None;
    }
    let re = Regex::new(r#"url\(["']?([^"')]+)["']?\)"#).ok()?;
    re.captures(value)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PreloadPhase {
    Idle,
    Waiting { pending: usize },
    Resolved,
}

pub struct Preloader {
    phase: PreloadPhase,
}

impl Preloader {
    pub fn new() -> Self {
        Self {
            phase: PreloadPhase::Idle,
        }
    }

    /// Start loading. Empty sources count as already settled.
    /// Returns true if there was nothing to wait for.
    pub fn begin(&mut self, images: Vec<String>, out: &mut Outbox) -> bool {
        let to_load: Vec<String> = images.into_iter().filter(|s| !s.is_empty()).collect();
        if to_load.is_empty() {
            self.phase = PreloadPhase::Resolved;
            return true;
        }
        log::debug!("preloading {} critical images", to_load.len());
        self.phase = PreloadPhase::Waiting {
            pending: to_load.len(),
        };
        out.push(UiCommand::Preload(to_load));
        false
    }

    /// One image loaded or failed. Returns true when this completes the set.
    pub fn settle(&mut self) -> bool {
        match self.phase {
            PreloadPhase::Waiting { pending } if pending <= 1 => {
                self.phase = PreloadPhase::Resolved;
                true
            }
            PreloadPhase::Waiting { pending } => {
                self.phase = PreloadPhase::Waiting {
                    pending: pending - 1,
                };
                false
            }
            _ => false,
        }
    }

    /// The timeout fired. Returns true if that is what resolved the preload.
    pub fn expire(&mut self) -> bool {
        if let PreloadPhase::Waiting { pending } = self.phase {
            log::info!("Asset loading timeout ({pending} pending), showing room anyway");
            self.phase = PreloadPhase::Resolved;
            return true;
        }
        false
    }

    pub fn is_resolved(&self) -> bool {
        self.phase == PreloadPhase::Resolved
    }
}

impl Default for Preloader {
    fn default() -> Self {
        Self::new()
    }
}
