//! Room configuration.
//!
//! Each room ships a JSON document describing its character, patrol tuning,
//! audio, dialogue, navigation and clickable objects. It is parsed once at
//! start-up and never mutated afterwards.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Element id of the background music track.
pub const BGM_ELEMENT: &str = "bgm";
/// Background music volume.
pub const BGM_VOLUME: f32 = 0.05;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("room config is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("room config field `{0}` must not be empty")]
    Empty(&'static str),
    #[error("patrol.{field} = {value} is outside [0, 1]")]
    PatrolFraction { field: &'static str, value: f32 },
    #[error("object handler `{0}` has no matching entry in `objects`")]
    UnknownObject(String),
    #[error("unknown room `{0}`")]
    UnknownRoom(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomConfig {
    /// Prefix of the `<room>-view` and `<room>-scene` element ids.
    pub room_name: String,
    /// Element id of the character sprite.
    pub character_name: String,
    #[serde(default = "default_padding")]
    pub character_padding: String,
    #[serde(default = "default_z_index")]
    pub character_z_index: String,
    /// Idle sprite, shown while talking or stopped.
    pub static_sprite: String,
    /// Looping walk animation.
    pub walking_sprite: String,
    #[serde(default = "default_voice_volume")]
    pub character_audio_volume: f32,
    pub patrol: PatrolTuning,
    /// Voice-line key → audio element id.
    #[serde(default)]
    pub character_audio: BTreeMap<String, String>,
    /// Room sound key → audio element id.
    #[serde(default)]
    pub additional_audio: BTreeMap<String, String>,
    #[serde(default)]
    pub additional_audio_volumes: BTreeMap<String, f32>,
    #[serde(default)]
    pub character_dialogue: Vec<DialogueLine>,
    pub navigation: Navigation,
    /// Element ids of clickable room objects.
    #[serde(default)]
    pub objects: Vec<String>,
    #[serde(default)]
    pub object_handlers: HashMap<String, ObjectHandler>,
    /// Markup shown by the help control.
    pub help_message: String,
    /// Directory holding hotspot images. Defaults to `sprites/objects/<room>objects`.
    #[serde(default)]
    pub hotspot_dir: Option<String>,
    #[serde(default)]
    pub timing: Timing,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatrolTuning {
    /// Walking speed as a fraction of the view width per second.
    pub speed_pct: f32,
    /// Distance from the view bottom as a fraction of the view height.
    pub base_offset_ratio: f32,
    pub left_boundary_pct: f32,
    pub right_boundary_pct: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DialogueLine {
    pub text: String,
    #[serde(default)]
    pub audio: Option<String>,
    #[serde(default)]
    pub choices: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Navigation {
    pub left: String,
    pub right: String,
}

/// A hotspot on a close-up image, in the image's native pixel space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectSpec {
    pub name: String,
    pub file: String,
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
    #[serde(default)]
    pub pages: Vec<String>,
    /// Room-specific behaviour tag (e.g. the lab's talking skull).
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
}

/// What clicking a room object does.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ObjectHandler {
    /// Open a close-up with hotspots.
    Viewer {
        closeup: String,
        hotspots: Vec<ObjectSpec>,
    },
    /// Page through text in the dialogue box.
    Pages { title: String, pages: Vec<String> },
    /// Ask before opening an external link.
    Confirm { prompt: String, url: String },
}

/// Empirically tuned delays, kept configurable.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Timing {
    pub double_click_ms: f64,
    pub hover_scale_delay_ms: f64,
    pub jiggle_restart_ms: f64,
    pub reveal_delay_ms: f64,
    pub preload_timeout_ms: f64,
    pub patrol_retry_ms: f64,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            double_click_ms: 50.0,
            hover_scale_delay_ms: 20.0,
            jiggle_restart_ms: 50.0,
            reveal_delay_ms: 50.0,
            preload_timeout_ms: 1500.0,
            patrol_retry_ms: 50.0,
        }
    }
}

fn default_padding() -> String {
    "8px".to_string()
}

fn default_z_index() -> String {
    "2".to_string()
}

fn default_voice_volume() -> f32 {
    0.7
}

impl RoomConfig {
    /// Parse and validate a room config from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: RoomConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let required = [
            ("roomName", &self.room_name),
            ("characterName", &self.character_name),
            ("staticSprite", &self.static_sprite),
            ("walkingSprite", &self.walking_sprite),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(ConfigError::Empty(field));
            }
        }

        let fractions = [
            ("leftBoundaryPct", self.patrol.left_boundary_pct),
            ("rightBoundaryPct", self.patrol.right_boundary_pct),
            ("baseOffsetRatio", self.patrol.base_offset_ratio),
            ("speedPct", self.patrol.speed_pct),
        ];
        for (field, value) in fractions {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::PatrolFraction { field, value });
            }
        }

        for id in self.object_handlers.keys() {
            if !self.objects.contains(id) {
                return Err(ConfigError::UnknownObject(id.clone()));
            }
        }
        Ok(())
    }

    pub fn view_id(&self) -> String {
        format!("{}-view", self.room_name)
    }

    pub fn scene_id(&self) -> String {
        format!("{}-scene", self.room_name)
    }

    /// Resolve a voice-line or room-sound key to its audio element id.
    pub fn audio_element(&self, key: &str) -> Option<&str> {
        self.character_audio
            .get(key)
            .or_else(|| self.additional_audio.get(key))
            .map(String::as_str)
    }

    /// Every key the dialogue engine may play, mapped to its element id.
    pub fn audio_map(&self) -> BTreeMap<String, String> {
        let mut map = self.additional_audio.clone();
        map.extend(
            self.character_audio
                .iter()
                .map(|(k, v)| (k.clone(), v.clone())),
        );
        map
    }

    pub fn hotspot_dir(&self) -> String {
        self.hotspot_dir
            .clone()
            .unwrap_or_else(|| format!("sprites/objects/{}objects", self.room_name))
    }

    /// Elements that get blurred while a close-up is open.
    pub fn blur_targets(&self) -> Vec<String> {
        let mut ids = Vec::with_capacity(self.objects.len() + 2);
        ids.push(self.scene_id());
        ids.push(self.character_name.clone());
        ids.extend(self.objects.iter().cloned());
        ids
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) const MINIMAL: &str = r#"{
        "roomName": "classroom",
        "characterName": "marty",
        "staticSprite": "sprites/characters/marty.webp",
        "walkingSprite": "gif/characters/martywalk.gif",
        "patrol": {
            "speedPct": 0.13,
            "baseOffsetRatio": 0.0909,
            "leftBoundaryPct": 0.001,
            "rightBoundaryPct": 0.2
        },
        "characterAudio": { "m1": "marty1", "m2": "marty2", "m3": "marty3" },
        "characterDialogue": [
            { "text": "Hey there.", "audio": "m1" },
            { "text": "Welcome.", "audio": "m2" },
            { "text": "Bye.", "audio": "m3" }
        ],
        "navigation": { "left": "comms.html", "right": "lab.html" },
        "objects": ["bookshelf", "drawer"],
        "objectHandlers": {
            "drawer": {
                "kind": "viewer",
                "closeup": "sprites/objects/classroomobjects/drawerclose.webp",
                "hotspots": [
                    { "name": "Paper", "file": "paper.webp", "x": 68, "y": 30, "w": 98, "h": 95,
                      "pages": ["Transcript"] }
                ]
            }
        },
        "helpMessage": "<strong>Help</strong>"
    }"#;

    #[test]
    fn parse_minimal_config_applies_defaults() {
        let config = RoomConfig::from_json(MINIMAL).unwrap();
        assert_eq!(config.character_padding, "8px");
        assert_eq!(config.character_z_index, "2");
        assert_eq!(config.character_audio_volume, 0.7);
        assert_eq!(config.timing, Timing::default());
        assert_eq!(config.view_id(), "classroom-view");
        assert_eq!(config.hotspot_dir(), "sprites/objects/classroomobjects");
        match &config.object_handlers["drawer"] {
            ObjectHandler::Viewer { hotspots, .. } => {
                assert_eq!(hotspots[0].x, 68.0);
                assert_eq!(hotspots[0].kind, None);
            }
            other => panic!("unexpected handler {other:?}"),
        }
    }

    #[test]
    fn rejects_handler_for_undeclared_object() {
        let json = MINIMAL.replace(r#""objects": ["bookshelf", "drawer"]"#, r#""objects": ["bookshelf"]"#);
        let err = RoomConfig::from_json(&json).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownObject(id) if id == "drawer"));
    }

    #[test]
    fn rejects_out_of_range_boundary() {
        let json = MINIMAL.replace(r#""rightBoundaryPct": 0.2"#, r#""rightBoundaryPct": 1.5"#);
        let err = RoomConfig::from_json(&json).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::PatrolFraction { field: "rightBoundaryPct", .. }
        ));
    }

    #[test]
    fn audio_keys_resolve_across_voice_and_room_sounds() {
        let mut config = RoomConfig::from_json(MINIMAL).unwrap();
        config
            .additional_audio
            .insert("glass".to_string(), "glass".to_string());
        assert_eq!(config.audio_element("m2"), Some("marty2"));
        assert_eq!(config.audio_element("glass"), Some("glass"));
        assert_eq!(config.audio_element("nope"), None);
        assert_eq!(config.audio_map().len(), 4);
    }

    #[test]
    fn blur_targets_cover_scene_character_and_objects() {
        let config = RoomConfig::from_json(MINIMAL).unwrap();
        assert_eq!(
            config.blur_targets(),
            vec!["classroom-scene", "marty", "bookshelf", "drawer"]
        );
    }
}
