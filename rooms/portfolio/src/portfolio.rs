use room_engine::*;

use crate::classroom::Classroom;
use crate::comms::Comms;
use crate::lab::Lab;
use crate::office::Office;

const CLASSROOM: &str = include_str!("../content/classroom.json");
const LAB: &str = include_str!("../content/lab.json");
const OFFICE: &str = include_str!("../content/office.json");
const COMMS: &str = include_str!("../content/comms.json");

/// The four rooms of the portfolio. One wasm module serves every page; the
/// page names its room when it starts the runner.
pub enum Portfolio {
    Classroom(Classroom),
    Lab(Lab),
    Office(Office),
    Comms(Comms),
}

impl Portfolio {
    pub fn load(name: &str) -> Result<Self, ConfigError> {
        let room = match name {
            "classroom" => Portfolio::Classroom(Classroom::new(RoomConfig::from_json(CLASSROOM)?)),
            "lab" => Portfolio::Lab(Lab::new(RoomConfig::from_json(LAB)?)),
            "office" => Portfolio::Office(Office::new(RoomConfig::from_json(OFFICE)?)),
            "comms" => Portfolio::Comms(Comms::new(RoomConfig::from_json(COMMS)?)),
            other => return Err(ConfigError::UnknownRoom(other.to_string())),
        };
        Ok(room)
    }

    fn inner(&self) -> &dyn RoomScript {
        match self {
            Portfolio::Classroom(r) => r,
            Portfolio::Lab(r) => r,
            Portfolio::Office(r) => r,
            Portfolio::Comms(r) => r,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn RoomScript {
        match self {
            Portfolio::Classroom(r) => r,
            Portfolio::Lab(r) => r,
            Portfolio::Office(r) => r,
            Portfolio::Comms(r) => r,
        }
    }
}

impl RoomScript for Portfolio {
    fn config(&self) -> &RoomConfig {
        self.inner().config()
    }

    fn conversation(&mut self) -> Box<dyn Script> {
        self.inner_mut().conversation()
    }

    fn on_object(&mut self, id: &str, ctx: &mut RoomContext<'_>) -> Reaction {
        self.inner_mut().on_object(id, ctx)
    }

    fn is_any_special_interaction(&self) -> bool {
        self.inner().is_any_special_interaction()
    }

    fn is_special_overlay_interaction(&self) -> bool {
        self.inner().is_special_overlay_interaction()
    }

    fn hotspot_visual(&self, spec: &ObjectSpec) -> HotspotVisual {
        self.inner().hotspot_visual(spec)
    }

    fn on_hotspot(&mut self, index: usize, spec: &ObjectSpec, ctx: &mut RoomContext<'_>) -> Reaction {
        self.inner_mut().on_hotspot(index, spec, ctx)
    }

    fn on_audio_ended(&mut self, element: &str, ctx: &mut RoomContext<'_>) -> Reaction {
        self.inner_mut().on_audio_ended(element, ctx)
    }

    fn on_script_finished(&mut self, tag: ScriptTag, ctx: &mut RoomContext<'_>) {
        self.inner_mut().on_script_finished(tag, ctx)
    }

    fn on_script_cancelled(&mut self, tag: ScriptTag, ctx: &mut RoomContext<'_>) {
        self.inner_mut().on_script_cancelled(tag, ctx)
    }

    fn on_overlay_close(&mut self, ctx: &mut RoomContext<'_>) {
        self.inner_mut().on_overlay_close(ctx)
    }
}
