use room_engine::*;

/// Mater's communications hub. Each screen asks before opening a contact
/// link; the handlers come straight from the room config.
pub struct Comms {
    config: RoomConfig,
}

impl Comms {
    pub fn new(config: RoomConfig) -> Self {
        Self { config }
    }
}

impl RoomScript for Comms {
    fn config(&self) -> &RoomConfig {
        &self.config
    }
}
