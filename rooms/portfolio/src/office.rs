use room_engine::*;

/// Lobbie's archive room. Filing cabinet drawers glow instead of jiggling.
pub struct Office {
    config: RoomConfig,
}

impl Office {
    pub fn new(config: RoomConfig) -> Self {
        Self { config }
    }
}

impl RoomScript for Office {
    fn config(&self) -> &RoomConfig {
        &self.config
    }

    fn hotspot_visual(&self, spec: &ObjectSpec) -> HotspotVisual {
        HotspotVisual {
            src: format!("{}/{}", self.config.hotspot_dir(), spec.file),
            style: HotspotStyle::Glow,
        }
    }
}
