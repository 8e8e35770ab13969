use room_engine::*;

const DONE_LABEL: &str = "Done";

/// Hotspot `type` of the talking skull.
const BOB_KIND: &str = "bob";
const BOB_DIALOGUE: ScriptTag = ScriptTag::Special(1);
const BOB_VOICES: [&str; 3] = ["bob1", "bob2", "bob3"];
const GLASS: &str = "glass";

const SKULL: &str = "sprites/objects/labobjects/skull.webp";
const SKULL_WAKING: &str = "sprites/objects/labobjects/skullopen1.webp";
const SKULL_TALKING: &str = "sprites/objects/labobjects/skullopen2.webp";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum BobPhase {
    #[default]
    Asleep,
    /// Glass sound playing, eyes half open.
    Waking,
    Talking,
}

/// Tein's lab. One terminal hides BOB, a skull that wakes up with a glass
/// sound and talks once per visit before settling on a short summary.
pub struct Lab {
    config: RoomConfig,
    bob: BobPhase,
    bob_heard: bool,
    /// Hotspot index and spec of the skull in the open close-up.
    bob_spot: Option<(usize, ObjectSpec)>,
}

impl Lab {
    pub fn new(config: RoomConfig) -> Self {
        Self {
            config,
            bob: BobPhase::Asleep,
            bob_heard: false,
            bob_spot: None,
        }
    }

    fn bob_busy(&self) -> bool {
        self.bob != BobPhase::Asleep
    }

    /// Silence the skull and close its eyes.
    fn put_bob_to_sleep(&mut self, ctx: &mut RoomContext<'_>) {
        if !self.bob_busy() {
            return;
        }
        ctx.stop_sound(GLASS);
        for voice in BOB_VOICES {
            ctx.stop_sound(voice);
        }
        if let Some((index, _)) = &self.bob_spot {
            ctx.set_hotspot_image(*index, SKULL);
        }
        self.bob = BobPhase::Asleep;
        log::info!("BOB interrupted");
    }

    fn bob_script(spec: &ObjectSpec) -> PagedScript {
        let voices = (0..spec.pages.len())
            .map(|page| BOB_VOICES.get(page).map(|v| v.to_string()))
            .collect();
        PagedScript::for_object(spec).with_voices(voices).with_links()
    }

    /// Last page only, once the visitor has heard the whole speech.
    fn bob_summary(spec: &ObjectSpec) -> PagedScript {
        let last = spec.pages.last().cloned().into_iter().collect();
        PagedScript::new(spec.name.clone(), last).with_links()
    }
}

impl RoomScript for Lab {
    fn config(&self) -> &RoomConfig {
        &self.config
    }

    fn conversation(&mut self) -> Box<dyn Script> {
        Box::new(LinearScript::conversation(&self.config, DONE_LABEL))
    }

    fn is_any_special_interaction(&self) -> bool {
        self.bob_busy()
    }

    fn is_special_overlay_interaction(&self) -> bool {
        self.bob_busy()
    }

    fn on_hotspot(&mut self, index: usize, spec: &ObjectSpec, ctx: &mut RoomContext<'_>) -> Reaction {
        if spec.kind.as_deref() != Some(BOB_KIND) {
            self.put_bob_to_sleep(ctx);
            return Reaction::start(ScriptTag::Detail, PagedScript::for_object(spec));
        }
        if self.bob_busy() {
            return Reaction::None;
        }
        if self.bob_heard {
            return Reaction::start(ScriptTag::Detail, Self::bob_summary(spec));
        }

        self.bob = BobPhase::Waking;
        self.bob_spot = Some((index, spec.clone()));
        ctx.set_hotspot_image(index, SKULL_WAKING);
        ctx.play_sound(GLASS);
        Reaction::None
    }

    fn on_audio_ended(&mut self, element: &str, ctx: &mut RoomContext<'_>) -> Reaction {
        if self.bob != BobPhase::Waking || !ctx.is_sound(GLASS, element) {
            return Reaction::None;
        }
        let Some((index, spec)) = &self.bob_spot else {
            return Reaction::None;
        };
        self.bob = BobPhase::Talking;
        ctx.set_hotspot_image(*index, SKULL_TALKING);
        Reaction::start(BOB_DIALOGUE, Self::bob_script(spec))
    }

    fn on_script_finished(&mut self, tag: ScriptTag, ctx: &mut RoomContext<'_>) {
        if tag != BOB_DIALOGUE {
            return;
        }
        if let Some((index, _)) = &self.bob_spot {
            ctx.set_hotspot_image(*index, SKULL);
        }
        self.bob = BobPhase::Asleep;
        self.bob_heard = true;
    }

    fn on_script_cancelled(&mut self, tag: ScriptTag, ctx: &mut RoomContext<'_>) {
        if tag == BOB_DIALOGUE {
            self.put_bob_to_sleep(ctx);
        }
    }

    fn on_overlay_close(&mut self, ctx: &mut RoomContext<'_>) {
        self.put_bob_to_sleep(ctx);
        self.bob_spot = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::portfolio::tests::{click, dialogue_html, feed, labels, open_closeup, press, ready};

    const BOB: usize = 0;
    const LOG: usize = 1;

    fn glass_ended() -> RoomInput {
        RoomInput::AudioEnded {
            element: GLASS.into(),
        }
    }

    #[test]
    fn tein_signs_off_with_done() {
        let mut c = ready("lab");
        let mut cmds = click(&mut c, ClickTarget::Character, 100.0);
        for at in [200.0, 300.0] {
            assert_eq!(labels(&cmds), vec!["Next"]);
            cmds = press(&mut c, &cmds, 0, at);
        }
        assert_eq!(labels(&cmds), vec!["Done"]);
    }

    #[test]
    fn bob_wakes_then_talks_through_four_pages() {
        let mut c = ready("lab");
        open_closeup(&mut c, "terminal2", 100.0);

        let cmds = click(&mut c, ClickTarget::Hotspot(BOB), 200.0);
        assert!(cmds.contains(&UiCommand::SetHotspotImage {
            index: BOB,
            src: SKULL_WAKING.into()
        }));
        assert!(cmds.contains(&UiCommand::PlayAudio {
            element: "glass".into()
        }));
        assert!(dialogue_html(&cmds).is_none());

        // Busy: backdrop and character are ignored while the glass plays.
        let cmds = click(&mut c, ClickTarget::Backdrop, 300.0);
        assert!(!cmds.contains(&UiCommand::CloseOverlay));
        let cmds = click(&mut c, ClickTarget::Character, 400.0);
        assert!(dialogue_html(&cmds).is_none());

        let mut cmds = feed(&mut c, glass_ended());
        assert!(cmds.contains(&UiCommand::SetHotspotImage {
            index: BOB,
            src: SKULL_TALKING.into()
        }));
        let mut voices = Vec::new();
        for page in 0..4 {
            voices.push(cmds.iter().find_map(|cmd| match cmd {
                UiCommand::PlayAudio { element } => Some(element.clone()),
                _ => None,
            }));
            let expected = if page < 3 { "Next" } else { "Close" };
            assert_eq!(labels(&cmds), vec![expected]);
            cmds = press(&mut c, &cmds, 0, 500.0 + page as f64 * 100.0);
        }
        assert_eq!(
            voices,
            vec![
                Some("bob1".to_string()),
                Some("bob2".to_string()),
                Some("bob3".to_string()),
                None
            ]
        );
        assert!(cmds.contains(&UiCommand::SetHotspotImage {
            index: BOB,
            src: SKULL.into()
        }));
        assert!(!c.room().is_special_overlay_interaction());

        // Second visit: only the linked summary.
        let cmds = click(&mut c, ClickTarget::Hotspot(BOB), 1000.0);
        let html = dialogue_html(&cmds).unwrap();
        assert!(html.starts_with("<strong>BOB (System Monitor)</strong>"));
        assert!(html.contains(r#"<a href="https://github.com/Indrr27/PayrollVBA""#));
        assert_eq!(labels(&cmds), vec!["Close"]);
        assert!(!cmds
            .iter()
            .any(|cmd| *cmd == UiCommand::PlayAudio { element: "glass".into() }));
    }

    #[test]
    fn other_hotspot_interrupts_bob() {
        let mut c = ready("lab");
        open_closeup(&mut c, "terminal2", 100.0);
        click(&mut c, ClickTarget::Hotspot(BOB), 200.0);
        feed(&mut c, glass_ended());

        let cmds = click(&mut c, ClickTarget::Hotspot(LOG), 300.0);
        assert!(cmds.contains(&UiCommand::StopAudio {
            element: "bob1".into()
        }));
        assert!(dialogue_html(&cmds)
            .unwrap()
            .starts_with("<strong>Project Log: Image Processing Pipeline</strong>"));
        assert!(!c.room().is_any_special_interaction());
        assert_eq!(c.active_script(), Some(ScriptTag::Detail));

        // Not heard to the end, so the skull starts over.
        let cmds = click(&mut c, ClickTarget::Hotspot(BOB), 400.0);
        assert!(cmds.contains(&UiCommand::PlayAudio {
            element: "glass".into()
        }));
    }

    #[test]
    fn late_glass_end_is_ignored_after_interrupt() {
        let mut c = ready("lab");
        open_closeup(&mut c, "terminal2", 100.0);
        click(&mut c, ClickTarget::Hotspot(BOB), 200.0);
        click(&mut c, ClickTarget::Hotspot(LOG), 300.0);

        let cmds = feed(&mut c, glass_ended());
        assert!(!cmds.iter().any(|cmd| matches!(cmd, UiCommand::SetHotspotImage { .. })));
        assert_eq!(c.active_script(), Some(ScriptTag::Detail));
    }

    #[test]
    fn plain_log_hotspot_pages_without_bob() {
        let mut c = ready("lab");
        open_closeup(&mut c, "terminal1", 100.0);
        let cmds = click(&mut c, ClickTarget::Hotspot(0), 200.0);
        assert!(dialogue_html(&cmds)
            .unwrap()
            .starts_with("<strong>Project Log: House of Errors</strong>"));
        assert_eq!(labels(&cmds), vec!["Close"]);
    }
}
