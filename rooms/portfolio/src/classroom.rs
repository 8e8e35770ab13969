use room_engine::config::DialogueLine;
use room_engine::script::{EXIT_LABEL, NEXT_LABEL};
use room_engine::*;

const MUSIC_QUESTION: &str =
    "These rooms are kinda quiet... want me to play some background music while you explore?";
const MUSIC_OPTIONS: [&str; 2] = ["Yes, play music!", "No thanks, keep it quiet"];

const HAPPY_SPRITE: &str = "sprites/characters/martyhappy.webp";
const MAD_SPRITE: &str = "sprites/characters/martymad.webp";
const HAPPY_TEXT: &str =
    "I'm sooooo happy you think Inder's a genius, I can't even move! (Inder forgot to animate me...)";
const MAD_TEXT: &str =
    "I'm sooooo furious you called him overrated, I can't even move! (Inder forgot to animate me...)";

/// Marty's classroom. The conversation asks about background music on the
/// first meeting and ends on a verdict that changes his sprite.
pub struct Classroom {
    config: RoomConfig,
}

impl Classroom {
    pub fn new(config: RoomConfig) -> Self {
        Self { config }
    }
}

impl RoomScript for Classroom {
    fn config(&self) -> &RoomConfig {
        &self.config
    }

    fn conversation(&mut self) -> Box<dyn Script> {
        Box::new(MartyTalk::new(&self.config.character_dialogue))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Beat {
    Greeting,
    MusicQuestion,
    Welcome,
    Verdict,
    Response,
    Done,
}

/// Greeting, optional music question, welcome, verdict, response.
struct MartyTalk {
    greeting: DialogueLine,
    welcome: DialogueLine,
    verdict: DialogueLine,
    beat: Beat,
}

impl MartyTalk {
    fn new(lines: &[DialogueLine]) -> Self {
        let line = |i: usize| {
            lines.get(i).cloned().unwrap_or(DialogueLine {
                text: String::new(),
                audio: None,
                choices: Vec::new(),
            })
        };
        Self {
            greeting: line(0),
            welcome: line(1),
            verdict: line(2),
            beat: Beat::Greeting,
        }
    }

    fn show_line(line: &DialogueLine, button: &str) -> Step {
        Step::Show(Prompt::line(line.text.as_str(), line.audio.as_deref(), button))
    }
}

impl Script for MartyTalk {
    fn step(&mut self, answer: Option<Answer>, ctx: &mut RoomContext<'_>) -> Step {
        match self.beat {
            Beat::Greeting => {
                self.beat = if ctx.state.has_met_character {
                    Beat::Welcome
                } else {
                    Beat::MusicQuestion
                };
                Self::show_line(&self.greeting, NEXT_LABEL)
            }
            Beat::MusicQuestion => {
                self.beat = Beat::Welcome;
                Step::Show(Prompt::choice(
                    MUSIC_QUESTION,
                    &MUSIC_OPTIONS,
                    self.greeting.audio.as_deref(),
                ))
            }
            Beat::Welcome => {
                if let Some(Answer::Chose(index)) = answer {
                    ctx.handle_music_choice(index == 0);
                }
                self.beat = Beat::Verdict;
                Self::show_line(&self.welcome, NEXT_LABEL)
            }
            Beat::Verdict => {
                self.beat = Beat::Response;
                Step::Show(Prompt::Choice {
                    text: self.verdict.text.clone(),
                    options: self.verdict.choices.clone(),
                    audio: self.verdict.audio.clone(),
                })
            }
            Beat::Response => {
                self.beat = Beat::Done;
                let genius = answer == Some(Answer::Chose(0));
                let (sprite, audio, text) = if genius {
                    (HAPPY_SPRITE, "happy", HAPPY_TEXT)
                } else {
                    (MAD_SPRITE, "mad", MAD_TEXT)
                };
                ctx.set_character_sprite(sprite);
                Step::Show(Prompt::line(text, Some(audio), EXIT_LABEL))
            }
            Beat::Done => Step::Finish,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::portfolio::Portfolio;

    fn talk(state_met: bool, answers: &[Answer]) -> (Vec<Prompt>, RoomState, Vec<UiCommand>, PreferenceStore) {
        let room = Portfolio::load("classroom").unwrap();
        let mut prefs = PreferenceStore::in_memory();
        prefs.save_flag(PrefKey::HasMetCharacter, state_met);
        let mut state = RoomState::new(prefs.load_all());
        let audio = room.config().audio_map();
        let mut out = Outbox::new();
        let mut script = MartyTalk::new(&room.config().character_dialogue);

        let mut shown = Vec::new();
        {
            let mut ctx = RoomContext::new(&mut state, &mut prefs, &mut out, &audio);
            let mut answer = None;
            let mut pending = answers.iter();
            while let Step::Show(prompt) = script.step(answer, &mut ctx) {
                answer = Some(match prompt {
                    Prompt::Line { .. } => Answer::Acknowledged,
                    Prompt::Choice { .. } => *pending.next().unwrap(),
                });
                shown.push(prompt);
            }
        }
        (shown, state, out.drain(), prefs)
    }

    fn text(p: &Prompt) -> &str {
        match p {
            Prompt::Line { text, .. } | Prompt::Choice { text, .. } => text,
        }
    }

    #[test]
    fn first_meeting_asks_about_music() {
        let (shown, state, cmds, prefs) = talk(false, &[Answer::Chose(0), Answer::Chose(0)]);
        assert_eq!(shown.len(), 5);
        assert_eq!(text(&shown[1]), MUSIC_QUESTION);
        assert!(text(&shown[2]).starts_with("Everything Inder has ever learned"));
        assert!(state.has_met_character);
        assert!(!state.bgm_muted);
        assert!(prefs.load_flag(PrefKey::HasMetCharacter));
        assert!(cmds.contains(&UiCommand::ResumeAudio {
            element: "bgm".into()
        }));
        assert!(cmds.contains(&UiCommand::SetCharacterSprite(HAPPY_SPRITE.into())));
    }

    #[test]
    fn returning_visitor_skips_music_question() {
        let (shown, state, cmds, _) = talk(true, &[Answer::Chose(1)]);
        assert_eq!(shown.len(), 4);
        assert!(shown.iter().all(|p| text(p) != MUSIC_QUESTION));
        assert!(!state.bgm_started);
        assert!(cmds.contains(&UiCommand::SetCharacterSprite(MAD_SPRITE.into())));
        assert_eq!(
            shown[3],
            Prompt::line(MAD_TEXT, Some("mad"), EXIT_LABEL)
        );
    }

    #[test]
    fn declining_music_keeps_bgm_muted() {
        let (_, state, cmds, prefs) = talk(false, &[Answer::Chose(1), Answer::Chose(0)]);
        assert!(state.bgm_muted);
        assert!(prefs.load_flag(PrefKey::BgmMuted));
        assert!(!cmds
            .iter()
            .any(|c| matches!(c, UiCommand::ResumeAudio { .. })));
    }

    #[test]
    fn verdict_offers_both_answers() {
        let (shown, _, _, _) = talk(true, &[Answer::Chose(0)]);
        match &shown[2] {
            Prompt::Choice { options, audio, .. } => {
                assert_eq!(options, &vec!["Genius!".to_string(), "Overrated".to_string()]);
                assert_eq!(audio.as_deref(), Some("m3"));
            }
            other => panic!("expected the verdict choice, got {other:?}"),
        }
    }
}
