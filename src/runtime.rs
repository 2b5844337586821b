//! Single-threaded playback loop.
//!
//! Audio threads, highlight timers and the Ctrl-C handler only ever send
//! [`RuntimeEvent`]s; this loop is the one place that touches the
//! controller, so highlight mutations are applied strictly in arrival order.

use crate::terminal::TerminalRenderer;
use anyhow::{Context, Result};
use narration_core::view::StoryView;
use narration_core::{
    AudioElement, Glossary, PlaybackController, PlaybackStatus, ScheduledOp, SessionId,
    SessionOutcome, Story, TimerScheduler,
};
use std::io::Write;
use std::sync::mpsc::Receiver;
use tracing::{debug, info, warn};

#[derive(Debug)]
pub enum RuntimeEvent {
    Started(SessionId),
    Ended(SessionId),
    Failed(SessionId, String),
    Timer(SessionId, ScheduledOp),
    StopRequested,
}

pub struct Player<'a, A: AudioElement, T: TimerScheduler, W: Write> {
    controller: PlaybackController<A, T>,
    events: Receiver<RuntimeEvent>,
    story: &'a Story,
    glossary: &'a Glossary,
    renderer: TerminalRenderer<W>,
}

impl<'a, A: AudioElement, T: TimerScheduler, W: Write> Player<'a, A, T, W> {
    pub fn new(
        controller: PlaybackController<A, T>,
        events: Receiver<RuntimeEvent>,
        story: &'a Story,
        glossary: &'a Glossary,
        renderer: TerminalRenderer<W>,
    ) -> Self {
        Self {
            controller,
            events,
            story,
            glossary,
            renderer,
        }
    }

    /// Narrate the story once, redrawing after every highlight change.
    pub fn play(&mut self, audio: A) -> Result<SessionOutcome> {
        self.draw()?;
        if let Err(err) = self.controller.request_play(self.story, audio) {
            warn!("Narration did not start: {err}");
            self.draw()?;
            return Ok(SessionOutcome::Errored);
        }

        while self.controller.is_playing() {
            let event = match self.events.recv() {
                Ok(event) => event,
                Err(_) => {
                    warn!("Runtime event channel closed; stopping narration");
                    self.controller.stop();
                    break;
                }
            };
            if self.dispatch(event) {
                self.draw()?;
            }
        }

        self.draw()?;
        let outcome = self
            .controller
            .last_outcome()
            .unwrap_or(SessionOutcome::Stopped);
        info!(?outcome, "Narration finished");
        Ok(outcome)
    }

    pub fn last_error(&self) -> Option<&str> {
        self.controller.last_error()
    }

    /// Route one event; returns whether the view needs a redraw.
    fn dispatch(&mut self, event: RuntimeEvent) -> bool {
        match event {
            RuntimeEvent::Started(session) => self.controller.on_playback_started(session),
            RuntimeEvent::Ended(session) => self.controller.on_playback_ended(session),
            RuntimeEvent::Failed(session, message) => {
                self.controller.on_playback_error(session, message)
            }
            RuntimeEvent::Timer(session, op) => self.controller.on_timer(session, &op),
            RuntimeEvent::StopRequested => {
                debug!("Stop requested");
                self.controller.stop()
            }
        }
    }

    fn draw(&mut self) -> Result<()> {
        let view = StoryView::render(
            self.story,
            self.controller.highlight(),
            self.glossary,
            PlaybackStatus::from(self.controller.lifecycle()),
            self.controller.last_error(),
        );
        self.renderer.draw(&view).context("Drawing story view")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use narration_core::{PlaybackError, ThreadScheduler, TimingConfig};
    use std::sync::mpsc::{self, Sender};

    enum Script {
        EndAfterStart,
        FailAfterStart,
        StartOnly,
        Reject,
    }

    struct ScriptedAudio {
        events: Sender<RuntimeEvent>,
        script: Script,
        released: bool,
    }

    impl ScriptedAudio {
        fn new(events: &Sender<RuntimeEvent>, script: Script) -> Self {
            Self {
                events: events.clone(),
                script,
                released: false,
            }
        }
    }

    impl AudioElement for ScriptedAudio {
        fn play(&mut self, session: SessionId) -> Result<(), PlaybackError> {
            match self.script {
                Script::Reject => {
                    return Err(PlaybackError::StartRejected("no audio output".to_string()));
                }
                Script::EndAfterStart | Script::FailAfterStart | Script::StartOnly => {}
            }
            let _ = self.events.send(RuntimeEvent::Started(session));
            match self.script {
                Script::FailAfterStart => {
                    let _ = self
                        .events
                        .send(RuntimeEvent::Failed(session, "stream broke".to_string()));
                }
                Script::StartOnly => {
                    let _ = self.events.send(RuntimeEvent::StopRequested);
                }
                Script::EndAfterStart | Script::Reject => {}
            }
            Ok(())
        }

        fn pause(&mut self) {}

        fn rewind(&mut self) {}

        fn release(&mut self) {
            self.released = true;
        }
    }

    fn fast_timing() -> TimingConfig {
        TimingConfig {
            avg_word_duration_ms: 1,
            sentence_gap_ms: 1,
        }
    }

    fn player<'a>(
        story: &'a Story,
        glossary: &'a Glossary,
        tx: &Sender<RuntimeEvent>,
        rx: Receiver<RuntimeEvent>,
    ) -> Player<'a, ScriptedAudio, ThreadScheduler, Vec<u8>> {
        let timers = tx.clone();
        let scheduler = ThreadScheduler::new(move |session, op| {
            let _ = timers.send(RuntimeEvent::Timer(session, op));
        });
        let controller = PlaybackController::new(scheduler, fast_timing());
        Player::new(
            controller,
            rx,
            story,
            glossary,
            TerminalRenderer::new(Vec::new(), false),
        )
    }

    #[test]
    fn stop_request_ends_session_as_stopped() {
        let story = Story::parse("One two. Three.", None);
        let glossary = Glossary::default();
        let (tx, rx) = mpsc::channel();
        let mut player = player(&story, &glossary, &tx, rx);

        let outcome = player
            .play(ScriptedAudio::new(&tx, Script::StartOnly))
            .unwrap();
        assert_eq!(outcome, SessionOutcome::Stopped);
        assert!(player.last_error().is_none());
    }

    #[test]
    fn media_failure_surfaces_error_message() {
        let story = Story::parse("One two. Three.", None);
        let glossary = Glossary::default();
        let (tx, rx) = mpsc::channel();
        let mut player = player(&story, &glossary, &tx, rx);

        let outcome = player
            .play(ScriptedAudio::new(&tx, Script::FailAfterStart))
            .unwrap();
        assert_eq!(outcome, SessionOutcome::Errored);
        assert_eq!(player.last_error(), Some("audio playback failed: stream broke"));
    }

    #[test]
    fn rejected_start_returns_errored_without_looping() {
        let story = Story::parse("Hello there.", None);
        let glossary = Glossary::default();
        let (tx, rx) = mpsc::channel();
        let mut player = player(&story, &glossary, &tx, rx);

        let outcome = player.play(ScriptedAudio::new(&tx, Script::Reject)).unwrap();
        assert_eq!(outcome, SessionOutcome::Errored);
        assert!(player.last_error().unwrap().contains("no audio output"));
    }

    #[test]
    fn empty_story_reports_why_nothing_was_narrated() {
        let story = Story::parse("  \n\n ", None);
        let glossary = Glossary::default();
        let (tx, rx) = mpsc::channel();
        let mut player = player(&story, &glossary, &tx, rx);

        let outcome = player
            .play(ScriptedAudio::new(&tx, Script::EndAfterStart))
            .unwrap();
        assert_eq!(outcome, SessionOutcome::Errored);
        assert_eq!(player.last_error(), Some("story has no words to narrate"));
        let frames = String::from_utf8(player.renderer.into_inner()).unwrap();
        assert!(frames.contains("story has no words to narrate"));
    }

    #[test]
    fn end_signal_after_timers_finishes_session() {
        let story = Story::parse("One two. Three.", None);
        let glossary = Glossary::default();
        let (tx, rx) = mpsc::channel();
        let mut player = player(&story, &glossary, &tx, rx);

        let ender = tx.clone();
        let handle = std::thread::spawn(move || {
            std::thread::sleep(std::time::Duration::from_millis(50));
            let _ = ender.send(RuntimeEvent::Ended(SessionId(1)));
        });
        let outcome = player
            .play(ScriptedAudio::new(&tx, Script::EndAfterStart))
            .unwrap();
        handle.join().unwrap();

        assert_eq!(outcome, SessionOutcome::Ended);
        let frames = String::from_utf8(player.renderer.into_inner()).unwrap();
        assert!(frames.contains("reading aloud"));
        assert!(frames.ends_with("[stopped]\x1b[0m\n"));
    }
}
