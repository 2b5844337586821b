//! Playback controller: the only owner of the audio element, the armed
//! highlight timers, and the highlight state.
//!
//! ```text
//! Idle -> Starting -> Playing -> (Ended | Stopped | Errored) -> Idle
//! ```
//!
//! Audio signals arrive tagged with the session they belong to. Signals and
//! timer ops from any session other than the current one are ignored, so a
//! late op from session N can never touch the highlights of session N+1.

use crate::highlight::HighlightState;
use crate::schedule::{ScheduledOp, build_schedule};
use crate::story::Story;
use crate::timers::{ArmedSession, SessionId, TimerScheduler};
use crate::timing::TimingConfig;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlaybackError {
    #[error("story has no words to narrate")]
    EmptyStory,
    #[error("narration audio is missing")]
    MissingAudio,
    #[error("audio playback could not start: {0}")]
    StartRejected(String),
    #[error("audio playback failed: {0}")]
    MediaError(String),
}

/// A playable narration resource scoped to one session.
pub trait AudioElement {
    /// Begin playback. `Ok` only means the request was accepted; the
    /// "actually started" signal is delivered separately to
    /// [`PlaybackController::on_playback_started`].
    fn play(&mut self, session: SessionId) -> Result<(), PlaybackError>;
    fn pause(&mut self);
    fn rewind(&mut self);
    /// Free any transient resource backing the audio.
    fn release(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackLifecycle {
    Idle,
    Starting { session: SessionId },
    Playing { session: SessionId },
}

/// How the most recent session left `Playing`/`Starting`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOutcome {
    Ended,
    Stopped,
    Errored,
}

pub struct PlaybackController<A: AudioElement, T: TimerScheduler> {
    scheduler: T,
    timing: TimingConfig,
    lifecycle: PlaybackLifecycle,
    highlight: HighlightState,
    audio: Option<A>,
    plan: Vec<ScheduledOp>,
    armed: Option<ArmedSession>,
    last_session: u64,
    last_outcome: Option<SessionOutcome>,
    last_error: Option<String>,
}

impl<A: AudioElement, T: TimerScheduler> PlaybackController<A, T> {
    pub fn new(scheduler: T, timing: TimingConfig) -> Self {
        Self {
            scheduler,
            timing,
            lifecycle: PlaybackLifecycle::Idle,
            highlight: HighlightState::default(),
            audio: None,
            plan: Vec::new(),
            armed: None,
            last_session: 0,
            last_outcome: None,
            last_error: None,
        }
    }

    pub fn lifecycle(&self) -> PlaybackLifecycle {
        self.lifecycle
    }

    pub fn highlight(&self) -> &HighlightState {
        &self.highlight
    }

    pub fn is_playing(&self) -> bool {
        !matches!(self.lifecycle, PlaybackLifecycle::Idle)
    }

    pub fn current_session(&self) -> Option<SessionId> {
        match self.lifecycle {
            PlaybackLifecycle::Idle => None,
            PlaybackLifecycle::Starting { session } | PlaybackLifecycle::Playing { session } => {
                Some(session)
            }
        }
    }

    /// Timers of the current session that have not fired yet.
    pub fn pending_timers(&self) -> usize {
        self.armed.as_ref().map(ArmedSession::pending).unwrap_or(0)
    }

    pub fn last_outcome(&self) -> Option<SessionOutcome> {
        self.last_outcome
    }

    /// User-visible message from the last failed session.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Start a fresh session for `story`, tearing down any previous one.
    ///
    /// The highlight plan is rebuilt every time, even for identical text.
    /// Timers are not armed here; they wait for the started signal.
    pub fn request_play(&mut self, story: &Story, audio: A) -> Result<SessionId, PlaybackError> {
        if self.is_playing() {
            info!("New play request; stopping current session first");
            self.stop();
        }
        self.cancel_timers();
        self.highlight.reset();
        self.last_error = None;

        let mut audio = audio;
        if story.is_blank() {
            audio.release();
            warn!("Refusing to narrate an empty story");
            let err = PlaybackError::EmptyStory;
            self.last_outcome = Some(SessionOutcome::Errored);
            self.last_error = Some(err.to_string());
            return Err(err);
        }

        self.last_session = self.last_session.wrapping_add(1);
        let session = SessionId(self.last_session);
        self.plan = build_schedule(&story.sentence_texts(), &self.timing);
        self.lifecycle = PlaybackLifecycle::Starting { session };
        info!(
            session_id = %session,
            sentences = story.sentence_count(),
            words = story.word_count(),
            ops = self.plan.len(),
            "Starting narration session"
        );

        let started = audio.play(session);
        self.audio = Some(audio);
        if let Err(err) = started {
            warn!(session_id = %session, "Narration failed to start: {err}");
            self.finish(SessionOutcome::Errored, Some(err.to_string()));
            return Err(err);
        }
        Ok(session)
    }

    /// Audio is audibly playing: arm the plan against this instant.
    pub fn on_playback_started(&mut self, session: SessionId) -> bool {
        if self.lifecycle != (PlaybackLifecycle::Starting { session }) {
            debug!(session_id = %session, lifecycle = ?self.lifecycle, "Ignoring stale start signal");
            return false;
        }
        let plan = std::mem::take(&mut self.plan);
        self.armed = Some(self.scheduler.arm(session, plan));
        self.lifecycle = PlaybackLifecycle::Playing { session };
        info!(session_id = %session, pending = self.pending_timers(), "Narration playing");
        true
    }

    /// Apply a fired op; returns whether the highlight state changed.
    pub fn on_timer(&mut self, session: SessionId, op: &ScheduledOp) -> bool {
        if self.lifecycle != (PlaybackLifecycle::Playing { session }) {
            debug!(session_id = %session, fire_at_ms = op.fire_at_ms, "Dropping op from inactive session");
            return false;
        }
        let armed_live = self
            .armed
            .as_ref()
            .is_some_and(|armed| armed.id() == session && !armed.is_cancelled());
        if !armed_live {
            return false;
        }
        self.highlight.apply(&op.action)
    }

    pub fn on_playback_ended(&mut self, session: SessionId) -> bool {
        if self.current_session() != Some(session) {
            debug!(session_id = %session, "Ignoring stale end signal");
            return false;
        }
        info!(session_id = %session, "Narration ended");
        self.finish(SessionOutcome::Ended, None);
        true
    }

    pub fn on_playback_error(&mut self, session: SessionId, message: impl Into<String>) -> bool {
        if self.current_session() != Some(session) {
            debug!(session_id = %session, "Ignoring stale error signal");
            return false;
        }
        let message = PlaybackError::MediaError(message.into()).to_string();
        warn!(session_id = %session, "{message}");
        self.finish(SessionOutcome::Errored, Some(message));
        true
    }

    /// User stop: pause, rewind, then the usual cleanup.
    pub fn stop(&mut self) -> bool {
        let Some(session) = self.current_session() else {
            return false;
        };
        if let Some(audio) = self.audio.as_mut() {
            audio.pause();
            audio.rewind();
        }
        info!(session_id = %session, "Narration stopped by user");
        self.finish(SessionOutcome::Stopped, None);
        true
    }

    fn cancel_timers(&mut self) {
        if let Some(armed) = self.armed.take() {
            armed.cancel();
        }
    }

    fn finish(&mut self, outcome: SessionOutcome, error: Option<String>) {
        self.cancel_timers();
        self.plan.clear();
        self.highlight.reset();
        if let Some(mut audio) = self.audio.take() {
            audio.release();
        }
        self.lifecycle = PlaybackLifecycle::Idle;
        self.last_outcome = Some(outcome);
        self.last_error = error;
    }
}

impl<A: AudioElement, T: TimerScheduler> Drop for PlaybackController<A, T> {
    fn drop(&mut self) {
        if self.is_playing() {
            self.stop();
        }
    }
}
