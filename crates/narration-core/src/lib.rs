//! Narration highlight engine.
//!
//! Story text is segmented into sentences and words, each word gets a
//! fixed-cadence timing estimate, and the estimates become a flat plan of
//! highlight mutations. The [`controller::PlaybackController`] arms that plan
//! when narration audio starts and tears it down on every exit path.

pub mod cancellation;
pub mod controller;
pub mod highlight;
pub mod schedule;
pub mod segmenter;
pub mod story;
pub mod timers;
pub mod timing;
pub mod view;
pub mod vocabulary;

pub use controller::{AudioElement, PlaybackController, PlaybackError, PlaybackLifecycle, SessionOutcome};
pub use highlight::{HighlightState, WordKey};
pub use schedule::{HighlightAction, ScheduledOp, build_schedule};
pub use story::Story;
pub use timers::{ArmedSession, SessionId, ThreadScheduler, TimerScheduler};
pub use timing::{TimingConfig, WordTiming, estimate_word_timings};
pub use view::{PlaybackStatus, StoryView};
pub use vocabulary::{Glossary, VocabularyEntry};
