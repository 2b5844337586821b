//! Precomputed highlight plans.
//!
//! A plan is a flat list of time-stamped mutations; nothing here runs a clock
//! or touches highlight state. Offsets are relative to the moment narration
//! audio actually starts playing.

use crate::highlight::WordKey;
use crate::timing::{TimingConfig, estimate_word_timings, sentence_window_ms};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HighlightAction {
    /// Make `sentence` active and drop any highlighted words.
    EnterSentence { sentence: usize },
    EnterWord(WordKey),
    ExitWord(WordKey),
    /// No active sentence, no highlighted words.
    ClearAll,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduledOp {
    pub fire_at_ms: u64,
    pub action: HighlightAction,
}

impl ScheduledOp {
    fn new(fire_at_ms: u64, action: HighlightAction) -> Self {
        Self { fire_at_ms, action }
    }
}

/// Walk the sentences with a cumulative delay and emit every highlight
/// mutation in firing order, ending with a single `ClearAll`.
pub fn build_schedule<S: AsRef<str>>(sentences: &[S], timing: &TimingConfig) -> Vec<ScheduledOp> {
    let mut plan = Vec::new();
    let mut cumulative_ms = 0u64;

    for (sentence_idx, sentence) in sentences.iter().enumerate() {
        plan.push(ScheduledOp::new(
            cumulative_ms,
            HighlightAction::EnterSentence {
                sentence: sentence_idx,
            },
        ));

        let timings = estimate_word_timings(sentence.as_ref(), timing.avg_word_duration_ms);
        for (word_idx, word) in timings.iter().enumerate() {
            let key = WordKey::new(sentence_idx, word_idx);
            let enter_at = cumulative_ms + word.start_offset_ms;
            plan.push(ScheduledOp::new(enter_at, HighlightAction::EnterWord(key)));
            plan.push(ScheduledOp::new(
                enter_at + word.duration_ms,
                HighlightAction::ExitWord(key),
            ));
        }

        cumulative_ms += sentence_window_ms(timings.len(), timing);
    }

    plan.push(ScheduledOp::new(cumulative_ms, HighlightAction::ClearAll));
    debug!(
        sentences = sentences.len(),
        ops = plan.len(),
        total_ms = cumulative_ms,
        "Built highlight schedule"
    );
    plan
}
