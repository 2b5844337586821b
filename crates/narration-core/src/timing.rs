//! Fixed-cadence speech timing estimates.
//!
//! Every word is assumed to take the same amount of time. Narration audio is
//! never inspected, so highlights drift whenever the real speech rate differs
//! from `avg_word_duration_ms`.

use crate::segmenter::split_words;
use serde::{Deserialize, Serialize};

pub const DEFAULT_AVG_WORD_DURATION_MS: u64 = 300;
pub const DEFAULT_SENTENCE_GAP_MS: u64 = 400;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimingConfig {
    pub avg_word_duration_ms: u64,
    pub sentence_gap_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            avg_word_duration_ms: DEFAULT_AVG_WORD_DURATION_MS,
            sentence_gap_ms: DEFAULT_SENTENCE_GAP_MS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WordTiming<'a> {
    pub word: &'a str,
    pub start_offset_ms: u64,
    pub duration_ms: u64,
}

/// Start offsets relative to the beginning of the sentence.
pub fn estimate_word_timings(sentence: &str, avg_word_duration_ms: u64) -> Vec<WordTiming<'_>> {
    split_words(sentence)
        .into_iter()
        .enumerate()
        .map(|(idx, word)| WordTiming {
            word,
            start_offset_ms: idx as u64 * avg_word_duration_ms,
            duration_ms: avg_word_duration_ms,
        })
        .collect()
}

/// Time a sentence occupies before the next one starts.
pub fn sentence_window_ms(word_count: usize, timing: &TimingConfig) -> u64 {
    word_count as u64 * timing.avg_word_duration_ms + timing.sentence_gap_ms
}

/// Estimated length of a whole narration.
pub fn total_duration_ms<S: AsRef<str>>(sentences: &[S], timing: &TimingConfig) -> u64 {
    sentences
        .iter()
        .map(|sentence| sentence_window_ms(split_words(sentence.as_ref()).len(), timing))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn words_start_at_multiples_of_average() {
        let timings = estimate_word_timings(" Jump far away.", 290);
        let offsets: Vec<_> = timings.iter().map(|t| t.start_offset_ms).collect();
        assert_eq!(offsets, vec![0, 290, 580]);
        assert!(timings.iter().all(|t| t.duration_ms == 290));
        assert_eq!(timings[2].word, "away.");
    }

    #[test]
    fn blank_sentence_has_no_timings() {
        assert!(estimate_word_timings("   ", 300).is_empty());
    }

    #[test]
    fn sentence_window_adds_gap_once() {
        let timing = TimingConfig::default();
        assert_eq!(sentence_window_ms(2, &timing), 1000);
        assert_eq!(sentence_window_ms(0, &timing), 400);
    }

    #[test]
    fn total_duration_sums_windows() {
        let timing = TimingConfig {
            avg_word_duration_ms: 300,
            sentence_gap_ms: 400,
        };
        assert_eq!(total_duration_ms(&["Run!", " Jump far.", " Stop."], &timing), 2400);
    }
}
