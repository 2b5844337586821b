use crate::schedule::HighlightAction;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Composite highlight key; displays as `"sentenceIdx-wordIdx"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct WordKey {
    pub sentence: usize,
    pub word: usize,
}

impl WordKey {
    pub fn new(sentence: usize, word: usize) -> Self {
        Self { sentence, word }
    }
}

impl fmt::Display for WordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.sentence, self.word)
    }
}

/// What the reader currently shows as spoken.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HighlightState {
    active_sentence: Option<usize>,
    highlighted: BTreeSet<WordKey>,
}

impl HighlightState {
    pub fn active_sentence(&self) -> Option<usize> {
        self.active_sentence
    }

    pub fn highlighted(&self) -> &BTreeSet<WordKey> {
        &self.highlighted
    }

    pub fn is_highlighted(&self, key: WordKey) -> bool {
        self.highlighted.contains(&key)
    }

    pub fn is_reset(&self) -> bool {
        self.active_sentence.is_none() && self.highlighted.is_empty()
    }

    pub fn reset(&mut self) {
        self.active_sentence = None;
        self.highlighted.clear();
    }

    /// Apply one scheduled mutation; returns whether anything changed.
    pub fn apply(&mut self, action: &HighlightAction) -> bool {
        match *action {
            HighlightAction::EnterSentence { sentence } => {
                let changed =
                    self.active_sentence != Some(sentence) || !self.highlighted.is_empty();
                self.active_sentence = Some(sentence);
                self.highlighted.clear();
                changed
            }
            HighlightAction::EnterWord(key) => self.highlighted.insert(key),
            HighlightAction::ExitWord(key) => self.highlighted.remove(&key),
            HighlightAction::ClearAll => {
                let changed = !self.is_reset();
                self.reset();
                changed
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn word_key_formats_as_composite_string() {
        assert_eq!(WordKey::new(3, 12).to_string(), "3-12");
    }

    #[test]
    fn entering_sentence_drops_previous_words() {
        let mut state = HighlightState::default();
        state.apply(&HighlightAction::EnterSentence { sentence: 0 });
        state.apply(&HighlightAction::EnterWord(WordKey::new(0, 0)));
        assert!(state.is_highlighted(WordKey::new(0, 0)));

        state.apply(&HighlightAction::EnterSentence { sentence: 1 });
        assert_eq!(state.active_sentence(), Some(1));
        assert!(state.highlighted().is_empty());
    }

    #[test]
    fn exit_word_only_removes_that_word() {
        let mut state = HighlightState::default();
        state.apply(&HighlightAction::EnterWord(WordKey::new(1, 0)));
        state.apply(&HighlightAction::EnterWord(WordKey::new(1, 1)));
        assert!(state.apply(&HighlightAction::ExitWord(WordKey::new(1, 0))));
        assert!(!state.apply(&HighlightAction::ExitWord(WordKey::new(1, 0))));
        assert!(state.is_highlighted(WordKey::new(1, 1)));
    }

    #[test]
    fn clear_all_resets_everything() {
        let mut state = HighlightState::default();
        state.apply(&HighlightAction::EnterSentence { sentence: 2 });
        state.apply(&HighlightAction::EnterWord(WordKey::new(2, 0)));
        assert!(state.apply(&HighlightAction::ClearAll));
        assert!(state.is_reset());
        assert!(!state.apply(&HighlightAction::ClearAll));
    }
}
