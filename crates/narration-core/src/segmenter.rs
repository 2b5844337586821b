//! Text splitting helpers for narration highlighting.
//!
//! Sentence splitting is a plain punctuation scan: abbreviations, decimal
//! numbers and quoted punctuation split wherever a terminator appears.
//! Highlight keys depend on these exact boundaries, so the scan must not be
//! made smarter.

use once_cell::sync::Lazy;
use regex::Regex;
use std::ops::Range;

static RE_SENTENCE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^.!?]+[.!?]+").unwrap());
static RE_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\S+").unwrap());

/// Split text into sentences terminated by runs of `.`, `!` or `?`.
///
/// Trailing text without a terminator becomes one final (trimmed) sentence.
/// When no terminated sentence exists at all the whole input is returned
/// unchanged as the only sentence.
pub fn split_sentences(text: &str) -> Vec<String> {
    sentence_ranges(text)
        .into_iter()
        .map(|range| text[range].to_string())
        .collect()
}

/// Byte ranges of the sentences [`split_sentences`] returns.
pub fn sentence_ranges(text: &str) -> Vec<Range<usize>> {
    let mut ranges: Vec<Range<usize>> = RE_SENTENCE.find_iter(text).map(|m| m.range()).collect();
    let Some(consumed) = ranges.last().map(|r| r.end) else {
        return vec![0..text.len()];
    };

    let tail = &text[consumed..];
    let remainder = tail.trim();
    if !remainder.is_empty() {
        let start = consumed + (tail.len() - tail.trim_start().len());
        ranges.push(start..start + remainder.len());
    }
    ranges
}

/// Split a sentence into whitespace-delimited words.
pub fn split_words(sentence: &str) -> Vec<&str> {
    RE_WORD.find_iter(sentence).map(|m| m.as_str()).collect()
}

/// Words together with their byte ranges inside `sentence`.
pub fn word_spans(sentence: &str) -> Vec<(Range<usize>, &str)> {
    RE_WORD
        .find_iter(sentence)
        .map(|m| (m.range(), m.as_str()))
        .collect()
}

/// Non-blank lines of a story; each one is a paragraph.
pub fn split_paragraphs(text: &str) -> Vec<&str> {
    text.lines().filter(|line| !line.trim().is_empty()).collect()
}

/// Inline vocabulary markup: words wrapped in a paired delimiter, e.g.
/// `**brave**`.
#[derive(Debug, Clone)]
pub struct VocabularyMarkup {
    delimiter: String,
    pattern: Regex,
}

impl VocabularyMarkup {
    /// Returns `None` for an empty delimiter.
    pub fn new(delimiter: &str) -> Option<Self> {
        if delimiter.is_empty() {
            return None;
        }
        let escaped = regex::escape(delimiter);
        let pattern = Regex::new(&format!("{escaped}(.+?){escaped}")).ok()?;
        Some(Self {
            delimiter: delimiter.to_string(),
            pattern,
        })
    }

    /// Byte ranges of every marked span (delimiters included) and the
    /// marked text.
    pub fn spans<'a>(&self, text: &'a str) -> Vec<(Range<usize>, &'a str)> {
        self.pattern
            .captures_iter(text)
            .filter_map(|caps| {
                let whole = caps.get(0)?;
                let inner = caps.get(1)?;
                Some((whole.range(), inner.as_str()))
            })
            .collect()
    }

    /// Unique marked words in first-appearance order, surrounding
    /// punctuation removed.
    pub fn extract_vocabulary(&self, text: &str) -> Vec<String> {
        let mut seen = std::collections::HashSet::new();
        let mut words = Vec::new();
        for (_, inner) in self.spans(text) {
            let word = inner.trim_matches(|c: char| !c.is_alphanumeric());
            if word.is_empty() {
                continue;
            }
            if seen.insert(vocabulary_key(word)) {
                words.push(word.to_string());
            }
        }
        words
    }

    /// Text with every delimiter removed.
    pub fn strip_markup(&self, text: &str) -> String {
        text.replace(&self.delimiter, "")
    }

    /// Same text as [`strip_markup`](Self::strip_markup), plus the ranges
    /// each marked span occupies in the stripped text and its lookup key.
    pub fn strip_with_spans(&self, text: &str) -> (String, Vec<(Range<usize>, String)>) {
        let mut stripped = String::with_capacity(text.len());
        let mut marked = Vec::new();
        let mut cursor = 0usize;
        for (whole, inner) in self.spans(text) {
            stripped.push_str(&self.strip_markup(&text[cursor..whole.start]));
            let start = stripped.len();
            stripped.push_str(&self.strip_markup(inner));
            marked.push((start..stripped.len(), vocabulary_key(inner)));
            cursor = whole.end;
        }
        stripped.push_str(&self.strip_markup(&text[cursor..]));
        (stripped, marked)
    }
}

/// Lookup key for a vocabulary word: lowercase, surrounding punctuation
/// removed.
pub fn vocabulary_key(word: &str) -> String {
    word.trim_matches(|c: char| !c.is_alphanumeric())
        .to_lowercase()
}
