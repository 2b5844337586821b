//! Story text laid out for narration: paragraphs, globally numbered
//! sentences, and per-sentence numbered words.

use crate::segmenter::{VocabularyMarkup, sentence_ranges, split_paragraphs, word_spans};
use std::ops::Range;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Word {
    pub index: usize,
    /// Token with vocabulary delimiters removed.
    pub display: String,
    /// Lookup key when the token is part of a marked vocabulary span.
    pub vocabulary: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sentence {
    pub index: usize,
    /// Sentence text with markup removed; this is what gets timed.
    pub text: String,
    pub words: Vec<Word>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Paragraph {
    pub sentences: Vec<Sentence>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Story {
    paragraphs: Vec<Paragraph>,
    vocabulary: Vec<String>,
    plain_text: String,
}

impl Story {
    /// Lay out `text`. Sentence indices keep counting across paragraphs.
    ///
    /// Markup is resolved on the whole paragraph before sentences are split,
    /// so a marked span containing a terminator (`**Wow!**`) never leaves a
    /// delimiter-only token behind.
    pub fn parse(text: &str, markup: Option<&VocabularyMarkup>) -> Self {
        let mut paragraphs = Vec::new();
        let mut next_sentence = 0usize;

        for paragraph in split_paragraphs(text) {
            let (plain, marked) = match markup {
                Some(markup) => markup.strip_with_spans(paragraph),
                None => (paragraph.to_string(), Vec::new()),
            };
            let sentences = sentence_ranges(&plain)
                .into_iter()
                .map(|range| {
                    let index = next_sentence;
                    next_sentence += 1;
                    Sentence {
                        index,
                        text: plain[range.clone()].to_string(),
                        words: layout_words(&plain, range, &marked),
                    }
                })
                .collect();
            paragraphs.push(Paragraph { sentences });
        }

        let vocabulary = markup
            .map(|markup| markup.extract_vocabulary(text))
            .unwrap_or_default();
        let plain_text = match markup {
            Some(markup) => markup.strip_markup(text),
            None => text.to_string(),
        };

        Self {
            paragraphs,
            vocabulary,
            plain_text,
        }
    }

    pub fn paragraphs(&self) -> &[Paragraph] {
        &self.paragraphs
    }

    pub fn sentences(&self) -> impl Iterator<Item = &Sentence> {
        self.paragraphs.iter().flat_map(|p| p.sentences.iter())
    }

    /// Raw sentence texts in global index order, as fed to the scheduler.
    pub fn sentence_texts(&self) -> Vec<&str> {
        self.sentences().map(|s| s.text.as_str()).collect()
    }

    pub fn sentence_count(&self) -> usize {
        self.sentences().count()
    }

    pub fn word_count(&self) -> usize {
        self.sentences().map(|s| s.words.len()).sum()
    }

    pub fn is_blank(&self) -> bool {
        self.word_count() == 0
    }

    /// Marked vocabulary words in first-appearance order.
    pub fn vocabulary(&self) -> &[String] {
        &self.vocabulary
    }

    /// Story text without vocabulary markup, for narration.
    pub fn plain_text(&self) -> &str {
        &self.plain_text
    }
}

fn layout_words(paragraph: &str, sentence: Range<usize>, marked: &[(Range<usize>, String)]) -> Vec<Word> {
    let offset = sentence.start;
    word_spans(&paragraph[sentence])
        .into_iter()
        .enumerate()
        .map(|(index, (range, token))| {
            let (start, end) = (range.start + offset, range.end + offset);
            let vocabulary = marked
                .iter()
                .find(|(span, _)| span.start < end && start < span.end)
                .map(|(_, key)| key.clone());
            Word {
                index,
                display: token.to_string(),
                vocabulary,
            }
        })
        .collect()
}
