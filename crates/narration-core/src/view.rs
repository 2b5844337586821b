//! Render model for the story reader: one span per word with the flags a
//! frontend needs to style it.

use crate::controller::PlaybackLifecycle;
use crate::highlight::{HighlightState, WordKey};
use crate::story::Story;
use crate::vocabulary::{Glossary, VocabularyEntry};
use serde::Serialize;
use std::fs;
use std::path::Path;
use ts_rs::TS;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum PlaybackStatus {
    Idle,
    Starting,
    Playing,
}

impl From<PlaybackLifecycle> for PlaybackStatus {
    fn from(lifecycle: PlaybackLifecycle) -> Self {
        match lifecycle {
            PlaybackLifecycle::Idle => PlaybackStatus::Idle,
            PlaybackLifecycle::Starting { .. } => PlaybackStatus::Starting,
            PlaybackLifecycle::Playing { .. } => PlaybackStatus::Playing,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
pub struct WordSpan {
    pub sentence: usize,
    pub word: usize,
    /// `"sentence-word"`, stable across renders.
    pub key: String,
    pub text: String,
    pub highlighted: bool,
    pub vocabulary: Option<String>,
    pub has_definition: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
pub struct SentenceView {
    pub index: usize,
    pub active: bool,
    pub words: Vec<WordSpan>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
pub struct ParagraphView {
    pub sentences: Vec<SentenceView>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
pub struct StoryView {
    pub status: PlaybackStatus,
    pub active_sentence: Option<usize>,
    pub paragraphs: Vec<ParagraphView>,
    pub error: Option<String>,
}

impl StoryView {
    pub fn render(
        story: &Story,
        highlight: &HighlightState,
        glossary: &Glossary,
        status: PlaybackStatus,
        error: Option<&str>,
    ) -> Self {
        let paragraphs = story
            .paragraphs()
            .iter()
            .map(|paragraph| ParagraphView {
                sentences: paragraph
                    .sentences
                    .iter()
                    .map(|sentence| SentenceView {
                        index: sentence.index,
                        active: highlight.active_sentence() == Some(sentence.index),
                        words: sentence
                            .words
                            .iter()
                            .map(|word| {
                                let key = WordKey::new(sentence.index, word.index);
                                let has_definition = word
                                    .vocabulary
                                    .as_deref()
                                    .is_some_and(|v| glossary.lookup(v).is_some());
                                WordSpan {
                                    sentence: sentence.index,
                                    word: word.index,
                                    key: key.to_string(),
                                    text: word.display.clone(),
                                    highlighted: highlight.is_highlighted(key),
                                    vocabulary: word.vocabulary.clone(),
                                    has_definition,
                                }
                            })
                            .collect(),
                    })
                    .collect(),
            })
            .collect();

        Self {
            status,
            active_sentence: highlight.active_sentence(),
            paragraphs,
            error: error.map(str::to_string),
        }
    }
}

fn export_single_type<T: TS + 'static>(out_dir: &Path) -> Result<(), String> {
    T::export_all_to(out_dir).map_err(|err| err.to_string())
}

/// Write TypeScript definitions of the render model into `out_dir`,
/// replacing any previously generated `.ts` files.
pub fn export_ts_bindings(out_dir: &Path) -> Result<(), String> {
    fs::create_dir_all(out_dir)
        .map_err(|err| format!("Failed to create {}: {err}", out_dir.display()))?;

    for entry in fs::read_dir(out_dir)
        .map_err(|err| format!("Failed to list {}: {err}", out_dir.display()))?
    {
        let entry = entry.map_err(|err| format!("Failed to read entry: {err}"))?;
        let path = entry.path();
        if path.extension().and_then(|ext| ext.to_str()) == Some("ts") {
            fs::remove_file(&path)
                .map_err(|err| format!("Failed to remove {}: {err}", path.display()))?;
        }
    }

    export_single_type::<StoryView>(out_dir)?;
    export_single_type::<VocabularyEntry>(out_dir)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::HighlightAction;
    use crate::segmenter::VocabularyMarkup;

    fn words(view: &StoryView) -> impl Iterator<Item = &WordSpan> {
        view.paragraphs
            .iter()
            .flat_map(|p| p.sentences.iter())
            .flat_map(|s| s.words.iter())
    }

    fn glossary() -> Glossary {
        Glossary::from_entries([VocabularyEntry {
            word: "brave".to_string(),
            pronunciation: "brayv".to_string(),
            simple_definition: "Not afraid.".to_string(),
            example_sentence: String::new(),
            synonyms: vec![],
        }])
    }

    #[test]
    fn spans_reflect_highlight_and_vocabulary() {
        let markup = VocabularyMarkup::new("**").unwrap();
        let story = Story::parse("A **brave** cat. A **shy** dog.", Some(&markup));
        let mut highlight = HighlightState::default();
        highlight.apply(&HighlightAction::EnterSentence { sentence: 0 });
        highlight.apply(&HighlightAction::EnterWord(WordKey::new(0, 1)));

        let view = StoryView::render(&story, &highlight, &glossary(), PlaybackStatus::Playing, None);

        assert_eq!(view.active_sentence, Some(0));
        let sentences = &view.paragraphs[0].sentences;
        assert!(sentences[0].active);
        assert!(!sentences[1].active);

        let brave = &sentences[0].words[1];
        assert_eq!(brave.key, "0-1");
        assert_eq!(brave.text, "brave");
        assert!(brave.highlighted);
        assert!(brave.has_definition);

        let shy = &sentences[1].words[1];
        assert_eq!(shy.vocabulary.as_deref(), Some("shy"));
        assert!(!shy.has_definition);
        assert_eq!(words(&view).filter(|w| w.highlighted).count(), 1);
    }

    #[test]
    fn reset_state_renders_nothing_highlighted() {
        let story = Story::parse("One. Two.", None);
        let view = StoryView::render(
            &story,
            &HighlightState::default(),
            &Glossary::default(),
            PlaybackStatus::Idle,
            Some("audio playback failed: boom"),
        );
        assert_eq!(view.active_sentence, None);
        assert!(words(&view).all(|w| !w.highlighted));
        assert_eq!(view.error.as_deref(), Some("audio playback failed: boom"));
    }

    #[test]
    fn status_follows_lifecycle() {
        use crate::timers::SessionId;
        assert_eq!(PlaybackStatus::from(PlaybackLifecycle::Idle), PlaybackStatus::Idle);
        assert_eq!(
            PlaybackStatus::from(PlaybackLifecycle::Playing {
                session: SessionId(4)
            }),
            PlaybackStatus::Playing
        );
    }
}
