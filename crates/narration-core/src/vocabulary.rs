//! Vocabulary definitions shown as tooltips over marked words.

use crate::segmenter::vocabulary_key;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use ts_rs::TS;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct VocabularyEntry {
    pub word: String,
    #[serde(default)]
    pub pronunciation: String,
    #[serde(default)]
    pub simple_definition: String,
    #[serde(default)]
    pub example_sentence: String,
    #[serde(default)]
    pub synonyms: Vec<String>,
}

/// Case-insensitive word → definition map.
#[derive(Debug, Clone, Default)]
pub struct Glossary {
    entries: HashMap<String, VocabularyEntry>,
}

impl Glossary {
    pub fn from_entries(entries: impl IntoIterator<Item = VocabularyEntry>) -> Self {
        let entries = entries
            .into_iter()
            .filter_map(|entry| {
                let key = vocabulary_key(&entry.word);
                (!key.is_empty()).then_some((key, entry))
            })
            .collect();
        Self { entries }
    }

    /// Parse a JSON array of entries.
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        let entries: Vec<VocabularyEntry> = serde_json::from_str(json)?;
        Ok(Self::from_entries(entries))
    }

    pub fn lookup(&self, word: &str) -> Option<&VocabularyEntry> {
        self.entries.get(&vocabulary_key(word))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"[
        {
            "word": "Brave",
            "pronunciation": "brayv",
            "simple_definition": "Not afraid to do hard things.",
            "example_sentence": "The brave cat climbed the tree.",
            "synonyms": ["bold", "fearless"]
        },
        { "word": "curious" }
    ]"#;

    #[test]
    fn parses_entries_with_optional_fields() {
        let glossary = Glossary::from_json_str(SAMPLE).unwrap();
        assert_eq!(glossary.len(), 2);
        let curious = glossary.lookup("curious").unwrap();
        assert!(curious.synonyms.is_empty());
        assert_eq!(curious.simple_definition, "");
    }

    #[test]
    fn lookup_ignores_case_and_punctuation() {
        let glossary = Glossary::from_json_str(SAMPLE).unwrap();
        let entry = glossary.lookup("BRAVE,").unwrap();
        assert_eq!(entry.pronunciation, "brayv");
        assert_eq!(entry.synonyms, vec!["bold", "fearless"]);
        assert!(glossary.lookup("timid").is_none());
    }

    #[test]
    fn invalid_json_is_an_error() {
        assert!(Glossary::from_json_str("{not json").is_err());
    }
}
