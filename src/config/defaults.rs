use super::models::LogLevel;
use narration_core::timing::{DEFAULT_AVG_WORD_DURATION_MS, DEFAULT_SENTENCE_GAP_MS};

pub(crate) const MIN_AVG_WORD_DURATION_MS: u64 = 50;
pub(crate) const MAX_AVG_WORD_DURATION_MS: u64 = 2_000;
pub(crate) const MAX_SENTENCE_GAP_MS: u64 = 5_000;

pub(crate) fn default_avg_word_duration_ms() -> u64 {
    DEFAULT_AVG_WORD_DURATION_MS
}

pub(crate) fn default_sentence_gap_ms() -> u64 {
    DEFAULT_SENTENCE_GAP_MS
}

pub(crate) fn default_vocabulary_delimiter() -> String {
    "**".to_string()
}

pub(crate) fn default_narration_api_key_env() -> String {
    "NARRATION_API_KEY".to_string()
}

pub(crate) fn default_narration_api_key_header() -> String {
    "xi-api-key".to_string()
}

pub(crate) fn default_narration_voice() -> String {
    "21m00Tcm4TlvDq8ikWAM".to_string()
}

pub(crate) fn default_narration_model() -> String {
    "eleven_multilingual_v2".to_string()
}

pub(crate) fn default_narration_timeout_secs() -> u64 {
    60
}

pub(crate) fn default_cache_dir() -> String {
    ".cache".to_string()
}

pub(crate) fn default_volume() -> f32 {
    1.0
}

pub(crate) fn default_log_level() -> LogLevel {
    LogLevel::Debug
}
