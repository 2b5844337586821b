use narration_core::TimingConfig;
use serde::Deserialize;

use super::defaults::{MAX_AVG_WORD_DURATION_MS, MAX_SENTENCE_GAP_MS, MIN_AVG_WORD_DURATION_MS};

/// High-level app configuration; deserializable from TOML.
#[derive(Debug, Clone, Deserialize, serde::Serialize, PartialEq)]
pub struct AppConfig {
    #[serde(default = "crate::config::defaults::default_avg_word_duration_ms")]
    pub avg_word_duration_ms: u64,
    #[serde(default = "crate::config::defaults::default_sentence_gap_ms")]
    pub sentence_gap_ms: u64,
    #[serde(default = "crate::config::defaults::default_vocabulary_delimiter")]
    pub vocabulary_delimiter: String,
    #[serde(default)]
    pub glossary_path: Option<String>,
    #[serde(default)]
    pub narration_endpoint: Option<String>,
    #[serde(default = "crate::config::defaults::default_narration_api_key_env")]
    pub narration_api_key_env: String,
    #[serde(default = "crate::config::defaults::default_narration_api_key_header")]
    pub narration_api_key_header: String,
    #[serde(default = "crate::config::defaults::default_narration_voice")]
    pub narration_voice: String,
    #[serde(default = "crate::config::defaults::default_narration_model")]
    pub narration_model: String,
    #[serde(default = "crate::config::defaults::default_narration_timeout_secs")]
    pub narration_timeout_secs: u64,
    #[serde(default = "crate::config::defaults::default_cache_dir")]
    pub cache_dir: String,
    #[serde(default = "crate::config::defaults::default_volume")]
    pub volume: f32,
    #[serde(default = "crate::config::defaults::default_log_level")]
    pub log_level: LogLevel,
}

impl Default for AppConfig {
    fn default() -> Self {
        use crate::config::defaults::*;
        AppConfig {
            avg_word_duration_ms: default_avg_word_duration_ms(),
            sentence_gap_ms: default_sentence_gap_ms(),
            vocabulary_delimiter: default_vocabulary_delimiter(),
            glossary_path: None,
            narration_endpoint: None,
            narration_api_key_env: default_narration_api_key_env(),
            narration_api_key_header: default_narration_api_key_header(),
            narration_voice: default_narration_voice(),
            narration_model: default_narration_model(),
            narration_timeout_secs: default_narration_timeout_secs(),
            cache_dir: default_cache_dir(),
            volume: default_volume(),
            log_level: default_log_level(),
        }
    }
}

impl AppConfig {
    pub fn timing(&self) -> TimingConfig {
        TimingConfig {
            avg_word_duration_ms: self.avg_word_duration_ms,
            sentence_gap_ms: self.sentence_gap_ms,
        }
    }

    /// Keep tuning values in bounds regardless of where they came from.
    pub(crate) fn clamp_in_place(&mut self) {
        self.avg_word_duration_ms = self
            .avg_word_duration_ms
            .clamp(MIN_AVG_WORD_DURATION_MS, MAX_AVG_WORD_DURATION_MS);
        self.sentence_gap_ms = self.sentence_gap_ms.min(MAX_SENTENCE_GAP_MS);
        self.volume = if self.volume.is_finite() {
            self.volume.clamp(0.0, 2.0)
        } else {
            1.0
        };
        self.narration_timeout_secs = self.narration_timeout_secs.max(1);
    }
}

/// Supported logging verbosity levels.
#[derive(Debug, Clone, Copy, Deserialize, serde::Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl Default for LogLevel {
    fn default() -> Self {
        LogLevel::Debug
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_filter_str())
    }
}

impl LogLevel {
    pub fn as_filter_str(self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}
