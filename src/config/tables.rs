use super::defaults;
use super::models::{AppConfig, LogLevel};
use serde::Deserialize;

/// On-disk layout: one TOML table per concern.
#[derive(Debug, Clone, Default, Deserialize, serde::Serialize)]
pub(super) struct ConfigTables {
    #[serde(default)]
    highlight: HighlightConfig,
    #[serde(default)]
    vocabulary: VocabularyConfig,
    #[serde(default)]
    narration: NarrationConfig,
    #[serde(default)]
    audio: AudioConfig,
    #[serde(default)]
    logging: LoggingConfig,
}

impl From<ConfigTables> for AppConfig {
    fn from(tables: ConfigTables) -> Self {
        AppConfig {
            avg_word_duration_ms: tables.highlight.avg_word_duration_ms,
            sentence_gap_ms: tables.highlight.sentence_gap_ms,
            vocabulary_delimiter: tables.vocabulary.delimiter,
            glossary_path: tables.vocabulary.glossary_path,
            narration_endpoint: tables.narration.endpoint,
            narration_api_key_env: tables.narration.api_key_env,
            narration_api_key_header: tables.narration.api_key_header,
            narration_voice: tables.narration.voice,
            narration_model: tables.narration.model,
            narration_timeout_secs: tables.narration.timeout_secs,
            cache_dir: tables.narration.cache_dir,
            volume: tables.audio.volume,
            log_level: tables.logging.log_level,
        }
    }
}

impl From<&AppConfig> for ConfigTables {
    fn from(config: &AppConfig) -> Self {
        ConfigTables {
            highlight: HighlightConfig {
                avg_word_duration_ms: config.avg_word_duration_ms,
                sentence_gap_ms: config.sentence_gap_ms,
            },
            vocabulary: VocabularyConfig {
                delimiter: config.vocabulary_delimiter.clone(),
                glossary_path: config.glossary_path.clone(),
            },
            narration: NarrationConfig {
                endpoint: config.narration_endpoint.clone(),
                api_key_env: config.narration_api_key_env.clone(),
                api_key_header: config.narration_api_key_header.clone(),
                voice: config.narration_voice.clone(),
                model: config.narration_model.clone(),
                timeout_secs: config.narration_timeout_secs,
                cache_dir: config.cache_dir.clone(),
            },
            audio: AudioConfig {
                volume: config.volume,
            },
            logging: LoggingConfig {
                log_level: config.log_level,
            },
        }
    }
}

#[derive(Debug, Clone, Deserialize, serde::Serialize)]
struct HighlightConfig {
    #[serde(default = "defaults::default_avg_word_duration_ms")]
    avg_word_duration_ms: u64,
    #[serde(default = "defaults::default_sentence_gap_ms")]
    sentence_gap_ms: u64,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        HighlightConfig {
            avg_word_duration_ms: defaults::default_avg_word_duration_ms(),
            sentence_gap_ms: defaults::default_sentence_gap_ms(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, serde::Serialize)]
struct VocabularyConfig {
    #[serde(default = "defaults::default_vocabulary_delimiter")]
    delimiter: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    glossary_path: Option<String>,
}

impl Default for VocabularyConfig {
    fn default() -> Self {
        VocabularyConfig {
            delimiter: defaults::default_vocabulary_delimiter(),
            glossary_path: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, serde::Serialize)]
struct NarrationConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    endpoint: Option<String>,
    #[serde(default = "defaults::default_narration_api_key_env")]
    api_key_env: String,
    #[serde(default = "defaults::default_narration_api_key_header")]
    api_key_header: String,
    #[serde(default = "defaults::default_narration_voice")]
    voice: String,
    #[serde(default = "defaults::default_narration_model")]
    model: String,
    #[serde(default = "defaults::default_narration_timeout_secs")]
    timeout_secs: u64,
    #[serde(default = "defaults::default_cache_dir")]
    cache_dir: String,
}

impl Default for NarrationConfig {
    fn default() -> Self {
        NarrationConfig {
            endpoint: None,
            api_key_env: defaults::default_narration_api_key_env(),
            api_key_header: defaults::default_narration_api_key_header(),
            voice: defaults::default_narration_voice(),
            model: defaults::default_narration_model(),
            timeout_secs: defaults::default_narration_timeout_secs(),
            cache_dir: defaults::default_cache_dir(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, serde::Serialize)]
struct AudioConfig {
    #[serde(default = "defaults::default_volume")]
    volume: f32,
}

impl Default for AudioConfig {
    fn default() -> Self {
        AudioConfig {
            volume: defaults::default_volume(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, serde::Serialize)]
struct LoggingConfig {
    #[serde(default = "defaults::default_log_level")]
    log_level: LogLevel,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            log_level: defaults::default_log_level(),
        }
    }
}
