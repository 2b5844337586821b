//! Narration audio sources.
//!
//! Audio comes either from a stored MPEG file or from an HTTP text-to-speech
//! provider, optionally through the on-disk cache. Any failure here happens
//! before playback is requested, so the playback controller only ever sees
//! audio bytes that were actually fetched.

use crate::cache::{load_narration, narration_path, save_narration};
use crate::config::AppConfig;
use anyhow::{Context, Result, anyhow, bail};
use reqwest::blocking::Client;
use serde::Serialize;
use std::env;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};

pub trait NarrationSource {
    /// Fetch MPEG audio narrating `text`.
    fn fetch(&self, text: &str) -> Result<Vec<u8>>;
    fn describe(&self) -> String;
}

/// A narration recorded earlier and saved next to the story.
pub struct StoredNarration {
    path: PathBuf,
}

impl StoredNarration {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl NarrationSource for StoredNarration {
    fn fetch(&self, _text: &str) -> Result<Vec<u8>> {
        let bytes = fs::read(&self.path)
            .with_context(|| format!("Reading narration audio {}", self.path.display()))?;
        if bytes.is_empty() {
            bail!("Narration audio {} is empty", self.path.display());
        }
        info!(path = %self.path.display(), bytes = bytes.len(), "Loaded stored narration");
        Ok(bytes)
    }

    fn describe(&self) -> String {
        format!("stored file {}", self.path.display())
    }
}

#[derive(Serialize)]
struct SpeechRequest<'a> {
    text: &'a str,
    voice_id: &'a str,
    model_id: &'a str,
}

/// Text-to-speech over HTTP: JSON request in, MPEG bytes out.
pub struct HttpNarration {
    client: Client,
    endpoint: String,
    api_key_header: String,
    api_key: Option<String>,
    voice: String,
    model: String,
}

impl HttpNarration {
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let endpoint = config
            .narration_endpoint
            .clone()
            .ok_or_else(|| anyhow!("No narration endpoint configured"))?;
        let api_key = env::var(&config.narration_api_key_env).ok();
        if api_key.is_none() {
            warn!(
                env = %config.narration_api_key_env,
                "Narration API key not set; sending unauthenticated requests"
            );
        }
        let client = Client::builder()
            .timeout(Duration::from_secs(config.narration_timeout_secs))
            .build()
            .context("Building narration HTTP client")?;
        Ok(Self {
            client,
            endpoint,
            api_key_header: config.narration_api_key_header.clone(),
            api_key,
            voice: config.narration_voice.clone(),
            model: config.narration_model.clone(),
        })
    }

    pub fn voice(&self) -> &str {
        &self.voice
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

impl NarrationSource for HttpNarration {
    fn fetch(&self, text: &str) -> Result<Vec<u8>> {
        let body = serde_json::to_vec(&SpeechRequest {
            text,
            voice_id: &self.voice,
            model_id: &self.model,
        })?;
        info!(
            endpoint = %self.endpoint,
            voice = %self.voice,
            chars = text.len(),
            "Requesting narration audio"
        );

        let mut request = self
            .client
            .post(&self.endpoint)
            .header("Content-Type", "application/json")
            .header("Accept", "audio/mpeg")
            .body(body);
        if let Some(key) = &self.api_key {
            request = request.header(self.api_key_header.as_str(), key.as_str());
        }

        let response = request
            .send()
            .with_context(|| format!("Calling narration endpoint {}", self.endpoint))?
            .error_for_status()
            .context("Narration endpoint returned an error status")?;
        let bytes = response.bytes().context("Reading narration audio body")?;
        if bytes.is_empty() {
            bail!("Narration endpoint returned no audio");
        }
        debug!(bytes = bytes.len(), "Received narration audio");
        Ok(bytes.to_vec())
    }

    fn describe(&self) -> String {
        format!("{} (voice {})", self.endpoint, self.voice)
    }
}

/// Serves audio from the cache, fetching and storing it on a miss.
pub struct CachedNarration<S> {
    inner: S,
    cache_root: PathBuf,
    voice: String,
    model: String,
}

impl<S: NarrationSource> CachedNarration<S> {
    pub fn new(inner: S, cache_root: PathBuf, voice: &str, model: &str) -> Self {
        Self {
            inner,
            cache_root,
            voice: voice.to_string(),
            model: model.to_string(),
        }
    }
}

impl<S: NarrationSource> NarrationSource for CachedNarration<S> {
    fn fetch(&self, text: &str) -> Result<Vec<u8>> {
        let path = narration_path(&self.cache_root, &self.voice, &self.model, text);
        if let Some(bytes) = load_narration(&path) {
            info!(path = %path.display(), bytes = bytes.len(), "Using cached narration");
            return Ok(bytes);
        }
        debug!(path = %path.display(), "Narration cache miss");
        let bytes = self.inner.fetch(text)?;
        if let Err(err) = save_narration(&path, &bytes) {
            warn!("Failed to cache narration audio: {err:?}");
        }
        Ok(bytes)
    }

    fn describe(&self) -> String {
        format!("{} via cache {}", self.inner.describe(), self.cache_root.display())
    }
}

/// Pick the narration source from CLI flags and config.
pub fn source_from_config(
    config: &AppConfig,
    stored: Option<PathBuf>,
) -> Result<Box<dyn NarrationSource>> {
    if let Some(path) = stored {
        return Ok(Box::new(StoredNarration::new(path)));
    }
    if config.narration_endpoint.is_some() {
        let http = HttpNarration::from_config(config)?;
        let voice = http.voice().to_string();
        let model = http.model().to_string();
        return Ok(Box::new(CachedNarration::new(
            http,
            PathBuf::from(&config.cache_dir),
            &voice,
            &model,
        )));
    }
    bail!(
        "No narration source: pass --audio <file.mp3>, set [narration].endpoint in the config, or use --no-audio"
    )
}
