//! On-disk cache of synthesized narration audio.
//!
//! Files live under the configured cache directory, named by a SHA-256 of
//! the voice, model and narrated text so a changed story or voice never
//! reuses stale audio.

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

pub fn narration_path(cache_root: &Path, voice: &str, model: &str, text: &str) -> PathBuf {
    let mut hasher = Sha256::new();
    hasher.update(voice.as_bytes());
    hasher.update([0u8]);
    hasher.update(model.as_bytes());
    hasher.update([0u8]);
    hasher.update(text.as_bytes());
    let hash = format!("{:x}", hasher.finalize());
    cache_root.join(format!("narration-{hash}.mp3"))
}

/// Cached audio bytes, if a non-empty entry exists.
pub fn load_narration(path: &Path) -> Option<Vec<u8>> {
    let bytes = fs::read(path).ok()?;
    (!bytes.is_empty()).then_some(bytes)
}

/// Write through a temp file so a crash never leaves a truncated entry.
pub fn save_narration(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Creating cache directory {}", parent.display()))?;
    }
    let temp_path = unique_temp_path(path);
    fs::write(&temp_path, bytes)
        .with_context(|| format!("Writing {}", temp_path.display()))?;
    if fs::rename(&temp_path, path).is_err() {
        fs::copy(&temp_path, path).with_context(|| format!("Writing {}", path.display()))?;
        let _ = fs::remove_file(&temp_path);
    }
    Ok(())
}

fn unique_temp_path(path: &Path) -> PathBuf {
    static SEQ: AtomicU64 = AtomicU64::new(0);
    let nonce = SEQ.fetch_add(1, Ordering::Relaxed);
    let ts_nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    let mut temp_name = path
        .file_name()
        .and_then(|f| f.to_str())
        .unwrap_or("narration.mp3")
        .to_string();
    temp_name.push_str(&format!(".tmp-{ts_nanos}-{nonce}"));
    path.with_file_name(temp_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_is_stable_for_same_inputs() {
        let root = Path::new(".cache");
        let a = narration_path(root, "voice", "model", "Once upon a time.");
        let b = narration_path(root, "voice", "model", "Once upon a time.");
        assert_eq!(a, b);
        assert!(a.starts_with(root));
        let name = a.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("narration-") && name.ends_with(".mp3"));
    }

    #[test]
    fn path_changes_with_voice_model_or_text() {
        let root = Path::new(".cache");
        let base = narration_path(root, "voice", "model", "Hi.");
        assert_ne!(base, narration_path(root, "other", "model", "Hi."));
        assert_ne!(base, narration_path(root, "voice", "other", "Hi."));
        assert_ne!(base, narration_path(root, "voice", "model", "Hello."));
        assert_ne!(
            narration_path(root, "ab", "c", "x"),
            narration_path(root, "a", "bc", "x")
        );
    }

    #[test]
    fn save_then_load_round_trips_and_leaves_no_temp_files() {
        let dir = std::env::temp_dir().join(format!(
            "story-narrator-cache-test-{}",
            std::process::id()
        ));
        let path = narration_path(&dir, "v", "m", "text");
        save_narration(&path, b"ID3fake").unwrap();
        assert_eq!(load_narration(&path).as_deref(), Some(&b"ID3fake"[..]));

        let leftovers = fs::read_dir(&dir)
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().contains(".tmp-"))
            .count();
        assert_eq!(leftovers, 0);
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn missing_or_empty_entries_are_misses() {
        assert!(load_narration(Path::new("no/such/narration.mp3")).is_none());
    }
}
