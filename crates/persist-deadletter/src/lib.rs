//! Dead-letter sink — appends failed envelopes to a persistent JSON file.
//! See SPEC_FULL.md §4.B.
//!
//! Writes are "load the whole map, mutate, rewrite": the entire map is
//! read, updated, and written back out via write-to-temp-then-rename so a
//! reader never observes a half-written file. Concurrent writers
//! serialise through an in-process mutex; losing a race with another
//! process's writer can still corrupt diagnostics (per spec), but it must
//! never block ingestion.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeadLetterEntry {
    pub error: String,
    pub class_id: i32,
    pub variant_id: i32,
    pub recorded_at: DateTime<Utc>,
}

pub struct DeadLetterSink {
    path: PathBuf,
    guard: Mutex<()>,
}

impl DeadLetterSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            guard: Mutex::new(()),
        }
    }

    /// Record a final failure for `msg_id`, keyed-set-and-save style.
    pub async fn record(&self, msg_id: &str, class_id: i32, variant_id: i32, error: &str) -> std::io::Result<()> {
        let _permit = self.guard.lock().await;

        let mut map = self.load().unwrap_or_default();
        map.insert(
            msg_id.to_string(),
            DeadLetterEntry {
                error: error.to_string(),
                class_id,
                variant_id,
                recorded_at: Utc::now(),
            },
        );
        self.save(&map)?;

        tracing::warn!(msg_id, error, "envelope moved to dead-letter sink");
        Ok(())
    }

    fn load(&self) -> std::io::Result<HashMap<String, DeadLetterEntry>> {
        if !self.path.exists() {
            return Ok(HashMap::new());
        }
        let raw = std::fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&raw).unwrap_or_default())
    }

    fn save(&self, map: &HashMap<String, DeadLetterEntry>) -> std::io::Result<()> {
        let serialized = serde_json::to_string_pretty(map)?;
        write_atomically(&self.path, &serialized)
    }
}

fn write_atomically(path: &Path, contents: &str) -> std::io::Result<()> {
    let tmp_path = path.with_extension("tmp");
    std::fs::write(&tmp_path, contents)?;
    std::fs::rename(&tmp_path, path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn record_then_reload_roundtrips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("persister.errors.json");
        let sink = DeadLetterSink::new(&path);

        sink.record("1099a1", 1, 1, "boom").await.unwrap();

        let map = sink.load().unwrap();
        assert_eq!(map.len(), 1);
        assert_eq!(map.get("1099a1").unwrap().error, "boom");
    }

    #[tokio::test]
    async fn repeated_failures_overwrite_the_same_key() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("persister.errors.json");
        let sink = DeadLetterSink::new(&path);

        sink.record("a1", 1, 1, "first").await.unwrap();
        sink.record("a1", 1, 1, "second").await.unwrap();

        let map = sink.load().unwrap();
        assert_eq!(map.len(), 1);
        assert_eq!(map.get("a1").unwrap().error, "second");
    }
}
