use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::warn;

use crate::model::Snapshot;

/// History is capped; the oldest snapshots are evicted first.
pub const MAX_HISTORY: usize = 500;

/// Bounded append-only log of past captures, persisted as two JSON files:
/// the full history and the most recent snapshot on its own.
#[derive(Debug)]
pub struct HistoryStore {
    snapshots: Vec<Snapshot>,
    history_path: PathBuf,
    latest_path: PathBuf,
}

impl HistoryStore {
    /// Load persisted history. Missing or corrupt state starts an empty
    /// store; the monitor must come up cleanly with no history.
    pub fn load(history_path: impl Into<PathBuf>, latest_path: impl Into<PathBuf>) -> Self {
        let history_path = history_path.into();
        let latest_path = latest_path.into();
        let mut snapshots = read_history(&history_path);
        if snapshots.len() > MAX_HISTORY {
            let excess = snapshots.len() - MAX_HISTORY;
            snapshots.drain(..excess);
        }
        Self {
            snapshots,
            history_path,
            latest_path,
        }
    }

    #[cfg(test)]
    pub fn in_dir(dir: &Path) -> Self {
        Self::load(
            dir.join("benchmark_history.json"),
            dir.join("benchmark_data.json"),
        )
    }

    pub fn latest(&self) -> Option<&Snapshot> {
        self.snapshots.last()
    }

    pub fn all(&self) -> &[Snapshot] {
        &self.snapshots
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Append the newest snapshot, evict past the cap, flush to disk.
    pub fn append(&mut self, snapshot: Snapshot) -> Result<()> {
        self.snapshots.push(snapshot);
        if self.snapshots.len() > MAX_HISTORY {
            let excess = self.snapshots.len() - MAX_HISTORY;
            self.snapshots.drain(..excess);
        }
        self.persist()
    }

    fn persist(&self) -> Result<()> {
        if let Some(latest) = self.snapshots.last() {
            let raw = serde_json::to_string_pretty(latest)?;
            write_atomic(&self.latest_path, &raw)?;
        }
        let raw = serde_json::to_string_pretty(&self.snapshots)?;
        write_atomic(&self.history_path, &raw)
    }
}

fn read_history(path: &Path) -> Vec<Snapshot> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == ErrorKind::NotFound => return Vec::new(),
        Err(err) => {
            warn!("failed reading history {}: {err}", path.display());
            return Vec::new();
        }
    };
    match serde_json::from_str(&raw) {
        Ok(snapshots) => snapshots,
        Err(err) => {
            warn!(
                "discarding corrupt history {}: {err}",
                path.display()
            );
            Vec::new()
        }
    }
}

/// Write via a sibling temp file and rename, so an interrupted cycle never
/// leaves a half-written file behind.
fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed creating data directory: {}", parent.display()))?;
    }
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, contents)
        .with_context(|| format!("failed writing {}", tmp.display()))?;
    fs::rename(&tmp, path)
        .with_context(|| format!("failed replacing {}", path.display()))?;
    Ok(())
}
