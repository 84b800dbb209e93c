use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
};

use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::sync::{ReconciliationResult, SyncAction};

/// One completed `build`, appended to `history.log` as a JSON line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub timestamp: DateTime<Utc>,
    pub playlist_name: String,
    pub playlist_id: String,
    pub action: SyncAction,
    pub tracks: usize,
    pub unresolved: usize,
}

impl HistoryEntry {
    pub fn new(playlist_name: &str, tracks: usize, result: &ReconciliationResult) -> Self {
        HistoryEntry {
            timestamp: Utc::now(),
            playlist_name: playlist_name.to_string(),
            playlist_id: result.playlist_id.clone(),
            action: result.action,
            tracks,
            unresolved: result.unresolved.len(),
        }
    }
}

pub fn history_path(state_dir: &Path) -> PathBuf {
    state_dir.join("history.log")
}

pub fn append(path: &Path, entry: &HistoryEntry) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {:?}", parent))?;
    }

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open history {:?}", path))?;

    let line = serde_json::to_string(entry).context("Failed to serialize history entry")?;

    writeln!(file, "{}", line).context("Failed to write to history")
}

pub fn read_all(path: &Path) -> anyhow::Result<Vec<HistoryEntry>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read history {:?}", path))?;

    content
        .lines()
        .filter(|ln| !ln.trim().is_empty())
        .map(|ln| {
            serde_json::from_str(ln)
                .with_context(|| format!("Failed to parse history line: {}", ln))
        })
        .collect()
}
