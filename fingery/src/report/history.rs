use std::fs;
use std::path::{Path, PathBuf};

use cadence::{Analysis, AnalysisRequest, Millis};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("Failed to create history directory: {0}")]
    CreateDirectory(std::io::Error),

    #[error("Failed to read history: {0}")]
    ReadFile(std::io::Error),

    #[error("Failed to write history file: {0}")]
    WriteFile(std::io::Error),

    #[error("Failed to serialize history entry: {0}")]
    Serialize(serde_json::Error),
}

/// One finished session as stored on disk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    /// When the session was saved, in unix milliseconds
    pub timestamp_ms: Millis,
    pub user: String,
    pub words: Vec<String>,
    pub input_text: String,
    pub analysis: Analysis,
}

impl HistoryEntry {
    pub fn new(
        timestamp_ms: Millis,
        user: &str,
        request: &AnalysisRequest,
        analysis: &Analysis,
    ) -> Self {
        Self {
            timestamp_ms,
            user: user.to_string(),
            words: request.words.clone(),
            input_text: request.input_text.clone(),
            analysis: analysis.clone(),
        }
    }
}

/// Directory of `session_<millis>.json` files
#[derive(Debug)]
pub struct HistoryStore {
    directory: PathBuf,
    /// Entries kept after a save. 0 keeps everything.
    limit: usize,
}

impl HistoryStore {
    pub fn new(directory: PathBuf, limit: usize) -> Result<Self, HistoryError> {
        if !directory.exists() {
            fs::create_dir_all(&directory).map_err(HistoryError::CreateDirectory)?;
        }
        Ok(Self { directory, limit })
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Write `entry` and prune the oldest entries beyond the limit
    pub fn save(&self, entry: &HistoryEntry) -> Result<PathBuf, HistoryError> {
        let path = self.free_path(entry.timestamp_ms);

        let json = serde_json::to_string_pretty(entry).map_err(HistoryError::Serialize)?;
        fs::write(&path, json).map_err(HistoryError::WriteFile)?;
        debug!(path = %path.display(), "session saved");

        self.prune()?;

        Ok(path)
    }

    /// All readable entries, newest first
    pub fn load_all(&self) -> Result<Vec<HistoryEntry>, HistoryError> {
        Ok(self
            .read_entries()?
            .into_iter()
            .map(|(_, entry)| entry)
            .collect())
    }

    fn read_entries(&self) -> Result<Vec<(PathBuf, HistoryEntry)>, HistoryError> {
        let mut entries = Vec::new();

        if !self.directory.exists() {
            return Ok(entries);
        }

        for dir_entry in fs::read_dir(&self.directory).map_err(HistoryError::ReadFile)? {
            let path = dir_entry.map_err(HistoryError::ReadFile)?.path();

            if !path.is_file() || path.extension().is_none_or(|ext| ext != "json") {
                continue;
            }

            let content = fs::read_to_string(&path).map_err(HistoryError::ReadFile)?;
            match serde_json::from_str::<HistoryEntry>(&content) {
                Ok(entry) => entries.push((path, entry)),
                Err(error) => warn!(%error, path = %path.display(), "skipping invalid history file"),
            }
        }

        // Newest first
        entries.sort_by(|(a_path, a), (b_path, b)| {
            b.timestamp_ms
                .cmp(&a.timestamp_ms)
                .then_with(|| b_path.cmp(a_path))
        });

        Ok(entries)
    }

    fn prune(&self) -> Result<(), HistoryError> {
        if self.limit == 0 {
            return Ok(());
        }

        for (path, _) in self.read_entries()?.into_iter().skip(self.limit) {
            fs::remove_file(&path).map_err(HistoryError::WriteFile)?;
            debug!(path = %path.display(), "pruned history entry");
        }

        Ok(())
    }

    /// `session_<millis>.json`, suffixed if two sessions share a millisecond
    fn free_path(&self, timestamp_ms: Millis) -> PathBuf {
        let mut path = self.directory.join(format!("session_{timestamp_ms}.json"));
        let mut suffix = 1;
        while path.exists() {
            path = self
                .directory
                .join(format!("session_{timestamp_ms}_{suffix}.json"));
            suffix += 1;
        }
        path
    }
}
