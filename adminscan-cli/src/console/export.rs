//! Export artifacts for `export`.
//!
//! Results are written as a pretty-printed JSON array named
//! `scan-results-<YYYY-MM-DDTHH-MM-SS.mmmZ>.json`.

use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tracing::info;

use adminscan_core::types::ResultRecord;

/// Destination for exported artifacts.
pub trait ArtifactSink: Send + Sync {
    /// Persist `bytes` under `name` and return where it went.
    fn save(&self, name: &str, bytes: &[u8]) -> io::Result<PathBuf>;
}

/// Writes artifacts into a directory on disk.
#[derive(Debug, Clone)]
pub struct DirectoryArtifacts {
    dir: PathBuf,
}

impl DirectoryArtifacts {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl ArtifactSink for DirectoryArtifacts {
    fn save(&self, name: &str, bytes: &[u8]) -> io::Result<PathBuf> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(name);
        std::fs::write(&path, bytes)?;
        info!(path = %path.display(), bytes = bytes.len(), "artifact saved");
        Ok(path)
    }
}

/// Artifact file name for an export taken at `now`.
///
/// Colons are replaced so the name is valid on every file system.
pub fn artifact_name(now: DateTime<Utc>) -> String {
    now.format("scan-results-%Y-%m-%dT%H-%M-%S%.3fZ.json")
        .to_string()
}

/// Serialize records as a pretty-printed JSON array in accumulation order.
pub fn encode_results(records: &[ResultRecord]) -> serde_json::Result<Vec<u8>> {
    serde_json::to_vec_pretty(records)
}
