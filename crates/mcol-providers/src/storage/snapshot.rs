//! Snapshot file of the in-memory engine
//!
//! `{"gauge": {name: f64}, "counter": {name: i64}}`, rewritten wholesale.
//! Writes land in a sibling temp file that is flushed to disk and then renamed
//! over the target, so a crash leaves either the old or the new snapshot.

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use mcol_domain::error::Result;
use mcol_infrastructure::ErrorContext;
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;

use crate::constants::SNAPSHOT_TEMP_SUFFIX;

/// Both namespaces of the in-memory engine
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub gauge: BTreeMap<String, f64>,
    #[serde(default)]
    pub counter: BTreeMap<String, i64>,
}

impl Snapshot {
    /// Whether both namespaces are empty
    pub fn is_empty(&self) -> bool {
        self.gauge.is_empty() && self.counter.is_empty()
    }
}

/// Location of a snapshot on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotFile {
    path: PathBuf,
}

impl SnapshotFile {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = OsString::from(self.path.as_os_str());
        name.push(SNAPSHOT_TEMP_SUFFIX);
        PathBuf::from(name)
    }

    /// Read and parse the snapshot
    pub async fn read(&self) -> Result<Snapshot> {
        let bytes = tokio::fs::read(&self.path)
            .await
            .io_context(format!("Failed to read snapshot {}", self.path.display()))?;
        serde_json::from_slice(&bytes)
            .codec_context(format!("Snapshot {} is not valid JSON", self.path.display()))
    }

    /// Write the snapshot through a synced temp file and an atomic rename
    pub async fn write(&self, snapshot: &Snapshot) -> Result<()> {
        let json = serde_json::to_vec(snapshot).codec_context("Failed to encode snapshot")?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .io_context(format!("Failed to create {}", parent.display()))?;
        }

        let temp = self.temp_path();
        let mut file = tokio::fs::File::create(&temp)
            .await
            .io_context(format!("Failed to create {}", temp.display()))?;
        file.write_all(&json)
            .await
            .io_context(format!("Failed to write {}", temp.display()))?;
        file.sync_all()
            .await
            .io_context(format!("Failed to sync {}", temp.display()))?;
        drop(file);

        tokio::fs::rename(&temp, &self.path)
            .await
            .io_context(format!("Failed to replace snapshot {}", self.path.display()))
    }
}
