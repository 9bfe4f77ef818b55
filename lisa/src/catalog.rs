//! Catalog output: one JSON file per unit plus the `_metadata.json` index.

use crate::git_mining::{CommitSummary, MiningError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Descriptor content at one commit.
///
/// `content` is `None` (serialized as `null`) when the blob could not be read
/// or parsed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HashRevision {
    pub hash: String,
    pub content: Option<Value>,
}

impl HashRevision {
    pub fn unreadable(hash: impl Into<String>) -> Self {
        Self {
            hash: hash.into(),
            content: None,
        }
    }
}

/// Full history of one unit directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModUnitInfo {
    pub path: String,
    pub seen_in_head: bool,
    pub revisions: Vec<HashRevision>,
}

/// Index entry pointing at a unit file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmitIndex {
    pub id: String,
    pub display_name: String,
}

/// Root document of the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    pub head: String,
    pub commits: Vec<CommitSummary>,
    pub index: Vec<EmitIndex>,
}

/// Sort index entries by display name, then id.
pub fn sort_index(index: &mut [EmitIndex]) {
    index.sort_by(|a, b| {
        a.display_name
            .cmp(&b.display_name)
            .then_with(|| a.id.cmp(&b.id))
    });
}

/// Writes catalog files into an output directory.
#[derive(Debug, Clone)]
pub struct CatalogWriter {
    output_dir: PathBuf,
    metadata_name: String,
}

impl CatalogWriter {
    pub fn new(output_dir: impl Into<PathBuf>, metadata_name: impl Into<String>) -> Self {
        Self {
            output_dir: output_dir.into(),
            metadata_name: metadata_name.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Create the output directory, optionally emptying it first.
    ///
    /// Emptying waits `delay` after logging a warning so an accidental run can
    /// be interrupted. The directory itself is kept.
    pub async fn prepare(&self, clean: bool, delay: Duration) -> Result<(), MiningError> {
        if clean {
            tracing::warn!(
                "Deleting contents of {} in {:?}",
                self.output_dir.display(),
                delay
            );
            tokio::time::sleep(delay).await;
            self.clean().await?;
        }

        tokio::fs::create_dir_all(&self.output_dir)
            .await
            .map_err(|e| MiningError::write(&self.output_dir, e))
    }

    async fn clean(&self) -> Result<(), MiningError> {
        let mut entries = match tokio::fs::read_dir(&self.output_dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(MiningError::write(&self.output_dir, e)),
        };

        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| MiningError::write(&self.output_dir, e))?
        {
            let path = entry.path();
            let file_type = entry
                .file_type()
                .await
                .map_err(|e| MiningError::write(&path, e))?;
            let removed = if file_type.is_dir() {
                tokio::fs::remove_dir_all(&path).await
            } else {
                tokio::fs::remove_file(&path).await
            };
            removed.map_err(|e| MiningError::write(&path, e))?;
        }
        Ok(())
    }

    /// Write `<id>.json` and return its path.
    pub async fn write_unit(&self, id: &str, unit: &ModUnitInfo) -> Result<PathBuf, MiningError> {
        let path = self.output_dir.join(format!("{}.json", id));
        write_json(&path, unit).await?;
        Ok(path)
    }

    /// Write the metadata document and return its path.
    pub async fn write_metadata(&self, metadata: &Metadata) -> Result<PathBuf, MiningError> {
        let path = self.output_dir.join(&self.metadata_name);
        write_json(&path, metadata).await?;
        Ok(path)
    }
}

async fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), MiningError> {
    tracing::debug!("Writing {}", path.display());
    let bytes = serde_json::to_vec(value)?;
    tokio::fs::write(path, bytes).await.map_err(|e| {
        tracing::error!("Failed to write {}", path.display());
        MiningError::write(path, e)
    })
}
