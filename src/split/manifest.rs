use super::Chunk;
use crate::error::{Result, VodError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;
use tokio::fs;
use tracing::{debug, info, warn};

/// Record of a completed split, written next to the chunk files
///
/// Only written once every cut succeeded, so its presence means the chunk
/// directory is complete for the recorded source file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SplitManifest {
    /// Source VOD that was split
    pub source: PathBuf,

    /// Source size in bytes at split time
    pub source_size: u64,

    /// Source modification time (unix seconds) at split time
    pub source_modified: u64,

    /// Probed duration of the source in seconds
    pub total_duration: f64,

    /// Byte budget each chunk was cut with
    pub chunk_size: u64,

    /// Produced chunks in order
    pub chunks: Vec<Chunk>,

    pub created_at: DateTime<Utc>,
}

/// Size and modification time used to detect a changed source
async fn source_fingerprint(source: &Path) -> Result<(u64, u64)> {
    let metadata = fs::metadata(source)
        .await
        .map_err(|e| VodError::io_at(source, e))?;
    let modified = metadata
        .modified()
        .ok()
        .and_then(|time| time.duration_since(UNIX_EPOCH).ok())
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or_default();

    Ok((metadata.len(), modified))
}

impl SplitManifest {
    /// Describe a finished split of `source`
    pub async fn for_source(
        source: &Path,
        total_duration: f64,
        chunk_size: u64,
        chunks: Vec<Chunk>,
    ) -> Result<Self> {
        let (source_size, source_modified) = source_fingerprint(source).await?;

        Ok(Self {
            source: source.to_path_buf(),
            source_size,
            source_modified,
            total_duration,
            chunk_size,
            chunks,
            created_at: Utc::now(),
        })
    }

    /// Load a manifest, treating a missing or unreadable one as absent
    pub async fn load(path: &Path) -> Option<Self> {
        if !path.exists() {
            debug!("No split manifest at {}", path.display());
            return None;
        }

        match fs::read_to_string(path).await {
            Ok(content) => match serde_json::from_str::<SplitManifest>(&content) {
                Ok(manifest) => Some(manifest),
                Err(e) => {
                    warn!("Failed to parse split manifest {}: {}", path.display(), e);
                    None
                }
            },
            Err(e) => {
                warn!("Failed to read split manifest {}: {}", path.display(), e);
                None
            }
        }
    }

    pub async fn save(&self, path: &Path) -> Result<()> {
        let json_content = serde_json::to_string_pretty(self)?;
        fs::write(path, json_content)
            .await
            .map_err(|e| VodError::io_at(path, e))?;

        info!("💾 Split manifest saved: {}", path.display());
        Ok(())
    }

    /// Whether this manifest still describes `source` split with `chunk_size`
    pub async fn matches_source(&self, source: &Path, chunk_size: u64) -> Result<bool> {
        if self.chunk_size != chunk_size || self.chunks.is_empty() {
            return Ok(false);
        }

        let (size, modified) = source_fingerprint(source).await?;
        Ok(size == self.source_size && modified == self.source_modified)
    }
}
