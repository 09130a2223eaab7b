/// Size-bounded chunk planning
///
/// A VOD is cut into consecutive pieces by asking an external tool to copy at
/// most `byte_threshold` bytes starting at a time offset. The tool decides where
/// the piece actually ends, so every chunk length is measured after the cut and
/// the next cut starts exactly where the previous one stopped.

pub mod manifest;

pub use manifest::SplitManifest;

use crate::error::{Result, VodError};
use crate::format::pretty_bytes;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

/// One produced piece of the VOD
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Chunk {
    /// 1-based position, also the chunk file name
    pub index: usize,
    /// Offset of the chunk within the full VOD in seconds
    pub start: f64,
    /// Measured length in seconds
    pub length: f64,
}

impl Chunk {
    pub fn end(&self) -> f64 {
        self.start + self.length
    }
}

/// What a single cut actually produced
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CutOutcome {
    pub bytes: u64,
    pub duration: f64,
}

/// Produces one chunk artifact per call
#[async_trait]
pub trait ChunkCutter: Send {
    /// Cut chunk `index` starting at `start` seconds, copying at most `byte_budget` bytes
    async fn cut(&mut self, index: usize, start: f64, byte_budget: u64) -> Result<CutOutcome>;
}

/// Measures media duration in seconds
#[async_trait]
pub trait DurationProbe: Sync {
    async fn duration(&self, path: &Path) -> Result<f64>;
}

/// Plan and perform the cuts covering `[0, total_duration)`
///
/// Cuts run strictly one after another: the measured duration of cut N decides
/// where cut N+1 starts. A cut that yields no duration aborts the plan.
pub async fn plan<C>(total_duration: f64, byte_threshold: u64, cutter: &mut C) -> Result<Vec<Chunk>>
where
    C: ChunkCutter + ?Sized,
{
    let mut chunks = Vec::new();
    let mut cursor = 0.0;
    let mut index = 1;

    while cursor < total_duration {
        debug!("✂️ Cutting chunk #{} at {:.3}s", index, cursor);
        let outcome = cutter.cut(index, cursor, byte_threshold).await?;

        // also rejects NaN
        if !(outcome.duration > 0.0) {
            return Err(VodError::NonProgress { index, start: cursor });
        }

        chunks.push(Chunk {
            index,
            start: cursor,
            length: outcome.duration,
        });
        cursor += outcome.duration;
        index += 1;
    }

    info!("🧩 Total chunks: {}", chunks.len());
    Ok(chunks)
}

/// Split `source`, or return the chunks recorded by an earlier complete split
///
/// The manifest at `manifest_path` is only trusted when the source file is
/// unchanged and was cut with the same `chunk_size`; in that case the cutter
/// is never invoked. A fresh split writes the manifest after the last cut.
pub async fn split_source<P, C>(
    probe: &P,
    cutter: &mut C,
    source: &Path,
    manifest_path: &Path,
    chunk_size: u64,
) -> Result<Vec<Chunk>>
where
    P: DurationProbe + ?Sized,
    C: ChunkCutter + ?Sized,
{
    if let Some(manifest) = SplitManifest::load(manifest_path).await {
        if manifest.matches_source(source, chunk_size).await? {
            info!(
                "⏭️ {} already split into {} chunks, skipping",
                source.display(),
                manifest.chunks.len()
            );
            return Ok(manifest.chunks);
        }
        info!("🔄 {} changed since the last split, splitting again", source.display());
    }

    let total_duration = probe.duration(source).await?;
    info!(
        "🔪 Splitting {} ({:.1}s), chunk size ≈{}",
        source.display(),
        total_duration,
        pretty_bytes(chunk_size)
    );

    let chunks = plan(total_duration, chunk_size, cutter).await?;

    SplitManifest::for_source(source, total_duration, chunk_size, chunks.clone())
        .await?
        .save(manifest_path)
        .await?;

    Ok(chunks)
}
