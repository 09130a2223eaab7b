use crate::config::ToolsConfig;
use crate::error::{Result, VodError};
use crate::format::{pretty_bytes, pretty_time};
use crate::process::ToolCommand;
use crate::split::{ChunkCutter, CutOutcome, DurationProbe};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Duration substituted when ffprobe cannot tell how long a file is.
/// Zero would stall the chunk loop, so any positive value keeps it moving.
pub const UNKNOWN_DURATION: f64 = 1.0;

/// Interpret ffprobe's `format.duration` field
///
/// `N/A` or anything else unparseable maps to `UNKNOWN_DURATION`.
pub fn parse_probe_duration(raw: &str) -> f64 {
    match raw.trim().parse::<f64>() {
        Ok(seconds) if seconds.is_finite() => seconds,
        _ => {
            warn!("⚠️ ffprobe reported duration `{}`, assuming {}s", raw.trim(), UNKNOWN_DURATION);
            UNKNOWN_DURATION
        }
    }
}

/// Extract the duration from `ffprobe -print_format json -show_format` output
///
/// The JSON writer leaves unknown fields out instead of printing `N/A`, so an
/// absent or null `format.duration` also maps to `UNKNOWN_DURATION`.
pub fn duration_from_probe_output(stdout: &str, path: &Path) -> Result<f64> {
    let probe: serde_json::Value = serde_json::from_str(stdout)?;

    let format = probe
        .get("format")
        .filter(|format| format.is_object())
        .ok_or_else(|| VodError::ProbeOutput {
            path: path.to_path_buf(),
            message: "no `format` object".to_string(),
        })?;

    match format.get("duration") {
        Some(serde_json::Value::String(raw)) => Ok(parse_probe_duration(raw)),
        Some(serde_json::Value::Number(n)) => Ok(parse_probe_duration(&n.to_string())),
        Some(serde_json::Value::Null) | None => Ok(parse_probe_duration("N/A")),
        Some(other) => Ok(parse_probe_duration(&other.to_string())),
    }
}

/// ffprobe/ffmpeg front end
#[derive(Debug, Clone)]
pub struct MediaTools {
    ffmpeg: PathBuf,
    ffprobe: PathBuf,
}

impl MediaTools {
    pub fn new(tools: &ToolsConfig) -> Self {
        Self {
            ffmpeg: tools.ffmpeg.clone(),
            ffprobe: tools.ffprobe.clone(),
        }
    }

    /// Duration of a media file in seconds
    pub async fn probe_duration(&self, path: &Path) -> Result<f64> {
        let stdout = ToolCommand::new(&self.ffprobe)
            .args(["-v", "quiet", "-print_format", "json", "-show_format"])
            .arg(path)
            .output()
            .await?;

        duration_from_probe_output(&stdout, path)
    }

    /// Stream-copy at most `byte_budget` bytes of `source` starting at `start` into `dest`
    pub async fn cut_chunk(&self, source: &Path, start: f64, byte_budget: u64, dest: &Path) -> Result<()> {
        ToolCommand::new(&self.ffmpeg)
            .arg("-ss")
            .arg(start.to_string())
            .arg("-i")
            .arg(source)
            .arg("-fs")
            .arg(byte_budget.to_string())
            .args(["-c", "copy"])
            .arg(dest)
            .arg("-y")
            .output()
            .await?;

        Ok(())
    }
}

#[async_trait]
impl DurationProbe for MediaTools {
    async fn duration(&self, path: &Path) -> Result<f64> {
        self.probe_duration(path).await
    }
}

/// Cuts chunks of one VOD into `<chunk_dir>/<index>.mp4`
pub struct FfmpegCutter<'a> {
    tools: &'a MediaTools,
    source: PathBuf,
    chunk_dir: PathBuf,
}

impl<'a> FfmpegCutter<'a> {
    pub fn new(tools: &'a MediaTools, source: PathBuf, chunk_dir: PathBuf) -> Self {
        Self {
            tools,
            source,
            chunk_dir,
        }
    }

    pub fn chunk_path(&self, index: usize) -> PathBuf {
        self.chunk_dir.join(format!("{}.mp4", index))
    }
}

#[async_trait]
impl ChunkCutter for FfmpegCutter<'_> {
    async fn cut(&mut self, index: usize, start: f64, byte_budget: u64) -> Result<CutOutcome> {
        let dest = self.chunk_path(index);

        self.tools.cut_chunk(&self.source, start, byte_budget, &dest).await?;

        let duration = self.tools.probe_duration(&dest).await?;
        let bytes = tokio::fs::metadata(&dest)
            .await
            .map_err(|e| VodError::io_at(&dest, e))?
            .len();

        info!(
            "🎞️ Chunk #{}; Length: {}; File size: ≈{}",
            index,
            pretty_time(duration),
            pretty_bytes(bytes)
        );

        Ok(CutOutcome { bytes, duration })
    }
}
