use std::path::PathBuf;

use thiserror::Error;

/// Result type for vodtool operations
pub type Result<T> = std::result::Result<T, VodError>;

/// Error types for vodtool operations
#[derive(Debug, Error)]
pub enum VodError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("IO error on `{path}`: {source}")]
    IoAt {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("malformed line {line}: {message}")]
    Format { line: usize, message: String },

    #[error("failed to launch `{tool}`: {source}")]
    ToolLaunch {
        tool: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{tool}` failed (status: {status}){stderr_suffix}")]
    ExternalTool {
        tool: String,
        status: i32,
        stderr_suffix: String,
    },

    #[error("unexpected ffprobe output for `{path}`: {message}")]
    ProbeOutput { path: PathBuf, message: String },

    #[error("chunk #{index} starting at {start:.3}s produced no media, refusing to loop")]
    NonProgress { index: usize, start: f64 },

    #[error("not a Twitch VOD link: {0}")]
    InvalidLink(String),

    #[error("configuration error: {0}")]
    Config(String),
}

impl VodError {
    /// Attach the offending path to an I/O error
    pub fn io_at(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::IoAt {
            path: path.into(),
            source,
        }
    }

    pub fn format(line: usize, message: impl Into<String>) -> Self {
        Self::Format {
            line,
            message: message.into(),
        }
    }

    /// Build an external tool failure, keeping only the trimmed stderr tail
    pub fn tool_failed(tool: impl Into<String>, status: i32, stderr: &str) -> Self {
        let trimmed = stderr.trim();
        let stderr_suffix = if trimmed.is_empty() {
            String::new()
        } else {
            format!("; stderr: {trimmed}")
        };
        Self::ExternalTool {
            tool: tool.into(),
            status,
            stderr_suffix,
        }
    }

    /// True for a missing-file error, regardless of whether the path was attached
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Io(e) | Self::IoAt { source: e, .. } => e.kind() == std::io::ErrorKind::NotFound,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_failed_trims_stderr() {
        let err = VodError::tool_failed("ffmpeg", 1, "  broken pipe \n");
        assert_eq!(err.to_string(), "`ffmpeg` failed (status: 1); stderr: broken pipe");

        let quiet = VodError::tool_failed("yt-dlp", 2, "   ");
        assert_eq!(quiet.to_string(), "`yt-dlp` failed (status: 2)");
    }

    #[test]
    fn test_is_not_found() {
        let missing = VodError::io_at(
            "vods/1.cat",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert!(missing.is_not_found());
        assert!(!VodError::format(1, "no space").is_not_found());
    }
}
