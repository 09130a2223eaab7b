use crate::error::{Result, VodError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration for vodtool
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Working directory layout
    pub paths: PathsConfig,

    /// Chunking settings
    pub split: SplitConfig,

    /// External tool locations
    pub tools: ToolsConfig,

    /// Download settings and credentials
    pub download: DownloadConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Directory holding VODs, chat captures, category files, chunks and maps
    pub vods_dir: PathBuf,

    /// Directory for downloaded clips
    pub clips_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SplitConfig {
    /// Upper bound for a single chunk file in bytes
    pub chunk_size: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    pub ffmpeg: PathBuf,
    pub ffprobe: PathBuf,
    pub yt_dlp: PathBuf,
    pub ttvdl: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DownloadConfig {
    /// Concurrent fragment downloads passed to yt-dlp
    pub threads: u32,

    /// OAuth token for subscriber-only VODs and chat
    pub oauth_token: Option<String>,

    /// Proxy URL for VOD downloads
    pub proxy: Option<String>,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            vods_dir: PathBuf::from("vods"),
            clips_dir: PathBuf::from("clips"),
        }
    }
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            chunk_size: 2_000_000_000, // fits a 2 GB upload limit
        }
    }
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            ffmpeg: PathBuf::from("ffmpeg"),
            ffprobe: PathBuf::from("ffprobe"),
            yt_dlp: PathBuf::from("yt-dlp"),
            ttvdl: PathBuf::from("ttvdl"),
        }
    }
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            threads: 12,
            oauth_token: None,
            proxy: None,
        }
    }
}

impl Config {
    /// Load configuration from the first config file found, then apply environment overrides
    pub fn load() -> Result<Self> {
        let config_paths = ["vodtool.toml", "config/vodtool.toml"];

        for path in &config_paths {
            let path = Path::new(path);
            if path.is_file() {
                return Self::from_file(path);
            }
        }

        Self::from_env()
    }

    /// Load configuration from a specific TOML file, then apply environment overrides
    pub fn from_file(path: &Path) -> Result<Self> {
        let config_str = std::fs::read_to_string(path).map_err(|e| VodError::io_at(path, e))?;
        let mut config: Config = toml::from_str(&config_str)
            .map_err(|e| VodError::Config(format!("{}: {}", path.display(), e)))?;

        tracing::info!("📄 Loaded configuration from: {}", path.display());
        config.apply_env()?;
        Ok(config)
    }

    /// Defaults overridden by environment variables
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env()?;
        Ok(config)
    }

    fn apply_env(&mut self) -> Result<()> {
        if let Ok(dir) = std::env::var("VODTOOL_VODS_DIR") {
            self.paths.vods_dir = PathBuf::from(dir);
        }

        if let Ok(dir) = std::env::var("VODTOOL_CLIPS_DIR") {
            self.paths.clips_dir = PathBuf::from(dir);
        }

        if let Ok(size) = std::env::var("VODTOOL_CHUNK_SIZE") {
            self.split.chunk_size = size
                .parse()
                .map_err(|_| VodError::Config(format!("VODTOOL_CHUNK_SIZE is not a byte count: {}", size)))?;
        }

        if let Ok(token) = std::env::var("VODTOOL_OAUTH_TOKEN") {
            self.download.oauth_token = Some(token);
        }

        if let Ok(proxy) = std::env::var("VODTOOL_PROXY") {
            self.download.proxy = Some(proxy);
        }

        Ok(())
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> Result<()> {
        let config_str = toml::to_string_pretty(self).map_err(|e| VodError::Config(e.to_string()))?;
        std::fs::write(path, config_str).map_err(|e| VodError::io_at(path, e))?;
        tracing::info!("💾 Configuration saved to: {}", path.display());
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.split.chunk_size == 0 {
            return Err(VodError::Config("split.chunk_size must be greater than 0".to_string()));
        }

        if self.download.threads == 0 {
            return Err(VodError::Config("download.threads must be greater than 0".to_string()));
        }

        let tools = [
            ("ffmpeg", &self.tools.ffmpeg),
            ("ffprobe", &self.tools.ffprobe),
            ("yt_dlp", &self.tools.yt_dlp),
            ("ttvdl", &self.tools.ttvdl),
        ];
        for (name, path) in tools {
            if path.as_os_str().is_empty() {
                return Err(VodError::Config(format!("tools.{} must not be empty", name)));
            }
        }

        if self.download.oauth_token.as_deref().map_or(false, |t| t.trim().is_empty()) {
            return Err(VodError::Config("download.oauth_token is set but empty".to_string()));
        }

        tracing::debug!("✅ Configuration validation passed");
        Ok(())
    }

    /// Get runtime configuration summary
    pub fn summary(&self) -> String {
        format!(
            "vodtool configuration:\n\
            - VODs directory: {}\n\
            - Clips directory: {}\n\
            - Chunk size: {}\n\
            - Download threads: {}\n\
            - OAuth token: {}\n\
            - Proxy: {}",
            self.paths.vods_dir.display(),
            self.paths.clips_dir.display(),
            crate::format::pretty_bytes(self.split.chunk_size),
            self.download.threads,
            if self.download.oauth_token.is_some() { "set" } else { "not set" },
            self.download.proxy.as_deref().unwrap_or("none"),
        )
    }
}

/// Configuration builder for programmatic config creation
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    pub fn with_vods_dir(mut self, dir: PathBuf) -> Self {
        self.config.paths.vods_dir = dir;
        self
    }

    pub fn with_clips_dir(mut self, dir: PathBuf) -> Self {
        self.config.paths.clips_dir = dir;
        self
    }

    pub fn with_chunk_size(mut self, bytes: u64) -> Self {
        self.config.split.chunk_size = bytes;
        self
    }

    pub fn with_oauth_token(mut self, token: String) -> Self {
        self.config.download.oauth_token = Some(token);
        self
    }

    pub fn with_proxy(mut self, proxy: String) -> Self {
        self.config.download.proxy = Some(proxy);
        self
    }

    pub fn with_tools(mut self, tools: ToolsConfig) -> Self {
        self.config.tools = tools;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
