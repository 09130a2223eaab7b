use crate::config::{DownloadConfig, ToolsConfig};
use crate::error::{Result, VodError};
use crate::process::ToolCommand;
use std::path::{Path, PathBuf};
use tracing::info;
use url::Url;

/// Extract the numeric VOD id from a `https://twitch.tv/videos/<id>` link
pub fn parse_vod_link(link: &str) -> Result<u64> {
    let invalid = || VodError::InvalidLink(link.to_string());

    let url = Url::parse(link.trim()).map_err(|_| invalid())?;
    if !matches!(url.scheme(), "https" | "http") {
        return Err(invalid());
    }
    if !matches!(url.host_str(), Some("twitch.tv") | Some("www.twitch.tv")) {
        return Err(invalid());
    }

    let mut segments = url.path_segments().ok_or_else(invalid)?;
    match (segments.next(), segments.next()) {
        (Some("videos"), Some(id)) => id.parse().map_err(|_| invalid()),
        _ => Err(invalid()),
    }
}

/// Clip slug: the last path segment of a clip link, query dropped
pub fn clip_uid_from_link(link: &str) -> Result<String> {
    let link = link.trim();
    let slug = match Url::parse(link) {
        Ok(url) => url
            .path_segments()
            .and_then(|segments| segments.filter(|s| !s.is_empty()).last().map(str::to_string)),
        Err(_) => link
            .rsplit('/')
            .next()
            .and_then(|last| last.split('?').next())
            .map(str::to_string),
    };

    slug.filter(|s| !s.is_empty())
        .ok_or_else(|| VodError::InvalidLink(link.to_string()))
}

/// Fetches VODs, chat captures and clips through yt-dlp and ttvdl
#[derive(Debug, Clone)]
pub struct Downloader {
    yt_dlp: PathBuf,
    ttvdl: PathBuf,
    settings: DownloadConfig,
}

impl Downloader {
    pub fn new(tools: &ToolsConfig, settings: DownloadConfig) -> Self {
        Self {
            yt_dlp: tools.yt_dlp.clone(),
            ttvdl: tools.ttvdl.clone(),
            settings,
        }
    }

    fn with_oauth(&self, command: ToolCommand) -> ToolCommand {
        match &self.settings.oauth_token {
            Some(token) => command.arg("--oauth").arg(token),
            None => command,
        }
    }

    /// yt-dlp invocation for a VOD
    pub fn vod_command(&self, uid: &str, dest: &Path) -> ToolCommand {
        let command = ToolCommand::new(&self.yt_dlp)
            .arg(format!("https://twitch.tv/videos/{}", uid))
            .arg("-o")
            .arg(dest)
            .arg("-N")
            .arg(self.settings.threads.to_string());
        let command = self.with_oauth(command);

        match &self.settings.proxy {
            Some(proxy) => command.arg("--proxy").arg(proxy),
            None => command,
        }
    }

    /// ttvdl invocation for a chat capture
    pub fn chat_command(&self, uid: &str, dest: &Path) -> ToolCommand {
        self.with_oauth(
            ToolCommand::new(&self.ttvdl)
                .args(["chatdownload", "-u", uid, "-o"])
                .arg(dest),
        )
    }

    pub async fn download_vod(&self, uid: &str, dest: &Path) -> Result<()> {
        if dest.is_file() {
            info!("⏭️ VOD {} already downloaded, skipping", uid);
            return Ok(());
        }

        info!("⬇️ Downloading VOD {}", uid);
        self.vod_command(uid, dest).run().await
    }

    /// Download a chat capture for a VOD or a clip; `what` only labels the logs
    pub async fn download_chat(&self, uid: &str, dest: &Path, what: &str) -> Result<()> {
        if dest.is_file() {
            info!("⏭️ Chat capture for {} {} already downloaded, skipping", what, uid);
            return Ok(());
        }

        info!("💬 Downloading chat capture for {} {}", what, uid);
        self.chat_command(uid, dest).run().await
    }

    /// Download a clip and its chat capture into `clips_dir`
    pub async fn download_clip(&self, link: &str, clips_dir: &Path) -> Result<()> {
        let uid = clip_uid_from_link(link)?;
        let video = clips_dir.join(format!("{}.mp4", uid));

        if video.is_file() {
            info!("⏭️ Clip {} already downloaded, skipping", uid);
        } else {
            info!("⬇️ Downloading clip {}", uid);
            ToolCommand::new(&self.ttvdl)
                .args(["clipdownload", "-u", uid.as_str(), "-o"])
                .arg(&video)
                .run()
                .await?;
        }

        self.download_chat(&uid, &clips_dir.join(format!("{}.json", uid)), "clip")
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_vod_link() {
        assert_eq!(parse_vod_link("https://twitch.tv/videos/2100434565").unwrap(), 2100434565);
        assert_eq!(
            parse_vod_link("https://www.twitch.tv/videos/2100434565?t=1h2m3s").unwrap(),
            2100434565
        );
    }

    #[test]
    fn test_rejects_other_links() {
        for link in [
            "https://youtube.com/watch?v=abc",
            "https://twitch.tv/someone",
            "https://twitch.tv/videos/",
            "https://twitch.tv/videos/notanumber",
            "ftp://twitch.tv/videos/1",
            "twitch.tv/videos/1",
        ] {
            assert!(
                matches!(parse_vod_link(link), Err(VodError::InvalidLink(_))),
                "accepted {}",
                link
            );
        }
    }

    #[test]
    fn test_clip_uid_from_link() {
        assert_eq!(
            clip_uid_from_link("https://clips.twitch.tv/FunnyClipSlug-abc123?tt_medium=x").unwrap(),
            "FunnyClipSlug-abc123"
        );
        assert_eq!(
            clip_uid_from_link("https://www.twitch.tv/someone/clip/OtherSlug\n").unwrap(),
            "OtherSlug"
        );
        assert_eq!(clip_uid_from_link("BareSlug").unwrap(), "BareSlug");
        assert!(clip_uid_from_link("https://clips.twitch.tv/").is_err());
    }

    #[test]
    fn test_commands_carry_credentials_when_configured() {
        let settings = DownloadConfig {
            threads: 4,
            oauth_token: Some("tok".to_string()),
            proxy: Some("http://proxy:8080".to_string()),
        };
        let downloader = Downloader::new(&ToolsConfig::default(), settings);

        assert_eq!(
            downloader.vod_command("42", Path::new("vods/42.mp4")).display(),
            "yt-dlp https://twitch.tv/videos/42 -o vods/42.mp4 -N 4 --oauth tok --proxy http://proxy:8080"
        );
        assert_eq!(
            downloader.chat_command("42", Path::new("vods/42.json")).display(),
            "ttvdl chatdownload -u 42 -o vods/42.json --oauth tok"
        );

        let plain = Downloader::new(&ToolsConfig::default(), DownloadConfig::default());
        assert_eq!(
            plain.chat_command("42", Path::new("vods/42.json")).display(),
            "ttvdl chatdownload -u 42 -o vods/42.json"
        );
    }
}
