use crate::alignment::{build_chapter_map, ChapterMap};
use crate::chapters::ChapterSource;
use crate::config::Config;
use crate::download::Downloader;
use crate::error::{Result, VodError};
use crate::media::{FfmpegCutter, MediaTools};
use crate::split::{split_source, ChunkCutter, DurationProbe};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// File layout of one VOD inside the VODs directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VodPaths {
    root: PathBuf,
    uid: String,
}

impl VodPaths {
    pub fn new(vods_dir: &Path, uid: &str) -> Self {
        Self {
            root: vods_dir.to_path_buf(),
            uid: uid.to_string(),
        }
    }

    pub fn uid(&self) -> &str {
        &self.uid
    }

    fn sibling(&self, extension: &str) -> PathBuf {
        self.root.join(format!("{}.{}", self.uid, extension))
    }

    pub fn video(&self) -> PathBuf {
        self.sibling("mp4")
    }

    pub fn chat_capture(&self) -> PathBuf {
        self.sibling("json")
    }

    pub fn category_file(&self) -> PathBuf {
        self.sibling("cat")
    }

    pub fn chapter_map(&self) -> PathBuf {
        self.sibling("map.json")
    }

    /// Directory holding `<index>.mp4` chunk files
    pub fn chunk_dir(&self) -> PathBuf {
        self.root.join(&self.uid)
    }

    pub fn split_manifest(&self) -> PathBuf {
        self.chunk_dir().join("chunks.json")
    }
}

/// How a pipeline command finished
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineOutcome {
    /// A chapter map was produced in this run
    Completed {
        map_path: PathBuf,
        chunks: usize,
        fragments: usize,
    },
    /// A chapter map from an earlier run already exists
    AlreadyDone(PathBuf),
}

async fn ensure_dir(dir: &Path) -> Result<()> {
    if !dir.is_dir() {
        info!("📁 No {}/ directory, creating one", dir.display());
    }
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| VodError::io_at(dir, e))
}

fn require_file(path: &Path, what: &str) -> Result<()> {
    if path.is_file() {
        Ok(())
    } else {
        Err(VodError::io_at(
            path,
            std::io::Error::new(std::io::ErrorKind::NotFound, format!("no such {}", what)),
        ))
    }
}

/// Runs download/split/align commands against the configured directories
pub struct VodPipeline {
    config: Config,
    media: MediaTools,
    downloader: Downloader,
}

impl VodPipeline {
    pub fn new(config: Config) -> Self {
        let media = MediaTools::new(&config.tools);
        let downloader = Downloader::new(&config.tools, config.download.clone());

        Self {
            config,
            media,
            downloader,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn paths(&self, uid: &str) -> VodPaths {
        VodPaths::new(&self.config.paths.vods_dir, uid)
    }

    fn existing_map(&self, paths: &VodPaths, force: bool) -> Option<PathBuf> {
        let map_path = paths.chapter_map();
        if !force && map_path.is_file() {
            info!("⏭️ Chapter map for {} already exists: {}", paths.uid(), map_path.display());
            Some(map_path)
        } else {
            None
        }
    }

    /// Download a VOD and its chat capture, split it and map chat-capture chapters onto the chunks
    pub async fn download(&self, uid: &str, force: bool) -> Result<PipelineOutcome> {
        let paths = self.paths(uid);
        ensure_dir(&self.config.paths.vods_dir).await?;

        if let Some(map_path) = self.existing_map(&paths, force) {
            return Ok(PipelineOutcome::AlreadyDone(map_path));
        }

        self.downloader.download_vod(uid, &paths.video()).await?;
        self.downloader
            .download_chat(uid, &paths.chat_capture(), "VOD")
            .await?;

        self.split_and_map(&paths, ChapterSource::ChatCapture(paths.chat_capture()))
            .await
    }

    /// Split an already downloaded VOD and map its category file onto the chunks
    pub async fn categorize(&self, uid: &str, force: bool) -> Result<PipelineOutcome> {
        let paths = self.paths(uid);

        require_file(&paths.category_file(), "category file")?;
        require_file(&paths.video(), "VOD file")?;

        if let Some(map_path) = self.existing_map(&paths, force) {
            return Ok(PipelineOutcome::AlreadyDone(map_path));
        }

        self.split_and_map(&paths, ChapterSource::CategoryFile(paths.category_file()))
            .await
    }

    async fn split_and_map(&self, paths: &VodPaths, source: ChapterSource) -> Result<PipelineOutcome> {
        require_file(&paths.video(), "VOD file")?;

        let mut cutter = FfmpegCutter::new(&self.media, paths.video(), paths.chunk_dir());
        let map = self.build_map_with(paths, &source, &self.media, &mut cutter).await?;

        Ok(PipelineOutcome::Completed {
            map_path: paths.chapter_map(),
            chunks: map.chunks.len(),
            fragments: map.fragment_count(),
        })
    }

    /// Parse chapters, split (or reuse an earlier split), align and write the chapter map
    ///
    /// The map file is written last, so a failure anywhere before leaves no map behind.
    pub async fn build_map_with<P, C>(
        &self,
        paths: &VodPaths,
        source: &ChapterSource,
        probe: &P,
        cutter: &mut C,
    ) -> Result<ChapterMap>
    where
        P: DurationProbe + ?Sized,
        C: ChunkCutter + ?Sized,
    {
        let parsed = source.load().await?;
        if parsed.chapters.is_empty() {
            warn!("⚠️ {} has no chapters, chunks will be listed without any", source.path().display());
        }

        ensure_dir(&paths.chunk_dir()).await?;
        let chunks = split_source(
            probe,
            cutter,
            &paths.video(),
            &paths.split_manifest(),
            self.config.split.chunk_size,
        )
        .await?;

        info!("🗺️ Generating chapter map for VOD {}", paths.uid());
        let map = build_chapter_map(parsed.title, parsed.date, &chunks, &parsed.chapters);
        map.save(&paths.chapter_map()).await?;

        Ok(map)
    }

    /// Human-readable listing of a stored chapter map
    pub async fn print_chapter_map(&self, uid: &str) -> Result<String> {
        let map_path = self.paths(uid).chapter_map();
        require_file(&map_path, "chapter map")?;
        Ok(ChapterMap::load(&map_path).await?.render())
    }

    /// Download every clip listed (one link per line) in `list_file`
    pub async fn download_clips(&self, list_file: &Path) -> Result<usize> {
        let content = tokio::fs::read_to_string(list_file)
            .await
            .map_err(|e| VodError::io_at(list_file, e))?;

        let clips_dir = &self.config.paths.clips_dir;
        ensure_dir(clips_dir).await?;

        let mut count = 0;
        for link in content.lines().map(str::trim).filter(|l| !l.is_empty()) {
            self.downloader.download_clip(link, clips_dir).await?;
            count += 1;
        }

        info!("🎬 Processed {} clips", count);
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vod_paths_layout() {
        let paths = VodPaths::new(Path::new("vods"), "2100434565");

        assert_eq!(paths.video(), PathBuf::from("vods/2100434565.mp4"));
        assert_eq!(paths.chat_capture(), PathBuf::from("vods/2100434565.json"));
        assert_eq!(paths.category_file(), PathBuf::from("vods/2100434565.cat"));
        assert_eq!(paths.chapter_map(), PathBuf::from("vods/2100434565.map.json"));
        assert_eq!(paths.chunk_dir(), PathBuf::from("vods/2100434565"));
        assert_eq!(paths.split_manifest(), PathBuf::from("vods/2100434565/chunks.json"));
    }

    #[tokio::test]
    async fn test_categorize_requires_inputs() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let config = crate::config::ConfigBuilder::new()
            .with_vods_dir(temp_dir.path().to_path_buf())
            .build();
        let pipeline = VodPipeline::new(config);

        let err = pipeline.categorize("7", false).await.unwrap_err();
        assert!(err.is_not_found());
        assert!(err.to_string().contains("7.cat"));

        tokio::fs::write(temp_dir.path().join("7.cat"), "01.01.2024 T\n10 A\n")
            .await
            .unwrap();
        let err = pipeline.categorize("7", false).await.unwrap_err();
        assert!(err.to_string().contains("7.mp4"));
    }

    #[tokio::test]
    async fn test_print_missing_map() {
        let pipeline = VodPipeline::new(Config::default());
        let err = pipeline.print_chapter_map("no-such-vod-uid").await.unwrap_err();
        assert!(err.is_not_found());
    }
}
