/// vodtool - VOD chunking and chapter mapping
///
/// Splits long stream recordings into upload-sized chunks and works out which
/// chapters (and at which offset) fall inside each chunk.

pub mod alignment;
pub mod chapters;
pub mod config;
pub mod download;
pub mod error;
pub mod format;
pub mod media;
pub mod pipeline;
pub mod process;
pub mod split;

// Re-export main types for easy access
pub use crate::alignment::{align, build_chapter_map, ChapterFragment, ChapterMap};
pub use crate::chapters::{Chapter, ChapterSource, ParsedChapters};
pub use crate::config::{Config, ConfigBuilder};
pub use crate::download::{parse_vod_link, Downloader};
pub use crate::error::{Result, VodError};
pub use crate::media::{FfmpegCutter, MediaTools};
pub use crate::pipeline::{PipelineOutcome, VodPaths, VodPipeline};
pub use crate::split::{plan, split_source, Chunk, ChunkCutter, CutOutcome, DurationProbe, SplitManifest};
