/// Chapter sources and the canonical chapter list
///
/// Both supported inputs, a chat-capture export and a hand-written category
/// file, normalize into the same `ParsedChapters` shape consumed by the aligner.

pub mod category;
pub mod chat_capture;

pub use category::parse_category_file;
pub use chat_capture::parse_chat_capture;

use crate::error::{Result, VodError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

/// A single chapter on the full VOD timeline
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Chapter {
    /// Chapter name as shown to viewers
    pub name: String,
    /// Offset from the start of the VOD in seconds
    pub start: f64,
    /// Length in seconds
    pub length: f64,
}

impl Chapter {
    pub fn new(name: impl Into<String>, start: f64, length: f64) -> Self {
        Self {
            name: name.into(),
            start,
            length,
        }
    }

    pub fn end(&self) -> f64 {
        self.start + self.length
    }
}

/// Title, date and ordered chapters of one VOD
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ParsedChapters {
    pub title: String,
    pub date: String,
    pub chapters: Vec<Chapter>,
}

/// Where a VOD's chapter timeline comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChapterSource {
    /// Chat-capture JSON export downloaded alongside the VOD
    ChatCapture(PathBuf),
    /// Hand-authored `.cat` category file
    CategoryFile(PathBuf),
}

impl ChapterSource {
    pub fn path(&self) -> &Path {
        match self {
            ChapterSource::ChatCapture(path) | ChapterSource::CategoryFile(path) => path,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ChapterSource::ChatCapture(_) => "chat capture",
            ChapterSource::CategoryFile(_) => "category file",
        }
    }

    /// Read the source file and parse it with the matching parser
    pub async fn load(&self) -> Result<ParsedChapters> {
        let path = self.path();
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| VodError::io_at(path, e))?;

        let parsed = self.parse(&content)?;

        info!(
            "📑 Parsed {} chapters from {} {}",
            parsed.chapters.len(),
            self.kind(),
            path.display()
        );
        Ok(parsed)
    }

    /// Parse already-loaded content
    pub fn parse(&self, content: &str) -> Result<ParsedChapters> {
        match self {
            ChapterSource::ChatCapture(_) => parse_chat_capture(content),
            ChapterSource::CategoryFile(_) => parse_category_file(content),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_dispatch() {
        let cat = ChapterSource::CategoryFile(PathBuf::from("vods/1.cat"));
        let parsed = cat.parse("2024-01-01 Title\n60 Intro\n").unwrap();
        assert_eq!(parsed.chapters, vec![Chapter::new("Intro", 0.0, 60.0)]);

        let cc = ChapterSource::ChatCapture(PathBuf::from("vods/1.json"));
        assert!(cc.parse("2024-01-01 Title\n60 Intro\n").is_err());
        assert_eq!(cc.kind(), "chat capture");
    }

    #[tokio::test]
    async fn test_load_missing_file_is_io_error() {
        let source = ChapterSource::CategoryFile(PathBuf::from("does/not/exist.cat"));
        let err = source.load().await.unwrap_err();
        assert!(err.is_not_found());
    }
}
