//! Chat-capture export parser
//!
//! Reads the `video` block of a chat-capture JSON export. Chapter offsets are
//! stored in milliseconds and converted to whole seconds by truncating division,
//! which keeps generated maps identical to the ones produced by earlier runs.

use super::{Chapter, ParsedChapters};
use crate::error::Result;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct ChatCaptureDocument {
    video: CapturedVideo,
}

#[derive(Debug, Deserialize)]
struct CapturedVideo {
    title: String,
    created_at: String,
    #[serde(default)]
    chapters: Vec<CapturedChapter>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CapturedChapter {
    description: String,
    start_milliseconds: u64,
    length_milliseconds: u64,
}

impl From<CapturedChapter> for Chapter {
    fn from(chapter: CapturedChapter) -> Self {
        Chapter::new(
            chapter.description,
            (chapter.start_milliseconds / 1000) as f64,
            (chapter.length_milliseconds / 1000) as f64,
        )
    }
}

pub fn parse_chat_capture(content: &str) -> Result<ParsedChapters> {
    let document: ChatCaptureDocument = serde_json::from_str(content)?;
    let video = document.video;

    Ok(ParsedChapters {
        title: video.title,
        date: video.created_at,
        chapters: video.chapters.into_iter().map(Chapter::from).collect(),
    })
}
