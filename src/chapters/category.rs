//! Category file parser
//!
//! ```text
//! 01.01.2024 Stream Title
//! 120 Intro
//! 300 Gameplay
//! ```
//!
//! The header holds the date and title; every following line is a chapter
//! length in whole seconds and its name. Starts are accumulated in file order.

use super::{Chapter, ParsedChapters};
use crate::error::{Result, VodError};

pub fn parse_category_file(content: &str) -> Result<ParsedChapters> {
    let mut lines = content.lines();

    let header = lines
        .next()
        .map(str::trim_end)
        .ok_or_else(|| VodError::format(1, "empty category file"))?;
    let (date, title) = header
        .split_once(' ')
        .ok_or_else(|| VodError::format(1, format!("expected `<date> <title>`, got `{}`", header)))?;

    let mut chapters = Vec::new();
    let mut cursor = 0.0;

    for (offset, line) in lines.enumerate() {
        let line_no = offset + 2;
        let line = line.trim_end();
        if line.is_empty() {
            continue;
        }

        let (length, name) = line.split_once(' ').ok_or_else(|| {
            VodError::format(line_no, format!("expected `<seconds> <name>`, got `{}`", line))
        })?;
        let length: u64 = length.parse().map_err(|_| {
            VodError::format(line_no, format!("chapter length `{}` is not a whole number", length))
        })?;

        let length = length as f64;
        chapters.push(Chapter::new(name, cursor, length));
        cursor += length;
    }

    Ok(ParsedChapters {
        title: title.to_string(),
        date: date.to_string(),
        chapters,
    })
}
