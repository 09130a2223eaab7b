/// Chapter/chunk alignment
///
/// Distributes the VOD's chapter timeline over the produced chunks. A chapter
/// that crosses a chunk boundary is split: the current chunk lists it at its
/// local offset and the next chunk lists it again at `0`.

pub mod map;

pub use map::ChapterMap;

use crate::chapters::Chapter;
use crate::split::Chunk;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// A chapter as seen from inside one chunk
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChapterFragment {
    pub name: String,
    /// Seconds from the owning chunk's start
    pub local_start: f64,
}

impl ChapterFragment {
    pub fn new(name: impl Into<String>, local_start: f64) -> Self {
        Self {
            name: name.into(),
            local_start,
        }
    }
}

/// Assign chapters to chunks, one fragment list per chunk in chunk order
///
/// Runs as a single pass over both lists. `chapter_cursor` points at the
/// chapter being placed and `consumed` is how much of it earlier chunks
/// already covered. A chapter starting at or after a chunk's end belongs to a
/// later chunk, so zero-length chapters sitting exactly on a boundary move to
/// the next chunk. Chapters left over after the last chunk are dropped and
/// chunks left over after the last chapter get empty lists.
pub fn align(chunks: &[Chunk], chapters: &[Chapter]) -> Vec<Vec<ChapterFragment>> {
    let mut output = Vec::with_capacity(chunks.len());
    let mut chapter_cursor = 0;
    let mut consumed = 0.0;

    for chunk in chunks {
        let chunk_end = chunk.end();
        let mut fragments = Vec::new();

        while let Some(chapter) = chapters.get(chapter_cursor) {
            let absolute_start = chapter.start + consumed;
            if absolute_start >= chunk_end {
                break;
            }

            fragments.push(ChapterFragment::new(
                chapter.name.clone(),
                absolute_start - chunk.start,
            ));

            if chapter.end() > chunk_end {
                consumed += chunk_end - absolute_start;
                break;
            }

            chapter_cursor += 1;
            consumed = 0.0;
        }

        debug!("Chunk #{}: {} chapter fragments", chunk.index, fragments.len());
        output.push(fragments);
    }

    output
}

/// Align and wrap the result with the VOD's title and date
pub fn build_chapter_map(
    title: impl Into<String>,
    date: impl Into<String>,
    chunks: &[Chunk],
    chapters: &[Chapter],
) -> ChapterMap {
    ChapterMap {
        title: title.into(),
        date: date.into(),
        chunks: align(chunks, chapters),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunks(bounds: &[(f64, f64)]) -> Vec<Chunk> {
        bounds
            .iter()
            .enumerate()
            .map(|(i, &(start, length))| Chunk { index: i + 1, start, length })
            .collect()
    }

    #[test]
    fn test_straddling_chapter_is_split() {
        let chunks = chunks(&[(0.0, 6.0), (6.0, 4.0)]);
        let chapters = vec![Chapter::new("A", 0.0, 5.0), Chapter::new("B", 5.0, 5.0)];

        let aligned = align(&chunks, &chapters);
        assert_eq!(
            aligned,
            vec![
                vec![ChapterFragment::new("A", 0.0), ChapterFragment::new("B", 5.0)],
                vec![ChapterFragment::new("B", 0.0)],
            ]
        );
    }

    #[test]
    fn test_chapter_spanning_several_chunks() {
        let chunks = chunks(&[(0.0, 4.0), (4.0, 4.0), (8.0, 4.0)]);
        let chapters = vec![Chapter::new("Intro", 0.0, 2.0), Chapter::new("Marathon", 2.0, 10.0)];

        let aligned = align(&chunks, &chapters);
        assert_eq!(aligned[0], vec![ChapterFragment::new("Intro", 0.0), ChapterFragment::new("Marathon", 2.0)]);
        assert_eq!(aligned[1], vec![ChapterFragment::new("Marathon", 0.0)]);
        assert_eq!(aligned[2], vec![ChapterFragment::new("Marathon", 0.0)]);
    }

    #[test]
    fn test_chapter_on_boundary_goes_to_next_chunk() {
        let chunks = chunks(&[(0.0, 6.0), (6.0, 6.0)]);
        let chapters = vec![Chapter::new("A", 0.0, 6.0), Chapter::new("B", 6.0, 6.0)];

        let aligned = align(&chunks, &chapters);
        assert_eq!(aligned[0], vec![ChapterFragment::new("A", 0.0)]);
        assert_eq!(aligned[1], vec![ChapterFragment::new("B", 0.0)]);
    }

    #[test]
    fn test_zero_length_chapters() {
        let chunks = chunks(&[(0.0, 6.0), (6.0, 6.0)]);
        let chapters = vec![
            Chapter::new("Marker", 3.0, 0.0),
            Chapter::new("Edge", 6.0, 0.0),
            Chapter::new("Rest", 6.0, 6.0),
        ];

        let aligned = align(&chunks, &chapters);
        assert_eq!(aligned[0], vec![ChapterFragment::new("Marker", 3.0)]);
        assert_eq!(aligned[1], vec![ChapterFragment::new("Edge", 0.0), ChapterFragment::new("Rest", 0.0)]);
    }

    #[test]
    fn test_more_chunks_than_chapters() {
        let chunks = chunks(&[(0.0, 5.0), (5.0, 5.0), (10.0, 5.0)]);
        let chapters = vec![Chapter::new("Only", 0.0, 7.0)];

        let aligned = align(&chunks, &chapters);
        assert_eq!(aligned.len(), 3);
        assert_eq!(aligned[1], vec![ChapterFragment::new("Only", 0.0)]);
        assert!(aligned[2].is_empty());
    }

    #[test]
    fn test_chapter_past_final_chunk_is_cut_off() {
        let chunks = chunks(&[(0.0, 5.0)]);
        let chapters = vec![Chapter::new("Long", 0.0, 60.0), Chapter::new("Never", 60.0, 5.0)];

        let aligned = align(&chunks, &chapters);
        assert_eq!(aligned, vec![vec![ChapterFragment::new("Long", 0.0)]]);
    }

    #[test]
    fn test_gap_between_chapters() {
        let chunks = chunks(&[(0.0, 10.0), (10.0, 10.0)]);
        let chapters = vec![Chapter::new("A", 0.0, 2.0), Chapter::new("B", 15.0, 3.0)];

        let aligned = align(&chunks, &chapters);
        assert_eq!(aligned[0], vec![ChapterFragment::new("A", 0.0)]);
        assert_eq!(aligned[1], vec![ChapterFragment::new("B", 5.0)]);
    }

    #[test]
    fn test_no_chunks_or_no_chapters() {
        assert!(align(&[], &[Chapter::new("A", 0.0, 1.0)]).is_empty());
        assert_eq!(align(&chunks(&[(0.0, 1.0)]), &[]), vec![Vec::new()]);
    }
}
