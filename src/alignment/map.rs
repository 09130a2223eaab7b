use super::ChapterFragment;
use crate::error::{Result, VodError};
use crate::format::pretty_time;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::io::Write as _;
use std::path::Path;
use tracing::info;

/// Per-chunk chapter listing for one VOD
///
/// Persisted as `{"name", "date", "chunks": [[{"name", "start"}]]}` with
/// `start` in whole seconds from the chunk start; the uploader reads that file
/// back as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "MapDocument", from = "MapDocument")]
pub struct ChapterMap {
    pub title: String,
    /// Date as given by the chapter source
    pub date: String,
    /// One fragment list per chunk, in chunk order
    pub chunks: Vec<Vec<ChapterFragment>>,
}

#[derive(Serialize, Deserialize)]
struct MapDocument {
    name: String,
    date: String,
    chunks: Vec<Vec<MapEntry>>,
}

#[derive(Serialize, Deserialize)]
struct MapEntry {
    name: String,
    start: u64,
}

impl From<ChapterMap> for MapDocument {
    fn from(map: ChapterMap) -> Self {
        let chunks = map
            .chunks
            .into_iter()
            .map(|fragments| {
                fragments
                    .into_iter()
                    .map(|fragment| MapEntry {
                        name: fragment.name,
                        // saturating: tiny negative float residue becomes 0
                        start: fragment.local_start as u64,
                    })
                    .collect()
            })
            .collect();

        Self {
            name: map.title,
            date: map.date,
            chunks,
        }
    }
}

impl From<MapDocument> for ChapterMap {
    fn from(doc: MapDocument) -> Self {
        let chunks = doc
            .chunks
            .into_iter()
            .map(|entries| {
                entries
                    .into_iter()
                    .map(|entry| ChapterFragment::new(entry.name, entry.start as f64))
                    .collect()
            })
            .collect();

        Self {
            title: doc.name,
            date: doc.date,
            chunks,
        }
    }
}

impl ChapterMap {
    /// Write the map atomically: a crash never leaves a half-written file behind
    pub async fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_vec(self)?;
        let target = path.to_path_buf();

        tokio::task::spawn_blocking(move || write_atomically(&target, &json))
            .await
            .map_err(|e| VodError::Io(std::io::Error::new(std::io::ErrorKind::Other, e)))??;

        info!("🗺️ Chapter map saved: {}", path.display());
        Ok(())
    }

    pub async fn load(path: &Path) -> Result<Self> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| VodError::io_at(path, e))?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Human-readable listing, one block per chunk followed by the post header
    pub fn render(&self) -> String {
        let mut out = String::new();

        for (number, fragments) in self.chunks.iter().enumerate() {
            let _ = writeln!(out, "[часть №{}]", number + 1);
            for fragment in fragments {
                let _ = writeln!(out, "{} - {}", pretty_time(fragment.local_start), fragment.name);
            }
            out.push('\n');
        }

        let _ = writeln!(out, "{}", self.post_header());
        out
    }

    /// Caption announcing the VOD, e.g. `[04.05.2024] Title`
    pub fn post_header(&self) -> String {
        format!("[{}] {}\nв комментариях 👀", display_date(&self.date), self.title)
    }

    pub fn fragment_count(&self) -> usize {
        self.chunks.iter().map(Vec::len).sum()
    }
}

/// Stage `bytes` in a temp file next to `path`, then rename it into place
fn write_atomically(path: &Path, bytes: &[u8]) -> Result<()> {
    let dir = path
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let mut staged = tempfile::NamedTempFile::new_in(dir).map_err(|e| VodError::io_at(dir, e))?;
    staged
        .write_all(bytes)
        .map_err(|e| VodError::io_at(staged.path(), e))?;
    staged
        .persist(path)
        .map_err(|e| VodError::io_at(path, e.error))?;
    Ok(())
}

/// Render a source date as `dd.mm.yyyy`, falling back to the raw string
fn display_date(raw: &str) -> String {
    const OUT: &str = "%d.%m.%Y";

    if let Ok(datetime) = DateTime::parse_from_rfc3339(raw) {
        return datetime.format(OUT).to_string();
    }
    for pattern in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(raw, pattern) {
            return datetime.format(OUT).to_string();
        }
    }
    for pattern in ["%Y-%m-%d", "%d.%m.%Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(raw, pattern) {
            return date.format(OUT).to_string();
        }
    }
    raw.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample_map() -> ChapterMap {
        ChapterMap {
            title: "Stream Title".to_string(),
            date: "2024-05-04T18:00:00Z".to_string(),
            chunks: vec![
                vec![ChapterFragment::new("A", 0.0), ChapterFragment::new("B", 5.75)],
                vec![ChapterFragment::new("B", 0.0)],
                vec![],
            ],
        }
    }

    #[test]
    fn test_serialized_shape() {
        let value = serde_json::to_value(sample_map()).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "name": "Stream Title",
                "date": "2024-05-04T18:00:00Z",
                "chunks": [
                    [{"name": "A", "start": 0}, {"name": "B", "start": 5}],
                    [{"name": "B", "start": 0}],
                    []
                ]
            })
        );
    }

    #[tokio::test]
    async fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("42.map.json");

        sample_map().save(&path).await.unwrap();
        let loaded = ChapterMap::load(&path).await.unwrap();

        assert_eq!(loaded.title, "Stream Title");
        assert_eq!(loaded.chunks[0][1], ChapterFragment::new("B", 5.0));
        assert_eq!(loaded.fragment_count(), 3);
    }

    #[tokio::test]
    async fn test_load_missing_map() {
        let err = ChapterMap::load(Path::new("no/such/map.json")).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_render() {
        let expected = "[часть №1]\n00:00:00 - A\n00:00:05 - B\n\n\
                        [часть №2]\n00:00:00 - B\n\n\
                        [часть №3]\n\n\
                        [04.05.2024] Stream Title\nв комментариях 👀\n";
        assert_eq!(sample_map().render(), expected);
    }

    #[test]
    fn test_display_date_formats() {
        assert_eq!(display_date("2024-05-04T18:00:00Z"), "04.05.2024");
        assert_eq!(display_date("2024-05-04T23:30:00.123456-05:00"), "04.05.2024");
        assert_eq!(display_date("2024-05-04T18:00:00"), "04.05.2024");
        assert_eq!(display_date("2024-05-04"), "04.05.2024");
        assert_eq!(display_date("01.01.2024"), "01.01.2024");
        assert_eq!(display_date("sometime"), "sometime");
    }
}
