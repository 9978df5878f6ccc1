use serde::{Deserialize, Serialize};

/// One chapter of a work.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chapter {
    pub id: String,
    /// Numeric position within the work (e.g. `12.5` for an extra chapter).
    pub ordinal: f64,
    pub page_count: u32,
    #[serde(default)]
    pub title: Option<String>,
}

impl Chapter {
    pub fn new(id: impl Into<String>, ordinal: f64, page_count: u32) -> Self {
        Self {
            id: id.into(),
            ordinal,
            page_count,
            title: None,
        }
    }
}

/// Parse a chapter number as delivered by the metadata service.
///
/// Missing, empty, or non-numeric values yield `0.0`.
pub fn parse_ordinal(raw: Option<&str>) -> f64 {
    raw.map(str::trim)
        .and_then(|s| s.parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

// ---------------------------------------------------------------------------
// Chapter list
// ---------------------------------------------------------------------------

/// Chapters of a work sorted ascending by ordinal.
///
/// The sort is stable, so chapters sharing an ordinal keep fetch order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChapterList {
    chapters: Vec<Chapter>,
}

impl ChapterList {
    pub fn new(mut chapters: Vec<Chapter>) -> Self {
        chapters.sort_by(|a, b| a.ordinal.total_cmp(&b.ordinal));
        Self { chapters }
    }

    pub fn len(&self) -> usize {
        self.chapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chapters.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Chapter> {
        self.chapters.get(index)
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.chapters.iter().position(|c| c.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Chapter> {
        self.chapters.iter()
    }
}

// ---------------------------------------------------------------------------
// Page list of one chapter
// ---------------------------------------------------------------------------

/// Where a chapter's page images live on the image server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterPages {
    pub base_url: String,
    pub hash: String,
    pub files: Vec<String>,
}

impl ChapterPages {
    pub fn urls(&self) -> Vec<String> {
        self.files
            .iter()
            .map(|f| page_image_url(&self.base_url, &self.hash, f))
            .collect()
    }
}

/// `{base_url}/data/{hash}/{file}`
pub fn page_image_url(base_url: &str, hash: &str, file: &str) -> String {
    format!("{base_url}/data/{hash}/{file}")
}

/// Everything the reader needs to open one chapter.
#[derive(Debug, Clone, PartialEq)]
pub struct ChapterContent {
    pub chapter_id: String,
    pub ordinal: f64,
    pub title: Option<String>,
    pub pages: ChapterPages,
    /// Chapter list of the work, present when it was fetched with this chapter.
    pub chapters: Option<Vec<Chapter>>,
}
