//! Shareable reader location: `{workId}/{page}?chapter={chapterId}`.

use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

const READER_PREFIX: &str = "reader/";

/// A position that survives reload and can be shared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub work_id: String,
    /// 1-based page index.
    pub page: u32,
    pub chapter_id: String,
}

impl Location {
    pub fn new(work_id: impl Into<String>, page: u32, chapter_id: impl Into<String>) -> Self {
        Self {
            work_id: work_id.into(),
            page,
            chapter_id: chapter_id.into(),
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}?chapter={}", self.work_id, self.page, self.chapter_id)
    }
}

impl FromStr for Location {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| CoreError::InvalidLocation {
            reason: format!("{reason} in {s:?}"),
        };

        let s = s.trim().trim_start_matches('/');
        let s = s.strip_prefix(READER_PREFIX).unwrap_or(s);
        let (path, query) = s.split_once('?').ok_or_else(|| invalid("missing query"))?;
        let (work_id, page) = path
            .split_once('/')
            .ok_or_else(|| invalid("missing page segment"))?;
        if work_id.is_empty() {
            return Err(invalid("empty work id"));
        }

        let chapter_id = query
            .split('&')
            .find_map(|pair| pair.strip_prefix("chapter="))
            .filter(|id| !id.is_empty())
            .ok_or_else(|| invalid("missing chapter parameter"))?;

        // Unparseable or zero page numbers fall back to the first page.
        let page = page.parse::<u32>().ok().filter(|&p| p >= 1).unwrap_or(1);

        Ok(Self {
            work_id: work_id.to_string(),
            page,
            chapter_id: chapter_id.to_string(),
        })
    }
}
