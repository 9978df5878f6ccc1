//! Metadata service client.
//!
//! Three lookups feed the reader: chapter metadata, the chapter's page
//! file list on an image server, and the work's chapter list.

use std::sync::Arc;

use mangaview_core::{parse_ordinal, Chapter, ChapterContent, ChapterPages, ChapterRequest};
use serde::Deserialize;
use tracing::debug;

use crate::error::FetchError;
use crate::http::HttpClient;

pub const DEFAULT_API_BASE: &str = "https://api.mangadex.org";
const FEED_LIMIT: u32 = 500;

/// Chapter metadata as returned by [`ChapterService::get_chapter`].
#[derive(Debug, Clone, PartialEq)]
pub struct ChapterInfo {
    pub ordinal: f64,
    pub title: Option<String>,
}

pub trait ChapterService: Send + Sync {
    fn get_chapter(&self, chapter_id: &str) -> crate::Result<ChapterInfo>;
    fn get_chapter_pages(&self, chapter_id: &str) -> crate::Result<ChapterPages>;
    /// Unsorted chapter list of a work.
    fn get_chapters(&self, work_id: &str) -> crate::Result<Vec<Chapter>>;
}

/// Run the lookups a [`ChapterRequest`] needs and assemble the result.
pub fn resolve_chapter<S>(service: &S, request: &ChapterRequest) -> crate::Result<ChapterContent>
where
    S: ChapterService + ?Sized,
{
    let info = service.get_chapter(&request.chapter_id)?;
    let pages = service.get_chapter_pages(&request.chapter_id)?;
    let chapters = if request.include_chapter_list {
        Some(service.get_chapters(&request.work_id)?)
    } else {
        None
    };
    Ok(ChapterContent {
        chapter_id: request.chapter_id.clone(),
        ordinal: info.ordinal,
        title: info.title,
        pages,
        chapters,
    })
}

// ---------------------------------------------------------------------------
// Wire format
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct Envelope<T> {
    data: T,
}

#[derive(Deserialize)]
struct Feed {
    data: Vec<ChapterData>,
    #[serde(default)]
    total: usize,
}

#[derive(Deserialize)]
struct ChapterData {
    id: String,
    attributes: ChapterAttributes,
}

#[derive(Deserialize)]
struct ChapterAttributes {
    #[serde(default)]
    chapter: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    pages: u32,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AtHome {
    base_url: String,
    chapter: AtHomeChapter,
}

#[derive(Deserialize)]
struct AtHomeChapter {
    hash: String,
    data: Vec<String>,
}

impl ChapterAttributes {
    fn title(&self) -> Option<String> {
        self.title
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(String::from)
    }
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// MangaDex-compatible JSON API client.
pub struct MangaDexClient<H> {
    http: Arc<H>,
    base_url: String,
    language: Option<String>,
}

impl<H: HttpClient> MangaDexClient<H> {
    pub fn new(http: Arc<H>, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            language: None,
        }
    }

    /// Restrict the chapter list to one translated language.
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn get_json<T: for<'de> Deserialize<'de>>(&self, url: &str) -> crate::Result<T> {
        let body = self.http.get(url)?;
        serde_json::from_slice(&body).map_err(|e| FetchError::Api(format!("{url}: {e}")))
    }
}

impl<H: HttpClient> ChapterService for MangaDexClient<H> {
    fn get_chapter(&self, chapter_id: &str) -> crate::Result<ChapterInfo> {
        let url = format!("{}/chapter/{chapter_id}", self.base_url);
        let resp: Envelope<ChapterData> = self.get_json(&url)?;
        let attrs = resp.data.attributes;
        Ok(ChapterInfo {
            ordinal: parse_ordinal(attrs.chapter.as_deref()),
            title: attrs.title(),
        })
    }

    fn get_chapter_pages(&self, chapter_id: &str) -> crate::Result<ChapterPages> {
        let url = format!("{}/at-home/server/{chapter_id}", self.base_url);
        let resp: AtHome = self.get_json(&url)?;
        debug!(chapter_id, pages = resp.chapter.data.len(), "Resolved page list");
        Ok(ChapterPages {
            base_url: resp.base_url.trim_end_matches('/').to_string(),
            hash: resp.chapter.hash,
            files: resp.chapter.data,
        })
    }

    fn get_chapters(&self, work_id: &str) -> crate::Result<Vec<Chapter>> {
        let mut chapters = Vec::new();
        loop {
            let mut url = format!(
                "{}/manga/{work_id}/feed?limit={FEED_LIMIT}&offset={}",
                self.base_url,
                chapters.len()
            );
            if let Some(lang) = &self.language {
                url.push_str(&format!("&translatedLanguage[]={lang}"));
            }
            let feed: Feed = self.get_json(&url)?;
            let fetched = feed.data.len();
            chapters.extend(feed.data.into_iter().map(|c| Chapter {
                ordinal: parse_ordinal(c.attributes.chapter.as_deref()),
                page_count: c.attributes.pages,
                title: c.attributes.title(),
                id: c.id,
            }));
            if fetched == 0 || chapters.len() >= feed.total {
                break;
            }
        }
        debug!(work_id, chapters = chapters.len(), "Resolved chapter list");
        Ok(chapters)
    }
}
