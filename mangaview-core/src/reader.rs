use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::chapter::ChapterList;
use crate::location::Location;
use crate::navigation::{strategy_for, PagePosition, Step};
use crate::preferences::{FlipDirection, Preferences, ReadingMode};

/// Window after a page change during which further page changes are rejected.
pub const TRANSITION_DEBOUNCE: Duration = Duration::from_millis(300);

/// Snapshot of where the reader is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReaderState {
    /// Position in the sorted chapter list, once the list is known.
    pub chapter_index: Option<usize>,
    /// 1-based.
    pub page_index: u32,
    pub mode: ReadingMode,
    pub direction: FlipDirection,
    pub transitioning: bool,
}

/// Result of one navigation command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavOutcome {
    /// Moved to another page of the current chapter.
    Moved { page: u32 },
    /// Now on page 1 of another chapter whose pages still need loading.
    ChapterChanged {
        chapter_index: usize,
        chapter_id: String,
    },
    /// Continuous mode: scroll the view by this offset.
    Scrolled { dx: i32, dy: i32 },
    /// Rejected because a transition is still running.
    Busy,
    /// Nothing to do (boundary without an adjacent chapter, pages not loaded).
    Unchanged,
}

impl NavOutcome {
    /// Whether the page index or chapter changed.
    pub fn is_move(&self) -> bool {
        matches!(self, Self::Moved { .. } | Self::ChapterChanged { .. })
    }
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Tracks chapter and page position and applies per-mode steps.
#[derive(Debug)]
pub struct NavigationEngine {
    chapters: ChapterList,
    chapter_index: Option<usize>,
    chapter_id: String,
    page: u32,
    page_count: u32,
    /// Set once the open chapter's page list has resolved, even if empty.
    pages_known: bool,
    transition_until: Option<Instant>,
    debounce: Duration,
}

impl NavigationEngine {
    pub fn new(chapter_id: impl Into<String>, page: u32) -> Self {
        Self {
            chapters: ChapterList::default(),
            chapter_index: None,
            chapter_id: chapter_id.into(),
            page: page.max(1),
            page_count: 0,
            pages_known: false,
            transition_until: None,
            debounce: TRANSITION_DEBOUNCE,
        }
    }

    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn page_count(&self) -> u32 {
        self.page_count
    }

    pub fn chapter_id(&self) -> &str {
        &self.chapter_id
    }

    pub fn chapter_index(&self) -> Option<usize> {
        self.chapter_index
    }

    pub fn chapters(&self) -> &ChapterList {
        &self.chapters
    }

    /// Install the work's chapter list and locate the open chapter in it.
    pub fn set_chapters(&mut self, chapters: ChapterList) {
        self.chapter_index = chapters.index_of(&self.chapter_id);
        if self.chapter_index.is_none() {
            debug!(chapter = %self.chapter_id, "Open chapter missing from chapter list");
        }
        self.chapters = chapters;
    }

    /// Record the open chapter's page count, pulling the page into range.
    pub fn set_page_count(&mut self, count: u32) {
        self.page_count = count;
        self.pages_known = true;
        if count > 0 {
            self.page = self.page.clamp(1, count);
        }
    }

    pub fn is_transitioning(&self, now: Instant) -> bool {
        self.transition_until.is_some_and(|until| now < until)
    }

    pub fn state(&self, prefs: &Preferences, now: Instant) -> ReaderState {
        ReaderState {
            chapter_index: self.chapter_index,
            page_index: self.page,
            mode: prefs.reading_mode,
            direction: prefs.flip_direction,
            transitioning: self.is_transitioning(now),
        }
    }

    pub fn location(&self, work_id: &str) -> Location {
        Location::new(work_id, self.page, self.chapter_id.clone())
    }

    pub fn next(&mut self, prefs: &Preferences, now: Instant) -> NavOutcome {
        let step = strategy_for(prefs.reading_mode).next(self.position());
        self.apply(step, now)
    }

    pub fn prev(&mut self, prefs: &Preferences, now: Instant) -> NavOutcome {
        let step = strategy_for(prefs.reading_mode).prev(self.position());
        self.apply(step, now)
    }

    /// Jump straight to a 1-based page of the open chapter.
    pub fn go_to(&mut self, page: u32, now: Instant) -> NavOutcome {
        if page < 1 || page > self.page_count || page == self.page {
            return NavOutcome::Unchanged;
        }
        self.apply(Step::Page(page), now)
    }

    /// Track the page a continuous view has scrolled to.
    ///
    /// Scrolling is not debounced, so this bypasses the transition window.
    pub fn follow_scroll(&mut self, page: u32) -> bool {
        if !self.pages_known || page < 1 || page > self.page_count || page == self.page {
            return false;
        }
        self.page = page;
        true
    }

    fn position(&self) -> PagePosition {
        PagePosition {
            page: self.page,
            page_count: self.page_count,
        }
    }

    fn apply(&mut self, step: Step, now: Instant) -> NavOutcome {
        if let Step::Scroll { dx, dy } = step {
            return NavOutcome::Scrolled { dx, dy };
        }
        if self.is_transitioning(now) {
            debug!("Navigation rejected during transition");
            return NavOutcome::Busy;
        }
        if !self.pages_known {
            return NavOutcome::Unchanged;
        }

        match step {
            Step::Page(page) if page != self.page && (1..=self.page_count).contains(&page) => {
                self.page = page;
                self.begin_transition(now);
                NavOutcome::Moved { page }
            }
            Step::NextChapter => self.change_chapter(true, now),
            Step::PrevChapter => self.change_chapter(false, now),
            _ => NavOutcome::Unchanged,
        }
    }

    fn change_chapter(&mut self, forward: bool, now: Instant) -> NavOutcome {
        let Some(current) = self.chapter_index else {
            return NavOutcome::Unchanged;
        };
        let target = if forward {
            current + 1
        } else {
            match current.checked_sub(1) {
                Some(t) => t,
                None => return NavOutcome::Unchanged,
            }
        };
        let Some(chapter) = self.chapters.get(target) else {
            return NavOutcome::Unchanged;
        };

        info!(
            from = %self.chapter_id,
            to = %chapter.id,
            ordinal = chapter.ordinal,
            "Changing chapter"
        );
        self.chapter_id = chapter.id.clone();
        self.chapter_index = Some(target);
        self.page = 1;
        self.page_count = 0;
        self.pages_known = false;
        self.begin_transition(now);
        NavOutcome::ChapterChanged {
            chapter_index: target,
            chapter_id: self.chapter_id.clone(),
        }
    }

    fn begin_transition(&mut self, now: Instant) {
        self.transition_until = Some(now + self.debounce);
    }
}
