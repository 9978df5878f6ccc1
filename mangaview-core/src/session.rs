//! The reader session: the single consumer of every reader event.
//!
//! Page fetches and chapter loads run elsewhere and come back as
//! [`ReaderEvent`]s. All mutation of the registry, scheduler, navigation
//! engine and preferences happens here, one event at a time.

use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::chapter::{ChapterContent, ChapterList};
use crate::input::{route, Command, InputEvent};
use crate::location::Location;
use crate::navigation::{scroll_axis, ScrollAxis, ScrollLayout};
use crate::page::{PageDescriptor, PageRegistry, PageResult};
use crate::preferences::{PreferenceStore, Preferences, PreferencesPatch};
use crate::prefetch::{PageRequest, PrefetchScheduler};
use crate::reader::{NavOutcome, NavigationEngine};
use crate::storage::KeyValueStore;

// ---------------------------------------------------------------------------
// Collaborators
// ---------------------------------------------------------------------------

/// Request to resolve a chapter's metadata and page list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterRequest {
    pub request_id: u64,
    pub work_id: String,
    pub chapter_id: String,
    /// Also fetch the work's chapter list.
    pub include_chapter_list: bool,
}

/// Executes fetches in the background and reports back as [`ReaderEvent`]s.
pub trait PageSource {
    fn request_page(&self, request: PageRequest);
    fn request_chapter(&self, request: ChapterRequest);
}

/// Short audible feedback on page turns.
pub trait PageTurnCue {
    fn page_turn(&self);
}

impl PageTurnCue for () {
    fn page_turn(&self) {}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageCompletion {
    pub generation: u64,
    pub index: usize,
    pub result: PageResult,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ReaderEvent {
    PageFetched(PageCompletion),
    ChapterResolved {
        request_id: u64,
        result: Result<ChapterContent, String>,
    },
    Input(InputEvent),
    Preferences(PreferencesPatch),
    Shutdown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    /// Waiting for the open chapter's page list.
    Loading,
    Ready,
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

pub struct ReaderSession<P, S, C = ()> {
    work_id: String,
    prefs: PreferenceStore<S>,
    engine: NavigationEngine,
    registry: PageRegistry,
    scheduler: PrefetchScheduler,
    source: P,
    cue: C,
    status: SessionStatus,
    chapter_request: u64,
    notifications: Vec<String>,
    show_settings: bool,
    scroll_offset: (i64, i64),
    last_auto_turn: Option<Instant>,
}

impl<P, S, C> ReaderSession<P, S, C>
where
    P: PageSource,
    S: KeyValueStore,
    C: PageTurnCue,
{
    pub fn new(location: &Location, prefs: PreferenceStore<S>, source: P, cue: C) -> Self {
        Self {
            work_id: location.work_id.clone(),
            prefs,
            engine: NavigationEngine::new(location.chapter_id.clone(), location.page),
            registry: PageRegistry::new(),
            scheduler: PrefetchScheduler::new(),
            source,
            cue,
            status: SessionStatus::Loading,
            chapter_request: 0,
            notifications: Vec::new(),
            show_settings: false,
            scroll_offset: (0, 0),
            last_auto_turn: None,
        }
    }

    /// Replace the navigation engine, e.g. to change the debounce window.
    pub fn with_engine(mut self, engine: NavigationEngine) -> Self {
        self.engine = engine;
        self
    }

    /// Start loading the chapter named by the initial location.
    pub fn open(&mut self) {
        info!(location = %self.location(), "Opening reader");
        self.request_current_chapter();
    }

    // -- accessors ----------------------------------------------------------

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn preferences(&self) -> &Preferences {
        self.prefs.get()
    }

    pub fn preference_store(&self) -> &PreferenceStore<S> {
        &self.prefs
    }

    pub fn registry(&self) -> &PageRegistry {
        &self.registry
    }

    pub fn engine(&self) -> &NavigationEngine {
        &self.engine
    }

    pub fn source(&self) -> &P {
        &self.source
    }

    pub fn location(&self) -> Location {
        self.engine.location(&self.work_id)
    }

    pub fn show_settings(&self) -> bool {
        self.show_settings
    }

    pub fn scroll_offset(&self) -> (i64, i64) {
        self.scroll_offset
    }

    /// Drain user-visible notifications.
    pub fn take_notifications(&mut self) -> Vec<String> {
        std::mem::take(&mut self.notifications)
    }

    // -- event handling -----------------------------------------------------

    /// Process one event. Returns whether anything visible changed.
    pub fn handle(&mut self, event: ReaderEvent, now: Instant) -> bool {
        match event {
            ReaderEvent::PageFetched(done) => {
                self.scheduler
                    .complete(&mut self.registry, done.generation, done.index, &done.result)
            }
            ReaderEvent::ChapterResolved { request_id, result } => {
                self.on_chapter_resolved(request_id, result, now)
            }
            ReaderEvent::Input(input) => {
                let command = route(input, self.prefs.get());
                self.execute(command, now)
            }
            ReaderEvent::Preferences(patch) => {
                self.update_preferences(&patch);
                true
            }
            ReaderEvent::Shutdown => false,
        }
    }

    pub fn execute(&mut self, command: Command, now: Instant) -> bool {
        debug!(?command, "Executing command");
        match command {
            Command::Next => self.next(now).is_move(),
            Command::Prev => self.prev(now).is_move(),
            Command::ScrollBy { dx, dy } => {
                self.scroll(dx, dy);
                true
            }
            Command::ToggleUi => {
                let show_ui = !self.prefs.get().show_ui;
                self.update_preferences(&PreferencesPatch {
                    show_ui: Some(show_ui),
                    ..Default::default()
                });
                true
            }
            Command::ToggleFullscreen => {
                let fullscreen = !self.prefs.get().fullscreen;
                self.update_preferences(&PreferencesPatch {
                    fullscreen: Some(fullscreen),
                    ..Default::default()
                });
                true
            }
            Command::ToggleAutoPlay => {
                let auto_play = !self.prefs.get().auto_play;
                self.last_auto_turn = auto_play.then_some(now);
                self.update_preferences(&PreferencesPatch {
                    auto_play: Some(auto_play),
                    ..Default::default()
                });
                true
            }
            Command::ToggleSettings => {
                self.show_settings = !self.show_settings;
                true
            }
            Command::CloseSettings => std::mem::replace(&mut self.show_settings, false),
        }
    }

    pub fn next(&mut self, now: Instant) -> NavOutcome {
        let outcome = self.engine.next(self.prefs.get(), now);
        self.after_navigation(&outcome, now);
        outcome
    }

    pub fn prev(&mut self, now: Instant) -> NavOutcome {
        let outcome = self.engine.prev(self.prefs.get(), now);
        self.after_navigation(&outcome, now);
        outcome
    }

    /// Jump to a 1-based page, e.g. the page a continuous view scrolled to.
    pub fn go_to(&mut self, page: u32, now: Instant) -> NavOutcome {
        let outcome = self.engine.go_to(page, now);
        self.after_navigation(&outcome, now);
        outcome
    }

    /// Merge a preference change, persist it, and refresh the prefetch window.
    pub fn update_preferences(&mut self, patch: &PreferencesPatch) -> &Preferences {
        let old_mode = self.prefs.get().reading_mode;
        self.prefs.update(patch);
        if self.prefs.get().reading_mode != old_mode {
            self.align_scroll();
        }
        if self.status == SessionStatus::Ready {
            self.prefetch();
        }
        self.prefs.get()
    }

    /// Advance one page when auto-play is due.
    pub fn tick(&mut self, now: Instant) -> bool {
        let prefs = self.prefs.get();
        if !prefs.auto_play || self.status != SessionStatus::Ready {
            return false;
        }
        let interval = Duration::from_secs_f64(prefs.auto_play_speed);
        let last = *self.last_auto_turn.get_or_insert(now);
        if now.duration_since(last) < interval {
            return false;
        }
        self.last_auto_turn = Some(now);
        debug!("Auto-play page turn");
        self.next(now).is_move()
    }

    // -- internals ----------------------------------------------------------

    fn after_navigation(&mut self, outcome: &NavOutcome, now: Instant) {
        match outcome {
            NavOutcome::Moved { page } => {
                debug!(page, location = %self.location(), "Page changed");
                self.page_turned(now);
                self.align_scroll();
                self.prefetch();
            }
            NavOutcome::ChapterChanged { chapter_id, .. } => {
                debug!(chapter = %chapter_id, location = %self.location(), "Chapter changed");
                self.page_turned(now);
                self.registry.set(Vec::new());
                self.status = SessionStatus::Loading;
                self.scroll_offset = (0, 0);
                self.request_current_chapter();
            }
            NavOutcome::Scrolled { dx, dy } => self.scroll(*dx, *dy),
            NavOutcome::Busy | NavOutcome::Unchanged => {}
        }
    }

    fn page_turned(&mut self, now: Instant) {
        if self.last_auto_turn.is_some() {
            self.last_auto_turn = Some(now);
        }
        if self.prefs.get().sound_enabled {
            self.cue.page_turn();
        }
    }

    fn scroll(&mut self, dx: i32, dy: i32) {
        let x = (self.scroll_offset.0 + i64::from(dx)).max(0);
        let y = (self.scroll_offset.1 + i64::from(dy)).max(0);
        let Some((axis, layout)) = self.scroll_layout() else {
            self.scroll_offset = (x, y);
            return;
        };

        let along = axis.along((x, y)).min(layout.max_offset());
        self.scroll_offset = axis.offset(along);
        let page = layout.page_at(along);
        if self.engine.follow_scroll(page) {
            debug!(page, location = %self.location(), "Scrolled to page");
            self.prefetch();
        }
    }

    /// Layout of the open chapter along the current mode's scroll axis.
    fn scroll_layout(&self) -> Option<(ScrollAxis, ScrollLayout)> {
        let axis = scroll_axis(self.prefs.get().reading_mode)?;
        if self.registry.is_empty() {
            return None;
        }
        let layout = ScrollLayout::new(
            self.registry
                .iter()
                .map(|page| axis.page_extent(page.dimensions())),
        );
        Some((axis, layout))
    }

    /// Bring the continuous view to the engine's current page.
    fn align_scroll(&mut self) {
        self.scroll_offset = match self.scroll_layout() {
            Some((axis, layout)) => axis.offset(layout.offset_of(self.engine.page())),
            None => (0, 0),
        };
    }

    fn prefetch(&mut self) {
        let current = self.engine.page().saturating_sub(1) as usize;
        let radius = self.prefs.get().preload_pages as usize;
        self.scheduler
            .schedule(&mut self.registry, current, radius, &self.source);
    }

    fn request_current_chapter(&mut self) {
        self.chapter_request += 1;
        let request = ChapterRequest {
            request_id: self.chapter_request,
            work_id: self.work_id.clone(),
            chapter_id: self.engine.chapter_id().to_string(),
            include_chapter_list: self.engine.chapters().is_empty(),
        };
        debug!(request_id = request.request_id, chapter = %request.chapter_id, "Requesting chapter");
        self.source.request_chapter(request);
    }

    fn on_chapter_resolved(
        &mut self,
        request_id: u64,
        result: Result<ChapterContent, String>,
        now: Instant,
    ) -> bool {
        if request_id != self.chapter_request {
            debug!(request_id, current = self.chapter_request, "Dropping stale chapter load");
            return false;
        }
        let content = match result {
            Ok(content) => content,
            Err(e) => {
                warn!("Failed to load chapter {}: {e}", self.engine.chapter_id());
                self.notifications.push("Failed to load chapter".to_string());
                return true;
            }
        };

        if let Some(chapters) = content.chapters {
            self.engine.set_chapters(ChapterList::new(chapters));
        }
        let descriptors: Vec<_> = content
            .pages
            .urls()
            .into_iter()
            .map(PageDescriptor::new)
            .collect();
        let count = descriptors.len() as u32;
        self.registry.set(descriptors);
        self.engine.set_page_count(count);
        self.align_scroll();
        self.status = SessionStatus::Ready;
        if self.prefs.get().auto_play {
            self.last_auto_turn = Some(now);
        }
        info!(
            chapter = %content.chapter_id,
            ordinal = content.ordinal,
            pages = count,
            location = %self.location(),
            "Chapter ready"
        );
        self.prefetch();
        true
    }
}
