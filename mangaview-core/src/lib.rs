pub mod chapter;
pub mod error;
pub mod input;
pub mod location;
pub mod navigation;
pub mod page;
pub mod preferences;
pub mod prefetch;
pub mod reader;
pub mod session;
pub mod storage;

// Re-export primary types for convenience.
pub use chapter::{parse_ordinal, page_image_url, Chapter, ChapterContent, ChapterList, ChapterPages};
pub use error::CoreError;
pub use input::{route, Command, InputEvent, Key};
pub use location::Location;
pub use navigation::{
    scroll_axis, strategy_for, PagePosition, PageStrategy, ScrollAxis, ScrollLayout, Step,
    DEFAULT_PAGE_EXTENT_PX, SCROLL_STEP_PX, SCROLL_VIEW_SPAN_PX,
};
pub use page::{LoadState, PageDescriptor, PageRegistry, PageResult};
pub use preferences::{
    FitMode, FlipDirection, PreferenceStore, Preferences, PreferencesPatch, ReadingMode,
    SETTINGS_KEY,
};
pub use prefetch::{PageRequest, PrefetchScheduler};
pub use reader::{NavOutcome, NavigationEngine, ReaderState, TRANSITION_DEBOUNCE};
pub use session::{
    ChapterRequest, PageCompletion, PageSource, PageTurnCue, ReaderEvent, ReaderSession,
    SessionStatus,
};
pub use storage::{FileStore, KeyValueStore, MemoryStore};

/// Convenience result type for the core crate.
pub type Result<T> = std::result::Result<T, CoreError>;
