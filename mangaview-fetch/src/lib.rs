pub mod api;
pub mod error;
pub mod http;
pub mod loader;
pub mod probe;

pub use api::{resolve_chapter, ChapterInfo, ChapterService, MangaDexClient, DEFAULT_API_BASE};
pub use error::FetchError;
pub use http::{HttpClient, ReqwestClient};
pub use loader::{spawn_loader, Loader};
pub use probe::probe_dimensions;

/// Convenience result type for the fetch crate.
pub type Result<T> = std::result::Result<T, FetchError>;
