//! Background loader: runs page and chapter fetches on a worker pool and
//! reports each outcome back to the reader session as a [`ReaderEvent`].

use std::sync::mpsc;
use std::sync::Arc;

use mangaview_core::{
    ChapterRequest, PageCompletion, PageRequest, PageResult, PageSource, ReaderEvent,
};
use tracing::{debug, warn};

use crate::api::{resolve_chapter, ChapterService};
use crate::http::HttpClient;
use crate::probe::probe_dimensions;

pub struct Loader<H, S> {
    pool: rayon::ThreadPool,
    http: Arc<H>,
    service: Arc<S>,
    events: mpsc::Sender<ReaderEvent>,
}

/// Build a loader with `threads` workers (0 picks rayon's default).
///
/// Returns the loader and the receive side of the session's event channel.
/// Other producers (input, shutdown) get a sender through [`Loader::sender`].
pub fn spawn_loader<H, S>(
    http: Arc<H>,
    service: Arc<S>,
    threads: usize,
) -> crate::Result<(Loader<H, S>, mpsc::Receiver<ReaderEvent>)>
where
    H: HttpClient + 'static,
    S: ChapterService + 'static,
{
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .thread_name(|i| format!("page-loader-{i}"))
        .build()?;
    debug!(threads = pool.current_num_threads(), "Page loader started");
    let (events, rx) = mpsc::channel();
    Ok((
        Loader {
            pool,
            http,
            service,
            events,
        },
        rx,
    ))
}

impl<H, S> Loader<H, S> {
    pub fn sender(&self) -> mpsc::Sender<ReaderEvent> {
        self.events.clone()
    }
}

fn fetch_page<H: HttpClient + ?Sized>(http: &H, url: &str) -> PageResult {
    match http.get(url).and_then(|bytes| probe_dimensions(&bytes)) {
        Ok((width, height)) => PageResult::Loaded { width, height },
        Err(e) => {
            warn!("Failed to load page {url}: {e}");
            PageResult::Failed {
                reason: e.to_string(),
            }
        }
    }
}

impl<H, S> PageSource for Loader<H, S>
where
    H: HttpClient + 'static,
    S: ChapterService + 'static,
{
    fn request_page(&self, request: PageRequest) {
        let http = Arc::clone(&self.http);
        let tx = self.events.clone();
        self.pool.spawn(move || {
            let result = fetch_page(&*http, &request.url);
            // The receiver is gone once the session has shut down.
            let _ = tx.send(ReaderEvent::PageFetched(PageCompletion {
                generation: request.generation,
                index: request.index,
                result,
            }));
        });
    }

    fn request_chapter(&self, request: ChapterRequest) {
        let service = Arc::clone(&self.service);
        let tx = self.events.clone();
        self.pool.spawn(move || {
            let result = resolve_chapter(&*service, &request).map_err(|e| {
                warn!("Failed to resolve chapter {}: {e}", request.chapter_id);
                e.to_string()
            });
            let _ = tx.send(ReaderEvent::ChapterResolved {
                request_id: request.request_id,
                result,
            });
        });
    }
}
