use std::collections::HashSet;

use tracing::debug;

use crate::page::{LoadState, PageRegistry, PageResult};
use crate::session::PageSource;

/// Request to fetch one page image in the background.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    /// Registry generation the request was issued against.
    pub generation: u64,
    /// 0-based page index.
    pub index: usize,
    pub url: String,
}

/// Issues background fetches for pages around the current one.
///
/// The requested set is kept apart from [`LoadState`] so that a page is
/// never fetched twice within one registry generation.
#[derive(Debug, Default)]
pub struct PrefetchScheduler {
    generation: u64,
    requested: HashSet<usize>,
}

impl PrefetchScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request every unloaded page within `radius` of `current` (0-based).
    ///
    /// Returns how many requests were issued.
    pub fn schedule(
        &mut self,
        registry: &mut PageRegistry,
        current: usize,
        radius: usize,
        source: &dyn PageSource,
    ) -> usize {
        self.sync_generation(registry.generation());
        if registry.is_empty() {
            return 0;
        }

        let start = current.saturating_sub(radius);
        let end = current.saturating_add(radius).min(registry.len() - 1);
        let mut issued = 0;

        for index in start..=end {
            let unloaded = registry
                .get(index)
                .is_some_and(|p| p.load_state == LoadState::Unloaded);
            if !unloaded || self.requested.contains(&index) {
                continue;
            }
            let Some(url) = registry.get(index).map(|p| p.url.clone()) else {
                continue;
            };
            self.requested.insert(index);
            registry.mark_loading(index);
            source.request_page(PageRequest {
                generation: self.generation,
                index,
                url,
            });
            issued += 1;
        }

        if issued > 0 {
            debug!(current, radius, issued, "Scheduled page prefetch");
        }
        issued
    }

    /// Merge a fetch outcome into the registry. Stale generations are dropped.
    pub fn complete(
        &mut self,
        registry: &mut PageRegistry,
        generation: u64,
        index: usize,
        result: &PageResult,
    ) -> bool {
        if let PageResult::Failed { reason } = result {
            debug!(generation, index, %reason, "Page fetch failed");
        }
        registry.apply(generation, index, result)
    }

    pub fn is_requested(&self, index: usize) -> bool {
        self.requested.contains(&index)
    }

    pub fn requested_count(&self) -> usize {
        self.requested.len()
    }

    fn sync_generation(&mut self, generation: u64) {
        if self.generation != generation {
            self.generation = generation;
            self.requested.clear();
        }
    }
}
