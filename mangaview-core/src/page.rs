use tracing::debug;

/// Display state of a single page image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadState {
    #[default]
    Unloaded,
    Loading,
    Loaded,
    Failed,
}

impl LoadState {
    /// `Loaded` and `Failed` are terminal: no further fetch is attempted.
    pub fn is_terminal(self) -> bool {
        matches!(self, LoadState::Loaded | LoadState::Failed)
    }
}

/// In-memory record tracking one page's URL and load status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageDescriptor {
    pub url: String,
    pub load_state: LoadState,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

impl PageDescriptor {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            load_state: LoadState::Unloaded,
            width: None,
            height: None,
        }
    }

    pub fn dimensions(&self) -> Option<(u32, u32)> {
        self.width.zip(self.height)
    }
}

/// Outcome of one page fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageResult {
    Loaded { width: u32, height: u32 },
    Failed { reason: String },
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Ordered page list of the open chapter.
///
/// Every [`set`](Self::set) bumps the generation so that completions issued
/// against a previous chapter can be recognised and dropped.
#[derive(Debug, Default)]
pub struct PageRegistry {
    pages: Vec<PageDescriptor>,
    generation: u64,
}

impl PageRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole page list.
    pub fn set(&mut self, descriptors: Vec<PageDescriptor>) {
        self.generation += 1;
        debug!(
            generation = self.generation,
            pages = descriptors.len(),
            "Page registry replaced"
        );
        self.pages = descriptors;
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&PageDescriptor> {
        self.pages.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &PageDescriptor> {
        self.pages.iter()
    }

    /// Move an `Unloaded` page to `Loading`. Returns whether it changed.
    pub fn mark_loading(&mut self, index: usize) -> bool {
        match self.pages.get_mut(index) {
            Some(page) if page.load_state == LoadState::Unloaded => {
                page.load_state = LoadState::Loading;
                true
            }
            _ => false,
        }
    }

    /// Record a successful load. A page that already failed is left alone.
    pub fn mark_loaded(&mut self, index: usize, width: u32, height: u32) -> bool {
        let Some(page) = self.pages.get_mut(index) else {
            return false;
        };
        if page.load_state == LoadState::Failed {
            return false;
        }
        page.load_state = LoadState::Loaded;
        page.width = Some(width);
        page.height = Some(height);
        true
    }

    /// Record a failed load. A page that already loaded is left alone.
    pub fn mark_failed(&mut self, index: usize) -> bool {
        let Some(page) = self.pages.get_mut(index) else {
            return false;
        };
        if page.load_state == LoadState::Loaded {
            return false;
        }
        page.load_state = LoadState::Failed;
        true
    }

    /// Apply a fetch outcome if it belongs to the current generation.
    pub fn apply(&mut self, generation: u64, index: usize, result: &PageResult) -> bool {
        if generation != self.generation {
            debug!(
                stale = generation,
                current = self.generation,
                index,
                "Dropping stale page completion"
            );
            return false;
        }
        match *result {
            PageResult::Loaded { width, height } => self.mark_loaded(index, width, height),
            PageResult::Failed { .. } => self.mark_failed(index),
        }
    }

    /// Number of pages in each state, as `(unloaded, loading, loaded, failed)`.
    pub fn counts(&self) -> (usize, usize, usize, usize) {
        self.pages
            .iter()
            .fold((0, 0, 0, 0), |(u, l, d, f), p| match p.load_state {
                LoadState::Unloaded => (u + 1, l, d, f),
                LoadState::Loading => (u, l + 1, d, f),
                LoadState::Loaded => (u, l, d + 1, f),
                LoadState::Failed => (u, l, d, f + 1),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry(n: usize) -> PageRegistry {
        let mut reg = PageRegistry::new();
        reg.set((0..n).map(|i| PageDescriptor::new(format!("p{i}"))).collect());
        reg
    }

    #[test]
    fn set_bumps_generation() {
        let mut reg = registry(3);
        assert_eq!(reg.generation(), 1);
        reg.set(Vec::new());
        assert_eq!(reg.generation(), 2);
        assert!(reg.is_empty());
    }

    #[test]
    fn out_of_range_marks_are_noops() {
        let mut reg = registry(2);
        assert!(!reg.mark_loaded(5, 10, 10));
        assert!(!reg.mark_failed(2));
        assert!(!reg.mark_loading(9));
        assert_eq!(reg.counts(), (2, 0, 0, 0));
    }

    #[test]
    fn loaded_page_ignores_failure() {
        let mut reg = registry(1);
        assert!(reg.mark_loaded(0, 800, 1200));
        assert!(!reg.mark_failed(0));
        assert_eq!(reg.get(0).unwrap().load_state, LoadState::Loaded);
        assert_eq!(reg.get(0).unwrap().dimensions(), Some((800, 1200)));
    }

    #[test]
    fn failed_page_ignores_late_load() {
        let mut reg = registry(1);
        assert!(reg.mark_failed(0));
        assert!(!reg.mark_loaded(0, 1, 1));
        assert_eq!(reg.get(0).unwrap().load_state, LoadState::Failed);
        assert_eq!(reg.get(0).unwrap().dimensions(), None);
    }

    #[test]
    fn duplicate_load_event_last_writer_wins() {
        let mut reg = registry(1);
        reg.mark_loaded(0, 100, 200);
        reg.mark_loaded(0, 101, 201);
        assert_eq!(reg.get(0).unwrap().dimensions(), Some((101, 201)));
    }

    #[test]
    fn mark_loading_only_from_unloaded() {
        let mut reg = registry(1);
        assert!(reg.mark_loading(0));
        assert!(!reg.mark_loading(0));
        reg.mark_loaded(0, 1, 1);
        assert!(!reg.mark_loading(0));
    }

    #[test]
    fn apply_rejects_stale_generation() {
        let mut reg = registry(2);
        let old = reg.generation();
        reg.set(vec![PageDescriptor::new("a"), PageDescriptor::new("b")]);
        let result = PageResult::Loaded {
            width: 5,
            height: 5,
        };
        assert!(!reg.apply(old, 0, &result));
        assert_eq!(reg.get(0).unwrap().load_state, LoadState::Unloaded);
        assert!(reg.apply(reg.generation(), 0, &result));
        assert_eq!(reg.get(0).unwrap().load_state, LoadState::Loaded);
    }
}
