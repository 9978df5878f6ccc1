//! Per-mode page stepping.
//!
//! Each reading mode has a [`PageStrategy`] that turns the current position
//! into a [`Step`]. Strategies are pure; the [`NavigationEngine`] applies the
//! step, handles chapter changes and the transition debounce.
//!
//! [`NavigationEngine`]: crate::reader::NavigationEngine

use crate::preferences::ReadingMode;

/// Pixel offset of one keyboard scroll step in continuous modes.
pub const SCROLL_STEP_PX: i32 = 200;

/// Position inside the open chapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PagePosition {
    /// 1-based.
    pub page: u32,
    pub page_count: u32,
}

/// What a navigation command resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Show this 1-based page of the current chapter.
    Page(u32),
    /// Go to page 1 of the following chapter.
    NextChapter,
    /// Go to page 1 of the preceding chapter.
    PrevChapter,
    /// Scroll the continuous view by this many pixels.
    Scroll { dx: i32, dy: i32 },
}

pub trait PageStrategy: Sync {
    fn next(&self, pos: PagePosition) -> Step;
    fn prev(&self, pos: PagePosition) -> Step;
}

// ---------------------------------------------------------------------------
// Single page
// ---------------------------------------------------------------------------

pub struct SinglePage;

impl PageStrategy for SinglePage {
    fn next(&self, pos: PagePosition) -> Step {
        if pos.page < pos.page_count {
            Step::Page(pos.page + 1)
        } else {
            Step::NextChapter
        }
    }

    fn prev(&self, pos: PagePosition) -> Step {
        if pos.page > 1 {
            Step::Page(pos.page - 1)
        } else {
            Step::PrevChapter
        }
    }
}

// ---------------------------------------------------------------------------
// Double page
// ---------------------------------------------------------------------------

/// Spreads of (1), (2,3), (4,5), ... with the cover always alone.
pub struct DoublePage;

impl PageStrategy for DoublePage {
    fn next(&self, pos: PagePosition) -> Step {
        let PagePosition { page, page_count } = pos;
        if page >= page_count {
            Step::NextChapter
        } else if page == 1 {
            Step::Page(2)
        } else {
            Step::Page((page + 2).min(page_count))
        }
    }

    fn prev(&self, pos: PagePosition) -> Step {
        let PagePosition { page, page_count } = pos;
        if page <= 1 {
            Step::PrevChapter
        } else if page == page_count && page_count % 2 == 0 {
            // The clipped last spread starts one page early.
            Step::Page(page - 1)
        } else {
            Step::Page(page.saturating_sub(2).max(1))
        }
    }
}

// ---------------------------------------------------------------------------
// Continuous scroll
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollAxis {
    Horizontal,
    Vertical,
}

pub struct ContinuousScroll {
    pub axis: ScrollAxis,
}

impl ContinuousScroll {
    fn offset(&self, amount: i32) -> Step {
        match self.axis {
            ScrollAxis::Horizontal => Step::Scroll { dx: amount, dy: 0 },
            ScrollAxis::Vertical => Step::Scroll { dx: 0, dy: amount },
        }
    }
}

impl PageStrategy for ContinuousScroll {
    fn next(&self, _pos: PagePosition) -> Step {
        self.offset(SCROLL_STEP_PX)
    }

    fn prev(&self, _pos: PagePosition) -> Step {
        self.offset(-SCROLL_STEP_PX)
    }
}

// ---------------------------------------------------------------------------
// Continuous layout
// ---------------------------------------------------------------------------

/// Length along the scroll axis assumed for a page whose size is unknown.
pub const DEFAULT_PAGE_EXTENT_PX: i64 = 1200;
/// Cross-axis span pages are fitted to in continuous modes.
pub const SCROLL_VIEW_SPAN_PX: i64 = 800;

impl ScrollAxis {
    /// Length of a page along this axis once fitted to the view span.
    pub fn page_extent(self, dimensions: Option<(u32, u32)>) -> i64 {
        match dimensions {
            Some((w, h)) if w > 0 && h > 0 => {
                let (along, across) = match self {
                    Self::Vertical => (h, w),
                    Self::Horizontal => (w, h),
                };
                (i64::from(along) * SCROLL_VIEW_SPAN_PX / i64::from(across)).max(1)
            }
            _ => DEFAULT_PAGE_EXTENT_PX,
        }
    }

    /// The component of `(x, y)` along this axis.
    pub fn along(self, (x, y): (i64, i64)) -> i64 {
        match self {
            Self::Horizontal => x,
            Self::Vertical => y,
        }
    }

    /// An offset of `amount` along this axis and zero across it.
    pub fn offset(self, amount: i64) -> (i64, i64) {
        match self {
            Self::Horizontal => (amount, 0),
            Self::Vertical => (0, amount),
        }
    }
}

/// Axis of the continuous view in `mode`, if it has one.
pub fn scroll_axis(mode: ReadingMode) -> Option<ScrollAxis> {
    match mode {
        ReadingMode::Single | ReadingMode::Double => None,
        ReadingMode::Webtoon | ReadingMode::ScrollHorizontal => Some(ScrollAxis::Horizontal),
        ReadingMode::ScrollVertical => Some(ScrollAxis::Vertical),
    }
}

/// Pages laid end to end along one axis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrollLayout {
    starts: Vec<i64>,
}

impl ScrollLayout {
    pub fn new(extents: impl IntoIterator<Item = i64>) -> Self {
        let mut next = 0;
        let starts = extents
            .into_iter()
            .map(|extent| {
                let start = next;
                next += extent.max(1);
                start
            })
            .collect();
        Self { starts }
    }

    /// Furthest reachable offset: the last page at the leading edge.
    pub fn max_offset(&self) -> i64 {
        self.starts.last().copied().unwrap_or(0)
    }

    /// 1-based page at the leading edge when scrolled to `offset`.
    pub fn page_at(&self, offset: i64) -> u32 {
        self.starts.partition_point(|&start| start <= offset).max(1) as u32
    }

    /// Offset that puts 1-based `page` at the leading edge.
    pub fn offset_of(&self, page: u32) -> i64 {
        let index = (page.max(1) - 1) as usize;
        self.starts
            .get(index)
            .or(self.starts.last())
            .copied()
            .unwrap_or(0)
    }
}

static SINGLE: SinglePage = SinglePage;
static DOUBLE: DoublePage = DoublePage;
static HORIZONTAL: ContinuousScroll = ContinuousScroll {
    axis: ScrollAxis::Horizontal,
};
static VERTICAL: ContinuousScroll = ContinuousScroll {
    axis: ScrollAxis::Vertical,
};

/// Strategy used for `mode`.
pub fn strategy_for(mode: ReadingMode) -> &'static dyn PageStrategy {
    match mode {
        ReadingMode::Single => &SINGLE,
        ReadingMode::Double => &DOUBLE,
        ReadingMode::Webtoon | ReadingMode::ScrollHorizontal => &HORIZONTAL,
        ReadingMode::ScrollVertical => &VERTICAL,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn walk(strategy: &dyn PageStrategy, start: u32, count: u32, forward: bool) -> Vec<u32> {
        let mut pages = vec![start];
        let mut page = start;
        loop {
            let pos = PagePosition {
                page,
                page_count: count,
            };
            let step = if forward {
                strategy.next(pos)
            } else {
                strategy.prev(pos)
            };
            match step {
                Step::Page(p) => {
                    pages.push(p);
                    page = p;
                }
                _ => return pages,
            }
        }
    }

    #[test]
    fn single_walks_every_page() {
        assert_eq!(walk(&SinglePage, 1, 4, true), [1, 2, 3, 4]);
        assert_eq!(walk(&SinglePage, 4, 4, false), [4, 3, 2, 1]);
    }

    #[test]
    fn single_boundaries_change_chapter() {
        let last = PagePosition {
            page: 5,
            page_count: 5,
        };
        let first = PagePosition {
            page: 1,
            page_count: 5,
        };
        assert_eq!(SinglePage.next(last), Step::NextChapter);
        assert_eq!(SinglePage.prev(first), Step::PrevChapter);
    }

    #[test]
    fn layout_maps_offsets_to_pages() {
        let layout = ScrollLayout::new([1000, 500, 1000]);
        assert_eq!(layout.page_at(0), 1);
        assert_eq!(layout.page_at(999), 1);
        assert_eq!(layout.page_at(1000), 2);
        assert_eq!(layout.page_at(1499), 2);
        assert_eq!(layout.page_at(1500), 3);
        assert_eq!(layout.page_at(90_000), 3);
        assert_eq!(layout.max_offset(), 1500);
        assert_eq!(layout.offset_of(2), 1000);
        assert_eq!(layout.offset_of(9), 1500);
        assert_eq!(ScrollLayout::new([]).page_at(10), 1);
    }

    #[test]
    fn extents_follow_page_shape() {
        // An 800x1600 page is twice as tall as the view is wide.
        assert_eq!(ScrollAxis::Vertical.page_extent(Some((800, 1600))), 1600);
        assert_eq!(ScrollAxis::Horizontal.page_extent(Some((400, 800))), 400);
        assert_eq!(ScrollAxis::Vertical.page_extent(None), DEFAULT_PAGE_EXTENT_PX);
        assert_eq!(ScrollAxis::Vertical.page_extent(Some((0, 10))), DEFAULT_PAGE_EXTENT_PX);
    }

    #[test]
    fn double_pairs_even_count() {
        assert_eq!(walk(&DoublePage, 1, 10, true), [1, 2, 4, 6, 8, 10]);
        assert_eq!(walk(&DoublePage, 10, 10, false), [10, 9, 7, 5, 3, 1]);
    }

    #[test]
    fn double_pairs_odd_count() {
        assert_eq!(walk(&DoublePage, 1, 9, true), [1, 2, 4, 6, 8, 9]);
        assert_eq!(walk(&DoublePage, 9, 9, false), [9, 7, 5, 3, 1]);
    }

    #[test]
    fn double_single_page_chapter() {
        let pos = PagePosition {
            page: 1,
            page_count: 1,
        };
        assert_eq!(DoublePage.next(pos), Step::NextChapter);
        assert_eq!(DoublePage.prev(pos), Step::PrevChapter);
    }

    #[test]
    fn double_prev_from_page_two_lands_on_cover() {
        let pos = PagePosition {
            page: 2,
            page_count: 3,
        };
        assert_eq!(DoublePage.prev(pos), Step::Page(1));
    }

    #[test]
    fn scroll_modes_map_to_offsets() {
        let pos = PagePosition {
            page: 3,
            page_count: 10,
        };
        assert_eq!(
            strategy_for(ReadingMode::ScrollVertical).next(pos),
            Step::Scroll { dx: 0, dy: 200 }
        );
        assert_eq!(
            strategy_for(ReadingMode::ScrollVertical).prev(pos),
            Step::Scroll { dx: 0, dy: -200 }
        );
        assert_eq!(
            strategy_for(ReadingMode::Webtoon).next(pos),
            Step::Scroll { dx: 200, dy: 0 }
        );
    }

    #[test]
    fn steps_stay_in_bounds() {
        for count in 1..=12 {
            for page in 1..=count {
                let pos = PagePosition {
                    page,
                    page_count: count,
                };
                for mode in [ReadingMode::Single, ReadingMode::Double] {
                    let s = strategy_for(mode);
                    for step in [s.next(pos), s.prev(pos)] {
                        if let Step::Page(p) = step {
                            assert!((1..=count).contains(&p), "{mode} {page}/{count} -> {p}");
                        }
                    }
                }
            }
        }
    }
}
