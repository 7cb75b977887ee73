// ABOUTME: Pagination utilities for in-memory lists
// ABOUTME: Page parameters, metadata wrappers and the page cursor used by list screens

/// Default page size for paginated views
pub const DEFAULT_PAGE_SIZE: usize = 20;

/// Rows per page on the defect list
pub const DEFECT_LIST_PAGE_SIZE: usize = 10;

/// Maximum page size to keep terminal output readable
pub const MAX_PAGE_SIZE: usize = 100;

/// Minimum page number (1-indexed)
pub const MIN_PAGE: usize = 1;

/// Requested page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationParams {
    /// Page number (1-indexed)
    pub page: usize,

    /// Number of items per page, at most MAX_PAGE_SIZE
    pub limit: usize,
}

impl PaginationParams {
    pub fn new() -> Self {
        Self {
            page: MIN_PAGE,
            limit: DEFAULT_PAGE_SIZE,
        }
    }

    pub fn with_page_and_limit(page: usize, limit: usize) -> Self {
        Self { page, limit }
    }

    /// Validate and normalize, returning (limit, offset)
    pub fn validate(&self) -> (usize, usize) {
        let page = self.page.max(MIN_PAGE);
        let limit = self.limit.clamp(1, MAX_PAGE_SIZE);
        (limit, (page - 1) * limit)
    }

    pub fn limit(&self) -> usize {
        self.validate().0
    }

    pub fn offset(&self) -> usize {
        self.validate().1
    }

    pub fn page(&self) -> usize {
        self.page.max(MIN_PAGE)
    }
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self::new()
    }
}

/// Metadata about pagination state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationMeta {
    pub page: usize,
    pub page_size: usize,
    pub total_items: usize,
    pub total_pages: usize,
    pub has_next_page: bool,
    pub has_previous_page: bool,
}

impl PaginationMeta {
    pub fn new(params: &PaginationParams, total_items: usize) -> Self {
        let page = params.page();
        let page_size = params.limit();
        let total_pages = total_items.div_ceil(page_size);

        Self {
            page,
            page_size,
            total_items,
            total_pages,
            has_next_page: page < total_pages,
            has_previous_page: page > MIN_PAGE,
        }
    }
}

/// Page cursor for a list screen. Always points at a page that exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageState {
    page: usize,
    page_size: usize,
    total_items: usize,
}

impl PageState {
    pub fn new(page_size: usize) -> Self {
        Self {
            page: MIN_PAGE,
            page_size: page_size.clamp(1, MAX_PAGE_SIZE),
            total_items: 0,
        }
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// At least one page, even for an empty list
    pub fn total_pages(&self) -> usize {
        pages_for(self.total_items, self.page_size)
    }

    /// Record the filtered item count, pulling the cursor back if it fell off the end
    pub fn set_total(&mut self, total_items: usize) {
        self.total_items = total_items;
        self.page = self.page.min(self.total_pages());
    }

    pub fn goto(&mut self, page: usize) {
        self.page = page.clamp(MIN_PAGE, self.total_pages());
    }

    pub fn next(&mut self) {
        self.goto(self.page + 1);
    }

    pub fn prev(&mut self) {
        self.goto(self.page.saturating_sub(1));
    }

    pub fn reset_page(&mut self) {
        self.page = MIN_PAGE;
    }

    /// Rows of `items` on the current page. A cursor past the end shows the last page.
    pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        let page = self.page.min(pages_for(items.len(), self.page_size));
        let start = (page - 1) * self.page_size;
        let end = (start + self.page_size).min(items.len());
        &items[start.min(end)..end]
    }

    pub fn meta(&self) -> PaginationMeta {
        let params = PaginationParams::with_page_and_limit(self.page, self.page_size);
        PaginationMeta::new(&params, self.total_items)
    }
}

fn pages_for(total_items: usize, page_size: usize) -> usize {
    total_items.div_ceil(page_size.max(1)).max(MIN_PAGE)
}
