use serde::{Deserialize, Serialize};
use validator::Validate;

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_LIMIT: u32 = 10;

pub fn default_page() -> u32 {
    DEFAULT_PAGE
}

pub fn default_limit() -> u32 {
    DEFAULT_LIMIT
}

/// `page`/`limit` query string shared by every listing endpoint.
#[derive(Debug, Clone, Copy, Deserialize, Validate)]
pub struct PageQuery {
    #[serde(default = "default_page")]
    #[validate(range(min = 1, message = "Page must be at least 1"))]
    pub page: u32,
    #[serde(default = "default_limit")]
    #[validate(range(min = 1, max = 100, message = "Limit must be between 1 and 100"))]
    pub limit: u32,
}

impl From<PageQuery> for PageOptions {
    fn from(query: PageQuery) -> Self {
        PageOptions::new(query.page, query.limit)
    }
}

/// Validated page position handed to the stores. Page numbers are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageOptions {
    pub page: u32,
    pub limit: u32,
}

impl PageOptions {
    pub fn new(page: u32, limit: u32) -> Self {
        Self { page: page.max(1), limit: limit.max(1) }
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.limit)
    }

    /// Rows to fetch: one past the page so the next page can be detected
    /// without a count query.
    pub fn fetch_limit(&self) -> u64 {
        u64::from(self.limit) + 1
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Paged<T> {
    pub data: Vec<T>,
    pub has_next_page: bool,
    pub has_previous_page: bool,
}

impl<T> Paged<T> {
    /// Builds a page from rows fetched with [`PageOptions::fetch_limit`].
    pub fn from_overfetch(mut rows: Vec<T>, options: PageOptions) -> Self {
        let limit = options.limit as usize;
        let has_next_page = rows.len() > limit;
        rows.truncate(limit);

        Paged { data: rows, has_next_page, has_previous_page: options.page > 1 }
    }

    pub fn empty(options: PageOptions) -> Self {
        Paged { data: Vec::new(), has_next_page: false, has_previous_page: options.page > 1 }
    }

    pub fn map<U, F>(self, f: F) -> Paged<U>
    where
        F: FnMut(T) -> U,
    {
        Paged {
            data: self.data.into_iter().map(f).collect(),
            has_next_page: self.has_next_page,
            has_previous_page: self.has_previous_page,
        }
    }

    pub fn with_data<U>(self, data: Vec<U>) -> Paged<U> {
        Paged {
            data,
            has_next_page: self.has_next_page,
            has_previous_page: self.has_previous_page,
        }
    }
}
