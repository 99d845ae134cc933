//! Page queries
//!
//! A [`PageQuery`] says which batch comes next: a page number (or none, for
//! an unpaged request), a batch size, and the offset derived from both.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Batch size used when a query is built without one
pub const DEFAULT_LIMIT: usize = 20;

/// How a query reacts to being moved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryMode {
    /// Ordinary query; advances one page at a time
    #[default]
    Standard,
    /// Single unbounded request; every mutation is rejected
    All,
    /// Pinned to the first page; page moves are silently ignored
    Top,
}

/// Where a walk currently is in a paginated source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawPageQuery")]
pub struct PageQuery {
    page: Option<usize>,
    limit: usize,
    mode: QueryMode,
}

#[derive(Deserialize)]
struct RawPageQuery {
    #[serde(default)]
    page: Option<usize>,
    #[serde(default = "default_limit")]
    limit: usize,
    #[serde(default)]
    mode: QueryMode,
}

fn default_limit() -> usize {
    DEFAULT_LIMIT
}

impl TryFrom<RawPageQuery> for PageQuery {
    type Error = Error;

    fn try_from(raw: RawPageQuery) -> Result<Self> {
        match raw.mode {
            QueryMode::All => Ok(Self::all()),
            QueryMode::Top => Self::top(raw.limit),
            QueryMode::Standard => match raw.page {
                Some(page) => Self::of(page, raw.limit),
                None => Self::unpaged(raw.limit),
            },
        }
    }
}

impl Default for PageQuery {
    fn default() -> Self {
        Self {
            page: None,
            limit: DEFAULT_LIMIT,
            mode: QueryMode::Standard,
        }
    }
}

impl PageQuery {
    /// Create a query for `page` (1-based) with `limit` elements per page
    pub fn of(page: usize, limit: usize) -> Result<Self> {
        check_page(page)?;
        check_limit(limit)?;
        Ok(Self {
            page: Some(page),
            limit,
            mode: QueryMode::Standard,
        })
    }

    /// Create a query positioned on the first page
    pub fn first_page(limit: usize) -> Result<Self> {
        Self::of(1, limit)
    }

    /// Create an unpaged query: one request for up to `limit` elements
    pub fn unpaged(limit: usize) -> Result<Self> {
        check_limit(limit)?;
        Ok(Self {
            page: None,
            limit,
            mode: QueryMode::Standard,
        })
    }

    /// The "everything in one request" query. It has no page and no upper
    /// bound, and refuses to be modified.
    pub fn all() -> Self {
        Self {
            page: None,
            limit: usize::MAX,
            mode: QueryMode::All,
        }
    }

    /// A query that always asks for the first `limit` elements
    pub fn top(limit: usize) -> Result<Self> {
        check_limit(limit)?;
        Ok(Self {
            page: Some(1),
            limit,
            mode: QueryMode::Top,
        })
    }

    /// Current page number, `None` when unpaged
    pub fn page(&self) -> Option<usize> {
        self.page
    }

    /// Current page number, or an error when unpaged
    pub fn require_page(&self) -> Result<usize> {
        self.page
            .ok_or_else(|| Error::illegal_state("query is unpaged and has no page number"))
    }

    /// Current page number, treating an unpaged query as page 1
    pub fn page_or_first(&self) -> usize {
        self.page.unwrap_or(1)
    }

    /// Maximum number of elements per batch
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Behavior variant of this query
    pub fn mode(&self) -> QueryMode {
        self.mode
    }

    /// Offset of the first element of the current page, `None` when unpaged
    pub fn offset(&self) -> Option<usize> {
        self.page
            .map(|page| (page.max(1) - 1).saturating_mul(self.limit.max(1)))
    }

    /// Offset of the current page, treating an unpaged query as offset 0
    pub fn offset_or_zero(&self) -> usize {
        self.offset().unwrap_or(0)
    }

    /// Whether pagination is on
    pub fn is_paged(&self) -> bool {
        self.page.is_some()
    }

    /// Whether pagination is off
    pub fn is_unpaged(&self) -> bool {
        self.page.is_none()
    }

    /// Whether this query points at the first page. Unpaged queries always do.
    pub fn is_first_page(&self) -> bool {
        self.page.map_or(true, |page| page == 1)
    }

    /// Whether [`advance`](Self::advance) can move this query to a new page
    pub fn can_advance(&self) -> bool {
        self.mode == QueryMode::Standard && self.is_paged()
    }

    /// Whether the current page lies past the end of a source holding
    /// `count` elements
    pub fn is_exceeded(&self, count: usize) -> bool {
        match self.offset() {
            Some(offset) => offset >= count,
            None => count == 0,
        }
    }

    /// Move to the next page
    pub fn advance(&mut self) -> Result<()> {
        match self.mode {
            QueryMode::Top => Ok(()),
            QueryMode::All => Err(Error::illegal_state("the all query cannot be advanced")),
            QueryMode::Standard => {
                let page = self.require_page()?;
                let next = page
                    .checked_add(1)
                    .ok_or_else(|| Error::illegal_state(format!("page {page} is the last page")))?;
                self.page = Some(next);
                Ok(())
            }
        }
    }

    /// Move back to page 1. Unpaged and pinned queries are left as they are.
    pub fn first(&mut self) {
        if self.mode == QueryMode::Standard && self.is_paged() {
            self.page = Some(1);
        }
    }

    /// Set the page number; `None` switches pagination off
    pub fn set_page(&mut self, page: Option<usize>) -> Result<()> {
        match self.mode {
            QueryMode::Top => Ok(()),
            QueryMode::All => Err(Error::illegal_state("the all query cannot change page")),
            QueryMode::Standard => {
                if let Some(page) = page {
                    check_page(page)?;
                }
                self.page = page;
                Ok(())
            }
        }
    }

    /// Set the batch size
    pub fn set_limit(&mut self, limit: usize) -> Result<()> {
        if self.mode == QueryMode::All {
            return Err(Error::illegal_state("the all query cannot change limit"));
        }
        check_limit(limit)?;
        self.limit = limit;
        Ok(())
    }
}

impl fmt::Display for PageQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.mode, self.page) {
            (QueryMode::All, _) => write!(f, "all rows"),
            (_, Some(page)) => write!(f, "page {page} ({} per page)", self.limit),
            (_, None) => write!(f, "unpaged ({} per request)", self.limit),
        }
    }
}

fn check_page(page: usize) -> Result<()> {
    if page == 0 {
        return Err(Error::illegal_state("page numbers start at 1"));
    }
    Ok(())
}

fn check_limit(limit: usize) -> Result<()> {
    if limit == 0 {
        return Err(Error::illegal_state("limit must be at least 1"));
    }
    Ok(())
}
