//! Batch types
//!
//! A [`Page`] is what one producer call hands back to the engine.

/// One batch fetched from a paginated source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<M> {
    /// The batch payload
    data: M,
    /// Number of logical elements in `data`
    size: usize,
    /// Best-known total element count across the whole walk
    total: Option<u64>,
}

impl<M> Page<M> {
    /// Create a page with no total hint
    pub fn new(data: M, size: usize) -> Self {
        Self {
            data,
            size,
            total: None,
        }
    }

    /// Create a page that also reports the source's total element count
    pub fn with_total(data: M, size: usize, total: u64) -> Self {
        Self {
            data,
            size,
            total: Some(total),
        }
    }

    /// The batch payload
    pub fn data(&self) -> &M {
        &self.data
    }

    /// Number of elements in this batch
    pub fn size(&self) -> usize {
        self.size
    }

    /// Total element count reported by the producer, if any
    pub fn total(&self) -> Option<u64> {
        self.total
    }

    /// Whether this batch holds no elements
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Take the payload out of the page
    pub fn into_data(self) -> M {
        self.data
    }
}

impl<T> Page<Vec<T>> {
    /// Create a page from a vector, sizing it by its length
    pub fn from_vec(data: Vec<T>) -> Self {
        let size = data.len();
        Self::new(data, size)
    }
}

impl<T> From<Vec<T>> for Page<Vec<T>> {
    fn from(data: Vec<T>) -> Self {
        Self::from_vec(data)
    }
}
