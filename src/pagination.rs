//! This modules defines the common functionality for paging data.

/// The config for pagination
#[derive(Debug, Clone, Copy)]
pub struct PaginationConfig {
    /// The page number to default to when not specified in a request.
    pub default_page: u64,
    /// The maximum transactions to return per page when not specified in a request.
    pub default_page_size: u64,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_page: 1,
            default_page_size: 20,
        }
    }
}

/// The number of pages needed to show `item_count` items, `page_size` at a time.
pub fn page_count(item_count: usize, page_size: u64) -> u64 {
    if page_size == 0 {
        return 0;
    }

    (item_count as u64).div_ceil(page_size)
}

/// Take the items on the 1-based `page`.
///
/// A page past the end yields an empty list.
pub fn paginate<T>(items: Vec<T>, page: u64, page_size: u64) -> Vec<T> {
    let start = page.saturating_sub(1).saturating_mul(page_size);
    let start = usize::try_from(start).unwrap_or(usize::MAX);
    let page_size = usize::try_from(page_size).unwrap_or(usize::MAX);

    items.into_iter().skip(start).take(page_size).collect()
}
