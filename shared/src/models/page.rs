//! Paginated list envelope

use serde::{Deserialize, Serialize};

/// Default number of items per page
pub const DEFAULT_PAGE_SIZE: usize = 10;
/// Upper bound for a client-supplied `page_size`
pub const MAX_PAGE_SIZE: usize = 100;

/// `{count, next, previous, results}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub count: usize,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<T>,
}

impl<T> Page<T> {
    /// Cut one page (1-based) out of `items`
    ///
    /// Returns `None` when `page` is past the last page. An empty list still
    /// has a first page. `base_url` gets `page`/`page_size` appended for the
    /// neighbour links.
    pub fn paginate(items: Vec<T>, page: usize, page_size: usize, base_url: &str) -> Option<Self> {
        let page_size = page_size.clamp(1, MAX_PAGE_SIZE);
        let count = items.len();
        let pages = count.div_ceil(page_size).max(1);
        if page == 0 || page > pages {
            return None;
        }

        let link = |n: usize| {
            let sep = if base_url.contains('?') { '&' } else { '?' };
            format!("{base_url}{sep}page={n}&page_size={page_size}")
        };

        let results = items
            .into_iter()
            .skip((page - 1) * page_size)
            .take(page_size)
            .collect();

        Some(Self {
            count,
            next: (page < pages).then(|| link(page + 1)),
            previous: (page > 1).then(|| link(page - 1)),
            results,
        })
    }
}
