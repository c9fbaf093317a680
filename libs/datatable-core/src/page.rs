use serde::{Deserialize, Serialize};

#[cfg_attr(feature = "with-utoipa", derive(utoipa::ToSchema))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageInfo {
    /// 1-based page number that was fetched.
    pub page: u64,
    pub per_page: u64,
    /// Total rows matching the query, across all pages.
    pub total: u64,
    pub last_page: u64,
}

impl PageInfo {
    pub fn new(page: u64, per_page: u64, total: u64) -> Self {
        let last_page = if per_page == 0 {
            1
        } else {
            total.div_ceil(per_page).max(1)
        };
        Self {
            page,
            per_page,
            total,
            last_page,
        }
    }
}

#[cfg_attr(feature = "with-utoipa", derive(utoipa::ToSchema))]
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page_info: PageInfo,
}

impl<T> Page<T> {
    /// Create a new page with items and page info
    pub fn new(items: Vec<T>, page_info: PageInfo) -> Self {
        Self { items, page_info }
    }

    /// Swap the items for `items`, returning the previous ones. Counters stay untouched.
    pub fn replace_items(&mut self, items: Vec<T>) -> Vec<T> {
        std::mem::replace(&mut self.items, items)
    }
}
