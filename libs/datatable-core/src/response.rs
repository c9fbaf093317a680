use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::meta::DISALLOW_ORDERING_BY;
use crate::page::{Page, PageInfo};

/// JSON body of a table response:
/// `{"data": [...], "meta": {...}, "page", "per_page", "total", "last_page"}`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TableResponse<T> {
    pub data: Vec<T>,
    pub meta: Map<String, Value>,
    #[serde(flatten)]
    pub page_info: PageInfo,
}

impl<T> TableResponse<T> {
    pub fn new(page: Page<T>, meta: Map<String, Value>) -> Self {
        Self {
            data: page.items,
            meta,
            page_info: page.page_info,
        }
    }

    /// The reserved list of fields clients may not order by.
    pub fn disallowed_ordering_by(&self) -> Vec<&str> {
        self.meta
            .get(DISALLOW_ORDERING_BY)
            .and_then(Value::as_array)
            .map(|a| a.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }

    /// Map rows while keeping meta and paging (Domain->DTO mapping convenience)
    pub fn map_data<U>(self, f: impl FnMut(T) -> U) -> TableResponse<U> {
        TableResponse {
            data: self.data.into_iter().map(f).collect(),
            meta: self.meta,
            page_info: self.page_info,
        }
    }
}
