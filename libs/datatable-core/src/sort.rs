//! Request parameters and sort direction parsing.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::hash::BuildHasher;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TableError;

/// Query parameter carrying the field to order by.
pub const ORDER_BY_FIELD: &str = "orderByField";
/// Query parameter carrying `asc` or `desc`.
pub const ORDER_BY_DIRECTION: &str = "orderByDirection";
/// Query parameter carrying the 1-based page number.
pub const PAGE: &str = "page";

#[cfg_attr(feature = "with-utoipa", derive(utoipa::ToSchema))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDir {
    Asc,
    Desc,
}

impl SortDir {
    pub fn as_str(self) -> &'static str {
        match self {
            SortDir::Asc => "asc",
            SortDir::Desc => "desc",
        }
    }
}

impl fmt::Display for SortDir {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortDir {
    type Err = TableError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("asc") {
            Ok(SortDir::Asc)
        } else if s.eq_ignore_ascii_case("desc") {
            Ok(SortDir::Desc)
        } else {
            Err(TableError::InvalidSortDirection(s.to_string()))
        }
    }
}

/// A validated client sort request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SortRequest {
    pub field: String,
    pub dir: SortDir,
}

/// Read-only key/value view over an inbound request.
pub trait RequestParams {
    fn get(&self, key: &str) -> Option<&str>;
}

impl<S: BuildHasher> RequestParams for HashMap<String, String, S> {
    fn get(&self, key: &str) -> Option<&str> {
        HashMap::get(self, key).map(String::as_str)
    }
}

impl RequestParams for BTreeMap<String, String> {
    fn get(&self, key: &str) -> Option<&str> {
        BTreeMap::get(self, key).map(String::as_str)
    }
}

impl RequestParams for [(&str, &str)] {
    fn get(&self, key: &str) -> Option<&str> {
        self.iter().find(|(k, _)| *k == key).map(|(_, v)| *v)
    }
}

impl<const N: usize> RequestParams for [(&str, &str); N] {
    fn get(&self, key: &str) -> Option<&str> {
        RequestParams::get(self.as_slice(), key)
    }
}

impl<T: RequestParams + ?Sized> RequestParams for &T {
    fn get(&self, key: &str) -> Option<&str> {
        (**self).get(key)
    }
}

/// Extract the sort request from `params`.
///
/// Returns `Ok(None)` unless both `orderByField` and `orderByDirection` are
/// present and non-empty. A direction outside `asc`/`desc` (any case) is an
/// error, never coerced.
pub fn extract_sort<P: RequestParams + ?Sized>(
    params: &P,
) -> Result<Option<SortRequest>, TableError> {
    let field = params.get(ORDER_BY_FIELD).filter(|f| !f.is_empty());
    let dir = params.get(ORDER_BY_DIRECTION).filter(|d| !d.is_empty());

    let (Some(field), Some(dir)) = (field, dir) else {
        return Ok(None);
    };

    Ok(Some(SortRequest {
        field: field.to_string(),
        dir: dir.parse()?,
    }))
}

/// Requested page number; anything missing, non-numeric or below 1 is page 1.
pub fn requested_page<P: RequestParams + ?Sized>(params: &P) -> u64 {
    params
        .get(PAGE)
        .and_then(|p| p.trim().parse::<u64>().ok())
        .filter(|p| *p >= 1)
        .unwrap_or(1)
}
