//! In-memory backing store over JSON rows.
//!
//! Useful for tests, fixtures and small static tables. Semantics follow a SQL
//! store: filters narrow the rows, orderings apply in the order they were
//! added, and ordering by a field no row has fails when the query runs.

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::page::{Page, PageInfo};
use crate::sort::SortDir;
use crate::source::{Queryable, TableModel};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MemoryError {
    #[error("unknown column: {0}")]
    UnknownColumn(String),
}

type Predicate = Arc<dyn Fn(&Value) -> bool + Send + Sync>;

#[derive(Clone)]
pub struct MemoryQuery {
    rows: Arc<Vec<Value>>,
    filters: Vec<Predicate>,
    order: Vec<(String, SortDir)>,
}

impl fmt::Debug for MemoryQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryQuery")
            .field("rows", &self.rows.len())
            .field("filters", &self.filters.len())
            .field("order", &self.order)
            .finish()
    }
}

impl MemoryQuery {
    pub fn new(rows: Vec<Value>) -> Self {
        Self::shared(Arc::new(rows))
    }

    pub fn shared(rows: Arc<Vec<Value>>) -> Self {
        Self {
            rows,
            filters: Vec::new(),
            order: Vec::new(),
        }
    }

    pub fn filter<F>(&mut self, predicate: F) -> &mut Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        self.filters.push(Arc::new(predicate));
        self
    }

    /// Orderings applied so far, in application order.
    pub fn orderings(&self) -> &[(String, SortDir)] {
        &self.order
    }

    fn has_column(&self, field: &str) -> bool {
        self.rows.iter().any(|r| r.get(field).is_some())
    }

    fn matching_rows(&self) -> Result<Vec<Value>, MemoryError> {
        if let Some((field, _)) = self
            .order
            .iter()
            .find(|(f, _)| !self.rows.is_empty() && !self.has_column(f))
        {
            return Err(MemoryError::UnknownColumn(field.clone()));
        }

        let mut rows: Vec<Value> = self
            .rows
            .iter()
            .filter(|r| self.filters.iter().all(|p| p(r)))
            .cloned()
            .collect();

        rows.sort_by(|a, b| {
            self.order
                .iter()
                .map(|(field, dir)| {
                    let ord = compare_values(
                        a.get(field).unwrap_or(&Value::Null),
                        b.get(field).unwrap_or(&Value::Null),
                    );
                    match dir {
                        SortDir::Asc => ord,
                        SortDir::Desc => ord.reverse(),
                    }
                })
                .find(|o| *o != Ordering::Equal)
                .unwrap_or(Ordering::Equal)
        });
        Ok(rows)
    }
}

/// Null < bool < number < string; arrays and objects compare equal.
fn compare_values(a: &Value, b: &Value) -> Ordering {
    fn rank(v: &Value) -> u8 {
        match v {
            Value::Null => 0,
            Value::Bool(_) => 1,
            Value::Number(_) => 2,
            Value::String(_) => 3,
            Value::Array(_) | Value::Object(_) => 4,
        }
    }

    match (a, b) {
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Number(x), Value::Number(y)) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Value::String(x), Value::String(y)) => x.cmp(y),
        _ => rank(a).cmp(&rank(b)),
    }
}

#[async_trait]
impl Queryable for MemoryQuery {
    type Item = Value;
    type Error = MemoryError;

    fn order_by(&mut self, field: &str, dir: SortDir) {
        self.order.push((field.to_string(), dir));
    }

    async fn paginate(&self, page: u64, per_page: u64) -> Result<Page<Value>, MemoryError> {
        let rows = self.matching_rows()?;
        let total = rows.len() as u64;
        let skip = page.saturating_sub(1).saturating_mul(per_page);
        let items = rows
            .into_iter()
            .skip(usize::try_from(skip).unwrap_or(usize::MAX))
            .take(usize::try_from(per_page).unwrap_or(usize::MAX))
            .collect();
        Ok(Page::new(items, PageInfo::new(page, per_page, total)))
    }
}

/// A named in-memory table with declared computed attributes.
#[derive(Clone, Debug)]
pub struct MemoryModel {
    name: String,
    rows: Arc<Vec<Value>>,
    computed: Vec<String>,
}

impl MemoryModel {
    pub fn new(name: impl Into<String>, rows: Vec<Value>) -> Self {
        Self {
            name: name.into(),
            rows: Arc::new(rows),
            computed: Vec::new(),
        }
    }

    pub fn with_computed<I, S>(mut self, attributes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.computed = attributes.into_iter().map(Into::into).collect();
        self
    }
}

impl TableModel for MemoryModel {
    type Query = MemoryQuery;

    fn name(&self) -> &str {
        &self.name
    }

    fn query(&self) -> MemoryQuery {
        MemoryQuery::shared(Arc::clone(&self.rows))
    }

    fn computed_attributes(&self) -> Vec<String> {
        self.computed.clone()
    }
}
