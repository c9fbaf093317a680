//! Data-source abstractions the responder consumes.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::TableError;
use crate::page::Page;
use crate::sort::SortDir;

/// A query against some backing store that can be ordered and paginated.
///
/// Implementations never execute anything in [`Queryable::order_by`]; the
/// only I/O happens in [`Queryable::paginate`].
#[async_trait]
pub trait Queryable: Send + Sync {
    type Item: Send + Sync;
    type Error: std::error::Error + Send + Sync + 'static;

    /// Append an ordering on `field`. Unknown field names are reported by the
    /// store when the query runs, not here.
    fn order_by(&mut self, field: &str, dir: SortDir);

    /// Fetch the 1-based `page` of `per_page` rows plus the total count.
    async fn paginate(&self, page: u64, per_page: u64) -> Result<Page<Self::Item>, Self::Error>;
}

/// An entity type that can serve as a table: it yields its default query and
/// declares which of its exposed attributes are computed rather than stored.
pub trait TableModel: Send + Sync {
    type Query: Queryable;

    fn name(&self) -> &str;

    /// A fresh, unordered query over the whole entity.
    fn query(&self) -> Self::Query;

    /// Computed attribute names as the entity declares them (any case style).
    fn computed_attributes(&self) -> Vec<String> {
        Vec::new()
    }
}

/// Where a responder gets its base query from.
pub enum DataSource<Q: Queryable> {
    Model(Arc<dyn TableModel<Query = Q>>),
    Query(Q),
}

impl<Q: Queryable> DataSource<Q> {
    pub fn model<M>(model: M) -> Self
    where
        M: TableModel<Query = Q> + 'static,
    {
        DataSource::Model(Arc::new(model))
    }

    pub fn query(query: Q) -> Self {
        DataSource::Query(query)
    }

    /// Model name, if the source is a model.
    pub fn name(&self) -> Option<&str> {
        match self {
            DataSource::Model(m) => Some(m.name()),
            DataSource::Query(_) => None,
        }
    }

    /// Computed attributes of the model; a raw query has none.
    pub fn computed_attributes(&self) -> Vec<String> {
        match self {
            DataSource::Model(m) => m.computed_attributes(),
            DataSource::Query(_) => Vec::new(),
        }
    }

    /// Split into the base query and, for a model source, the model itself.
    pub fn into_parts(self) -> (Q, Option<Arc<dyn TableModel<Query = Q>>>) {
        match self {
            DataSource::Model(m) => (m.query(), Some(m)),
            DataSource::Query(q) => (q, None),
        }
    }
}

impl<Q: Queryable + Clone> Clone for DataSource<Q> {
    fn clone(&self) -> Self {
        match self {
            DataSource::Model(m) => DataSource::Model(Arc::clone(m)),
            DataSource::Query(q) => DataSource::Query(q.clone()),
        }
    }
}

impl<Q: Queryable> fmt::Debug for DataSource<Q> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSource::Model(m) => f.debug_tuple("Model").field(&m.name()).finish(),
            DataSource::Query(_) => f.write_str("Query(..)"),
        }
    }
}

/// Named models, resolved by identifier when a responder is configured.
pub struct ModelRegistry<Q: Queryable> {
    models: HashMap<String, Arc<dyn TableModel<Query = Q>>>,
}

impl<Q: Queryable> Default for ModelRegistry<Q> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Q: Queryable> ModelRegistry<Q> {
    pub fn new() -> Self {
        Self {
            models: HashMap::new(),
        }
    }

    /// Register `model` under its own name, replacing any previous entry.
    pub fn register<M>(mut self, model: M) -> Self
    where
        M: TableModel<Query = Q> + 'static,
    {
        self.models.insert(model.name().to_string(), Arc::new(model));
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.models.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.models.keys().map(String::as_str)
    }

    /// Resolve `name` to a model data source.
    pub fn resolve(&self, name: &str) -> Result<DataSource<Q>, TableError> {
        self.models
            .get(name)
            .map(|m| DataSource::Model(Arc::clone(m)))
            .ok_or_else(|| {
                TableError::invalid_configuration(format!("unknown table model `{name}`"))
            })
    }
}
