//! Response metadata: caller literals and providers, plus the reserved
//! `disallow_ordering_by` entry.

use std::collections::HashSet;
use std::fmt;

use heck::ToSnakeCase;
use serde_json::{Map, Value};

use crate::error::TableError;

/// Reserved metadata key; always overwritten with the derived list.
pub const DISALLOW_ORDERING_BY: &str = "disallow_ordering_by";

/// Computes a metadata value from the final query and the final page items.
pub type MetaProvider<Q, T> = Box<dyn Fn(&Q, &[T]) -> anyhow::Result<Value> + Send + Sync>;

pub enum MetaValue<Q, T> {
    Literal(Value),
    Computed(MetaProvider<Q, T>),
}

impl<Q, T> MetaValue<Q, T> {
    pub fn computed<F>(f: F) -> Self
    where
        F: Fn(&Q, &[T]) -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        MetaValue::Computed(Box::new(f))
    }

    fn resolve(&self, query: &Q, items: &[T]) -> Result<Value, TableError> {
        match self {
            MetaValue::Literal(v) => Ok(v.clone()),
            MetaValue::Computed(f) => f(query, items).map_err(TableError::Hook),
        }
    }
}

impl<Q, T> fmt::Debug for MetaValue<Q, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetaValue::Literal(v) => f.debug_tuple("Literal").field(v).finish(),
            MetaValue::Computed(_) => f.write_str("Computed(..)"),
        }
    }
}

/// Ordered metadata specification. Keys keep the position of their first
/// registration; registering a key again replaces its value.
pub struct MetaSpec<Q, T> {
    entries: Vec<(String, MetaValue<Q, T>)>,
}

impl<Q, T> Default for MetaSpec<Q, T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<Q, T> fmt::Debug for MetaSpec<Q, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.entries.iter().map(|(k, v)| (k, v)))
            .finish()
    }
}

impl<Q, T> MetaSpec<Q, T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: MetaValue<Q, T>) {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Evaluate every entry in registration order, then set the reserved
    /// [`DISALLOW_ORDERING_BY`] key to `disallowed`.
    pub fn assemble(
        &self,
        query: &Q,
        items: &[T],
        disallowed: Vec<String>,
    ) -> Result<Map<String, Value>, TableError> {
        let mut out = Map::new();
        for (key, value) in &self.entries {
            out.insert(key.clone(), value.resolve(query, items)?);
        }
        out.insert(
            DISALLOW_ORDERING_BY.to_string(),
            Value::from(disallowed),
        );
        Ok(out)
    }
}

/// Convert a declared attribute name (`fullName`, `FullName`, `full_name`)
/// to its snake_case field name.
pub fn attribute_field_name(attribute: &str) -> String {
    attribute.to_snake_case()
}

/// Fields clients must not order by: the computed attributes, as snake_case
/// field names, minus any field with a custom order handler. First occurrence
/// wins when a name repeats.
pub fn disallowed_ordering_fields<I, S>(
    computed_attributes: I,
    is_overridden: impl Fn(&str) -> bool,
) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    computed_attributes
        .into_iter()
        .map(|a| attribute_field_name(a.as_ref()))
        .filter(|f| !f.is_empty() && !is_overridden(f))
        .filter(|f| seen.insert(f.clone()))
        .collect()
}
