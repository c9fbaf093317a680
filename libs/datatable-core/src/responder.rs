//! The table responder: build query → paginate → post-process → metadata.

use std::collections::HashMap;
use std::fmt;

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::error::TableError;
use crate::meta::{disallowed_ordering_fields, MetaSpec, MetaValue};
use crate::page::Page;
use crate::response::TableResponse;
use crate::sort::{extract_sort, requested_page, RequestParams, SortDir};
use crate::source::{DataSource, Queryable, TableModel};

/// Rows per page when the caller does not set one.
pub const DEFAULT_PER_PAGE: u64 = 15;

/// Mutates the base query in place (filters, joins, eager loads).
pub type QueryHook<Q> = Box<dyn Fn(&mut Q) -> anyhow::Result<()> + Send + Sync>;

/// Custom ordering for one field, used instead of the generic order-by.
pub type OrderHandler<Q> = Box<dyn Fn(&mut Q, SortDir) -> anyhow::Result<()> + Send + Sync>;

/// Post-processes page items. Return `None` to keep the (possibly mutated)
/// items, or `Some(items)` to replace them.
pub type CollectionHook<T> =
    Box<dyn Fn(&mut Vec<T>) -> anyhow::Result<Option<Vec<T>>> + Send + Sync>;

type Item<Q> = <Q as Queryable>::Item;

/// Immutable per-request configuration, produced by [`TableResponderBuilder::build`].
///
/// Each pipeline stage is exposed on its own so adapters can run them
/// separately; [`TableResponder::respond`] chains them.
pub struct TableConfig<Q: Queryable> {
    per_page: u64,
    query_hook: Option<QueryHook<Q>>,
    order_overrides: HashMap<String, OrderHandler<Q>>,
    collection_hook: Option<CollectionHook<Item<Q>>>,
    meta: MetaSpec<Q, Item<Q>>,
}

impl<Q: Queryable> TableConfig<Q> {
    pub fn per_page(&self) -> u64 {
        self.per_page
    }

    pub fn is_overridden(&self, field: &str) -> bool {
        self.order_overrides.contains_key(field)
    }

    /// Apply the query hook, then the client's sort request.
    ///
    /// An invalid direction fails here, before anything touches the store.
    pub fn build_query<P>(&self, mut query: Q, params: &P) -> Result<Q, TableError>
    where
        P: RequestParams + ?Sized,
    {
        if let Some(hook) = &self.query_hook {
            hook(&mut query).map_err(TableError::Hook)?;
        }

        let sort = extract_sort(params).inspect_err(|e| warn!(error = %e, "rejected sort request"))?;
        let Some(sort) = sort else {
            return Ok(query);
        };

        match self.order_overrides.get(&sort.field) {
            Some(handler) => {
                debug!(field = %sort.field, dir = %sort.dir, "ordering via override");
                handler(&mut query, sort.dir).map_err(TableError::Hook)?;
            }
            None => {
                debug!(field = %sort.field, dir = %sort.dir, "ordering by field");
                query.order_by(&sort.field, sort.dir);
            }
        }
        Ok(query)
    }

    pub async fn paginate(&self, query: &Q, page: u64) -> Result<Page<Item<Q>>, TableError> {
        let page = query
            .paginate(page, self.per_page)
            .await
            .map_err(TableError::store)?;
        debug!(
            page = page.page_info.page,
            total = page.page_info.total,
            items = page.items.len(),
            "fetched page"
        );
        Ok(page)
    }

    pub fn post_process(&self, page: &mut Page<Item<Q>>) -> Result<(), TableError> {
        let Some(hook) = &self.collection_hook else {
            return Ok(());
        };
        if let Some(replacement) = hook(&mut page.items).map_err(TableError::Hook)? {
            page.replace_items(replacement);
        }
        Ok(())
    }

    /// Fields a client may not order by for `source`, given this config's overrides.
    pub fn disallowed_ordering_fields(&self, source: &DataSource<Q>) -> Vec<String> {
        self.disallowed_for(source.computed_attributes())
    }

    fn disallowed_for(&self, computed_attributes: Vec<String>) -> Vec<String> {
        disallowed_ordering_fields(computed_attributes, |f| self.is_overridden(f))
    }

    pub fn assemble_meta(
        &self,
        query: &Q,
        items: &[Item<Q>],
        disallowed: Vec<String>,
    ) -> Result<Map<String, Value>, TableError> {
        self.meta.assemble(query, items, disallowed)
    }
}

impl<Q: Queryable> fmt::Debug for TableConfig<Q> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TableConfig")
            .field("per_page", &self.per_page)
            .field("query_hook", &self.query_hook.is_some())
            .field("order_overrides", &self.order_overrides.keys().collect::<Vec<_>>())
            .field("collection_hook", &self.collection_hook.is_some())
            .field("meta", &self.meta)
            .finish()
    }
}

/// A configured responder for one request.
pub struct TableResponder<Q: Queryable> {
    source: DataSource<Q>,
    config: TableConfig<Q>,
}

impl<Q: Queryable> fmt::Debug for TableResponder<Q> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TableResponder")
            .field("source", &self.source)
            .field("config", &self.config)
            .finish()
    }
}

impl<Q: Queryable> TableResponder<Q> {
    pub fn builder(source: DataSource<Q>) -> TableResponderBuilder<Q> {
        TableResponderBuilder::new(source)
    }

    pub fn for_model<M>(model: M) -> TableResponderBuilder<Q>
    where
        M: TableModel<Query = Q> + 'static,
    {
        Self::builder(DataSource::model(model))
    }

    pub fn for_query(query: Q) -> TableResponderBuilder<Q> {
        Self::builder(DataSource::query(query))
    }

    pub fn source(&self) -> &DataSource<Q> {
        &self.source
    }

    pub fn config(&self) -> &TableConfig<Q> {
        &self.config
    }

    pub fn disallowed_ordering_fields(&self) -> Vec<String> {
        self.config.disallowed_ordering_fields(&self.source)
    }

    /// Run the whole pipeline for `params`. Any failure aborts the request;
    /// no partial response is produced.
    pub async fn respond<P>(self, params: &P) -> Result<TableResponse<Item<Q>>, TableError>
    where
        P: RequestParams + ?Sized,
    {
        let Self { source, config } = self;
        debug!(model = source.name().unwrap_or("<query>"), "building table response");

        let (query, model) = source.into_parts();
        let query = config.build_query(query, params)?;
        let mut page = config.paginate(&query, requested_page(params)).await?;
        config.post_process(&mut page)?;

        // The model is only consulted once the page is final.
        let computed = model
            .map(|m| m.computed_attributes())
            .unwrap_or_default();
        let meta = config.assemble_meta(&query, &page.items, config.disallowed_for(computed))?;

        Ok(TableResponse::new(page, meta))
    }
}

/// Fluent configuration for a [`TableResponder`]; validated once in [`build`](Self::build).
pub struct TableResponderBuilder<Q: Queryable> {
    source: DataSource<Q>,
    per_page: u64,
    query_hook: Option<QueryHook<Q>>,
    order_overrides: HashMap<String, OrderHandler<Q>>,
    collection_hook: Option<CollectionHook<Item<Q>>>,
    meta: MetaSpec<Q, Item<Q>>,
}

impl<Q: Queryable> TableResponderBuilder<Q> {
    pub fn new(source: DataSource<Q>) -> Self {
        Self {
            source,
            per_page: DEFAULT_PER_PAGE,
            query_hook: None,
            order_overrides: HashMap::new(),
            collection_hook: None,
            meta: MetaSpec::new(),
        }
    }

    pub fn per_page(mut self, per_page: u64) -> Self {
        self.per_page = per_page;
        self
    }

    /// Set the query hook, replacing any previous one.
    pub fn query<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut Q) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.query_hook = Some(Box::new(hook));
        self
    }

    /// Order `field` with `handler` instead of the generic order-by. This also
    /// makes `field` orderable even when it is a computed attribute.
    pub fn override_order_by<F>(mut self, field: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&mut Q, SortDir) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.order_overrides.insert(field.into(), Box::new(handler));
        self
    }

    pub fn override_order_by_many<I, K>(mut self, overrides: I) -> Self
    where
        I: IntoIterator<Item = (K, OrderHandler<Q>)>,
        K: Into<String>,
    {
        self.order_overrides
            .extend(overrides.into_iter().map(|(k, h)| (k.into(), h)));
        self
    }

    /// Set the collection hook, replacing any previous one.
    pub fn collection<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut Vec<Item<Q>>) -> anyhow::Result<Option<Vec<Item<Q>>>> + Send + Sync + 'static,
    {
        self.collection_hook = Some(Box::new(hook));
        self
    }

    /// Static metadata value.
    pub fn meta(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.meta.insert(key, MetaValue::Literal(value.into()));
        self
    }

    /// Metadata computed from the final query and page items.
    pub fn meta_with<F>(mut self, key: impl Into<String>, provider: F) -> Self
    where
        F: Fn(&Q, &[Item<Q>]) -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        self.meta.insert(key, MetaValue::computed(provider));
        self
    }

    pub fn meta_many<I, K>(mut self, entries: I) -> Self
    where
        I: IntoIterator<Item = (K, MetaValue<Q, Item<Q>>)>,
        K: Into<String>,
    {
        for (k, v) in entries {
            self.meta.insert(k, v);
        }
        self
    }

    pub fn build(self) -> Result<TableResponder<Q>, TableError> {
        if self.per_page == 0 {
            return Err(TableError::invalid_configuration(
                "per_page must be a positive integer",
            ));
        }

        Ok(TableResponder {
            source: self.source,
            config: TableConfig {
                per_page: self.per_page,
                query_hook: self.query_hook,
                order_overrides: self.order_overrides,
                collection_hook: self.collection_hook,
                meta: self.meta,
            },
        })
    }
}
