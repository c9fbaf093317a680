//! Pipeline behaviour of `TableResponder` against in-memory and spy stores.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use datatable_core::memory::{MemoryModel, MemoryQuery};
use datatable_core::{
    DataSource, ModelRegistry, Page, PageInfo, Queryable, SortDir, TableError, TableModel,
    TableResponder, DISALLOW_ORDERING_BY,
};
use serde_json::{json, Value};

fn users() -> Vec<Value> {
    vec![
        json!({"id": 1, "first_name": "Ada", "last_name": "Lovelace", "full_name": "Ada Lovelace"}),
        json!({"id": 2, "first_name": "Alan", "last_name": "Turing", "full_name": "Alan Turing"}),
        json!({"id": 3, "first_name": "Grace", "last_name": "Hopper", "full_name": "Grace Hopper"}),
        json!({"id": 4, "first_name": "Ada", "last_name": "Byron", "full_name": "Ada Byron"}),
    ]
}

fn user_model() -> MemoryModel {
    MemoryModel::new("users", users()).with_computed(["fullName", "isActive"])
}

fn ids(rows: &[Value]) -> Vec<i64> {
    rows.iter().map(|r| r["id"].as_i64().unwrap()).collect()
}

/// Records what the pipeline does to the store.
#[derive(Clone, Default)]
struct SpyQuery {
    orderings: Arc<Mutex<Vec<(String, SortDir)>>>,
    paginations: Arc<AtomicUsize>,
    fail: bool,
}

#[derive(Debug, thiserror::Error)]
#[error("store offline")]
struct Offline;

#[async_trait]
impl Queryable for SpyQuery {
    type Item = u32;
    type Error = Offline;

    fn order_by(&mut self, field: &str, dir: SortDir) {
        self.orderings.lock().unwrap().push((field.to_string(), dir));
    }

    async fn paginate(&self, page: u64, per_page: u64) -> Result<Page<u32>, Offline> {
        self.paginations.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(Offline);
        }
        Ok(Page::new(vec![10, 20, 30], PageInfo::new(page, per_page, 42)))
    }
}

/// A model over `SpyQuery` that records when its computed attributes are read,
/// as the number of paginations seen at that moment.
#[derive(Clone, Default)]
struct SpyModel {
    query: SpyQuery,
    attribute_reads: Arc<Mutex<Vec<usize>>>,
}

impl TableModel for SpyModel {
    type Query = SpyQuery;

    fn name(&self) -> &str {
        "spies"
    }

    fn query(&self) -> SpyQuery {
        self.query.clone()
    }

    fn computed_attributes(&self) -> Vec<String> {
        let paginations = self.query.paginations.load(Ordering::SeqCst);
        self.attribute_reads.lock().unwrap().push(paginations);
        vec!["fullName".to_string()]
    }
}

#[tokio::test]
async fn no_sort_params_apply_no_ordering() {
    let spy = SpyQuery::default();
    let resp = TableResponder::for_query(spy.clone())
        .build()
        .unwrap()
        .respond(&[("page", "1")])
        .await
        .unwrap();

    assert!(spy.orderings.lock().unwrap().is_empty());
    assert_eq!(resp.data, vec![10, 20, 30]);
    assert_eq!(resp.page_info.per_page, 15);
}

#[tokio::test]
async fn invalid_direction_aborts_before_store_and_meta() {
    let model = SpyModel::default();
    let spy = model.query.clone();
    let reads = Arc::clone(&model.attribute_reads);
    let meta_calls = Arc::new(AtomicUsize::new(0));
    let calls = Arc::clone(&meta_calls);

    let err = TableResponder::for_model(model)
        .meta_with("count", move |_, items| {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(json!(items.len()))
        })
        .build()
        .unwrap()
        .respond(&[("orderByField", "id"), ("orderByDirection", "upwards")])
        .await
        .unwrap_err();

    assert!(matches!(err, TableError::InvalidSortDirection(d) if d == "upwards"));
    assert_eq!(spy.paginations.load(Ordering::SeqCst), 0);
    assert_eq!(meta_calls.load(Ordering::SeqCst), 0);
    assert!(reads.lock().unwrap().is_empty());
    assert!(spy.orderings.lock().unwrap().is_empty());
}

#[tokio::test]
async fn computed_attributes_are_read_once_after_paging() {
    let model = SpyModel::default();
    let reads = Arc::clone(&model.attribute_reads);

    let resp = TableResponder::for_model(model)
        .build()
        .unwrap()
        .respond(&[("orderByField", "id"), ("orderByDirection", "asc")])
        .await
        .unwrap();

    assert_eq!(*reads.lock().unwrap(), vec![1]);
    assert_eq!(resp.disallowed_ordering_by(), vec!["full_name"]);
}

#[tokio::test]
async fn camel_case_request_field_takes_generic_path() {
    let model = SpyModel::default();
    let spy = model.query.clone();
    let override_calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&override_calls);

    let resp = TableResponder::for_model(model)
        .per_page(2)
        .meta("label", "Users")
        .override_order_by("full_name", move |_: &mut SpyQuery, _| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
        .build()
        .unwrap()
        .respond(&[("orderByField", "fullName"), ("orderByDirection", "desc")])
        .await
        .unwrap();

    assert_eq!(override_calls.load(Ordering::SeqCst), 0);
    assert_eq!(
        *spy.orderings.lock().unwrap(),
        vec![("fullName".to_string(), SortDir::Desc)]
    );
    // The override key still covers the snake_case field.
    assert!(resp.disallowed_ordering_by().is_empty());
}

#[tokio::test]
async fn direction_is_case_insensitive() {
    let spy = SpyQuery::default();
    TableResponder::for_query(spy.clone())
        .build()
        .unwrap()
        .respond(&[("orderByField", "email"), ("orderByDirection", "DESC")])
        .await
        .unwrap();

    assert_eq!(
        *spy.orderings.lock().unwrap(),
        vec![("email".to_string(), SortDir::Desc)]
    );
}

#[tokio::test]
async fn override_handler_runs_once_instead_of_generic_order() {
    let spy = SpyQuery::default();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let seen_in_handler = Arc::clone(&seen);

    TableResponder::for_query(spy.clone())
        .override_order_by("full_name", move |q: &mut SpyQuery, dir| {
            seen_in_handler.lock().unwrap().push(dir);
            q.order_by("first_name", dir);
            q.order_by("last_name", dir);
            Ok(())
        })
        .build()
        .unwrap()
        .respond(&[("orderByField", "full_name"), ("orderByDirection", "Asc")])
        .await
        .unwrap();

    assert_eq!(*seen.lock().unwrap(), vec![SortDir::Asc]);
    assert_eq!(
        *spy.orderings.lock().unwrap(),
        vec![
            ("first_name".to_string(), SortDir::Asc),
            ("last_name".to_string(), SortDir::Asc),
        ]
    );
}

#[tokio::test]
async fn store_errors_propagate_unchanged() {
    let spy = SpyQuery {
        fail: true,
        ..SpyQuery::default()
    };
    let err = TableResponder::for_query(spy)
        .build()
        .unwrap()
        .respond(&[("page", "1")])
        .await
        .unwrap_err();

    match err {
        TableError::Store(inner) => assert!(inner.downcast_ref::<Offline>().is_some()),
        other => panic!("expected Store, got {other:?}"),
    }
}

#[tokio::test]
async fn hook_errors_abort_the_request() {
    let spy = SpyQuery::default();
    let err = TableResponder::for_query(spy.clone())
        .query(|_| Err(anyhow::anyhow!("tenant missing")))
        .build()
        .unwrap()
        .respond(&[("page", "1")])
        .await
        .unwrap_err();

    assert!(matches!(err, TableError::Hook(_)));
    assert_eq!(err.to_string(), "tenant missing");
    assert_eq!(spy.paginations.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn collection_hook_without_replacement_keeps_items() {
    let resp = TableResponder::for_query(SpyQuery::default())
        .collection(|_| Ok(None))
        .build()
        .unwrap()
        .respond(&[("page", "2")])
        .await
        .unwrap();

    assert_eq!(resp.data, vec![10, 20, 30]);
}

#[tokio::test]
async fn collection_hook_may_mutate_in_place() {
    let resp = TableResponder::for_query(SpyQuery::default())
        .collection(|items| {
            items.iter_mut().for_each(|i| *i += 1);
            Ok(None)
        })
        .build()
        .unwrap()
        .respond(&[("page", "1")])
        .await
        .unwrap();

    assert_eq!(resp.data, vec![11, 21, 31]);
}

#[tokio::test]
async fn collection_hook_replacement_keeps_counters() {
    let resp = TableResponder::for_query(SpyQuery::default())
        .per_page(3)
        .collection(|items| Ok(Some(items.iter().rev().copied().collect())))
        .build()
        .unwrap()
        .respond(&[("page", "5")])
        .await
        .unwrap();

    assert_eq!(resp.data, vec![30, 20, 10]);
    assert_eq!(resp.page_info, PageInfo::new(5, 3, 42));
}

#[tokio::test]
async fn meta_providers_see_final_query_and_items() {
    let resp = TableResponder::for_model(user_model())
        .per_page(2)
        .collection(|items| Ok(Some(items.drain(..1).collect())))
        .meta_with("orderings", |q: &MemoryQuery, _| Ok(json!(q.orderings())))
        .meta_with("count", |_, items| Ok(json!(items.len())))
        .build()
        .unwrap()
        .respond(&[("orderByField", "id"), ("orderByDirection", "desc")])
        .await
        .unwrap();

    assert_eq!(resp.meta["orderings"], json!([["id", "desc"]]));
    assert_eq!(resp.meta["count"], json!(1));
    assert_eq!(ids(&resp.data), vec![4]);
}

#[tokio::test]
async fn caller_cannot_set_disallow_ordering_by() {
    let resp = TableResponder::for_model(user_model())
        .meta(DISALLOW_ORDERING_BY, json!(["id"]))
        .build()
        .unwrap()
        .respond(&[("page", "1")])
        .await
        .unwrap();

    assert_eq!(resp.meta[DISALLOW_ORDERING_BY], json!(["full_name", "is_active"]));
}

#[tokio::test]
async fn raw_query_has_no_disallowed_fields() {
    let resp = TableResponder::for_query(MemoryQuery::new(users()))
        .build()
        .unwrap()
        .respond(&[("page", "1")])
        .await
        .unwrap();

    assert_eq!(resp.meta[DISALLOW_ORDERING_BY], json!([]));
    assert_eq!(resp.page_info.total, 4);
}

#[tokio::test]
async fn generic_path_lets_store_reject_unknown_fields() {
    let err = TableResponder::for_model(user_model())
        .build()
        .unwrap()
        .respond(&[("orderByField", "shoe_size"), ("orderByDirection", "asc")])
        .await
        .unwrap_err();

    assert!(matches!(err, TableError::Store(_)));
    assert_eq!(err.to_string(), "unknown column: shoe_size");
}

#[test]
fn zero_page_size_is_rejected() {
    let err = TableResponder::for_query(SpyQuery::default())
        .per_page(0)
        .build()
        .unwrap_err();
    assert!(matches!(err, TableError::InvalidConfiguration(_)));
}

#[test]
fn registry_resolves_known_models_only() {
    let registry = ModelRegistry::new().register(user_model());
    assert!(registry.contains("users"));

    let source = registry.resolve("users").unwrap();
    assert_eq!(source.name(), Some("users"));

    let err = registry.resolve("accounts").unwrap_err();
    assert!(matches!(err, TableError::InvalidConfiguration(_)));
}

#[tokio::test]
async fn hashmap_params_work_end_to_end() {
    let mut params = HashMap::new();
    params.insert("orderByField".to_string(), "last_name".to_string());
    params.insert("orderByDirection".to_string(), "asc".to_string());
    params.insert("page".to_string(), "1".to_string());

    let resp = TableResponder::builder(DataSource::model(user_model()))
        .build()
        .unwrap()
        .respond(&params)
        .await
        .unwrap();

    assert_eq!(ids(&resp.data), vec![4, 3, 1, 2]);
}

/// Computed `fullName` and `isActive`, page size 2, `{"label": "Users"}`,
/// generic ordering on the computed column.
#[tokio::test]
async fn end_to_end_generic_sort_on_computed_column() {
    let resp = TableResponder::for_model(user_model())
        .per_page(2)
        .meta("label", "Users")
        .build()
        .unwrap()
        .respond(&[("orderByField", "full_name"), ("orderByDirection", "desc")])
        .await
        .unwrap();

    assert_eq!(resp.data.len(), 2);
    assert_eq!(ids(&resp.data), vec![3, 2]);
    assert_eq!(
        serde_json::to_value(&resp.meta).unwrap(),
        json!({"label": "Users", "disallow_ordering_by": ["full_name", "is_active"]})
    );
    assert_eq!(resp.page_info, PageInfo::new(1, 2, 4));
}

/// Same entity with an override for `full_name` ordering by two columns.
#[tokio::test]
async fn end_to_end_override_sort() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);

    let resp = TableResponder::for_model(user_model())
        .per_page(2)
        .meta("label", "Users")
        .override_order_by("full_name", move |q: &mut MemoryQuery, dir| {
            counter.fetch_add(1, Ordering::SeqCst);
            assert_eq!(dir, SortDir::Asc);
            q.order_by("first_name", dir);
            q.order_by("last_name", dir);
            Ok(())
        })
        .meta_with("orderings", |q: &MemoryQuery, _| Ok(json!(q.orderings())))
        .build()
        .unwrap()
        .respond(&[("orderByField", "full_name"), ("orderByDirection", "asc")])
        .await
        .unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(ids(&resp.data), vec![4, 1]);
    assert_eq!(resp.disallowed_ordering_by(), vec!["is_active"]);
    assert_eq!(
        resp.meta["orderings"],
        json!([["first_name", "asc"], ["last_name", "asc"]])
    );
}
