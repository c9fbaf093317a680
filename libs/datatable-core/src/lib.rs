//! Dynamic table responses.
//!
//! A [`TableResponder`] takes a data source and request parameters, shapes the
//! query (caller hook, then client sort via the generic order-by or a per-field
//! override), paginates through the backing store, optionally post-processes
//! the page items, and assembles metadata. The metadata always carries
//! `disallow_ordering_by`: the entity's computed attributes that have no
//! custom order handler.
//!
//! ```rust
//! # async fn demo() -> Result<(), datatable_core::TableError> {
//! use datatable_core::{memory::MemoryModel, TableResponder};
//! use serde_json::json;
//!
//! let users = MemoryModel::new("users", vec![json!({"id": 1}), json!({"id": 2})])
//!     .with_computed(["fullName"]);
//!
//! let resp = TableResponder::for_model(users)
//!     .per_page(10)
//!     .meta("label", "Users")
//!     .build()?
//!     .respond(&[("orderByField", "id"), ("orderByDirection", "desc")])
//!     .await?;
//!
//! assert_eq!(resp.data[0]["id"], 2);
//! assert_eq!(resp.disallowed_ordering_by(), vec!["full_name"]);
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod memory;
pub mod meta;
pub mod page;
pub mod responder;
pub mod response;
pub mod sort;
pub mod source;

pub use error::{TableError, TableResult};
pub use meta::{MetaProvider, MetaSpec, MetaValue, DISALLOW_ORDERING_BY};
pub use page::{Page, PageInfo};
pub use responder::{
    CollectionHook, OrderHandler, QueryHook, TableConfig, TableResponder, TableResponderBuilder,
    DEFAULT_PER_PAGE,
};
pub use response::TableResponse;
pub use sort::{RequestParams, SortDir, SortRequest, ORDER_BY_DIRECTION, ORDER_BY_FIELD, PAGE};
pub use source::{DataSource, ModelRegistry, Queryable, TableModel};
