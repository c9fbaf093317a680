//! SeaORM backing store for datatable responders.
//!
//! [`SeaQuery`] implements [`datatable_core::Queryable`] over a `Select<E>`
//! and [`SeaModel`] serves an entity as a [`datatable_core::TableModel`].
//! [`connect`] turns a DSN into a pooled connection.

pub mod connect;
pub mod error;
pub mod model;
pub mod query;

pub use connect::{connect, detect, is_memory_dsn, ConnectOpts, DbEngine};
pub use error::{DbError, Result};
pub use model::{ComputedAttributes, SeaModel};
pub use query::SeaQuery;
