//! `Queryable` over a SeaORM `Select<E>`.

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use datatable_core::{Page, PageInfo, Queryable, SortDir};
use sea_orm::sea_query::{Alias, Expr, IntoCondition, Order, SimpleExpr};
use sea_orm::{
    ConnectionTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QueryTrait, Select,
};
use tracing::debug;

pub(crate) fn sea_order(dir: SortDir) -> Order {
    match dir {
        SortDir::Asc => Order::Asc,
        SortDir::Desc => Order::Desc,
    }
}

/// A SeaORM select bound to the connection it will run on.
///
/// Hooks mutate it in place through [`SeaQuery::filter`],
/// [`SeaQuery::order_by_column`] or the general [`SeaQuery::map`].
pub struct SeaQuery<E: EntityTrait> {
    select: Select<E>,
    conn: DatabaseConnection,
}

impl<E: EntityTrait> Clone for SeaQuery<E> {
    fn clone(&self) -> Self {
        Self {
            select: self.select.clone(),
            conn: self.conn.clone(),
        }
    }
}

impl<E: EntityTrait> fmt::Debug for SeaQuery<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // No backend lookup: it panics on a disconnected handle.
        f.debug_struct("SeaQuery")
            .field("select", self.select.as_query())
            .finish()
    }
}

impl<E: EntityTrait> SeaQuery<E> {
    pub fn new(select: Select<E>, conn: DatabaseConnection) -> Self {
        Self { select, conn }
    }

    /// `SELECT * FROM <entity>` on `conn`.
    pub fn find(conn: DatabaseConnection) -> Self {
        Self::new(E::find(), conn)
    }

    pub fn select(&self) -> &Select<E> {
        &self.select
    }

    pub fn connection(&self) -> &DatabaseConnection {
        &self.conn
    }

    pub fn into_select(self) -> Select<E> {
        self.select
    }

    /// Replace the select with `f(select)`.
    pub fn map(&mut self, f: impl FnOnce(Select<E>) -> Select<E>) -> &mut Self {
        let select = std::mem::replace(&mut self.select, E::find());
        self.select = f(select);
        self
    }

    pub fn filter<F: IntoCondition>(&mut self, condition: F) -> &mut Self {
        self.map(|s| s.filter(condition))
    }

    pub fn order_by_column(&mut self, column: E::Column, dir: SortDir) -> &mut Self {
        self.map(|s| s.order_by(column, sea_order(dir)))
    }

    /// The statement as it would run on this connection's backend.
    pub fn to_sql(&self) -> String {
        self.select
            .build(self.conn.get_database_backend())
            .to_string()
    }
}

#[async_trait]
impl<E> Queryable for SeaQuery<E>
where
    E: EntityTrait,
    E::Model: Send + Sync,
{
    type Item = E::Model;
    type Error = DbErr;

    /// Entity columns order directly; any other name becomes a table-qualified
    /// quoted identifier and is left for the database to accept or reject.
    fn order_by(&mut self, field: &str, dir: SortDir) {
        let order = sea_order(dir);
        match E::Column::from_str(field) {
            Ok(column) => {
                self.map(|s| s.order_by(column, order));
            }
            Err(_) => {
                debug!(field, "not an entity column, ordering by raw identifier");
                // Qualified so SQLite cannot read an unknown name as a string literal.
                let expr: SimpleExpr = Expr::col((E::default(), Alias::new(field))).into();
                self.map(|s| s.order_by(expr, order));
            }
        }
    }

    async fn paginate(&self, page: u64, per_page: u64) -> Result<Page<E::Model>, DbErr> {
        let paginator = self.select.clone().paginate(&self.conn, per_page);
        let counts = paginator.num_items_and_pages().await?;
        let items = paginator.fetch_page(page.saturating_sub(1)).await?;
        Ok(Page::new(
            items,
            PageInfo::new(page, per_page, counts.number_of_items),
        ))
    }
}
