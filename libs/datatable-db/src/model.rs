use std::marker::PhantomData;

use datatable_core::TableModel;
use sea_orm::{DatabaseConnection, EntityName, EntityTrait};

use crate::query::SeaQuery;

/// Declares the attributes an entity exposes that are computed at read time
/// and therefore cannot be ordered by the database.
///
/// ```rust,ignore
/// impl ComputedAttributes for users::Entity {
///     fn computed_attributes() -> &'static [&'static str] {
///         &["fullName", "isActive"]
///     }
/// }
/// ```
pub trait ComputedAttributes {
    fn computed_attributes() -> &'static [&'static str] {
        &[]
    }
}

/// A SeaORM entity served as a table on a given connection.
pub struct SeaModel<E> {
    name: String,
    conn: DatabaseConnection,
    _entity: PhantomData<fn() -> E>,
}

impl<E> SeaModel<E>
where
    E: EntityTrait + ComputedAttributes,
{
    /// Named after the entity's table.
    pub fn new(conn: DatabaseConnection) -> Self {
        Self::named(E::default().table_name(), conn)
    }

    pub fn named(name: impl Into<String>, conn: DatabaseConnection) -> Self {
        Self {
            name: name.into(),
            conn,
            _entity: PhantomData,
        }
    }
}

impl<E> TableModel for SeaModel<E>
where
    E: EntityTrait + ComputedAttributes,
    E::Model: Send + Sync,
{
    type Query = SeaQuery<E>;

    fn name(&self) -> &str {
        &self.name
    }

    fn query(&self) -> SeaQuery<E> {
        SeaQuery::find(self.conn.clone())
    }

    fn computed_attributes(&self) -> Vec<String> {
        E::computed_attributes()
            .iter()
            .map(|a| a.to_string())
            .collect()
    }
}
