//! The demo `users` table.

pub mod dto;
pub mod entity;
pub mod handlers;
pub mod schema;

use axum::{routing::get, Router};
use datatable_core::ModelRegistry;
use datatable_db::{SeaModel, SeaQuery};
use sea_orm::DatabaseConnection;

use crate::state::AppState;

pub const TABLE: &str = "users";

pub type UserQuery = SeaQuery<entity::Entity>;

pub fn registry(conn: DatabaseConnection) -> ModelRegistry<UserQuery> {
    ModelRegistry::new().register(SeaModel::<entity::Entity>::named(TABLE, conn))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/users", get(handlers::list_users))
}
