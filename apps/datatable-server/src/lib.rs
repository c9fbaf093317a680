//! Demo HTTP server for datatable responders.

pub mod db;
pub mod state;
pub mod users;

use std::sync::Arc;

use axum::Router;
use runtime::AppConfig;
use sea_orm::DatabaseConnection;
use tower_http::trace::TraceLayer;

pub use state::AppState;

pub fn build_state(config: AppConfig, conn: DatabaseConnection) -> AppState {
    AppState {
        config: Arc::new(config),
        tables: Arc::new(users::registry(conn)),
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(users::router())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
