use axum::{extract::State, http::Uri};
use datatable_api::{table_error_to_problem, TableJson, TableParams, TableResult};
use datatable_core::{TableError, TableResponder, TableResponse};
use sea_orm::sea_query::Condition;
use sea_orm::ColumnTrait;
use serde_json::json;
use tracing::info;

use super::dto::UserDto;
use super::entity::{self, Column};
use super::{UserQuery, TABLE};
use crate::state::AppState;

/// Free-text filter on first and last name.
pub const SEARCH: &str = "search";

pub async fn list_users(
    State(state): State<AppState>,
    uri: Uri,
    params: TableParams,
) -> TableResult<UserDto> {
    info!(query = uri.query().unwrap_or(""), "listing users");

    respond(&state, &params)
        .await
        .map(|resp| TableJson(resp.map_data(UserDto::from)))
        .map_err(|e| table_error_to_problem(&e, uri.path()))
}

async fn respond(
    state: &AppState,
    params: &TableParams,
) -> Result<TableResponse<entity::Model>, TableError> {
    let settings = state.config.table(TABLE);
    let search = params.get(SEARCH).map(str::trim).unwrap_or_default().to_string();

    let mut builder = TableResponder::builder(state.tables.resolve(TABLE)?)
        .override_order_by("full_name", |q: &mut UserQuery, dir| {
            q.order_by_column(Column::FirstName, dir)
                .order_by_column(Column::LastName, dir);
            Ok(())
        })
        .meta("label", settings.label.unwrap_or_else(|| TABLE.to_string()))
        .meta_with("count", |_, items| Ok(json!(items.len())));

    if let Some(per_page) = settings.per_page {
        builder = builder.per_page(per_page);
    }
    if !search.is_empty() {
        builder = builder.query(move |q: &mut UserQuery| {
            q.filter(
                Condition::any()
                    .add(Column::FirstName.contains(search.as_str()))
                    .add(Column::LastName.contains(search.as_str())),
            );
            Ok(())
        });
    }

    builder.build()?.respond(params).await
}
