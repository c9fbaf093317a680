use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use datatable_core::TableResponse;
use serde::Serialize;

use crate::problem::ProblemResponse;

/// `200 OK` JSON rendering of a [`TableResponse`].
#[derive(Debug)]
pub struct TableJson<T>(pub TableResponse<T>);

impl<T> From<TableResponse<T>> for TableJson<T> {
    fn from(resp: TableResponse<T>) -> Self {
        Self(resp)
    }
}

impl<T: Serialize> IntoResponse for TableJson<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self.0)).into_response()
    }
}

/// Handler return type for table endpoints.
pub type TableResult<T> = Result<TableJson<T>, ProblemResponse>;
