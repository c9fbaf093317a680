//! `TableError` → RFC 9457 problem mapping.

use axum::http::StatusCode;
use datatable_core::TableError;
use tracing::{error, warn};

use crate::problem::{Problem, ProblemResponse};

/// Static error definition from the catalog.
#[derive(Debug, Clone, Copy)]
pub struct ErrDef {
    pub status: u16,
    pub title: &'static str,
    pub code: &'static str,
    pub type_url: &'static str,
}

impl ErrDef {
    #[inline]
    pub fn to_problem(&self, detail: impl Into<String>) -> Problem {
        Problem::new(
            StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            self.title,
            detail.into(),
        )
        .with_code(self.code)
        .with_type(self.type_url)
    }

    pub fn is_server_error(&self) -> bool {
        self.status >= 500
    }
}

pub const INVALID_SORT_DIRECTION: ErrDef = ErrDef {
    status: 400,
    title: "Invalid Sort Direction",
    code: "DATATABLE_INVALID_SORT_DIRECTION",
    type_url: "https://errors.example.com/DATATABLE_INVALID_SORT_DIRECTION",
};

pub const INVALID_CONFIGURATION: ErrDef = ErrDef {
    status: 500,
    title: "Invalid Table Configuration",
    code: "DATATABLE_INVALID_CONFIGURATION",
    type_url: "https://errors.example.com/DATATABLE_INVALID_CONFIGURATION",
};

pub const STORE_FAILURE: ErrDef = ErrDef {
    status: 500,
    title: "Data Store Failure",
    code: "DATATABLE_STORE_FAILURE",
    type_url: "https://errors.example.com/DATATABLE_STORE_FAILURE",
};

pub const HOOK_FAILURE: ErrDef = ErrDef {
    status: 500,
    title: "Table Hook Failure",
    code: "DATATABLE_HOOK_FAILURE",
    type_url: "https://errors.example.com/DATATABLE_HOOK_FAILURE",
};

pub fn err_def(e: &TableError) -> &'static ErrDef {
    match e {
        TableError::InvalidSortDirection(_) => &INVALID_SORT_DIRECTION,
        TableError::InvalidConfiguration(_) => &INVALID_CONFIGURATION,
        TableError::Store(_) => &STORE_FAILURE,
        TableError::Hook(_) => &HOOK_FAILURE,
    }
}

/// Map a responder error to a problem response for `instance`.
///
/// Client errors carry the error message; server errors are logged in full
/// and answered with the catalog title only.
pub fn table_error_to_problem(e: &TableError, instance: &str) -> ProblemResponse {
    let def = err_def(e);
    let detail = if def.is_server_error() {
        error!(error = ?e, code = def.code, instance, "table request failed");
        def.title.to_string()
    } else {
        warn!(error = %e, code = def.code, instance, "table request rejected");
        e.to_string()
    };
    def.to_problem(detail).with_instance(instance).into()
}
