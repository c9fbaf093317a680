use std::collections::HashMap;

use axum::extract::{FromRequestParts, Query};
use axum::http::request::Parts;
use datatable_core::RequestParams;

use crate::problem::{bad_request, ProblemResponse};

/// The raw query string of a table request.
///
/// Values are kept as strings; the responder validates `orderByDirection`
/// and `page` itself.
#[derive(Debug, Clone, Default)]
pub struct TableParams(pub HashMap<String, String>);

impl TableParams {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }
}

impl RequestParams for TableParams {
    fn get(&self, key: &str) -> Option<&str> {
        TableParams::get(self, key)
    }
}

impl<S> FromRequestParts<S> for TableParams
where
    S: Send + Sync,
{
    type Rejection = ProblemResponse;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(params) = Query::<HashMap<String, String>>::from_request_parts(parts, state)
            .await
            .map_err(|e| {
                ProblemResponse::from(bad_request(e.body_text()).0.with_instance(parts.uri.path()))
            })?;
        Ok(Self(params))
    }
}
