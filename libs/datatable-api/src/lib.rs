//! axum glue for datatable responders: a query-string extractor, a JSON
//! response wrapper, and RFC 9457 problems for [`datatable_core::TableError`].
//!
//! ```rust,ignore
//! async fn list_users(
//!     State(state): State<AppState>,
//!     uri: Uri,
//!     params: TableParams,
//! ) -> TableResult<UserDto> {
//!     TableResponder::for_model(state.users.clone())
//!         .per_page(25)
//!         .build()
//!         .map_err(|e| table_error_to_problem(&e, uri.path()))?
//!         .respond(&params)
//!         .await
//!         .map(|r| TableJson(r.map_data(UserDto::from)))
//!         .map_err(|e| table_error_to_problem(&e, uri.path()))
//! }
//! ```

pub mod errors;
pub mod params;
pub mod problem;
pub mod response;

pub use errors::{err_def, table_error_to_problem, ErrDef};
pub use params::TableParams;
pub use problem::{Problem, ProblemResponse, APPLICATION_PROBLEM_JSON};
pub use response::{TableJson, TableResult};
