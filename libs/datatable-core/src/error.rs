use thiserror::Error;

/// Failures raised while configuring or running a table responder.
///
/// Backing-store and hook failures keep the original error inside an
/// [`anyhow::Error`], so callers can still `downcast_ref` to the concrete type.
#[derive(Debug, Error)]
pub enum TableError {
    /// The data source or responder settings cannot be used.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// The client asked for a direction other than `asc` / `desc`.
    #[error("order by direction must be either asc or desc, got `{0}`")]
    InvalidSortDirection(String),

    /// The backing store failed (connectivity, query execution, unknown column).
    #[error(transparent)]
    Store(anyhow::Error),

    /// A caller-supplied hook, order handler or meta provider failed.
    #[error(transparent)]
    Hook(anyhow::Error),
}

impl TableError {
    pub fn invalid_configuration(msg: impl Into<String>) -> Self {
        TableError::InvalidConfiguration(msg.into())
    }

    pub fn store<E>(e: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        TableError::Store(anyhow::Error::new(e))
    }

    /// True when the request itself was at fault, not the server.
    pub fn is_client_error(&self) -> bool {
        matches!(self, TableError::InvalidSortDirection(_))
    }
}

pub type TableResult<T> = Result<T, TableError>;
