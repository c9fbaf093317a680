use std::sync::Arc;

use datatable_core::ModelRegistry;
use runtime::AppConfig;

use crate::users::UserQuery;

/// Shared by every handler; cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub tables: Arc<ModelRegistry<UserQuery>>,
}
