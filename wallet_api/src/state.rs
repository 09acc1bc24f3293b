use std::sync::Arc;

use common::Store;

/// Shared handles for request handlers and the accrual scheduler.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<dyn Store>,
}

impl AppState {
    pub fn new(db: Arc<dyn Store>) -> Self {
        AppState { db }
    }
}
