//! Shared application state for all routes.

use crate::service::QueryService;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<QueryService>,
}

impl AppState {
    pub fn new(service: QueryService) -> Self {
        AppState {
            service: Arc::new(service),
        }
    }
}
