//! Resource routes. Handlers resolve the table from the path segment against the catalog.

use crate::handlers::{list, read};
use crate::state::AppState;
use axum::{routing::get, Router};

pub fn resource_routes(state: AppState) -> Router {
    Router::new()
        .route("/:resource", get(list))
        .route("/:resource/:id", get(read))
        .with_state(state)
}
