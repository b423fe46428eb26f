//! Router assembly.

pub mod common;
pub mod resource;

pub use common::common_routes;
pub use resource::resource_routes;

use crate::state::AppState;
use axum::Router;

/// Common routes take precedence over a resource named `health`, `ready` or `version`.
pub fn router(state: AppState) -> Router {
    common_routes(state.clone()).merge(resource_routes(state))
}
