//! Resource handlers: list and single-row read.

use crate::error::AppError;
use crate::query::RawParams;
use crate::response::ListResponse;
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::Uri,
    response::IntoResponse,
    Json,
};

pub async fn list(
    State(state): State<AppState>,
    Path(resource): Path<String>,
    Query(pairs): Query<Vec<(String, String)>>,
    uri: Uri,
) -> Result<impl IntoResponse, AppError> {
    let params = RawParams::from_pairs(pairs);
    let result = state.service.list(&resource, &params).await?;
    Ok(ListResponse::new(result, uri.path(), uri.query()))
}

pub async fn read(
    State(state): State<AppState>,
    Path((resource, id)): Path<(String, String)>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<impl IntoResponse, AppError> {
    let params = RawParams::from_pairs(pairs);
    let row = state.service.read(&resource, &id, &params).await?;
    Ok(Json(row))
}
