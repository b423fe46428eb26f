//! Typed errors and HTTP mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Startup failures while turning a schema definition into descriptors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("table '{table}' has no primary key and no 'id' column")]
    MissingPrimaryKey { table: String },
    #[error("table '{table}' has a composite primary key ({}), which is not supported", columns.join(", "))]
    CompositePrimaryKey { table: String, columns: Vec<String> },
    #[error("schema load: {0}")]
    Load(String),
}

impl SchemaError {
    /// Name of the rejected table, when the error concerns a single table.
    pub fn table(&self) -> Option<&str> {
        match self {
            SchemaError::MissingPrimaryKey { table } | SchemaError::CompositePrimaryKey { table, .. } => {
                Some(table)
            }
            SchemaError::Load(_) => None,
        }
    }
}

/// Failures reported by a store collaborator. Propagated unchanged to the caller.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("database: {0}")]
    Db(#[from] sqlx::Error),
    #[error("document: {0}")]
    Document(String),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("not found: {0}")]
    NotFound(String),
}

#[derive(Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            AppError::Store(_) => (StatusCode::INTERNAL_SERVER_ERROR, "store_error"),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
        };
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message: self.to_string(),
            },
        };
        (status, Json(body)).into_response()
    }
}
