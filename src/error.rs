//! Error taxonomy shared by the image store, the item repositories, and
//! the HTTP layer.
//!
//! Every failure a request can hit is one of three kinds: the request was
//! malformed ([`CatalogError::InvalidRequest`] / [`CatalogError::Read`]),
//! the item does not exist ([`CatalogError::NotFound`]), or the backing
//! store failed (everything else). [`CatalogError::status`] is the single
//! place that decides which HTTP status each kind maps to.

use axum::http::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    /// Missing or malformed input (no uploaded file, bad image suffix, ...).
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("not found: {0}")]
    NotFound(String),

    /// The relational backend failed.
    #[error("persistence failure: {0}")]
    Persistence(#[from] sqlx::Error),

    /// The JSON document could not be parsed or serialized.
    #[error("malformed item document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("io failure: {0}")]
    Io(#[from] std::io::Error),

    /// The uploaded body could not be fully consumed.
    #[error("failed to read upload: {0}")]
    Read(String),
}

pub type Result<T> = std::result::Result<T, CatalogError>;

impl CatalogError {
    pub fn invalid(message: impl Into<String>) -> Self {
        CatalogError::InvalidRequest(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        CatalogError::NotFound(message.into())
    }

    /// HTTP status this error is reported with.
    pub fn status(&self) -> StatusCode {
        match self {
            CatalogError::InvalidRequest(_) | CatalogError::Read(_) => StatusCode::BAD_REQUEST,
            CatalogError::NotFound(_) => StatusCode::NOT_FOUND,
            CatalogError::Persistence(_) | CatalogError::Json(_) | CatalogError::Io(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Whether the failure is on the server side rather than the caller's.
    pub fn is_internal(&self) -> bool {
        self.status().is_server_error()
    }
}
