//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  extract::rejection::{JsonRejection, PathRejection},
  http::StatusCode,
  response::{IntoResponse, Response},
};
use idlink_core::{Categorize, ErrorCategory};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("store error: {source}")]
  Store {
    category: ErrorCategory,
    #[source]
    source:   Box<dyn std::error::Error + Send + Sync>,
  },
}

impl ApiError {
  /// Wrap a store error, keeping its category for the status mapping.
  pub fn store<E>(e: E) -> Self
  where
    E: std::error::Error + Categorize + Send + Sync + 'static,
  {
    ApiError::Store { category: e.category(), source: Box::new(e) }
  }

  pub fn status(&self) -> StatusCode {
    match self {
      ApiError::NotFound(_) => StatusCode::NOT_FOUND,
      ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
      ApiError::Store { category, .. } => match category {
        ErrorCategory::Validation => StatusCode::BAD_REQUEST,
        ErrorCategory::NotFound => StatusCode::NOT_FOUND,
        ErrorCategory::Transient => StatusCode::SERVICE_UNAVAILABLE,
        ErrorCategory::Corruption | ErrorCategory::Internal => {
          StatusCode::INTERNAL_SERVER_ERROR
        }
      },
    }
  }
}

impl From<idlink_core::Error> for ApiError {
  fn from(e: idlink_core::Error) -> Self {
    match e {
      idlink_core::Error::Validation(m) => ApiError::BadRequest(m),
      other => ApiError::store(other),
    }
  }
}

// Extractor rejections share the `{"error": ...}` body and always map to 400,
// whatever status axum would pick on its own.

impl From<JsonRejection> for ApiError {
  fn from(rejection: JsonRejection) -> Self { ApiError::BadRequest(rejection.body_text()) }
}

impl From<PathRejection> for ApiError {
  fn from(rejection: PathRejection) -> Self { ApiError::BadRequest(rejection.body_text()) }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = self.status();
    if status.is_server_error() {
      tracing::error!(error = %self, "request failed");
    }
    let message = match &self {
      ApiError::NotFound(m) | ApiError::BadRequest(m) => m.clone(),
      ApiError::Store { source, .. } => source.to_string(),
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}
