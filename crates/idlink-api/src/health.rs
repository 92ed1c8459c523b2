//! Handler for `GET /health`.

use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode};
use idlink_core::store::ContactStore;
use serde_json::{Value, json};

/// `GET /health`: 200 `{"status":"healthy"}` if the store answers,
/// 503 otherwise.
pub async fn handler<S>(State(store): State<Arc<S>>) -> (StatusCode, Json<Value>)
where
  S: ContactStore,
{
  match store.health().await {
    Ok(()) => (StatusCode::OK, Json(json!({ "status": "healthy" }))),
    Err(e) => {
      tracing::warn!(error = %e, "health check failed");
      (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(json!({ "status": "unhealthy", "error": e.to_string() })),
      )
    }
  }
}
