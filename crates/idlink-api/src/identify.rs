//! Handler for `POST /identify`.

use std::sync::Arc;

use axum::{
  Json,
  extract::{State, rejection::JsonRejection},
};
use idlink_core::{contact::Identifier, store::ContactStore, view::ConsolidatedView};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// JSON body accepted by `POST /identify`. Either field may be omitted,
/// `null` or empty, but not both.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentifyBody {
  #[serde(default)]
  pub email:        Option<String>,
  #[serde(default)]
  pub phone_number: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct IdentifyResponse {
  pub contact: ConsolidatedView,
}

/// `POST /identify`, body: `{"email":"...","phoneNumber":"..."}`
pub async fn handler<S>(
  State(store): State<Arc<S>>,
  body: Result<Json<IdentifyBody>, JsonRejection>,
) -> Result<Json<IdentifyResponse>, ApiError>
where
  S: ContactStore,
{
  let Json(body) = body?;
  let identifier = Identifier::new(body.email, body.phone_number)?;
  tracing::debug!(%identifier, "identify request");

  let view = store.identify(identifier).await.map_err(ApiError::store)?;

  tracing::info!(
    primary = view.primary_contact_id,
    secondaries = view.secondary_contact_ids.len(),
    "identified"
  );
  Ok(Json(IdentifyResponse { contact: view }))
}
