//! Handlers for `/contacts` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/contacts` | Every live record, ascending by id |
//! | `GET`  | `/contacts/:id` | 404 if absent or tombstoned |
//! | `GET`  | `/contacts/:id/consolidated` | View of the record's cluster |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State, rejection::PathRejection},
};
use idlink_core::{
  contact::{Contact, ContactId},
  store::ContactStore,
  view::ConsolidatedView,
};

use crate::error::ApiError;

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /contacts`
pub async fn list<S>(State(store): State<Arc<S>>) -> Result<Json<Vec<Contact>>, ApiError>
where
  S: ContactStore,
{
  let contacts = store.list_contacts().await.map_err(ApiError::store)?;
  Ok(Json(contacts))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /contacts/:id`
pub async fn get_one<S>(
  State(store): State<Arc<S>>,
  id: Result<Path<ContactId>, PathRejection>,
) -> Result<Json<Contact>, ApiError>
where
  S: ContactStore,
{
  let Path(id) = id?;
  let contact = store
    .get_contact(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("contact {id} not found")))?;
  Ok(Json(contact))
}

// ─── Consolidated ─────────────────────────────────────────────────────────────

/// `GET /contacts/:id/consolidated`
pub async fn consolidated<S>(
  State(store): State<Arc<S>>,
  id: Result<Path<ContactId>, PathRejection>,
) -> Result<Json<ConsolidatedView>, ApiError>
where
  S: ContactStore,
{
  let Path(id) = id?;
  let view = store
    .consolidated_view(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("contact {id} not found")))?;
  Ok(Json(view))
}
