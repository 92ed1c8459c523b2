//! JSON REST API for idlink.
//!
//! Exposes an axum [`Router`] backed by any
//! [`idlink_core::store::ContactStore`]. Auth, TLS, and transport concerns are
//! the caller's responsibility.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/identify` | Body: [`identify::IdentifyBody`] |
//! | `GET`  | `/health` | Store round-trip |
//! | `GET`  | `/contacts` | Raw records |
//! | `GET`  | `/contacts/:id` | One raw record |
//! | `GET`  | `/contacts/:id/consolidated` | Cluster view |

pub mod contacts;
pub mod error;
pub mod health;
pub mod identify;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use idlink_core::store::ContactStore;

pub use error::ApiError;

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: ContactStore + 'static,
{
  Router::new()
    .route("/identify", post(identify::handler::<S>))
    .route("/health", get(health::handler::<S>))
    .route("/contacts", get(contacts::list::<S>))
    .route("/contacts/{id}", get(contacts::get_one::<S>))
    .route("/contacts/{id}/consolidated", get(contacts::consolidated::<S>))
    .with_state(store)
}
