//! Storage abstractions: the per-transaction [`UnitOfWork`] the engine runs
//! against, and the async [`ContactStore`] that outer layers call.
//!
//! Backends (e.g. `idlink-store-sqlite`) implement both. The HTTP layer
//! depends only on [`ContactStore`].

use std::future::Future;

use crate::{
  Categorize,
  contact::{Contact, ContactId, Identifier, NewContact, Precedence},
  view::ConsolidatedView,
};

// ─── Unit of work ────────────────────────────────────────────────────────────

/// Synchronous access to the contact table inside one atomic transaction.
///
/// Everything the engine reads and writes for a single request goes through
/// one value of this type; the backend commits only if the engine returns
/// `Ok`. No method may return tombstoned records.
pub trait UnitOfWork {
  type Error: From<crate::Error>;

  /// Every live record whose email equals `email` or whose phone equals
  /// `phone`. A `None` argument places no constraint on that field.
  fn find_by_email_or_phone(
    &mut self,
    email: Option<&str>,
    phone: Option<&str>,
  ) -> Result<Vec<Contact>, Self::Error>;

  /// Every live record whose `id` or `linked_id` is in `primary_ids`.
  fn load_clusters(
    &mut self,
    primary_ids: &[ContactId],
  ) -> Result<Vec<Contact>, Self::Error>;

  /// A single live record by id.
  fn get(&mut self, id: ContactId) -> Result<Option<Contact>, Self::Error>;

  /// Persist a new record; the store assigns `id`, `created_at` and
  /// `updated_at`.
  fn insert(&mut self, input: NewContact) -> Result<Contact, Self::Error>;

  /// Rewrite the link state of an existing record and bump its
  /// `updated_at`. Fails with [`crate::Error::ContactNotFound`] if the record
  /// does not exist.
  fn update_precedence_and_link(
    &mut self,
    id: ContactId,
    precedence: Precedence,
    linked_id: Option<ContactId>,
  ) -> Result<(), Self::Error>;
}

// ─── Contact store ───────────────────────────────────────────────────────────

/// Abstraction over an idlink store backend.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait ContactStore: Send + Sync {
  type Error: std::error::Error + Categorize + Send + Sync + 'static;

  /// Resolve `identifier` against the stored clusters, apply any merge or
  /// insertion it implies, and return the consolidated view. Atomic: a failed
  /// call leaves no writes behind.
  fn identify(
    &self,
    identifier: Identifier,
  ) -> impl Future<Output = Result<ConsolidatedView, Self::Error>> + Send + '_;

  /// Retrieve a live record by id. Returns `None` if absent or tombstoned.
  fn get_contact(
    &self,
    id: ContactId,
  ) -> impl Future<Output = Result<Option<Contact>, Self::Error>> + Send + '_;

  /// All live records, ascending by id.
  fn list_contacts(
    &self,
  ) -> impl Future<Output = Result<Vec<Contact>, Self::Error>> + Send + '_;

  /// Read-only consolidated view of the cluster containing record `id`.
  fn consolidated_view(
    &self,
    id: ContactId,
  ) -> impl Future<Output = Result<Option<ConsolidatedView>, Self::Error>>
  + Send
  + '_;

  /// Round-trip to the backend; used by health checks.
  fn health(&self) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}
