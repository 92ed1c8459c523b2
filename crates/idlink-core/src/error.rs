//! Error types for `idlink-core`.

use thiserror::Error;

use crate::contact::ContactId;

#[derive(Debug, Error)]
pub enum Error {
  /// The submitted identifier pair is unusable (both fields empty).
  #[error("invalid identifier: {0}")]
  Validation(String),

  #[error("contact not found: {0}")]
  ContactNotFound(ContactId),

  /// Stored link state contradicts the cluster invariants. Never repaired
  /// automatically.
  #[error("invariant violation: {0}")]
  InvariantViolation(String),
}

impl Error {
  pub(crate) fn invariant(msg: impl Into<String>) -> Self {
    Self::InvariantViolation(msg.into())
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

// ─── Categories ──────────────────────────────────────────────────────────────

/// Coarse classification of a failure, used by outer layers to decide how to
/// report it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
  /// Caller supplied bad input; never retried.
  Validation,
  NotFound,
  /// Store unreachable or contended; the whole request may be replayed.
  Transient,
  /// Stored data violates an invariant.
  Corruption,
  Internal,
}

impl ErrorCategory {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Validation => "validation",
      Self::NotFound => "not_found",
      Self::Transient => "transient",
      Self::Corruption => "corruption",
      Self::Internal => "internal",
    }
  }
}

impl std::fmt::Display for ErrorCategory {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Implemented by every error type a [`crate::store::ContactStore`] can
/// return.
pub trait Categorize {
  fn category(&self) -> ErrorCategory;
}

impl Categorize for Error {
  fn category(&self) -> ErrorCategory {
    match self {
      Self::Validation(_) => ErrorCategory::Validation,
      Self::ContactNotFound(_) => ErrorCategory::NotFound,
      Self::InvariantViolation(_) => ErrorCategory::Corruption,
    }
  }
}
