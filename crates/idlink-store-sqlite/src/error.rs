//! Error type for `idlink-store-sqlite`.

use idlink_core::{Categorize, ErrorCategory};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] idlink_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("sqlite error: {0}")]
  Sqlite(#[from] rusqlite::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// A stored column held a value no domain type accepts.
  #[error("decode error: {0}")]
  Decode(String),

  #[error("store contention did not clear after {attempts} attempts")]
  ConflictRetryExhausted { attempts: u32 },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl Error {
  fn sqlite_error(&self) -> Option<&rusqlite::Error> {
    match self {
      Error::Sqlite(e) | Error::Database(tokio_rusqlite::Error::Rusqlite(e)) => Some(e),
      _ => None,
    }
  }

  /// Lock contention that a replay of the whole request may clear.
  pub fn is_contention(&self) -> bool {
    matches!(
      self.sqlite_error().and_then(rusqlite::Error::sqlite_error_code),
      Some(rusqlite::ErrorCode::DatabaseBusy | rusqlite::ErrorCode::DatabaseLocked)
    )
  }

  fn is_unavailable(&self) -> bool {
    if matches!(self, Error::Database(tokio_rusqlite::Error::ConnectionClosed)) {
      return true;
    }
    matches!(
      self.sqlite_error().and_then(rusqlite::Error::sqlite_error_code),
      Some(rusqlite::ErrorCode::CannotOpen | rusqlite::ErrorCode::SystemIoFailure)
    )
  }
}

impl Categorize for Error {
  fn category(&self) -> ErrorCategory {
    match self {
      Error::Core(e) => e.category(),
      Error::ConflictRetryExhausted { .. } => ErrorCategory::Transient,
      Error::DateParse(_) | Error::Decode(_) => ErrorCategory::Corruption,
      e if e.is_contention() || e.is_unavailable() => ErrorCategory::Transient,
      _ => ErrorCategory::Internal,
    }
  }
}
