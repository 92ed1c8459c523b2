//! SQLite backend for the idlink contact store.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. Each identification request runs the
//! whole engine inside one `BEGIN IMMEDIATE` transaction.

mod encode;
mod retry;
mod schema;
mod store;
mod uow;

pub mod error;

pub use error::{Error, Result};
pub use retry::RetryPolicy;
pub use store::{SqliteStore, StoreOptions};
