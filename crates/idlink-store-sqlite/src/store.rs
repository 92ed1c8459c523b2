//! [`SqliteStore`]: the SQLite implementation of [`ContactStore`].

use std::{future::Future, path::Path, time::Duration};

use idlink_core::{
  contact::{Contact, ContactId, Identifier},
  engine::{self, Consolidation},
  store::{ContactStore, UnitOfWork as _},
  view::ConsolidatedView,
};
use rusqlite::TransactionBehavior;
use tracing::{debug, warn};

use crate::{Error, Result, RetryPolicy, schema::SCHEMA, uow::SqliteUow};

// ─── Options ─────────────────────────────────────────────────────────────────

/// Connection tuning for [`SqliteStore::open_with`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreOptions {
  /// How long SQLite itself waits on a locked database before reporting
  /// `SQLITE_BUSY`.
  pub busy_timeout: Duration,
  pub retry:        RetryPolicy,
}

impl Default for StoreOptions {
  fn default() -> Self {
    Self { busy_timeout: Duration::from_secs(5), retry: RetryPolicy::default() }
  }
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// An idlink contact store backed by a single SQLite file.
///
/// Cloning shares the inner connection. Every
/// request on one handle is serialised through the connection thread;
/// separate handles (or processes) on the same file are serialised by the
/// `BEGIN IMMEDIATE` write lock.
#[derive(Clone)]
pub struct SqliteStore {
  pub(crate) conn: tokio_rusqlite::Connection,
  retry:           RetryPolicy,
}

impl SqliteStore {
  /// Open (or create) a store at `path` with default options.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    Self::open_with(path, StoreOptions::default()).await
  }

  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open_with(path: impl AsRef<Path>, options: StoreOptions) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn, retry: options.retry };
    store.init(options.busy_timeout).await?;
    Ok(store)
  }

  /// Open an in-memory store, mainly for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let options = StoreOptions::default();
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn, retry: options.retry };
    store.init(options.busy_timeout).await?;
    Ok(store)
  }

  async fn init(&self, busy_timeout: Duration) -> Result<()> {
    self
      .conn
      .call(move |conn| {
        conn.busy_timeout(busy_timeout)?;
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Run `op` until it succeeds, fails for a reason other than contention,
  /// or exhausts the retry policy.
  async fn with_retry<T, F, Fut>(&self, what: &'static str, mut op: F) -> Result<T>
  where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
  {
    let mut attempt = 1;
    loop {
      match op().await {
        Err(e) if e.is_contention() => {
          if attempt >= self.retry.max_attempts {
            warn!(what, attempts = attempt, "giving up on contended store");
            return Err(Error::ConflictRetryExhausted { attempts: attempt });
          }
          let delay = self.retry.delay(attempt);
          warn!(what, attempt, ?delay, error = %e, "store contended; retrying");
          tokio::time::sleep(delay).await;
          attempt += 1;
        }
        other => return other,
      }
    }
  }

  /// One attempt at [`ContactStore::identify`]: the whole pipeline inside
  /// a single immediate transaction, committed only on success.
  async fn identify_once(&self, identifier: Identifier) -> Result<Consolidation> {
    let outcome = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let result = engine::reconcile(&mut SqliteUow::new(&tx), &identifier);
        if result.is_ok() {
          tx.commit()?;
        }
        // On error `tx` is dropped here and rolls back.
        Ok(result)
      })
      .await;
    flatten(outcome)
  }

  /// Read-only work inside a deferred transaction, so every read sees one
  /// snapshot.
  async fn read<T, F>(&self, f: F) -> Result<T>
  where
    T: Send + 'static,
    F: FnOnce(&mut SqliteUow<'_>) -> Result<T> + Send + 'static,
  {
    let outcome = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let result = f(&mut SqliteUow::new(&tx));
        Ok(result)
      })
      .await;
    flatten(outcome)
  }
}

fn flatten<T>(outcome: std::result::Result<Result<T>, tokio_rusqlite::Error>) -> Result<T> {
  outcome.map_err(Error::from).and_then(|inner| inner)
}

// ─── ContactStore impl ───────────────────────────────────────────────────────

impl ContactStore for SqliteStore {
  type Error = Error;

  async fn identify(&self, identifier: Identifier) -> Result<ConsolidatedView> {
    let consolidation = self
      .with_retry("identify", move || self.identify_once(identifier.clone()))
      .await?;

    debug!(
      primary = consolidation.view.primary_contact_id,
      created = ?consolidation.created,
      relinked = ?consolidation.relinked,
      "identify committed"
    );
    Ok(consolidation.view)
  }

  async fn get_contact(&self, id: ContactId) -> Result<Option<Contact>> {
    self
      .with_retry("get_contact", || self.read(move |uow| uow.get(id)))
      .await
  }

  async fn list_contacts(&self) -> Result<Vec<Contact>> {
    self
      .with_retry("list_contacts", || self.read(|uow| uow.all()))
      .await
  }

  async fn consolidated_view(&self, id: ContactId) -> Result<Option<ConsolidatedView>> {
    self
      .with_retry("consolidated_view", || {
        self.read(move |uow| engine::view_of(uow, id))
      })
      .await
  }

  async fn health(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.query_row("SELECT 1", [], |_| Ok(()))?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}
