//! Server wiring for idlink: configuration and the top-level router.

use std::{
  path::{Path, PathBuf},
  sync::Arc,
  time::Duration,
};

use axum::Router;
use idlink_core::store::ContactStore;
use idlink_store_sqlite::{RetryPolicy, StoreOptions};
use serde::Deserialize;
use tower_http::trace::TraceLayer;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `IDLINK_*` environment variables (nested keys use `__`, e.g.
/// `IDLINK_RETRY__MAX_ATTEMPTS`).
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct ServerConfig {
  pub host:            String,
  pub port:            u16,
  pub store_path:      PathBuf,
  pub busy_timeout_ms: u64,
  pub retry:           RetryPolicy,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:            "0.0.0.0".to_string(),
      port:            8080,
      store_path:      PathBuf::from("idlink.sqlite3"),
      busy_timeout_ms: 5_000,
      retry:           RetryPolicy::default(),
    }
  }
}

impl ServerConfig {
  /// Layer the (optional) TOML file at `path` under the environment.
  pub fn load(path: &Path) -> Result<Self, config::ConfigError> {
    config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(
        config::Environment::with_prefix("IDLINK")
          .prefix_separator("_")
          .separator("__")
          .try_parsing(true),
      )
      .build()?
      .try_deserialize()
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }

  pub fn store_options(&self) -> StoreOptions {
    StoreOptions {
      busy_timeout: Duration::from_millis(self.busy_timeout_ms),
      retry:        self.retry,
    }
  }

  /// `store_path` with a leading `~` expanded to the user's home directory.
  pub fn resolved_store_path(&self) -> PathBuf {
    let s = self.store_path.to_string_lossy();
    if let Some(rest) = s.strip_prefix("~/")
      && let Ok(home) = std::env::var("HOME")
    {
      return PathBuf::from(home).join(rest);
    }
    self.store_path.clone()
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// The API router wrapped in request tracing.
pub fn router<S>(store: Arc<S>) -> Router
where
  S: ContactStore + 'static,
{
  idlink_api::api_router(store).layer(TraceLayer::new_for_http())
}
