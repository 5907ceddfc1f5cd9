//! Configuration and startup helpers for the `cestas-server` binary.

use std::{
  path::{Path, PathBuf},
  time::Duration,
};

use cestas_core::store::{CadastroStore, Connector};
use cestas_store_sqlite::DatabaseConfig;
use serde::Deserialize;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `CESTAS_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  pub host:                        String,
  pub port:                        u16,
  pub database_path:               PathBuf,
  pub busy_timeout_ms:             u64,
  pub ensure_schema_every_request: bool,
}

impl ServerConfig {
  /// Layer the optional file at `path` and the environment over the defaults.
  pub fn load(path: &Path) -> Result<Self, config::ConfigError> {
    Self::builder()?
      .add_source(config::File::from(path).required(false))
      .add_source(config::Environment::with_prefix("CESTAS"))
      .build()?
      .try_deserialize()
  }

  fn builder() -> Result<config::ConfigBuilder<config::builder::DefaultState>, config::ConfigError> {
    config::Config::builder()
      .set_default("host", "0.0.0.0")?
      .set_default("port", 5000)?
      .set_default("database_path", "cestas.db")?
      .set_default("busy_timeout_ms", 5000)?
      .set_default("ensure_schema_every_request", false)
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }

  pub fn database(&self) -> DatabaseConfig {
    DatabaseConfig {
      path:         expand_tilde(&self.database_path),
      busy_timeout: Duration::from_millis(self.busy_timeout_ms),
    }
  }
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

// ─── Startup migration ────────────────────────────────────────────────────────

/// Run the idempotent schema steps once on a dedicated connection.
///
/// Both steps are attempted; the first error is returned.
pub async fn migrate<C: Connector>(
  connector: &C,
) -> Result<(), <C::Store as CadastroStore>::Error> {
  let store = connector.connect().await?;
  let tables = store.ensure_tables().await;
  let columns = store.ensure_legacy_columns().await;
  tables.and(columns)
}
