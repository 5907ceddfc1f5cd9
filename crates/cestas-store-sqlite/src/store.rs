//! [`SqliteStore`] — the SQLite implementation of [`CadastroStore`].

use std::{path::PathBuf, time::Duration};

use cestas_core::{
  person::PersonListing,
  schema::{ColumnChange, ColumnSpec, LEGACY_COLUMNS},
  store::{CadastroStore, Connector},
};
use rusqlite::TransactionBehavior;
use tracing::{debug, error, info};

use crate::{
  Result,
  encode::RawListing,
  schema::{COLUMN_EXISTS, CONNECTION_PRAGMAS, LIST_PEOPLE, TABLE_DDL, add_column_sql},
};

// ─── Configuration ───────────────────────────────────────────────────────────

/// Where and how to open the registry database.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
  pub path:         PathBuf,
  /// How long a connection waits on a lock held by another connection
  /// before failing with `SQLITE_BUSY`.
  pub busy_timeout: Duration,
}

impl DatabaseConfig {
  pub fn new(path: impl Into<PathBuf>) -> Self {
    Self { path: path.into(), busy_timeout: Duration::from_secs(5) }
  }
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// One open connection to the registry database.
///
/// The connection closes when the store is dropped.
pub struct SqliteStore {
  pub(crate) conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) the database described by `config`. The schema is
  /// not touched; see [`CadastroStore::ensure_tables`].
  pub async fn open(config: &DatabaseConfig) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(&config.path).await?;
    let store = Self { conn };
    store.configure(config.busy_timeout).await?;
    Ok(store)
  }

  /// Open an in-memory database — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.configure(Duration::ZERO).await?;
    Ok(store)
  }

  async fn configure(&self, busy_timeout: Duration) -> Result<()> {
    self
      .conn
      .call(move |conn| {
        conn.busy_timeout(busy_timeout)?;
        conn.execute_batch(CONNECTION_PRAGMAS)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── CadastroStore impl ──────────────────────────────────────────────────────

impl CadastroStore for SqliteStore {
  type Error = crate::Error;

  // ── Schema ────────────────────────────────────────────────────────────────

  async fn ensure_tables(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        // Dropping the transaction without commit rolls it back.
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        for ddl in TABLE_DDL {
          tx.execute_batch(ddl)?;
        }
        tx.commit()?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn ensure_column(&self, spec: ColumnSpec) -> Result<ColumnChange> {
    let alter = add_column_sql(spec.table, spec.column, spec.type_decl)?;

    let outcome = self
      .conn
      .call(move |conn| {
        // Take the write lock before the check so concurrent callers wait on
        // the busy timeout instead of failing the upgrade with SQLITE_BUSY.
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let present: bool = tx.query_row(
          COLUMN_EXISTS,
          rusqlite::params![spec.table, spec.column],
          |row| row.get(0),
        )?;
        if present {
          return Ok(ColumnChange::AlreadyPresent);
        }
        tx.execute_batch(&alter)?;
        tx.commit()?;
        Ok(ColumnChange::Added)
      })
      .await;

    match &outcome {
      Ok(ColumnChange::Added) => {
        info!(table = spec.table, column = spec.column, "column added");
      }
      Ok(ColumnChange::AlreadyPresent) => {
        debug!(table = spec.table, column = spec.column, "column already present");
      }
      Err(e) => {
        error!(table = spec.table, column = spec.column, error = %e, "failed to add column");
      }
    }
    Ok(outcome?)
  }

  async fn ensure_legacy_columns(&self) -> Result<()> {
    let mut first_err = None;
    for spec in LEGACY_COLUMNS {
      if let Err(e) = self.ensure_column(spec).await {
        first_err.get_or_insert(e);
      }
    }
    first_err.map_or(Ok(()), Err)
  }

  // ── Reads ─────────────────────────────────────────────────────────────────

  async fn list_people(&self) -> Result<Vec<PersonListing>> {
    let raws: Vec<RawListing> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(LIST_PEOPLE)?;
        let rows = stmt
          .query_map([], RawListing::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawListing::into_listing).collect()
  }
}

// ─── Connector ───────────────────────────────────────────────────────────────

/// Opens a fresh [`SqliteStore`] for every request.
#[derive(Debug, Clone)]
pub struct SqliteConnector {
  config: DatabaseConfig,
}

impl SqliteConnector {
  pub fn new(config: DatabaseConfig) -> Self { Self { config } }

  pub fn config(&self) -> &DatabaseConfig { &self.config }
}

impl Connector for SqliteConnector {
  type Store = SqliteStore;

  async fn connect(&self) -> Result<SqliteStore> {
    SqliteStore::open(&self.config).await
  }
}
