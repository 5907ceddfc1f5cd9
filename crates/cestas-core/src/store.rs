//! The [`CadastroStore`] and [`Connector`] traits.
//!
//! Both are implemented by storage backends (e.g. `cestas-store-sqlite`).
//! The HTTP layer (`cestas-api`) depends on these abstractions, not on any
//! concrete backend.

use std::future::Future;

use crate::{
  person::PersonListing,
  schema::{ColumnChange, ColumnSpec},
};

// ─── Connection acquisition ──────────────────────────────────────────────────

/// Opens one [`CadastroStore`] per request.
///
/// The returned store owns its connection; dropping it releases the
/// connection, so every exit path of a handler closes it.
pub trait Connector: Send + Sync {
  type Store: CadastroStore;

  fn connect(
    &self,
  ) -> impl Future<Output = Result<Self::Store, <Self::Store as CadastroStore>::Error>>
  + Send
  + '_;
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// One open connection to the registry database.
///
/// Every schema operation is idempotent: once the target state is reached,
/// repeated calls are successful no-ops. The core never writes rows.
pub trait CadastroStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Schema ────────────────────────────────────────────────────────────

  /// Create the four registry tables if absent, in one transaction.
  ///
  /// On failure the whole transaction is rolled back and the error returned.
  fn ensure_tables(&self) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Add `spec.column` to `spec.table` if it is not there yet.
  ///
  /// Table and column names are identifier-quoted; `spec.type_decl` is
  /// trusted and spliced verbatim.
  fn ensure_column(
    &self,
    spec: ColumnSpec,
  ) -> impl Future<Output = Result<ColumnChange, Self::Error>> + Send + '_;

  /// Ensure every column in [`LEGACY_COLUMNS`](crate::schema::LEGACY_COLUMNS).
  ///
  /// Each column is attempted independently; a failure on one does not skip
  /// the others. The first failure is returned once all were attempted.
  fn ensure_legacy_columns(&self) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Reads ─────────────────────────────────────────────────────────────

  /// Every person left-joined with its responsible party. Order is
  /// unspecified.
  fn list_people(
    &self,
  ) -> impl Future<Output = Result<Vec<PersonListing>, Self::Error>> + Send + '_;
}
