//! Process-wide "schema ready" flag in front of the idempotent schema steps.
//!
//! Until one run of `ensure_tables` + `ensure_legacy_columns` has succeeded,
//! every request retries both. Afterwards requests skip the DDL entirely,
//! unless the guard was built with `every_request`.

use std::sync::atomic::{AtomicBool, Ordering};

use cestas_core::store::CadastroStore;
use tracing::{debug, error};

#[derive(Debug)]
pub struct SchemaGuard {
  ready:         AtomicBool,
  every_request: bool,
}

impl SchemaGuard {
  /// `every_request = true` reruns the schema steps on each call even after
  /// they have succeeded.
  pub fn new(every_request: bool) -> Self {
    Self { ready: AtomicBool::new(false), every_request }
  }

  pub fn is_ready(&self) -> bool { self.ready.load(Ordering::Acquire) }

  /// Record that the schema was ensured elsewhere, e.g. by a startup
  /// migration.
  pub fn mark_ready(&self) { self.ready.store(true, Ordering::Release); }

  /// Run the schema steps on `store` if needed.
  ///
  /// Failures are logged and swallowed; the caller proceeds to the read
  /// regardless. Returns whether the schema is known to be in place.
  pub async fn ensure<S: CadastroStore>(&self, store: &S) -> bool {
    if !self.every_request && self.is_ready() {
      debug!("schema already ensured");
      return true;
    }

    let tables = store
      .ensure_tables()
      .await
      .inspect_err(|e| error!(error = %e, "failed to ensure tables"))
      .is_ok();
    // Attempted even when the tables step failed.
    let columns = store
      .ensure_legacy_columns()
      .await
      .inspect_err(|e| error!(error = %e, "failed to ensure legacy columns"))
      .is_ok();

    let ok = tables && columns;
    if ok {
      self.mark_ready();
    }
    ok
  }
}
