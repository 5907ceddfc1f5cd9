//! Error types for `cestas-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("invalid identifier {0:?}: identifiers must be non-empty and free of NUL bytes")]
  InvalidIdentifier(String),

  #[error("unparseable timestamp {0:?}")]
  Timestamp(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
