//! API error type and [`axum::response::IntoResponse`] implementation.
//!
//! Only connection failures surface as errors. Schema and query failures are
//! absorbed by the handlers and never reach the client as a non-200 status.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("database connection failed: {0}")]
  Connection(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::Connection(_) => (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()),
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}
