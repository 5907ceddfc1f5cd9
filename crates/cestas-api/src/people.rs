//! Handlers for the liveness and person-listing endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/` | Plain-text liveness string |
//! | `GET`  | `/listar-pessoas` | JSON array of [`PersonListing`] |
//! | `GET`  | `/api/listar-pessoas` | Newline-joined text, one line per person |
//!
//! Both listings answer 200 even when the query fails: the JSON variant then
//! returns `[]` and the text variant [`QUERY_FAILED_TEXT`]. The
//! [`LISTING_STATUS_HEADER`] header tells the two cases apart.

use axum::{
  Json,
  extract::State,
  response::{IntoResponse, Response},
};
use cestas_core::{
  person::{PersonListing, render_text},
  store::{CadastroStore, Connector},
};
use tracing::{debug, error, info};

use crate::{AppState, error::ApiError};

pub const LIVENESS_TEXT: &str = "Servidor está rodando!";

/// Body of the text listing when the query fails.
pub const QUERY_FAILED_TEXT: &str = "Erro ao listar pessoas.";

/// `ok` when the listing query succeeded, `erro` when it failed and the body
/// is the degraded fallback.
pub const LISTING_STATUS_HEADER: &str = "x-listagem-status";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListingStatus {
  Ok,
  Failed,
}

impl ListingStatus {
  fn header(self) -> [(&'static str, &'static str); 1] {
    let value = match self {
      ListingStatus::Ok     => "ok",
      ListingStatus::Failed => "erro",
    };
    [(LISTING_STATUS_HEADER, value)]
  }
}

// ─── Shared request sequence ─────────────────────────────────────────────────

/// Open a connection and make sure the schema is in place.
///
/// A connection failure is fatal for the request. Schema failures are logged
/// by the guard and the read proceeds anyway.
async fn open_ready<C>(state: &AppState<C>) -> Result<C::Store, ApiError>
where
  C: Connector,
{
  let store = state.connector.connect().await.map_err(|e| {
    error!(error = %e, "failed to connect to database");
    ApiError::Connection(Box::new(e))
  })?;
  state.schema.ensure(&store).await;
  Ok(store)
}

/// Run the listing query, degrading to an empty result on failure.
async fn fetch_people<S: CadastroStore>(store: &S) -> (ListingStatus, Vec<PersonListing>) {
  match store.list_people().await {
    Ok(people) => {
      debug!(
        total = people.len(),
        without_responsible = people.iter().filter(|p| !p.has_responsible()).count(),
        "listed people"
      );
      (ListingStatus::Ok, people)
    }
    Err(e) => {
      error!(error = %e, "failed to list people");
      (ListingStatus::Failed, Vec::new())
    }
  }
}

// ─── Liveness ────────────────────────────────────────────────────────────────

/// `GET /`
pub async fn liveness() -> &'static str { LIVENESS_TEXT }

// ─── Listings ────────────────────────────────────────────────────────────────

/// `GET /listar-pessoas` — structured variant.
pub async fn list_json<C>(State(state): State<AppState<C>>) -> Result<Response, ApiError>
where
  C: Connector,
{
  info!("GET /listar-pessoas");
  let store = open_ready(&state).await?;
  let (status, people) = fetch_people(&store).await;
  Ok((status.header(), Json(people)).into_response())
}

/// `GET /api/listar-pessoas` — text variant.
pub async fn list_text<C>(State(state): State<AppState<C>>) -> Result<Response, ApiError>
where
  C: Connector,
{
  info!("GET /api/listar-pessoas");
  let store = open_ready(&state).await?;
  let (status, people) = fetch_people(&store).await;
  let body = match status {
    ListingStatus::Ok     => render_text(&people),
    ListingStatus::Failed => QUERY_FAILED_TEXT.to_owned(),
  };
  Ok((status.header(), body).into_response())
}
