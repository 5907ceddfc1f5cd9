//! HTTP surface for the Cestas registry.
//!
//! Exposes an axum [`Router`] backed by any [`Connector`]. Each request opens
//! its own connection through the connector and drops it before returning.
//!
//! # Mounting
//!
//! ```rust,ignore
//! let state = AppState::new(SqliteConnector::new(db_config), false);
//! axum::serve(listener, cestas_api::router(state)).await?;
//! ```

pub mod error;
pub mod people;
pub mod schema_guard;

use std::sync::Arc;

use axum::{Router, routing::get};
use cestas_core::store::Connector;
use tower_http::trace::TraceLayer;

pub use error::ApiError;
pub use schema_guard::SchemaGuard;

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
#[derive(Clone)]
pub struct AppState<C: Connector> {
  pub connector: Arc<C>,
  pub schema:    Arc<SchemaGuard>,
}

impl<C: Connector> AppState<C> {
  /// `ensure_schema_every_request` reruns the table and column DDL on every
  /// request instead of only until it first succeeds.
  pub fn new(connector: C, ensure_schema_every_request: bool) -> Self {
    Self {
      connector: Arc::new(connector),
      schema:    Arc::new(SchemaGuard::new(ensure_schema_every_request)),
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the router serving both listing entry points and the liveness probe.
pub fn router<C>(state: AppState<C>) -> Router
where
  C: Connector + Clone + 'static,
{
  Router::new()
    .route("/", get(people::liveness))
    // Web-server entry point: structured records.
    .route("/listar-pessoas", get(people::list_json::<C>))
    // Function-style entry point: formatted text.
    .route("/api/listar-pessoas", get(people::list_text::<C>))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

// ─── Integration tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use std::path::{Path, PathBuf};

  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
    response::Response,
  };
  use cestas_store_sqlite::{DatabaseConfig, SqliteConnector};
  use serde_json::Value;
  use tempfile::TempDir;
  use tower::ServiceExt as _;

  use super::*;
  use crate::people::{LISTING_STATUS_HEADER, LIVENESS_TEXT, QUERY_FAILED_TEXT};

  fn make_state(dir: &TempDir) -> (AppState<SqliteConnector>, PathBuf) {
    let path = dir.path().join("cestas.db");
    let state = AppState::new(SqliteConnector::new(DatabaseConfig::new(&path)), false);
    (state, path)
  }

  async fn get_raw(state: AppState<SqliteConnector>, uri: &str) -> Response {
    let req = Request::builder()
      .method("GET")
      .uri(uri)
      .body(Body::empty())
      .unwrap();
    router(state).oneshot(req).await.unwrap()
  }

  async fn body_string(resp: Response) -> String {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
  }

  fn listing_status(resp: &Response) -> &str {
    resp.headers().get(LISTING_STATUS_HEADER).unwrap().to_str().unwrap()
  }

  /// Direct connection to the same file, standing in for whatever process
  /// registers people in production.
  fn seed(path: &Path, sql: &str) {
    let conn = rusqlite::Connection::open(path).unwrap();
    conn.execute_batch(sql).unwrap();
  }

  const ANA_AND_JOAO: &str = "
    INSERT INTO pessoa_responsavel (nome, cpf, contato)
    VALUES ('Ana', '111.111.111-11', '99999-0000');
    INSERT INTO pessoa (nome, endereco, num_membros, cpf, id_responsavel)
    VALUES ('João', 'Rua A', 3, '222.222.222-22', 1);
  ";

  // ── Liveness ─────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn root_returns_liveness_text() {
    let dir = tempfile::tempdir().unwrap();
    let (state, _) = make_state(&dir);
    let resp = get_raw(state, "/").await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_string(resp).await, LIVENESS_TEXT);
  }

  // ── JSON variant ─────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn json_on_empty_database_creates_schema_and_returns_empty_array() {
    let dir = tempfile::tempdir().unwrap();
    let (state, path) = make_state(&dir);

    let resp = get_raw(state.clone(), "/listar-pessoas").await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(listing_status(&resp), "ok");
    let ct = resp.headers().get(header::CONTENT_TYPE).unwrap().to_str().unwrap();
    assert!(ct.contains("application/json"), "Content-Type: {ct}");
    assert_eq!(body_string(resp).await, "[]");
    assert!(state.schema.is_ready());

    let conn = rusqlite::Connection::open(&path).unwrap();
    let tables: i64 = conn
      .query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table'
         AND name IN ('pessoa_responsavel', 'pessoa', 'estoque', 'distribuicao_cestas')",
        [],
        |r| r.get(0),
      )
      .unwrap();
    assert_eq!(tables, 4);
  }

  #[tokio::test]
  async fn json_lists_person_with_responsible_party() {
    let dir = tempfile::tempdir().unwrap();
    let (state, path) = make_state(&dir);
    // First listing creates the schema.
    get_raw(state.clone(), "/listar-pessoas").await;
    seed(&path, ANA_AND_JOAO);

    let resp = get_raw(state, "/listar-pessoas").await;
    assert_eq!(resp.status(), StatusCode::OK);
    let json: Value = serde_json::from_str(&body_string(resp).await).unwrap();
    let people = json.as_array().unwrap();
    assert_eq!(people.len(), 1);

    let joao = people[0].as_object().unwrap();
    assert_eq!(joao.len(), 13);
    assert_eq!(joao["ID"], 1);
    assert_eq!(joao["Nome"], "João");
    assert_eq!(joao["Endereço"], "Rua A");
    assert_eq!(joao["Membros da Família"], 3);
    assert_eq!(joao["CPF"], "222.222.222-22");
    assert!(joao["Contato"].is_null());
    assert_eq!(joao["Responsável"], "Ana");
    assert_eq!(joao["CPF Responsável"], "111.111.111-11");
    assert_eq!(joao["Contato Responsável"], "99999-0000");
    assert!(joao["Data Registro"].is_string());
    assert!(joao["Data Distribuição"].is_null());
    assert_eq!(joao["Cestas Recebidas"], 0);
    assert!(joao["Alimentos Distribuídos"].is_null());
  }

  // ── Text variant ─────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn text_on_empty_database_is_empty() {
    let dir = tempfile::tempdir().unwrap();
    let (state, _) = make_state(&dir);
    let resp = get_raw(state, "/api/listar-pessoas").await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(listing_status(&resp), "ok");
    assert_eq!(body_string(resp).await, "");
  }

  #[tokio::test]
  async fn text_lists_one_line_per_person() {
    let dir = tempfile::tempdir().unwrap();
    let (state, path) = make_state(&dir);
    get_raw(state.clone(), "/api/listar-pessoas").await;
    seed(&path, ANA_AND_JOAO);
    seed(
      &path,
      "INSERT INTO pessoa (nome, endereco, num_membros, cpf)
       VALUES ('Rita', 'Rua C', 5, '444.444.444-44');",
    );

    let resp = get_raw(state, "/api/listar-pessoas").await;
    let text = body_string(resp).await;
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 2, "text: {text}");

    let joao = lines.iter().find(|l| l.contains("Nome: João")).unwrap();
    assert!(joao.starts_with("ID: 1, Nome: João, Endereço: Rua A, Membros da Família: 3, "));
    assert!(joao.contains("Responsável: Ana (CPF: 111.111.111-11, Contato: 99999-0000)"));
    assert!(joao.ends_with("Cestas Recebidas: 0, Alimentos Distribuídos: None"));

    let rita = lines.iter().find(|l| l.contains("Nome: Rita")).unwrap();
    assert!(rita.contains("Responsável: None (CPF: None, Contato: None)"), "line: {rita}");
  }

  // ── Degraded responses ───────────────────────────────────────────────────────

  #[tokio::test]
  async fn query_failure_still_returns_200_with_fallback_bodies() {
    let dir = tempfile::tempdir().unwrap();
    let (state, path) = make_state(&dir);
    get_raw(state.clone(), "/listar-pessoas").await;
    assert!(state.schema.is_ready());
    // The guard will not recreate the table, so the next read fails.
    seed(&path, "DROP TABLE distribuicao_cestas; DROP TABLE pessoa;");

    let resp = get_raw(state.clone(), "/listar-pessoas").await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(listing_status(&resp), "erro");
    assert_eq!(body_string(resp).await, "[]");

    let resp = get_raw(state, "/api/listar-pessoas").await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(listing_status(&resp), "erro");
    assert_eq!(body_string(resp).await, QUERY_FAILED_TEXT);
  }

  #[tokio::test]
  async fn every_request_mode_recreates_dropped_tables() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cestas.db");
    let state = AppState::new(SqliteConnector::new(DatabaseConfig::new(&path)), true);
    get_raw(state.clone(), "/listar-pessoas").await;
    seed(&path, "DROP TABLE distribuicao_cestas; DROP TABLE pessoa;");

    let resp = get_raw(state, "/listar-pessoas").await;
    assert_eq!(listing_status(&resp), "ok");
    assert_eq!(body_string(resp).await, "[]");
  }

  #[tokio::test]
  async fn connection_failure_returns_500() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing-dir").join("cestas.db");
    let state = AppState::new(SqliteConnector::new(DatabaseConfig::new(path)), false);

    let resp = get_raw(state.clone(), "/listar-pessoas").await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json: Value = serde_json::from_str(&body_string(resp).await).unwrap();
    assert!(json["error"].as_str().unwrap().contains("database connection failed"));
    assert!(!state.schema.is_ready());
  }
}
