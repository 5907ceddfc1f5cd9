//! cestas-server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`), ensures the
//! registry schema once, and serves the listing endpoints over HTTP.
//!
//! # Schema only
//!
//! To create the tables and back-fill legacy columns without serving:
//!
//! ```
//! cargo run -p cestas-server -- --migrate-only
//! ```

use std::path::PathBuf;

use anyhow::Context as _;
use cestas_api::AppState;
use cestas_server::{ServerConfig, migrate};
use cestas_store_sqlite::SqliteConnector;
use clap::Parser;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Cestas registry server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Ensure the database schema and exit.
  #[arg(long)]
  migrate_only: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let server_cfg = ServerConfig::load(&cli.config)
    .with_context(|| format!("failed to load configuration from {:?}", cli.config))?;

  let connector = SqliteConnector::new(server_cfg.database());
  tracing::info!(path = ?connector.config().path, "using database");

  // Helper mode: run the schema steps and exit.
  if cli.migrate_only {
    migrate(&connector).await.context("schema migration failed")?;
    tracing::info!("schema is up to date");
    return Ok(());
  }

  // A failed startup migration is retried lazily by the first requests.
  let schema_ready = match migrate(&connector).await {
    Ok(()) => true,
    Err(e) => {
      tracing::error!(error = %e, "startup schema migration failed");
      false
    }
  };

  let state = AppState::new(connector, server_cfg.ensure_schema_every_request);
  if schema_ready {
    state.schema.mark_ready();
  }

  let app = cestas_api::router(state);
  let address = server_cfg.address();

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}
