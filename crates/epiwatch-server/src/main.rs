//! `epiwatch` — load surveillance extracts and serve them over HTTP.
//!
//! # Usage
//!
//! ```text
//! epiwatch load --csv-dir ./data        # or CASE_CSV_DIR=./data epiwatch load
//! epiwatch serve --port 8501
//! epiwatch stats --iso3 DZA
//! ```
//!
//! Loading is a one-off batch step and is safe to repeat: rows already in the
//! database are skipped.

mod settings;

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use axum::Router;
use clap::{Parser, Subcommand};
use epiwatch_core::store::CaseStore;
use epiwatch_ingest::{Extracts, extract::default_csv_dir};
use epiwatch_store_sqlite::SqliteStore;
use serde_json::json;
use settings::{Settings, expand_tilde};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Measles and rubella surveillance store")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "epiwatch.toml", global = true)]
  config: PathBuf,

  /// SQLite database file (overrides `store_path`).
  #[arg(long, global = true)]
  db: Option<PathBuf>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Load `cases_year.csv` and `cases_month.csv` into the database.
  Load {
    /// Directory holding both extracts.
    #[arg(long, env = "CASE_CSV_DIR")]
    csv_dir:    Option<PathBuf>,
    /// Case rows per insert transaction.
    #[arg(long)]
    batch_size: Option<usize>,
  },
  /// Serve the read-only JSON API under `/api`.
  Serve {
    #[arg(long)]
    host: Option<String>,
    #[arg(short, long)]
    port: Option<u16>,
  },
  /// Print row counts, and optionally one country's case rows.
  Stats {
    #[arg(long)]
    iso3: Option<String>,
  },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let mut settings = Settings::load(&cli.config)
    .with_context(|| format!("failed to read config {:?}", cli.config))?;
  if let Some(db) = cli.db {
    settings.store_path = db;
  }
  let store_path = expand_tilde(&settings.store_path);

  match cli.command {
    Command::Load { csv_dir, batch_size } => {
      let csv_dir = csv_dir
        .or(settings.csv_dir.clone())
        .map(|d| expand_tilde(&d))
        .unwrap_or_else(default_csv_dir);
      let batch_size = batch_size.unwrap_or(settings.batch_size);

      let store = SqliteStore::open(&store_path)
        .await
        .with_context(|| format!("failed to open store at {store_path:?}"))?
        .with_case_batch(batch_size);

      tracing::info!(?csv_dir, ?store_path, "loading extracts");
      let extracts = Extracts::from_dir(&csv_dir)
        .with_context(|| format!("failed to read extracts from {csv_dir:?}"))?;
      let report = epiwatch_ingest::load(&store, &extracts)
        .await
        .context("load failed")?;

      println!("{}", serde_json::to_string_pretty(&report)?);
    }

    Command::Serve { host, port } => {
      let store = SqliteStore::open(&store_path)
        .await
        .with_context(|| format!("failed to open store at {store_path:?}"))?;

      let app = Router::new()
        .nest("/api", epiwatch_api::api_router(Arc::new(store)))
        .layer(TraceLayer::new_for_http());

      let address = format!(
        "{}:{}",
        host.unwrap_or(settings.host),
        port.unwrap_or(settings.port)
      );

      tracing::info!("Listening on http://{address}");
      let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind {address}"))?;

      axum::serve(listener, app).await.context("server error")?;
    }

    Command::Stats { iso3 } => {
      let store = SqliteStore::open(&store_path)
        .await
        .with_context(|| format!("failed to open store at {store_path:?}"))?;

      let mut out = json!({
        "countries": store.count_countries().await?,
        "cases":     store.count_cases().await?,
      });
      if let Some(code) = iso3 {
        out["country"] = json!(store.get_country(&code).await?);
        out["rows"] = json!(store.get_cases_by_country(&code).await?);
      }
      println!("{}", serde_json::to_string_pretty(&out)?);
    }
  }

  Ok(())
}
