//! recall-server binary.
//!
//! Reads `config.toml` (or the path given with `--config`), applies any
//! `RECALL_*` environment overrides, opens the SQLite card store, and serves
//! the JSON API under `/api`.
//!
//! ```toml
//! host       = "127.0.0.1"
//! port       = 7878
//! store_path = "~/.local/share/recall/cards.db"
//! ```

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use clap::Parser;
use recall_api::ServerConfig;
use recall_core::{Session, SystemClock};
use recall_store_sqlite::SqliteRepository;
use tokio::{net::TcpListener, sync::Mutex};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Recall spaced-repetition server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,
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

  // Load configuration.
  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("RECALL"))
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  let store_path = expand_tilde(&server_cfg.store_path);
  if let Some(parent) = store_path.parent()
    && !parent.as_os_str().is_empty()
  {
    std::fs::create_dir_all(parent)
      .with_context(|| format!("failed to create store directory {parent:?}"))?;
  }

  let repo = SqliteRepository::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  let session = Session::open(repo, SystemClock)
    .await
    .context("failed to load cards")?;
  tracing::info!(cards = session.deck().len(), path = ?store_path, "store loaded");

  let app = recall_api::app(Arc::new(Mutex::new(session)));
  let address = format!("{}:{}", server_cfg.host, server_cfg.port);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
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
