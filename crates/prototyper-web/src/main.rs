//! prototyper server binary.
//!
//! Reads `config.toml` (or the path given with `--config`) plus
//! `PROTOTYPER_*` environment variables, loads the mock dataset, opens the
//! configured feedback store and serves the dashboard over HTTP.

use std::{
  path::{Path, PathBuf},
  sync::Arc,
  time::Duration,
};

use anyhow::Context as _;
use clap::Parser;
use prototyper_core::{dataset::Dataset, store::FeedbackStore};
use prototyper_store_sheet::{SheetConfig, SheetStore};
use prototyper_store_sqlite::SqliteStore;
use prototyper_web::{AppState, BackendConfig, ServerConfig};
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Dashboard prototyper server")]
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
    .add_source(
      config::Environment::with_prefix("PROTOTYPER")
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true),
    )
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  let data_path = expand_tilde(&server_cfg.data_path);
  let dataset = Dataset::load(&data_path)
    .with_context(|| format!("failed to load dataset from {data_path:?}"))?;
  let dataset = Arc::new(dataset);

  match &server_cfg.backend {
    BackendConfig::Sqlite { path } => {
      let path = expand_tilde(path);
      tracing::info!(path = %path.display(), "using sqlite feedback store");
      let store = SqliteStore::open(&path)
        .await
        .with_context(|| format!("failed to open store at {path:?}"))?;
      serve(&server_cfg, store, dataset).await
    }
    BackendConfig::Sheet { endpoint, cache_ttl_secs } => {
      tracing::info!(endpoint = %endpoint, "using sheet feedback store");
      let mut sheet = SheetConfig::new(endpoint.clone());
      sheet.cache_ttl = Duration::from_secs(*cache_ttl_secs);
      let store = SheetStore::new(sheet).context("failed to build sheet client")?;
      serve(&server_cfg, store, dataset).await
    }
  }
}

async fn serve<S>(cfg: &ServerConfig, store: S, dataset: Arc<Dataset>) -> anyhow::Result<()>
where
  S: FeedbackStore + Clone + 'static,
{
  store
    .initialize()
    .await
    .context("failed to initialise feedback store")?;

  let state = AppState { store: Arc::new(store), dataset };
  let app = prototyper_web::router(state);
  let address = format!("{}:{}", cfg.host, cfg.port);

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
