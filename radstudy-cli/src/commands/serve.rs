//! Serve command: load study content, open storage, run the survey server

use anyhow::Result;
use clap::Args;
use radstudy_server::{AppState, ServerConfig, StudyServer};
use std::path::PathBuf;
use tracing::info;

use crate::config::{ConfigLoader, RawStudyConfig, StorageBackend, StudyConfig};

/// Arguments for the serve command
#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Host to bind to
    #[arg(long)]
    pub host: Option<String>,

    /// Port to listen on
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Directory holding cases, guidelines and study options
    #[arg(long)]
    pub assets: Option<PathBuf>,

    /// Response storage backend
    #[arg(long, value_enum)]
    pub storage: Option<StorageBackend>,

    /// File for the jsonl or sqlite backend
    #[arg(long)]
    pub storage_path: Option<PathBuf>,
}

impl ServeArgs {
    /// Command-line values as the topmost config layer
    fn as_layer(&self) -> RawStudyConfig {
        let mut layer = RawStudyConfig::default();
        layer.server.host = self.host.clone();
        layer.server.port = self.port;
        layer.assets.dir = self.assets.clone();
        layer.storage.backend = self.storage;
        layer.storage.path = self.storage_path.clone();
        layer
    }
}

/// Run the serve command
pub async fn run(args: ServeArgs) -> Result<()> {
    let raw = ConfigLoader::merge_raw(ConfigLoader::load_raw()?, args.as_layer());
    let config = ConfigLoader::finalize(raw)?;

    info!(
        assets = %config.assets.dir.display(),
        storage = config.storage.backend_name(),
        "Starting radstudy server on {}:{}",
        config.server.host,
        config.server.port
    );

    let state = load_state(&config).await?;
    let server = StudyServer::new(
        ServerConfig::new(config.server.host.clone(), config.server.port),
        state,
    );
    server.run().await.map_err(Into::into)
}

async fn load_state(config: &StudyConfig) -> Result<AppState> {
    let state = AppState::load(
        &config.assets,
        &config.palette,
        &config.guidelines,
        &config.storage,
    )
    .await?
    .with_policy(config.condition.clone());
    Ok(state)
}
