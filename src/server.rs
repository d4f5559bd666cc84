use crate::config::Config;
use crate::core_auth::helper::load_passwd_file;
use crate::core_auth::CredentialTable;
use crate::core_network::network;
use crate::helpers::log_config;
use anyhow::{Context, Result};
use log::{error, info};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Read-only state shared by every connection.
#[derive(Debug)]
pub struct ServerContext {
    pub config: Config,
    pub share_dir: PathBuf,
    pub credentials: CredentialTable,
}

impl ServerContext {
    pub fn new(config: Config, share_dir: PathBuf, credentials: CredentialTable) -> Self {
        Self {
            config,
            share_dir,
            credentials,
        }
    }
}

/// Creates the share directory if needed and returns its canonical path.
pub fn prepare_share_dir(share_dir: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(share_dir)
        .with_context(|| format!("Failed to create share directory: {:?}", share_dir))?;
    share_dir
        .canonicalize()
        .with_context(|| format!("Failed to resolve share directory: {:?}", share_dir))
}

/// Runs the share server until Ctrl-C.
pub async fn run(config: Config, port: u16, share_dir: &Path) -> Result<()> {
    info!("Starting server with config:");
    log_config(&config);

    let share_dir = prepare_share_dir(share_dir)?;
    info!("Sharing directory: {:?}", share_dir);
    let credentials = load_passwd_file(&config.server.users_file)?;

    let listener = network::bind(&config.server.listen_address, port).await?;
    let context = Arc::new(ServerContext::new(config, share_dir, credentials));

    network::serve(listener, context, shutdown_signal()).await?;
    info!("Server stopped.");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Received shutdown signal"),
        Err(e) => {
            error!("Failed to listen for shutdown signal: {}", e);
            std::future::pending::<()>().await;
        }
    }
}
