use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::path::PathBuf;

use flagshard::config::NodeConfig;
use flagshard::node::NodeServer;

/// Parameters for the serve command
pub struct ServeParams {
    pub config: Option<PathBuf>,
    pub bind: Option<String>,
    pub wordlist: Option<PathBuf>,
    pub archive_dir: Option<PathBuf>,
    pub keep_non_ascii: bool,
}

/// Run a worker node until ctrl-c
pub async fn serve(params: ServeParams) -> Result<()> {
    let mut config = match &params.config {
        Some(path) => NodeConfig::from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => NodeConfig::from_env().context("Invalid FLAGSHARD_* environment")?,
    };

    if let Some(bind) = &params.bind {
        config.bind_address = bind
            .parse::<SocketAddr>()
            .with_context(|| format!("Invalid bind address: {bind}"))?;
    }
    if let Some(wordlist) = params.wordlist {
        config.wordlist_path = wordlist;
    }
    if let Some(dir) = params.archive_dir {
        config.archive_dir = dir;
    }
    if params.keep_non_ascii {
        config.ascii_only_wordlist = false;
    }

    let server = NodeServer::new(config).context("Failed to initialize node")?;

    println!("{}", server.info().display());
    println!();
    println!("Endpoints:");
    println!("  GET  /            - Current shard (text for curl, HTML otherwise)");
    println!("  POST /set-config  - Ingest a shard triple");
    println!("  GET  /api/health  - Health check");
    println!();

    server
        .start_with_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        // Without a signal handler, keep serving
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
