use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(
    name = "flagshard",
    version,
    about = "Split a flag across worker nodes and serve the shards",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log format (text, json)
    #[arg(long, global = true, default_value = "text")]
    log_format: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a worker node
    Serve {
        /// TOML config file (defaults to FLAGSHARD_* environment variables)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Address to bind, e.g. 0.0.0.0:8080
        #[arg(short, long)]
        bind: Option<String>,

        /// Password wordlist
        #[arg(short, long)]
        wordlist: Option<PathBuf>,

        /// Directory for the encrypted archive
        #[arg(long)]
        archive_dir: Option<PathBuf>,

        /// Keep wordlist lines that are not printable ASCII
        #[arg(long, default_value = "false")]
        keep_non_ascii: bool,
    },

    /// Split the manifest's flag and push the shards to every node
    Distribute {
        /// Manifest listing nodes and secrets (.yaml or .toml)
        #[arg(short, long, default_value = "manifest.yaml")]
        manifest: PathBuf,

        /// Per-node request timeout in seconds
        #[arg(short, long, default_value = "10")]
        timeout: u64,

        /// Print the report as JSON
        #[arg(long, default_value = "false")]
        json: bool,

        /// Exit successfully even if some nodes failed
        #[arg(long, default_value = "false")]
        allow_partial: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing/logging
    setup_tracing(&cli.log_format, cli.verbose)?;

    match cli.command {
        Commands::Serve {
            config,
            bind,
            wordlist,
            archive_dir,
            keep_non_ascii,
        } => {
            tracing::info!(
                config = ?config,
                bind = ?bind,
                wordlist = ?wordlist,
                "Starting serve command"
            );
            commands::serve(commands::ServeParams {
                config,
                bind,
                wordlist,
                archive_dir,
                keep_non_ascii,
            })
            .await?;
        }

        Commands::Distribute {
            manifest,
            timeout,
            json,
            allow_partial,
        } => {
            tracing::info!(
                manifest = %manifest.display(),
                timeout = %timeout,
                "Starting distribute command"
            );
            commands::distribute(commands::DistributeParams {
                manifest,
                timeout_secs: timeout,
                json,
                allow_partial,
            })
            .await?;
        }
    }

    Ok(())
}

fn setup_tracing(format: &str, verbose: bool) -> Result<()> {
    let env_filter = if verbose {
        tracing_subscriber::EnvFilter::new("flagshard=debug,tower_http=debug,info")
    } else {
        tracing_subscriber::EnvFilter::new("flagshard=info,warn")
    };

    match format {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
    }

    Ok(())
}
