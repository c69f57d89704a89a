use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use update_server::core::Branch;

mod cli;

#[derive(Parser)]
#[command(name = "update-server")]
#[command(about = "Update distribution service for the Lidarr desktop client")]
#[command(version)]
struct Cli {
    /// Path to the config file (defaults to the server home)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API and the background poller
    Serve {
        /// Don't poll upstream sources; rely on the webhook only
        #[arg(long)]
        no_poll: bool,
    },
    /// Run one ingestion pass and wait for it to finish
    Refresh {
        /// Branch to refresh (all configured branches when omitted)
        #[arg(short, long)]
        branch: Option<Branch>,
    },
    /// List stored releases of a branch
    Releases {
        /// Branch to list
        #[arg(short, long, default_value = "develop")]
        branch: Branch,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("update_server=info,tower_http=info")),
        )
        .init();

    let cli = Cli::parse();

    let config = match cli::load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("\nError: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let result = match cli.command {
        Commands::Serve { no_poll } => cli::serve::run(config, no_poll).await,
        Commands::Refresh { branch } => cli::refresh::run(config, branch).await,
        Commands::Releases { branch } => cli::releases::run(config, branch).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("\nError: {}", e);
            ExitCode::FAILURE
        }
    }
}
