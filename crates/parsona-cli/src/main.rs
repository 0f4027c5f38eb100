mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use parsona_core::DEFAULT_PERSONA;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

#[derive(Debug, Parser)]
#[command(name = "parsona-cli")]
#[command(about = "Parsona analytics command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Apply pending database migrations
    Migrate,
    /// Ingest activities for a user and recompute their signal and score
    Sync {
        /// User to sync
        #[arg(long)]
        user: Uuid,
        /// JSON file holding an array of activity payloads, or an object with
        /// an `activities` array. Omit to sync an empty batch.
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// Print the dashboard view for a user
    Dashboard {
        #[arg(long)]
        user: Uuid,
        /// Target persona to compare against
        #[arg(long, default_value = DEFAULT_PERSONA)]
        persona: String,
    },
    /// Print the effective persona benchmark table as YAML
    Benchmarks {
        /// YAML override; the built-in table is used when unset
        #[arg(long, env = "PARSONA_BENCHMARKS_PATH")]
        path: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let env_filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("info"))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Some(Commands::Migrate) => commands::run_migrate().await,
        Some(Commands::Sync { user, file }) => commands::run_sync(user, file.as_deref()).await,
        Some(Commands::Dashboard { user, persona }) => {
            commands::run_dashboard(user, &persona).await
        }
        Some(Commands::Benchmarks { path }) => commands::run_benchmarks(path.as_deref()),
        None => {
            println!("parsona-cli: run with --help to list commands");
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests;
