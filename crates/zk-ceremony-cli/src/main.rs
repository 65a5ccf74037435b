//! zk-ceremony CLI — coordinator tooling for Groth16 trusted-setup ceremonies.
//!
//! `setup` runs the full assembly pipeline: collect circuits interactively,
//! extract their metadata, compute each genesis zkey, stage all artifacts
//! into durable storage, and register the ceremony with the coordinator.
//! `clean` removes the local run outputs.

mod commands;
mod output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "zk-ceremony",
    about = "Assemble and register Groth16 trusted-setup ceremonies",
    version,
    propagate_version = true
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to zk-ceremony.config.json (default: ./zk-ceremony.config.json)
    #[arg(long, global = true, default_value = "zk-ceremony.config.json")]
    config: PathBuf,

    /// Bearer token for the coordinator backend
    #[arg(long, global = true, env = "ZK_CEREMONY_TOKEN")]
    token: Option<String>,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Assemble a new ceremony from the local circuit files and register it
    Setup,

    /// Remove the local metadata and zkey output directories
    Clean {
        /// Also remove the cached powers-of-tau files
        #[arg(long)]
        ptau: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    match cli.command {
        Commands::Setup => {
            commands::setup::run(&cli.config, cli.token).await?;
        }
        Commands::Clean { ptau } => {
            commands::clean::run(&cli.config, ptau).await?;
        }
    }

    Ok(())
}
