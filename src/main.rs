// src/main.rs

//! statuswatch CLI
//!
//! Watches a status page on a schedule and pushes changes to a Discord
//! webhook.

use clap::{Parser, Subcommand};
use env_logger::Env;

use statuswatch::config::Config;
use statuswatch::error::Result;
use statuswatch::pipeline;

/// statuswatch - Anthropic status page watcher
#[derive(Parser, Debug)]
#[command(name = "statuswatch", version, about = "Anthropic status page watcher")]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "statuswatch.toml")]
    config: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the scheduled watch loop
    Watch,

    /// Fetch and print one snapshot, then exit
    Check,

    /// Validate the configuration and exit
    Validate,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load_or_default(&cli.config);

    // RUST_LOG wins over the configured level when set
    env_logger::Builder::from_env(Env::default().default_filter_or(&config.logging.level)).init();

    config.validate()?;

    match cli.command {
        Command::Watch => pipeline::run_watch(&config).await?,
        Command::Check => pipeline::run_check_once(&config).await?,
        Command::Validate => {
            log::info!("Configuration is valid");
            println!("OK");
        }
    }

    Ok(())
}
