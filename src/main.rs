//! Entry point for the Pirates Pontoon server.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use pontoon_server::config::{Config, Overrides};
use pontoon_server::server::run_server;

#[derive(Parser, Debug)]
#[command(name = "pontoon-server", version, about = "Multiplayer Pirates Pontoon over TCP", long_about = None)]
struct Cli {
    /// Path to the TOML config file (created with defaults if missing)
    #[arg(long, default_value = "pontoon-server.toml")]
    config: PathBuf,

    /// Address to bind, overriding the config file
    #[arg(long)]
    address: Option<String>,

    /// Port to listen on, overriding the config file
    #[arg(long)]
    port: Option<u16>,

    /// Number of seats at the table (1-4), overriding the config file
    #[arg(long)]
    players: Option<usize>,

    /// Rounds to play before the game ends, overriding the config file
    #[arg(long)]
    rounds: Option<u32>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let cfg = Config::load_or_create_with_overrides(
        &cli.config,
        cli.address,
        Overrides {
            port: cli.port,
            max_players: cli.players,
            rounds: cli.rounds,
        },
    )
    .with_context(|| format!("loading or creating config '{}'", cli.config.display()))?;

    // Invalid capacity or round count aborts before any socket is bound.
    cfg.validate()?;

    println!("Using config: {}", cli.config.display());
    println!(
        "Table: {} player(s), {} round(s)",
        cfg.max_players, cfg.rounds
    );

    run_server(cfg).await
}
