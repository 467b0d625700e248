//! Muon gun event generator.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use lct_cli::{gun, logging};
use lct_gun::GunConfig;

#[derive(Parser)]
#[command(name = "muon-gun")]
#[command(about = "Generate single-muon events into a Parquet event file")]
#[command(version)]
struct Cli {
    /// Output event file (never overwritten)
    #[arg(short, long, default_value = "muonGun_gen.parquet")]
    output: PathBuf,

    /// Number of events
    #[arg(short = 'n', long, default_value_t = 10_000)]
    events: u64,

    /// Random seed (default: OS entropy)
    #[arg(long)]
    seed: Option<u64>,

    /// Log every particle
    #[arg(short, long)]
    debug: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.debug);

    let config = GunConfig { events: cli.events, output: cli.output, ..Default::default() };
    gun::run(&config, cli.seed)?;
    Ok(())
}
