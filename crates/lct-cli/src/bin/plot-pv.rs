//! Interactive primary-vertex plots.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;
use lct_cli::{logging, open_tuple, pv};
use lct_viz::Theme;
use lct_viz::config::resolve_config;

const VIEWER_ENV: &str = "LCT_VIEWER";

#[derive(Parser)]
#[command(name = "plot-pv")]
#[command(about = "Show primary-vertex plots of an LCTuple, pausing between plots")]
#[command(version)]
struct Cli {
    /// Input LCTuple file (ROOT or Parquet)
    #[arg(value_name = "INPUT_FILE")]
    input_file: PathBuf,

    /// Tree name
    #[arg(short, long, default_value = "MyLCTuple")]
    tree: String,

    /// Path to the tree inside the input file
    #[arg(short, long, default_value = "/")]
    path: String,

    /// Image viewer command (default: $LCT_VIEWER)
    #[arg(long)]
    viewer: Option<String>,

    /// YAML file with visualization overrides
    #[arg(long)]
    style: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    debug: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.debug);

    if !cli.input_file.is_file() {
        bail!("provided input file {} not found", cli.input_file.display());
    }
    let viz = resolve_config(Theme::Atlas, cli.style.as_deref()).context("failed to load style")?;

    let tree_path = format!("{}{}", cli.path, cli.tree);
    let source = open_tuple(&cli.input_file, &tree_path)?;
    let plots = pv::build_plots(source.as_ref(), &viz)?;

    let viewer = cli.viewer.or_else(|| std::env::var(VIEWER_ENV).ok().filter(|v| !v.is_empty()));
    let dir = tempfile::tempdir().context("failed to create image directory")?;
    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    pv::show_sequence(&plots, &viz, dir.path(), viewer.as_deref(), &mut stdin.lock(), &mut stdout.lock())?;
    Ok(())
}
