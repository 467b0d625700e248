//! Tuple plotter: one histogram image per variable for a selection.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;
use lct_cli::plots::{self, PlotOptions};
use lct_cli::{logging, open_tuple};
use lct_viz::Theme;
use lct_viz::config::resolve_config;

const DEFAULT_TREE_NAME: &str = "MyLCTuple";

#[derive(Parser)]
#[command(name = "make-plots")]
#[command(about = "Make 1D histograms from an LCTuple (ROOT TTree or Parquet table)")]
#[command(version)]
struct Cli {
    /// Input tuple file
    #[arg(short, long, required_unless_present = "list")]
    input_file: Option<PathBuf>,

    /// Tree name inside a ROOT input
    #[arg(short, long, default_value = DEFAULT_TREE_NAME)]
    tree_name: String,

    /// Logarithmic y axes
    #[arg(long)]
    logy: bool,

    /// Variable to plot, or `all`
    #[arg(short, long, default_value = "all")]
    variable: String,

    /// Selection to apply
    #[arg(short, long, default_value = "none")]
    selection: String,

    /// Print the available variables and selections and exit
    #[arg(long)]
    list: bool,

    /// Verbose output
    #[arg(short, long)]
    debug: bool,

    /// Directory for the images
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,

    /// YAML file with visualization overrides
    #[arg(long)]
    style: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.debug);

    if cli.list {
        for line in plots::list_tables() {
            println!("{line}");
        }
        return Ok(());
    }

    let variables = plots::resolve_variables(&cli.variable)?;
    let selection = plots::resolve_selection(&cli.selection)?;

    let Some(input) = cli.input_file else {
        bail!("an input file is required");
    };
    if !input.is_file() {
        bail!("provided input file \"{}\" does not exist", input.display());
    }

    let viz = resolve_config(Theme::Root, cli.style.as_deref()).context("failed to load style")?;
    let source = open_tuple(&input, &cli.tree_name)?;
    let n_entries = source.n_entries();
    if n_entries == 0 {
        bail!("tuple \"{}\" is empty in provided input file \"{}\"", cli.tree_name, input.display());
    }

    let abs = std::fs::canonicalize(&input).unwrap_or_else(|_| input.clone());
    println!("{}", "-".repeat(70));
    println!("Input file              : {}", abs.display());
    println!("Tree name               : {}", cli.tree_name);
    println!("Total number of events  : {n_entries}");
    println!("Variable to plot        : \"{}\"", cli.variable);
    println!("Selection               : {} = \"{}\"", selection.name, selection.expression);
    println!("Debug output?           : {}", cli.debug);
    println!("{}", "-".repeat(70));

    std::fs::create_dir_all(&cli.output_dir)
        .with_context(|| format!("failed to create {}", cli.output_dir.display()))?;
    let opts = PlotOptions { logy: cli.logy, debug: cli.debug, output_dir: cli.output_dir, viz };
    plots::make_plots(source.as_ref(), &variables, selection, &opts)?;
    Ok(())
}
