//! One histogram image per (variable, selection) pair.

use std::path::PathBuf;

use anyhow::{Context, Result, anyhow, bail};
use lct_root::{ColumnSource, HistogramRegistry};
use lct_viz::Hist1DPlot;
use lct_viz::config::VizConfig;
use lct_viz::plots::hist1d;

use crate::tables::{self, SelectionSpec, VariableSpec};

/// Settings of one plotting run.
#[derive(Debug, Clone)]
pub struct PlotOptions {
    pub logy: bool,
    /// Echo the intermediate request strings.
    pub debug: bool,
    pub output_dir: PathBuf,
    pub viz: VizConfig,
}

impl Default for PlotOptions {
    fn default() -> Self {
        Self { logy: false, debug: false, output_dir: PathBuf::from("."), viz: VizConfig::default() }
    }
}

/// `plot_<variable>-<selection>.png`.
pub fn output_name(variable: &str, selection: &str) -> String {
    format!("plot_{variable}-{selection}.png")
}

/// Variables selected by `name`: the whole table (sorted by name) for `all`.
pub fn resolve_variables(name: &str) -> Result<Vec<&'static VariableSpec>> {
    if name == "all" {
        let mut all: Vec<_> = tables::variables().iter().collect();
        all.sort_by_key(|v| v.name);
        return Ok(all);
    }
    match tables::variable(name) {
        Some(v) => Ok(vec![v]),
        None => bail!("requested variable \"{name}\" is not defined in the variable table"),
    }
}

pub fn resolve_selection(name: &str) -> Result<&'static SelectionSpec> {
    tables::selection(name)
        .ok_or_else(|| anyhow!("requested selection \"{name}\" is not defined in the selection table"))
}

/// Fill, render and save one plot. Returns the written path.
pub fn make_plot(
    source: &dyn ColumnSource,
    registry: &mut HistogramRegistry,
    variable: &VariableSpec,
    selection: &SelectionSpec,
    opts: &PlotOptions,
) -> Result<PathBuf> {
    let request = variable.draw_request()?;
    let hist_name = variable.histogram_name();
    if opts.debug {
        println!("\t\tdraw request: {request}");
        println!("\t\tselection   : \"{}\"", selection.expression);
    }

    registry
        .draw(source, &request, selection.expression)
        .with_context(|| format!("failed to fill '{request}'"))?;
    let hist = registry
        .get_1d(&hist_name)
        .ok_or_else(|| anyhow!("failed to find histogram named \"{hist_name}\""))?;
    tracing::debug!(histogram = %hist_name, entries = hist.entries, "filled");

    let plot = Hist1DPlot::new(hist)
        .title(format!("{} : {}", variable.name, selection.name))
        .labels(variable.x_label, variable.y_label)
        .log_y(opts.logy);
    let svg = hist1d::render(&plot, &opts.viz)?;

    let path = opts.output_dir.join(output_name(variable.name, selection.name));
    lct_viz::render_to_file(&svg, &path, &opts.viz)
        .with_context(|| format!("failed to write {}", path.display()))?;
    tracing::info!(path = %path.display(), "saved plot");
    Ok(path)
}

/// Plot every variable with one selection, stopping at the first failure.
pub fn make_plots(
    source: &dyn ColumnSource,
    variables: &[&VariableSpec],
    selection: &SelectionSpec,
    opts: &PlotOptions,
) -> Result<Vec<PathBuf>> {
    println!("Making plots...");
    let mut registry = HistogramRegistry::new();
    let n = variables.len();
    let mut written = Vec::with_capacity(n);
    for (i, variable) in variables.iter().enumerate() {
        println!("  [{:>2}/{n:>2}] Plotting {}", i + 1, variable.name);
        written.push(make_plot(source, &mut registry, variable, selection, opts)?);
        if opts.debug {
            println!("{}", "-".repeat(80));
        }
    }
    Ok(written)
}

/// Lines printed by `--list`.
pub fn list_tables() -> Vec<String> {
    let mut out = vec!["-".repeat(70), "Variables available for plotting:".to_string()];
    let vars = tables::variables();
    for (i, v) in vars.iter().enumerate() {
        out.push(format!("  [{:>2}/{:>2}] \"{}\"", i + 1, vars.len(), v.name));
    }
    out.push("- ".repeat(35));
    out.push("Selections available to apply to events:".to_string());
    let sels = tables::selections();
    for (i, s) in sels.iter().enumerate() {
        out.push(format!("  [{:>2}/{:>2}] {}: \"{}\"", i + 1, sels.len(), s.name, s.expression));
    }
    out.push("-".repeat(70));
    out
}
