//! The fixed primary-vertex plot sequence of `plot-pv`.

use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{Context, Result, anyhow};
use lct_root::{Binning, ColumnSource, DrawRequest, HistogramRegistry};
use lct_viz::color::Color;
use lct_viz::config::VizConfig;
use lct_viz::plots::{hist1d, hist2d, overlay};
use lct_viz::{Hist1DPlot, Hist2DPlot, Norm, OverlayPlot};

pub const PROMPT: &str = "Press enter to continue";

const TO_UM: f64 = 1.0e6;
const TO_MM: f64 = 1.0e3;

/// One vertex coordinate as displayed.
struct Coordinate {
    axis: char,
    column: &'static str,
    scale: f64,
    unit: &'static str,
    n_bins: usize,
    low: f64,
    high: f64,
}

const COORDINATES: [Coordinate; 3] = [
    Coordinate { axis: 'x', column: "vtxxx", scale: TO_UM, unit: r"$\mu$m", n_bins: 60, low: -3.0, high: 3.0 },
    Coordinate { axis: 'y', column: "vtyyy", scale: TO_UM, unit: r"$\mu$m", n_bins: 60, low: -3.0, high: 3.0 },
    Coordinate { axis: 'z', column: "vtzzz", scale: TO_MM, unit: "mm", n_bins: 100, low: -10.0, high: 10.0 },
];

impl Coordinate {
    fn expression(&self) -> String {
        format!("{}*{}", self.column, self.scale)
    }

    fn hist_name(&self) -> String {
        format!("h_pv_{}", self.axis)
    }

    fn label(&self) -> String {
        format!("{} [{}]", self.axis, self.unit)
    }
}

/// A rendered plot of the sequence.
#[derive(Debug, Clone)]
pub struct PvPlot {
    /// File stem of the image written for the viewer.
    pub name: String,
    pub svg: String,
}

fn lookup_1d<'r>(registry: &'r HistogramRegistry, name: &str) -> Result<&'r lct_root::Hist1D> {
    registry.get_1d(name).ok_or_else(|| anyhow!("failed to find histogram named \"{name}\""))
}

/// Fill and render the five plots, in display order.
pub fn build_plots(source: &dyn ColumnSource, viz: &VizConfig) -> Result<Vec<PvPlot>> {
    let mut registry = HistogramRegistry::new();
    for c in &COORDINATES {
        let request = DrawRequest::hist1d(c.expression(), c.hist_name(), Binning::new(c.n_bins, c.low, c.high)?);
        registry
            .draw(source, &request.to_string(), "")
            .with_context(|| format!("failed to fill '{request}'"))?;
    }
    let [x, y, z] = &COORDINATES;
    let xy_binning = Binning::new(61, -3.0, 3.0)?;
    let xy = DrawRequest::hist2d(x.expression(), y.expression(), "h_pv_xy", xy_binning, xy_binning);
    registry
        .draw(source, &xy.to_string(), "")
        .with_context(|| format!("failed to fill '{xy}'"))?;

    let mut plots = Vec::with_capacity(5);

    let h_xy = registry
        .get_2d("h_pv_xy")
        .ok_or_else(|| anyhow!("failed to find histogram named \"h_pv_xy\""))?;
    let plot = Hist2DPlot::new(h_xy)
        .title("Primary vertex x-pos. versus y-pos.")
        .labels(x.label(), y.label())
        .norm(Norm::Log)
        .colorbar(false);
    plots.push(PvPlot { name: "pv_xy".into(), svg: hist2d::render(&plot, viz)? });

    let (hx, hy) = (lookup_1d(&registry, &x.hist_name())?, lookup_1d(&registry, &y.hist_name())?);
    let plot = OverlayPlot::new()
        .add(hx, "x", Some(Color::RED))
        .add(hy, "y", Some(Color::BLUE))
        .title("Dimuon gun - Primary Vertex Reconstruction")
        .labels(r"Transverse PV position [$\mu$m]", "Entries / bin");
    plots.push(PvPlot { name: "pv_xy_overlay".into(), svg: overlay::render(&plot, viz)? });

    for c in [x, y, z] {
        let h = lookup_1d(&registry, &c.hist_name())?;
        let plot = Hist1DPlot::new(h)
            .title(format!("Primary vertex {}-position", c.axis))
            .labels(c.label(), "Entries");
        plots.push(PvPlot { name: format!("pv_{}", c.axis), svg: hist1d::render(&plot, viz)? });
    }
    Ok(plots)
}

/// Show each plot and wait for the operator between plots.
///
/// Images are written as PNG into `dir`. With a `viewer`, it is run on each
/// image before the prompt. End of input counts as acknowledgment.
pub fn show_sequence(
    plots: &[PvPlot],
    viz: &VizConfig,
    dir: &Path,
    viewer: Option<&str>,
    input: &mut impl BufRead,
    output: &mut impl Write,
) -> Result<Vec<PathBuf>> {
    let mut shown = Vec::with_capacity(plots.len());
    for plot in plots {
        let path = dir.join(format!("{}.png", plot.name));
        lct_viz::render_to_file(&plot.svg, &path, viz)
            .with_context(|| format!("failed to write {}", path.display()))?;
        tracing::debug!(path = %path.display(), "rendered");

        if let Some(cmd) = viewer {
            match Command::new(cmd).arg(&path).status() {
                Ok(status) if !status.success() => {
                    tracing::warn!(viewer = cmd, %status, "viewer exited with failure")
                }
                Ok(_) => {}
                Err(e) => tracing::warn!(viewer = cmd, error = %e, "failed to launch viewer"),
            }
        } else {
            writeln!(output, "{}", path.display())?;
        }

        writeln!(output, "{PROMPT}")?;
        output.flush()?;
        let mut line = String::new();
        input.read_line(&mut line)?;
        shown.push(path);
    }
    Ok(shown)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lct_root::{Column, JaggedCol, RootError};
    use lct_viz::Theme;

    struct Vertices;

    impl ColumnSource for Vertices {
        fn n_entries(&self) -> usize {
            4
        }

        fn column_names(&self) -> Vec<String> {
            vec!["vtxxx".into(), "vtyyy".into(), "vtzzz".into()]
        }

        fn read_column(&self, name: &str) -> lct_root::Result<Column> {
            let rows: [[f64; 1]; 4] = match name {
                "vtxxx" => [[1e-6], [-1e-6], [0.0], [2e-6]],
                "vtyyy" => [[0.5e-6], [0.0], [0.0], [-2e-6]],
                "vtzzz" => [[1e-3], [-5e-3], [0.0], [9e-3]],
                _ => return Err(RootError::BranchNotFound(name.into())),
            };
            Ok(Column::Jagged(JaggedCol::from_rows(rows)))
        }
    }

    #[test]
    fn five_plots_in_order() {
        let plots = build_plots(&Vertices, &Theme::Atlas.base_config()).unwrap();
        let names: Vec<_> = plots.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["pv_xy", "pv_xy_overlay", "pv_x", "pv_y", "pv_z"]);
        assert!(plots[0].svg.contains("Primary vertex x-pos. versus y-pos."));
        assert!(plots[1].svg.contains("Transverse PV position [μm]"));
        assert!(plots[1].svg.contains("Entries / bin"));
        assert!(plots[2].svg.contains(">x [μm]</text>"));
        assert!(plots[4].svg.contains(">z [mm]</text>"));
        assert!(plots[4].svg.contains(">Entries</text>"));
    }

    #[test]
    fn vertex_map_has_no_colorbar() {
        let viz = Theme::Atlas.base_config();
        let plots = build_plots(&Vertices, &viz).unwrap();
        let b = Binning::new(61, -3.0, 3.0).unwrap();
        let mut h = lct_root::Hist2D::new("h_pv_xy", b, b);
        h.fill(1.0, 0.5, 1.0);
        let with_bar = hist2d::render(&Hist2DPlot::new(&h).norm(Norm::Log), &viz).unwrap();
        assert!(with_bar.contains(">10⁰</text>"));
        assert!(!plots[0].svg.contains(">10⁰</text>"));
        assert!(plots[0].svg.contains(">y [μm]</text>"));
    }

    #[test]
    fn prompts_once_per_plot_and_tolerates_eof() {
        let dir = tempfile::tempdir().unwrap();
        let viz = Theme::Atlas.base_config();
        let plots = build_plots(&Vertices, &viz).unwrap();
        let mut input: &[u8] = b"\n";
        let mut output = Vec::new();
        let shown = show_sequence(&plots, &viz, dir.path(), None, &mut input, &mut output).unwrap();
        assert_eq!(shown.len(), 5);
        assert!(shown.iter().all(|p| p.exists()));
        let text = String::from_utf8(output).unwrap();
        assert_eq!(text.matches(PROMPT).count(), 5);
    }

    #[test]
    fn missing_vertex_column_is_an_error() {
        struct Empty;
        impl ColumnSource for Empty {
            fn n_entries(&self) -> usize {
                0
            }
            fn column_names(&self) -> Vec<String> {
                Vec::new()
            }
            fn read_column(&self, name: &str) -> lct_root::Result<Column> {
                Err(RootError::BranchNotFound(name.into()))
            }
        }
        assert!(build_plots(&Empty, &VizConfig::default()).is_err());
    }
}
