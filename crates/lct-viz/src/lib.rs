//! # lct-viz
//!
//! SVG rendering of lctools histograms, with PNG output through
//! `usvg`/`resvg`/`tiny-skia`.
//!
//! Two themes are built in: `root` mimics ROOT's default canvas (used by
//! `make-plots`) and `atlas` mimics mplhep's ATLAS style (used by `plot-pv`).
//! Any theme value can be overridden from YAML, see [`config::resolve_config`].

pub mod canvas;
pub mod color;
pub mod config;
pub mod font;
pub mod layout;
pub mod output;
pub mod plots;
pub mod primitives;
pub mod text;
pub mod theme;

use std::path::Path;

use config::VizConfig;
use thiserror::Error;

pub use plots::hist1d::Hist1DPlot;
pub use plots::hist2d::{Hist2DPlot, Norm};
pub use plots::overlay::OverlayPlot;
pub use theme::Theme;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("SVG error: {0}")]
    Svg(String),
    #[cfg(feature = "png")]
    #[error("PNG encoding error: {0}")]
    Png(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("font error: {0}")]
    Font(String),
    #[error("config error: {0}")]
    Config(String),
    #[error("unsupported output format: {0}")]
    UnsupportedFormat(String),
}

pub type Result<T> = std::result::Result<T, RenderError>;

/// Output image format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Svg,
    #[cfg(feature = "png")]
    Png,
}

impl OutputFormat {
    /// Infer the format from a file extension (case-insensitive).
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("").to_ascii_lowercase();
        match ext.as_str() {
            "svg" => Ok(Self::Svg),
            #[cfg(feature = "png")]
            "png" => Ok(Self::Png),
            _ => Err(RenderError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

/// Encode a rendered SVG document in the given format.
#[cfg_attr(not(feature = "png"), allow(unused_variables))]
pub fn render_to_bytes(svg: &str, format: OutputFormat, config: &VizConfig) -> Result<Vec<u8>> {
    match format {
        OutputFormat::Svg => Ok(svg.as_bytes().to_vec()),
        #[cfg(feature = "png")]
        OutputFormat::Png => output::png::svg_to_png(svg, config.output.dpi, &config.font.family),
    }
}

/// Write a rendered SVG document to `path`, format inferred from the extension.
#[cfg_attr(not(feature = "png"), allow(unused_variables))]
pub fn render_to_file(svg: &str, path: &Path, config: &VizConfig) -> Result<()> {
    match OutputFormat::from_path(path)? {
        OutputFormat::Svg => output::svg::save_svg(svg, path),
        #[cfg(feature = "png")]
        format => {
            let bytes = render_to_bytes(svg, format, config)?;
            std::fs::write(path, bytes)?;
            Ok(())
        }
    }
}
