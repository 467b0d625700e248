use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::color::{Color, Colormap};
use crate::theme::Theme;

/// Top-level visualization configuration (YAML or programmatic).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VizConfig {
    pub theme: String,
    pub figure: FigureConfig,
    pub font: FontConfig,
    pub axes: AxesConfig,
    pub grid: GridConfig,
    pub line: LineConfig,
    pub stats: StatsConfig,
    /// Named line palette.
    pub palette: String,
    /// Explicit line colors; when non-empty they replace `palette`.
    pub colors: Vec<Color>,
    pub colormap: String,
    pub output: OutputConfig,
}

impl Default for VizConfig {
    fn default() -> Self {
        Theme::Root.base_config()
    }
}

impl VizConfig {
    pub fn palette_colors(&self) -> Vec<Color> {
        if self.colors.is_empty() {
            crate::color::palette_colors(&self.palette)
        } else {
            self.colors.clone()
        }
    }

    pub fn colormap(&self) -> Colormap {
        Colormap::parse(&self.colormap)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FigureConfig {
    pub width: f64,
    pub height: f64,
}

impl Default for FigureConfig {
    fn default() -> Self {
        // ROOT's default TCanvas, 700x500 px at 72 dpi.
        Self { width: 700.0, height: 500.0 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FontConfig {
    pub family: String,
    pub title_size: f64,
    pub label_size: f64,
    pub tick_size: f64,
}

impl Default for FontConfig {
    fn default() -> Self {
        Self {
            family: "Helvetica, Arial, Liberation Sans, DejaVu Sans, sans-serif".into(),
            title_size: 16.0,
            label_size: 15.0,
            tick_size: 14.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AxesConfig {
    pub tick_direction: String,
    pub show_top_ticks: bool,
    pub show_right_ticks: bool,
    pub tick_length: f64,
    pub minor_tick_length: f64,
    pub frame_width: f64,
}

impl Default for AxesConfig {
    fn default() -> Self {
        Self {
            tick_direction: "in".into(),
            show_top_ticks: false,
            show_right_ticks: false,
            tick_length: 12.0,
            minor_tick_length: 6.0,
            frame_width: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub show: bool,
    pub color: Color,
    pub alpha: f64,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self { show: false, color: Color::rgb(0xCB, 0xD5, 0xE1), alpha: 0.55 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LineConfig {
    /// Histogram line width in points.
    pub width: f64,
}

impl Default for LineConfig {
    fn default() -> Self {
        Self { width: 2.0 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatsConfig {
    /// Draw the statistics box on 1-D plots.
    pub show: bool,
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self { show: true }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub dpi: u32,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { dpi: 72 }
    }
}

/// Resolve a VizConfig from an optional YAML override file.
///
/// The base is the theme named by the file's `theme:` key, or `default_theme`
/// when the key is absent; every key present in the file overrides the base.
pub fn resolve_config(default_theme: Theme, path: Option<&Path>) -> crate::Result<VizConfig> {
    let Some(path) = path else {
        return Ok(default_theme.base_config());
    };
    let text = std::fs::read_to_string(path)?;
    resolve_config_str(default_theme, &text)
}

/// [`resolve_config`] for YAML already in memory.
pub fn resolve_config_str(default_theme: Theme, yaml: &str) -> crate::Result<VizConfig> {
    let config_err = |e: serde_yaml_ng::Error| crate::RenderError::Config(e.to_string());

    let user: serde_yaml_ng::Value = serde_yaml_ng::from_str(yaml).map_err(config_err)?;
    let theme = match user.get("theme").and_then(|t| t.as_str()) {
        Some(name) => Theme::parse(name).ok_or_else(|| {
            crate::RenderError::Config(format!("unknown theme {name:?} (expected root or atlas)"))
        })?,
        None => default_theme,
    };

    let mut merged = serde_yaml_ng::to_value(theme.base_config()).map_err(config_err)?;
    if !user.is_null() {
        merge_values(&mut merged, user);
    }
    serde_yaml_ng::from_value(merged).map_err(config_err)
}

fn merge_values(base: &mut serde_yaml_ng::Value, over: serde_yaml_ng::Value) {
    use serde_yaml_ng::Value;
    match (base, over) {
        (Value::Mapping(base), Value::Mapping(over)) => {
            for (k, v) in over {
                match base.get_mut(&k) {
                    Some(slot) => merge_values(slot, v),
                    None => {
                        base.insert(k, v);
                    }
                }
            }
        }
        (slot, v) => *slot = v,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_file_gives_theme() {
        let c = resolve_config(Theme::Atlas, None).unwrap();
        assert_eq!(c, Theme::Atlas.base_config());
    }

    #[test]
    fn partial_override_keeps_theme_values() {
        let yaml = "figure:\n  width: 800\noutput:\n  dpi: 150\n";
        let c = resolve_config_str(Theme::Atlas, yaml).unwrap();
        let base = Theme::Atlas.base_config();
        assert_eq!(c.figure.width, 800.0);
        assert_eq!(c.figure.height, base.figure.height);
        assert_eq!(c.output.dpi, 150);
        assert_eq!(c.font, base.font);
    }

    #[test]
    fn theme_key_switches_base() {
        let c = resolve_config_str(Theme::Root, "theme: atlas\n").unwrap();
        assert_eq!(c.theme, "atlas");
        assert!(!c.stats.show);
    }

    #[test]
    fn colors_override_palette() {
        let c = resolve_config_str(Theme::Root, "colors: ['#00ff00', 'k']\n").unwrap();
        assert_eq!(c.palette_colors(), vec![Color::rgb(0, 255, 0), Color::BLACK]);
    }

    #[test]
    fn bad_yaml_is_config_error() {
        assert!(matches!(
            resolve_config_str(Theme::Root, "figure: [1, 2"),
            Err(crate::RenderError::Config(_))
        ));
        assert!(matches!(
            resolve_config_str(Theme::Root, "theme: cms\n"),
            Err(crate::RenderError::Config(_))
        ));
        assert!(matches!(
            resolve_config_str(Theme::Root, "colors: ['nope']\n"),
            Err(crate::RenderError::Config(_))
        ));
    }

    #[test]
    fn empty_file_gives_theme() {
        assert_eq!(resolve_config_str(Theme::Root, "").unwrap(), VizConfig::default());
    }
}
