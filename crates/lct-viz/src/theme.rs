use crate::config::*;

/// Built-in theme presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    /// ROOT's default canvas style: ticks on the bottom and left only,
    /// statistics box, black lines.
    Root,
    /// mplhep's ATLAS style: ticks on all four sides, no statistics box.
    Atlas,
}

impl Theme {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "root" => Some(Self::Root),
            "atlas" => Some(Self::Atlas),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Root => "root",
            Self::Atlas => "atlas",
        }
    }

    pub fn base_config(self) -> VizConfig {
        match self {
            Self::Root => root(),
            Self::Atlas => atlas(),
        }
    }
}

fn root() -> VizConfig {
    VizConfig {
        theme: Theme::Root.name().into(),
        figure: FigureConfig::default(),
        font: FontConfig::default(),
        axes: AxesConfig::default(),
        grid: GridConfig::default(),
        line: LineConfig::default(),
        stats: StatsConfig::default(),
        palette: "root".into(),
        colors: Vec::new(),
        colormap: "bird".into(),
        output: OutputConfig::default(),
    }
}

fn atlas() -> VizConfig {
    VizConfig {
        theme: Theme::Atlas.name().into(),
        // matplotlib's 6.4" x 4.8" figure.
        figure: FigureConfig { width: 460.8, height: 345.6 },
        font: FontConfig {
            family: "TeX Gyre Heros, Helvetica, Arial, DejaVu Sans, sans-serif".into(),
            title_size: 14.0,
            label_size: 13.0,
            tick_size: 11.0,
        },
        axes: AxesConfig {
            tick_direction: "in".into(),
            show_top_ticks: true,
            show_right_ticks: true,
            tick_length: 7.0,
            minor_tick_length: 4.0,
            frame_width: 0.8,
        },
        line: LineConfig { width: 1.5 },
        stats: StatsConfig { show: false },
        palette: "tableau10".into(),
        colormap: "viridis".into(),
        output: OutputConfig { dpi: 100 },
        ..root()
    }
}
