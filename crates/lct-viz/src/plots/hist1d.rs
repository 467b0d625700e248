use lct_root::Hist1D;

use crate::canvas::Canvas;
use crate::color::Color;
use crate::config::VizConfig;
use crate::layout::axes::Axis;
use crate::layout::margins::PlotArea;
use crate::plots::axes_draw::{draw_axes, draw_title, step_points};
use crate::plots::stats::draw_stats_box;
use crate::primitives::LineStyle;
use crate::text::to_unicode;

/// A single histogram drawn as a step line.
#[derive(Debug, Clone)]
pub struct Hist1DPlot<'a> {
    pub hist: &'a Hist1D,
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub log_y: bool,
    pub color: Color,
    /// Statistics box; `None` follows the theme.
    pub show_stats: Option<bool>,
}

impl<'a> Hist1DPlot<'a> {
    pub fn new(hist: &'a Hist1D) -> Self {
        Self {
            hist,
            title: String::new(),
            x_label: String::new(),
            y_label: String::new(),
            log_y: false,
            color: Color::BLACK,
            show_stats: None,
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn labels(mut self, x: impl Into<String>, y: impl Into<String>) -> Self {
        self.x_label = x.into();
        self.y_label = y.into();
        self
    }

    pub fn log_y(mut self, log_y: bool) -> Self {
        self.log_y = log_y;
        self
    }

    pub fn color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn show_stats(mut self, show: bool) -> Self {
        self.show_stats = Some(show);
        self
    }
}

/// y axis for a set of bin contents: from zero (or a decade below the
/// smallest filled bin on a log axis) to a margin above the maximum.
pub(crate) fn content_axis<'c>(contents: impl Iterator<Item = &'c f64> + Clone, log_y: bool) -> Axis {
    let max = contents.clone().copied().fold(0.0_f64, f64::max);
    if log_y {
        let min_pos = contents.copied().filter(|&c| c > 0.0).fold(f64::INFINITY, f64::min);
        if min_pos.is_finite() {
            Axis::auto_log(min_pos * 0.5, max * 2.0)
        } else {
            Axis::auto_log(0.1, 10.0)
        }
    } else if max > 0.0 {
        Axis::auto_linear(0.0, max * 1.05, 6)
    } else {
        Axis::auto_linear(0.0, 1.0, 6)
    }
}

pub fn render(plot: &Hist1DPlot<'_>, config: &VizConfig) -> crate::Result<String> {
    let hist = plot.hist;
    let mut canvas = Canvas::new(config.figure.width, config.figure.height)
        .with_font_family(config.font.family.clone());

    let binning = hist.binning();
    let x_axis = Axis::linear(binning.low, binning.high, 6).with_label(to_unicode(&plot.x_label));
    let y_axis = content_axis(hist.contents.iter(), plot.log_y).with_label(to_unicode(&plot.y_label));

    let title = to_unicode(&plot.title);
    let area = PlotArea::auto(&canvas, &x_axis, &y_axis, !title.is_empty(), config);

    canvas.push_clip(area.left, area.top, area.width, area.height);
    let pts = step_points(&hist.edges, &hist.contents, &x_axis, &y_axis, &area);
    canvas.polyline(&pts, &LineStyle::solid(plot.color, config.line.width));
    canvas.pop_clip();

    draw_axes(&mut canvas, &area, &x_axis, &y_axis, config);
    draw_title(&mut canvas, &area, &title, config);
    if plot.show_stats.unwrap_or(config.stats.show) {
        draw_stats_box(&mut canvas, &area, hist, config);
    }

    Ok(canvas.finish_svg())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::Theme;
    use lct_root::Binning;

    fn hist() -> Hist1D {
        let mut h = Hist1D::new("h_vtxxx", Binning::new(50, -5.0, 5.0).unwrap());
        for i in 0..200 {
            h.fill((i as f64 / 20.0) - 5.0, 1.0);
        }
        h
    }

    #[test]
    fn root_theme_has_stats_and_unicode_labels() {
        let h = hist();
        let plot = Hist1DPlot::new(&h)
            .title("vtxxx : none")
            .labels("Reco PV x-position [#mum]", "Events");
        let svg = render(&plot, &VizConfig::default()).unwrap();
        assert!(svg.contains("Reco PV x-position [μm]"));
        assert!(svg.contains(">Entries</text>"));
        assert!(svg.contains(">200</text>"));
        assert!(svg.contains("<polyline"));
        assert!(svg.contains("clip-path"));
    }

    #[test]
    fn atlas_theme_hides_stats_unless_asked() {
        let h = hist();
        let config = Theme::Atlas.base_config();
        let svg = render(&Hist1DPlot::new(&h), &config).unwrap();
        assert!(!svg.contains(">Entries</text>"));
        let svg = render(&Hist1DPlot::new(&h).show_stats(true), &config).unwrap();
        assert!(svg.contains(">Entries</text>"));
    }

    #[test]
    fn log_y_uses_decade_labels() {
        let h = hist();
        let svg = render(&Hist1DPlot::new(&h).log_y(true), &VizConfig::default()).unwrap();
        assert!(svg.contains(">10⁰</text>") || svg.contains(">10¹</text>"));
    }

    #[test]
    fn empty_histogram_renders() {
        let h = Hist1D::new("h", Binning::new(10, 0.0, 1.0).unwrap());
        assert!(render(&Hist1DPlot::new(&h).log_y(true), &VizConfig::default()).is_ok());
        assert!(render(&Hist1DPlot::new(&h), &VizConfig::default()).is_ok());
    }

    #[test]
    fn content_axis_ranges() {
        let y = content_axis([0.0, 3.0, 40.0].iter(), false);
        assert_eq!(y.min, 0.0);
        assert!(y.max >= 42.0);
        let y = content_axis([0.0, 3.0, 40.0].iter(), true);
        assert!(y.log);
        assert!(y.min <= 1.5 && y.max >= 80.0);
    }
}
