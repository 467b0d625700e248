use lct_root::Hist1D;

use crate::canvas::Canvas;
use crate::color::Color;
use crate::config::VizConfig;
use crate::layout::axes::Axis;
use crate::layout::legend::{LegendCorner, LegendEntry, draw_legend};
use crate::layout::margins::PlotArea;
use crate::plots::axes_draw::{draw_axes, draw_title, step_points};
use crate::plots::hist1d::content_axis;
use crate::primitives::LineStyle;
use crate::text::to_unicode;

#[derive(Debug, Clone)]
pub struct OverlaySeries<'a> {
    pub hist: &'a Hist1D,
    pub label: String,
    /// Line color; `None` takes the next palette color.
    pub color: Option<Color>,
}

/// Several histograms drawn as step lines on shared axes, with a legend.
#[derive(Debug, Clone, Default)]
pub struct OverlayPlot<'a> {
    pub series: Vec<OverlaySeries<'a>>,
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub log_y: bool,
}

impl<'a> OverlayPlot<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(mut self, hist: &'a Hist1D, label: impl Into<String>, color: Option<Color>) -> Self {
        self.series.push(OverlaySeries { hist, label: label.into(), color });
        self
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
}

/// Put the legend in the top corner with less histogram content under it.
fn legend_corner(series: &[OverlaySeries<'_>]) -> LegendCorner {
    let mut left = 0.0_f64;
    let mut right = 0.0_f64;
    for s in series {
        let n = s.hist.contents.len();
        let quarter = (n / 4).max(1).min(n);
        left = s.hist.contents[..quarter].iter().copied().fold(left, f64::max);
        right = s.hist.contents[n - quarter..].iter().copied().fold(right, f64::max);
    }
    if right <= left { LegendCorner::TopRight } else { LegendCorner::TopLeft }
}

pub fn render(plot: &OverlayPlot<'_>, config: &VizConfig) -> crate::Result<String> {
    if plot.series.is_empty() {
        return Err(crate::RenderError::Svg("overlay plot has no series".into()));
    }
    let mut canvas = Canvas::new(config.figure.width, config.figure.height)
        .with_font_family(config.font.family.clone());

    let low = plot.series.iter().map(|s| s.hist.binning().low).fold(f64::INFINITY, f64::min);
    let high = plot.series.iter().map(|s| s.hist.binning().high).fold(f64::NEG_INFINITY, f64::max);
    let x_axis = Axis::linear(low, high, 6).with_label(to_unicode(&plot.x_label));
    let y_axis = content_axis(plot.series.iter().flat_map(|s| s.hist.contents.iter()), plot.log_y)
        .with_label(to_unicode(&plot.y_label));

    let title = to_unicode(&plot.title);
    let area = PlotArea::auto(&canvas, &x_axis, &y_axis, !title.is_empty(), config);
    let palette = config.palette_colors();

    let mut legend = Vec::with_capacity(plot.series.len());
    canvas.push_clip(area.left, area.top, area.width, area.height);
    for (i, s) in plot.series.iter().enumerate() {
        let color = s.color.or_else(|| palette.get(i % palette.len().max(1)).copied()).unwrap_or(Color::BLACK);
        let pts = step_points(&s.hist.edges, &s.hist.contents, &x_axis, &y_axis, &area);
        canvas.polyline(&pts, &LineStyle::solid(color, config.line.width));
        legend.push(LegendEntry { label: to_unicode(&s.label), color, line_width: config.line.width });
    }
    canvas.pop_clip();

    draw_axes(&mut canvas, &area, &x_axis, &y_axis, config);
    draw_title(&mut canvas, &area, &title, config);
    draw_legend(&mut canvas, &area, &legend, config.font.tick_size, legend_corner(&plot.series));

    Ok(canvas.finish_svg())
}
