use lct_root::Hist2D;

use crate::canvas::Canvas;
use crate::color::{Color, Colormap};
use crate::config::VizConfig;
use crate::layout::axes::Axis;
use crate::layout::margins::PlotArea;
use crate::plots::axes_draw::{draw_axes, draw_title};
use crate::primitives::*;
use crate::text::to_unicode;

/// Color normalization of cell contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Norm {
    #[default]
    Linear,
    /// Logarithmic; empty cells stay blank.
    Log,
}

/// A 2-D histogram drawn as colored cells.
#[derive(Debug, Clone)]
pub struct Hist2DPlot<'a> {
    pub hist: &'a Hist2D,
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub norm: Norm,
    pub colorbar: bool,
}

impl<'a> Hist2DPlot<'a> {
    pub fn new(hist: &'a Hist2D) -> Self {
        Self {
            hist,
            title: String::new(),
            x_label: String::new(),
            y_label: String::new(),
            norm: Norm::Linear,
            colorbar: true,
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

    pub fn norm(mut self, norm: Norm) -> Self {
        self.norm = norm;
        self
    }

    pub fn colorbar(mut self, colorbar: bool) -> Self {
        self.colorbar = colorbar;
        self
    }
}

/// Axis spanned by the color scale.
fn color_axis(hist: &Hist2D, norm: Norm) -> Axis {
    let max = hist.max_content();
    match norm {
        Norm::Linear if max > 0.0 => Axis::auto_linear(0.0, max, 5),
        Norm::Linear => Axis::auto_linear(0.0, 1.0, 5),
        Norm::Log => match hist.min_positive() {
            Some(min) => Axis::auto_log(min, max),
            None => Axis::auto_log(1.0, 10.0),
        },
    }
}

const COLORBAR_WIDTH: f64 = 16.0;
const COLORBAR_GAP: f64 = 12.0;

pub fn render(plot: &Hist2DPlot<'_>, config: &VizConfig) -> crate::Result<String> {
    let hist = plot.hist;
    let mut canvas = Canvas::new(config.figure.width, config.figure.height)
        .with_font_family(config.font.family.clone());

    let (x_lo, x_hi) = edge_range(&hist.x_edges);
    let (y_lo, y_hi) = edge_range(&hist.y_edges);
    let x_axis = Axis::linear(x_lo, x_hi, 6).with_label(to_unicode(&plot.x_label));
    let y_axis = Axis::linear(y_lo, y_hi, 6).with_label(to_unicode(&plot.y_label));
    let z_axis = color_axis(hist, plot.norm);
    let cmap = config.colormap();

    let title = to_unicode(&plot.title);
    let mut area = PlotArea::auto(&canvas, &x_axis, &y_axis, !title.is_empty(), config);
    if plot.colorbar {
        let tick_style = TextStyle { size: config.font.tick_size, ..Default::default() };
        let label_w = z_axis
            .tick_labels
            .iter()
            .map(|l| canvas.measure_text(l, &tick_style).width)
            .fold(0.0_f64, f64::max);
        area = area.shrink_right(COLORBAR_GAP + COLORBAR_WIDTH + label_w + 8.0);
    }

    let x_px = |v: f64| x_axis.data_to_pixel(v, area.left, area.right());
    let y_px = |v: f64| y_axis.data_to_pixel(v, area.bottom(), area.top);

    canvas.push_clip(area.left, area.top, area.width, area.height);
    for iy in 0..hist.ny() {
        for ix in 0..hist.nx() {
            let c = hist.get(ix, iy);
            if plot.norm == Norm::Log && c <= 0.0 {
                continue;
            }
            let (px0, px1) = (x_px(hist.x_edges[ix]), x_px(hist.x_edges[ix + 1]));
            let (py_top, py_bottom) = (y_px(hist.y_edges[iy + 1]), y_px(hist.y_edges[iy]));
            let style = Style::filled(cmap.at(z_axis.fraction(c)));
            canvas.rect(px0, py_top, px1 - px0, py_bottom - py_top, &style);
        }
    }
    canvas.pop_clip();

    draw_axes(&mut canvas, &area, &x_axis, &y_axis, config);
    draw_title(&mut canvas, &area, &title, config);
    if plot.colorbar {
        draw_colorbar(&mut canvas, &area, &z_axis, cmap, config);
    }

    Ok(canvas.finish_svg())
}

fn edge_range(edges: &[f64]) -> (f64, f64) {
    match (edges.first(), edges.last()) {
        (Some(&lo), Some(&hi)) => (lo, hi),
        _ => (0.0, 1.0),
    }
}

fn draw_colorbar(canvas: &mut Canvas, area: &PlotArea, z_axis: &Axis, cmap: Colormap, config: &VizConfig) {
    let x = area.right() + COLORBAR_GAP;
    let steps = 64;
    let h = area.height / steps as f64;
    for i in 0..steps {
        // i = 0 is the top of the bar.
        let t = 1.0 - (i as f64 + 0.5) / steps as f64;
        let y = area.top + i as f64 * h;
        canvas.rect(x, y, COLORBAR_WIDTH, h + 0.5, &Style::filled(cmap.at(t)));
    }
    canvas.rect(x, area.top, COLORBAR_WIDTH, area.height, &Style::stroked(Color::BLACK, 0.75));

    let tick_line = LineStyle::solid(Color::BLACK, 0.6);
    let label_style = TextStyle {
        size: config.font.tick_size,
        anchor: TextAnchor::Start,
        baseline: TextBaseline::Central,
        ..Default::default()
    };
    for (val, label) in z_axis.tick_positions.iter().zip(&z_axis.tick_labels) {
        let py = z_axis.data_to_pixel(*val, area.bottom(), area.top);
        if py < area.top - 0.5 || py > area.bottom() + 0.5 {
            continue;
        }
        canvas.line(x + COLORBAR_WIDTH - 4.0, py, x + COLORBAR_WIDTH, py, &tick_line);
        canvas.text(x + COLORBAR_WIDTH + 4.0, py, label, &label_style);
    }
}
