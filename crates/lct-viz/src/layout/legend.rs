use crate::canvas::Canvas;
use crate::color::Color;
use crate::layout::margins::PlotArea;
use crate::primitives::*;

pub struct LegendEntry {
    pub label: String,
    pub color: Color,
    pub line_width: f64,
}

/// Corner of the plot area the legend is anchored to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegendCorner {
    TopLeft,
    TopRight,
}

/// Draw a line-swatch legend in a top corner of the plot area.
pub fn draw_legend(
    canvas: &mut Canvas,
    area: &PlotArea,
    entries: &[LegendEntry],
    font_size: f64,
    corner: LegendCorner,
) {
    if entries.is_empty() {
        return;
    }

    let row_height = font_size + 6.0;
    let swatch_w = 2.0 * font_size;
    let gap = 6.0;
    let padding = 8.0;

    let text_style = TextStyle { size: font_size, baseline: TextBaseline::Central, ..Default::default() };

    let max_w = entries
        .iter()
        .map(|e| canvas.measure_text(&e.label, &text_style).width)
        .fold(0.0_f64, f64::max);

    let legend_w = padding + swatch_w + gap + max_w + padding;
    let legend_h = padding + entries.len() as f64 * row_height + padding;

    let lx = match corner {
        LegendCorner::TopRight => area.right() - legend_w - 8.0,
        LegendCorner::TopLeft => area.left + 8.0,
    };
    let ly = area.top + 8.0;

    let bg_style = Style::boxed(Color::rgba(255, 255, 255, 0.8), Color::rgb(210, 210, 210), 0.5);
    canvas.rect(lx, ly, legend_w, legend_h, &bg_style);

    for (i, entry) in entries.iter().enumerate() {
        let ey = ly + padding + i as f64 * row_height + row_height / 2.0;
        let sx = lx + padding;
        canvas.line(sx, ey, sx + swatch_w, ey, &LineStyle::solid(entry.color, entry.line_width));
        canvas.text(sx + swatch_w + gap, ey, &entry.label, &text_style);
    }
}
