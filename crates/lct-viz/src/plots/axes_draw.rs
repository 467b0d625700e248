use crate::canvas::Canvas;
use crate::color::Color;
use crate::config::VizConfig;
use crate::layout::axes::Axis;
use crate::layout::margins::PlotArea;
use crate::primitives::*;

#[derive(Clone, Copy)]
enum Edge {
    Bottom,
    Top,
    Left,
    Right,
}

impl Edge {
    /// Tick mark at `at` along this edge; positive `len` points away from the plot area.
    fn tick(self, canvas: &mut Canvas, area: &PlotArea, at: f64, len: f64, style: &LineStyle) {
        let (x0, y0, x1, y1) = match self {
            Self::Bottom => (at, area.bottom(), at, area.bottom() + len),
            Self::Top => (at, area.top, at, area.top - len),
            Self::Left => (area.left, at, area.left - len, at),
            Self::Right => (area.right(), at, area.right() + len, at),
        };
        canvas.line(x0, y0, x1, y1, style);
    }
}

/// Major tick values paired with their labels, if any.
fn major_ticks(axis: &Axis) -> impl Iterator<Item = (f64, Option<&String>)> {
    let labels = axis.tick_labels.iter().map(Some).chain(std::iter::repeat(None));
    axis.tick_positions.iter().copied().zip(labels)
}

/// Frame, ticks, optional grid, tick labels and axis titles around `area`.
pub(crate) fn draw_axes(
    canvas: &mut Canvas,
    area: &PlotArea,
    x_axis: &Axis,
    y_axis: &Axis,
    config: &VizConfig,
) {
    let ax = &config.axes;
    let frame = LineStyle::solid(Color::BLACK, ax.frame_width);
    let tick_line = LineStyle::solid(Color::BLACK, 0.75 * ax.frame_width);
    let grid = LineStyle::dashed(config.grid.color.with_alpha(config.grid.alpha), 0.5, 3.0, 3.0);
    let inward = ax.tick_direction == "in";
    let sign = if inward { -1.0 } else { 1.0 };
    // Outward ticks push the labels away by one tick length.
    let label_gap = if inward { 0.0 } else { ax.tick_length };

    let (l, t, r, b) = (area.left, area.top, area.right(), area.bottom());
    for (x0, y0, x1, y1) in [(l, t, r, t), (l, b, r, b), (l, t, l, b), (r, t, r, b)] {
        canvas.line(x0, y0, x1, y1, &frame);
    }

    let x_px = |v: f64| x_axis.data_to_pixel(v, l, r);
    let y_px = |v: f64| y_axis.data_to_pixel(v, b, t);
    let on_x = |px: f64| (l - 0.5..=r + 0.5).contains(&px);
    let on_y = |py: f64| (t - 0.5..=b + 0.5).contains(&py);
    let x_edges: &[Edge] = if ax.show_top_ticks { &[Edge::Bottom, Edge::Top] } else { &[Edge::Bottom] };
    let y_edges: &[Edge] = if ax.show_right_ticks { &[Edge::Left, Edge::Right] } else { &[Edge::Left] };

    let x_labels = TextStyle {
        size: config.font.tick_size,
        anchor: TextAnchor::Middle,
        baseline: TextBaseline::Hanging,
        ..Default::default()
    };
    for (px, label) in major_ticks(x_axis).map(|(v, label)| (x_px(v), label)).filter(|(px, _)| on_x(*px)) {
        if config.grid.show {
            canvas.line(px, t, px, b, &grid);
        }
        for edge in x_edges {
            edge.tick(canvas, area, px, sign * ax.tick_length, &tick_line);
        }
        if let Some(label) = label {
            canvas.text(px, b + 4.0 + label_gap, label, &x_labels);
        }
    }
    for px in x_axis.minor_ticks.iter().map(|&v| x_px(v)).filter(|&px| on_x(px)) {
        for edge in x_edges {
            edge.tick(canvas, area, px, sign * ax.minor_tick_length, &tick_line);
        }
    }

    let y_labels = TextStyle {
        size: config.font.tick_size,
        anchor: TextAnchor::End,
        baseline: TextBaseline::Central,
        ..Default::default()
    };
    let mut widest = 0.0_f64;
    for (py, label) in major_ticks(y_axis).map(|(v, label)| (y_px(v), label)).filter(|(py, _)| on_y(*py)) {
        if config.grid.show {
            canvas.line(l, py, r, py, &grid);
        }
        for edge in y_edges {
            edge.tick(canvas, area, py, sign * ax.tick_length, &tick_line);
        }
        if let Some(label) = label {
            canvas.text(l - 5.0 - label_gap, py, label, &y_labels);
            widest = widest.max(canvas.measure_text(label, &y_labels).width);
        }
    }
    for py in y_axis.minor_ticks.iter().map(|&v| y_px(v)).filter(|&py| on_y(py)) {
        for edge in y_edges {
            edge.tick(canvas, area, py, sign * ax.minor_tick_length, &tick_line);
        }
    }

    // Axis titles sit at the far end of each axis, ROOT style.
    let title_style = TextStyle { size: config.font.label_size, anchor: TextAnchor::End, ..Default::default() };
    if !x_axis.label.is_empty() {
        let y = b + config.font.tick_size + config.font.label_size + 10.0 + label_gap;
        canvas.text(r, y, &x_axis.label, &title_style);
    }
    if !y_axis.label.is_empty() {
        let x = l - widest - 12.0 - label_gap;
        canvas.text_rotated(x, t, &y_axis.label, &title_style, -90.0);
    }
}

/// Draw the plot title centred above the plot area.
pub(crate) fn draw_title(canvas: &mut Canvas, area: &PlotArea, title: &str, config: &VizConfig) {
    if title.is_empty() {
        return;
    }
    let style = TextStyle { size: config.font.title_size, anchor: TextAnchor::Middle, ..Default::default() };
    canvas.text(area.left + 0.5 * area.width, area.top - 10.0, title, &style);
}

/// Step outline of a binned histogram, in pixel coordinates.
///
/// The outline starts and ends on the lower axis edge, like ROOT's "HIST"
/// option and mplhep's `histtype="step"`.
pub(crate) fn step_points(
    edges: &[f64],
    contents: &[f64],
    x_axis: &Axis,
    y_axis: &Axis,
    area: &PlotArea,
) -> Vec<(f64, f64)> {
    let x_px = |v: f64| x_axis.data_to_pixel(v, area.left, area.right());
    let y_px = |v: f64| y_axis.data_to_pixel(v, area.bottom(), area.top).min(area.bottom());

    let mut pts = Vec::with_capacity(2 * contents.len() + 2);
    if let Some(&first) = edges.first() {
        pts.push((x_px(first), area.bottom()));
    }
    for (i, &c) in contents.iter().enumerate() {
        let py = y_px(c);
        pts.push((x_px(edges[i]), py));
        pts.push((x_px(edges[i + 1]), py));
    }
    if let Some(&last) = edges.last() {
        pts.push((x_px(last), area.bottom()));
    }
    pts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_outline_closes_on_axis() {
        let area = PlotArea { left: 0.0, top: 0.0, width: 100.0, height: 100.0 };
        let x = Axis::linear(0.0, 2.0, 3);
        let y = Axis::linear(0.0, 10.0, 3);
        let pts = step_points(&[0.0, 1.0, 2.0], &[5.0, 10.0], &x, &y, &area);
        assert_eq!(
            pts,
            vec![(0.0, 100.0), (0.0, 50.0), (50.0, 50.0), (50.0, 0.0), (100.0, 0.0), (100.0, 100.0)]
        );
    }

    #[test]
    fn log_zero_bins_sit_on_the_axis() {
        let area = PlotArea { left: 0.0, top: 0.0, width: 10.0, height: 10.0 };
        let x = Axis::linear(0.0, 1.0, 2);
        let y = Axis::auto_log(1.0, 100.0);
        let pts = step_points(&[0.0, 1.0], &[0.0], &x, &y, &area);
        assert!(pts.iter().all(|&(_, py)| py == 10.0));
    }

    #[test]
    fn axes_and_title_emit_labels() {
        let config = VizConfig::default();
        let mut c = Canvas::new(400.0, 300.0);
        let area = PlotArea { left: 60.0, top: 40.0, width: 300.0, height: 200.0 };
        let x = Axis::linear(-5.0, 5.0, 6).with_label("x [μm]");
        let y = Axis::auto_linear(0.0, 50.0, 6).with_label("Events");
        draw_axes(&mut c, &area, &x, &y, &config);
        draw_title(&mut c, &area, "vtxxx : none", &config);
        let svg = c.finish_svg();
        assert!(svg.contains("x [μm]"));
        assert!(svg.contains("Events"));
        assert!(svg.contains("vtxxx : none"));
        assert!(svg.contains("rotate(-90.0"));
    }
}
