use lct_root::Hist1D;

use crate::canvas::Canvas;
use crate::color::Color;
use crate::config::VizConfig;
use crate::layout::margins::PlotArea;
use crate::primitives::*;

/// Rows of a ROOT-style statistics box: name, entries, mean, std. dev.
pub fn stats_rows(hist: &Hist1D) -> Vec<(String, String)> {
    vec![
        ("Entries".into(), hist.entries.to_string()),
        ("Mean".into(), format_g(hist.mean(), 4)),
        ("Std Dev".into(), format_g(hist.std_dev(), 4)),
    ]
}

/// Draw the statistics box in the top-right corner of the plot area.
pub(crate) fn draw_stats_box(canvas: &mut Canvas, area: &PlotArea, hist: &Hist1D, config: &VizConfig) {
    let size = config.font.tick_size * 0.85;
    let row_h = size * 1.45;
    let rows = stats_rows(hist);

    let key_style = TextStyle { size, baseline: TextBaseline::Central, ..Default::default() };
    let value_style = TextStyle { anchor: TextAnchor::End, ..key_style };
    let name_style = TextStyle { anchor: TextAnchor::Middle, ..key_style };

    let widest = rows
        .iter()
        .map(|(k, v)| canvas.measure_text(k, &key_style).width + canvas.measure_text(v, &value_style).width)
        .chain(std::iter::once(canvas.measure_text(&hist.name, &name_style).width))
        .fold(0.0_f64, f64::max);
    let w = widest + 3.0 * size;
    let h = row_h * (rows.len() + 1) as f64 + 4.0;
    let x = area.right() - w;
    let y = area.top;

    canvas.rect(
        x,
        y,
        w,
        h,
        &Style::boxed(Color::WHITE, Color::BLACK, 0.75),
    );
    canvas.text(x + w / 2.0, y + 2.0 + row_h / 2.0, &hist.name, &name_style);
    canvas.line(x, y + row_h + 2.0, x + w, y + row_h + 2.0, &LineStyle::solid(Color::BLACK, 0.5));
    for (i, (key, value)) in rows.iter().enumerate() {
        let ry = y + 2.0 + row_h * (i as f64 + 1.5);
        canvas.text(x + 0.5 * size, ry, key, &key_style);
        canvas.text(x + w - 0.5 * size, ry, value, &value_style);
    }
}

/// Format like C's `%.{sig}g`: `sig` significant digits, trailing zeros dropped.
pub fn format_g(v: f64, sig: usize) -> String {
    if v == 0.0 || !v.is_finite() {
        return if v.is_nan() { "NaN".into() } else if v == 0.0 { "0".into() } else { format!("{v}") };
    }
    let sig = sig.max(1);
    let exp = v.abs().log10().floor() as i32;
    if exp < -4 || exp >= sig as i32 {
        let s = format!("{:.*e}", sig - 1, v);
        return match s.split_once('e') {
            Some((mantissa, e)) => format!("{}e{e}", trim_zeros(mantissa)),
            None => s,
        };
    }
    let decimals = (sig as i32 - 1 - exp).max(0) as usize;
    trim_zeros(&format!("{v:.decimals$}")).to_string()
}

fn trim_zeros(s: &str) -> &str {
    if s.contains('.') { s.trim_end_matches('0').trim_end_matches('.') } else { s }
}
