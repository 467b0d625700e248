//! Axis ranges, tick placement and the data-to-pixel transform.

/// Smallest value a log axis will map; keeps `log10` finite.
const LOG_FLOOR: f64 = 1e-20;

/// Minor ticks subdivide each major interval into this many parts.
const MINOR_PER_MAJOR: i64 = 5;

/// Upper bounds of the mantissa for each tick step multiplier.
const STEP_CHOICES: [(f64, f64); 3] = [(1.5, 1.0), (3.5, 2.0), (7.5, 5.0)];

#[derive(Debug, Clone)]
pub struct Axis {
    pub min: f64,
    pub max: f64,
    pub log: bool,
    pub label: String,
    pub tick_positions: Vec<f64>,
    pub tick_labels: Vec<String>,
    pub minor_ticks: Vec<f64>,
}

impl Axis {
    /// Linear axis whose limits are widened outward to multiples of the tick step.
    pub fn auto_linear(data_min: f64, data_max: f64, target_ticks: usize) -> Self {
        if degenerate(data_min, data_max) {
            return Self::stepped(data_min - 1.0, data_max + 1.0, 1.0);
        }
        let step = tick_step(data_max - data_min, target_ticks);
        Self::stepped((data_min / step).floor() * step, (data_max / step).ceil() * step, step)
    }

    /// Linear axis over exactly `[min, max]`, with ticks wherever the step lands inside.
    pub fn linear(min: f64, max: f64, target_ticks: usize) -> Self {
        let step = if degenerate(min, max) { 1.0 } else { tick_step(max - min, target_ticks) };
        if max > min { Self::stepped(min, max, step) } else { Self::stepped(min - 1.0, min + 1.0, step) }
    }

    /// Logarithmic axis covering whole decades, at least one.
    pub fn auto_log(data_min: f64, data_max: f64) -> Self {
        let lo = data_min.max(LOG_FLOOR);
        let first = lo.log10().floor() as i32;
        let last = (data_max.max(lo).log10().ceil() as i32).max(first + 1);

        let tick_positions: Vec<f64> = (first..=last).map(|e| 10f64.powi(e)).collect();
        let tick_labels = (first..=last).map(|e| format!("10{}", superscript(e))).collect();
        let minor_ticks = tick_positions[..tick_positions.len() - 1]
            .iter()
            .flat_map(|&decade| (2..10).map(move |m| f64::from(m) * decade))
            .collect();

        Self {
            min: 10f64.powi(first),
            max: 10f64.powi(last),
            log: true,
            label: String::new(),
            tick_positions,
            tick_labels,
            minor_ticks,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Pixel coordinate of `value` for an axis drawn from `px_min` to `px_max`.
    ///
    /// On a log axis non-positive values land beyond `px_min`.
    pub fn data_to_pixel(&self, value: f64, px_min: f64, px_max: f64) -> f64 {
        px_min + self.unit_position(value) * (px_max - px_min)
    }

    /// Position of `value` along the axis, clamped to `[0, 1]`.
    pub fn fraction(&self, value: f64) -> f64 {
        self.unit_position(value).clamp(0.0, 1.0)
    }

    fn unit_position(&self, value: f64) -> f64 {
        if !self.log {
            return (value - self.min) / (self.max - self.min);
        }
        if value <= 0.0 {
            return -1.0;
        }
        let (lo, hi) = (self.min.max(LOG_FLOOR).log10(), self.max.max(LOG_FLOOR).log10());
        (value.log10() - lo) / (hi - lo)
    }

    fn stepped(min: f64, max: f64, step: f64) -> Self {
        let tol = step * 1e-6;
        let tick_positions: Vec<f64> = multiples(min, max, step, tol)
            .map(|(_, v)| if v.abs() < tol { 0.0 } else { v })
            .collect();
        let tick_labels = tick_positions.iter().map(|&v| linear_label(v, step)).collect();
        let minor_ticks = multiples(min, max, step / MINOR_PER_MAJOR as f64, tol)
            .filter(|(k, _)| k % MINOR_PER_MAJOR != 0)
            .map(|(_, v)| v)
            .collect();

        Self { min, max, log: false, label: String::new(), tick_positions, tick_labels, minor_ticks }
    }
}

fn degenerate(lo: f64, hi: f64) -> bool {
    (hi - lo).abs() < 1e-15
}

/// `(k, k * step)` for every multiple of `step` in `[min, max + tol]`.
fn multiples(min: f64, max: f64, step: f64, tol: f64) -> impl Iterator<Item = (i64, f64)> {
    let first = (min / step - 1e-9).ceil() as i64;
    (first..).map(move |k| (k, k as f64 * step)).take_while(move |&(_, v)| v <= max + tol)
}

/// A 1, 2 or 5 times power-of-ten step giving roughly `target_ticks` ticks over `range`.
fn tick_step(range: f64, target_ticks: usize) -> f64 {
    let rough = range / (target_ticks.max(2) - 1) as f64;
    let magnitude = 10f64.powf(rough.abs().log10().floor());
    let mantissa = rough / magnitude;
    let multiplier = STEP_CHOICES
        .iter()
        .find(|(bound, _)| mantissa <= *bound)
        .map_or(10.0, |&(_, m)| m);
    multiplier * magnitude
}

fn linear_label(value: f64, step: f64) -> String {
    let decimals = if step < 1.0 { (-step.log10().floor()) as usize } else { 0 };
    let text = format!("{value:.decimals$}");
    match text.strip_prefix('-') {
        Some(digits) => format!("\u{2212}{digits}"),
        None => text,
    }
}

fn superscript(exponent: i32) -> String {
    const DIGITS: [char; 10] = ['⁰', '¹', '²', '³', '⁴', '⁵', '⁶', '⁷', '⁸', '⁹'];
    exponent
        .to_string()
        .chars()
        .map(|c| match c.to_digit(10) {
            Some(d) => DIGITS[d as usize],
            None if c == '-' => '⁻',
            None => c,
        })
        .collect()
}
