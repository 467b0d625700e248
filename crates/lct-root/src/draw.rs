//! `TTree::Draw` request strings.
//!
//! ```text
//! varexp
//! varexp>>name
//! varexp>>name(nbins, low, high)
//! y:x>>name(nx, xlow, xhigh, ny, ylow, yhigh)
//! ```

use std::fmt;

use crate::error::{Result, RootError};

/// Uniform binning of one axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Binning {
    /// Number of bins.
    pub n_bins: usize,
    /// Lower edge of the first bin.
    pub low: f64,
    /// Upper edge of the last bin.
    pub high: f64,
}

impl Binning {
    /// Validated binning.
    pub fn new(n_bins: usize, low: f64, high: f64) -> Result<Self> {
        if n_bins == 0 || !low.is_finite() || !high.is_finite() || high <= low {
            return Err(RootError::HistogramFill(format!(
                "invalid binning ({n_bins}, {low}, {high})"
            )));
        }
        Ok(Self { n_bins, low, high })
    }

    /// The `n_bins + 1` bin edges.
    pub fn edges(&self) -> Vec<f64> {
        let width = (self.high - self.low) / self.n_bins as f64;
        (0..=self.n_bins)
            .map(|i| if i == self.n_bins { self.high } else { self.low + width * i as f64 })
            .collect()
    }
}

/// A parsed draw request.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawRequest {
    /// Expression on the x axis.
    pub x: String,
    /// Expression on the y axis, for 2-D requests.
    pub y: Option<String>,
    /// Target histogram name, if given.
    pub target: Option<String>,
    /// x binning, if given.
    pub x_binning: Option<Binning>,
    /// y binning, if given with a 2-D request.
    pub y_binning: Option<Binning>,
}

impl DrawRequest {
    /// A 1-D request with explicit binning.
    pub fn hist1d(expr: impl Into<String>, name: impl Into<String>, binning: Binning) -> Self {
        Self {
            x: expr.into(),
            y: None,
            target: Some(name.into()),
            x_binning: Some(binning),
            y_binning: None,
        }
    }

    /// A 2-D request (`y` versus `x`) with explicit binning.
    pub fn hist2d(
        x: impl Into<String>,
        y: impl Into<String>,
        name: impl Into<String>,
        x_binning: Binning,
        y_binning: Binning,
    ) -> Self {
        Self {
            x: x.into(),
            y: Some(y.into()),
            target: Some(name.into()),
            x_binning: Some(x_binning),
            y_binning: Some(y_binning),
        }
    }

    /// Whether this request fills a 2-D histogram.
    pub fn is_2d(&self) -> bool {
        self.y.is_some()
    }

    /// Target name, or ROOT's default `htemp`.
    pub fn name(&self) -> &str {
        self.target.as_deref().unwrap_or("htemp")
    }

    /// Parse a request string.
    pub fn parse(input: &str) -> Result<Self> {
        let (varexp, target) = match input.rfind(">>") {
            Some(at) => (&input[..at], Some(input[at + 2..].trim())),
            None => (input, None),
        };

        let dims = split_dimensions(varexp);
        let (x, y) = match dims.as_slice() {
            [x] => (x.to_string(), None),
            [y, x] => (x.to_string(), Some(y.to_string())),
            _ => {
                return Err(RootError::HistogramFill(format!(
                    "'{varexp}': expected one or two dimensions, found {}",
                    dims.len()
                )));
            }
        };
        if x.is_empty() || y.as_deref() == Some("") {
            return Err(RootError::HistogramFill(format!("'{input}': empty expression")));
        }

        let mut req = Self { x, y, target: None, x_binning: None, y_binning: None };
        let Some(target) = target else {
            return Ok(req);
        };

        let (name, args) = match target.find('(') {
            Some(open) => {
                let inner = target[open + 1..].strip_suffix(')').ok_or_else(|| {
                    RootError::HistogramFill(format!("'{target}': missing ')'"))
                })?;
                (target[..open].trim(), Some(parse_numbers(inner)?))
            }
            None => (target, None),
        };
        if name.is_empty() {
            return Err(RootError::HistogramFill(format!("'{input}': missing histogram name")));
        }
        req.target = Some(name.to_string());

        match (args.as_deref(), req.is_2d()) {
            (None, _) => {}
            (Some(&[n, lo, hi]), _) => req.x_binning = Some(Binning::new(bin_count(n)?, lo, hi)?),
            (Some(&[nx, xlo, xhi, ny, ylo, yhi]), true) => {
                req.x_binning = Some(Binning::new(bin_count(nx)?, xlo, xhi)?);
                req.y_binning = Some(Binning::new(bin_count(ny)?, ylo, yhi)?);
            }
            (Some(other), _) => {
                return Err(RootError::HistogramFill(format!(
                    "'{target}': {} binning parameters do not fit a {}-D request",
                    other.len(),
                    if req.is_2d() { 2 } else { 1 }
                )));
            }
        }
        Ok(req)
    }
}

impl fmt::Display for DrawRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.y {
            Some(y) => write!(f, "{y}:{}", self.x)?,
            None => f.write_str(&self.x)?,
        }
        if let Some(name) = &self.target {
            write!(f, ">>{name}")?;
        }
        match (self.x_binning, self.y_binning) {
            (Some(x), Some(y)) => write!(
                f,
                "({}, {}, {}, {}, {}, {})",
                x.n_bins, x.low, x.high, y.n_bins, y.low, y.high
            ),
            (Some(x), None) => write!(f, "({}, {}, {})", x.n_bins, x.low, x.high),
            _ => Ok(()),
        }
    }
}

/// Split `y:x` on colons outside parentheses, leaving `::` alone.
fn split_dimensions(varexp: &str) -> Vec<&str> {
    let b = varexp.as_bytes();
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    let mut i = 0;
    while i < b.len() {
        match b[i] {
            b'(' => depth += 1,
            b')' => depth = depth.saturating_sub(1),
            b':' if b.get(i + 1) == Some(&b':') => i += 1,
            b':' if depth == 0 => {
                parts.push(varexp[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
        i += 1;
    }
    parts.push(varexp[start..].trim());
    parts
}

fn parse_numbers(s: &str) -> Result<Vec<f64>> {
    s.split(',')
        .map(|p| {
            let p = p.trim();
            p.parse::<f64>().map_err(|_| {
                RootError::HistogramFill(format!("invalid binning parameter '{p}'"))
            })
        })
        .collect()
}

fn bin_count(v: f64) -> Result<usize> {
    if v >= 1.0 && v.fract() == 0.0 {
        Ok(v as usize)
    } else {
        Err(RootError::HistogramFill(format!("bin count {v} is not a positive integer")))
    }
}
