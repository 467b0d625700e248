//! Filled 1-D and 2-D histograms.

use crate::draw::Binning;

/// A 1-D histogram with uniform bins.
#[derive(Debug, Clone, PartialEq)]
pub struct Hist1D {
    /// Histogram name.
    pub name: String,
    /// `n_bins + 1` edges.
    pub edges: Vec<f64>,
    /// Sum of weights per bin.
    pub contents: Vec<f64>,
    /// Sum of squared weights per bin.
    pub sumw2: Vec<f64>,
    /// Sum of weights below the first edge.
    pub underflow: f64,
    /// Sum of weights at or above the last edge.
    pub overflow: f64,
    /// Number of fills, under- and overflow included.
    pub entries: u64,
    binning: Binning,
    sum_w: f64,
    sum_wx: f64,
    sum_wx2: f64,
}

impl Hist1D {
    /// Empty histogram.
    pub fn new(name: impl Into<String>, binning: Binning) -> Self {
        Self {
            name: name.into(),
            edges: binning.edges(),
            contents: vec![0.0; binning.n_bins],
            sumw2: vec![0.0; binning.n_bins],
            underflow: 0.0,
            overflow: 0.0,
            entries: 0,
            binning,
            sum_w: 0.0,
            sum_wx: 0.0,
            sum_wx2: 0.0,
        }
    }

    /// Binning of the x axis.
    pub fn binning(&self) -> Binning {
        self.binning
    }

    /// Number of bins.
    pub fn n_bins(&self) -> usize {
        self.contents.len()
    }

    /// Add `x` with weight `w`. NaN values are ignored.
    pub fn fill(&mut self, x: f64, w: f64) {
        if x.is_nan() {
            return;
        }
        self.entries += 1;
        match bin_index(&self.binning, x) {
            Slot::Under => self.underflow += w,
            Slot::Over => self.overflow += w,
            Slot::Bin(i) => {
                self.contents[i] += w;
                self.sumw2[i] += w * w;
                self.sum_w += w;
                self.sum_wx += w * x;
                self.sum_wx2 += w * x * x;
            }
        }
    }

    /// Sum of in-range weights.
    pub fn integral(&self) -> f64 {
        self.contents.iter().sum()
    }

    /// Weighted mean of the in-range fills, `0` when empty.
    pub fn mean(&self) -> f64 {
        if self.sum_w == 0.0 { 0.0 } else { self.sum_wx / self.sum_w }
    }

    /// Weighted standard deviation of the in-range fills, `0` when empty.
    pub fn std_dev(&self) -> f64 {
        if self.sum_w == 0.0 {
            return 0.0;
        }
        let mean = self.mean();
        (self.sum_wx2 / self.sum_w - mean * mean).max(0.0).sqrt()
    }

    /// Centers of the bins.
    pub fn centers(&self) -> Vec<f64> {
        self.edges.windows(2).map(|w| 0.5 * (w[0] + w[1])).collect()
    }
}

/// A 2-D histogram with uniform bins. Contents are row-major: `iy * nx + ix`.
#[derive(Debug, Clone, PartialEq)]
pub struct Hist2D {
    /// Histogram name.
    pub name: String,
    /// x edges.
    pub x_edges: Vec<f64>,
    /// y edges.
    pub y_edges: Vec<f64>,
    /// Sum of weights per cell.
    pub contents: Vec<f64>,
    /// Number of fills, out-of-range included.
    pub entries: u64,
    x_binning: Binning,
    y_binning: Binning,
}

impl Hist2D {
    /// Empty histogram.
    pub fn new(name: impl Into<String>, x_binning: Binning, y_binning: Binning) -> Self {
        Self {
            name: name.into(),
            x_edges: x_binning.edges(),
            y_edges: y_binning.edges(),
            contents: vec![0.0; x_binning.n_bins * y_binning.n_bins],
            entries: 0,
            x_binning,
            y_binning,
        }
    }

    /// Number of x bins.
    pub fn nx(&self) -> usize {
        self.x_binning.n_bins
    }

    /// Number of y bins.
    pub fn ny(&self) -> usize {
        self.y_binning.n_bins
    }

    /// Add `(x, y)` with weight `w`. Out-of-range points count as entries only.
    pub fn fill(&mut self, x: f64, y: f64, w: f64) {
        if x.is_nan() || y.is_nan() {
            return;
        }
        self.entries += 1;
        if let (Slot::Bin(ix), Slot::Bin(iy)) =
            (bin_index(&self.x_binning, x), bin_index(&self.y_binning, y))
        {
            let nx = self.nx();
            self.contents[iy * nx + ix] += w;
        }
    }

    /// Content of cell `(ix, iy)`.
    pub fn get(&self, ix: usize, iy: usize) -> f64 {
        self.contents[iy * self.nx() + ix]
    }

    /// Largest cell content.
    pub fn max_content(&self) -> f64 {
        self.contents.iter().copied().fold(0.0, f64::max)
    }

    /// Smallest positive cell content, if any cell is filled.
    pub fn min_positive(&self) -> Option<f64> {
        self.contents.iter().copied().filter(|&c| c > 0.0).reduce(f64::min)
    }
}

enum Slot {
    Under,
    Over,
    Bin(usize),
}

fn bin_index(b: &Binning, x: f64) -> Slot {
    if x < b.low {
        return Slot::Under;
    }
    if x >= b.high {
        return Slot::Over;
    }
    let i = ((x - b.low) / (b.high - b.low) * b.n_bins as f64) as usize;
    Slot::Bin(i.min(b.n_bins - 1))
}
