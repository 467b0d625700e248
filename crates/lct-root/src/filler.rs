//! `TTree::Draw`-style histogram filling over a [`ColumnSource`].
//!
//! Each entry contributes once when every referenced column is scalar. When
//! jagged columns are referenced, the formulas are evaluated per instance for
//! the shortest of those columns' lengths in that entry, with scalar columns
//! broadcast. A nonzero selection value is the fill weight.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use crate::column::{Column, ColumnSource};
use crate::draw::{Binning, DrawRequest};
use crate::error::{Result, RootError};
use crate::expr::CompiledExpr;
use crate::hist::{Hist1D, Hist2D};

/// Bins used when a request gives no binning.
const DEFAULT_BINS: usize = 100;

/// A filled histogram of either dimension.
#[derive(Debug, Clone, PartialEq)]
pub enum Filled {
    /// 1-D result.
    One(Hist1D),
    /// 2-D result.
    Two(Hist2D),
}

impl Filled {
    /// Histogram name.
    pub fn name(&self) -> &str {
        match self {
            Filled::One(h) => &h.name,
            Filled::Two(h) => &h.name,
        }
    }

    /// Number of fills.
    pub fn entries(&self) -> u64 {
        match self {
            Filled::One(h) => h.entries,
            Filled::Two(h) => h.entries,
        }
    }
}

/// Fill the histogram described by `request`, keeping entries that pass `selection`.
///
/// An empty (or all-whitespace) selection keeps every entry with weight 1.
pub fn draw(source: &dyn ColumnSource, request: &DrawRequest, selection: &str) -> Result<Filled> {
    let mut formulas = vec![CompiledExpr::compile(&request.x)?];
    if let Some(y) = &request.y {
        formulas.push(CompiledExpr::compile(y)?);
    }
    let selection = selection.trim();
    let cut = if selection.is_empty() { None } else { Some(CompiledExpr::compile(selection)?) };

    let table = Table::load(source, formulas.iter().chain(cut.as_ref()))?;
    let points = table.evaluate(&formulas, cut.as_ref());
    log::debug!("{request}: {} points from {} entries", points.len(), table.n_entries);

    let name = request.name();
    match request.y {
        None => {
            let binning = match request.x_binning {
                Some(b) => b,
                None => auto_binning(points.iter().map(|p| p.x))?,
            };
            let mut h = Hist1D::new(name, binning);
            for p in &points {
                h.fill(p.x, p.w);
            }
            Ok(Filled::One(h))
        }
        Some(_) => {
            let xb = match request.x_binning {
                Some(b) => b,
                None => auto_binning(points.iter().map(|p| p.x))?,
            };
            let yb = match request.y_binning {
                Some(b) => b,
                None => auto_binning(points.iter().map(|p| p.y))?,
            };
            let mut h = Hist2D::new(name, xb, yb);
            for p in &points {
                h.fill(p.x, p.y, p.w);
            }
            Ok(Filled::Two(h))
        }
    }
}

/// Filled histograms by name.
#[derive(Debug, Clone, Default)]
pub struct HistogramRegistry {
    hists: BTreeMap<String, Filled>,
}

impl HistogramRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `request`, fill it and store the result under its target name,
    /// replacing any histogram of that name.
    pub fn draw(
        &mut self,
        source: &dyn ColumnSource,
        request: &str,
        selection: &str,
    ) -> Result<&Filled> {
        let req = DrawRequest::parse(request)?;
        Ok(self.insert(draw(source, &req, selection)?))
    }

    /// Store a histogram under its own name, replacing any previous one.
    pub fn insert(&mut self, filled: Filled) -> &Filled {
        match self.hists.entry(filled.name().to_string()) {
            Entry::Occupied(mut slot) => {
                slot.insert(filled);
                slot.into_mut()
            }
            Entry::Vacant(slot) => slot.insert(filled),
        }
    }

    /// Look up a histogram by name.
    pub fn get(&self, name: &str) -> Option<&Filled> {
        self.hists.get(name)
    }

    /// Look up a 1-D histogram by name.
    pub fn get_1d(&self, name: &str) -> Option<&Hist1D> {
        match self.hists.get(name)? {
            Filled::One(h) => Some(h),
            Filled::Two(_) => None,
        }
    }

    /// Look up a 2-D histogram by name.
    pub fn get_2d(&self, name: &str) -> Option<&Hist2D> {
        match self.hists.get(name)? {
            Filled::Two(h) => Some(h),
            Filled::One(_) => None,
        }
    }

    /// Stored names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.hists.keys().map(String::as_str)
    }

    /// Number of stored histograms.
    pub fn len(&self) -> usize {
        self.hists.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.hists.is_empty()
    }
}

struct Point {
    x: f64,
    y: f64,
    w: f64,
}

/// The columns referenced by a set of formulas, in a shared slot order.
struct Table {
    names: Vec<String>,
    columns: Vec<Column>,
    n_entries: usize,
}

impl Table {
    fn load<'e>(
        source: &dyn ColumnSource,
        exprs: impl Iterator<Item = &'e CompiledExpr>,
    ) -> Result<Self> {
        let mut names: Vec<String> = Vec::new();
        for e in exprs {
            for v in e.variables() {
                if !names.contains(v) {
                    names.push(v.clone());
                }
            }
        }
        let n_entries = source.n_entries();
        let columns = names
            .iter()
            .map(|name| {
                let col = source.read_column(name)?;
                if col.n_entries() != n_entries {
                    return Err(RootError::HistogramFill(format!(
                        "column '{name}' has {} entries, table has {n_entries}",
                        col.n_entries()
                    )));
                }
                Ok(col)
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { names, columns, n_entries })
    }

    fn slots(&self, expr: &CompiledExpr) -> Vec<usize> {
        expr.variables()
            .iter()
            .map(|v| self.names.iter().position(|n| n == v).unwrap_or(0))
            .collect()
    }

    fn evaluate(&self, formulas: &[CompiledExpr], cut: Option<&CompiledExpr>) -> Vec<Point> {
        let formula_slots: Vec<Vec<usize>> = formulas.iter().map(|f| self.slots(f)).collect();
        let cut_slots = cut.map(|c| self.slots(c));
        let mut row = vec![0.0; self.columns.len()];
        let mut args = Vec::new();
        let mut out = Vec::new();

        for entry in 0..self.n_entries {
            let instances = self
                .columns
                .iter()
                .filter_map(|c| match c {
                    Column::Jagged(j) => Some(j.row(entry).len()),
                    Column::Scalar(_) => None,
                })
                .min()
                .unwrap_or(1);

            for k in 0..instances {
                for (slot, col) in row.iter_mut().zip(&self.columns) {
                    *slot = match col {
                        Column::Scalar(v) => v[entry],
                        Column::Jagged(j) => j.row(entry)[k],
                    };
                }
                let w = match (cut, &cut_slots) {
                    (Some(c), Some(s)) => eval_bound(c, s, &row, &mut args),
                    _ => 1.0,
                };
                if w == 0.0 || w.is_nan() {
                    continue;
                }
                let x = eval_bound(&formulas[0], &formula_slots[0], &row, &mut args);
                let y = match formulas.get(1) {
                    Some(f) => eval_bound(f, &formula_slots[1], &row, &mut args),
                    None => 0.0,
                };
                if x.is_nan() || y.is_nan() {
                    continue;
                }
                out.push(Point { x, y, w });
            }
        }
        out
    }
}

fn eval_bound(expr: &CompiledExpr, slots: &[usize], row: &[f64], args: &mut Vec<f64>) -> f64 {
    args.clear();
    args.extend(slots.iter().map(|&s| row[s]));
    expr.eval_row(args)
}

/// ROOT-like automatic range: the data extremes, widened when degenerate.
fn auto_binning(values: impl Iterator<Item = f64>) -> Result<Binning> {
    let (lo, hi) = values
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
    if !lo.is_finite() {
        return Binning::new(DEFAULT_BINS, 0.0, 1.0);
    }
    if lo == hi {
        return Binning::new(DEFAULT_BINS, lo - 1.0, hi + 1.0);
    }
    Binning::new(DEFAULT_BINS, lo, hi + (hi - lo) / DEFAULT_BINS as f64 * 1e-3)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::branch_reader::JaggedCol;
    use approx::assert_relative_eq;
    use std::collections::HashMap;

    struct MemSource(HashMap<String, Column>, usize);

    impl ColumnSource for MemSource {
        fn n_entries(&self) -> usize {
            self.1
        }
        fn column_names(&self) -> Vec<String> {
            self.0.keys().cloned().collect()
        }
        fn read_column(&self, name: &str) -> Result<Column> {
            self.0.get(name).cloned().ok_or_else(|| RootError::BranchNotFound(name.to_string()))
        }
    }

    fn tuple() -> MemSource {
        let mut cols = HashMap::new();
        cols.insert("nvt".into(), Column::Scalar(vec![1.0, 2.0, 0.0]));
        cols.insert(
            "vtxxx".into(),
            Column::Jagged(JaggedCol::from_rows([vec![1e-6], vec![2e-6, -3e-6], vec![]])),
        );
        cols.insert(
            "mcpdg".into(),
            Column::Jagged(JaggedCol::from_rows([vec![13.0, -13.0], vec![13.0], vec![22.0]])),
        );
        MemSource(cols, 3)
    }

    #[test]
    fn jagged_instances_are_all_filled() {
        let req = DrawRequest::parse("vtxxx*1000000>>h_vtxxx(10, -5, 5)").unwrap();
        let Filled::One(h) = draw(&tuple(), &req, "").unwrap() else { panic!("expected 1-D") };
        assert_eq!(h.entries, 3);
        assert_relative_eq!(h.mean(), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn selection_uses_shortest_jagged_length() {
        let req = DrawRequest::parse("vtxxx*1000000>>h(10, -5, 5)").unwrap();
        // entry 0: one instance (min(1, 2)); entry 1: one instance; entry 2: none.
        let Filled::One(h) = draw(&tuple(), &req, "mcpdg==13").unwrap() else {
            panic!("expected 1-D")
        };
        assert_eq!(h.entries, 2);
        assert_relative_eq!(h.mean(), 1.5, epsilon = 1e-9);
    }

    #[test]
    fn scalar_columns_broadcast() {
        let req = DrawRequest::parse("nvt>>h(4, 0, 4)").unwrap();
        let Filled::One(h) = draw(&tuple(), &req, "").unwrap() else { panic!("expected 1-D") };
        assert_eq!(h.contents, vec![1.0, 1.0, 1.0, 0.0]);

        let Filled::One(h) = draw(&tuple(), &req, "abs(vtxxx) > 0").unwrap() else {
            panic!("expected 1-D")
        };
        // nvt=1 once, nvt=2 twice.
        assert_eq!(h.contents, vec![0.0, 1.0, 2.0, 0.0]);
    }

    #[test]
    fn selection_value_is_the_weight() {
        let req = DrawRequest::parse("nvt>>h(4, 0, 4)").unwrap();
        let Filled::One(h) = draw(&tuple(), &req, "nvt*2").unwrap() else {
            panic!("expected 1-D")
        };
        assert_eq!(h.contents, vec![0.0, 2.0, 4.0, 0.0]);
        assert_eq!(h.entries, 2);
    }

    #[test]
    fn two_dimensional_request() {
        let req = DrawRequest::parse("mcpdg:nvt>>h2(3, 0, 3, 2, 0, 30)").unwrap();
        let Filled::Two(h) = draw(&tuple(), &req, "").unwrap() else { panic!("expected 2-D") };
        assert_eq!(h.entries, 4);
        assert_eq!(h.get(1, 0), 1.0);
        assert_eq!(h.get(2, 0), 1.0);
        assert_eq!(h.get(0, 1), 1.0);
    }

    #[test]
    fn automatic_binning_covers_the_data() {
        let req = DrawRequest::parse("nvt").unwrap();
        let Filled::One(h) = draw(&tuple(), &req, "").unwrap() else { panic!("expected 1-D") };
        assert_eq!(h.name, "htemp");
        assert_eq!(h.n_bins(), DEFAULT_BINS);
        assert_eq!(h.overflow, 0.0);
        assert_eq!(h.integral(), 3.0);
    }

    #[test]
    fn missing_column_and_bad_selection() {
        let req = DrawRequest::parse("nosuch>>h(1, 0, 1)").unwrap();
        assert!(matches!(draw(&tuple(), &req, ""), Err(RootError::BranchNotFound(_))));
        let req = DrawRequest::parse("nvt>>h(1, 0, 1)").unwrap();
        assert!(matches!(draw(&tuple(), &req, "nvt >"), Err(RootError::Expression(_))));
    }

    #[test]
    fn registry_stores_by_target_name() {
        let mut reg = HistogramRegistry::new();
        reg.draw(&tuple(), "nvt>>h_nvt(4, 0, 4)", "").unwrap();
        assert!(reg.get_1d("h_nvt").is_some());
        assert!(reg.get_2d("h_nvt").is_none());
        assert!(reg.get("h_other").is_none());
        assert_eq!(reg.names().collect::<Vec<_>>(), ["h_nvt"]);
    }

    #[test]
    fn redraw_replaces_same_name() {
        let mut reg = HistogramRegistry::new();
        reg.draw(&tuple(), "nvt>>h_nvt(4, 0, 4)", "").unwrap();
        let filled = reg.draw(&tuple(), "nvt>>h_nvt(2, 0, 4)", "nvt > 0").unwrap();
        let Filled::One(h) = filled else { panic!("expected 1-D") };
        assert_eq!(h.contents.len(), 2);
        assert_eq!(reg.len(), 1);
        assert_eq!(reg.get_1d("h_nvt").unwrap().entries, 2);
    }
}
