//! Variable and selection tables of the tuple plotter.

use lct_root::{Binning, DrawRequest};

/// Histogram settings for one plottable variable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VariableSpec {
    /// Tuple expression, also the table key.
    pub name: &'static str,
    pub n_bins: usize,
    pub low: f64,
    pub high: f64,
    pub x_label: &'static str,
    pub y_label: &'static str,
    /// Unit conversion applied to the values before filling.
    pub multiplier: Option<f64>,
}

/// A named selection formula. An empty expression selects everything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionSpec {
    pub name: &'static str,
    pub expression: &'static str,
}

const VARIABLES: &[VariableSpec] = &[
    VariableSpec {
        name: "vtxxx",
        n_bins: 50,
        low: -5.0,
        high: 5.0,
        x_label: "Reco PV x-position [#mum]",
        y_label: "Entries/bin",
        multiplier: Some(1e6),
    },
    VariableSpec {
        name: "mcvtx",
        n_bins: 50,
        low: -5.0,
        high: 5.0,
        x_label: "MC x-position [#mum]",
        y_label: "Entries/bin",
        multiplier: Some(1e6),
    },
    VariableSpec {
        name: "vtyyy",
        n_bins: 50,
        low: -5.0,
        high: 5.0,
        x_label: "Reco PV y-position [#mum]",
        y_label: "Entries/bin",
        multiplier: Some(1e6),
    },
    VariableSpec {
        name: "mcpdg",
        n_bins: 50,
        low: -25.0,
        high: 25.0,
        x_label: "MC particle PDG Id",
        y_label: "Entries/bin",
        multiplier: None,
    },
    VariableSpec {
        name: "vtxxx - mcvtx",
        n_bins: 50,
        low: -10.0,
        high: 10.0,
        x_label: "PV x residual",
        y_label: "Entries/bin",
        multiplier: Some(1e6),
    },
    VariableSpec {
        name: "vtzzz",
        n_bins: 48,
        low: -12.0,
        high: 12.0,
        x_label: "PV z-position [mm]",
        y_label: "Entries/bin",
        multiplier: Some(1e3),
    },
];

const SELECTIONS: &[SelectionSpec] = &[
    SelectionSpec { name: "none", expression: "" },
    SelectionSpec { name: "true-muon", expression: "abs(mcpdg)==13" },
    SelectionSpec { name: "mc-pT-cut", expression: "sqrt(mcmox*mcmox + mcmoy*mcmoy) > 1.0" },
    SelectionSpec { name: "muon", expression: "(mcpdg)==13" },
    SelectionSpec {
        name: "true-muon-ptcut",
        expression: "(mcpdg)=13 && (sqrt(mcmox*mcmox + mcmoy*mcmoy) > 1.0)",
    },
];

/// All variables, in table order.
pub fn variables() -> &'static [VariableSpec] {
    VARIABLES
}

/// All selections, in table order.
pub fn selections() -> &'static [SelectionSpec] {
    SELECTIONS
}

pub fn variable(name: &str) -> Option<&'static VariableSpec> {
    VARIABLES.iter().find(|v| v.name == name)
}

pub fn selection(name: &str) -> Option<&'static SelectionSpec> {
    SELECTIONS.iter().find(|s| s.name == name)
}

impl VariableSpec {
    pub fn histogram_name(&self) -> String {
        format!("h_{}", self.name)
    }

    pub fn binning(&self) -> lct_root::Result<Binning> {
        Binning::new(self.n_bins, self.low, self.high)
    }

    /// Filled expression: the variable, scaled when a multiplier is set.
    pub fn expression(&self) -> String {
        match self.multiplier {
            Some(m) if is_identifier(self.name) => format!("{}*{m}", self.name),
            Some(m) => format!("({})*{m}", self.name),
            None => self.name.to_string(),
        }
    }

    /// `<expr>>>h_<name>(<bins>, <low>, <high>)`.
    pub fn draw_request(&self) -> lct_root::Result<String> {
        Ok(DrawRequest::hist1d(self.expression(), self.histogram_name(), self.binning()?).to_string())
    }
}

fn is_identifier(s: &str) -> bool {
    s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_unique() {
        for (i, v) in VARIABLES.iter().enumerate() {
            assert!(VARIABLES[i + 1..].iter().all(|w| w.name != v.name));
        }
        for (i, s) in SELECTIONS.iter().enumerate() {
            assert!(SELECTIONS[i + 1..].iter().all(|t| t.name != s.name));
        }
    }

    #[test]
    fn lookups_are_exact() {
        assert_eq!(variable("vtxxx").unwrap().n_bins, 50);
        assert!(variable("VTXXX").is_none());
        assert!(variable("all").is_none());
        assert_eq!(selection("none").unwrap().expression, "");
        assert!(selection("bogus-cut").is_none());
    }

    #[test]
    fn table_order_and_labels() {
        let names: Vec<_> = variables().iter().map(|v| v.name).collect();
        assert_eq!(names, ["vtxxx", "mcvtx", "vtyyy", "mcpdg", "vtxxx - mcvtx", "vtzzz"]);
        let cuts: Vec<_> = selections().iter().map(|s| s.name).collect();
        assert_eq!(cuts, ["none", "true-muon", "mc-pT-cut", "muon", "true-muon-ptcut"]);
        assert!(variables().iter().all(|v| v.y_label == "Entries/bin"));
        assert_eq!(variable("mcvtx").unwrap().x_label, "MC x-position [#mum]");
        assert_eq!(variable("mcpdg").unwrap().x_label, "MC particle PDG Id");
        assert_eq!(variable("vtxxx - mcvtx").unwrap().x_label, "PV x residual");
        assert_eq!(variable("vtzzz").unwrap().x_label, "PV z-position [mm]");
    }

    #[test]
    fn draw_requests() {
        assert_eq!(variable("vtxxx").unwrap().draw_request().unwrap(), "vtxxx*1000000>>h_vtxxx(50, -5, 5)");
        assert_eq!(variable("mcpdg").unwrap().draw_request().unwrap(), "mcpdg>>h_mcpdg(50, -25, 25)");
        assert_eq!(variable("vtzzz").unwrap().draw_request().unwrap(), "vtzzz*1000>>h_vtzzz(48, -12, 12)");
        assert_eq!(
            variable("vtxxx - mcvtx").unwrap().draw_request().unwrap(),
            "(vtxxx - mcvtx)*1000000>>h_vtxxx - mcvtx(50, -10, 10)"
        );
    }

    #[test]
    fn draw_requests_parse_back() {
        for v in variables() {
            let req = DrawRequest::parse(&v.draw_request().unwrap()).unwrap();
            assert_eq!(req.name(), v.histogram_name());
            assert_eq!(req.x_binning.unwrap().n_bins, v.n_bins);
        }
    }
}
