//! Integration tests: read LCTuple-like trees from fixture ROOT files.
//!
//! Fixtures are written by `tests/fixtures/generate_root_fixtures.py` and
//! checked in alongside the expected values.

use std::collections::HashMap;
use std::path::PathBuf;

use approx::assert_relative_eq;
use lct_root::{BranchLayout, HistogramRegistry, LeafType, RootFile, TreeSource};

fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../tests/fixtures").join(name)
}

#[derive(serde::Deserialize)]
struct Expected {
    n_entries: u64,
    branches: HashMap<String, BranchExpected>,
    true_muon_vtxxx: DrawExpected,
}

#[derive(serde::Deserialize)]
struct BranchExpected {
    count: usize,
    sum: f64,
    #[serde(default)]
    first_3: Vec<f64>,
}

#[derive(serde::Deserialize)]
struct DrawExpected {
    entries: u64,
    contents: Vec<f64>,
}

fn load(tag: &str) -> (RootFile, Expected) {
    let path = fixture_path(&format!("lctuple_{tag}.root"));
    let text = std::fs::read_to_string(fixture_path("lctuple_expected.json"))
        .expect("lctuple_expected.json not found");
    let expected = serde_json::from_str(&text).expect("failed to parse expected JSON");
    (RootFile::open(&path).expect("failed to open ROOT file"), expected)
}

#[test]
fn tree_metadata() {
    let (f, expected) = load("zlib");
    let tree = f.get_tree("MyLCTuple").expect("failed to get tree");
    assert_eq!(tree.entries, expected.n_entries);

    let names = tree.branch_names();
    for b in ["evevt", "nvt", "vtxxx", "vtyyy", "vtzzz", "nmc", "mcpdg", "mcvtx", "mcmox"] {
        assert!(names.contains(&b), "missing branch {b}: {names:?}");
    }
    let vtxxx = tree.find_branch("vtxxx").unwrap();
    assert_eq!(vtxxx.leaf_type, LeafType::F32);
    assert_eq!(vtxxx.layout, BranchLayout::Counted { counter: "nvt".into() });
    assert_eq!(tree.find_branch("evevt").unwrap().layout, BranchLayout::Scalar);
    assert!(vtxxx.n_baskets() >= 2);
    assert_eq!(vtxxx.basket_entry, [0, 100, 200]);
    assert_eq!(
        tree.find_branch("mcpdg").unwrap().layout,
        BranchLayout::Counted { counter: "nmc".into() }
    );
    assert_eq!(tree.find_branch("mcpdg").unwrap().leaf_type, LeafType::I32);
}

#[test]
fn leading_slash_and_missing_tree() {
    let (f, _) = load("zlib");
    assert!(f.get_tree("/MyLCTuple").is_ok());
    assert!(matches!(f.get_tree("NoSuchTree"), Err(lct_root::RootError::TreeNotFound(_))));
    let keys = f.list_keys().unwrap();
    assert!(keys.iter().any(|k| k.name == "MyLCTuple" && k.class_name == "TTree"));
}

#[test]
fn branch_values_match_for_every_codec() {
    for tag in ["zlib", "lz4", "zstd"] {
        let (f, expected) = load(tag);
        let tree = f.get_tree("MyLCTuple").unwrap();
        for (name, want) in &expected.branches {
            let col = f.branch_data_jagged(&tree, name).unwrap();
            assert_eq!(col.n_entries() as u64, expected.n_entries, "{tag}/{name}");
            assert_eq!(col.flat.len(), want.count, "{tag}/{name}");
            assert_relative_eq!(col.flat.iter().sum::<f64>(), want.sum, max_relative = 1e-9);
            for (got, want) in col.flat.iter().zip(&want.first_3) {
                assert_relative_eq!(*got, *want, max_relative = 1e-12);
            }
        }
    }
}

#[test]
fn counter_matches_jagged_lengths() {
    let (f, _) = load("zlib");
    let tree = f.get_tree("MyLCTuple").unwrap();
    let nvt = f.branch_data(&tree, "nvt").unwrap();
    let vtxxx = f.branch_data_jagged(&tree, "vtxxx").unwrap();
    for (i, n) in nvt.iter().enumerate() {
        assert_eq!(vtxxx.row(i).len(), *n as usize, "entry {i}");
    }
    assert!(f.branch_data(&tree, "vtxxx").is_err());
}

#[test]
fn draw_true_muon_vertex() {
    let (f, expected) = load("zlib");
    let tree = f.get_tree("MyLCTuple").unwrap();
    let source = TreeSource::new(f, tree);
    let mut hists = HistogramRegistry::new();
    hists
        .draw(&source, "vtxxx*1000000>>h_vtxxx(50, -5, 5)", "abs(mcpdg)==13")
        .unwrap();
    let h = hists.get_1d("h_vtxxx").unwrap();
    assert_eq!(h.entries, expected.true_muon_vtxxx.entries);
    assert_eq!(h.contents, expected.true_muon_vtxxx.contents);
}
