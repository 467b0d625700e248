#![allow(dead_code)]

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Builder, Int32Array, Int32Builder, ListBuilder};
use arrow::datatypes::{Field, Schema};
use arrow::record_batch::RecordBatch;

pub const N_EVENTS: usize = 200;

pub fn run(bin: &str, args: &[&str], dir: &Path) -> Output {
    run_with_stdin(bin, args, dir, b"")
}

pub fn run_with_stdin(bin: &str, args: &[&str], dir: &Path, stdin: &[u8]) -> Output {
    let mut child = Command::new(bin)
        .args(args)
        .current_dir(dir)
        .env_remove("LCT_VIEWER")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap_or_else(|e| panic!("failed to run {bin} {args:?}: {e}"));
    if let Some(mut pipe) = child.stdin.take() {
        // The tool may exit before reading its input.
        let _ = pipe.write_all(stdin);
    }
    child.wait_with_output().unwrap()
}

fn f64_list(rows: impl Iterator<Item = Vec<f64>>) -> ArrayRef {
    let mut b = ListBuilder::new(Float64Builder::new());
    for row in rows {
        for v in row {
            b.values().append_value(v);
        }
        b.append(true);
    }
    Arc::new(b.finish())
}

/// A small LCTuple-like table: one reconstructed vertex and two MC
/// particles (a muon pair) per event. Lengths are in mm.
pub fn write_tuple(path: &Path) -> PathBuf {
    let n = N_EVENTS;
    let wave = |i: usize, k: usize| ((i * k) % 41) as f64 / 41.0 - 0.5;

    let mut pdg = ListBuilder::new(Int32Builder::new());
    for _ in 0..n {
        pdg.values().append_value(13);
        pdg.values().append_value(-13);
        pdg.append(true);
    }

    let columns: Vec<(&str, ArrayRef)> = vec![
        ("evevt", Arc::new(Int32Array::from_iter_values(0..n as i32))),
        ("nvt", Arc::new(Int32Array::from(vec![1; n]))),
        ("vtxxx", f64_list((0..n).map(|i| vec![wave(i, 7) * 4e-6]))),
        ("vtyyy", f64_list((0..n).map(|i| vec![wave(i, 11) * 4e-6]))),
        ("vtzzz", f64_list((0..n).map(|i| vec![wave(i, 13) * 16e-3]))),
        ("nmcp", Arc::new(Int32Array::from(vec![2; n]))),
        ("mcpdg", Arc::new(pdg.finish())),
        ("mcvtx", f64_list((0..n).map(|i| vec![wave(i, 5) * 2e-6; 2]))),
        ("mcmox", f64_list((0..n).map(|i| vec![wave(i, 3) * 6.0, -wave(i, 3) * 6.0]))),
        ("mcmoy", f64_list((0..n).map(|i| vec![wave(i, 17), wave(i, 19)]))),
    ];

    let fields: Vec<Field> =
        columns.iter().map(|(name, a)| Field::new(*name, a.data_type().clone(), false)).collect();
    let schema = Arc::new(Schema::new(fields));
    let batch = RecordBatch::try_new(schema.clone(), columns.into_iter().map(|(_, a)| a).collect()).unwrap();

    let file = std::fs::File::create(path).unwrap();
    let mut w = parquet::arrow::ArrowWriter::try_new(file, schema, None).unwrap();
    w.write(&batch).unwrap();
    w.close().unwrap();
    path.to_path_buf()
}

/// A checked-in LCTuple ROOT file from `tests/fixtures`.
pub fn root_fixture(codec: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../../tests/fixtures")
        .join(format!("lctuple_{codec}.root"))
}

pub fn pngs_in(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .filter(|n| n.ends_with(".png"))
        .collect();
    names.sort();
    names
}
