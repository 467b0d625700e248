mod common;

use common::{root_fixture, run, run_with_stdin, write_tuple};

const BIN: &str = env!("CARGO_BIN_EXE_plot-pv");

#[test]
fn five_prompts_then_exit() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_tuple(&dir.path().join("tuple.parquet"));
    let out = run_with_stdin(BIN, &[input.to_str().unwrap()], dir.path(), b"\n\n\n\n\n");
    assert!(out.status.success(), "plot-pv failed: {}", String::from_utf8_lossy(&out.stderr));
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert_eq!(stdout.matches("Press enter to continue").count(), 5);
    // No persistent outputs next to the input.
    let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
    assert_eq!(entries.len(), 1);
}

#[test]
fn closed_stdin_counts_as_enter() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_tuple(&dir.path().join("tuple.parquet"));
    let out = run(BIN, &[input.to_str().unwrap(), "-t", "Ignored", "-p", "/sub/"], dir.path());
    assert!(out.status.success(), "plot-pv failed: {}", String::from_utf8_lossy(&out.stderr));
}

#[test]
fn root_tuple_input() {
    let dir = tempfile::tempdir().unwrap();
    let input = root_fixture("zlib");
    let args = [input.to_str().unwrap(), "-t", "MyLCTuple", "-p", "/"];
    let out = run_with_stdin(BIN, &args, dir.path(), b"\n\n\n\n\n");
    assert!(out.status.success(), "plot-pv failed: {}", String::from_utf8_lossy(&out.stderr));
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert_eq!(stdout.matches("Press enter to continue").count(), 5);
}

#[test]
fn missing_input_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let out = run(BIN, &["missing.root"], dir.path());
    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).contains("not found"));
}
