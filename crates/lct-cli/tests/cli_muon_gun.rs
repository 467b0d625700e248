mod common;

use common::run;

const BIN: &str = env!("CARGO_BIN_EXE_muon-gun");

#[test]
fn two_seeds_same_shape() {
    let dir = tempfile::tempdir().unwrap();
    for (seed, name) in [("1", "a.parquet"), ("2", "b.parquet")] {
        let out = run(BIN, &["-n", "120", "--seed", seed, "-o", name], dir.path());
        assert!(out.status.success(), "muon-gun failed: {}", String::from_utf8_lossy(&out.stderr));
    }
    let a = lct_gun::read_events(dir.path().join("a.parquet")).unwrap();
    let b = lct_gun::read_events(dir.path().join("b.parquet")).unwrap();
    assert_eq!((a.len(), b.len()), (120, 120));
    for (ea, eb) in a.iter().zip(&b) {
        assert_eq!(ea.particles.len(), 2);
        assert_eq!(eb.particles.len(), 2);
        for ev in [ea, eb] {
            assert_eq!((ev.particles[0].pdg, ev.particles[0].charge), (13, -1.0));
            assert_eq!((ev.particles[1].pdg, ev.particles[1].charge), (-13, 1.0));
        }
    }
    assert_ne!(a[0].particles[0].momentum, b[0].particles[0].momentum);
}

#[test]
fn progress_is_logged() {
    let dir = tempfile::tempdir().unwrap();
    let out = run(BIN, &["-n", "250", "--seed", "3"], dir.path());
    assert!(out.status.success());
    let log = String::from_utf8_lossy(&out.stderr);
    for n in [0, 100, 200] {
        assert!(log.contains(&format!("Processing event # {n}")), "log: {log}");
    }
    assert!(dir.path().join("muonGun_gen.parquet").exists());
}

#[test]
fn refuses_to_overwrite() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("out.parquet"), b"precious").unwrap();
    let out = run(BIN, &["-n", "5", "-o", "out.parquet"], dir.path());
    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).contains("already exists"));
    assert_eq!(std::fs::read(dir.path().join("out.parquet")).unwrap(), b"precious");
}

#[test]
fn output_feeds_the_plotter() {
    let dir = tempfile::tempdir().unwrap();
    let out = run(BIN, &["-n", "50", "--seed", "4", "-o", "gun.parquet"], dir.path());
    assert!(out.status.success());
    let out = run(
        env!("CARGO_BIN_EXE_make-plots"),
        &["-i", "gun.parquet", "-v", "mcpdg", "-s", "true-muon"],
        dir.path(),
    );
    assert!(out.status.success(), "make-plots failed: {}", String::from_utf8_lossy(&out.stderr));
    assert!(dir.path().join("plot_mcpdg-true-muon.png").exists());
}
