//! Generate, write and read back event files.

use std::collections::HashMap;
use std::sync::Arc;

use arrow::array::Int32Array;
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use lct_gun::schema::{MCPARTICLE_SCHEMA_V1, META_KEY_SCHEMA_VERSION};
use lct_gun::{EventWriter, GunConfig, GunError, MuonGun, read_config, read_events};

fn generate(path: &std::path::Path, config: &GunConfig, seed: u64) -> u64 {
    let mut gun = MuonGun::new(config.clone(), Some(seed)).unwrap();
    let mut writer = EventWriter::create(path, config).unwrap();
    for n in 0..config.events as i32 {
        writer.write_event(gun.generate_event(n)).unwrap();
    }
    writer.close().unwrap()
}

#[test]
fn written_events_read_back_identically() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("gun.parquet");
    let config = GunConfig { events: 1500, decay_length: 50.0, ..Default::default() };

    assert_eq!(generate(&path, &config, 11), 1500);

    let mut gun = MuonGun::new(config.clone(), Some(11)).unwrap();
    let events = read_events(&path).unwrap();
    assert_eq!(events.len(), 1500);
    for (n, ev) in events.iter().enumerate() {
        let expected = gun.generate_event(n as i32);
        assert_eq!(ev.event_number, n as i32);
        assert_eq!(ev.particles.len(), 2);
        for (got, want) in ev.particles.iter().zip(&expected.particles) {
            assert_eq!(got.pdg, want.pdg);
            assert_eq!(got.charge, want.charge);
            assert_eq!(got.momentum, want.momentum);
            assert_eq!(got.endpoint, want.endpoint);
            assert!(got.endpoint.is_some());
        }
    }
    assert_eq!(read_config(&path).unwrap(), config);
}

#[test]
fn distinct_seeds_same_shape_different_kinematics() {
    let dir = tempfile::tempdir().unwrap();
    let config = GunConfig { events: 50, ..Default::default() };
    let (a, b) = (dir.path().join("a.parquet"), dir.path().join("b.parquet"));
    generate(&a, &config, 1);
    generate(&b, &config, 2);

    let (ea, eb) = (read_events(&a).unwrap(), read_events(&b).unwrap());
    assert_eq!(ea.len(), eb.len());
    let mut differs = false;
    for (x, y) in ea.iter().zip(&eb) {
        assert_eq!(x.particles.len(), y.particles.len());
        for (i, (px, py)) in x.particles.iter().zip(&y.particles).enumerate() {
            let sign = if i % 2 == 0 { 1 } else { -1 };
            assert_eq!(px.pdg, 13 * sign);
            assert_eq!(py.pdg, 13 * sign);
            assert_eq!(px.charge, py.charge);
            assert!(px.endpoint.is_none());
            differs |= px.momentum != py.momentum;
        }
    }
    assert!(differs);
}

#[test]
fn existing_output_is_not_overwritten() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("gun.parquet");
    let config = GunConfig { events: 3, ..Default::default() };
    generate(&path, &config, 1);
    let before = std::fs::read(&path).unwrap();

    let err = EventWriter::create(&path, &config).err().unwrap();
    assert!(matches!(err, GunError::OutputExists(_)));
    assert_eq!(std::fs::read(&path).unwrap(), before);
}

#[test]
fn foreign_parquet_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("other.parquet");
    let metadata = HashMap::from([(META_KEY_SCHEMA_VERSION.to_string(), "something_else".to_string())]);
    let schema = Arc::new(
        Schema::new(vec![Field::new("x", DataType::Int32, false)]).with_metadata(metadata),
    );
    let batch =
        RecordBatch::try_new(schema.clone(), vec![Arc::new(Int32Array::from(vec![1, 2]))]).unwrap();
    let file = std::fs::File::create(&path).unwrap();
    let mut w = parquet::arrow::ArrowWriter::try_new(file, schema, None).unwrap();
    w.write(&batch).unwrap();
    w.close().unwrap();

    let err = read_events(&path).unwrap_err();
    assert!(matches!(err, GunError::Validation(ref m) if m.contains("something_else")));
    assert!(err.to_string().contains(MCPARTICLE_SCHEMA_V1));
}
