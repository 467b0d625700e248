//! Buffered Parquet event writer.

use std::fs::{File, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use arrow::array::{ArrayBuilder, ArrayRef, Float32Builder, Float64Builder, Int32Array, Int32Builder, ListBuilder};
use arrow::datatypes::SchemaRef;
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;

use crate::config::GunConfig;
use crate::error::{GunError, Result};
use crate::particle::{Event, McParticle};
use crate::schema::event_schema;

/// Events per record batch.
pub const BATCH_SIZE: usize = 1024;

/// Streams events into a new Parquet file.
///
/// The file is created with `create_new`; an existing file is never
/// overwritten. Call [`EventWriter::close`] to write the footer.
pub struct EventWriter {
    path: PathBuf,
    schema: SchemaRef,
    writer: ArrowWriter<File>,
    pending: Vec<Event>,
    written: u64,
}

impl EventWriter {
    pub fn create(path: impl AsRef<Path>, config: &GunConfig) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new().write(true).create_new(true).open(&path).map_err(|e| {
            if e.kind() == ErrorKind::AlreadyExists {
                GunError::OutputExists(path.clone())
            } else {
                GunError::Io(e)
            }
        })?;

        let schema = event_schema(serde_json::to_string(config)?);
        let props = WriterProperties::builder().set_compression(Compression::SNAPPY).build();
        let writer = ArrowWriter::try_new(file, schema.clone(), Some(props))?;
        log::debug!("opened event file {}", path.display());

        Ok(Self { path, schema, writer, pending: Vec::with_capacity(BATCH_SIZE), written: 0 })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Events accepted so far, flushed or not.
    pub fn events_written(&self) -> u64 {
        self.written
    }

    pub fn write_event(&mut self, event: Event) -> Result<()> {
        self.pending.push(event);
        self.written += 1;
        if self.pending.len() >= BATCH_SIZE {
            self.flush()?;
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        if self.pending.is_empty() {
            return Ok(());
        }
        let batch = events_to_record_batch(&self.schema, &self.pending)?;
        self.writer.write(&batch)?;
        self.pending.clear();
        Ok(())
    }

    /// Flush buffered events and write the footer. Returns the event count.
    pub fn close(mut self) -> Result<u64> {
        self.flush()?;
        self.writer.close()?;
        log::debug!("closed {} with {} events", self.path.display(), self.written);
        Ok(self.written)
    }
}

fn list_column<B, F>(events: &[Event], values: B, mut push: F) -> ArrayRef
where
    B: ArrayBuilder,
    F: FnMut(&mut B, &McParticle),
{
    let mut builder = ListBuilder::new(values);
    for ev in events {
        for p in &ev.particles {
            push(builder.values(), p);
        }
        builder.append(true);
    }
    Arc::new(builder.finish())
}

fn f64_column(events: &[Event], value: impl Fn(&McParticle) -> f64) -> ArrayRef {
    list_column(events, Float64Builder::new(), |b, p| b.append_value(value(p)))
}

fn endpoint_column(events: &[Event], axis: usize) -> ArrayRef {
    list_column(events, Float64Builder::new(), |b, p| match p.endpoint {
        Some(e) => b.append_value(e[axis]),
        None => b.append_null(),
    })
}

/// Build one record batch from a slice of events.
pub fn events_to_record_batch(schema: &SchemaRef, events: &[Event]) -> Result<RecordBatch> {
    let counts = events
        .iter()
        .map(|e| {
            i32::try_from(e.particles.len()).map_err(|_| {
                GunError::Validation(format!("event {} has too many particles", e.event_number))
            })
        })
        .collect::<Result<Vec<i32>>>()?;

    let columns: Vec<ArrayRef> = vec![
        Arc::new(Int32Array::from_iter_values(events.iter().map(|e| e.run_number))),
        Arc::new(Int32Array::from_iter_values(events.iter().map(|e| e.event_number))),
        Arc::new(Int32Array::from(counts)),
        list_column(events, Int32Builder::new(), |b, p| b.append_value(p.pdg)),
        list_column(events, Int32Builder::new(), |b, p| b.append_value(p.generator_status)),
        f64_column(events, |p| p.mass),
        list_column(events, Float32Builder::new(), |b, p| b.append_value(p.charge)),
        f64_column(events, McParticle::energy),
        f64_column(events, |p| p.momentum[0]),
        f64_column(events, |p| p.momentum[1]),
        f64_column(events, |p| p.momentum[2]),
        f64_column(events, |p| p.vertex[0]),
        f64_column(events, |p| p.vertex[1]),
        f64_column(events, |p| p.vertex[2]),
        endpoint_column(events, 0),
        endpoint_column(events, 1),
        endpoint_column(events, 2),
        list_column(events, Float32Builder::new(), |b, p| b.append_value(p.time)),
    ];
    Ok(RecordBatch::try_new(schema.clone(), columns)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::{Array, AsArray};
    use arrow::datatypes::Float64Type;

    fn muon(pdg: i32, endpoint: Option<[f64; 3]>) -> McParticle {
        McParticle {
            pdg,
            generator_status: 1,
            mass: 0.105658,
            charge: if pdg > 0 { -1.0 } else { 1.0 },
            momentum: [1.0, 2.0, 3.0],
            vertex: [0.0; 3],
            endpoint,
            time: 0.0,
        }
    }

    #[test]
    fn batch_has_one_row_per_event() {
        let events = vec![
            Event { run_number: 0, event_number: 0, particles: vec![muon(13, None), muon(-13, None)] },
            Event { run_number: 0, event_number: 1, particles: vec![muon(13, Some([1.0, 2.0, 3.0]))] },
        ];
        let batch = events_to_record_batch(&event_schema("{}".into()), &events).unwrap();
        assert_eq!(batch.num_rows(), 2);

        let epx = batch.column_by_name("mcepx").unwrap().as_list::<i32>();
        assert_eq!(epx.value_length(0), 2);
        let first = epx.value(0);
        assert_eq!(first.null_count(), 2);
        let second = epx.value(1);
        assert_eq!(second.as_primitive::<Float64Type>().value(0), 1.0);
    }

    #[test]
    fn refuses_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.parquet");
        std::fs::write(&path, b"keep").unwrap();
        let err = EventWriter::create(&path, &GunConfig::default()).err().unwrap();
        assert!(matches!(err, GunError::OutputExists(p) if p == path));
        assert_eq!(std::fs::read(&path).unwrap(), b"keep");
    }

    #[test]
    fn close_reports_event_count() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.parquet");
        let mut w = EventWriter::create(&path, &GunConfig::default()).unwrap();
        for n in 0..(BATCH_SIZE as i32 + 3) {
            w.write_event(Event { run_number: 0, event_number: n, particles: vec![muon(13, None)] })
                .unwrap();
        }
        assert_eq!(w.events_written(), BATCH_SIZE as u64 + 3);
        assert_eq!(w.close().unwrap(), BATCH_SIZE as u64 + 3);
        assert_eq!(&std::fs::read(&path).unwrap()[..4], b"PAR1");
    }
}
