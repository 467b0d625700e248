//! Read event files written by [`EventWriter`](crate::writer::EventWriter).

use std::fs::File;
use std::path::Path;

use arrow::array::{Array, AsArray};
use arrow::datatypes::{ArrowPrimitiveType, Float32Type, Float64Type, Int32Type};
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

use crate::config::GunConfig;
use crate::error::{GunError, Result};
use crate::particle::{Event, McParticle};
use crate::schema::{
    COUNT_COLUMN, EVENT_COLUMN, MCPARTICLE_SCHEMA_V1, META_KEY_CONFIG, META_KEY_SCHEMA_VERSION,
    RUN_COLUMN,
};

fn open_checked(path: &Path) -> Result<ParquetRecordBatchReaderBuilder<File>> {
    let file = File::open(path)?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;
    match builder.schema().metadata().get(META_KEY_SCHEMA_VERSION) {
        Some(v) if v == MCPARTICLE_SCHEMA_V1 => Ok(builder),
        Some(v) => Err(GunError::Validation(format!(
            "{}: unsupported schema version '{v}', expected '{MCPARTICLE_SCHEMA_V1}'",
            path.display()
        ))),
        None => Err(GunError::Validation(format!(
            "{}: missing '{META_KEY_SCHEMA_VERSION}' metadata",
            path.display()
        ))),
    }
}

/// Generator configuration stored in the file metadata.
pub fn read_config(path: impl AsRef<Path>) -> Result<GunConfig> {
    let path = path.as_ref();
    let builder = open_checked(path)?;
    let json = builder.schema().metadata().get(META_KEY_CONFIG).ok_or_else(|| {
        GunError::Validation(format!("{}: missing '{META_KEY_CONFIG}' metadata", path.display()))
    })?;
    Ok(serde_json::from_str(json)?)
}

/// Read every event of the file, in order.
pub fn read_events(path: impl AsRef<Path>) -> Result<Vec<Event>> {
    let reader = open_checked(path.as_ref())?.build()?;
    let mut events = Vec::new();
    for batch in reader {
        batch_to_events(&batch?, &mut events)?;
    }
    Ok(events)
}

fn scalar_column(batch: &RecordBatch, name: &str) -> Result<Vec<i32>> {
    let col = batch
        .column_by_name(name)
        .ok_or_else(|| GunError::Validation(format!("missing column '{name}'")))?;
    let values = col
        .as_primitive_opt::<Int32Type>()
        .ok_or_else(|| GunError::Validation(format!("column '{name}' is not Int32")))?;
    Ok(values.values().to_vec())
}

type Rows<T> = Vec<Vec<Option<T>>>;

fn list_column<T: ArrowPrimitiveType>(batch: &RecordBatch, name: &str) -> Result<Rows<T::Native>> {
    let col = batch
        .column_by_name(name)
        .ok_or_else(|| GunError::Validation(format!("missing column '{name}'")))?;
    let list = col
        .as_list_opt::<i32>()
        .ok_or_else(|| GunError::Validation(format!("column '{name}' is not a list")))?;
    let values = list.values().as_primitive_opt::<T>().ok_or_else(|| {
        GunError::Validation(format!("column '{name}' has unexpected item type {}", list.value_type()))
    })?;
    let offsets = list.value_offsets();
    Ok((0..list.len())
        .map(|row| {
            (offsets[row] as usize..offsets[row + 1] as usize)
                .map(|j| values.is_valid(j).then(|| values.value(j)))
                .collect()
        })
        .collect())
}

fn required<T: Copy>(rows: &Rows<T>, row: usize, i: usize, name: &str) -> Result<T> {
    rows.get(row)
        .and_then(|r| r.get(i))
        .copied()
        .flatten()
        .ok_or_else(|| GunError::Validation(format!("row {row}: '{name}' missing value {i}")))
}

fn batch_to_events(batch: &RecordBatch, out: &mut Vec<Event>) -> Result<()> {
    let run = scalar_column(batch, RUN_COLUMN)?;
    let evt = scalar_column(batch, EVENT_COLUMN)?;
    let count = scalar_column(batch, COUNT_COLUMN)?;
    let pdg = list_column::<Int32Type>(batch, "mcpdg")?;
    let gst = list_column::<Int32Type>(batch, "mcgst")?;
    let mas = list_column::<Float64Type>(batch, "mcmas")?;
    let cha = list_column::<Float32Type>(batch, "mccha")?;
    let mom = [
        list_column::<Float64Type>(batch, "mcmox")?,
        list_column::<Float64Type>(batch, "mcmoy")?,
        list_column::<Float64Type>(batch, "mcmoz")?,
    ];
    let vtx = [
        list_column::<Float64Type>(batch, "mcvtx")?,
        list_column::<Float64Type>(batch, "mcvty")?,
        list_column::<Float64Type>(batch, "mcvtz")?,
    ];
    let ep = [
        list_column::<Float64Type>(batch, "mcepx")?,
        list_column::<Float64Type>(batch, "mcepy")?,
        list_column::<Float64Type>(batch, "mcepz")?,
    ];
    let tim = list_column::<Float32Type>(batch, "mctim")?;

    for row in 0..batch.num_rows() {
        let n = pdg[row].len();
        if usize::try_from(count[row]).ok() != Some(n) {
            return Err(GunError::Validation(format!(
                "row {row}: {COUNT_COLUMN} = {} but {n} particles stored",
                count[row]
            )));
        }
        let mut particles = Vec::with_capacity(n);
        for i in 0..n {
            let endpoint = match (ep[0][row].get(i), ep[1][row].get(i), ep[2][row].get(i)) {
                (Some(Some(x)), Some(Some(y)), Some(Some(z))) => Some([*x, *y, *z]),
                _ => None,
            };
            particles.push(McParticle {
                pdg: required(&pdg, row, i, "mcpdg")?,
                generator_status: required(&gst, row, i, "mcgst")?,
                mass: required(&mas, row, i, "mcmas")?,
                charge: required(&cha, row, i, "mccha")?,
                momentum: [
                    required(&mom[0], row, i, "mcmox")?,
                    required(&mom[1], row, i, "mcmoy")?,
                    required(&mom[2], row, i, "mcmoz")?,
                ],
                vertex: [
                    required(&vtx[0], row, i, "mcvtx")?,
                    required(&vtx[1], row, i, "mcvty")?,
                    required(&vtx[2], row, i, "mcvtz")?,
                ],
                endpoint,
                time: required(&tim, row, i, "mctim")?,
            });
        }
        out.push(Event { run_number: run[row], event_number: evt[row], particles });
    }
    Ok(())
}
