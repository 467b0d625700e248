//! Tuple sources: ROOT trees and Parquet tables behind one [`ColumnSource`].

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result, bail};
use arrow::array::{Array, AsArray, OffsetSizeTrait};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Float64Type};
use lct_root::{Column, ColumnSource, JaggedCol, ROOT_MAGIC, RootError, TreeSource};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

const PARQUET_MAGIC: &[u8; 4] = b"PAR1";

/// A Parquet table loaded into memory, one row per event.
///
/// Numeric columns become scalar columns; lists of numbers become jagged
/// columns. Nulls read as NaN, which the histogram filler skips; a null
/// list reads as an empty entry.
#[derive(Debug, Clone)]
pub struct ParquetSource {
    n_entries: usize,
    names: Vec<String>,
    columns: HashMap<String, Column>,
}

impl ParquetSource {
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
        let builder = ParquetRecordBatchReaderBuilder::try_new(file)
            .with_context(|| format!("failed to read Parquet metadata of {}", path.display()))?;
        let schema = builder.schema().clone();
        let mut batches = Vec::new();
        for batch in builder.build()? {
            batches.push(batch?);
        }

        let mut names = Vec::new();
        let mut columns = HashMap::new();
        for (idx, field) in schema.fields().iter().enumerate() {
            let arrays: Vec<&dyn Array> = batches.iter().map(|b| b.column(idx).as_ref()).collect();
            match to_column(field.data_type(), &arrays)
                .with_context(|| format!("column '{}'", field.name()))?
            {
                Some(col) => {
                    names.push(field.name().clone());
                    columns.insert(field.name().clone(), col);
                }
                None => tracing::warn!(
                    column = %field.name(),
                    data_type = %field.data_type(),
                    "skipping non-numeric column"
                ),
            }
        }
        let n_entries = batches.iter().map(|b| b.num_rows()).sum();
        tracing::debug!(path = %path.display(), n_entries, n_columns = names.len(), "loaded Parquet tuple");
        Ok(Self { n_entries, names, columns })
    }
}

fn is_number(dt: &DataType) -> bool {
    dt.is_numeric() || *dt == DataType::Boolean
}

fn to_column(dt: &DataType, arrays: &[&dyn Array]) -> Result<Option<Column>> {
    match dt {
        dt if is_number(dt) => {
            let mut values = Vec::new();
            for a in arrays {
                let f = cast(*a, &DataType::Float64)?;
                let f = f.as_primitive_opt::<Float64Type>().context("cast did not produce Float64")?;
                values.extend(f.iter().map(|v| v.unwrap_or(f64::NAN)));
            }
            Ok(Some(Column::Scalar(values)))
        }
        DataType::List(item) if is_number(item.data_type()) => {
            let mut col = JaggedCol { flat: Vec::new(), offsets: vec![0] };
            for a in arrays {
                push_list::<i32>(*a, &mut col)?;
            }
            Ok(Some(Column::Jagged(col)))
        }
        DataType::LargeList(item) if is_number(item.data_type()) => {
            let mut col = JaggedCol { flat: Vec::new(), offsets: vec![0] };
            for a in arrays {
                push_list::<i64>(*a, &mut col)?;
            }
            Ok(Some(Column::Jagged(col)))
        }
        _ => Ok(None),
    }
}

fn push_list<O: OffsetSizeTrait>(array: &dyn Array, col: &mut JaggedCol) -> Result<()> {
    let list = array.as_list_opt::<O>().context("expected a list array")?;
    let values = cast(list.values().as_ref(), &DataType::Float64)?;
    let values = values.as_primitive_opt::<Float64Type>().context("cast did not produce Float64")?;
    let offsets = list.value_offsets();
    for row in 0..list.len() {
        if list.is_valid(row) {
            for j in offsets[row].as_usize()..offsets[row + 1].as_usize() {
                col.flat.push(if values.is_valid(j) { values.value(j) } else { f64::NAN });
            }
        }
        col.offsets.push(col.flat.len());
    }
    Ok(())
}

impl ColumnSource for ParquetSource {
    fn n_entries(&self) -> usize {
        self.n_entries
    }

    fn column_names(&self) -> Vec<String> {
        self.names.clone()
    }

    fn read_column(&self, name: &str) -> lct_root::Result<Column> {
        self.columns.get(name).cloned().ok_or_else(|| RootError::BranchNotFound(name.to_string()))
    }
}

/// Open a tuple by content: ROOT files by their `root` magic, Parquet
/// files by `PAR1`. `tree_path` only applies to ROOT files.
pub fn open_tuple(path: &Path, tree_path: &str) -> Result<Box<dyn ColumnSource>> {
    let mut magic = [0u8; 4];
    File::open(path)
        .and_then(|mut f| f.read_exact(&mut magic))
        .with_context(|| format!("failed to read {}", path.display()))?;

    if &magic == ROOT_MAGIC {
        let source = TreeSource::open(path, tree_path)
            .with_context(|| format!("failed to read tree '{tree_path}' from {}", path.display()))?;
        tracing::debug!(tree = tree_path, entries = source.n_entries(), "opened ROOT tuple");
        Ok(Box::new(source))
    } else if &magic == PARQUET_MAGIC {
        Ok(Box::new(ParquetSource::open(path)?))
    } else {
        bail!("{} is neither a ROOT nor a Parquet file", path.display())
    }
}
