//! Event file schema.
//!
//! # Schema: `lctools_mcparticle_v1`
//!
//! One Parquet row per event. Column names follow the LCTuple
//! `MCParticle` branch names, so generator output can be fed straight to
//! the tuple plotter.
//!
//! | Column            | Arrow Type          | Description                        |
//! |-------------------|---------------------|------------------------------------|
//! | `evrun`           | `Int32`             | Run number                         |
//! | `evevt`           | `Int32`             | Event number                       |
//! | `nmcp`            | `Int32`             | Particles in the event             |
//! | `mcpdg`           | `List<Int32>`       | PDG id                             |
//! | `mcgst`           | `List<Int32>`       | Generator status                   |
//! | `mcmas`           | `List<Float64>`     | Mass [GeV]                         |
//! | `mccha`           | `List<Float32>`     | Charge                             |
//! | `mcene`           | `List<Float64>`     | Energy [GeV]                       |
//! | `mcmox/y/z`       | `List<Float64>`     | Momentum [GeV]                     |
//! | `mcvtx/y/z`       | `List<Float64>`     | Vertex [mm]                        |
//! | `mcepx/y/z`       | `List<Float64>`     | Endpoint [mm], null when unset     |
//! | `mctim`           | `List<Float32>`     | Time [ns]                          |
//!
//! ## Parquet key-value metadata
//!
//! | Key                         | Value                              |
//! |-----------------------------|------------------------------------|
//! | `lctools.schema_version`    | `"lctools_mcparticle_v1"`          |
//! | `lctools.generator_config`  | JSON-encoded [`GunConfig`]         |
//!
//! [`GunConfig`]: crate::config::GunConfig

use std::collections::HashMap;
use std::sync::Arc;

use arrow::datatypes::{DataType, Field, Schema, SchemaRef};

/// Schema version string embedded in Parquet key-value metadata.
pub const MCPARTICLE_SCHEMA_V1: &str = "lctools_mcparticle_v1";

/// Parquet metadata key for the schema version.
pub const META_KEY_SCHEMA_VERSION: &str = "lctools.schema_version";

/// Parquet metadata key for the generator configuration (JSON).
pub const META_KEY_CONFIG: &str = "lctools.generator_config";

pub const RUN_COLUMN: &str = "evrun";
pub const EVENT_COLUMN: &str = "evevt";
pub const COUNT_COLUMN: &str = "nmcp";

fn list_of(item: DataType) -> DataType {
    DataType::List(Arc::new(Field::new_list_field(item, true)))
}

/// Arrow schema of an event file, carrying `config_json` in its metadata.
pub fn event_schema(config_json: String) -> SchemaRef {
    let f64_list = || list_of(DataType::Float64);
    let fields = vec![
        Field::new(RUN_COLUMN, DataType::Int32, false),
        Field::new(EVENT_COLUMN, DataType::Int32, false),
        Field::new(COUNT_COLUMN, DataType::Int32, false),
        Field::new("mcpdg", list_of(DataType::Int32), false),
        Field::new("mcgst", list_of(DataType::Int32), false),
        Field::new("mcmas", f64_list(), false),
        Field::new("mccha", list_of(DataType::Float32), false),
        Field::new("mcene", f64_list(), false),
        Field::new("mcmox", f64_list(), false),
        Field::new("mcmoy", f64_list(), false),
        Field::new("mcmoz", f64_list(), false),
        Field::new("mcvtx", f64_list(), false),
        Field::new("mcvty", f64_list(), false),
        Field::new("mcvtz", f64_list(), false),
        Field::new("mcepx", f64_list(), false),
        Field::new("mcepy", f64_list(), false),
        Field::new("mcepz", f64_list(), false),
        Field::new("mctim", list_of(DataType::Float32), false),
    ];
    let metadata = HashMap::from([
        (META_KEY_SCHEMA_VERSION.to_string(), MCPARTICLE_SCHEMA_V1.to_string()),
        (META_KEY_CONFIG.to_string(), config_json),
    ]);
    Arc::new(Schema::new(fields).with_metadata(metadata))
}
