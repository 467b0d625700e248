//! # lct-gun
//!
//! Single-particle muon gun. Samples uniform transverse momentum and polar
//! angle, alternates charge and PDG sign by particle index, and streams the
//! resulting MCParticle events to a Parquet file (see [`schema`]).

pub mod config;
pub mod error;
pub mod generator;
pub mod particle;
pub mod reader;
pub mod schema;
pub mod writer;

pub use config::GunConfig;
pub use error::{GunError, Result};
pub use generator::MuonGun;
pub use particle::{Event, McParticle};
pub use reader::{read_config, read_events};
pub use writer::EventWriter;
