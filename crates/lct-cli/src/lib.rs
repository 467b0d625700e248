//! # lct-cli
//!
//! Drivers behind the `make-plots`, `plot-pv` and `muon-gun` binaries.

pub mod gun;
pub mod logging;
pub mod plots;
pub mod pv;
pub mod tables;
pub mod tuple;

pub use plots::PlotOptions;
pub use tuple::{ParquetSource, open_tuple};
