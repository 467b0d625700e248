//! Streamers for the ROOT classes this reader understands.

mod ttree;

pub use ttree::read_ttree;
