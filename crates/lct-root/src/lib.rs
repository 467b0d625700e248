//! # lct-root
//!
//! Native ROOT TTree reader for the lctools plotters.
//!
//! Reads flat and jagged branches of LCTuple-style trees from `.root` files
//! without ROOT, evaluates `TTree::Draw` formulas over them and fills
//! histograms. Supports zlib, LZ4, ZSTD and XZ compression.
//!
//! ## Example
//!
//! ```no_run
//! use lct_root::{HistogramRegistry, RootFile, TreeSource};
//!
//! let f = RootFile::open("tuple.root").unwrap();
//! for key in f.list_keys().unwrap() {
//!     println!("{} ({})", key.name, key.class_name);
//! }
//! let tree = f.get_tree("MyLCTuple").unwrap();
//! let vtx = f.branch_data_jagged(&tree, "vtxxx").unwrap();
//! println!("{} entries", vtx.n_entries());
//!
//! let source = TreeSource::new(f, tree);
//! let mut hists = HistogramRegistry::new();
//! hists.draw(&source, "vtxxx*1000000>>h_vtxxx(50, -5, 5)", "abs(mcpdg)==13").unwrap();
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod basket;
pub mod branch_reader;
pub mod column;
pub mod decompress;
pub mod directory;
pub mod draw;
pub mod error;
pub mod expr;
pub mod file;
pub mod filler;
pub mod hist;
pub mod key;
pub mod objects;
pub mod rbuffer;
pub mod tree;

pub use branch_reader::{BranchReader, JaggedCol};
pub use column::{Column, ColumnSource, TreeSource};
pub use draw::{Binning, DrawRequest};
pub use error::{Result, RootError};
pub use expr::CompiledExpr;
pub use file::{ROOT_MAGIC, RootFile};
pub use filler::{Filled, HistogramRegistry, draw};
pub use hist::{Hist1D, Hist2D};
pub use key::KeyInfo;
pub use tree::{BranchInfo, BranchLayout, LeafType, Tree};
