//! Named numeric columns, the input of histogram filling.

use std::path::Path;

use crate::branch_reader::JaggedCol;
use crate::error::{Result, RootError};
use crate::file::RootFile;
use crate::tree::Tree;

/// Values of one column for every entry.
#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    /// One value per entry.
    Scalar(Vec<f64>),
    /// A variable number of values per entry.
    Jagged(JaggedCol),
}

impl Column {
    /// Number of entries.
    pub fn n_entries(&self) -> usize {
        match self {
            Column::Scalar(v) => v.len(),
            Column::Jagged(j) => j.n_entries(),
        }
    }
}

/// A table of named columns sharing one entry count.
pub trait ColumnSource {
    /// Entries in the table.
    fn n_entries(&self) -> usize;

    /// Names of the readable columns.
    fn column_names(&self) -> Vec<String>;

    /// Read one column in full.
    fn read_column(&self, name: &str) -> Result<Column>;
}

/// A TTree viewed as a [`ColumnSource`].
pub struct TreeSource {
    file: RootFile,
    tree: Tree,
}

impl TreeSource {
    /// Open `path` and read the tree at `tree_path`.
    pub fn open(path: impl AsRef<Path>, tree_path: &str) -> Result<Self> {
        let file = RootFile::open(path)?;
        let tree = file.get_tree(tree_path)?;
        Ok(Self { file, tree })
    }

    /// Wrap an already opened file and tree.
    pub fn new(file: RootFile, tree: Tree) -> Self {
        Self { file, tree }
    }

    /// The tree metadata.
    pub fn tree(&self) -> &Tree {
        &self.tree
    }
}

impl ColumnSource for TreeSource {
    fn n_entries(&self) -> usize {
        self.tree.entries as usize
    }

    fn column_names(&self) -> Vec<String> {
        self.tree.branch_names().into_iter().map(str::to_string).collect()
    }

    fn read_column(&self, name: &str) -> Result<Column> {
        let branch = self
            .tree
            .find_branch(name)
            .ok_or_else(|| RootError::BranchNotFound(name.to_string()))?;
        let reader = self.file.branch_reader(&self.tree, name)?;
        if branch.is_jagged() {
            Ok(Column::Jagged(reader.as_jagged_f64()?))
        } else {
            Ok(Column::Scalar(reader.as_f64()?))
        }
    }
}
