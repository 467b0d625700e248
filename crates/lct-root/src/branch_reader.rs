//! Column extraction from TTree branches.

use rayon::prelude::*;

use crate::basket::{Basket, read_basket};
use crate::error::{Result, RootError};
use crate::tree::{BranchInfo, BranchLayout, LeafType};

/// Bytes before the elements of one member-wise `std::vector` entry:
/// byte count, class version and element count.
const STL_VECTOR_HEADER: usize = 10;

/// A variable-length column: flat values plus per-entry offsets.
///
/// `offsets` has `n_entries + 1` elements. Entry `i` holds
/// `flat[offsets[i]..offsets[i + 1]]`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JaggedCol {
    /// All values, entry after entry.
    pub flat: Vec<f64>,
    /// Entry boundaries into `flat`.
    pub offsets: Vec<usize>,
}

impl JaggedCol {
    /// Build from per-entry value lists.
    pub fn from_rows<I, R>(rows: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: AsRef<[f64]>,
    {
        let mut col = JaggedCol { flat: Vec::new(), offsets: vec![0] };
        for row in rows {
            col.flat.extend_from_slice(row.as_ref());
            col.offsets.push(col.flat.len());
        }
        col
    }

    /// Values of entry `i`.
    pub fn row(&self, i: usize) -> &[f64] {
        &self.flat[self.offsets[i]..self.offsets[i + 1]]
    }

    /// Element `index` of entry `row`, if present.
    pub fn get(&self, row: usize, index: usize) -> Option<f64> {
        self.row(row).get(index).copied()
    }

    /// Number of entries.
    pub fn n_entries(&self) -> usize {
        self.offsets.len().saturating_sub(1)
    }
}

/// Reads the baskets of one branch and converts them to `f64`.
pub struct BranchReader<'a> {
    file_data: &'a [u8],
    branch: &'a BranchInfo,
    is_large: bool,
}

impl<'a> BranchReader<'a> {
    /// Reader for `branch` over the whole file image.
    pub fn new(file_data: &'a [u8], branch: &'a BranchInfo, is_large: bool) -> Self {
        Self { file_data, branch, is_large }
    }

    /// One value per entry. Fails for branches whose entries hold several values.
    pub fn as_f64(&self) -> Result<Vec<f64>> {
        if self.branch.is_jagged() {
            return Err(RootError::TypeMismatch(format!(
                "branch '{}' is {:?}, read it as a jagged column",
                self.branch.name, self.branch.layout
            )));
        }
        Ok(self.as_jagged_f64()?.flat)
    }

    /// All values with entry boundaries. Scalar branches give one value per entry.
    pub fn as_jagged_f64(&self) -> Result<JaggedCol> {
        let parts = (0..self.branch.n_baskets())
            .into_par_iter()
            .map(|i| self.decode_basket(i))
            .collect::<Result<Vec<_>>>()?;

        let mut col = JaggedCol { flat: Vec::new(), offsets: vec![0] };
        for (values, counts) in parts {
            col.flat.extend(values);
            for n in counts {
                let last = col.offsets[col.offsets.len() - 1];
                col.offsets.push(last + n);
            }
        }

        let want = self.branch.entries as usize;
        if col.n_entries() > want {
            col.offsets.truncate(want + 1);
            col.flat.truncate(col.offsets[want]);
        } else if col.n_entries() < want {
            log::warn!(
                "branch '{}': baskets hold {} of {} entries",
                self.branch.name,
                col.n_entries(),
                want
            );
        }
        Ok(col)
    }

    /// Decode basket `i` into its values and per-entry value counts.
    fn decode_basket(&self, i: usize) -> Result<(Vec<f64>, Vec<usize>)> {
        let seek = self.branch.basket_seek[i];
        let basket = read_basket(self.file_data, seek, self.is_large)?;
        let leaf = self.branch.leaf_type;
        let size = leaf.byte_size();
        let n_entries = basket.nev_buf;

        match &self.branch.layout {
            BranchLayout::Scalar => {
                let values = decode_values(basket.data(), leaf, n_entries, &self.branch.name)?;
                Ok((values, vec![1; n_entries]))
            }
            BranchLayout::FixedArray(len) => {
                let values =
                    decode_values(basket.data(), leaf, n_entries * len, &self.branch.name)?;
                Ok((values, vec![*len; n_entries]))
            }
            BranchLayout::Counted { .. } => {
                let offsets = self.offsets_of(&basket)?;
                let data = basket.data();
                let mut values = Vec::new();
                let mut counts = Vec::with_capacity(n_entries);
                for w in offsets.windows(2) {
                    let bytes = &data[w[0]..w[1].max(w[0])];
                    values.extend(bytes.chunks_exact(size).map(|b| leaf.decode_f64(b)));
                    counts.push(bytes.len() / size);
                }
                Ok((values, counts))
            }
            BranchLayout::StlVector => {
                let offsets = self.offsets_of(&basket)?;
                let data = basket.data();
                let mut values = Vec::new();
                let mut counts = Vec::with_capacity(n_entries);
                for w in offsets.windows(2) {
                    let entry = &data[w[0]..w[1].max(w[0])];
                    let n = stl_vector_entry(entry, leaf, &mut values).map_err(|e| {
                        RootError::Deserialization(format!("branch '{}': {e}", self.branch.name))
                    })?;
                    counts.push(n);
                }
                Ok((values, counts))
            }
        }
    }

    fn offsets_of(&self, basket: &Basket) -> Result<Vec<usize>> {
        basket.entry_offsets()?.ok_or_else(|| {
            RootError::Deserialization(format!(
                "branch '{}' is {:?} but its basket has no entry offsets",
                self.branch.name, self.branch.layout
            ))
        })
    }
}

fn decode_values(data: &[u8], leaf: LeafType, n: usize, branch: &str) -> Result<Vec<f64>> {
    let need = n * leaf.byte_size();
    if data.len() < need {
        return Err(RootError::Deserialization(format!(
            "branch '{branch}': basket holds {} bytes, {n} values need {need}",
            data.len()
        )));
    }
    Ok(data[..need].chunks_exact(leaf.byte_size()).map(|b| leaf.decode_f64(b)).collect())
}

/// Append the elements of one `std::vector` entry to `out` and return how many there were.
fn stl_vector_entry(entry: &[u8], leaf: LeafType, out: &mut Vec<f64>) -> Result<usize> {
    if entry.is_empty() {
        return Ok(0);
    }
    if entry.len() < STL_VECTOR_HEADER {
        return Err(RootError::Deserialization(format!(
            "vector entry of {} bytes is shorter than its header",
            entry.len()
        )));
    }
    let mut raw = [0u8; 4];
    raw.copy_from_slice(&entry[6..10]);
    let n = i32::from_be_bytes(raw).max(0) as usize;
    let body = &entry[STL_VECTOR_HEADER..];
    let size = leaf.byte_size();
    if body.len() < n * size {
        return Err(RootError::Deserialization(format!(
            "vector entry claims {n} elements, {} bytes available",
            body.len()
        )));
    }
    out.extend(body[..n * size].chunks_exact(size).map(|b| leaf.decode_f64(b)));
    Ok(n)
}
