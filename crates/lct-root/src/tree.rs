//! TTree and branch metadata.

/// Element type of a leaf.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeafType {
    /// `Bool_t` (`TLeafO`).
    Bool,
    /// `Char_t` (`TLeafB`).
    I8,
    /// `UChar_t` (`TLeafB`, unsigned).
    U8,
    /// `Short_t` (`TLeafS`).
    I16,
    /// `UShort_t` (`TLeafS`, unsigned).
    U16,
    /// `Int_t` (`TLeafI`).
    I32,
    /// `UInt_t` (`TLeafI`, unsigned).
    U32,
    /// `Long64_t` (`TLeafL`).
    I64,
    /// `ULong64_t` (`TLeafL`, unsigned).
    U64,
    /// `Float_t` (`TLeafF`).
    F32,
    /// `Double_t` (`TLeafD`).
    F64,
}

impl LeafType {
    /// Bytes per element.
    pub fn byte_size(self) -> usize {
        match self {
            LeafType::Bool | LeafType::I8 | LeafType::U8 => 1,
            LeafType::I16 | LeafType::U16 => 2,
            LeafType::I32 | LeafType::U32 | LeafType::F32 => 4,
            LeafType::I64 | LeafType::U64 | LeafType::F64 => 8,
        }
    }

    /// Leaf type for a `TLeaf*` class name.
    pub fn from_leaf_class(class_name: &str, unsigned: bool) -> Option<Self> {
        let t = match (class_name, unsigned) {
            ("TLeafO", _) => LeafType::Bool,
            ("TLeafB", false) => LeafType::I8,
            ("TLeafB", true) => LeafType::U8,
            ("TLeafS", false) => LeafType::I16,
            ("TLeafS", true) => LeafType::U16,
            ("TLeafI", false) => LeafType::I32,
            ("TLeafI", true) => LeafType::U32,
            ("TLeafL", false) => LeafType::I64,
            ("TLeafL", true) => LeafType::U64,
            ("TLeafF", _) => LeafType::F32,
            ("TLeafD", _) => LeafType::F64,
            _ => return None,
        };
        Some(t)
    }

    /// Leaf type for a C++ element type name, as found in `vector<...>`.
    pub fn from_cpp_name(name: &str) -> Option<Self> {
        let t = match name.trim() {
            "bool" | "Bool_t" => LeafType::Bool,
            "char" | "Char_t" | "int8_t" => LeafType::I8,
            "unsigned char" | "UChar_t" | "uint8_t" => LeafType::U8,
            "short" | "Short_t" | "int16_t" => LeafType::I16,
            "unsigned short" | "UShort_t" | "uint16_t" => LeafType::U16,
            "int" | "Int_t" | "int32_t" => LeafType::I32,
            "unsigned int" | "UInt_t" | "uint32_t" => LeafType::U32,
            "long" | "long long" | "Long64_t" | "int64_t" => LeafType::I64,
            "unsigned long" | "unsigned long long" | "ULong64_t" | "uint64_t" => LeafType::U64,
            "float" | "Float_t" => LeafType::F32,
            "double" | "Double_t" => LeafType::F64,
            _ => return None,
        };
        Some(t)
    }

    /// Leaf type for a ROOT `EDataType` code (the `fType` of a `TLeafElement`).
    pub fn from_data_type(code: i32) -> Option<Self> {
        let t = match code {
            1 => LeafType::I8,
            2 => LeafType::I16,
            3 | 6 => LeafType::I32,
            4 | 16 => LeafType::I64,
            5 => LeafType::F32,
            8 => LeafType::F64,
            11 => LeafType::U8,
            12 => LeafType::U16,
            13 | 14 => LeafType::U32,
            17 => LeafType::U64,
            18 => LeafType::Bool,
            _ => return None,
        };
        Some(t)
    }

    /// Decode one big-endian element at the start of `b` as `f64`.
    ///
    /// `b` must hold at least [`byte_size`](Self::byte_size) bytes.
    pub fn decode_f64(self, b: &[u8]) -> f64 {
        fn arr<const N: usize>(b: &[u8]) -> [u8; N] {
            let mut a = [0u8; N];
            a.copy_from_slice(&b[..N]);
            a
        }
        match self {
            LeafType::Bool => f64::from(u8::from(b[0] != 0)),
            LeafType::I8 => f64::from(b[0] as i8),
            LeafType::U8 => f64::from(b[0]),
            LeafType::I16 => f64::from(i16::from_be_bytes(arr(b))),
            LeafType::U16 => f64::from(u16::from_be_bytes(arr(b))),
            LeafType::I32 => f64::from(i32::from_be_bytes(arr(b))),
            LeafType::U32 => f64::from(u32::from_be_bytes(arr(b))),
            LeafType::I64 => i64::from_be_bytes(arr(b)) as f64,
            LeafType::U64 => u64::from_be_bytes(arr(b)) as f64,
            LeafType::F32 => f64::from(f32::from_be_bytes(arr(b))),
            LeafType::F64 => f64::from_be_bytes(arr(b)),
        }
    }
}

/// How the values of one entry are laid out in a basket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BranchLayout {
    /// One value per entry.
    Scalar,
    /// `fLen` values per entry, e.g. `x[3]/F`.
    FixedArray(usize),
    /// A counter leaf gives the number of values per entry, e.g. `vtxxx[nvt]/F`.
    Counted {
        /// Name of the counter leaf.
        counter: String,
    },
    /// `std::vector<T>` streamed member-wise: each entry is a byte-count header,
    /// an `i32` length and the elements.
    StlVector,
}

/// Metadata for one branch.
#[derive(Debug, Clone)]
pub struct BranchInfo {
    /// Branch name.
    pub name: String,
    /// Branch title (for leaf-list branches this is the leaf list, e.g. `vtxxx[nvt]/F`).
    pub title: String,
    /// Element type.
    pub leaf_type: LeafType,
    /// Per-entry layout.
    pub layout: BranchLayout,
    /// Entries in this branch.
    pub entries: u64,
    /// `fEntryOffsetLen`; nonzero for variable-size entries.
    pub entry_offset_len: usize,
    /// First entry of each basket, plus the end entry.
    pub basket_entry: Vec<u64>,
    /// File offsets of the written baskets.
    pub basket_seek: Vec<u64>,
    /// On-disk basket sizes.
    pub basket_bytes: Vec<u32>,
}

impl BranchInfo {
    /// Number of written baskets.
    pub fn n_baskets(&self) -> usize {
        self.basket_seek.len()
    }

    /// Entries stored in basket `i`.
    pub fn basket_entries(&self, i: usize) -> usize {
        let start = self.basket_entry.get(i).copied().unwrap_or(0);
        let end = self.basket_entry.get(i + 1).copied().unwrap_or(self.entries);
        end.saturating_sub(start) as usize
    }

    /// Whether entries hold more than one value.
    pub fn is_jagged(&self) -> bool {
        !matches!(self.layout, BranchLayout::Scalar)
    }
}

/// A TTree and its flattened branch list.
#[derive(Debug, Clone)]
pub struct Tree {
    /// Tree name.
    pub name: String,
    /// Tree title.
    pub title: String,
    /// `fEntries`.
    pub entries: u64,
    /// Every branch, sub-branches included, in streaming order.
    pub branches: Vec<BranchInfo>,
}

impl Tree {
    /// Look up a branch by name.
    pub fn find_branch(&self, name: &str) -> Option<&BranchInfo> {
        self.branches.iter().find(|b| b.name == name)
    }

    /// All branch names.
    pub fn branch_names(&self) -> Vec<&str> {
        self.branches.iter().map(|b| b.name.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leaf_classes_map_to_types() {
        assert_eq!(LeafType::from_leaf_class("TLeafF", false), Some(LeafType::F32));
        assert_eq!(LeafType::from_leaf_class("TLeafI", true), Some(LeafType::U32));
        assert_eq!(LeafType::from_leaf_class("TLeafElement", false), None);
        assert_eq!(LeafType::from_cpp_name(" double "), Some(LeafType::F64));
        assert_eq!(LeafType::from_cpp_name("MyClass"), None);
        assert_eq!(LeafType::from_data_type(5), Some(LeafType::F32));
        assert_eq!(LeafType::from_data_type(61), None);
    }

    #[test]
    fn decode_elements() {
        assert_eq!(LeafType::I32.decode_f64(&(-13i32).to_be_bytes()), -13.0);
        assert_eq!(LeafType::F32.decode_f64(&0.25f32.to_be_bytes()), 0.25);
        assert_eq!(LeafType::U16.decode_f64(&[0x01, 0x00]), 256.0);
        assert_eq!(LeafType::Bool.decode_f64(&[3]), 1.0);
    }

    #[test]
    fn basket_entry_bounds() {
        let b = BranchInfo {
            name: "vtxxx".into(),
            title: "vtxxx[nvt]/F".into(),
            leaf_type: LeafType::F32,
            layout: BranchLayout::Counted { counter: "nvt".into() },
            entries: 25,
            entry_offset_len: 40,
            basket_entry: vec![0, 10, 25],
            basket_seek: vec![100, 900],
            basket_bytes: vec![800, 800],
        };
        assert_eq!(b.n_baskets(), 2);
        assert_eq!(b.basket_entries(0), 10);
        assert_eq!(b.basket_entries(1), 15);
        assert!(b.is_jagged());
    }
}
