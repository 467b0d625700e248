//! TFile header parsing and the top-level file interface.

use std::fs;
use std::ops::Deref;
use std::path::{Path, PathBuf};

use crate::branch_reader::{BranchReader, JaggedCol};
use crate::decompress::decompress;
use crate::directory::{Directory, DirectoryHeader};
use crate::error::{Result, RootError};
use crate::key::{Key, KeyInfo};
use crate::objects;
use crate::rbuffer::RBuffer;
use crate::tree::Tree;

/// First four bytes of every ROOT file.
pub const ROOT_MAGIC: &[u8; 4] = b"root";

/// Smallest file that can hold a complete header.
const MIN_FILE_LEN: usize = 64;

/// Backing storage: memory-mapped for files on disk, owned for in-memory images.
enum DataSource {
    Owned(Vec<u8>),
    Mmap(memmap2::Mmap),
}

impl Deref for DataSource {
    type Target = [u8];

    #[inline]
    fn deref(&self) -> &[u8] {
        match self {
            DataSource::Owned(v) => v,
            DataSource::Mmap(m) => m,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct FileHeader {
    version: u32,
    is_large: bool,
    top: DirectoryHeader,
}

/// A ROOT file opened for reading trees.
pub struct RootFile {
    data: DataSource,
    header: FileHeader,
    path: PathBuf,
}

impl std::fmt::Debug for RootFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RootFile")
            .field("path", &self.path)
            .field("version", &self.header.version)
            .field("len", &self.data.len())
            .finish()
    }
}

impl RootFile {
    /// Memory-map and open a ROOT file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = fs::File::open(&path)?;
        // SAFETY: the map is read-only; the file is not expected to change while open.
        let mmap = unsafe { memmap2::Mmap::map(&file)? };
        Self::from_source(DataSource::Mmap(mmap), path)
    }

    /// Open a ROOT file image held in memory. `path` is used for diagnostics only.
    pub fn from_bytes(data: Vec<u8>, path: impl Into<PathBuf>) -> Result<Self> {
        Self::from_source(DataSource::Owned(data), path.into())
    }

    fn from_source(data: DataSource, path: PathBuf) -> Result<Self> {
        if data.len() < MIN_FILE_LEN || &data[0..4] != ROOT_MAGIC {
            return Err(RootError::BadMagic);
        }
        let header = parse_header(&data)?;
        log::debug!(
            "opened {} (ROOT version {}, {} bytes)",
            path.display(),
            header.version,
            data.len()
        );
        Ok(Self { data, header, path })
    }

    /// Path this file was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the file uses 64-bit seek pointers.
    pub fn is_large(&self) -> bool {
        self.header.is_large
    }

    /// Keys of the top-level directory.
    pub fn list_keys(&self) -> Result<Vec<KeyInfo>> {
        Ok(self.top_directory()?.keys().iter().map(KeyInfo::from).collect())
    }

    /// Keys of the directory at `dir_path` (`""` or `"/"` for the top level).
    pub fn list_keys_in(&self, dir_path: &str) -> Result<Vec<KeyInfo>> {
        let dir = self.walk(path_parts(dir_path))?;
        Ok(dir.keys().iter().map(KeyInfo::from).collect())
    }

    /// Read a TTree by path, e.g. `"MyLCTuple"` or `"/analysis/MyLCTuple"`.
    ///
    /// A `;cycle` suffix on the final component is ignored; the highest cycle wins.
    pub fn get_tree(&self, path: &str) -> Result<Tree> {
        let mut parts = path_parts(path);
        let name = parts.pop().ok_or_else(|| RootError::TreeNotFound(path.to_string()))?;
        let name = name.split(';').next().unwrap_or(name);
        let dir = self
            .walk(parts)
            .map_err(|_| RootError::TreeNotFound(path.to_string()))?;
        let key = dir.find_key(name).ok_or_else(|| RootError::TreeNotFound(path.to_string()))?;
        if key.class_name != "TTree" {
            return Err(RootError::TreeNotFound(format!(
                "'{path}' is {}, not TTree",
                key.class_name
            )));
        }
        let payload = self.read_key_payload(key)?;
        objects::read_ttree(&payload, key.key_len as usize)
    }

    /// Reader for the branch called `branch` of `tree`.
    pub fn branch_reader<'a>(&'a self, tree: &'a Tree, branch: &str) -> Result<BranchReader<'a>> {
        let info = tree
            .find_branch(branch)
            .ok_or_else(|| RootError::BranchNotFound(branch.to_string()))?;
        Ok(BranchReader::new(&self.data, info, self.header.is_large))
    }

    /// One value per entry of a scalar branch.
    pub fn branch_data(&self, tree: &Tree, branch: &str) -> Result<Vec<f64>> {
        self.branch_reader(tree, branch)?.as_f64()
    }

    /// Values and entry boundaries of any branch.
    pub fn branch_data_jagged(&self, tree: &Tree, branch: &str) -> Result<JaggedCol> {
        self.branch_reader(tree, branch)?.as_jagged_f64()
    }

    fn top_directory(&self) -> Result<Directory> {
        Directory::read_key_list(&self.data, self.header.top, self.header.is_large)
    }

    fn walk(&self, parts: Vec<&str>) -> Result<Directory> {
        let mut dir = self.top_directory()?;
        for part in parts {
            let key = dir.find_key(part).ok_or_else(|| RootError::KeyNotFound(part.to_string()))?;
            if !key.class_name.starts_with("TDirectory") {
                return Err(RootError::KeyNotFound(format!(
                    "'{part}' is {}, not a directory",
                    key.class_name
                )));
            }
            let payload = self.read_key_payload(key)?;
            dir = Directory::read_from_payload(&payload, &self.data, self.header.is_large)?;
        }
        Ok(dir)
    }

    fn read_key_payload(&self, key: &Key) -> Result<Vec<u8>> {
        let start = usize::try_from(key.seek_key).map_err(|_| {
            RootError::Deserialization(format!("seek {} out of range", key.seek_key))
        })?;
        let end = start + key.n_bytes as usize;
        if end > self.data.len() {
            return Err(RootError::BufferUnderflow {
                offset: start,
                need: key.n_bytes as usize,
                have: self.data.len().saturating_sub(start),
            });
        }
        let stored = &self.data[start + key.key_len as usize..end];
        if key.is_compressed() {
            decompress(stored, key.obj_len as usize)
        } else {
            Ok(stored.to_vec())
        }
    }
}

fn path_parts(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

/// Parse the file header and the top directory record at `fBEGIN + fNbytesName`.
///
/// ```text
/// offset  size  field
///    0      4   "root"
///    4      4   fVersion (>= 1000000 for 64-bit seeks)
///    8      4   fBEGIN
///   12    4|8   fEND
///         4|8   fSeekFree
///           4   fNbytesFree
///           4   nfree
///           4   fNbytesName
/// ```
fn parse_header(data: &[u8]) -> Result<FileHeader> {
    let mut r = RBuffer::new(data);
    r.skip(4)?;
    let version = r.read_u32()?;
    let is_large = version >= 1_000_000;
    let begin = r.read_u32()? as usize;
    // fEND, fSeekFree
    r.skip(if is_large { 16 } else { 8 })?;
    let _nbytes_free = r.read_u32()?;
    let _nfree = r.read_u32()?;
    let nbytes_name = r.read_u32()? as usize;

    let dir_offset = begin + nbytes_name;
    if dir_offset >= data.len() {
        return Err(RootError::Deserialization("top directory lies past end of file".into()));
    }
    r.set_pos(dir_offset);
    let top = DirectoryHeader::read(&mut r)?;
    Ok(FileHeader { version, is_large, top })
}
