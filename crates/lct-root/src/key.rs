//! TKey records: the headers that locate every object stored in a ROOT file.

use crate::error::Result;
use crate::rbuffer::RBuffer;

/// One TKey header.
#[derive(Debug, Clone)]
pub struct Key {
    /// Bytes on disk, key header included.
    pub n_bytes: u32,
    /// TKey class version; values above 1000 mean 64-bit seeks.
    pub version: u16,
    /// Uncompressed object length.
    pub obj_len: u32,
    /// Length of this header.
    pub key_len: u16,
    /// Cycle number within the directory.
    pub cycle: u16,
    /// Absolute file offset of the key.
    pub seek_key: u64,
    /// Offset of the owning directory.
    pub seek_pdir: u64,
    /// Class of the stored object.
    pub class_name: String,
    /// Object name.
    pub name: String,
    /// Object title.
    pub title: String,
}

/// Name/class/cycle triple returned by directory listings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyInfo {
    /// Object name.
    pub name: String,
    /// Object class, e.g. `TTree` or `TDirectoryFile`.
    pub class_name: String,
    /// Cycle number.
    pub cycle: u16,
}

impl From<&Key> for KeyInfo {
    fn from(key: &Key) -> Self {
        Self { name: key.name.clone(), class_name: key.class_name.clone(), cycle: key.cycle }
    }
}

impl Key {
    /// Parse a key header at the cursor.
    pub fn read(r: &mut RBuffer, is_large: bool) -> Result<Self> {
        let n_bytes = r.read_u32()?;
        let version = r.read_u16()?;
        let obj_len = r.read_u32()?;
        let _datime = r.read_u32()?;
        let key_len = r.read_u16()?;
        let cycle = r.read_u16()?;

        let wide = is_large || version > 1000;
        let seek_key = if wide { r.read_u64()? } else { r.read_u32()? as u64 };
        let seek_pdir = if wide { r.read_u64()? } else { r.read_u32()? as u64 };

        Ok(Key {
            n_bytes,
            version,
            obj_len,
            key_len,
            cycle,
            seek_key,
            seek_pdir,
            class_name: r.read_string()?,
            name: r.read_string()?,
            title: r.read_string()?,
        })
    }

    /// Whether the stored object is compressed.
    pub fn is_compressed(&self) -> bool {
        self.obj_len as usize != (self.n_bytes as usize).saturating_sub(self.key_len as usize)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Serialize a small-file key header the way ROOT writes it.
    pub(crate) fn encode_key(
        n_bytes: u32,
        obj_len: u32,
        key_len: u16,
        seek_key: u32,
        class_name: &str,
        name: &str,
    ) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&n_bytes.to_be_bytes());
        out.extend_from_slice(&4u16.to_be_bytes());
        out.extend_from_slice(&obj_len.to_be_bytes());
        out.extend_from_slice(&0u32.to_be_bytes());
        out.extend_from_slice(&key_len.to_be_bytes());
        out.extend_from_slice(&1u16.to_be_bytes());
        out.extend_from_slice(&seek_key.to_be_bytes());
        out.extend_from_slice(&100u32.to_be_bytes());
        for s in [class_name, name, ""] {
            out.push(s.len() as u8);
            out.extend_from_slice(s.as_bytes());
        }
        out
    }

    #[test]
    fn parses_small_key() {
        let bytes = encode_key(120, 80, 50, 4096, "TTree", "MyLCTuple");
        let key = Key::read(&mut RBuffer::new(&bytes), false).unwrap();
        assert_eq!(key.class_name, "TTree");
        assert_eq!(key.name, "MyLCTuple");
        assert_eq!(key.seek_key, 4096);
        assert_eq!(key.seek_pdir, 100);
        assert!(key.is_compressed());
        assert_eq!(KeyInfo::from(&key).cycle, 1);
    }

    #[test]
    fn uncompressed_when_lengths_match() {
        let bytes = encode_key(130, 80, 50, 4096, "TTree", "t");
        let key = Key::read(&mut RBuffer::new(&bytes), false).unwrap();
        assert!(!key.is_compressed());
    }
}
