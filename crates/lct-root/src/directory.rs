//! TDirectory key lists.

use crate::error::{Result, RootError};
use crate::key::Key;
use crate::rbuffer::RBuffer;

/// Seek information parsed from a `TDirectory` streamer.
#[derive(Debug, Clone, Copy)]
pub struct DirectoryHeader {
    /// Offset of the key list.
    pub seek_keys: u64,
    /// Size of the key list record.
    pub nbytes_keys: u32,
}

impl DirectoryHeader {
    /// Parse the `TDirectory` streamer at the cursor.
    pub fn read(r: &mut RBuffer) -> Result<Self> {
        let version = r.read_u16()?;
        let _ctime = r.read_u32()?;
        let _mtime = r.read_u32()?;
        let nbytes_keys = r.read_u32()?;
        let _nbytes_name = r.read_u32()?;
        // seek_dir, seek_parent, seek_keys
        let seeks: [u64; 3] = if version > 1000 {
            [r.read_u64()?, r.read_u64()?, r.read_u64()?]
        } else {
            [r.read_u32()? as u64, r.read_u32()? as u64, r.read_u32()? as u64]
        };
        Ok(Self { seek_keys: seeks[2], nbytes_keys })
    }
}

/// The keys of one directory, in file order.
#[derive(Debug, Clone, Default)]
pub struct Directory {
    keys: Vec<Key>,
}

impl Directory {
    /// Read the key list record at `header.seek_keys`.
    ///
    /// The record is itself a TKey followed by a `u32` key count and the keys.
    pub fn read_key_list(file_data: &[u8], header: DirectoryHeader, is_large: bool) -> Result<Self> {
        if header.seek_keys == 0 {
            return Ok(Self::default());
        }
        let start = usize::try_from(header.seek_keys).map_err(|_| {
            RootError::Deserialization(format!("seek_keys {} out of range", header.seek_keys))
        })?;
        if start >= file_data.len() {
            return Err(RootError::BufferUnderflow {
                offset: start,
                need: header.nbytes_keys as usize,
                have: 0,
            });
        }
        let mut r = RBuffer::new(file_data);
        r.set_pos(start);
        Key::read(&mut r, is_large)?;
        let n_keys = r.read_u32()? as usize;
        let keys = (0..n_keys).map(|_| Key::read(&mut r, is_large)).collect::<Result<Vec<_>>>()?;
        Ok(Self { keys })
    }

    /// Read a subdirectory from the payload of its `TDirectoryFile` key.
    pub fn read_from_payload(payload: &[u8], file_data: &[u8], is_large: bool) -> Result<Self> {
        let header = DirectoryHeader::read(&mut RBuffer::new(payload))?;
        Self::read_key_list(file_data, header, is_large)
    }

    /// All keys.
    pub fn keys(&self) -> &[Key] {
        &self.keys
    }

    /// Highest cycle of the key called `name`.
    pub fn find_key(&self, name: &str) -> Option<&Key> {
        self.keys.iter().filter(|k| k.name == name).max_by_key(|k| k.cycle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::tests::encode_key;

    #[test]
    fn key_list_and_highest_cycle() {
        let mut file = vec![0u8; 16];
        let list_key = encode_key(0, 0, 30, 16, "TFile", "f.root");
        file.extend_from_slice(&list_key);
        file.extend_from_slice(&3u32.to_be_bytes());
        file.extend_from_slice(&encode_key(200, 100, 40, 1000, "TTree", "MyLCTuple"));
        let mut second = encode_key(210, 100, 40, 2000, "TTree", "MyLCTuple");
        // Bump the cycle field (bytes 16..18) to 2.
        second[16..18].copy_from_slice(&2u16.to_be_bytes());
        file.extend_from_slice(&second);
        file.extend_from_slice(&encode_key(90, 90, 40, 3000, "TDirectoryFile", "sub"));

        let header = DirectoryHeader { seek_keys: 16, nbytes_keys: 0 };
        let dir = Directory::read_key_list(&file, header, false).unwrap();
        assert_eq!(dir.keys().len(), 3);
        let key = dir.find_key("MyLCTuple").unwrap();
        assert_eq!(key.cycle, 2);
        assert_eq!(key.seek_key, 2000);
        assert!(dir.find_key("missing").is_none());
    }

    #[test]
    fn empty_when_seek_is_zero() {
        let header = DirectoryHeader { seek_keys: 0, nbytes_keys: 0 };
        assert!(Directory::read_key_list(&[], header, false).unwrap().keys().is_empty());
    }
}
