//! TBasket records: the compressed data blocks behind every branch.

use crate::decompress::decompress;
use crate::error::{Result, RootError};
use crate::key::Key;
use crate::rbuffer::RBuffer;

/// One basket, decompressed.
///
/// The payload holds the entry data up to [`border`](Self::border). Baskets of
/// variable-size branches append an entry-offset table after it.
#[derive(Debug, Clone)]
pub struct Basket {
    /// Key header that precedes the basket.
    pub key: Key,
    /// `fBufferSize`.
    pub buffer_size: i32,
    /// `fNevBufSize`: bytes per entry for fixed-size branches.
    pub nev_buf_size: i32,
    /// `fNevBuf`: entries in this basket.
    pub nev_buf: usize,
    /// `fLast`: end of the entry data, measured from the key start.
    pub last: usize,
    payload: Vec<u8>,
}

impl Basket {
    /// End of the entry data within the payload.
    pub fn border(&self) -> usize {
        self.last.saturating_sub(self.key.key_len as usize).min(self.payload.len())
    }

    /// Entry data without the offset table.
    pub fn data(&self) -> &[u8] {
        &self.payload[..self.border()]
    }

    /// Start of each entry within [`data`](Self::data), plus the end position.
    ///
    /// Returns `None` when the basket carries no offset table.
    pub fn entry_offsets(&self) -> Result<Option<Vec<usize>>> {
        let border = self.border();
        if self.payload.len() <= border {
            return Ok(None);
        }
        let key_len = self.key.key_len as usize;
        let mut r = RBuffer::new(&self.payload[border..]);
        let n = r.read_i32()?.max(0) as usize;
        let stored = n.min(self.nev_buf);
        let mut offsets = Vec::with_capacity(self.nev_buf + 1);
        for _ in 0..stored {
            let raw = r.read_i32()?;
            let off = (raw as i64 - key_len as i64).clamp(0, border as i64) as usize;
            offsets.push(off);
        }
        if offsets.len() != self.nev_buf {
            return Err(RootError::Deserialization(format!(
                "basket offset table holds {stored} entries, fNevBuf is {}",
                self.nev_buf
            )));
        }
        offsets.push(border);
        Ok(Some(offsets))
    }
}

/// Read and decompress the basket whose key starts at `seek`.
pub fn read_basket(file_data: &[u8], seek: u64, is_large: bool) -> Result<Basket> {
    let pos = usize::try_from(seek)
        .map_err(|_| RootError::Deserialization(format!("basket seek {seek} out of range")))?;
    if pos >= file_data.len() {
        return Err(RootError::BufferUnderflow { offset: pos, need: 1, have: 0 });
    }

    let mut r = RBuffer::new(file_data);
    r.set_pos(pos);
    let key = Key::read(&mut r, is_large)?;
    let _version = r.read_u16()?;
    let buffer_size = r.read_i32()?;
    let nev_buf_size = r.read_i32()?;
    let nev_buf = r.read_i32()?.max(0) as usize;
    let last = r.read_i32()?.max(0) as usize;
    let _flag = r.read_u8()?;

    let start = pos + key.key_len as usize;
    let end = pos + key.n_bytes as usize;
    if end > file_data.len() || start > end {
        return Err(RootError::BufferUnderflow {
            offset: pos,
            need: key.n_bytes as usize,
            have: file_data.len() - pos,
        });
    }
    let stored = &file_data[start..end];
    let payload =
        if key.is_compressed() { decompress(stored, key.obj_len as usize)? } else { stored.to_vec() };

    Ok(Basket { key, buffer_size, nev_buf_size, nev_buf, last, payload })
}
