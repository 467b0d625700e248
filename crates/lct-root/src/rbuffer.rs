//! Cursor over ROOT's big-endian streamer encoding.

use crate::error::{Result, RootError};

/// `kByteCountMask`: set on the first word of a versioned object that carries a byte count.
pub const K_BYTE_COUNT_MASK: u32 = 0x4000_0000;

/// Reads big-endian primitives, ROOT strings and version headers from a byte slice.
///
/// `origin` is the distance from the start of the enclosing TKey to the first byte
/// of `data`. ROOT's object/class reference tags are offsets relative to the key
/// start, so readers of serialized `TObjArray`s need it to resolve back-references.
pub struct RBuffer<'a> {
    data: &'a [u8],
    pos: usize,
    origin: usize,
}

macro_rules! read_be {
    ($(#[$doc:meta] $name:ident -> $ty:ty),* $(,)?) => {
        $(
            #[$doc]
            pub fn $name(&mut self) -> Result<$ty> {
                const N: usize = std::mem::size_of::<$ty>();
                let b = self.read_bytes(N)?;
                let mut raw = [0u8; N];
                raw.copy_from_slice(b);
                Ok(<$ty>::from_be_bytes(raw))
            }
        )*
    };
}

impl<'a> RBuffer<'a> {
    /// Reader over `data` with no key offset.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0, origin: 0 }
    }

    /// Reader over an object payload that started `origin` bytes after its key.
    pub fn with_origin(data: &'a [u8], origin: usize) -> Self {
        Self { data, pos: 0, origin }
    }

    /// Current read position.
    #[inline]
    pub fn pos(&self) -> usize {
        self.pos
    }

    /// Position measured from the start of the enclosing key.
    #[inline]
    pub fn displacement(&self) -> usize {
        self.pos + self.origin
    }

    /// Total length of the underlying slice.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the underlying slice is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Bytes left after the cursor.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    /// Move the cursor to an absolute position.
    pub fn set_pos(&mut self, pos: usize) {
        self.pos = pos;
    }

    /// Advance by `n` bytes.
    pub fn skip(&mut self, n: usize) -> Result<()> {
        self.ensure(n)?;
        self.pos += n;
        Ok(())
    }

    /// Borrow the next `n` bytes and advance past them.
    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        self.ensure(n)?;
        let out = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(out)
    }

    /// Read one byte.
    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read_bytes(1)?[0])
    }

    /// Read one signed byte.
    pub fn read_i8(&mut self) -> Result<i8> {
        Ok(self.read_u8()? as i8)
    }

    /// Read a one-byte `Bool_t`.
    pub fn read_bool(&mut self) -> Result<bool> {
        Ok(self.read_u8()? != 0)
    }

    read_be! {
        /// Read a big-endian `u16`.
        read_u16 -> u16,
        /// Read a big-endian `i16`.
        read_i16 -> i16,
        /// Read a big-endian `u32`.
        read_u32 -> u32,
        /// Read a big-endian `i32`.
        read_i32 -> i32,
        /// Read a big-endian `u64`.
        read_u64 -> u64,
        /// Read a big-endian `i64`.
        read_i64 -> i64,
        /// Read a big-endian `f32`.
        read_f32 -> f32,
        /// Read a big-endian `f64`.
        read_f64 -> f64,
    }

    /// Read a `TString`: one length byte (255 escapes to a `u32` length), then bytes.
    pub fn read_string(&mut self) -> Result<String> {
        let len = match self.read_u8()? {
            255 => self.read_u32()? as usize,
            n => n as usize,
        };
        let bytes = self.read_bytes(len)?;
        Ok(String::from_utf8_lossy(bytes).into_owned())
    }

    /// Read a NUL-terminated C string (class names after `kNewClassTag`).
    pub fn read_cstring(&mut self) -> Result<String> {
        let rest = &self.data[self.pos.min(self.data.len())..];
        let nul = rest.iter().position(|&b| b == 0).ok_or(RootError::BufferUnderflow {
            offset: self.pos,
            need: rest.len() + 1,
            have: rest.len(),
        })?;
        let s = String::from_utf8_lossy(&rest[..nul]).into_owned();
        self.pos += nul + 1;
        Ok(s)
    }

    /// Read a streamer version header.
    ///
    /// Returns the class version and, when the byte-count bit is set, the absolute
    /// position (in this buffer) one past the end of the object.
    pub fn read_version(&mut self) -> Result<(u16, Option<usize>)> {
        let start = self.pos;
        let word = self.read_u32()?;
        if word & K_BYTE_COUNT_MASK == 0 {
            // Bare version: only two bytes belong to the header.
            self.pos = start;
            let version = self.read_u16()?;
            return Ok((version, None));
        }
        let count = (word & !K_BYTE_COUNT_MASK) as usize;
        let version = self.read_u16()?;
        Ok((version, Some(start + 4 + count)))
    }

    /// Skip a whole versioned object. Objects without a byte count cannot be skipped.
    pub fn skip_versioned(&mut self, what: &str) -> Result<u16> {
        let (version, end) = self.read_version()?;
        let end = end.ok_or_else(|| {
            RootError::Deserialization(format!("{what} has no byte count, cannot skip"))
        })?;
        self.set_pos(end);
        Ok(version)
    }

    /// Read a `TObject` header and return `(fUniqueID, fBits)`.
    pub fn read_tobject(&mut self) -> Result<(u32, u32)> {
        let _version = self.read_u16()?;
        let unique_id = self.read_u32()?;
        let bits = self.read_u32()?;
        // kIsReferenced objects carry a process-id slot.
        if bits & 0x0000_0010 != 0 {
            self.skip(2)?;
        }
        Ok((unique_id, bits))
    }

    /// Read a `TNamed` and return `(fName, fTitle)`.
    pub fn read_tnamed(&mut self) -> Result<(String, String)> {
        let _ = self.read_version()?;
        self.read_tobject()?;
        let name = self.read_string()?;
        let title = self.read_string()?;
        Ok((name, title))
    }

    /// Read `n` big-endian `i32` values.
    pub fn read_array_i32(&mut self, n: usize) -> Result<Vec<i32>> {
        (0..n).map(|_| self.read_i32()).collect()
    }

    /// Read `n` big-endian `i64` values.
    pub fn read_array_i64(&mut self, n: usize) -> Result<Vec<i64>> {
        (0..n).map(|_| self.read_i64()).collect()
    }

    fn ensure(&self, n: usize) -> Result<()> {
        let have = self.data.len().saturating_sub(self.pos);
        if n > have {
            return Err(RootError::BufferUnderflow { offset: self.pos, need: n, have });
        }
        Ok(())
    }
}
