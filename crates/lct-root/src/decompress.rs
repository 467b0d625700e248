//! ROOT compressed-block decoding.
//!
//! A compressed object is a sequence of blocks, each with a 9-byte header:
//! a two-letter algorithm tag (`ZL`, `L4`, `ZS`, `XZ`), one method byte, then the
//! compressed and uncompressed sizes as 3-byte little-endian integers.

use std::cell::RefCell;
use std::io::Read;

use crate::error::{Result, RootError};

const BLOCK_HEADER_LEN: usize = 9;
const LZ4_CHECKSUM_LEN: usize = 8;

thread_local! {
    static ZSTD: RefCell<ruzstd::decoding::FrameDecoder> =
        RefCell::new(ruzstd::decoding::FrameDecoder::new());
}

/// Compression algorithm named by a block tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Algorithm {
    /// `ZL`: zlib/deflate.
    Zlib,
    /// `L4`: LZ4 with an xxhash64 prefix.
    Lz4,
    /// `ZS`: Zstandard.
    Zstd,
    /// `XZ`: LZMA in an xz container.
    Xz,
}

impl Algorithm {
    fn from_tag(tag: &[u8]) -> Result<Self> {
        match tag {
            b"ZL" => Ok(Self::Zlib),
            b"L4" => Ok(Self::Lz4),
            b"ZS" => Ok(Self::Zstd),
            b"XZ" => Ok(Self::Xz),
            other => Err(RootError::Decompression(format!(
                "unsupported compression algorithm tag {:?}",
                String::from_utf8_lossy(other)
            ))),
        }
    }
}

/// Decompress the blocks in `src`, which must inflate to exactly `expected_len` bytes.
pub fn decompress(src: &[u8], expected_len: usize) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(expected_len);
    let mut rest = src;

    while out.len() < expected_len {
        if rest.len() < BLOCK_HEADER_LEN {
            break;
        }
        let algorithm = Algorithm::from_tag(&rest[..2])?;
        let c_size = le24(&rest[3..6]);
        let u_size = le24(&rest[6..9]);
        rest = &rest[BLOCK_HEADER_LEN..];
        if c_size > rest.len() {
            return Err(RootError::Decompression(format!(
                "block declares {c_size} compressed bytes, {} available",
                rest.len()
            )));
        }
        let (block, tail) = rest.split_at(c_size);
        let inflated = inflate(algorithm, block, u_size)?;
        if inflated.len() != u_size {
            return Err(RootError::Decompression(format!(
                "{algorithm:?} block inflated to {} bytes, header says {u_size}",
                inflated.len()
            )));
        }
        out.extend_from_slice(&inflated);
        rest = tail;
    }

    if out.len() != expected_len {
        return Err(RootError::Decompression(format!(
            "decompressed {} bytes, expected {expected_len}",
            out.len()
        )));
    }
    Ok(out)
}

fn inflate(algorithm: Algorithm, block: &[u8], u_size: usize) -> Result<Vec<u8>> {
    match algorithm {
        Algorithm::Zlib => {
            let mut out = Vec::with_capacity(u_size);
            flate2::read::ZlibDecoder::new(block)
                .read_to_end(&mut out)
                .map_err(|e| RootError::Decompression(format!("zlib: {e}")))?;
            Ok(out)
        }
        Algorithm::Lz4 => {
            let payload = block.get(LZ4_CHECKSUM_LEN..).ok_or_else(|| {
                RootError::Decompression("lz4 block shorter than its checksum".into())
            })?;
            lz4_flex::decompress(payload, u_size)
                .map_err(|e| RootError::Decompression(format!("lz4: {e}")))
        }
        Algorithm::Zstd => {
            let mut out = vec![0u8; u_size];
            let written = ZSTD
                .with(|dec| dec.borrow_mut().decode_all(block, &mut out))
                .map_err(|e| RootError::Decompression(format!("zstd: {e}")))?;
            out.truncate(written);
            Ok(out)
        }
        Algorithm::Xz => {
            let mut out = Vec::with_capacity(u_size);
            lzma_rs::xz_decompress(&mut std::io::BufReader::new(block), &mut out)
                .map_err(|e| RootError::Decompression(format!("xz: {e}")))?;
            Ok(out)
        }
    }
}

fn le24(b: &[u8]) -> usize {
    usize::from(b[0]) | usize::from(b[1]) << 8 | usize::from(b[2]) << 16
}
