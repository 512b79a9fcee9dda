//! Fixed-width posting records.
//!
//! Each posting is exactly 16 bytes: `docid: u64`, `tf: u32`, `bits: u32`.
//! Bit 0 of `bits` is the `important` flag (term appeared in a tagged
//! field such as a title or heading); bit 31 is a sentinel that is always
//! set, used as a cheap corruption check on a record reached by direct
//! seek rather than a surrounding length prefix.

use crate::codec::binary::{decode_u32, decode_u64, encode_u32, encode_u64};
use crate::core::error::{Error, Result};

pub const POSTING_SIZE: usize = 16;

const SENTINEL_BIT: u32 = 1 << 31;
const IMPORTANT_BIT: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Posting {
    pub docid: u64,
    pub tf: u32,
    pub important: bool,
}

impl Posting {
    pub fn new(docid: u64, tf: u32, important: bool) -> Self {
        Posting { docid, tf, important }
    }

    pub fn encode(&self) -> [u8; POSTING_SIZE] {
        let mut bits = SENTINEL_BIT;
        if self.important {
            bits |= IMPORTANT_BIT;
        }
        let mut out = [0u8; POSTING_SIZE];
        out[0..8].copy_from_slice(&encode_u64(self.docid));
        out[8..12].copy_from_slice(&encode_u32(self.tf));
        out[12..16].copy_from_slice(&encode_u32(bits));
        out
    }

    pub fn decode(buf: &[u8]) -> Result<Self> {
        if buf.len() < POSTING_SIZE {
            return Err(Error::corrupt("short read decoding posting"));
        }
        let (docid, _) = decode_u64(&buf[0..8])?;
        let (tf, _) = decode_u32(&buf[8..12])?;
        let (bits, _) = decode_u32(&buf[12..16])?;
        if bits & SENTINEL_BIT == 0 {
            return Err(Error::corrupt("posting sentinel bit unset"));
        }
        Ok(Posting {
            docid,
            tf,
            important: bits & IMPORTANT_BIT != 0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_plain() {
        let p = Posting::new(42, 7, false);
        let bytes = p.encode();
        assert_eq!(bytes.len(), POSTING_SIZE);
        assert_eq!(Posting::decode(&bytes).unwrap(), p);
    }

    #[test]
    fn round_trip_important() {
        let p = Posting::new(u64::MAX, 1, true);
        let bytes = p.encode();
        assert_eq!(Posting::decode(&bytes).unwrap(), p);
    }

    #[test]
    fn sentinel_is_always_set() {
        let bytes = Posting::new(1, 1, false).encode();
        let bits = u32::from_le_bytes(bytes[12..16].try_into().unwrap());
        assert_eq!(bits & (1 << 31), 1 << 31);
    }

    #[test]
    fn corrupt_without_sentinel_is_rejected() {
        let mut bytes = Posting::new(1, 1, false).encode();
        bytes[12..16].copy_from_slice(&encode_u32(0));
        assert!(Posting::decode(&bytes).is_err());
    }

    #[test]
    fn short_buffer_is_corrupt() {
        assert!(Posting::decode(&[0u8; 10]).is_err());
    }
}
