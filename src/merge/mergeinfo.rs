//! The 32-byte `.mergeinfo` descriptor written after a successful merge.

use std::path::Path;

use crate::codec::binary::{decode_u32, decode_u64, encode_u32, encode_u64};
use crate::core::error::{Error, Result};

pub const MERGE_INFO_SIZE: usize = 32;
pub const MERGE_VERSION: u8 = 1;

#[derive(Debug, Clone, Copy)]
pub struct MergeInfo {
    pub version: u8,
    pub max_docid: u64,
    pub unique_term_count: u32,
}

pub fn write_mergeinfo(path: &Path, info: &MergeInfo) -> Result<()> {
    let mut buf = [0u8; MERGE_INFO_SIZE];
    buf[0] = info.version;
    buf[4..12].copy_from_slice(&encode_u64(info.max_docid));
    buf[12..16].copy_from_slice(&encode_u32(info.unique_term_count));
    std::fs::write(path, buf)?;
    Ok(())
}

pub fn read_mergeinfo(path: &Path) -> Result<MergeInfo> {
    let bytes = std::fs::read(path)?;
    if bytes.len() < MERGE_INFO_SIZE {
        return Err(Error::corrupt("short read of merge-info"));
    }
    let (max_docid, _) = decode_u64(&bytes[4..12])?;
    let (unique_term_count, _) = decode_u32(&bytes[12..16])?;
    Ok(MergeInfo {
        version: bytes[0],
        max_docid,
        unique_term_count,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".mergeinfo");
        let info = MergeInfo {
            version: MERGE_VERSION,
            max_docid: 42,
            unique_term_count: 7,
        };
        write_mergeinfo(&path, &info).unwrap();
        let got = read_mergeinfo(&path).unwrap();
        assert_eq!(got.version, MERGE_VERSION);
        assert_eq!(got.max_docid, 42);
        assert_eq!(got.unique_term_count, 7);
    }

    #[test]
    fn file_is_exactly_32_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".mergeinfo");
        write_mergeinfo(&path, &MergeInfo { version: 1, max_docid: 0, unique_term_count: 0 }).unwrap();
        assert_eq!(std::fs::metadata(&path).unwrap().len(), MERGE_INFO_SIZE as u64);
    }
}
