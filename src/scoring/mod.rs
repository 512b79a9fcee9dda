pub mod hits;
pub mod pagerank;

use std::fs::OpenOptions;
use std::io::{Seek, SeekFrom, Write};
use std::path::Path;

use crate::core::error::Result;

/// Byte offset of each quality field within a document record, counted from
/// the record's `docid` field: `docid(8) + total_tokens(4)` precedes
/// `pr_quality`, which is immediately followed by `hub_quality` then
/// `auth_quality`.
#[derive(Debug, Clone, Copy)]
pub enum QualityField {
    PageRank,
    Hub,
    Authority,
}

impl QualityField {
    fn byte_offset(self) -> u64 {
        match self {
            QualityField::PageRank => 12,
            QualityField::Hub => 16,
            QualityField::Authority => 20,
        }
    }
}

/// Seeks past the fixed-width prefix of a document record and overwrites a
/// single quality field in place, leaving the rest of the record untouched.
pub fn patch_quality_field(doc_path: &Path, record_offset: u64, field: QualityField, value: f32) -> Result<()> {
    let mut f = OpenOptions::new().write(true).open(doc_path)?;
    f.seek(SeekFrom::Start(record_offset + field.byte_offset()))?;
    f.write_all(&value.to_le_bytes())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::binary::{write_f32, write_str, write_u32, write_u64};
    use crate::storage::doc_table::read_doc_table_with_offsets;
    use std::fs::File;

    #[test]
    fn patching_pr_quality_leaves_other_fields_intact() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".docinfo");
        {
            let mut f = File::create(&path).unwrap();
            write_u64(&mut f, 1).unwrap();
            write_u32(&mut f, 3).unwrap();
            write_f32(&mut f, 1.0).unwrap();
            write_f32(&mut f, 1.0).unwrap();
            write_f32(&mut f, 1.0).unwrap();
            write_str(&mut f, "http://a").unwrap();
        }

        let (_, offsets) = read_doc_table_with_offsets(&path, 1).unwrap();
        let offset = *offsets.get(&1).unwrap();
        patch_quality_field(&path, offset, QualityField::PageRank, 2.5).unwrap();
        patch_quality_field(&path, offset, QualityField::Hub, 3.5).unwrap();

        let (docs, _) = read_doc_table_with_offsets(&path, 1).unwrap();
        assert_eq!(docs[0].pr_quality, 2.5);
        assert_eq!(docs[0].hub_quality, 3.5);
        assert_eq!(docs[0].auth_quality, 1.0);
        assert_eq!(docs[0].url, "http://a");
    }
}
