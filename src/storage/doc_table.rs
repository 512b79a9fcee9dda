//! Reads the `.docinfo` file: a concatenation of variable-length document
//! records in strictly increasing `docid` order, with gaps in the docid
//! space where documents were pruned during the build. The reader
//! reconstructs those gaps as empty placeholders so the table can be
//! indexed directly by `docid - 1`.

use std::collections::HashMap;
use std::fs::File;
use std::io::Seek;
use std::path::Path;

use crate::codec::binary::{read_f32, read_str, read_u32, read_u64};
use crate::core::error::Result;
use crate::core::types::Document;

pub fn read_doc_table(path: &Path, max_docid: u64) -> Result<Vec<Document>> {
    Ok(read_doc_table_with_offsets(path, max_docid)?.0)
}

/// Same as `read_doc_table` but also returns each real record's starting
/// byte offset (the offset of its `docid` field), keyed by docid — used by
/// the link-graph scorers to patch quality fields in place without
/// rewriting the whole file.
pub fn read_doc_table_with_offsets(path: &Path, max_docid: u64) -> Result<(Vec<Document>, HashMap<u64, u64>)> {
    let mut table: Vec<Document> = (1..=max_docid).map(Document::placeholder).collect();
    let mut offsets = HashMap::new();

    if !path.exists() {
        return Ok((table, offsets));
    }

    let mut f = File::open(path)?;
    loop {
        let record_start = f.stream_position()?;
        let docid = match read_u64(&mut f) {
            Ok(v) => v,
            Err(_) => break,
        };
        let total_tokens = read_u32(&mut f)?;
        let pr_quality = read_f32(&mut f)?;
        let hub_quality = read_f32(&mut f)?;
        let auth_quality = read_f32(&mut f)?;
        let url = read_str(&mut f)?;

        let doc = Document {
            docid,
            total_tokens,
            pr_quality,
            hub_quality,
            auth_quality,
            url,
            empty: false,
            links: Vec::new(),
        };

        if docid >= 1 && docid <= max_docid {
            table[(docid - 1) as usize] = doc;
            offsets.insert(docid, record_start);
        }
    }

    Ok((table, offsets))
}

/// Maps each non-placeholder document's URL to its docid.
pub fn build_url_index(docs: &[Document]) -> HashMap<String, u64> {
    docs.iter()
        .filter(|d| !d.empty)
        .map(|d| (d.url.clone(), d.docid))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::binary::{write_f32, write_str, write_u32, write_u64};

    fn write_fixture(path: &Path, docs: &[(u64, &str)]) {
        let mut f = File::create(path).unwrap();
        for (docid, url) in docs {
            write_u64(&mut f, *docid).unwrap();
            write_u32(&mut f, 5).unwrap();
            write_f32(&mut f, 1.0).unwrap();
            write_f32(&mut f, 1.0).unwrap();
            write_f32(&mut f, 1.0).unwrap();
            write_str(&mut f, url).unwrap();
        }
    }

    #[test]
    fn gaps_become_placeholders() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".docinfo");
        write_fixture(&path, &[(1, "http://a"), (3, "http://c")]);

        let table = read_doc_table(&path, 3).unwrap();
        assert_eq!(table.len(), 3);
        assert!(!table[0].empty);
        assert!(table[1].empty);
        assert!(!table[2].empty);
        assert_eq!(table[2].url, "http://c");
    }

    #[test]
    fn url_index_excludes_placeholders() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".docinfo");
        write_fixture(&path, &[(1, "http://a"), (3, "http://c")]);
        let table = read_doc_table(&path, 3).unwrap();
        let idx = build_url_index(&table);
        assert_eq!(idx.get("http://a"), Some(&1));
        assert_eq!(idx.len(), 2);
    }

    #[test]
    fn missing_file_yields_all_placeholders() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.docinfo");
        let table = read_doc_table(&path, 2).unwrap();
        assert_eq!(table.len(), 2);
        assert!(table.iter().all(|d| d.empty));
    }

    #[test]
    fn offsets_point_at_each_records_docid_field() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".docinfo");
        write_fixture(&path, &[(1, "http://a"), (3, "http://c")]);
        let (_, offsets) = read_doc_table_with_offsets(&path, 3).unwrap();
        assert_eq!(offsets.len(), 2);
        let mut f = File::open(&path).unwrap();
        f.seek(std::io::SeekFrom::Start(*offsets.get(&3).unwrap())).unwrap();
        assert_eq!(read_u64(&mut f).unwrap(), 3);
    }
}
