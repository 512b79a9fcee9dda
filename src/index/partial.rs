//! The partial container: an append-only, multi-partition file the builder
//! flushes its in-memory index to periodically, with a 14-byte resumable
//! header and atomic three-file commit semantics.
//!
//! Layout: header (`version: u8`, `is_complete: u8`, `last_docid: u64`,
//! `partcnt: u32`) followed by `partcnt` length-prefixed partitions. Each
//! partition is a sequence of `(term, postings)` pairs sorted by term.

use std::fs::OpenOptions;
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

use crate::codec::binary::{decode_u32, decode_u64, encode_str, encode_u32, encode_u64};
use crate::core::error::{Error, Result};
use crate::core::types::Document;
use crate::index::inverted::InvertedIndex;

pub const PARTIAL_VERSION: u8 = 1;
pub const HEADER_SIZE: u64 = 14;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartialStatus {
    Ok,
    Incomplete,
    VersionMismatch,
}

#[derive(Debug, Clone, Copy)]
pub struct PartialHeader {
    pub version: u8,
    pub is_complete: bool,
    pub last_docid: u64,
    pub partcnt: u32,
}

impl PartialHeader {
    fn encode(&self) -> [u8; HEADER_SIZE as usize] {
        let mut out = [0u8; HEADER_SIZE as usize];
        out[0] = self.version;
        out[1] = if self.is_complete { 1 } else { 0 };
        out[2..10].copy_from_slice(&encode_u64(self.last_docid));
        out[10..14].copy_from_slice(&encode_u32(self.partcnt));
        out
    }

    fn decode(buf: &[u8]) -> Result<Self> {
        if buf.len() < HEADER_SIZE as usize {
            return Err(Error::corrupt("short read decoding partial header"));
        }
        let (last_docid, _) = decode_u64(&buf[2..10])?;
        let (partcnt, _) = decode_u32(&buf[10..14])?;
        Ok(PartialHeader {
            version: buf[0],
            is_complete: buf[1] != 0,
            last_docid,
            partcnt,
        })
    }
}

pub fn new_partial(path: &Path) -> Result<()> {
    let mut f = std::fs::File::create(path)?;
    let header = PartialHeader {
        version: PARTIAL_VERSION,
        is_complete: false,
        last_docid: 0,
        partcnt: 0,
    };
    f.write_all(&header.encode())?;
    Ok(())
}

/// Validates the header and, for `is_complete=1` headers, that every declared
/// partition is fully present on disk.
pub fn check_partial(path: &Path) -> Result<(PartialStatus, PartialHeader)> {
    let mut f = std::fs::File::open(path)?;
    let mut buf = [0u8; HEADER_SIZE as usize];
    f.read_exact(&mut buf)
        .map_err(|_| Error::corrupt("short read of partial header"))?;
    let header = PartialHeader::decode(&buf)?;
    if header.version != PARTIAL_VERSION {
        return Ok((PartialStatus::VersionMismatch, header));
    }

    let file_len = f.metadata()?.len();
    let mut offset = HEADER_SIZE;
    for _ in 0..header.partcnt {
        if offset + 4 > file_len {
            return Ok((PartialStatus::Incomplete, header));
        }
        f.seek(SeekFrom::Start(offset))?;
        let mut size_buf = [0u8; 4];
        f.read_exact(&mut size_buf)
            .map_err(|_| Error::corrupt("short read of partition size"))?;
        let (size, _) = decode_u32(&size_buf)?;
        offset += 4 + size as u64;
        if offset > file_len {
            return Ok((PartialStatus::Incomplete, header));
        }
    }

    if !header.is_complete {
        return Ok((PartialStatus::Incomplete, header));
    }
    Ok((PartialStatus::Ok, header))
}

pub fn mark_partial(path: &Path) -> Result<()> {
    let mut f = OpenOptions::new().read(true).write(true).open(path)?;
    let mut buf = [0u8; HEADER_SIZE as usize];
    f.read_exact(&mut buf)
        .map_err(|_| Error::corrupt("short read of partial header"))?;
    let mut header = PartialHeader::decode(&buf)?;
    header.is_complete = true;
    f.seek(SeekFrom::Start(0))?;
    f.write_all(&header.encode())?;
    Ok(())
}

fn encode_partition(index: &mut InvertedIndex) -> Vec<u8> {
    let mut payload = Vec::new();
    for (term, postings) in index.drain_sorted() {
        payload.extend_from_slice(&encode_str(&term));
        payload.extend_from_slice(&encode_u32(postings.len() as u32));
        for p in &postings {
            payload.extend_from_slice(&p.encode());
        }
    }
    payload
}

fn encode_docs(docs: &[Document]) -> (Vec<u8>, Vec<u8>) {
    let mut doc_payload = Vec::new();
    let mut doclinks_payload = Vec::new();
    for doc in docs {
        doc_payload.extend_from_slice(&encode_u64(doc.docid));
        doc_payload.extend_from_slice(&encode_u32(doc.total_tokens));
        doc_payload.extend_from_slice(&doc.pr_quality.to_le_bytes());
        doc_payload.extend_from_slice(&doc.hub_quality.to_le_bytes());
        doc_payload.extend_from_slice(&doc.auth_quality.to_le_bytes());
        doc_payload.extend_from_slice(&encode_str(&doc.url));

        if !doc.links.is_empty() {
            doclinks_payload.extend_from_slice(&encode_u64(doc.docid));
            doclinks_payload.extend_from_slice(&encode_u32(doc.links.len() as u32));
            for link in &doc.links {
                doclinks_payload.extend_from_slice(&encode_str(link));
            }
        }
    }
    (doc_payload, doclinks_payload)
}

/// Atomically appends one partition (drained from `index`) to `part_path`
/// plus the buffered documents to `doc_path`/`doclinks_path`. On any I/O
/// failure, every file is restored to its pre-call state and `index`/`docs`
/// are left untouched; on success both are cleared.
pub fn write_partial(
    part_path: &Path,
    doc_path: &Path,
    doclinks_path: &Path,
    index: &mut InvertedIndex,
    docs: &mut Vec<Document>,
    last_docid: u64,
) -> Result<()> {
    write_partial_inner(part_path, doc_path, doclinks_path, index, docs, last_docid, None)
}

/// Three checkpoints mark the end of each intermediate write inside the
/// atomic section: 0 = header rewritten, 1 = partition appended, 2 = doc
/// table appended. `fail_after` lets tests force a failure immediately
/// after a given checkpoint to verify the rollback restores all files to
/// their pre-call state regardless of which write was in flight.
fn write_partial_inner(
    part_path: &Path,
    doc_path: &Path,
    doclinks_path: &Path,
    index: &mut InvertedIndex,
    docs: &mut Vec<Document>,
    last_docid: u64,
    fail_after: Option<u8>,
) -> Result<()> {
    if index.is_empty() && docs.is_empty() {
        return Ok(());
    }

    let partition_payload = encode_partition(index);
    let (doc_payload, doclinks_payload) = encode_docs(docs);

    let mut part_file = OpenOptions::new().read(true).write(true).open(part_path)?;
    let mut header_buf = [0u8; HEADER_SIZE as usize];
    part_file
        .read_exact(&mut header_buf)
        .map_err(|_| Error::corrupt("short read of partial header"))?;
    let old_header = PartialHeader::decode(&header_buf)?;
    let part_prior_len = part_file.metadata()?.len();
    let doc_prior_len = std::fs::metadata(doc_path).map(|m| m.len()).unwrap_or(0);
    let doclinks_prior_len = std::fs::metadata(doclinks_path).map(|m| m.len()).unwrap_or(0);

    let new_header = PartialHeader {
        version: old_header.version,
        is_complete: false,
        last_docid,
        partcnt: old_header.partcnt + 1,
    };

    let result = (|| -> Result<()> {
        part_file.seek(SeekFrom::Start(0))?;
        part_file.write_all(&new_header.encode())?;
        if fail_after == Some(0) {
            return Err(Error::corrupt("injected fault after header write"));
        }

        part_file.seek(SeekFrom::End(0))?;
        part_file.write_all(&encode_u32(partition_payload.len() as u32))?;
        part_file.write_all(&partition_payload)?;
        if fail_after == Some(1) {
            return Err(Error::corrupt("injected fault after partition write"));
        }

        let mut doc_file = OpenOptions::new().create(true).append(true).open(doc_path)?;
        doc_file.write_all(&doc_payload)?;
        if fail_after == Some(2) {
            return Err(Error::corrupt("injected fault after doc table write"));
        }

        let mut doclinks_file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(doclinks_path)?;
        doclinks_file.write_all(&doclinks_payload)?;
        Ok(())
    })();

    match result {
        Ok(()) => {
            index.clear();
            docs.clear();
            Ok(())
        }
        Err(e) => {
            let _ = part_file.seek(SeekFrom::Start(0));
            let _ = part_file.write_all(&header_buf);
            let _ = part_file.set_len(part_prior_len);
            if let Ok(doc_file) = OpenOptions::new().write(true).open(doc_path) {
                let _ = doc_file.set_len(doc_prior_len);
            }
            if let Ok(doclinks_file) = OpenOptions::new().write(true).open(doclinks_path) {
                let _ = doclinks_file.set_len(doclinks_prior_len);
            }
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Document;
    use std::fs;

    fn paths(dir: &tempfile::TempDir) -> (std::path::PathBuf, std::path::PathBuf, std::path::PathBuf) {
        (dir.path().join("x.part"), dir.path().join("x.docinfo"), dir.path().join("x.doclinks"))
    }

    #[test]
    fn fresh_partial_checks_incomplete() {
        let dir = tempfile::tempdir().unwrap();
        let (part, _doc, _dl) = paths(&dir);
        new_partial(&part).unwrap();
        let (status, header) = check_partial(&part).unwrap();
        assert_eq!(status, PartialStatus::Incomplete);
        assert_eq!(header.partcnt, 0);
    }

    #[test]
    fn marked_partial_checks_ok() {
        let dir = tempfile::tempdir().unwrap();
        let (part, _doc, _dl) = paths(&dir);
        new_partial(&part).unwrap();
        mark_partial(&part).unwrap();
        let (status, _) = check_partial(&part).unwrap();
        assert_eq!(status, PartialStatus::Ok);
    }

    #[test]
    fn version_mismatch_is_detected() {
        let dir = tempfile::tempdir().unwrap();
        let (part, _doc, _dl) = paths(&dir);
        new_partial(&part).unwrap();
        let mut bytes = fs::read(&part).unwrap();
        bytes[0] = 99;
        fs::write(&part, bytes).unwrap();
        let (status, _) = check_partial(&part).unwrap();
        assert_eq!(status, PartialStatus::VersionMismatch);
    }

    #[test]
    fn write_partial_appends_one_partition_and_resets_accumulators() {
        let dir = tempfile::tempdir().unwrap();
        let (part, doc, dl) = paths(&dir);
        new_partial(&part).unwrap();

        let mut index = InvertedIndex::new();
        index.add_term("hello".to_string(), 1, 1, false);
        let mut docs = vec![Document::new(1, "http://a".to_string(), 1)];

        write_partial(&part, &doc, &dl, &mut index, &mut docs, 1).unwrap();

        assert!(index.is_empty());
        assert!(docs.is_empty());

        let (status, header) = check_partial(&part).unwrap();
        assert_eq!(status, PartialStatus::Incomplete);
        assert_eq!(header.partcnt, 1);
        assert_eq!(header.last_docid, 1);
        assert!(fs::metadata(&doc).unwrap().len() > 0);
    }

    #[test]
    fn second_flush_increments_partcnt_and_last_docid() {
        let dir = tempfile::tempdir().unwrap();
        let (part, doc, dl) = paths(&dir);
        new_partial(&part).unwrap();

        let mut index = InvertedIndex::new();
        index.add_term("a".to_string(), 1, 1, false);
        let mut docs = vec![Document::new(1, "u1".to_string(), 1)];
        write_partial(&part, &doc, &dl, &mut index, &mut docs, 1).unwrap();

        index.add_term("b".to_string(), 2, 1, false);
        docs.push(Document::new(2, "u2".to_string(), 1));
        write_partial(&part, &doc, &dl, &mut index, &mut docs, 2).unwrap();

        let (_, header) = check_partial(&part).unwrap();
        assert_eq!(header.partcnt, 2);
        assert_eq!(header.last_docid, 2);
    }

    #[test]
    fn rollback_restores_header_on_failure_immediately_after_header_write() {
        let dir = tempfile::tempdir().unwrap();
        let (part, doc, dl) = paths(&dir);
        new_partial(&part).unwrap();

        let part_before = fs::read(&part).unwrap();

        let mut index = InvertedIndex::new();
        index.add_term("hello".to_string(), 1, 1, false);
        let mut docs = vec![Document::new(1, "http://a".to_string(), 1)];

        let result = write_partial_inner(&part, &doc, &dl, &mut index, &mut docs, 1, Some(0));
        assert!(result.is_err());

        let part_after = fs::read(&part).unwrap();
        assert_eq!(part_before, part_after);
        assert_eq!(fs::metadata(&doc).map(|m| m.len()).unwrap_or(0), 0);
        assert_eq!(fs::metadata(&dl).map(|m| m.len()).unwrap_or(0), 0);
        assert!(!index.is_empty());
        assert!(!docs.is_empty());

        let (status, header) = check_partial(&part).unwrap();
        assert_eq!(status, PartialStatus::Incomplete);
        assert_eq!(header.partcnt, 0);
    }

    #[test]
    fn rollback_restores_header_on_failure_immediately_after_partition_write() {
        let dir = tempfile::tempdir().unwrap();
        let (part, doc, dl) = paths(&dir);
        new_partial(&part).unwrap();

        let part_before = fs::read(&part).unwrap();

        let mut index = InvertedIndex::new();
        index.add_term("hello".to_string(), 1, 1, false);
        let mut docs = vec![Document::new(1, "http://a".to_string(), 1)];

        let result = write_partial_inner(&part, &doc, &dl, &mut index, &mut docs, 1, Some(1));
        assert!(result.is_err());

        let part_after = fs::read(&part).unwrap();
        assert_eq!(part_before, part_after);
        assert_eq!(fs::metadata(&doc).map(|m| m.len()).unwrap_or(0), 0);
        assert_eq!(fs::metadata(&dl).map(|m| m.len()).unwrap_or(0), 0);
        assert!(!index.is_empty());
        assert!(!docs.is_empty());

        let (status, header) = check_partial(&part).unwrap();
        assert_eq!(status, PartialStatus::Incomplete);
        assert_eq!(header.partcnt, 0);
    }

    #[test]
    fn rollback_restores_header_on_failure_immediately_after_doc_table_write() {
        let dir = tempfile::tempdir().unwrap();
        let (part, doc, dl) = paths(&dir);
        new_partial(&part).unwrap();

        let part_before = fs::read(&part).unwrap();

        let mut index = InvertedIndex::new();
        index.add_term("hello".to_string(), 1, 1, false);
        let mut docs = vec![Document::new(1, "http://a".to_string(), 1)];

        let result = write_partial_inner(&part, &doc, &dl, &mut index, &mut docs, 1, Some(2));
        assert!(result.is_err());

        let part_after = fs::read(&part).unwrap();
        assert_eq!(part_before, part_after);
        assert_eq!(fs::metadata(&doc).map(|m| m.len()).unwrap_or(0), 0);
        assert_eq!(fs::metadata(&dl).map(|m| m.len()).unwrap_or(0), 0);
        assert!(!index.is_empty());
        assert!(!docs.is_empty());

        let (status, header) = check_partial(&part).unwrap();
        assert_eq!(status, PartialStatus::Incomplete);
        assert_eq!(header.partcnt, 0);
    }

    #[test]
    fn rollback_restores_all_files_on_doclinks_failure() {
        let dir = tempfile::tempdir().unwrap();
        let (part, doc, dl) = paths(&dir);
        new_partial(&part).unwrap();

        // Make the doclinks path an existing directory so opening it as a
        // file fails only after the partial header and doc table have
        // already been written to.
        fs::create_dir(&dl).unwrap();

        let part_before = fs::read(&part).unwrap();

        let mut index = InvertedIndex::new();
        index.add_term("hello".to_string(), 1, 1, false);
        let mut docs = vec![Document {
            links: vec!["http://out".to_string()],
            ..Document::new(1, "http://a".to_string(), 1)
        }];

        let result = write_partial(&part, &doc, &dl, &mut index, &mut docs, 1);
        assert!(result.is_err());

        let part_after = fs::read(&part).unwrap();
        assert_eq!(part_before, part_after);
        assert_eq!(fs::metadata(&doc).map(|m| m.len()).unwrap_or(0), 0);
        assert!(!index.is_empty());
        assert!(!docs.is_empty());
    }
}
