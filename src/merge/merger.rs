//! External k-way merge of a complete partial container into per-bucket
//! posting files plus seek tables.
//!
//! A min key-heap orders `(term, partition_id)` pairs lexicographically on
//! term; a scratch heap collects postings for the term currently being
//! flushed, ordered by `(docid, partition_id)`. Bucket output files switch
//! whenever the current term's target bucket changes; every partition
//! cursor and the active bucket pair are closed on every exit path because
//! they are plain owned `File`s dropped at end of scope.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

use crate::codec::binary::{decode_u32, encode_str, encode_u32, read_str, read_u32};
use crate::core::error::{Error, ErrorKind, Result};
use crate::core::stats::MergeStats;
use crate::index::partial::{check_partial, PartialStatus, HEADER_SIZE};
use crate::index::posting::{Posting, POSTING_SIZE};
use crate::merge::mergeinfo::{write_mergeinfo, MergeInfo, MERGE_VERSION};
use crate::storage::layout::{bucket_for, Layout};

struct PartitionCursor {
    file: File,
    end_offset: u64,
}

impl PartitionCursor {
    fn has_more(&mut self) -> Result<bool> {
        Ok(self.file.stream_position()? < self.end_offset)
    }

    fn read_next_term(&mut self) -> Result<String> {
        read_str(&mut self.file)
    }

    fn read_postings(&mut self) -> Result<Vec<Posting>> {
        let n = read_u32(&mut self.file)?;
        let mut out = Vec::with_capacity(n as usize);
        let mut buf = [0u8; POSTING_SIZE];
        for _ in 0..n {
            self.file
                .read_exact(&mut buf)
                .map_err(|_| Error::corrupt("short read of posting in partition"))?;
            out.push(Posting::decode(&buf)?);
        }
        Ok(out)
    }
}

#[derive(Debug, Clone, Copy)]
struct ScratchItem {
    docid: u64,
    pid: u32,
    posting: Posting,
}

impl PartialEq for ScratchItem {
    fn eq(&self, other: &Self) -> bool {
        self.docid == other.docid && self.pid == other.pid
    }
}
impl Eq for ScratchItem {}
impl PartialOrd for ScratchItem {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for ScratchItem {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.docid, self.pid).cmp(&(other.docid, other.pid))
    }
}

fn locate_partitions(part_path: &Path, partcnt: u32) -> Result<Vec<(u64, u64)>> {
    let mut f = File::open(part_path)?;
    let mut offset = HEADER_SIZE;
    let mut spans = Vec::with_capacity(partcnt as usize);
    for _ in 0..partcnt {
        f.seek(SeekFrom::Start(offset))?;
        let mut size_buf = [0u8; 4];
        f.read_exact(&mut size_buf)
            .map_err(|_| Error::corrupt("short read of partition size"))?;
        let (size, _) = decode_u32(&size_buf)?;
        spans.push((offset + 4, size as u64));
        offset += 4 + size as u64;
    }
    Ok(spans)
}

struct BucketWriter {
    layout: Layout,
    open_bucket: Option<u32>,
    bucket_file: Option<File>,
    seek_file: Option<File>,
    offset: u64,
    buckets_written: u32,
}

impl BucketWriter {
    fn new(layout: Layout) -> Self {
        BucketWriter {
            layout,
            open_bucket: None,
            bucket_file: None,
            seek_file: None,
            offset: 0,
            buckets_written: 0,
        }
    }

    fn ensure_bucket(&mut self, bucket: u32) -> Result<()> {
        if self.open_bucket == Some(bucket) {
            return Ok(());
        }
        self.bucket_file = None;
        self.seek_file = None;

        let bf = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(self.layout.bucket_file(bucket))?;
        let sf = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(self.layout.seek_file(bucket))?;

        self.bucket_file = Some(bf);
        self.seek_file = Some(sf);
        self.open_bucket = Some(bucket);
        self.offset = 0;
        self.buckets_written += 1;
        Ok(())
    }

    fn write_term(&mut self, term: &str, postings: &[Posting]) -> Result<()> {
        let bucket = bucket_for(term);
        self.ensure_bucket(bucket)?;

        let seek_file = self.seek_file.as_mut().unwrap();
        seek_file.write_all(&encode_str(term))?;
        seek_file.write_all(&encode_u32(self.offset as u32))?;

        let bucket_file = self.bucket_file.as_mut().unwrap();
        bucket_file.write_all(&encode_u32(postings.len() as u32))?;
        let mut written = 4u64;
        for p in postings {
            bucket_file.write_all(&p.encode())?;
            written += POSTING_SIZE as u64;
        }
        self.offset += written;
        Ok(())
    }
}

pub fn merge(layout: &Layout, part_path: &Path) -> Result<MergeStats> {
    layout.ensure_dirs()?;

    let (status, header) = check_partial(part_path)?;
    match status {
        PartialStatus::VersionMismatch => {
            return Err(Error::new(ErrorKind::VersionMismatch, "partial container version mismatch"));
        }
        PartialStatus::Incomplete => {
            return Err(Error::new(ErrorKind::Incomplete, "partial container is not complete"));
        }
        PartialStatus::Ok => {}
    }

    let spans = locate_partitions(part_path, header.partcnt)?;
    let mut cursors: Vec<PartitionCursor> = Vec::with_capacity(spans.len());
    for (start, size) in spans {
        let mut f = File::open(part_path)?;
        f.seek(SeekFrom::Start(start))?;
        cursors.push(PartitionCursor { file: f, end_offset: start + size });
    }

    let mut key_heap: BinaryHeap<Reverse<(String, u32)>> = BinaryHeap::new();
    for (pid, cursor) in cursors.iter_mut().enumerate() {
        if cursor.has_more()? {
            let term = cursor.read_next_term()?;
            key_heap.push(Reverse((term, pid as u32)));
        }
    }

    let mut scratch: BinaryHeap<Reverse<ScratchItem>> = BinaryHeap::new();
    let mut current_term: Option<String> = None;
    let mut unique_term_count: u32 = 0;
    let mut max_docid: u64 = 0;
    let mut writer = BucketWriter::new(layout.clone());

    while let Some(Reverse((term, pid))) = key_heap.pop() {
        if current_term.as_deref() != Some(term.as_str()) {
            if let Some(prev) = current_term.take() {
                flush_scratch(&mut writer, &prev, &mut scratch)?;
                unique_term_count += 1;
            }
            current_term = Some(term.clone());
        }

        let postings = cursors[pid as usize].read_postings()?;
        for p in postings {
            max_docid = max_docid.max(p.docid);
            scratch.push(Reverse(ScratchItem { docid: p.docid, pid, posting: p }));
        }

        if cursors[pid as usize].has_more()? {
            let next_term = cursors[pid as usize].read_next_term()?;
            key_heap.push(Reverse((next_term, pid)));
        }
    }
    if let Some(prev) = current_term.take() {
        flush_scratch(&mut writer, &prev, &mut scratch)?;
        unique_term_count += 1;
    }

    drop(cursors);
    let buckets_written = writer.buckets_written;
    drop(writer);

    write_mergeinfo(
        &layout.mergeinfo(),
        &MergeInfo { version: MERGE_VERSION, max_docid, unique_term_count },
    )?;

    Ok(MergeStats { max_docid, unique_term_count, buckets_written })
}

fn flush_scratch(writer: &mut BucketWriter, term: &str, scratch: &mut BinaryHeap<Reverse<ScratchItem>>) -> Result<()> {
    let mut postings = Vec::with_capacity(scratch.len());
    while let Some(Reverse(item)) = scratch.pop() {
        postings.push(item.posting);
    }
    writer.write_term(term, &postings)
}
