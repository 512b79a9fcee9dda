//! Exact and near-duplicate content fingerprinting.
//!
//! Exact hashing uses the standard reflected CRC-32 (poly 0xEDB88320, init/
//! final XOR 0xFFFFFFFF) via `crc32fast`, which implements that exact
//! variant, concatenated with the content length as a collision guard.
//! Near-duplicate hashing is a 32-bit SimHash over a word-count map, hashed
//! per token with a from-scratch CRC-64 (poly 0xC96C5795D7870F42, reversed)
//! since no crate in the dependency tree exposes that variant.

use std::collections::{HashMap, VecDeque};

use crate::codec::binary::encode_u32;

/// `(crc32, byte_len)` as an 8-byte little-endian fingerprint.
pub fn exact_hash(content: &[u8]) -> [u8; 8] {
    let crc = crc32fast::hash(content);
    let mut out = [0u8; 8];
    out[..4].copy_from_slice(&encode_u32(crc));
    out[4..].copy_from_slice(&encode_u32(content.len() as u32));
    out
}

const CRC64_POLY: u64 = 0xC96C_5795_D787_0F42;

fn build_crc64_table() -> [u64; 256] {
    let mut table = [0u64; 256];
    let mut i = 0;
    while i < 256 {
        let mut val = i as u64;
        let mut bit = 0;
        while bit < 8 {
            if val & 1 == 1 {
                val = (val >> 1) ^ CRC64_POLY;
            } else {
                val >>= 1;
            }
            bit += 1;
        }
        table[i] = val;
        i += 1;
    }
    table
}

fn crc64(bytes: &[u8]) -> u64 {
    thread_local! {
        static TABLE: [u64; 256] = build_crc64_table();
    }
    TABLE.with(|table| {
        let mut crc = u64::MAX;
        for &b in bytes {
            let idx = ((crc ^ b as u64) & 0xFF) as usize;
            crc = (crc >> 8) ^ table[idx];
        }
        crc ^ u64::MAX
    })
}

const SIMHASH_BITS: usize = 32;

/// 32-character '0'/'1' SimHash fingerprint over a token → count map.
pub fn similar_hash(word_counts: &HashMap<String, u32>) -> String {
    let mut acc = [0i64; SIMHASH_BITS];

    for (word, &count) in word_counts {
        let word_hash = (crc64(word.as_bytes()) % (1u64 << SIMHASH_BITS)) as u32;
        for (i, bit) in acc.iter_mut().enumerate() {
            let shift = SIMHASH_BITS - 1 - i;
            let set = (word_hash >> shift) & 1 == 1;
            *bit += if set { count as i64 } else { -(count as i64) };
        }
    }

    acc.iter().map(|&v| if v > 0 { '1' } else { '0' }).collect()
}

/// Character-by-character Hamming distance on the '0'/'1' fingerprint string,
/// not bit-level distance on the packed integer — this is intentional and
/// matches the source predicate being preserved.
pub fn hamming_distance(a: &str, b: &str) -> usize {
    a.chars().zip(b.chars()).filter(|(x, y)| x != y).count()
}

pub fn is_similar(a: &str, b: &str) -> bool {
    hamming_distance(a, b) <= 3
}

/// Bounded window of the most recently seen SimHash fingerprints. New pages
/// are most likely to duplicate recently-seen ones, so an O(N*window) scan
/// bounds per-document dedup cost without needing a full index of fingerprints.
pub struct RecentFingerprints {
    capacity: usize,
    recent: VecDeque<String>,
}

impl RecentFingerprints {
    pub fn new(capacity: usize) -> Self {
        RecentFingerprints {
            capacity,
            recent: VecDeque::with_capacity(capacity),
        }
    }

    pub fn find_similar(&self, fingerprint: &str) -> bool {
        self.recent.iter().any(|f| is_similar(f, fingerprint))
    }

    pub fn push(&mut self, fingerprint: String) {
        self.recent.push_back(fingerprint);
        if self.recent.len() > self.capacity {
            self.recent.pop_front();
        }
    }
}
