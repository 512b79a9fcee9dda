//! Reads the `.doclinks` file: sparse `(docid, num_urls, url*)` records.
//! Each URL is translated to a docid via the document table's URL index;
//! unknown targets, self-links, and links into empty/pruned placeholders
//! are dropped. Docids with no record get an empty link set.

use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

use crate::codec::binary::{read_str, read_u32, read_u64};
use crate::core::error::Result;
use crate::core::types::Document;

pub fn read_doclinks(
    path: &Path,
    url_to_docid: &HashMap<String, u64>,
    docs: &[Document],
) -> Result<Vec<Vec<u64>>> {
    let mut links: Vec<Vec<u64>> = vec![Vec::new(); docs.len()];

    if !path.exists() {
        return Ok(links);
    }

    let mut f = File::open(path)?;
    loop {
        let docid = match read_u64(&mut f) {
            Ok(v) => v,
            Err(_) => break,
        };
        let num_urls = read_u32(&mut f)?;
        let mut targets = Vec::with_capacity(num_urls as usize);
        for _ in 0..num_urls {
            let url = read_str(&mut f)?;
            if let Some(&target) = url_to_docid.get(&url) {
                if target == docid {
                    continue;
                }
                let idx = (target - 1) as usize;
                if idx < docs.len() && !docs[idx].empty {
                    targets.push(target);
                }
            }
        }

        if docid >= 1 && (docid as usize) <= docs.len() {
            links[(docid - 1) as usize] = targets;
        }
    }

    Ok(links)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::binary::{write_str, write_u32, write_u64};
    use crate::storage::doc_table::build_url_index;

    fn docs() -> Vec<Document> {
        vec![
            Document::new(1, "http://a".to_string(), 1),
            Document::placeholder(2),
            Document::new(3, "http://c".to_string(), 1),
        ]
    }

    #[test]
    fn translates_urls_and_drops_self_and_empty_links() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".doclinks");
        let mut f = File::create(&path).unwrap();
        write_u64(&mut f, 1).unwrap();
        write_u32(&mut f, 3).unwrap();
        write_str(&mut f, "http://a").unwrap(); // self-link, dropped
        write_str(&mut f, "http://b-gone").unwrap(); // target empty, dropped
        write_str(&mut f, "http://c").unwrap(); // kept
        drop(f);

        let d = docs();
        let idx = build_url_index(&d);
        let links = read_doclinks(&path, &idx, &d).unwrap();
        assert_eq!(links[0], vec![3]);
        assert!(links[1].is_empty());
        assert!(links[2].is_empty());
    }

    #[test]
    fn unknown_urls_are_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".doclinks");
        let mut f = File::create(&path).unwrap();
        write_u64(&mut f, 3).unwrap();
        write_u32(&mut f, 1).unwrap();
        write_str(&mut f, "http://unseen").unwrap();
        drop(f);

        let d = docs();
        let idx = build_url_index(&d);
        let links = read_doclinks(&path, &idx, &d).unwrap();
        assert!(links[2].is_empty());
    }

    #[test]
    fn missing_file_yields_all_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.doclinks");
        let d = docs();
        let links = read_doclinks(&path, &HashMap::new(), &d).unwrap();
        assert_eq!(links.len(), 3);
        assert!(links.iter().all(|l| l.is_empty()));
    }
}
