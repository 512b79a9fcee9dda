use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use webindex::builder::collaborators::{FileStopwords, PorterStemmer, WordTokenizer};
use webindex::core::config::{ReaderConfig, ScoringWeights};
use webindex::core::types::Document;
use webindex::index::inverted::InvertedIndex;
use webindex::index::partial::{mark_partial, new_partial, write_partial};
use webindex::merge::merger::merge;
use webindex::query::processor::process_query;
use webindex::reader::IndexReader;
use webindex::storage::layout::Layout;

fn build_index(dir: &std::path::Path, doc_count: usize) {
    let layout = Layout::new(dir);
    let part_path = layout.part();
    new_partial(&part_path).unwrap();

    let words = ["rust", "crab", "ocean", "ferry", "wasm", "index", "query", "search"];
    let mut index = InvertedIndex::new();
    let mut docs = Vec::with_capacity(doc_count);
    for i in 1..=doc_count as u64 {
        for (j, word) in words.iter().enumerate() {
            if (i as usize + j) % 3 == 0 {
                index.add_term(word.to_string(), i, (j + 1) as u32, j == 0);
            }
        }
        docs.push(Document::new(i, format!("http://example.com/{i}"), words.len() as u32));
    }

    write_partial(&part_path, &layout.docinfo(), &layout.doclinks(), &mut index, &mut docs, doc_count as u64).unwrap();
    mark_partial(&part_path).unwrap();
    merge(&layout, &part_path).unwrap();
}

fn bench_query_latency(c: &mut Criterion) {
    let mut group = c.benchmark_group("query_latency");

    for doc_count in [200usize, 1000, 5000].iter() {
        let dir = tempfile::tempdir().unwrap();
        build_index(dir.path(), *doc_count);
        let layout = Layout::new(dir.path());
        let mut reader = IndexReader::new(layout, ReaderConfig::default());
        reader.initialize().unwrap();

        let weights = ScoringWeights::default();
        let tokenizer = WordTokenizer;
        let stemmer = PorterStemmer::default();
        let stopwords = FileStopwords::from_words(Vec::<String>::new());

        group.bench_with_input(BenchmarkId::from_parameter(doc_count), doc_count, |b, _| {
            b.iter(|| {
                let results =
                    process_query(&mut reader, &weights, &tokenizer, &stemmer, &stopwords, "rust ocean", 10).unwrap();
                black_box(results);
            });
        });
    }

    group.finish();
}

fn bench_posting_cache(c: &mut Criterion) {
    let dir = tempfile::tempdir().unwrap();
    build_index(dir.path(), 2000);
    let layout = Layout::new(dir.path());
    let mut reader = IndexReader::new(layout, ReaderConfig::default());
    reader.initialize().unwrap();

    c.bench_function("posting_lookup_warm", |b| {
        let _ = reader.get_postings("rust");
        b.iter(|| {
            let postings = reader.get_postings("rust").unwrap();
            black_box(postings);
        });
    });
}

criterion_group!(benches, bench_query_latency, bench_posting_cache);
criterion_main!(benches);
