//! `searchctl`: build an index from a page directory, compute link-graph
//! quality scores, or answer queries against a built index.

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use webindex::builder::collaborators::{FileStopwords, FsPageLoader, PlainTextExtractor, PorterStemmer, WordTokenizer};
use webindex::builder::pipeline::Builder;
use webindex::core::config::{BuilderConfig, ReaderConfig, ScoringWeights};
use webindex::index::partial::{check_partial, new_partial, PartialStatus};
use webindex::merge::merger::merge;
use webindex::merge::mergeinfo::read_mergeinfo;
use webindex::query::processor::process_query;
use webindex::reader::IndexReader;
use webindex::scoring::{hits, pagerank, patch_quality_field, QualityField};
use webindex::storage::doc_table::{build_url_index, read_doc_table_with_offsets};
use webindex::storage::doclinks::read_doclinks;
use webindex::storage::layout::Layout;

#[derive(Parser)]
#[command(name = "searchctl", about = "Build, score, and query a disk-resident inverted index")]
struct Cli {
    /// Root directory of the index (created by `build`).
    #[arg(long, global = true, default_value = "index")]
    index_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Crawl a directory of pages into the index.
    Build {
        pagedir: PathBuf,
        /// Keep the `.part` file around after a successful merge.
        #[arg(long)]
        keep_partial: bool,
        /// Print the build summary as JSON instead of plain text.
        #[arg(long)]
        json: bool,
    },
    /// Run PageRank and HITS and patch the document table in place.
    Compute {
        /// Print the merge summary as JSON instead of plain text.
        #[arg(long)]
        json: bool,
    },
    /// Read query lines from stdin, emit ranked `(docid, url, score)` triples.
    Query,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match cli.command {
        Command::Build { pagedir, keep_partial, json } => run_build(&cli.index_dir, &pagedir, keep_partial, json),
        Command::Compute { json } => run_compute(&cli.index_dir, json),
        Command::Query => run_query(&cli.index_dir),
    }
}

fn run_build(index_dir: &Path, pagedir: &Path, keep_partial: bool, json: bool) -> ExitCode {
    if !pagedir.is_dir() {
        eprintln!("error: {} is not a directory", pagedir.display());
        return ExitCode::from(1);
    }

    let layout = Layout::new(index_dir);
    let part_path = layout.part();

    if part_path.exists() {
        match check_partial(&part_path) {
            Ok((PartialStatus::VersionMismatch, _)) => {
                if let Err(e) = new_partial(&part_path) {
                    eprintln!("error resetting partial container: {e}");
                    return ExitCode::from(2);
                }
            }
            Err(e) => {
                eprintln!("corrupt partial container: {e}");
                return ExitCode::from(2);
            }
            Ok(_) => {}
        }
    }

    let mut loader = match FsPageLoader::new(pagedir) {
        Ok(l) => l,
        Err(e) => {
            eprintln!("error reading page directory: {e}");
            return ExitCode::from(1);
        }
    };

    let mut builder = match Builder::new(
        layout.clone(),
        BuilderConfig::default(),
        PlainTextExtractor,
        WordTokenizer,
        PorterStemmer::default(),
    ) {
        Ok(b) => b,
        Err(e) => {
            eprintln!("error initializing builder: {e}");
            return ExitCode::from(2);
        }
    };

    let stats = match builder.run(&mut loader) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error during build: {e}");
            return ExitCode::from(2);
        }
    };

    if let Err(e) = merge(&layout, &part_path) {
        eprintln!("error during merge: {e}");
        return ExitCode::from(2);
    }

    if !keep_partial {
        let _ = std::fs::remove_file(&part_path);
    }

    if json {
        match serde_json::to_string(&stats) {
            Ok(s) => println!("{s}"),
            Err(e) => {
                eprintln!("error serializing build stats: {e}");
                return ExitCode::from(2);
            }
        }
    } else {
        println!(
            "indexed {} of {} pages seen ({} flushes, {} pruned)",
            stats.documents_indexed,
            stats.documents_seen,
            stats.partials_flushed,
            stats.total_pruned()
        );
    }
    ExitCode::SUCCESS
}

fn run_compute(index_dir: &Path, json: bool) -> ExitCode {
    let layout = Layout::new(index_dir);

    let merge_info = match read_mergeinfo(&layout.mergeinfo()) {
        Ok(m) => m,
        Err(e) => {
            eprintln!("error reading merge info: {e}");
            return ExitCode::from(2);
        }
    };

    let (docs, offsets) = match read_doc_table_with_offsets(&layout.docinfo(), merge_info.max_docid) {
        Ok(v) => v,
        Err(e) => {
            eprintln!("error reading document table: {e}");
            return ExitCode::from(2);
        }
    };

    let url_to_docid = build_url_index(&docs);
    let links = match read_doclinks(&layout.doclinks(), &url_to_docid, &docs) {
        Ok(l) => l,
        Err(e) => {
            eprintln!("error reading doclinks: {e}");
            return ExitCode::from(2);
        }
    };

    let ranks = pagerank::compute(&docs, &links, &pagerank::PageRankConfig::default());
    let (hub, auth) = hits::compute(&docs, &links, &hits::HitsConfig::default());

    let mut patched = 0;
    for doc in &docs {
        if doc.empty {
            continue;
        }
        let Some(&offset) = offsets.get(&doc.docid) else { continue };
        let idx = (doc.docid - 1) as usize;

        for (field, value) in [
            (QualityField::PageRank, ranks[idx]),
            (QualityField::Hub, hub[idx]),
            (QualityField::Authority, auth[idx]),
        ] {
            if let Err(e) = patch_quality_field(&layout.docinfo(), offset, field, value) {
                eprintln!("error patching quality field: {e}");
                return ExitCode::from(2);
            }
        }
        patched += 1;
    }

    if json {
        let summary = serde_json::json!({ "documents_scored": patched });
        println!("{summary}");
    } else {
        println!("computed pagerank/hits over {patched} documents");
    }
    ExitCode::SUCCESS
}

fn run_query(index_dir: &Path) -> ExitCode {
    let layout = Layout::new(index_dir);
    let mut reader = IndexReader::new(layout, ReaderConfig::default());
    if let Err(e) = reader.initialize() {
        eprintln!("error opening index: {e}");
        return ExitCode::from(2);
    }

    let weights = ScoringWeights::default();
    if let Err(e) = weights.validate() {
        eprintln!("error in scoring weights: {e}");
        return ExitCode::from(2);
    }

    let tokenizer = WordTokenizer;
    let stemmer = PorterStemmer::default();
    let stopwords = FileStopwords::from_words(Vec::<String>::new());

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    for line in stdin.lock().lines() {
        let Ok(line) = line else { break };
        let query = line.trim();
        if query.is_empty() {
            continue;
        }

        match process_query(&mut reader, &weights, &tokenizer, &stemmer, &stopwords, query, 10) {
            Ok(results) => {
                for r in results {
                    let _ = writeln!(stdout, "{}\t{}\t{:.6}", r.docid, r.url, r.score);
                }
            }
            Err(e) => eprintln!("query error: {e}"),
        }
    }
    ExitCode::SUCCESS
}
