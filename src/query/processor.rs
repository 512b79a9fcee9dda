//! Query pipeline: tokenize, prune stopwords (with a recovery heuristic for
//! queries that are mostly stopwords), intersect postings, blend a TF-IDF/
//! cosine relevance score with a PageRank/HITS quality score.

use std::collections::{HashMap, HashSet};

use crate::builder::collaborators::{Stemmer, StopwordOracle, Tokenizer};
use crate::core::config::ScoringWeights;
use crate::core::error::Result;
use crate::index::posting::Posting;
use crate::reader::IndexReader;

#[derive(Debug, Clone, PartialEq)]
pub struct ScoredDocument {
    pub docid: u64,
    pub url: String,
    pub score: f32,
}

struct TokenInfo {
    query_freq: u32,
    postings: Vec<Posting>,
}

fn is_alphanumeric_token(token: &str) -> bool {
    !token.is_empty() && token.chars().all(|c| c.is_alphanumeric())
}

fn l2_normalize_map(values: &HashMap<u64, f32>) -> HashMap<u64, f32> {
    let norm = values.values().map(|v| v * v).sum::<f32>().sqrt();
    if norm == 0.0 {
        return values.iter().map(|(&k, _)| (k, 0.0)).collect();
    }
    values.iter().map(|(&k, &v)| (k, v / norm)).collect()
}

/// Runs the full query pipeline and returns the top `top_k` results, already
/// sorted by descending score with anything scoring at or below the 0.01
/// noise floor removed.
pub fn process_query(
    reader: &mut IndexReader,
    weights: &ScoringWeights,
    tokenizer: &dyn Tokenizer,
    stemmer: &dyn Stemmer,
    stopwords: &dyn StopwordOracle,
    query: &str,
    top_k: usize,
) -> Result<Vec<ScoredDocument>> {
    weights.validate()?;

    let stemmed: Vec<String> = tokenizer.tokenize(query).iter().map(|t| stemmer.stem(t)).collect();
    if stemmed.is_empty() {
        return Ok(Vec::new());
    }
    let total_query_tokens = stemmed.len() as f32;

    let mut query_freq: HashMap<String, u32> = HashMap::new();
    for tok in &stemmed {
        *query_freq.entry(tok.clone()).or_insert(0) += 1;
    }

    let mut info: HashMap<String, TokenInfo> = HashMap::new();
    for (token, freq) in &query_freq {
        let postings = reader.get_postings(token)?;
        info.insert(token.clone(), TokenInfo { query_freq: *freq, postings });
    }

    let (stop_tokens, content_tokens): (Vec<String>, Vec<String>) =
        query_freq.keys().cloned().partition(|t| stopwords.is_stopword(t));

    let matched_content_tokens: Vec<&String> = content_tokens.iter().filter(|t| !info[*t].postings.is_empty()).collect();

    let valid_count: u32 = matched_content_tokens.iter().map(|t| info[*t].query_freq).sum();
    let prune_count: u32 = content_tokens
        .iter()
        .filter(|t| info[*t].postings.is_empty() && is_alphanumeric_token(t))
        .map(|t| info[t].query_freq)
        .sum();

    if prune_count > 2 * valid_count {
        return Ok(Vec::new());
    }

    let kept_stopwords: Vec<String> = if (stop_tokens.len() as f32) < 0.3 * matched_content_tokens.len() as f32 {
        Vec::new()
    } else {
        let present: Vec<&String> = stop_tokens.iter().filter(|t| !info[*t].postings.is_empty()).collect();
        let k = (stop_tokens.len() as f32).log2().floor() as u32 + 1;
        let mut sorted = present;
        sorted.sort_by(|a, b| {
            let df_a = info[*a].postings.len();
            let df_b = info[*b].postings.len();
            df_a.cmp(&df_b).then_with(|| info[*a].query_freq.cmp(&info[*b].query_freq))
        });
        sorted.into_iter().take((k + 1) as usize).cloned().collect()
    };

    let mut surviving: Vec<String> = content_tokens;
    surviving.extend(kept_stopwords);
    if surviving.is_empty() {
        return Ok(Vec::new());
    }

    let mut candidates: Option<HashSet<u64>> = None;
    for token in &surviving {
        let docids: HashSet<u64> = info[token].postings.iter().map(|p| p.docid).collect();
        candidates = Some(match candidates {
            None => docids,
            Some(existing) => existing.intersection(&docids).copied().collect(),
        });
    }
    let candidates = candidates.unwrap_or_default();
    if candidates.is_empty() {
        return Ok(Vec::new());
    }

    let non_empty_docs = reader.non_empty_document_count() as f32;

    let mut tfidf_sum: HashMap<u64, f32> = HashMap::new();
    let mut cosine_sum: HashMap<u64, f32> = HashMap::new();

    for token in &surviving {
        let token_info = &info[token];
        let df = token_info.postings.len() as f32;
        let idf = ((1.0 + non_empty_docs) / (1.0 + df)).ln();
        let query_tfidf = (token_info.query_freq as f32 / total_query_tokens) * idf;

        for posting in &token_info.postings {
            if !candidates.contains(&posting.docid) {
                continue;
            }
            let Some(doc) = reader.get_document(posting.docid) else { continue };
            let tf = posting.tf as f32 / doc.total_tokens.max(1) as f32;
            let importance_weight = weights.importance.weight(posting.important);
            let value = tf * idf * importance_weight;

            *tfidf_sum.entry(posting.docid).or_insert(0.0) += value;
            *cosine_sum.entry(posting.docid).or_insert(0.0) += value * query_tfidf;
        }
    }

    let norm_tfidf = l2_normalize_map(&tfidf_sum);
    let norm_cosine = l2_normalize_map(&cosine_sum);

    let mut pr_raw: HashMap<u64, f32> = HashMap::new();
    let mut hub_raw: HashMap<u64, f32> = HashMap::new();
    let mut auth_raw: HashMap<u64, f32> = HashMap::new();
    for &docid in &candidates {
        if let Some(doc) = reader.get_document(docid) {
            pr_raw.insert(docid, doc.pr_quality);
            hub_raw.insert(docid, doc.hub_quality);
            auth_raw.insert(docid, doc.auth_quality);
        }
    }
    let norm_pr = l2_normalize_map(&pr_raw);
    let norm_hub = l2_normalize_map(&hub_raw);
    let norm_auth = l2_normalize_map(&auth_raw);

    let mut results = Vec::new();
    for &docid in &candidates {
        let Some(doc) = reader.get_document(docid) else { continue };

        let relevance = weights.tfidf_factor * norm_tfidf.get(&docid).copied().unwrap_or(0.0)
            + weights.cosine_factor * norm_cosine.get(&docid).copied().unwrap_or(0.0);
        let quality = weights.pr_factor * norm_pr.get(&docid).copied().unwrap_or(0.0)
            + weights.hub_factor * norm_hub.get(&docid).copied().unwrap_or(0.0)
            + weights.auth_factor * norm_auth.get(&docid).copied().unwrap_or(0.0);
        let score = weights.relevance_factor * relevance + weights.quality_factor * quality;

        if score > weights.score_floor {
            results.push(ScoredDocument { docid, url: doc.url.clone(), score });
        }
    }

    results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
    results.truncate(top_k);
    Ok(results)
}
