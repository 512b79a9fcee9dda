use crate::core::error::{Error, ErrorKind, Result};

/// Knobs for the SPIMI-style builder. Flush period is the primary memory-bound
/// lever: the in-memory index and pending document buffer are capped at
/// roughly `flush_period` documents' worth of postings before `write_partial`
/// drains them to disk.
#[derive(Debug, Clone)]
pub struct BuilderConfig {
    pub flush_period: usize,
    pub dedup_window: usize,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        BuilderConfig {
            flush_period: 100,
            dedup_window: 200,
        }
    }
}

/// Knobs for the reader.
#[derive(Debug, Clone)]
pub struct ReaderConfig {
    pub posting_cache_capacity: usize,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        ReaderConfig {
            posting_cache_capacity: 256,
        }
    }
}

/// Per-posting importance multiplier lookup: index 0 is untagged, index 1 is
/// a posting whose token appeared in a title/heading/bold/mark fragment.
#[derive(Debug, Clone, Copy)]
pub struct Importance {
    pub untagged: f32,
    pub important: f32,
}

impl Default for Importance {
    fn default() -> Self {
        Importance {
            untagged: 0.8,
            important: 3.5,
        }
    }
}

impl Importance {
    pub fn weight(&self, important: bool) -> f32 {
        if important { self.important } else { self.untagged }
    }
}

/// Blend weights for ranking. Each weight group must sum to 1.0 within a
/// small epsilon or the configuration is rejected at startup.
#[derive(Debug, Clone)]
pub struct ScoringWeights {
    pub importance: Importance,

    // relevance blend: tfidf-sum vs cosine similarity
    pub tfidf_factor: f32,
    pub cosine_factor: f32,

    // quality blend: pagerank vs hits hub vs hits authority
    pub pr_factor: f32,
    pub hub_factor: f32,
    pub auth_factor: f32,

    // outer blend: relevance vs quality
    pub relevance_factor: f32,
    pub quality_factor: f32,

    /// Results scoring at or below this value are dropped as noise.
    pub score_floor: f32,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        ScoringWeights {
            importance: Importance::default(),
            tfidf_factor: 0.73,
            cosine_factor: 0.27,
            pr_factor: 0.59,
            hub_factor: 0.23,
            auth_factor: 0.18,
            relevance_factor: 0.61,
            quality_factor: 0.39,
            score_floor: 0.01,
        }
    }
}

const SUM_EPSILON: f32 = 1e-5;

fn assert_sums_to_one(parts: &[f32], what: &str) -> Result<()> {
    let sum: f32 = parts.iter().sum();
    if (sum - 1.0).abs() > SUM_EPSILON {
        return Err(Error::new(
            ErrorKind::ConfigInvalid,
            format!("{what} must sum to 1.0 (got {sum})"),
        ));
    }
    Ok(())
}

impl ScoringWeights {
    /// Validates that the relevance pair, the quality triple, and the outer
    /// pair each sum to 1.0 within epsilon. Fails startup otherwise.
    pub fn validate(&self) -> Result<()> {
        assert_sums_to_one(&[self.tfidf_factor, self.cosine_factor], "relevance factors")?;
        assert_sums_to_one(
            &[self.pr_factor, self.hub_factor, self.auth_factor],
            "quality factors",
        )?;
        assert_sums_to_one(
            &[self.relevance_factor, self.quality_factor],
            "scoring factors",
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_weights_validate() {
        ScoringWeights::default().validate().unwrap();
    }

    #[test]
    fn mismatched_weights_reject() {
        let mut w = ScoringWeights::default();
        w.tfidf_factor = 0.9;
        assert!(w.validate().is_err());
    }
}
