//! Classic PageRank over the docid link graph.

use crate::core::types::Document;

#[derive(Debug, Clone, Copy)]
pub struct PageRankConfig {
    pub damping: f32,
    pub max_iterations: usize,
    pub tolerance: f32,
}

impl Default for PageRankConfig {
    fn default() -> Self {
        PageRankConfig {
            damping: 0.85,
            max_iterations: 100,
            tolerance: 1e-6,
        }
    }
}

/// Returns a rank per docid (index `i` is the rank for docid `i + 1`).
/// `links[i]` is the set of out-neighbor docids for docid `i + 1`; dangling
/// nodes (no outlinks) contribute nothing and their rank mass is dropped,
/// matching the source's implicit dangling-node handling.
pub fn compute(docs: &[Document], links: &[Vec<u64>], config: &PageRankConfig) -> Vec<f32> {
    let n = docs.len();
    if n == 0 {
        return Vec::new();
    }

    let mut rank = vec![1.0 / n as f32; n];
    let out_degree: Vec<usize> = links.iter().map(|l| l.len()).collect();

    for _ in 0..config.max_iterations {
        let mut new_rank = vec![1.0 - config.damping; n];
        for (i, targets) in links.iter().enumerate() {
            if out_degree[i] == 0 {
                continue;
            }
            let share = config.damping * rank[i] / out_degree[i] as f32;
            for &target in targets {
                if target >= 1 && (target as usize) <= n {
                    new_rank[(target - 1) as usize] += share;
                }
            }
        }

        let max_delta = rank
            .iter()
            .zip(new_rank.iter())
            .map(|(a, b)| (a - b).abs())
            .fold(0.0f32, f32::max);
        rank = new_rank;
        if max_delta < config.tolerance {
            break;
        }
    }

    rank
}
