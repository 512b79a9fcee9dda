//! HITS hub/authority iteration.
//!
//! Deliberately preserves the source's asymmetric formulation: both the new
//! hub score and the new authority score sum over *outgoing* links, rather
//! than the textbook definition where hub sums over outgoing and authority
//! sums over incoming. See the design notes on this deviation — it is kept
//! as specified, not "fixed".

use crate::core::types::Document;

#[derive(Debug, Clone, Copy)]
pub struct HitsConfig {
    pub max_iterations: usize,
    pub tolerance: f32,
}

impl Default for HitsConfig {
    fn default() -> Self {
        HitsConfig {
            max_iterations: 100,
            tolerance: 1e-6,
        }
    }
}

fn l2_normalize(v: &mut [f32]) {
    let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in v.iter_mut() {
            *x /= norm;
        }
    }
}

/// Returns `(hub, auth)`, each indexed the same way as `links` (index `i`
/// is docid `i + 1`).
pub fn compute(docs: &[Document], links: &[Vec<u64>], config: &HitsConfig) -> (Vec<f32>, Vec<f32>) {
    let n = docs.len();
    if n == 0 {
        return (Vec::new(), Vec::new());
    }

    let mut hub = vec![1.0f32; n];
    let mut auth = vec![1.0f32; n];

    for _ in 0..config.max_iterations {
        let mut new_hub = vec![0.0f32; n];
        let mut new_auth = vec![0.0f32; n];

        for (i, targets) in links.iter().enumerate() {
            for &target in targets {
                if target >= 1 && (target as usize) <= n {
                    let t = (target - 1) as usize;
                    new_hub[i] += auth[t];
                    new_auth[i] += hub[t];
                }
            }
        }

        l2_normalize(&mut new_hub);
        l2_normalize(&mut new_auth);

        let max_delta = hub
            .iter()
            .chain(auth.iter())
            .zip(new_hub.iter().chain(new_auth.iter()))
            .map(|(a, b)| (a - b).abs())
            .fold(0.0f32, f32::max);

        hub = new_hub;
        auth = new_auth;
        if max_delta < config.tolerance {
            break;
        }
    }

    (hub, auth)
}
