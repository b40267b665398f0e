//! Cosine similarity and deterministic top-K neighbor ranking.
//!
//! Scores are plain cosine similarity over the full vectors. Ranking is
//! always performed over an explicit candidate pool: filtering the pool
//! changes neighbor ranks, so rankings are never cached across pools. The
//! eager strategy only caches raw pairwise scores.
//!
//! Ordering contract for every ranking returned here:
//! - descending by score
//! - ties broken by ascending pool index
//! - the anchor itself is never included

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::corpus::{Corpus, Item};
use crate::error::{IndexError, RangeError};

/// Cosine similarity of `a` and `b`, clamped to `[-1, 1]`.
///
/// Returns `0.0` when either vector has zero magnitude or the ratio is not
/// finite.
///
/// Components are scaled by each vector's largest magnitude before
/// accumulating, so any finite nonzero vector scores correctly regardless of
/// its magnitude.
///
/// Vectors are compared over their common prefix; corpus vectors always
/// share one dimension.
#[must_use]
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
    debug_assert_eq!(a.len(), b.len());
    let scale_a = max_magnitude(a);
    let scale_b = max_magnitude(b);
    if scale_a == 0.0 || scale_b == 0.0 || !scale_a.is_finite() || !scale_b.is_finite() {
        return 0.0;
    }

    let mut dot = 0.0;
    let mut norm_a = 0.0;
    let mut norm_b = 0.0;
    for (&x, &y) in a.iter().zip(b) {
        let (x, y) = (x / scale_a, y / scale_b);
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    let score = dot / (norm_a.sqrt() * norm_b.sqrt());
    if !score.is_finite() {
        return 0.0;
    }
    score.clamp(-1.0, 1.0)
}

fn max_magnitude(v: &[f64]) -> f64 {
    v.iter().fold(0.0, |acc: f64, x| acc.max(x.abs()))
}

/// Neighbor count used when a session starts: half the corpus, capped.
#[must_use]
pub fn default_neighbor_count(n_items: usize, cap: usize) -> usize {
    (n_items / 2).min(cap)
}

/// One ranked neighbor, addressed by its position in the queried pool.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Neighbor {
    pub pool_index: usize,
    pub score: f64,
}

/// Rank the `k` most similar members of `pool` against `pool[anchor]`.
///
/// Scores are computed fresh for this pool.
pub fn top_k(pool: &[&Item], anchor: usize, k: usize) -> Result<Vec<Neighbor>, RangeError> {
    let anchor_vector = &pool
        .get(anchor)
        .ok_or(RangeError {
            anchor,
            pool_size: pool.len(),
        })?
        .vector;
    rank_pool(pool.len(), anchor, k, |i| {
        cosine_similarity(anchor_vector, &pool[i].vector)
    })
}

fn rank_pool(
    pool_size: usize,
    anchor: usize,
    k: usize,
    score: impl Fn(usize) -> f64,
) -> Result<Vec<Neighbor>, RangeError> {
    if anchor >= pool_size {
        return Err(RangeError { anchor, pool_size });
    }
    if k == 0 {
        return Ok(Vec::new());
    }

    let mut ranked: Vec<Neighbor> = (0..pool_size)
        .filter(|&i| i != anchor)
        .map(|i| Neighbor {
            pool_index: i,
            score: score(i),
        })
        .collect();

    ranked.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.pool_index.cmp(&b.pool_index))
    });
    ranked.truncate(k);
    Ok(ranked)
}

// =============================================================================
// Similarity index
// =============================================================================

/// How pairwise scores are obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimilarityStrategy {
    /// Precompute the full N×N matrix once.
    #[default]
    Eager,
    /// Compute scores per query.
    Lazy,
}

impl std::fmt::Display for SimilarityStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Eager => write!(f, "eager"),
            Self::Lazy => write!(f, "lazy"),
        }
    }
}

/// Pairwise similarity over one corpus.
///
/// Immutable after construction, so one index can be shared by any number of
/// sessions projecting concurrently.
#[derive(Debug, Clone)]
pub struct SimilarityIndex {
    len: usize,
    /// Fingerprint of the corpus the matrix was built from.
    fingerprint: u64,
    /// Row-major N×N scores when eager.
    matrix: Option<Vec<f64>>,
}

impl SimilarityIndex {
    /// Build an index for `corpus` with no size limit on the eager matrix.
    pub fn build(corpus: &Corpus, strategy: SimilarityStrategy) -> Self {
        Self::build_with_limit(corpus, strategy, usize::MAX)
    }

    /// Build an index, falling back to lazy scoring when the corpus has more
    /// than `eager_item_limit` items.
    pub fn build_with_limit(
        corpus: &Corpus,
        strategy: SimilarityStrategy,
        eager_item_limit: usize,
    ) -> Self {
        let len = corpus.len();
        let effective = if strategy == SimilarityStrategy::Eager && len > eager_item_limit {
            tracing::warn!(
                items = len,
                eager_item_limit,
                "Corpus exceeds eager similarity limit; scoring lazily"
            );
            SimilarityStrategy::Lazy
        } else {
            strategy
        };

        let matrix = match effective {
            SimilarityStrategy::Lazy => None,
            SimilarityStrategy::Eager => {
                let items = corpus.items();
                let mut matrix = vec![0.0; len * len];
                for i in 0..len {
                    for j in i..len {
                        let score = cosine_similarity(&items[i].vector, &items[j].vector);
                        matrix[i * len + j] = score;
                        matrix[j * len + i] = score;
                    }
                }
                Some(matrix)
            }
        };

        tracing::debug!(items = len, strategy = %effective, "Similarity index built");
        Self {
            len,
            fingerprint: corpus.fingerprint(),
            matrix,
        }
    }

    pub fn strategy(&self) -> SimilarityStrategy {
        if self.matrix.is_some() {
            SimilarityStrategy::Eager
        } else {
            SimilarityStrategy::Lazy
        }
    }

    /// Number of corpus items the index covers.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Similarity between corpus items `i` and `j`.
    pub fn score(&self, corpus: &Corpus, i: usize, j: usize) -> Result<f64, IndexError> {
        let a = corpus.by_index(i)?;
        let b = corpus.by_index(j)?;
        Ok(self.pair_score(a, b))
    }

    /// Matrix lookup for items of the indexed corpus; items from any other
    /// corpus are scored directly.
    fn pair_score(&self, a: &Item, b: &Item) -> f64 {
        match &self.matrix {
            Some(matrix) if self.covers(a) && self.covers(b) => {
                matrix[a.index * self.len + b.index]
            }
            _ => cosine_similarity(&a.vector, &b.vector),
        }
    }

    fn covers(&self, item: &Item) -> bool {
        item.corpus_fingerprint == self.fingerprint && item.index < self.len
    }

    /// Rank the `k` most similar members of `pool` against `pool[anchor]`.
    ///
    /// Members of a different corpus are scored lazily. The ranking itself is
    /// recomputed for every call.
    pub fn top_k_in_pool(
        &self,
        pool: &[&Item],
        anchor: usize,
        k: usize,
    ) -> Result<Vec<Neighbor>, RangeError> {
        let anchor_item = *pool.get(anchor).ok_or(RangeError {
            anchor,
            pool_size: pool.len(),
        })?;
        rank_pool(pool.len(), anchor, k, |i| {
            self.pair_score(anchor_item, pool[i])
        })
    }
}
