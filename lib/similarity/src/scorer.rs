//! Record scoring
//!
//! [`Scorer`] maps a record to a similarity score in [0.0, 1.0] for a fixed
//! query and key configuration. [`compute_scores`] applies it to a whole
//! snapshot of records on the rayon pool.

use crate::distance::CachedTokenSortRatio;
use rayon::prelude::*;
use siftx_core::config::{normalize_case, weight_at};
use siftx_core::{Generation, Record, RecordId, ScoreMap, Scores, SearchConfig};
use std::sync::Arc;

/// Scoring parameters frozen for one computation.
///
/// A scorer is immutable, so one instance can be shared by every worker of
/// a scoring pass without synchronization.
#[derive(Debug, Clone)]
pub struct Scorer {
    keys: Vec<String>,
    weights: Vec<f64>,
    concat: bool,
    case_sensitive: bool,
    query: CachedTokenSortRatio,
}

impl Scorer {
    pub fn new(
        keys: Vec<String>,
        weights: Vec<f64>,
        concat: bool,
        case_sensitive: bool,
        query: &str,
    ) -> Self {
        Self {
            keys,
            weights,
            concat,
            case_sensitive,
            query: CachedTokenSortRatio::new(&normalize_case(query, case_sensitive)),
        }
    }

    pub fn from_config(config: &SearchConfig) -> Self {
        Self::new(
            config.keys.clone(),
            config.weights.clone(),
            config.concat,
            config.case_sensitive,
            &config.query,
        )
    }

    /// Similarity of `record` to the query, in [0.0, 1.0].
    pub fn score<R: Record + ?Sized>(&self, record: &R) -> f64 {
        if self.keys.is_empty() {
            return 0.0;
        }

        let score = if self.concat {
            self.concat_score(record)
        } else {
            self.weighted_score(record)
        };

        if score.is_finite() {
            score.clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    fn concat_score<R: Record + ?Sized>(&self, record: &R) -> f64 {
        let joined = self
            .keys
            .iter()
            .map(|key| record.get_field(key))
            .collect::<Vec<_>>()
            .join(" ");
        self.similarity(&joined)
    }

    fn weighted_score<R: Record + ?Sized>(&self, record: &R) -> f64 {
        let mut weighted = 0.0;
        let mut total_weight = 0.0;

        for (i, key) in self.keys.iter().enumerate() {
            let weight = weight_at(&self.weights, i);
            weighted += self.similarity(&record.get_field(key)) * weight;
            total_weight += weight;
        }

        if total_weight == 0.0 {
            return 0.0;
        }
        weighted / total_weight
    }

    fn similarity(&self, value: &str) -> f64 {
        self.query.similarity(&normalize_case(value, self.case_sensitive)) / 100.0
    }
}

/// Score a single record.
///
/// Convenience wrapper that prepares the query on every call; build a
/// [`Scorer`] when scoring more than one record.
pub fn score<R: Record + ?Sized>(
    record: &R,
    keys: &[String],
    weights: &[f64],
    concat: bool,
    case_sensitive: bool,
    query: &str,
) -> f64 {
    Scorer::new(keys.to_vec(), weights.to_vec(), concat, case_sensitive, query).score(record)
}

/// Score every record of `snapshot` in parallel.
///
/// Records are independent, so partial maps built by the workers are merged
/// in whatever order they finish.
pub fn compute_scores<R: Record + ?Sized>(
    scorer: &Scorer,
    generation: Generation,
    snapshot: Arc<[Arc<R>]>,
) -> ScoreMap<R> {
    let scores = snapshot
        .par_iter()
        .map(|record| (RecordId::of(record), scorer.score(&**record)))
        .fold(Scores::default, |mut partial, (id, score)| {
            partial.insert(id, score);
            partial
        })
        .reduce(Scores::default, |mut left, mut right| {
            if left.len() < right.len() {
                std::mem::swap(&mut left, &mut right);
            }
            left.extend(right);
            left
        });

    ScoreMap::new(generation, scores, snapshot)
}
