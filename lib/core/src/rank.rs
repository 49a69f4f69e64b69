//! Filter and sort stages of the ranked view.
//!
//! Both stages are pure functions of the installed scores, the current
//! configuration and the current item set. [`rank`] composes them.

use crate::config::SearchConfig;
use crate::record::Record;
use crate::score::ScoreMap;
use crate::view::RankedView;
use std::cmp::Ordering;
use std::sync::Arc;

/// Scores closer than this are ordered by the tie-break rule instead.
pub const SCORE_EPSILON: f64 = 1e-9;

/// A record that passed the filter, with the data the sort needs.
#[derive(Debug)]
pub struct Candidate<R: ?Sized> {
    /// Position in the item set.
    pub index: usize,
    pub score: Option<f64>,
    pub record: Arc<R>,
}

impl<R: ?Sized> Clone for Candidate<R> {
    fn clone(&self) -> Self {
        Self {
            index: self.index,
            score: self.score,
            record: self.record.clone(),
        }
    }
}

/// Keep the records that belong in the view.
///
/// With an empty query every record is kept. Otherwise a record needs a
/// score strictly greater than `cutoff`; records the scores do not cover
/// are dropped.
pub fn filter<R: ?Sized>(
    items: &[Arc<R>],
    scores: &ScoreMap<R>,
    query_is_empty: bool,
    cutoff: f64,
) -> Vec<Candidate<R>> {
    items
        .iter()
        .enumerate()
        .filter_map(|(index, record)| {
            let score = scores.score_of(record);
            let keep = query_is_empty || score.is_some_and(|s| s > cutoff);
            keep.then(|| Candidate {
                index,
                score,
                record: record.clone(),
            })
        })
        .collect()
}

/// Order candidates for display.
///
/// With `by_score`, higher scores come first; scores within
/// [`SCORE_EPSILON`] of the highest score of their group form a tie group. Ties are broken by
/// the `keys` fields in order, the greater value first, and finally by item
/// set position.
pub fn sort<R: Record + ?Sized>(candidates: &mut [Candidate<R>], keys: &[String], by_score: bool) {
    if !by_score {
        candidates.sort_by(|a, b| tie_break(a, b, keys));
        return;
    }

    candidates.sort_by(|a, b| {
        score_or_zero(b)
            .total_cmp(&score_or_zero(a))
            .then(a.index.cmp(&b.index))
    });

    // Sorting each tie group separately keeps the comparator a total order.
    // Groups are anchored at their highest score so they cannot chain past
    // the epsilon.
    let mut start = 0;
    while start < candidates.len() {
        let top = score_or_zero(&candidates[start]);
        let mut end = start + 1;
        while end < candidates.len() && top - score_or_zero(&candidates[end]) < SCORE_EPSILON {
            end += 1;
        }
        if end - start > 1 {
            candidates[start..end].sort_by(|a, b| tie_break(a, b, keys));
        }
        start = end;
    }
}

/// Filter and sort `items` into a view.
pub fn rank<R: Record + ?Sized>(
    items: &[Arc<R>],
    scores: &ScoreMap<R>,
    config: &SearchConfig,
) -> RankedView<R> {
    let query_is_empty = config.query.is_empty();
    let mut candidates = filter(items, scores, query_is_empty, config.cutoff);
    sort(&mut candidates, &config.keys, !query_is_empty);

    let (records, scores_out): (Vec<_>, Vec<_>) = candidates
        .into_iter()
        .map(|c| (c.record, c.score))
        .unzip();
    RankedView::new(scores.generation(), records, scores_out)
}

/// Collation used for tie-breaks: case-insensitive first, exact second.
pub fn locale_compare(a: &str, b: &str) -> Ordering {
    a.chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase))
        .then_with(|| a.cmp(b))
}

#[inline]
fn score_or_zero<R: ?Sized>(candidate: &Candidate<R>) -> f64 {
    candidate.score.unwrap_or(0.0)
}

fn tie_break<R: Record + ?Sized>(a: &Candidate<R>, b: &Candidate<R>, keys: &[String]) -> Ordering {
    for key in keys {
        let ord = locale_compare(&a.record.get_field(key), &b.record.get_field(key));
        if ord != Ordering::Equal {
            // Greater value first.
            return ord.reverse();
        }
    }
    a.index.cmp(&b.index)
}
