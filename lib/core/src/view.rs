use crate::generation::Generation;
use crate::record::same_records;
use std::sync::Arc;

/// The filtered, ordered sequence of records shown to callers.
///
/// A view is an immutable value: models replace it wholesale and hand out
/// shared references, so a reader never sees a half-built ordering.
pub struct RankedView<R: ?Sized> {
    generation: Generation,
    records: Vec<Arc<R>>,
    scores: Vec<Option<f64>>,
}

impl<R: ?Sized> RankedView<R> {
    pub fn new(generation: Generation, records: Vec<Arc<R>>, scores: Vec<Option<f64>>) -> Self {
        debug_assert_eq!(records.len(), scores.len());
        Self {
            generation,
            records,
            scores,
        }
    }

    pub fn empty() -> Self {
        Self::new(Generation::ZERO, Vec::new(), Vec::new())
    }

    /// Generation of the scores this view was ranked with.
    #[inline]
    pub fn generation(&self) -> Generation {
        self.generation
    }

    #[inline]
    pub fn records(&self) -> &[Arc<R>] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Arc<R>> {
        self.records.iter()
    }

    /// Records paired with their score; `None` for records the installed
    /// scores do not cover.
    pub fn iter_scored(&self) -> impl Iterator<Item = (&Arc<R>, Option<f64>)> + '_ {
        self.records.iter().zip(self.scores.iter().copied())
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&Arc<R>> {
        self.records.get(index)
    }

    #[inline]
    pub fn score_at(&self, index: usize) -> Option<f64> {
        self.scores.get(index).copied().flatten()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Same records in the same order. Scores and generation are ignored.
    pub fn same_order(&self, other: &RankedView<R>) -> bool {
        same_records(&self.records, &other.records)
    }
}

impl<R: ?Sized> Clone for RankedView<R> {
    fn clone(&self) -> Self {
        Self {
            generation: self.generation,
            records: self.records.clone(),
            scores: self.scores.clone(),
        }
    }
}

impl<R: ?Sized> std::fmt::Debug for RankedView<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RankedView")
            .field("generation", &self.generation)
            .field("len", &self.records.len())
            .field("scores", &self.scores)
            .finish()
    }
}

impl<'a, R: ?Sized> IntoIterator for &'a RankedView<R> {
    type Item = &'a Arc<R>;
    type IntoIter = std::slice::Iter<'a, Arc<R>>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
