use crate::generation::Generation;
use crate::record::RecordId;
use std::collections::HashMap;
use std::sync::Arc;

/// Raw score table keyed by record identity.
pub type Scores = HashMap<RecordId, f64, ahash::RandomState>;

/// Scores of one generation, built wholesale and never updated in place.
///
/// The map holds on to the records it scored so their identities cannot be
/// reused by new allocations while the scores are keyed by them.
pub struct ScoreMap<R: ?Sized> {
    generation: Generation,
    scores: Scores,
    snapshot: Arc<[Arc<R>]>,
}

impl<R: ?Sized> ScoreMap<R> {
    pub fn new(generation: Generation, scores: Scores, snapshot: Arc<[Arc<R>]>) -> Self {
        Self {
            generation,
            scores,
            snapshot,
        }
    }

    /// A map with no scores, used before the first computation lands.
    pub fn empty() -> Self {
        Self::new(Generation::ZERO, Scores::default(), Arc::from(Vec::new()))
    }

    #[inline]
    pub fn generation(&self) -> Generation {
        self.generation
    }

    #[inline]
    pub fn get(&self, id: RecordId) -> Option<f64> {
        self.scores.get(&id).copied()
    }

    /// Score of `record`, if it was part of the scored snapshot.
    #[inline]
    pub fn score_of(&self, record: &Arc<R>) -> Option<f64> {
        self.get(RecordId::of(record))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.scores.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    /// Records this map was computed over.
    pub fn snapshot(&self) -> &[Arc<R>] {
        &self.snapshot
    }
}

impl<R: ?Sized> std::fmt::Debug for ScoreMap<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScoreMap")
            .field("generation", &self.generation)
            .field("len", &self.scores.len())
            .finish()
    }
}
