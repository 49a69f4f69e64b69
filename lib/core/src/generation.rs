// Generation tags for recompute requests.
//
// Every invalidating change advances the counter; a finished computation may
// only be installed while its tag is still the current one.

use std::sync::atomic::{AtomicU64, Ordering};

/// Tag identifying one recompute request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Generation(u64);

impl Generation {
    /// Tag of a model before any request was made.
    pub const ZERO: Generation = Generation(0);

    #[inline]
    pub fn get(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for Generation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "g{}", self.0)
    }
}

/// Monotonic source of generation tags.
#[derive(Debug, Default)]
pub struct GenerationCounter {
    current: AtomicU64,
}

impl GenerationCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Supersede every outstanding request and return the new tag.
    #[inline]
    pub fn advance(&self) -> Generation {
        Generation(self.current.fetch_add(1, Ordering::AcqRel) + 1)
    }

    #[inline]
    pub fn current(&self) -> Generation {
        Generation(self.current.load(Ordering::Acquire))
    }

    #[inline]
    pub fn is_current(&self, generation: Generation) -> bool {
        self.current() == generation
    }
}
