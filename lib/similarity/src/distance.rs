//! String similarity functions
//!
//! Provides the edit-distance based ratios used to score records.
//! Ratios are returned on a [0.0, 100.0] scale where 100.0 means identical.

use smallvec::SmallVec;

/// Sort the whitespace separated tokens of `text` and join them with single
/// spaces, making comparisons insensitive to word order.
pub fn token_sort(text: &str) -> String {
    let mut tokens: SmallVec<[&str; 8]> = text.split_whitespace().collect();
    tokens.sort_unstable();
    tokens.join(" ")
}

/// Length of the longest common subsequence of two character sequences.
///
/// Runs in O(n * m) time with a single rolling row.
pub fn lcs_len(a: &[char], b: &[char]) -> usize {
    if a.is_empty() || b.is_empty() {
        return 0;
    }

    // Keep the row over the shorter input.
    let (outer, inner) = if a.len() >= b.len() { (a, b) } else { (b, a) };
    let mut row = vec![0usize; inner.len() + 1];

    for &oc in outer {
        let mut diagonal = 0;
        for (j, &ic) in inner.iter().enumerate() {
            let above = row[j + 1];
            row[j + 1] = if oc == ic {
                diagonal + 1
            } else {
                above.max(row[j])
            };
            diagonal = above;
        }
    }

    row[inner.len()]
}

/// Insertions plus deletions needed to turn `a` into `b`.
pub fn indel_distance(a: &[char], b: &[char]) -> usize {
    a.len() + b.len() - 2 * lcs_len(a, b)
}

/// Normalized indel similarity of two character sequences.
///
/// Two empty inputs are identical.
pub fn ratio_chars(a: &[char], b: &[char]) -> f64 {
    let total = a.len() + b.len();
    if total == 0 {
        return 100.0;
    }
    let distance = indel_distance(a, b);
    100.0 * (1.0 - distance as f64 / total as f64)
}

/// Normalized indel similarity of two strings.
pub fn ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    ratio_chars(&a, &b)
}

/// Similarity of two strings after sorting their tokens.
pub fn token_sort_ratio(a: &str, b: &str) -> f64 {
    ratio(&token_sort(a), &token_sort(b))
}

/// A query prepared once and compared against many candidates.
///
/// Holds the token-sorted query so scoring a record only has to sort the
/// record's own tokens.
#[derive(Debug, Clone, Default)]
pub struct CachedTokenSortRatio {
    sorted: Vec<char>,
}

impl CachedTokenSortRatio {
    pub fn new(query: &str) -> Self {
        Self {
            sorted: token_sort(query).chars().collect(),
        }
    }

    /// Token sort ratio of `candidate` against the prepared query, in
    /// [0.0, 100.0].
    pub fn similarity(&self, candidate: &str) -> f64 {
        let candidate: Vec<char> = token_sort(candidate).chars().collect();
        ratio_chars(&self.sorted, &candidate)
    }

    pub fn is_empty(&self) -> bool {
        self.sorted.is_empty()
    }
}
