//! # SiftX Similarity
//!
//! Fuzzy similarity scoring for SiftX records.
//!
//! ## Features
//!
//! - **Token sort ratio**: word-order insensitive, edit-distance based similarity
//! - **Weighted keys**: per-field scores combined by a weighted mean
//! - **Concatenated keys**: all fields joined and scored as one string
//! - **Parallel scoring**: a whole snapshot scored on the rayon pool
//!
//! ## Example
//!
//! ```rust
//! use siftx_similarity::Scorer;
//! use serde_json::json;
//!
//! let scorer = Scorer::new(vec!["name".to_string()], vec![1.0], false, false, "fire");
//! let score = scorer.score(&json!({"name": "Firefox"}));
//! assert!(score > 0.7 && score < 0.75);
//! ```

pub mod distance;
pub mod scorer;

pub use distance::{token_sort, token_sort_ratio, CachedTokenSortRatio};
pub use scorer::{compute_scores, score, Scorer};
