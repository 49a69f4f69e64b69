//! # SiftX Core
//!
//! Core library for the SiftX fuzzy ranking engine.
//!
//! This crate provides the data model shared by scoring and scheduling:
//!
//! - [`Record`] - Named-field access to externally owned records
//! - [`SearchConfig`] - Query, keys, weights and filtering options
//! - [`ScoreMap`] - Scores of one recompute generation
//! - [`GenerationCounter`] - Tags that decide which result may be installed
//! - [`RankedView`] - The filtered, ordered records shown to callers
//!
//! ## Example
//!
//! ```rust
//! use siftx_core::{rank, RankedView, ScoreMap, SearchConfig};
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! let items = vec![Arc::new(json!({"name": "Files"})), Arc::new(json!({"name": "Terminal"}))];
//!
//! // With an empty query every record is shown, ordered by the tie-break rule.
//! let view: RankedView<_> = rank(&items, &ScoreMap::empty(), &SearchConfig::default());
//! assert_eq!(view.len(), 2);
//! assert!(Arc::ptr_eq(&view.records()[0], &items[1]));
//! ```

pub mod config;
pub mod error;
pub mod generation;
pub mod rank;
pub mod record;
pub mod score;
pub mod view;

pub use config::{SearchConfig, DEFAULT_CUTOFF, DEFAULT_WEIGHT};
pub use error::{Error, Result};
pub use generation::{Generation, GenerationCounter};
pub use rank::{filter, locale_compare, rank, sort, Candidate, SCORE_EPSILON};
pub use record::{records_from_json_file, records_from_json_str, same_records, Record, RecordId};
pub use score::{ScoreMap, Scores};
pub use view::RankedView;
