//! # SiftX
//!
//! An incremental fuzzy-search ranking engine for small on-screen result
//! sets: app launchers, command palettes, device lists.
//!
//! SiftX keeps a live, in-memory set of records ranked against a query.
//! Whenever the query, the key weighting or the item set changes, scores are
//! recomputed on a background thread. A newer change supersedes any pass
//! still in flight, so stale results never reach the view.
//!
//! ## Quick Start
//!
//! ### From the command line
//!
//! ```bash
//! siftx --items apps.json --query fire --scores
//! ```
//!
//! ### As a Library
//!
//! ```rust,no_run
//! use siftx::prelude::*;
//! use serde_json::json;
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! let model = SearchModel::builder()
//!     .items(vec![
//!         Arc::new(json!({"name": "Firefox"})),
//!         Arc::new(json!({"name": "Files"})),
//!         Arc::new(json!({"name": "Terminal"})),
//!     ])
//!     .build()
//!     .unwrap();
//!
//! model.on_ranking_changed(|view| {
//!     for (record, score) in view.iter_scored() {
//!         println!("{} {:?}", record.get_field("name"), score);
//!     }
//! });
//!
//! model.set_query("fire");
//! model.wait_until_current(Duration::from_secs(1));
//! ```
//!
//! ## Crate Structure
//!
//! SiftX is composed of several crates:
//!
//! - [`siftx-core`](https://docs.rs/siftx-core) - Records, configuration, score maps, filter and sort
//! - [`siftx-similarity`](https://docs.rs/siftx-similarity) - Token-sort ratio and parallel scoring
//! - [`siftx-engine`](https://docs.rs/siftx-engine) - Background scheduler and the search model
//!
//! ## Features
//!
//! - **Word-order insensitive matching**: token-sort ratio over one or more fields
//! - **Weighted keys**: per-field weights, or all fields concatenated
//! - **Cancellation**: generation-tagged passes, only the newest is installed
//! - **Change notification**: subscribers hear about visible order changes only

// Re-export core types
pub use siftx_core::{
    rank, records_from_json_file, records_from_json_str, Error, Generation, RankedView, Record,
    RecordId, Result, ScoreMap, SearchConfig, DEFAULT_CUTOFF, DEFAULT_WEIGHT,
};

// Re-export scoring
pub use siftx_similarity::{compute_scores, score, token_sort_ratio, Scorer};

// Re-export the engine
pub use siftx_engine::{SchedulerStats, SearchModel, SearchModelBuilder, SubscriptionId};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        Error, Generation, RankedView, Record, RecordId, Result, SchedulerStats, Scorer,
        SearchConfig, SearchModel, SearchModelBuilder, SubscriptionId,
    };
}
