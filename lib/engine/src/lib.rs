//! # SiftX Engine
//!
//! Asynchronous recompute scheduling for SiftX.
//!
//! [`SearchModel`] owns the configuration and item set of one search. Every
//! change that affects scoring advances a generation counter and queues a
//! scoring pass; only the pass of the newest generation is ever installed.
//!
//! ## Flow
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  Mutation   │────>│  Scheduler  │────>│   Scorer    │
//! │ (caller)    │     │ (gen + job) │     │  (rayon)    │
//! └─────────────┘     └─────────────┘     └─────────────┘
//!                                                │
//!                     ┌─────────────┐     ┌─────────────┐
//!                     │ Subscribers │<────│   Install   │
//!                     │ (if changed)│     │ (gen gate)  │
//!                     └─────────────┘     └─────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust
//! use siftx_engine::SearchModel;
//! use serde_json::json;
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! let model = SearchModel::builder()
//!     .items(vec![Arc::new(json!({"name": "Firefox"})), Arc::new(json!({"name": "Terminal"}))])
//!     .build()
//!     .unwrap();
//!
//! model.set_query("term");
//! assert!(model.wait_until_current(Duration::from_secs(5)));
//! assert_eq!(model.ranked_items().len(), 1);
//! ```

pub mod model;
pub mod notify;
pub mod worker;

pub use model::{SchedulerStats, SearchModel, SearchModelBuilder};
pub use notify::SubscriptionId;
pub use worker::{BackgroundJob, BackgroundWorker};
