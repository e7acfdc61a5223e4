// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod api;
pub mod classify;
pub mod config;
pub mod error;
pub mod format;
pub mod ingest;
pub mod metrics;
pub mod notify;
pub mod service;
pub mod tracker;

// ---- Re-exports for stable public API ----
pub use crate::classify::{MatchPolicy, Priority};
pub use crate::config::{AppConfig, Feed};
pub use crate::ingest::types::{FeedItem, FeedSource};
pub use crate::notify::{DispatchOutcome, Dispatcher, Notifier, PushMessage};
pub use crate::service::{FeedService, PollOutcome, PollReport};
pub use crate::tracker::{FingerprintPolicy, SeenSet, SeenTracker};
