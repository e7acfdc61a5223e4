// src/ingest/mod.rs
pub mod http;
pub mod rss;
pub mod scheduler;
pub mod types;

use anyhow::{anyhow, Result};
use std::time::Duration;

pub use crate::ingest::http::HttpFeedSource;
pub use crate::ingest::types::{FeedItem, FeedSource};

/// Fetch `urls` through `source`, giving up after `timeout`.
pub async fn fetch_with_timeout(
    source: &dyn FeedSource,
    urls: &[String],
    timeout: Duration,
) -> Result<Vec<FeedItem>> {
    match tokio::time::timeout(timeout, source.fetch(urls)).await {
        Ok(res) => res,
        Err(_) => Err(anyhow!("feed fetch timed out after {}s", timeout.as_secs())),
    }
}
