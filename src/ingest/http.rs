// src/ingest/http.rs
use anyhow::{Context, Result};
use async_trait::async_trait;
use metrics::{counter, histogram};
use reqwest::Client;
use std::time::Duration;

use crate::ingest::rss::parse_feed;
use crate::ingest::types::{FeedItem, FeedSource};

/// Fetches feeds over HTTP and parses them with [`parse_feed`].
#[derive(Clone)]
pub struct HttpFeedSource {
    client: Client,
}

impl HttpFeedSource {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("feed-notifier/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .context("building feed http client")?;
        Ok(Self { client })
    }

    async fn fetch_one(&self, url: &str) -> Result<Vec<FeedItem>> {
        let t0 = std::time::Instant::now();
        let body = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("GET {url}"))?
            .error_for_status()
            .with_context(|| format!("GET {url} non-2xx"))?
            .text()
            .await
            .with_context(|| format!("reading body of {url}"))?;
        let items = parse_feed(&body).with_context(|| format!("parsing feed {url}"))?;

        histogram!("feed_fetch_ms").record(t0.elapsed().as_secs_f64() * 1_000.0);
        counter!("feed_items_parsed_total").increment(items.len() as u64);
        Ok(items)
    }
}

#[async_trait]
impl FeedSource for HttpFeedSource {
    async fn fetch(&self, urls: &[String]) -> Result<Vec<FeedItem>> {
        let mut out = Vec::new();
        for url in urls {
            let mut items = self.fetch_one(url).await?;
            tracing::debug!(url = %url, items = items.len(), "fetched feed");
            out.append(&mut items);
        }
        Ok(out)
    }
}
