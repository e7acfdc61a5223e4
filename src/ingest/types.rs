// src/ingest/types.rs
use anyhow::Result;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FeedItem {
    pub title: String,
    pub content: String, // body as published (HTML left intact)
    pub link: String,
}

impl FeedItem {
    pub fn new(title: impl Into<String>, content: impl Into<String>, link: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            link: link.into(),
        }
    }
}

#[async_trait::async_trait]
pub trait FeedSource: Send + Sync {
    /// Fetch every URL and return their items in order. Any failing URL
    /// fails the whole call.
    async fn fetch(&self, urls: &[String]) -> Result<Vec<FeedItem>>;
}
