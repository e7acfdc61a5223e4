// src/notify/mod.rs
//! Push notification dispatch: format + classify an item, then hand the
//! resulting message to a [`Notifier`] unless its priority suppresses it.
//!
//! Every attempt yields a [`DispatchOutcome`]; nothing here panics or
//! propagates delivery errors, and nothing is retried.

pub mod ntfy;

use async_trait::async_trait;
use metrics::counter;
use std::sync::Arc;

use crate::classify::{resolve, Priority, Resolution};
use crate::config::{AppConfig, Feed};
use crate::error::DispatchError;
use crate::format::format_message;
use crate::ingest::types::FeedItem;

pub use ntfy::NtfyNotifier;

/// One outbound push, ready to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushMessage {
    pub topic: String,
    pub title: String,
    pub body: String,
    pub priority: u8,
    pub click: String,
    pub tags: Vec<String>,
}

#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver one message; returns the HTTP status on success.
    async fn send(&self, msg: &PushMessage) -> Result<u16, DispatchError>;
}

/// Result of formatting + classifying an item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Prepared {
    Deliver(PushMessage),
    Suppressed(Priority),
}

#[derive(Debug)]
pub enum DispatchOutcome {
    Sent { status: u16 },
    Suppressed { priority: Priority },
    Failed(DispatchError),
}

impl DispatchOutcome {
    pub fn is_sent(&self) -> bool {
        matches!(self, DispatchOutcome::Sent { .. })
    }
}

#[derive(Clone)]
pub struct Dispatcher {
    config: Arc<AppConfig>,
    notifier: Arc<dyn Notifier>,
}

impl Dispatcher {
    pub fn new(config: Arc<AppConfig>, notifier: Arc<dyn Notifier>) -> Self {
        Self { config, notifier }
    }

    /// Format the body, then resolve priority/tags against the formatted body.
    pub fn classify(&self, feed: &Feed, item: &FeedItem) -> (String, Resolution) {
        let body = format_message(&item.content, feed);
        let resolution = resolve(
            &item.title,
            &body,
            feed,
            self.config.defaults.priority,
            self.config.match_policy_for(feed),
        );
        (body, resolution)
    }

    pub fn prepare(&self, feed: &Feed, item: &FeedItem) -> Prepared {
        let (body, resolution) = self.classify(feed, item);
        match resolution.priority.level() {
            None => Prepared::Suppressed(resolution.priority),
            Some(level) => Prepared::Deliver(PushMessage {
                topic: feed.topic.clone(),
                title: item.title.clone(),
                body,
                priority: level,
                click: item.link.clone(),
                tags: resolution.tags,
            }),
        }
    }

    /// Look up the feed by name and dispatch.
    pub async fn dispatch_by_name(&self, feed_name: &str, item: &FeedItem) -> DispatchOutcome {
        match self.config.feed(feed_name) {
            Some(feed) => self.dispatch(feed, item).await,
            None => DispatchOutcome::Failed(DispatchError::UnknownFeed(feed_name.to_string())),
        }
    }

    pub async fn dispatch(&self, feed: &Feed, item: &FeedItem) -> DispatchOutcome {
        let outcome = match self.prepare(feed, item) {
            Prepared::Suppressed(priority) => DispatchOutcome::Suppressed { priority },
            Prepared::Deliver(msg) => match self.notifier.send(&msg).await {
                Ok(status) => DispatchOutcome::Sent { status },
                Err(e) => DispatchOutcome::Failed(e),
            },
        };
        record(&feed.name, &item.title, &outcome);
        outcome
    }
}

fn record(feed: &str, title: &str, outcome: &DispatchOutcome) {
    match outcome {
        DispatchOutcome::Sent { status } => {
            counter!("notifications_sent_total", "feed" => feed.to_string()).increment(1);
            tracing::info!(feed = %feed, title = %title, status, "notification sent");
        }
        DispatchOutcome::Suppressed { priority } => {
            counter!("notifications_suppressed_total", "feed" => feed.to_string()).increment(1);
            tracing::debug!(feed = %feed, title = %title, %priority, "notification suppressed");
        }
        DispatchOutcome::Failed(e) => {
            counter!("notifications_failed_total", "feed" => feed.to_string()).increment(1);
            tracing::warn!(feed = %feed, title = %title, error = %e, "notification failed");
        }
    }
}
