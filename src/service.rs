// src/service.rs
//! The service object every scheduled task shares: immutable config, the
//! feed source, the dispatcher and the per-feed seen-sets.

use anyhow::{anyhow, Result};
use futures::future::join_all;
use metrics::counter;
use serde::Serialize;
use std::sync::Arc;

use crate::config::AppConfig;
use crate::ingest::fetch_with_timeout;
use crate::ingest::scheduler::CronSchedule;
use crate::ingest::types::FeedSource;
use crate::notify::{DispatchOutcome, Dispatcher, Notifier};
use crate::tracker::SeenTracker;

/// Counts for one completed poll of one feed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PollReport {
    pub fetched: usize,
    pub new_items: usize,
    pub sent: usize,
    pub suppressed: usize,
    pub failed: usize,
    /// This poll established the first baseline.
    pub primed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    Completed(PollReport),
    /// Another poll of the same feed was still running.
    Skipped,
}

/// Snapshot of one feed for the status endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedStatus {
    pub name: String,
    pub topic: String,
    pub schedule: String,
    pub baseline_items: Option<usize>,
    pub polling: bool,
}

pub struct FeedService {
    config: Arc<AppConfig>,
    source: Arc<dyn FeedSource>,
    dispatcher: Dispatcher,
    tracker: SeenTracker,
}

impl FeedService {
    pub fn new(
        config: Arc<AppConfig>,
        source: Arc<dyn FeedSource>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let tracker = SeenTracker::new(config.feeds.iter().map(|f| f.name.clone()));
        let dispatcher = Dispatcher::new(config.clone(), notifier);
        Self {
            config,
            source,
            dispatcher,
            tracker,
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn schedule_for(&self, feed: &str) -> Option<&CronSchedule> {
        self.config.feed(feed).map(|f| self.config.schedule_for(f))
    }

    /// One fetch → diff → dispatch cycle for `feed_name`.
    ///
    /// A fetch failure returns `Err` and leaves the baseline untouched. Dispatch
    /// failures are counted in the report and never fail the poll.
    pub async fn poll_feed(&self, feed_name: &str) -> Result<PollOutcome> {
        let feed = self
            .config
            .feed(feed_name)
            .ok_or_else(|| anyhow!("unknown feed '{feed_name}'"))?;
        let slot = self
            .tracker
            .slot(feed_name)
            .ok_or_else(|| anyhow!("no seen-set for feed '{feed_name}'"))?;

        let Ok(mut seen) = slot.try_lock() else {
            counter!("feed_poll_skipped_total", "feed" => feed_name.to_string()).increment(1);
            return Ok(PollOutcome::Skipped);
        };

        let items =
            fetch_with_timeout(self.source.as_ref(), &feed.urls, self.config.poll_timeout).await?;

        let primed = !seen.is_primed();
        let fetched = items.len();
        let new_items = seen.observe(items, self.config.fingerprint_for(feed));

        counter!("feed_new_items_total", "feed" => feed_name.to_string())
            .increment(new_items.len() as u64);
        if primed {
            tracing::info!(feed = %feed_name, items = fetched, "baseline primed");
        }

        // The seen-set guard stays held until dispatch finishes, so an
        // overlapping tick for this feed is skipped rather than interleaved.
        let outcomes =
            join_all(new_items.iter().map(|item| self.dispatcher.dispatch(feed, item))).await;
        drop(seen);

        let mut report = PollReport {
            fetched,
            new_items: new_items.len(),
            primed,
            ..Default::default()
        };
        for o in &outcomes {
            match o {
                DispatchOutcome::Sent { .. } => report.sent += 1,
                DispatchOutcome::Suppressed { .. } => report.suppressed += 1,
                DispatchOutcome::Failed(_) => report.failed += 1,
            }
        }
        Ok(PollOutcome::Completed(report))
    }

    pub fn status(&self) -> Vec<FeedStatus> {
        self.config
            .feeds
            .iter()
            .map(|f| {
                let (baseline_items, polling) = match self.tracker.slot(&f.name) {
                    Some(slot) => {
                        let state = match slot.try_lock() {
                            Ok(seen) => (seen.baseline_len(), false),
                            Err(_) => (None, true),
                        };
                        state
                    }
                    None => (None, false),
                };
                FeedStatus {
                    name: f.name.clone(),
                    topic: f.topic.clone(),
                    schedule: self.config.schedule_for(f).expr().to_string(),
                    baseline_items,
                    polling,
                }
            })
            .collect()
    }
}
