// src/ingest/scheduler.rs
//! Cron-driven poll loop, one tokio task per feed.
//!
//! Overlap policy is "skip": a feed's loop computes its next fire time only
//! after the current poll returns, so ticks that elapse mid-poll are dropped,
//! and `FeedService::poll_feed` refuses to run twice for the same feed.

use chrono::{DateTime, Utc};
use metrics::counter;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

use crate::service::{FeedService, PollOutcome};

/// A parsed cron expression. Accepts classic 5-field expressions (a `0`
/// seconds field is prepended) as well as 6/7-field ones.
#[derive(Debug, Clone)]
pub struct CronSchedule {
    expr: String,
    schedule: cron::Schedule,
}

impl CronSchedule {
    pub fn parse(expr: &str) -> Result<Self, cron::error::Error> {
        let trimmed = expr.trim();
        let normalized = if trimmed.split_whitespace().count() == 5 {
            format!("0 {trimmed}")
        } else {
            trimmed.to_string()
        };
        let schedule = cron::Schedule::from_str(&normalized)?;
        Ok(Self {
            expr: trimmed.to_string(),
            schedule,
        })
    }

    /// The expression as written in the config.
    pub fn expr(&self) -> &str {
        &self.expr
    }

    pub fn next_after(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.schedule.after(&now).next()
    }
}

/// Spawn the poll loop of every configured feed.
pub fn spawn_all(service: Arc<FeedService>) -> Vec<JoinHandle<()>> {
    service
        .config()
        .feeds
        .iter()
        .map(|f| spawn_feed_scheduler(service.clone(), f.name.clone()))
        .collect()
}

pub fn spawn_feed_scheduler(service: Arc<FeedService>, feed: String) -> JoinHandle<()> {
    tokio::spawn(async move {
        let Some(schedule) = service.schedule_for(&feed).cloned() else {
            tracing::warn!(feed = %feed, "no such feed; scheduler not started");
            return;
        };
        tracing::info!(feed = %feed, cron = schedule.expr(), "feed scheduler started");

        loop {
            let now = Utc::now();
            let Some(next) = schedule.next_after(now) else {
                tracing::info!(feed = %feed, "cron expression has no upcoming ticks; stopping");
                return;
            };
            let wait = (next - now).to_std().unwrap_or(Duration::ZERO);
            tokio::time::sleep(wait).await;

            counter!("feed_polls_total", "feed" => feed.clone()).increment(1);
            match service.poll_feed(&feed).await {
                Ok(PollOutcome::Completed(report)) => {
                    tracing::info!(
                        target: "ingest",
                        feed = %feed,
                        fetched = report.fetched,
                        new = report.new_items,
                        sent = report.sent,
                        suppressed = report.suppressed,
                        failed = report.failed,
                        primed = report.primed,
                        "poll tick"
                    );
                }
                Ok(PollOutcome::Skipped) => {
                    tracing::debug!(feed = %feed, "previous poll still running; tick skipped");
                }
                Err(e) => {
                    counter!("feed_poll_errors_total", "feed" => feed.clone()).increment(1);
                    tracing::warn!(feed = %feed, error = ?e, "poll failed; baseline kept");
                }
            }
        }
    })
}
