// src/tracker.rs
//! Seen-item tracking: the per-feed baseline of fingerprints from the last
//! successful poll, and the diff that defines "new".
//!
//! Baselines live for the lifetime of the process only. The first observed
//! snapshot of a feed primes the baseline and reports nothing.

use serde::Deserialize;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::ingest::types::FeedItem;

/// Which item fields identify an item across polls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FingerprintPolicy {
    /// Title followed by content.
    #[default]
    TitleContent,
    /// Link only.
    Link,
    /// Title, content, then link.
    TitleContentLink,
}

/// Hex SHA-256 of the concatenated fields. Two items share a fingerprint
/// exactly when their concatenations are equal.
pub fn fingerprint(item: &FeedItem, policy: FingerprintPolicy) -> String {
    let mut hasher = Sha256::new();
    match policy {
        FingerprintPolicy::TitleContent => {
            hasher.update(item.title.as_bytes());
            hasher.update(item.content.as_bytes());
        }
        FingerprintPolicy::Link => hasher.update(item.link.as_bytes()),
        FingerprintPolicy::TitleContentLink => {
            hasher.update(item.title.as_bytes());
            hasher.update(item.content.as_bytes());
            hasher.update(item.link.as_bytes());
        }
    }
    let digest = hasher.finalize();
    let mut out = String::with_capacity(64);
    for b in digest.iter() {
        use std::fmt::Write as _;
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}

/// One feed's baseline. `None` until the first successful poll.
#[derive(Debug, Default)]
pub struct SeenSet {
    baseline: Option<HashMap<String, FeedItem>>,
}

impl SeenSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_primed(&self) -> bool {
        self.baseline.is_some()
    }

    /// Number of fingerprints in the baseline, `None` when unprimed.
    pub fn baseline_len(&self) -> Option<usize> {
        self.baseline.as_ref().map(HashMap::len)
    }

    /// Diff a fresh fetch against the baseline and replace the baseline with it.
    ///
    /// Returns the items whose fingerprint was not in the previous baseline, in
    /// fetch order and at most once per fingerprint. Returns nothing when the
    /// set was unprimed. Items that vanished from the feed are dropped silently.
    pub fn observe(&mut self, fresh: Vec<FeedItem>, policy: FingerprintPolicy) -> Vec<FeedItem> {
        let mut next: HashMap<String, FeedItem> = HashMap::with_capacity(fresh.len());
        let mut order: Vec<String> = Vec::with_capacity(fresh.len());
        for item in fresh {
            let fp = fingerprint(&item, policy);
            if next.insert(fp.clone(), item).is_none() {
                order.push(fp);
            }
        }

        let new_items = match &self.baseline {
            None => Vec::new(),
            Some(prev) => order
                .iter()
                .filter(|fp| !prev.contains_key(fp.as_str()))
                .filter_map(|fp| next.get(fp).cloned())
                .collect(),
        };

        self.baseline = Some(next);
        new_items
    }
}

/// Per-feed seen-sets, one lock per feed so feeds never contend with each other.
#[derive(Debug, Default, Clone)]
pub struct SeenTracker {
    sets: HashMap<String, Arc<Mutex<SeenSet>>>,
}

impl SeenTracker {
    /// Create an empty (unprimed) seen-set for every feed name.
    pub fn new<I, S>(feed_names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let sets = feed_names
            .into_iter()
            .map(|n| (n.into(), Arc::new(Mutex::new(SeenSet::new()))))
            .collect();
        Self { sets }
    }

    pub fn slot(&self, feed: &str) -> Option<Arc<Mutex<SeenSet>>> {
        self.sets.get(feed).cloned()
    }
}
