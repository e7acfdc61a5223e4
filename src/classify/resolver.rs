// src/classify/resolver.rs
//! Category resolution: walks a feed's ordered rules and merges what matched.
//!
//! Every matching rule contributes its tags; priorities escalate so that the
//! highest one wins (`SuperIgnore` beats everything). Under `MatchPolicy::First`
//! the walk stops at the first matching rule.

use serde::Deserialize;

use super::criterion::criterion_matches;
use super::priority::Priority;
use crate::config::{Category, Feed};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchPolicy {
    /// Scan every rule, merge tags and escalate priority.
    #[default]
    All,
    /// Stop at the first matching rule.
    First,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub priority: Priority,
    pub tags: Vec<String>,
    /// Indices of the rules that matched, in scan order.
    pub matched: Vec<usize>,
}

impl Resolution {
    pub fn is_suppressed(&self) -> bool {
        self.priority.is_suppressed()
    }
}

/// Does this rule fire for the given title/body? Title and body are tested
/// independently; either one is enough.
pub fn category_matches(category: &Category, title: &str, body: &str) -> bool {
    criterion_matches(category.title.as_ref(), title)
        || criterion_matches(category.contents.as_ref(), body)
}

pub fn resolve(
    title: &str,
    body: &str,
    feed: &Feed,
    default_priority: Priority,
    policy: MatchPolicy,
) -> Resolution {
    let fallback = feed.priority.unwrap_or(default_priority);
    let mut priority = fallback;
    let mut tags: Vec<String> = Vec::new();
    push_unique(&mut tags, &feed.tags);
    let mut matched = Vec::new();

    for (idx, category) in feed.categories.iter().enumerate() {
        if !category_matches(category, title, body) {
            continue;
        }

        push_unique(&mut tags, &category.tags);
        let rule_priority = category.priority.unwrap_or(fallback);
        priority = if matched.is_empty() {
            rule_priority
        } else {
            priority.escalate(rule_priority)
        };
        matched.push(idx);

        if policy == MatchPolicy::First {
            break;
        }
    }

    Resolution {
        priority,
        tags,
        matched,
    }
}

fn push_unique(into: &mut Vec<String>, from: &[String]) {
    for t in from {
        if !into.iter().any(|x| x == t) {
            into.push(t.clone());
        }
    }
}
