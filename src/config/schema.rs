// src/config/schema.rs
//! On-disk configuration shape (camelCase keys, same in YAML/TOML/JSON).
//! Validated and compiled into [`super::AppConfig`].

use serde::Deserialize;

use crate::classify::{MatchPolicy, Priority};
use crate::tracker::FingerprintPolicy;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawConfig {
    pub default_priority: Option<Priority>,
    pub default_cron_expression: Option<String>,
    pub match_policy: Option<MatchPolicy>,
    pub fingerprint: Option<FingerprintPolicy>,
    pub poll_timeout_secs: Option<u64>,
    pub metrics_addr: Option<String>,
    pub ntfy: RawNtfy,
    #[serde(default)]
    pub feeds: Vec<RawFeed>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawNtfy {
    pub url: String,
    pub user: Option<String>,
    pub password: Option<String>,
    pub token: Option<String>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawFeed {
    pub name: String,
    #[serde(default)]
    pub urls: Vec<String>,
    pub topic: Option<String>,
    pub cron_expression: Option<String>,
    pub priority: Option<Priority>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub categories: Vec<RawCategory>,
    #[serde(default)]
    pub replacements: Vec<Replacement>,
    #[serde(default)]
    pub trim: bool,
    pub match_policy: Option<MatchPolicy>,
    pub fingerprint: Option<FingerprintPolicy>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawCategory {
    pub title: Option<RawCriterion>,
    pub contents: Option<RawCriterion>,
    pub priority: Option<Priority>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// `{ text: [..] }` or `{ regex: ".." }`. When both are given, `text` wins.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawCriterion {
    pub text: Option<Vec<String>>,
    pub regex: Option<String>,
}

/// Literal substring replacement applied to message bodies.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Replacement {
    pub from: String,
    pub to: String,
}
