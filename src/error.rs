// src/error.rs

//! Typed errors for the two places callers branch on the failure kind:
//! configuration validation and push delivery. Everything else flows through
//! `anyhow` with context.

use thiserror::Error;

/// Configuration rejected at load time. Always fatal at startup.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("no feeds configured")]
    NoFeeds,

    #[error("feed name must not be empty")]
    EmptyFeedName,

    #[error("duplicate feed name '{0}'")]
    DuplicateFeed(String),

    #[error("feed '{0}' has no topic")]
    MissingTopic(String),

    #[error("feed '{0}' has no urls")]
    NoUrls(String),

    #[error("feed '{feed}': invalid url '{url}': {source}")]
    InvalidFeedUrl {
        feed: String,
        url: String,
        source: url::ParseError,
    },

    #[error("invalid ntfy url '{url}': {source}")]
    InvalidNtfyUrl {
        url: String,
        source: url::ParseError,
    },

    #[error("feed '{feed}', category #{index}, {field}: invalid regex: {source}")]
    InvalidRegex {
        feed: String,
        index: usize,
        field: &'static str,
        source: regex::Error,
    },

    #[error("{context}: invalid cron expression '{expr}': {source}")]
    InvalidCron {
        context: String,
        expr: String,
        source: cron::error::Error,
    },

    #[error("invalid metrics address '{0}'")]
    InvalidMetricsAddr(String),

    #[error("{field} is set to ENV but ${var} is not set")]
    MissingEnv { field: &'static str, var: &'static str },

    #[error("unsupported config format '{0}' (expected yml, yaml, toml or json)")]
    UnsupportedFormat(String),
}

impl ConfigError {
    pub fn invalid_cron(
        context: impl Into<String>,
        expr: impl Into<String>,
        source: cron::error::Error,
    ) -> Self {
        Self::InvalidCron {
            context: context.into(),
            expr: expr.into(),
            source,
        }
    }
}

/// Why a single push attempt failed. Never retried.
#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("unknown feed '{0}'")]
    UnknownFeed(String),

    #[error("invalid {header} header value")]
    InvalidHeader { header: &'static str },

    #[error("push request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("push endpoint answered {status}: {body}")]
    Status { status: u16, body: String },

    #[error("push timed out after {0}s")]
    Timeout(u64),
}
