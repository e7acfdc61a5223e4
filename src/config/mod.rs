// src/config/mod.rs
//! Configuration loading and validation.
//!
//! Lookup order for the config file:
//! 1) explicit path (CLI argument)
//! 2) $FEED_NOTIFIER_CONFIG
//! 3) config/config.yml, config/config.yaml, config/config.toml, config/config.json
//!
//! Regexes, cron expressions, URLs and `ENV` secrets are all resolved here, so
//! a config that loads cannot fail later for configuration reasons.

pub mod schema;

use anyhow::{anyhow, Context, Result};
use std::collections::HashSet;
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::classify::{Criterion, MatchPolicy, Priority};
use crate::error::ConfigError;
use crate::ingest::scheduler::CronSchedule;
use crate::tracker::FingerprintPolicy;

pub use schema::{RawCategory, RawConfig, RawCriterion, RawFeed, RawNtfy, Replacement};

pub const ENV_CONFIG_PATH: &str = "FEED_NOTIFIER_CONFIG";
pub const DEFAULT_CRON_EXPRESSION: &str = "*/5 * * * *";
pub const DEFAULT_POLL_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_PUSH_TIMEOUT_SECS: u64 = 10;

const FALLBACK_PATHS: [&str; 4] = [
    "config/config.yml",
    "config/config.yaml",
    "config/config.toml",
    "config/config.json",
];

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub defaults: Defaults,
    pub ntfy: NtfySettings,
    pub feeds: Vec<Feed>,
    pub poll_timeout: Duration,
    pub metrics_addr: Option<SocketAddr>,
}

#[derive(Debug, Clone)]
pub struct Defaults {
    pub priority: Priority,
    pub schedule: CronSchedule,
    pub match_policy: MatchPolicy,
    pub fingerprint: FingerprintPolicy,
}

#[derive(Debug, Clone)]
pub struct NtfySettings {
    /// Base URL without trailing slash.
    pub url: String,
    pub auth: PushAuth,
    pub timeout: Duration,
}

/// Credentials for the push endpoint. Basic wins over bearer.
#[derive(Clone, PartialEq, Eq, Default)]
pub enum PushAuth {
    #[default]
    None,
    Basic { user: String, password: String },
    Bearer(String),
}

impl std::fmt::Debug for PushAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PushAuth::None => f.write_str("None"),
            PushAuth::Basic { user, .. } => write!(f, "Basic({user}, ***)"),
            PushAuth::Bearer(_) => f.write_str("Bearer(***)"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Feed {
    pub name: String,
    pub urls: Vec<String>,
    pub topic: String,
    pub schedule: Option<CronSchedule>,
    pub priority: Option<Priority>,
    pub tags: Vec<String>,
    pub categories: Vec<Category>,
    pub replacements: Vec<Replacement>,
    pub trim: bool,
    pub match_policy: Option<MatchPolicy>,
    pub fingerprint: Option<FingerprintPolicy>,
}

impl Feed {
    /// A feed with no rules, urls or overrides.
    pub fn named(name: impl Into<String>, topic: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            urls: Vec::new(),
            topic: topic.into(),
            schedule: None,
            priority: None,
            tags: Vec::new(),
            categories: Vec::new(),
            replacements: Vec::new(),
            trim: false,
            match_policy: None,
            fingerprint: None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Category {
    pub title: Option<Criterion>,
    pub contents: Option<Criterion>,
    pub priority: Option<Priority>,
    pub tags: Vec<String>,
}

impl AppConfig {
    pub fn feed(&self, name: &str) -> Option<&Feed> {
        self.feeds.iter().find(|f| f.name == name)
    }

    pub fn schedule_for<'a>(&'a self, feed: &'a Feed) -> &'a CronSchedule {
        feed.schedule.as_ref().unwrap_or(&self.defaults.schedule)
    }

    pub fn match_policy_for(&self, feed: &Feed) -> MatchPolicy {
        feed.match_policy.unwrap_or(self.defaults.match_policy)
    }

    pub fn fingerprint_for(&self, feed: &Feed) -> FingerprintPolicy {
        feed.fingerprint.unwrap_or(self.defaults.fingerprint)
    }

    /// Validate and compile the on-disk shape.
    pub fn from_raw(raw: RawConfig) -> Result<Self, ConfigError> {
        let default_expr = raw
            .default_cron_expression
            .as_deref()
            .unwrap_or(DEFAULT_CRON_EXPRESSION);
        let schedule = CronSchedule::parse(default_expr)
            .map_err(|e| ConfigError::invalid_cron("defaultCronExpression", default_expr, e))?;

        let defaults = Defaults {
            priority: raw.default_priority.unwrap_or_default(),
            schedule,
            match_policy: raw.match_policy.unwrap_or_default(),
            fingerprint: raw.fingerprint.unwrap_or_default(),
        };

        let ntfy = compile_ntfy(raw.ntfy)?;

        if raw.feeds.is_empty() {
            return Err(ConfigError::NoFeeds);
        }
        let mut names = HashSet::new();
        let mut feeds = Vec::with_capacity(raw.feeds.len());
        for rf in raw.feeds {
            let feed = compile_feed(rf)?;
            if !names.insert(feed.name.clone()) {
                return Err(ConfigError::DuplicateFeed(feed.name));
            }
            feeds.push(feed);
        }

        let metrics_addr = raw
            .metrics_addr
            .map(|a| {
                a.trim()
                    .parse::<SocketAddr>()
                    .map_err(|_| ConfigError::InvalidMetricsAddr(a.clone()))
            })
            .transpose()?;

        Ok(Self {
            defaults,
            ntfy,
            feeds,
            poll_timeout: Duration::from_secs(
                raw.poll_timeout_secs.unwrap_or(DEFAULT_POLL_TIMEOUT_SECS).max(1),
            ),
            metrics_addr,
        })
    }
}

fn compile_ntfy(raw: RawNtfy) -> Result<NtfySettings, ConfigError> {
    let url = raw.url.trim().trim_end_matches('/').to_string();
    url::Url::parse(&url).map_err(|source| ConfigError::InvalidNtfyUrl {
        url: url.clone(),
        source,
    })?;

    let user = resolve_secret(raw.user, "ntfy.user", "NTFY_USER")?;
    let password = resolve_secret(raw.password, "ntfy.password", "NTFY_PASSWORD")?;
    let token = resolve_secret(raw.token, "ntfy.token", "NTFY_TOKEN")?;

    let auth = match (user, password, token) {
        (Some(user), Some(password), _) => PushAuth::Basic { user, password },
        (_, _, Some(token)) => PushAuth::Bearer(token),
        _ => PushAuth::None,
    };

    Ok(NtfySettings {
        url,
        auth,
        timeout: Duration::from_secs(raw.timeout_secs.unwrap_or(DEFAULT_PUSH_TIMEOUT_SECS).max(1)),
    })
}

/// Empty values count as unset; the literal `ENV` reads the named variable.
fn resolve_secret(
    value: Option<String>,
    field: &'static str,
    var: &'static str,
) -> Result<Option<String>, ConfigError> {
    match value {
        Some(v) if v.trim().eq_ignore_ascii_case("env") => std::env::var(var)
            .ok()
            .filter(|s| !s.is_empty())
            .map(Some)
            .ok_or(ConfigError::MissingEnv { field, var }),
        Some(v) if v.is_empty() => Ok(None),
        other => Ok(other),
    }
}

fn compile_feed(raw: RawFeed) -> Result<Feed, ConfigError> {
    let name = raw.name.trim().to_string();
    if name.is_empty() {
        return Err(ConfigError::EmptyFeedName);
    }
    let topic = raw
        .topic
        .map(|t| t.trim().trim_matches('/').to_string())
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ConfigError::MissingTopic(name.clone()))?;

    if raw.urls.is_empty() {
        return Err(ConfigError::NoUrls(name));
    }
    for u in &raw.urls {
        url::Url::parse(u).map_err(|source| ConfigError::InvalidFeedUrl {
            feed: name.clone(),
            url: u.clone(),
            source,
        })?;
    }

    let schedule = raw
        .cron_expression
        .as_deref()
        .map(|expr| {
            CronSchedule::parse(expr)
                .map_err(|e| ConfigError::invalid_cron(format!("feed '{name}'"), expr, e))
        })
        .transpose()?;

    let categories = raw
        .categories
        .into_iter()
        .enumerate()
        .map(|(index, c)| {
            Ok(Category {
                title: compile_criterion(c.title, &name, index, "title")?,
                contents: compile_criterion(c.contents, &name, index, "contents")?,
                priority: c.priority,
                tags: c.tags,
            })
        })
        .collect::<Result<Vec<_>, ConfigError>>()?;

    Ok(Feed {
        name,
        urls: raw.urls,
        topic,
        schedule,
        priority: raw.priority,
        tags: raw.tags,
        categories,
        replacements: raw.replacements,
        trim: raw.trim,
        match_policy: raw.match_policy,
        fingerprint: raw.fingerprint,
    })
}

fn compile_criterion(
    raw: Option<RawCriterion>,
    feed: &str,
    index: usize,
    field: &'static str,
) -> Result<Option<Criterion>, ConfigError> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    let compiled = match (raw.text, raw.regex) {
        (Some(list), _) => Criterion::text(list),
        (None, Some(pattern)) => Criterion::regex(&pattern),
        (None, None) => return Ok(None),
    };
    compiled.map(Some).map_err(|source| ConfigError::InvalidRegex {
        feed: feed.to_string(),
        index,
        field,
        source,
    })
}

/// Parse config text; `hint_ext` picks the format (`yml`/`yaml`, `toml`, `json`).
pub fn parse_config_str(s: &str, hint_ext: &str) -> Result<AppConfig> {
    let raw: RawConfig = match hint_ext.to_ascii_lowercase().as_str() {
        "yml" | "yaml" => serde_yml::from_str(s).context("parsing yaml config")?,
        "toml" => toml::from_str(s).context("parsing toml config")?,
        "json" => serde_json::from_str(s).context("parsing json config")?,
        other => return Err(ConfigError::UnsupportedFormat(other.to_string()).into()),
    };
    Ok(AppConfig::from_raw(raw)?)
}

/// Load config from an explicit path; the extension picks the format.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading config from {}", path.display()))?;
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    parse_config_str(&content, &ext).with_context(|| format!("loading {}", path.display()))
}

/// Load config using the explicit path, then env var, then fallbacks.
pub fn load_config_default(explicit: Option<&Path>) -> Result<AppConfig> {
    if let Some(p) = explicit {
        return load_config_from(p);
    }
    if let Ok(p) = std::env::var(ENV_CONFIG_PATH) {
        let pb = PathBuf::from(p);
        if pb.exists() {
            return load_config_from(&pb);
        }
        return Err(anyhow!("{ENV_CONFIG_PATH} points to non-existent path {}", pb.display()));
    }
    for p in FALLBACK_PATHS {
        let pb = PathBuf::from(p);
        if pb.exists() {
            return load_config_from(&pb);
        }
    }
    Err(anyhow!(
        "no config file found (set {ENV_CONFIG_PATH} or create config/config.yml)"
    ))
}
