// tests/common/mod.rs
//! Shared doubles for integration tests: a scripted feed source and a
//! recording notifier.
#![allow(dead_code)]

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

use feed_notifier::config::{parse_config_str, AppConfig};
use feed_notifier::error::DispatchError;
use feed_notifier::{FeedItem, FeedSource, Notifier, PushMessage};

pub fn item(title: &str, content: &str) -> FeedItem {
    FeedItem::new(title, content, format!("https://example.org/{}", title.replace(' ', "-")))
}

/// Returns one scripted response per fetch; `Err` entries simulate outages.
#[derive(Default)]
pub struct ScriptedSource {
    responses: Mutex<VecDeque<Result<Vec<FeedItem>, String>>>,
    pub calls: Mutex<Vec<Vec<String>>>,
}

impl ScriptedSource {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn push_ok(&self, items: Vec<FeedItem>) {
        self.responses.lock().push_back(Ok(items));
    }

    pub fn push_err(&self, msg: &str) {
        self.responses.lock().push_back(Err(msg.to_string()));
    }
}

#[async_trait]
impl FeedSource for ScriptedSource {
    async fn fetch(&self, urls: &[String]) -> Result<Vec<FeedItem>> {
        self.calls.lock().push(urls.to_vec());
        match self.responses.lock().pop_front() {
            Some(Ok(items)) => Ok(items),
            Some(Err(e)) => Err(anyhow!(e)),
            None => Err(anyhow!("no scripted response left")),
        }
    }
}

/// Records every message; titles listed in `fail_titles` answer 500.
#[derive(Default)]
pub struct RecordingNotifier {
    pub sent: Mutex<Vec<PushMessage>>,
    pub fail_titles: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn titles(&self) -> Vec<String> {
        self.sent.lock().iter().map(|m| m.title.clone()).collect()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, msg: &PushMessage) -> Result<u16, DispatchError> {
        if self.fail_titles.lock().contains(&msg.title) {
            return Err(DispatchError::Status {
                status: 500,
                body: "boom".into(),
            });
        }
        self.sent.lock().push(msg.clone());
        Ok(200)
    }
}

pub const NEWS_CONFIG: &str = r#"
defaultPriority: 3
defaultCronExpression: "*/5 * * * *"
ntfy:
  url: "https://ntfy.example"
  token: secret
feeds:
  - name: news
    urls: ["https://example.org/a.xml", "https://example.org/b.xml"]
    topic: news
    priority: 1
    tags: [newspaper]
    trim: true
    replacements:
      - { from: "<br>", to: "\n" }
    categories:
      - title: { text: [urgent, breaking] }
        priority: 5
        tags: [rotating_light]
      - contents: { regex: "^sponsored" }
        priority: super_ignore
      - title: { text: [weather] }
        priority: 2
        tags: [cloud]
  - name: blog
    urls: ["https://blog.example.org/feed"]
    topic: blog
    cronExpression: "0 * * * *"
"#;

pub fn news_config() -> Arc<AppConfig> {
    Arc::new(parse_config_str(NEWS_CONFIG, "yml").expect("test config parses"))
}
