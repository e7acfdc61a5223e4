// src/notify/ntfy.rs
//! ntfy-style HTTP push: `POST {base}/{topic}` with the message as plain-text
//! body and metadata in headers.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;
use reqwest::header::{HeaderValue, AUTHORIZATION};
use reqwest::Client;
use std::time::Duration;

use super::{Notifier, PushMessage};
use crate::config::{NtfySettings, PushAuth};
use crate::error::DispatchError;

#[derive(Clone)]
pub struct NtfyNotifier {
    base_url: String,
    client: Client,
    timeout: Duration,
    // Computed once; never logged.
    auth_header: Option<String>,
}

impl NtfyNotifier {
    pub fn new(settings: &NtfySettings) -> anyhow::Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("feed-notifier/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            base_url: settings.url.trim_end_matches('/').to_string(),
            client,
            timeout: settings.timeout,
            auth_header: auth_header(&settings.auth),
        })
    }

    pub fn endpoint(&self, topic: &str) -> String {
        format!("{}/{}", self.base_url, topic)
    }

    /// Build (but do not send) the request for `msg`.
    pub fn build_request(&self, msg: &PushMessage) -> Result<reqwest::Request, DispatchError> {
        let mut req = self
            .client
            .post(self.endpoint(&msg.topic))
            .timeout(self.timeout)
            .header("Title", header_value("Title", &msg.title)?)
            .header("Priority", msg.priority.to_string())
            .body(msg.body.clone());

        match click_url(&msg.click) {
            Some(click) => req = req.header("Click", header_value("Click", &click)?),
            None if !msg.click.is_empty() => {
                tracing::debug!(link = %msg.click, "link is not an absolute url; Click omitted")
            }
            None => {}
        }

        if !msg.tags.is_empty() {
            req = req.header("Tags", header_value("Tags", &msg.tags.join(","))?);
        }
        if let Some(auth) = &self.auth_header {
            req = req.header(AUTHORIZATION, header_value("Authorization", auth)?);
        }
        req.build().map_err(DispatchError::Transport)
    }
}

#[async_trait]
impl Notifier for NtfyNotifier {
    async fn send(&self, msg: &PushMessage) -> Result<u16, DispatchError> {
        let req = self.build_request(msg)?;
        let rsp = self.client.execute(req).await.map_err(|e| {
            if e.is_timeout() {
                DispatchError::Timeout(self.timeout.as_secs())
            } else {
                DispatchError::Transport(e)
            }
        })?;

        let status = rsp.status();
        if !status.is_success() {
            let body = rsp.text().await.unwrap_or_default();
            return Err(DispatchError::Status {
                status: status.as_u16(),
                body: body.chars().take(200).collect(),
            });
        }
        Ok(status.as_u16())
    }
}

/// `Basic base64(user:password)` when both are set, else `Bearer token`.
pub fn auth_header(auth: &PushAuth) -> Option<String> {
    match auth {
        PushAuth::None => None,
        PushAuth::Basic { user, password } => Some(format!(
            "Basic {}",
            BASE64_STANDARD.encode(format!("{user}:{password}"))
        )),
        PushAuth::Bearer(token) => Some(format!("Bearer {token}")),
    }
}

/// Absolute link, percent-encoded so it stays ASCII and clickable.
fn click_url(link: &str) -> Option<String> {
    url::Url::parse(link.trim()).ok().map(String::from)
}

/// Header-safe value: line breaks flattened, non-ASCII sent as an RFC 2047
/// encoded word (ntfy decodes these for title and tags).
fn header_value(header: &'static str, raw: &str) -> Result<HeaderValue, DispatchError> {
    let flat: String = raw
        .chars()
        .map(|c| if c == '\r' || c == '\n' { ' ' } else { c })
        .collect();
    let encoded = if flat.is_ascii() {
        flat
    } else {
        format!("=?UTF-8?B?{}?=", BASE64_STANDARD.encode(flat.as_bytes()))
    };
    HeaderValue::from_str(&encoded).map_err(|_| DispatchError::InvalidHeader { header })
}
