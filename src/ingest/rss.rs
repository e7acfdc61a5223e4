// src/ingest/rss.rs
//! RSS / Atom / JSON Feed parsing into `FeedItem`s via `feed-rs`.
//!
//! Only the three fields the notifier needs are read. The body is the entry's
//! content (`content:encoded` for RSS) when present, else its summary
//! (`description` for RSS).

use anyhow::{Context, Result};
use feed_rs::model::Entry;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::borrow::Cow;

use crate::ingest::types::FeedItem;

static NAMED_ENTITY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"&([A-Za-z][A-Za-z0-9]{1,31});").expect("entity regex"));

/// Parse a feed document; the format is detected by `feed-rs`.
pub fn parse_feed(xml: &str) -> Result<Vec<FeedItem>> {
    let xml = resolve_html_entities(xml);
    let feed = feed_rs::parser::parse(xml.as_bytes()).context("parsing feed document")?;
    Ok(feed.entries.iter().map(entry_to_item).collect())
}

fn entry_to_item(entry: &Entry) -> FeedItem {
    let content = entry
        .content
        .as_ref()
        .and_then(|c| c.body.clone())
        .filter(|b| !b.trim().is_empty())
        .or_else(|| entry.summary.as_ref().map(|s| s.content.clone()))
        .unwrap_or_default();

    FeedItem {
        title: entry
            .title
            .as_ref()
            .map(|t| t.content.clone())
            .unwrap_or_default(),
        content,
        link: select_link(entry),
    }
}

/// First link without a rel or with rel="alternate", else the first link,
/// else the entry id when it is a URL.
fn select_link(entry: &Entry) -> String {
    let usable = || entry.links.iter().filter(|l| !l.href.trim().is_empty());
    if let Some(link) = usable().find(|l| {
        l.rel
            .as_deref()
            .map_or(true, |r| r.is_empty() || r.eq_ignore_ascii_case("alternate"))
    }) {
        return link.href.trim().to_string();
    }
    if let Some(link) = usable().next() {
        return link.href.trim().to_string();
    }
    let id = entry.id.trim();
    if id.starts_with("http://") || id.starts_with("https://") {
        return id.to_string();
    }
    String::new()
}

// Feeds ship HTML named entities (`&eacute;`, `&nbsp;`) that XML does not
// define. Known ones become their characters; unknown ones are escaped so
// they survive as literal text.
fn resolve_html_entities(xml: &str) -> Cow<'_, str> {
    NAMED_ENTITY.replace_all(xml, |caps: &Captures| {
        let name = &caps[1];
        if matches!(name, "amp" | "lt" | "gt" | "quot" | "apos") {
            return caps[0].to_string();
        }
        let decoded = html_escape::decode_html_entities(&caps[0]);
        if decoded == caps[0] {
            return format!("&amp;{name};");
        }
        decoded
            .chars()
            .map(|c| match c {
                '<' | '>' | '&' | '"' | '\'' => format!("&#{};", c as u32),
                c => c.to_string(),
            })
            .collect()
    })
}
