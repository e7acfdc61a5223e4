// src/format.rs
//! Message body formatting: per-feed replacements, then line normalization.

use crate::config::Feed;

/// Apply the feed's replacements in order, drop empty lines, optionally trim.
pub fn format_message(body: &str, feed: &Feed) -> String {
    let mut out = body.to_string();
    for r in &feed.replacements {
        if r.from.is_empty() {
            continue;
        }
        out = out.replace(&r.from, &r.to);
    }
    normalize_lines(&out, feed.trim)
}

/// Split on `\n`, drop empty lines, trim if asked, drop lines emptied by the trim.
pub fn normalize_lines(text: &str, trim: bool) -> String {
    text.split('\n')
        .filter(|line| !line.is_empty())
        .map(|line| if trim { line.trim() } else { line })
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
