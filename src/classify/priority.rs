// src/classify/priority.rs
//! Notification priority: numeric ntfy levels plus two suppressing sentinels.
//!
//! Total order: `Ignore < Level(1) < Level(2) < … < SuperIgnore`.
//! `SuperIgnore` sits above every level, so once escalation reaches it no
//! later rule can pull the result back down.

use serde::{Deserialize, Deserializer};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Priority {
    /// Suppress; lowest of all values.
    Ignore,
    /// Delivered with this numeric priority.
    Level(u8),
    /// Suppress; dominates every other value.
    SuperIgnore,
}

impl Priority {
    /// ntfy's own default when nothing is configured.
    pub const DEFAULT: Priority = Priority::Level(3);

    /// Levels the push endpoint accepts; anything else is answered with 400.
    pub const LEVELS: std::ops::RangeInclusive<u8> = 1..=5;

    pub fn is_suppressed(self) -> bool {
        matches!(self, Priority::Ignore | Priority::SuperIgnore)
    }

    /// Numeric value for the outbound header; `None` for the sentinels.
    pub fn level(self) -> Option<u8> {
        match self {
            Priority::Level(n) => Some(n),
            _ => None,
        }
    }

    /// `Level(n)` when `n` is a level the endpoint accepts.
    pub fn from_level(n: u8) -> Option<Priority> {
        Self::LEVELS.contains(&n).then_some(Priority::Level(n))
    }

    /// Escalation step: keep whichever of the two is higher.
    pub fn escalate(self, other: Priority) -> Priority {
        self.max(other)
    }
}

impl Default for Priority {
    fn default() -> Self {
        Priority::DEFAULT
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Priority::Ignore => f.write_str("ignore"),
            Priority::SuperIgnore => f.write_str("super_ignore"),
            Priority::Level(n) => write!(f, "{n}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid priority '{0}' (expected 1-5, ignore, super_ignore or min/low/default/high/max/urgent)")]
pub struct ParsePriorityError(pub String);

impl FromStr for Priority {
    type Err = ParsePriorityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let t = s.trim();
        match t.to_ascii_lowercase().as_str() {
            "ignore" => return Ok(Priority::Ignore),
            "super_ignore" => return Ok(Priority::SuperIgnore),
            "min" => return Ok(Priority::Level(1)),
            "low" => return Ok(Priority::Level(2)),
            "default" => return Ok(Priority::Level(3)),
            "high" => return Ok(Priority::Level(4)),
            "max" | "urgent" => return Ok(Priority::Level(5)),
            _ => {}
        }
        t.parse::<u8>()
            .ok()
            .and_then(Priority::from_level)
            .ok_or_else(|| ParsePriorityError(s.to_string()))
    }
}

impl<'de> Deserialize<'de> for Priority {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Num(i64),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Num(n) => u8::try_from(n)
                .ok()
                .and_then(Priority::from_level)
                .ok_or_else(|| serde::de::Error::custom(ParsePriorityError(n.to_string()))),
            Raw::Text(s) => s.parse().map_err(serde::de::Error::custom),
        }
    }
}
