// src/classify/criterion.rs
//! A single matching condition over one piece of text.
//!
//! - text list: literal substrings, case-insensitive, any one of them matches
//! - regex: one pattern, multiline, case-sensitive

use regex::{Regex, RegexBuilder};

#[derive(Debug, Clone)]
pub struct Criterion {
    // None for an empty text list.
    re: Option<Regex>,
}

impl Criterion {
    /// Build a case-insensitive alternation of the escaped phrases.
    /// An empty (or all-blank) list compiles to a criterion that never matches.
    pub fn text<I, S>(phrases: I) -> Result<Self, regex::Error>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let alternation = phrases
            .into_iter()
            .map(Into::<String>::into)
            .filter(|p| !p.is_empty())
            .map(|p| regex::escape(&p))
            .collect::<Vec<_>>()
            .join("|");
        let re = if alternation.is_empty() {
            None
        } else {
            Some(RegexBuilder::new(&alternation).case_insensitive(true).build()?)
        };
        Ok(Self { re })
    }

    pub fn regex(pattern: &str) -> Result<Self, regex::Error> {
        let re = RegexBuilder::new(pattern).multi_line(true).build()?;
        Ok(Self { re: Some(re) })
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.re.as_ref().is_some_and(|re| re.is_match(text))
    }
}

/// Absent criterion is a non-match.
pub fn criterion_matches(criterion: Option<&Criterion>, text: &str) -> bool {
    criterion.is_some_and(|c| c.is_match(text))
}
