// src/classify/mod.rs
//! Item classification: criterion matching, priority model, rule resolution.

pub mod criterion;
pub mod priority;
pub mod resolver;

pub use criterion::{criterion_matches, Criterion};
pub use priority::{ParsePriorityError, Priority};
pub use resolver::{category_matches, resolve, MatchPolicy, Resolution};
