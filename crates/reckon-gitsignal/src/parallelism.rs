//! Weekly author-diversity classification.

use std::collections::{HashMap, HashSet};
use std::fmt;

use chrono::Datelike;
use serde::{Deserialize, Serialize};

use crate::history::ChangeEvent;

/// Tiered measure of how often multiple authors work in the same week.
///
/// # Examples
///
/// ```
/// use reckon_gitsignal::parallelism::Parallelism;
///
/// assert_eq!(Parallelism::Moderate.to_string(), "moderate");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Parallelism {
    /// Mostly solo work, or no activity at all.
    Low,
    /// Multiple authors overlap in 20–50% of active weeks.
    Moderate,
    /// Multiple authors overlap in at least half the active weeks.
    High,
}

impl fmt::Display for Parallelism {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Parallelism::Low => write!(f, "low"),
            Parallelism::Moderate => write!(f, "moderate"),
            Parallelism::High => write!(f, "high"),
        }
    }
}

/// Classify author parallelism over ISO calendar weeks.
///
/// A week is multi-author when more than one distinct author committed in
/// it. The ratio of multi-author weeks to weeks with any activity maps to
/// tiers at 0.20 and 0.50. No activity yields [`Parallelism::Low`].
///
/// # Examples
///
/// ```
/// use reckon_gitsignal::parallelism::{parallelism_signal, Parallelism};
///
/// assert_eq!(parallelism_signal(&[]), Parallelism::Low);
/// ```
pub fn parallelism_signal(events: &[ChangeEvent]) -> Parallelism {
    let mut week_authors: HashMap<(i32, u32), HashSet<&str>> = HashMap::new();

    for event in events {
        let week = event.when.iso_week();
        week_authors
            .entry((week.year(), week.week()))
            .or_default()
            .insert(event.author.as_str());
    }

    if week_authors.is_empty() {
        return Parallelism::Low;
    }

    let multi_author_weeks = week_authors
        .values()
        .filter(|authors| authors.len() > 1)
        .count();
    let ratio = multi_author_weeks as f64 / week_authors.len() as f64;

    match ratio {
        r if r < 0.20 => Parallelism::Low,
        r if r < 0.50 => Parallelism::Moderate,
        _ => Parallelism::High,
    }
}
