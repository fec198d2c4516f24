//! Pareto-style churn concentration.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::history::ChangeEvent;

/// Cumulative churn share at which concentration is measured.
const CONCENTRATION_TARGET: f64 = 0.65;

/// What percentage of files accounts for what percentage of edits.
///
/// The degenerate value `(100, 100)` means "no usable signal" (no events,
/// or zero total churn); it is not an error.
///
/// # Examples
///
/// ```
/// use reckon_gitsignal::churn::ChurnStat;
///
/// let stat = ChurnStat::NO_SIGNAL;
/// assert_eq!(stat.file_percent, 100.0);
/// assert_eq!(stat.edit_percent, 100.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChurnStat {
    /// Percentage of files in the concentrated set.
    pub file_percent: f64,
    /// Percentage of total edits those files account for.
    pub edit_percent: f64,
}

impl ChurnStat {
    /// Sentinel for "no usable churn signal".
    pub const NO_SIGNAL: ChurnStat = ChurnStat {
        file_percent: 100.0,
        edit_percent: 100.0,
    };
}

/// Compute churn concentration over a change-event list.
///
/// Aggregates churn (added + deleted) per path, ranks paths by churn
/// descending, and walks the ranking until the cumulative churn reaches
/// 65% of the total. Ties rank by ascending path so the result is fully
/// deterministic.
///
/// # Examples
///
/// ```
/// use reckon_gitsignal::churn::{churn_concentration, ChurnStat};
///
/// assert_eq!(churn_concentration(&[]), ChurnStat::NO_SIGNAL);
/// ```
pub fn churn_concentration(events: &[ChangeEvent]) -> ChurnStat {
    if events.is_empty() {
        return ChurnStat::NO_SIGNAL;
    }

    let mut file_churn: HashMap<&str, u64> = HashMap::new();
    let mut total: u64 = 0;
    for event in events {
        let churn = event.added + event.deleted;
        *file_churn.entry(event.path.as_str()).or_default() += churn;
        total += churn;
    }

    if total == 0 {
        return ChurnStat::NO_SIGNAL;
    }

    let mut files: Vec<(&str, u64)> = file_churn.into_iter().collect();
    files.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));

    // smallest N% of files accounting for ~65% of edits
    let target = total as f64 * CONCENTRATION_TARGET;
    let mut cumulative: u64 = 0;
    for (i, (_, churn)) in files.iter().enumerate() {
        cumulative += churn;
        if cumulative as f64 >= target {
            return ChurnStat {
                file_percent: (i + 1) as f64 / files.len() as f64 * 100.0,
                edit_percent: cumulative as f64 / total as f64 * 100.0,
            };
        }
    }

    ChurnStat::NO_SIGNAL
}
