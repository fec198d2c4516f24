//! Ownership concentration over production code.

use std::collections::HashMap;

use reckon_core::{FileRecord, Role};

use crate::history::ChangeEvent;

/// Churn share above which a single author dominates a file.
const DOMINANCE_THRESHOLD: f64 = 0.50;

/// Fraction of core LOC whose edit history is dominated by one author.
///
/// Only events carrying the core role participate. For each file, every
/// author's share of that file's total churn is computed; when the top
/// author's share exceeds 50%, the file's current LOC counts as
/// concentrated. The result is concentrated LOC over the total LOC of all
/// core-role files in `records` (0 when no core LOC is tracked), so
/// untouched core code dilutes the signal rather than hiding it.
///
/// Raising any single author's share above the threshold on a previously
/// unconcentrated file can only grow the result.
///
/// # Examples
///
/// ```
/// use reckon_gitsignal::ownership::ownership_concentration;
///
/// assert_eq!(ownership_concentration(&[], &[]), 0.0);
/// ```
pub fn ownership_concentration(events: &[ChangeEvent], records: &[FileRecord]) -> f64 {
    // churn per file per author (authors are already hashed)
    let mut author_churn: HashMap<&str, HashMap<&str, u64>> = HashMap::new();

    for event in events {
        if event.role != Some(Role::Core) {
            continue;
        }
        let churn = event.added + event.deleted;
        *author_churn
            .entry(event.path.as_str())
            .or_default()
            .entry(event.author.as_str())
            .or_default() += churn;
    }

    let mut concentrated_loc: u64 = 0;
    let mut total_core_loc: u64 = 0;

    for record in records {
        if record.role != Role::Core {
            continue;
        }
        total_core_loc += record.loc;

        let Some(authors) = author_churn.get(record.path.as_str()) else {
            continue;
        };
        let file_total: u64 = authors.values().sum();
        if file_total == 0 {
            continue;
        }

        let top = authors.values().copied().max().unwrap_or(0);
        if top as f64 / file_total as f64 > DOMINANCE_THRESHOLD {
            concentrated_loc += record.loc;
        }
    }

    if total_core_loc == 0 {
        return 0.0;
    }

    concentrated_loc as f64 / total_core_loc as f64
}
