//! Stable-core / volatile-surface fractions and rewrite pressure.

use std::collections::HashMap;

use chrono::{DateTime, Months, Utc};

use crate::history::ChangeEvent;

/// Trailing window for volatility, in months. Fixed by the metric's
/// definition, unlike the configurable stable window.
const VOLATILE_WINDOW_MONTHS: u32 = 6;

/// Touches within the volatile window that make a file volatile.
const VOLATILE_TOUCHES: u32 = 5;

/// Compute LOC-weighted stable-core and volatile-surface fractions.
///
/// A file counts as stable core if it was never touched in the event
/// window or its last touch predates the stable cutoff (`stable_months`
/// before `now`). A file counts as volatile surface if it received at
/// least five touches in the trailing six months. Both fractions weigh
/// mass of code, not file count, against the total tracked LOC.
///
/// Returns `(0.0, 0.0)` when no LOC is tracked.
///
/// # Examples
///
/// ```
/// use std::collections::HashMap;
/// use chrono::Utc;
/// use reckon_gitsignal::stability::stability;
///
/// let loc: HashMap<String, u64> = [("src/old.rs".to_string(), 400)].into();
/// // no events: everything untouched is stable core
/// let (stable, volatile) = stability(&[], &loc, 18, Utc::now());
/// assert_eq!(stable, 1.0);
/// assert_eq!(volatile, 0.0);
/// ```
pub fn stability(
    events: &[ChangeEvent],
    file_loc: &HashMap<String, u64>,
    stable_months: u32,
    now: DateTime<Utc>,
) -> (f64, f64) {
    let stable_cutoff = now
        .checked_sub_months(Months::new(stable_months))
        .unwrap_or(now);
    let volatile_cutoff = now
        .checked_sub_months(Months::new(VOLATILE_WINDOW_MONTHS))
        .unwrap_or(now);

    let mut last_modified: HashMap<&str, DateTime<Utc>> = HashMap::new();
    let mut touch_count: HashMap<&str, u32> = HashMap::new();

    for event in events {
        let entry = last_modified.entry(event.path.as_str()).or_insert(event.when);
        if event.when > *entry {
            *entry = event.when;
        }
        if event.when > volatile_cutoff {
            *touch_count.entry(event.path.as_str()).or_default() += 1;
        }
    }

    let mut total_loc: u64 = 0;
    let mut stable_loc: u64 = 0;
    let mut volatile_loc: u64 = 0;

    for (path, loc) in file_loc {
        total_loc += loc;

        match last_modified.get(path.as_str()) {
            None => stable_loc += loc,
            Some(modified) if *modified < stable_cutoff => stable_loc += loc,
            Some(_) => {}
        }

        if touch_count.get(path.as_str()).copied().unwrap_or(0) >= VOLATILE_TOUCHES {
            volatile_loc += loc;
        }
    }

    if total_loc == 0 {
        return (0.0, 0.0);
    }

    (
        stable_loc as f64 / total_loc as f64,
        volatile_loc as f64 / total_loc as f64,
    )
}

/// Deleted churn as a fraction of total churn, a proxy for rewrite-heavy
/// versus purely additive development. 0 when there is no churn.
///
/// # Examples
///
/// ```
/// use reckon_gitsignal::stability::rewrite_pressure;
///
/// assert_eq!(rewrite_pressure(&[]), 0.0);
/// ```
pub fn rewrite_pressure(events: &[ChangeEvent]) -> f64 {
    let mut added: u64 = 0;
    let mut deleted: u64 = 0;

    for event in events {
        added += event.added;
        deleted += event.deleted;
    }

    let total = added + deleted;
    if total == 0 {
        return 0.0;
    }

    deleted as f64 / total as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn make_event(path: &str, when: DateTime<Utc>, added: u64, deleted: u64) -> ChangeEvent {
        ChangeEvent {
            when,
            path: path.into(),
            added,
            deleted,
            author: "aabbccdd00112233".into(),
            author_email: None,
            author_name: None,
            role: None,
            ai_assisted: false,
        }
    }

    fn loc_map(entries: &[(&str, u64)]) -> HashMap<String, u64> {
        entries.iter().map(|(p, l)| (p.to_string(), *l)).collect()
    }

    #[test]
    fn untouched_file_is_stable_core() {
        let now = Utc::now();
        let loc = loc_map(&[("ancient.rs", 300), ("fresh.rs", 100)]);
        let events = vec![make_event("fresh.rs", now - Duration::days(3), 10, 0)];

        let (stable, volatile) = stability(&events, &loc, 18, now);
        assert_eq!(stable, 0.75);
        assert_eq!(volatile, 0.0);
    }

    #[test]
    fn old_last_touch_is_stable_core() {
        let now = Utc::now();
        let loc = loc_map(&[("legacy.rs", 500), ("active.rs", 500)]);
        let events = vec![
            make_event("legacy.rs", now - Duration::days(600), 5, 5),
            make_event("active.rs", now - Duration::days(10), 5, 5),
        ];

        let (stable, _) = stability(&events, &loc, 18, now);
        assert_eq!(stable, 0.5);
    }

    #[test]
    fn frequently_touched_file_is_volatile() {
        let now = Utc::now();
        let loc = loc_map(&[("hot.rs", 200), ("calm.rs", 800)]);
        let mut events = Vec::new();
        for i in 0..5 {
            events.push(make_event("hot.rs", now - Duration::days(i * 7), 10, 2));
        }
        events.push(make_event("calm.rs", now - Duration::days(30), 1, 0));

        let (stable, volatile) = stability(&events, &loc, 18, now);
        assert_eq!(volatile, 0.2);
        assert_eq!(stable, 0.0);
    }

    #[test]
    fn four_touches_stay_below_volatile_threshold() {
        let now = Utc::now();
        let loc = loc_map(&[("warm.rs", 100)]);
        let events: Vec<ChangeEvent> = (0..4)
            .map(|i| make_event("warm.rs", now - Duration::days(i * 10), 5, 0))
            .collect();

        let (_, volatile) = stability(&events, &loc, 18, now);
        assert_eq!(volatile, 0.0);
    }

    #[test]
    fn old_touches_do_not_count_toward_volatility() {
        let now = Utc::now();
        let loc = loc_map(&[("revived.rs", 100)]);
        // five touches, all older than six months
        let events: Vec<ChangeEvent> = (0..5)
            .map(|i| make_event("revived.rs", now - Duration::days(200 + i), 5, 0))
            .collect();

        let (_, volatile) = stability(&events, &loc, 18, now);
        assert_eq!(volatile, 0.0);
    }

    #[test]
    fn empty_loc_map_yields_zeroes() {
        let (stable, volatile) = stability(&[], &HashMap::new(), 18, Utc::now());
        assert_eq!((stable, volatile), (0.0, 0.0));
    }

    #[test]
    fn rewrite_pressure_pure_addition_is_zero() {
        let now = Utc::now();
        let events = vec![
            make_event("a.rs", now, 100, 0),
            make_event("b.rs", now, 50, 0),
        ];
        assert_eq!(rewrite_pressure(&events), 0.0);
    }

    #[test]
    fn rewrite_pressure_pure_deletion_is_one() {
        let now = Utc::now();
        let events = vec![make_event("a.rs", now, 0, 80)];
        assert_eq!(rewrite_pressure(&events), 1.0);
    }

    #[test]
    fn rewrite_pressure_is_delete_share() {
        let now = Utc::now();
        let events = vec![make_event("a.rs", now, 60, 40)];
        assert_eq!(rewrite_pressure(&events), 0.4);
    }
}
