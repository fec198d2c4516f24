//! Time-bucketed churn sparklines.
//!
//! Every role gets two parallel series built from one walk of the event
//! list: raw daily values kept for adaptive terminal rendering at any
//! width, and a weekly (or bi-weekly) display series pre-rendered into
//! glyphs for machine-readable output. The adaptive renderer max-pools
//! the daily series so spikes survive downsampling.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Months, Utc};
use serde::{Deserialize, Serialize};

use reckon_core::Role;

use crate::history::ChangeEvent;

/// Glyphs for sparkline rendering (8 levels).
const GLYPHS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Roles that get a churn sparkline.
const TRACKED_ROLES: [Role; 3] = [Role::Core, Role::Test, Role::Infra];

/// A time-windowed churn aggregate for one period.
///
/// # Examples
///
/// ```
/// use chrono::Utc;
/// use reckon_gitsignal::sparkline::Bucket;
///
/// let bucket = Bucket { start: Utc::now(), churn: 42 };
/// assert_eq!(bucket.churn, 42);
/// ```
#[derive(Debug, Clone)]
pub struct Bucket {
    /// Start of the period this bucket covers.
    pub start: DateTime<Utc>,
    /// Added + deleted lines landing in the period.
    pub churn: u64,
}

/// A complete churn sparkline for one role.
///
/// `values` holds the raw daily series for adaptive rendering; `glyphs`
/// and `buckets` hold the fixed display resolution.
///
/// # Examples
///
/// ```
/// use chrono::Utc;
/// use reckon_core::Role;
/// use reckon_gitsignal::sparkline::churn_sparkline;
///
/// let spark = churn_sparkline(&[], Role::Core, Utc::now(), 3, false);
/// assert_eq!(spark.role, Role::Core);
/// assert!(spark.glyphs.chars().all(|g| g == '▁'));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sparkline {
    /// Role this series tracks.
    pub role: Role,
    /// Display buckets at weekly or bi-weekly resolution.
    #[serde(skip)]
    pub buckets: Vec<Bucket>,
    /// Pre-rendered glyph string, one glyph per display bucket.
    pub glyphs: String,
    /// Raw daily churn values spanning the whole window.
    pub values: Vec<u64>,
}

/// Map a normalized value (0–1) to a sparkline glyph.
///
/// Breakpoints are perception-tuned rather than linear so low activity
/// still registers visibly.
fn glyph_for(v: f64) -> char {
    match v {
        v if v < 0.02 => GLYPHS[0],
        v if v < 0.08 => GLYPHS[1],
        v if v < 0.18 => GLYPHS[2],
        v if v < 0.32 => GLYPHS[3],
        v if v < 0.50 => GLYPHS[4],
        v if v < 0.70 => GLYPHS[5],
        v if v < 0.88 => GLYPHS[6],
        _ => GLYPHS[7],
    }
}

/// Normalize bucket churn against the maximum within the series.
fn normalize(buckets: &[Bucket]) -> Vec<f64> {
    let max = buckets.iter().map(|b| b.churn).max().unwrap_or(0);
    buckets
        .iter()
        .map(|b| {
            if max > 0 {
                b.churn as f64 / max as f64
            } else {
                0.0
            }
        })
        .collect()
}

/// Render display buckets as a glyph string.
pub fn sparkline_string(buckets: &[Bucket]) -> String {
    normalize(buckets).into_iter().map(glyph_for).collect()
}

/// Start of the analysis window, `months` before `now`.
pub(crate) fn window_start(now: DateTime<Utc>, months: u32) -> DateTime<Utc> {
    now.checked_sub_months(Months::new(months)).unwrap_or(now)
}

/// Build empty contiguous buckets covering the window at `period_days`.
pub(crate) fn build_buckets(now: DateTime<Utc>, months: u32, period_days: i64) -> Vec<Bucket> {
    let start = window_start(now, months);
    let total_days = (now - start).num_days().max(0) + 1;
    let count = (total_days + period_days - 1) / period_days;

    (0..count)
        .map(|i| Bucket {
            start: start + Duration::days(i * period_days),
            churn: 0,
        })
        .collect()
}

/// Accumulate churn from matching events into contiguous buckets.
///
/// Events before the window are dropped; events past the final bucket
/// clip into it.
pub(crate) fn assign_churn<F>(
    buckets: &mut [Bucket],
    period_days: i64,
    events: &[ChangeEvent],
    include: F,
) where
    F: Fn(&ChangeEvent) -> bool,
{
    let Some(first) = buckets.first() else { return };
    let start = first.start;
    let last = buckets.len() - 1;

    for event in events.iter().filter(|e| include(e)) {
        let days = (event.when - start).num_days();
        if days < 0 {
            continue;
        }
        let index = ((days / period_days) as usize).min(last);
        buckets[index].churn += event.added + event.deleted;
    }
}

/// Build the complete sparkline for one role.
///
/// The raw series always uses daily resolution so adaptive rendering can
/// re-pool it at any width without re-walking events; the display series
/// uses weekly buckets, or bi-weekly when `smooth` is set.
pub fn churn_sparkline(
    events: &[ChangeEvent],
    role: Role,
    now: DateTime<Utc>,
    months: u32,
    smooth: bool,
) -> Sparkline {
    let mut daily = build_buckets(now, months, 1);
    assign_churn(&mut daily, 1, events, |e| e.role == Some(role));
    let values: Vec<u64> = daily.iter().map(|b| b.churn).collect();

    let period_days = if smooth { 14 } else { 7 };
    let mut display = build_buckets(now, months, period_days);
    assign_churn(&mut display, period_days, events, |e| e.role == Some(role));
    let glyphs = sparkline_string(&display);

    Sparkline {
        role,
        buckets: display,
        glyphs,
        values,
    }
}

/// Build sparklines for every tracked role.
///
/// # Examples
///
/// ```
/// use chrono::Utc;
/// use reckon_core::Role;
/// use reckon_gitsignal::sparkline::build_churn_series;
///
/// let series = build_churn_series(&[], Utc::now(), 6, false);
/// assert!(series.contains_key(&Role::Core));
/// assert!(series.contains_key(&Role::Test));
/// assert!(series.contains_key(&Role::Infra));
/// ```
pub fn build_churn_series(
    events: &[ChangeEvent],
    now: DateTime<Utc>,
    months: u32,
    smooth: bool,
) -> BTreeMap<Role, Sparkline> {
    TRACKED_ROLES
        .iter()
        .map(|role| (*role, churn_sparkline(events, *role, now, months, smooth)))
        .collect()
}

/// Glyph timeline of AI-assisted churn across all roles, at display
/// resolution.
pub fn ai_timeline(events: &[ChangeEvent], now: DateTime<Utc>, months: u32, smooth: bool) -> String {
    let period_days = if smooth { 14 } else { 7 };
    let mut buckets = build_buckets(now, months, period_days);
    assign_churn(&mut buckets, period_days, events, |e| e.ai_assisted);
    sparkline_string(&buckets)
}

/// Reduce a raw series to `target` values using max pooling.
///
/// Spans are proportionally sized with float boundary math, the last span
/// clipped to the series length. Max pooling is used specifically to
/// preserve spikes instead of smoothing them away. A series no longer
/// than the target is returned unchanged.
///
/// # Examples
///
/// ```
/// use reckon_gitsignal::sparkline::downsample_max;
///
/// let values = vec![0, 9, 0, 0, 7, 0];
/// assert_eq!(downsample_max(&values, 3), vec![9, 0, 7]);
/// // identity when the series already fits
/// assert_eq!(downsample_max(&values, 6), values);
/// ```
pub fn downsample_max(values: &[u64], target: usize) -> Vec<u64> {
    if target == 0 {
        return Vec::new();
    }
    if values.len() <= target {
        return values.to_vec();
    }

    let factor = values.len() as f64 / target as f64;
    (0..target)
        .map(|i| {
            let start = (i as f64 * factor) as usize;
            let end = (((i + 1) as f64) * factor) as usize;
            let end = end.min(values.len());
            values[start..end].iter().copied().max().unwrap_or(0)
        })
        .collect()
}

/// Convert raw churn values to glyphs, normalized against their maximum.
pub fn values_to_glyphs(values: &[u64]) -> String {
    let max = values.iter().copied().max().unwrap_or(0);
    values
        .iter()
        .map(|&v| {
            let normalized = if max > 0 { v as f64 / max as f64 } else { 0.0 };
            glyph_for(normalized)
        })
        .collect()
}

/// Render a raw daily series at the target terminal width.
///
/// # Examples
///
/// ```
/// use reckon_gitsignal::sparkline::render_adaptive;
///
/// let glyphs = render_adaptive(&[], 4);
/// assert_eq!(glyphs, "▁▁▁▁");
/// ```
pub fn render_adaptive(values: &[u64], target_width: usize) -> String {
    if values.is_empty() {
        return GLYPHS[0].to_string().repeat(target_width);
    }

    values_to_glyphs(&downsample_max(values, target_width))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn make_event(path: &str, when: DateTime<Utc>, added: u64, role: Option<Role>) -> ChangeEvent {
        ChangeEvent {
            when,
            path: path.into(),
            added,
            deleted: 0,
            author: "aabbccdd00112233".into(),
            author_email: None,
            author_name: None,
            role,
            ai_assisted: false,
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 6, 15, 12, 0, 0).unwrap()
    }

    #[test]
    fn glyph_breakpoints_are_nonlinear() {
        assert_eq!(glyph_for(0.0), '▁');
        assert_eq!(glyph_for(0.019), '▁');
        assert_eq!(glyph_for(0.02), '▂');
        assert_eq!(glyph_for(0.17), '▃');
        assert_eq!(glyph_for(0.31), '▄');
        assert_eq!(glyph_for(0.49), '▅');
        assert_eq!(glyph_for(0.69), '▆');
        assert_eq!(glyph_for(0.87), '▇');
        assert_eq!(glyph_for(0.88), '█');
        assert_eq!(glyph_for(1.0), '█');
    }

    #[test]
    fn all_zero_series_renders_lowest_glyph() {
        let spark = churn_sparkline(&[], Role::Core, now(), 3, false);
        assert!(!spark.glyphs.is_empty());
        assert!(spark.glyphs.chars().all(|g| g == '▁'));
        assert!(spark.values.iter().all(|&v| v == 0));
    }

    #[test]
    fn daily_series_spans_the_whole_window() {
        let spark = churn_sparkline(&[], Role::Core, now(), 6, false);
        // six months is roughly 182 days; one value per day plus the
        // inclusive endpoint
        assert!(spark.values.len() >= 180 && spark.values.len() <= 185);
    }

    #[test]
    fn events_land_in_their_bucket() {
        let t = now();
        let events = vec![
            make_event("a.rs", t - Duration::days(1), 30, Some(Role::Core)),
            make_event("a.rs", t - Duration::days(40), 10, Some(Role::Core)),
        ];
        let spark = churn_sparkline(&events, Role::Core, t, 3, false);

        let total: u64 = spark.values.iter().sum();
        assert_eq!(total, 40);
        let display_total: u64 = spark.buckets.iter().map(|b| b.churn).sum();
        assert_eq!(display_total, 40);
    }

    #[test]
    fn other_roles_do_not_leak_in() {
        let t = now();
        let events = vec![
            make_event("a.rs", t - Duration::days(1), 30, Some(Role::Test)),
            make_event("b.rs", t - Duration::days(1), 10, None),
        ];
        let spark = churn_sparkline(&events, Role::Core, t, 3, false);
        assert!(spark.values.iter().all(|&v| v == 0));
    }

    #[test]
    fn events_before_the_window_are_dropped() {
        let t = now();
        let events = vec![make_event("a.rs", t - Duration::days(400), 99, Some(Role::Core))];
        let spark = churn_sparkline(&events, Role::Core, t, 3, false);
        assert!(spark.values.iter().all(|&v| v == 0));
    }

    #[test]
    fn smooth_halves_the_display_buckets() {
        let weekly = churn_sparkline(&[], Role::Core, now(), 6, false);
        let biweekly = churn_sparkline(&[], Role::Core, now(), 6, true);
        assert!(biweekly.buckets.len() < weekly.buckets.len());
        assert!(biweekly.buckets.len() >= weekly.buckets.len() / 2);
    }

    #[test]
    fn downsample_identity_at_equal_width() {
        let values = vec![1, 5, 3, 9, 2];
        assert_eq!(downsample_max(&values, 5), values);
        assert_eq!(downsample_max(&values, 10), values);
    }

    #[test]
    fn downsample_preserves_spikes() {
        let mut values = vec![0u64; 100];
        values[37] = 500;
        values[91] = 300;
        let pooled = downsample_max(&values, 10);
        assert_eq!(pooled.len(), 10);
        assert!(pooled.contains(&500));
        assert!(pooled.contains(&300));
    }

    #[test]
    fn downsample_zero_target_is_empty() {
        assert!(downsample_max(&[1, 2, 3], 0).is_empty());
    }

    #[test]
    fn adaptive_render_of_empty_series_fills_width() {
        assert_eq!(render_adaptive(&[], 8), "▁▁▁▁▁▁▁▁");
    }

    #[test]
    fn adaptive_render_peaks_at_full_block() {
        let mut values = vec![0u64; 60];
        values[10] = 100;
        let glyphs = render_adaptive(&values, 12);
        assert_eq!(glyphs.chars().count(), 12);
        assert!(glyphs.contains('█'));
    }

    #[test]
    fn ai_timeline_tracks_only_flagged_events() {
        let t = now();
        let mut flagged = make_event("a.rs", t - Duration::days(2), 50, Some(Role::Core));
        flagged.ai_assisted = true;
        let plain = make_event("b.rs", t - Duration::days(2), 50, Some(Role::Core));

        let timeline = ai_timeline(&[flagged, plain], t, 3, false);
        // exactly one bucket is hot, and it maxes the scale
        assert_eq!(timeline.chars().filter(|&g| g == '█').count(), 1);
    }
}
