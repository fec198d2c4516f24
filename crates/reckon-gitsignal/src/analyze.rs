//! Full git-signal analysis over one repository.

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use reckon_core::{FileRecord, ReckonError, Role};

use crate::adjustments::{effort_adjustments, EffortAdjustment};
use crate::churn::{churn_concentration, ChurnStat};
use crate::detect::is_shallow_clone;
use crate::history::{file_loc_map, map_roles, parse_history, ParseOptions};
use crate::ownership::ownership_concentration;
use crate::parallelism::{parallelism_signal, Parallelism};
use crate::sparkline::{ai_timeline, build_churn_series, window_start, Sparkline};
use crate::stability::{rewrite_pressure, stability};

/// Options controlling the full analysis.
///
/// # Examples
///
/// ```
/// use reckon_gitsignal::analyze::Options;
///
/// let opts = Options::default();
/// assert_eq!(opts.window_months, 6);
/// assert_eq!(opts.stable_months, 18);
/// ```
#[derive(Debug, Clone)]
pub struct Options {
    /// Months of history to analyze.
    pub window_months: u32,
    /// Files last touched before this many months count as stable core.
    pub stable_months: u32,
    /// Bi-weekly display buckets instead of weekly.
    pub smooth: bool,
    /// Keep raw author identities on the parsed events.
    pub preserve_authors: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            window_months: 6,
            stable_months: 18,
            smooth: false,
            preserve_authors: false,
        }
    }
}

/// The assembled git-signal metrics for one invocation.
///
/// Built fresh per call and immutable once returned; nothing here aliases
/// into the parsed event list.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GitMetrics {
    /// Pareto churn concentration.
    pub churn_concentration: ChurnStat,
    /// LOC-weighted fraction of stable core code.
    pub stable_core: f64,
    /// LOC-weighted fraction of volatile surface code.
    pub volatile_surface: f64,
    /// Deleted churn over total churn.
    pub rewrite_pressure: f64,
    /// Fraction of core LOC dominated by a single author.
    pub ownership_concentration: f64,
    /// Weekly author-diversity tier.
    pub parallelism: Parallelism,
    /// Per-role churn sparklines.
    pub churn_series: BTreeMap<Role, Sparkline>,
    /// Matched effort-adjustment rules.
    pub adjustments: Vec<EffortAdjustment>,
    /// Sum of matched deltas, applied downstream as `1 + net`.
    pub net_adjustment: f64,
    /// Whether any commit carried an AI-assistance marker.
    pub has_any_ai: bool,
    /// Glyph timeline of AI-assisted churn, when any exists.
    pub ai_timeline: Option<String>,
    /// Window length in months.
    pub window_months: u32,
    /// Start of the analysis window.
    pub window_start: DateTime<Utc>,
    /// End of the analysis window.
    pub window_end: DateTime<Utc>,
    /// Display buckets per sparkline.
    pub bucket_count: usize,
    /// Unique commits observed, keyed by (author, timestamp).
    pub commit_count: usize,
    /// Caveat set when the repository is a shallow clone.
    pub analysis_note: Option<String>,
}

/// Parse history once and run every analyzer over the event list.
///
/// The subprocess parse is the only I/O; each analyzer is a pure function
/// over the immutable events and the scanner's records, so the result is
/// deterministic for a given log output.
///
/// # Errors
///
/// Returns [`ReckonError::Git`] when the repository cannot be read. The
/// caller should degrade gracefully: omit the git-derived report section
/// rather than fail the report.
///
/// # Examples
///
/// ```no_run
/// use std::path::Path;
/// use reckon_gitsignal::analyze::{analyze, Options};
///
/// let metrics = analyze(Path::new("."), &[], &Options::default()).unwrap();
/// println!("net adjustment: {:+.2}", metrics.net_adjustment);
/// ```
pub fn analyze(
    root: &Path,
    records: &[FileRecord],
    options: &Options,
) -> Result<GitMetrics, ReckonError> {
    let now = Utc::now();

    let mut events = parse_history(
        root,
        &ParseOptions {
            since_months: options.window_months,
            preserve_authors: options.preserve_authors,
        },
    )?;
    map_roles(&mut events, records);

    let loc_map = file_loc_map(records);

    let churn = churn_concentration(&events);
    let (stable_core, volatile_surface) = stability(&events, &loc_map, options.stable_months, now);
    let rewrite = rewrite_pressure(&events);
    let ownership = ownership_concentration(&events, records);
    let parallelism = parallelism_signal(&events);
    let churn_series = build_churn_series(&events, now, options.window_months, options.smooth);

    let (adjustments, net_adjustment) = effort_adjustments(
        &churn,
        stable_core,
        volatile_surface,
        rewrite,
        ownership,
        &churn_series,
    );

    let has_any_ai = events.iter().any(|e| e.ai_assisted);
    let ai_timeline = has_any_ai
        .then(|| ai_timeline(&events, now, options.window_months, options.smooth));

    let commit_count = events
        .iter()
        .map(|e| (e.author.as_str(), e.when))
        .collect::<HashSet<_>>()
        .len();
    let bucket_count = churn_series
        .get(&Role::Core)
        .map(|s| s.buckets.len())
        .unwrap_or(0);

    let analysis_note = is_shallow_clone(root)
        .then(|| "shallow clone: history may be truncated".to_string());

    Ok(GitMetrics {
        churn_concentration: churn,
        stable_core,
        volatile_surface,
        rewrite_pressure: rewrite,
        ownership_concentration: ownership,
        parallelism,
        churn_series,
        adjustments,
        net_adjustment,
        has_any_ai,
        ai_timeline,
        window_months: options.window_months,
        window_start: window_start(now, options.window_months),
        window_end: now,
        bucket_count,
        commit_count,
        analysis_note,
    })
}
