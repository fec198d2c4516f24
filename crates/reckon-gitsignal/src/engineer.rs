//! Per-contributor throughput multipliers.
//!
//! Groups core and test change events by author email and derives a
//! LOC/day figure against a fixed baseline. Requires history parsed with
//! raw-identity preservation; this module's entry point requests that
//! itself, so callers cannot get the precondition wrong.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::path::Path;

use chrono::{DateTime, Months, Utc};
use serde::{Deserialize, Serialize};

use reckon_core::{FileRecord, ReckonError, Role};

use crate::history::{map_roles, parse_history, ChangeEvent, ParseOptions};

const THROUGHPUT_CAVEAT: &str =
    "Volume metric only - high LOC may indicate bulk changes, not value delivered";

/// Options controlling engineer throughput analysis.
///
/// # Examples
///
/// ```
/// use reckon_gitsignal::engineer::EngineerOptions;
///
/// let opts = EngineerOptions::default();
/// assert_eq!(opts.period_months, 6);
/// assert_eq!(opts.baseline_loc_per_day, 80.0);
/// assert_eq!(opts.workday_factor, 0.71);
/// ```
#[derive(Debug, Clone)]
pub struct EngineerOptions {
    /// Analysis window in months.
    pub period_months: u32,
    /// Industry-average senior engineer output.
    pub baseline_loc_per_day: f64,
    /// Weekend + PTO de-rating applied to active days (5/7 × 0.9).
    pub workday_factor: f64,
}

impl Default for EngineerOptions {
    fn default() -> Self {
        Self {
            period_months: 6,
            baseline_loc_per_day: 80.0,
            workday_factor: 0.71,
        }
    }
}

/// Throughput stats for one contributor.
///
/// # Examples
///
/// ```
/// use reckon_gitsignal::engineer::EngineerStats;
///
/// let stats = EngineerStats {
///     author_email: "alice@example.com".into(),
///     author_name: "Alice".into(),
///     total_loc: 4200,
///     loc_per_day: 96.0,
///     multiplier: 1.2,
///     ai_percent: 0.25,
///     commit_count: 87,
/// };
/// assert!(stats.multiplier >= 1.0);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineerStats {
    /// Lowercased author email.
    pub author_email: String,
    /// Display name as recorded in the log.
    pub author_name: String,
    /// Total lines added across core and test code in the window.
    pub total_loc: u64,
    /// Lines added per de-rated working day.
    pub loc_per_day: f64,
    /// `loc_per_day / baseline`, floored at 1.0.
    pub multiplier: f64,
    /// Fraction of unique commits carrying an AI-assistance marker.
    pub ai_percent: f64,
    /// Unique commits in the window.
    pub commit_count: u32,
}

/// Per-contributor throughput analysis for a repository.
///
/// # Examples
///
/// ```
/// use reckon_gitsignal::engineer::EngineerAnalysis;
///
/// let analysis = EngineerAnalysis {
///     engineers: vec![],
///     baseline_loc_per_day: 80.0,
///     period_months: 6,
///     median_multiplier: 1.0,
///     caveat: "volume metric".into(),
/// };
/// assert_eq!(analysis.period_months, 6);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineerAnalysis {
    /// Contributors sorted by multiplier descending, then email.
    pub engineers: Vec<EngineerStats>,
    /// Baseline the multipliers are measured against.
    pub baseline_loc_per_day: f64,
    /// Window length in months.
    pub period_months: u32,
    /// Median of the sorted multipliers.
    pub median_multiplier: f64,
    /// Standing caveat about LOC as a volume metric.
    pub caveat: String,
}

/// Parse history with raw identities and compute throughput stats.
///
/// Returns `Ok(None)`, not an error, when the window holds no events or
/// no identifiable authors.
///
/// # Errors
///
/// Returns [`ReckonError::Git`] if the history subprocess fails.
///
/// # Examples
///
/// ```no_run
/// use std::path::Path;
/// use reckon_gitsignal::engineer::{analyze_throughput, EngineerOptions};
///
/// let analysis = analyze_throughput(Path::new("."), &[], &EngineerOptions::default()).unwrap();
/// if let Some(analysis) = analysis {
///     println!("{} contributors", analysis.engineers.len());
/// }
/// ```
pub fn analyze_throughput(
    root: &Path,
    records: &[FileRecord],
    options: &EngineerOptions,
) -> Result<Option<EngineerAnalysis>, ReckonError> {
    let mut events = parse_history(
        root,
        &ParseOptions {
            since_months: options.period_months,
            preserve_authors: true,
        },
    )?;
    if events.is_empty() {
        return Ok(None);
    }

    map_roles(&mut events, records);
    Ok(engineer_stats(&events, options, Utc::now()))
}

struct AuthorData {
    name: String,
    loc: u64,
    first_commit: DateTime<Utc>,
    commits: HashSet<DateTime<Utc>>,
    ai_commits: HashSet<DateTime<Utc>>,
}

/// Compute per-contributor throughput from role-tagged events.
///
/// Only core and test events count. Each author's active period starts at
/// their earliest in-window commit (or the window start, whichever is
/// later); active days are de-rated by the workday factor and floored at
/// one day. Commit uniqueness per author is approximated by exact commit
/// timestamp. Returns `None` when no identifiable authors remain.
pub fn engineer_stats(
    events: &[ChangeEvent],
    options: &EngineerOptions,
    now: DateTime<Utc>,
) -> Option<EngineerAnalysis> {
    if events.is_empty() {
        return None;
    }

    let window_start = now
        .checked_sub_months(Months::new(options.period_months))
        .unwrap_or(now);

    let mut by_author: HashMap<String, AuthorData> = HashMap::new();

    for event in events {
        let Some(email) = event.author_email.as_deref() else {
            continue;
        };
        if email.is_empty() {
            continue;
        }
        // production code and tests only
        if !matches!(event.role, Some(Role::Core | Role::Test)) {
            continue;
        }
        if event.when < window_start {
            continue;
        }

        let data = by_author
            .entry(email.to_string())
            .or_insert_with(|| AuthorData {
                name: event.author_name.clone().unwrap_or_default(),
                loc: 0,
                first_commit: event.when,
                commits: HashSet::new(),
                ai_commits: HashSet::new(),
            });

        if event.when < data.first_commit {
            data.first_commit = event.when;
        }
        data.loc += event.added;

        // commit timestamp as a unique-ish identifier within an author;
        // avoids threading hashes through the whole pipeline
        if data.commits.insert(event.when) && event.ai_assisted {
            data.ai_commits.insert(event.when);
        }
    }

    if by_author.is_empty() {
        return None;
    }

    let mut engineers: Vec<EngineerStats> = by_author
        .into_iter()
        .map(|(email, data)| {
            let effective_start = data.first_commit.max(window_start);
            let active_days = (now - effective_start).num_seconds() as f64 / 86_400.0;
            let working_days = (active_days * options.workday_factor).max(1.0);

            let loc_per_day = data.loc as f64 / working_days;
            let multiplier = (loc_per_day / options.baseline_loc_per_day).max(1.0);

            let commit_count = data.commits.len() as u32;
            let ai_percent = if commit_count > 0 {
                data.ai_commits.len() as f64 / commit_count as f64
            } else {
                0.0
            };

            EngineerStats {
                author_email: email,
                author_name: data.name,
                total_loc: data.loc,
                loc_per_day,
                multiplier,
                ai_percent,
                commit_count,
            }
        })
        .collect();

    engineers.sort_by(|a, b| {
        b.multiplier
            .partial_cmp(&a.multiplier)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.author_email.cmp(&b.author_email))
    });

    let median_multiplier = median_multiplier(&engineers);

    Some(EngineerAnalysis {
        engineers,
        baseline_loc_per_day: options.baseline_loc_per_day,
        period_months: options.period_months,
        median_multiplier,
        caveat: THROUGHPUT_CAVEAT.into(),
    })
}

fn median_multiplier(engineers: &[EngineerStats]) -> f64 {
    if engineers.is_empty() {
        return 1.0;
    }

    let mut multipliers: Vec<f64> = engineers.iter().map(|e| e.multiplier).collect();
    multipliers.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));

    let mid = multipliers.len() / 2;
    if multipliers.len() % 2 == 0 {
        (multipliers[mid - 1] + multipliers[mid]) / 2.0
    } else {
        multipliers[mid]
    }
}

/// The username part of an email, for compact display.
///
/// # Examples
///
/// ```
/// use reckon_gitsignal::engineer::email_prefix;
///
/// assert_eq!(email_prefix("alice@example.com"), "alice");
/// assert_eq!(email_prefix("no-at-sign"), "no-at-sign");
/// assert_eq!(email_prefix(""), "unknown");
/// ```
pub fn email_prefix(email: &str) -> &str {
    if email.is_empty() {
        return "unknown";
    }
    email.split('@').next().unwrap_or(email)
}
