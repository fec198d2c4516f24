//! Effort-adjustment rules over the analyzer outputs.
//!
//! A fixed, ordered, independent set of predicate→delta rules. Rules are
//! not mutually exclusive; the net adjustment is the plain sum of matched
//! deltas, handed to the external cost estimator to apply as `1 + net`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use reckon_core::Role;

use crate::churn::ChurnStat;
use crate::sparkline::{Bucket, Sparkline};

/// A named, signed fractional effort adjustment.
///
/// # Examples
///
/// ```
/// use reckon_gitsignal::adjustments::EffortAdjustment;
///
/// let adj = EffortAdjustment {
///     reason: "Stable foundation".into(),
///     adjustment: -0.05,
/// };
/// assert!(adj.adjustment < 0.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EffortAdjustment {
    /// Human-readable rule label.
    pub reason: String,
    /// Signed fractional delta.
    pub adjustment: f64,
}

/// Evaluate every adjustment rule and return the matches plus their sum.
///
/// # Examples
///
/// ```
/// use std::collections::BTreeMap;
/// use reckon_gitsignal::adjustments::effort_adjustments;
/// use reckon_gitsignal::churn::ChurnStat;
///
/// let churn = ChurnStat { file_percent: 10.0, edit_percent: 70.0 };
/// let (matched, net) = effort_adjustments(&churn, 0.0, 0.5, 0.0, 0.0, &BTreeMap::new());
/// assert_eq!(matched.len(), 1);
/// assert_eq!(matched[0].reason, "High churn concentration");
/// assert_eq!(net, 0.10);
/// ```
pub fn effort_adjustments(
    churn: &ChurnStat,
    stable_core: f64,
    volatile_surface: f64,
    rewrite_pressure: f64,
    ownership_concentration: f64,
    churn_series: &BTreeMap<Role, Sparkline>,
) -> (Vec<EffortAdjustment>, f64) {
    let mut adjustments = Vec::new();
    let mut push = |reason: &str, delta: f64| {
        adjustments.push(EffortAdjustment {
            reason: reason.into(),
            adjustment: delta,
        });
    };

    // few files absorbing most edits (hotspots)
    if churn.file_percent < 15.0 && churn.edit_percent > 60.0 {
        push("High churn concentration", 0.10);
    }

    if let Some(core) = churn_series.get(&Role::Core) {
        if sustained_high_churn(&core.buckets) {
            push("Sustained core churn", 0.12);
        }
    }

    if let Some(infra) = churn_series.get(&Role::Infra) {
        if late_volatility(&infra.buckets) {
            push("Late infra volatility", 0.08);
        }
    }

    if ownership_concentration > 0.30 {
        push("Ownership concentration", 0.10);
    }

    if rewrite_pressure > 0.45 {
        push("Rewrite-heavy", 0.06);
    }

    // the only effort-reducing rule
    if stable_core > 0.50 && volatile_surface < 0.10 {
        push("Stable foundation", -0.05);
    }

    let net = adjustments.iter().map(|a| a.adjustment).sum();
    (adjustments, net)
}

/// At least 30% of buckets running at half the series maximum or more.
fn sustained_high_churn(buckets: &[Bucket]) -> bool {
    let max = max_churn(buckets);
    if max == 0 {
        return false;
    }

    let high = buckets
        .iter()
        .filter(|b| b.churn as f64 >= 0.5 * max as f64)
        .count();
    high as f64 / buckets.len() as f64 >= 0.30
}

/// Two or more near-maximum spikes in the final quartile of the window.
fn late_volatility(buckets: &[Bucket]) -> bool {
    let n = buckets.len();
    if n < 6 {
        return false;
    }

    let max = max_churn(buckets);
    if max == 0 {
        return false;
    }

    let spikes = buckets[n - n / 4..]
        .iter()
        .filter(|b| b.churn as f64 >= 0.7 * max as f64)
        .count();
    spikes >= 2
}

fn max_churn(buckets: &[Bucket]) -> u64 {
    buckets.iter().map(|b| b.churn).max().unwrap_or(0)
}
