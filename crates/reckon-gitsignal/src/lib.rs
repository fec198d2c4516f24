//! Git-signal analytics: churn, stability, ownership, and throughput.
//!
//! Mines commit history through a single `git log` subprocess and turns the
//! resulting change events into cost-estimation signals: churn concentration,
//! stable-core / volatile-surface fractions, rewrite pressure, ownership
//! concentration, weekly parallelism, per-role churn sparklines, a set of
//! named effort adjustments, and per-contributor throughput multipliers.
//!
//! Everything downstream of the parse is pure, synchronous computation over
//! an immutable event list; analyzers receive read-only views and return
//! freshly built results.

pub mod adjustments;
pub mod analyze;
pub mod churn;
pub mod detect;
pub mod engineer;
pub mod history;
pub mod ownership;
pub mod parallelism;
pub mod sparkline;
pub mod stability;

pub use adjustments::{effort_adjustments, EffortAdjustment};
pub use analyze::{analyze, GitMetrics, Options};
pub use churn::{churn_concentration, ChurnStat};
pub use detect::{detect_repo, is_shallow_clone, RepoHint};
pub use engineer::{
    analyze_throughput, engineer_stats, EngineerAnalysis, EngineerOptions, EngineerStats,
};
pub use history::{file_loc_map, map_roles, parse_history, ChangeEvent, ParseOptions};
pub use ownership::ownership_concentration;
pub use parallelism::{parallelism_signal, Parallelism};
pub use sparkline::{
    build_churn_series, churn_sparkline, downsample_max, render_adaptive, values_to_glyphs,
    Bucket, Sparkline,
};
pub use stability::{rewrite_pressure, stability};
