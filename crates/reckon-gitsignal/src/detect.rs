//! Lightweight repository detection via git2.
//!
//! Used for the cheap pre-check before any subprocess work: is this a
//! repository at all, how old is it, and is it still active. Shallow-clone
//! detection feeds the truncated-history note on the full analysis.

use std::path::Path;

use chrono::{DateTime, Duration, Utc};
use git2::{Repository, Sort};
use serde::{Deserialize, Serialize};

/// Summary facts about a repository's presence and age.
///
/// # Examples
///
/// ```
/// use reckon_gitsignal::detect::RepoHint;
///
/// let hint = RepoHint {
///     has_git: true,
///     repo_age_days: Some(730),
///     last_commit: None,
///     is_active: false,
/// };
/// assert!(hint.has_git);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepoHint {
    /// Whether a git repository was found at the root.
    pub has_git: bool,
    /// Days since the first commit, when determinable.
    pub repo_age_days: Option<i64>,
    /// Timestamp of the most recent commit on HEAD.
    pub last_commit: Option<DateTime<Utc>>,
    /// Whether the last commit is within the past 7 days.
    pub is_active: bool,
}

/// Check for a git repository at `root` and summarize its age.
///
/// Returns `None` when the path is not a repository, an expected state
/// rather than an error. Unreadable history degrades to a hint with the
/// age fields unset.
///
/// # Examples
///
/// ```no_run
/// use std::path::Path;
/// use reckon_gitsignal::detect::detect_repo;
///
/// if let Some(hint) = detect_repo(Path::new(".")) {
///     println!("active: {}", hint.is_active);
/// }
/// ```
pub fn detect_repo(root: &Path) -> Option<RepoHint> {
    let repo = Repository::open(root).ok()?;

    let mut hint = RepoHint {
        has_git: true,
        repo_age_days: None,
        last_commit: None,
        is_active: false,
    };

    if let Ok(head) = repo.head() {
        if let Ok(commit) = head.peel_to_commit() {
            if let Some(when) = DateTime::from_timestamp(commit.time().seconds(), 0) {
                hint.last_commit = Some(when);
                hint.is_active = Utc::now() - when < Duration::days(7);
            }
        }
    }

    if let Some(first) = first_commit_time(&repo) {
        hint.repo_age_days = Some((Utc::now() - first).num_days());
    }

    Some(hint)
}

fn first_commit_time(repo: &Repository) -> Option<DateTime<Utc>> {
    let mut walk = repo.revwalk().ok()?;
    walk.set_sorting(Sort::TIME | Sort::REVERSE).ok()?;
    walk.push_head().ok()?;
    let oid = walk.next()?.ok()?;
    let commit = repo.find_commit(oid).ok()?;
    DateTime::from_timestamp(commit.time().seconds(), 0)
}

/// Whether the repository is a shallow clone, meaning the visible history
/// may be truncated.
pub fn is_shallow_clone(root: &Path) -> bool {
    Repository::open(root)
        .map(|repo| repo.is_shallow())
        .unwrap_or(false)
}
