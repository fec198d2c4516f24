//! Git history extraction via a single `git log` subprocess.
//!
//! The log is requested in a custom line protocol: each commit emits a
//! header of pipe-delimited fields (hash, author email, author name,
//! ISO-8601 timestamp) terminated by a NUL byte, then the raw commit body
//! terminated by a SOH byte, then one tab-delimited numstat line per file.
//! The body may span multiple physical lines and is accumulated until the
//! terminator is seen.

use std::collections::HashMap;
use std::path::Path;
use std::process::Command;

use chrono::{DateTime, Months, Utc};
use sha2::{Digest, Sha256};

use reckon_core::{FileRecord, ReckonError, Role};

/// Explicit AI-assistance markers searched for in commit bodies.
///
/// Only markers that tools verifiably add to commits; assistance is never
/// inferred from timing or style.
const AI_MARKERS: [&str; 4] = [
    // claude code: "Co-Authored-By: Claude <noreply@anthropic.com>"
    "co-authored-by: claude",
    // aider: "Co-authored-by: aider (model) <noreply@aider.chat>"
    "co-authored-by: aider",
    // generic markers teams may add manually
    "ai-assisted:",
    "ai-assisted-by:",
];

/// One file touched by one commit.
///
/// Created during parsing and never mutated afterwards, except for the
/// single role-assignment pass in [`map_roles`]. Binary-file diffs never
/// produce an event.
///
/// # Examples
///
/// ```
/// use chrono::Utc;
/// use reckon_gitsignal::history::ChangeEvent;
///
/// let event = ChangeEvent {
///     when: Utc::now(),
///     path: "src/main.rs".into(),
///     added: 12,
///     deleted: 3,
///     author: "9f86d081884c7d65".into(),
///     author_email: None,
///     author_name: None,
///     role: None,
///     ai_assisted: false,
/// };
/// assert_eq!(event.added + event.deleted, 15);
/// ```
#[derive(Debug, Clone)]
pub struct ChangeEvent {
    /// Commit timestamp.
    pub when: DateTime<Utc>,
    /// File path as reported by the log.
    pub path: String,
    /// Lines added.
    pub added: u64,
    /// Lines deleted.
    pub deleted: u64,
    /// Privacy-preserving author token (truncated SHA-256 of the email).
    pub author: String,
    /// Raw lowercased email, only under raw-identity preservation.
    pub author_email: Option<String>,
    /// Trimmed display name, only under raw-identity preservation.
    pub author_name: Option<String>,
    /// Semantic role, populated by [`map_roles`].
    pub role: Option<Role>,
    /// Whether the commit body carried an explicit AI-assistance marker.
    pub ai_assisted: bool,
}

/// Options controlling history parsing.
///
/// # Examples
///
/// ```
/// use reckon_gitsignal::history::ParseOptions;
///
/// let opts = ParseOptions::default();
/// assert_eq!(opts.since_months, 6);
/// assert!(!opts.preserve_authors);
/// ```
#[derive(Debug, Clone)]
pub struct ParseOptions {
    /// How many months back to look.
    pub since_months: u32,
    /// Keep raw emails and names for engineer analysis.
    pub preserve_authors: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            since_months: 6,
            preserve_authors: false,
        }
    }
}

/// Run `git log` once and parse its output into change events.
///
/// The argument list is fixed: a numstat query over the requested window
/// with the header/body protocol described in the module docs. The
/// subprocess blocks the caller and is not retried.
///
/// # Errors
///
/// Returns [`ReckonError::Git`] if the subprocess cannot run or exits
/// non-zero (tool missing, not a repository). Callers are expected to
/// degrade gracefully: this error should only suppress the git-derived
/// section of a report, never the report itself.
///
/// # Examples
///
/// ```no_run
/// use std::path::Path;
/// use reckon_gitsignal::history::{parse_history, ParseOptions};
///
/// let events = parse_history(Path::new("."), &ParseOptions::default()).unwrap();
/// println!("{} change events", events.len());
/// ```
pub fn parse_history(root: &Path, options: &ParseOptions) -> Result<Vec<ChangeEvent>, ReckonError> {
    let now = Utc::now();
    let since = now
        .checked_sub_months(Months::new(options.since_months))
        .unwrap_or(now)
        .format("%Y-%m-%d")
        .to_string();

    // single efficient git command
    // %aE/%aN use mailmap-resolved values (fall back to raw when no .mailmap)
    // %x00 separates header from body, %x01 marks end of body
    let output = Command::new("git")
        .arg("-C")
        .arg(root)
        .args(["log", "--numstat", "--format=%H|%aE|%aN|%aI%x00%b%x01"])
        .arg(format!("--since={since}"))
        .output()
        .map_err(|e| ReckonError::Git(format!("failed to run git: {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(ReckonError::Git(format!(
            "git log failed: {}",
            stderr.trim()
        )));
    }

    let text = String::from_utf8_lossy(&output.stdout);
    Ok(parse_log(&text, options.preserve_authors))
}

struct CommitMeta {
    author: String,
    email: Option<String>,
    name: Option<String>,
    when: DateTime<Utc>,
    ai_assisted: bool,
}

/// Parse raw `git log` output in the header/body/numstat protocol.
///
/// Malformed lines are skipped silently, one line at a time: headers with
/// the wrong field count, numstat lines with non-numeric fields, and the
/// `-\t-\t<path>` binary sentinel all drop without escalating.
///
/// # Examples
///
/// ```
/// use reckon_gitsignal::history::parse_log;
///
/// let log = "abc123|alice@example.com|Alice|2026-03-01T10:00:00+00:00\u{0}fix parser\u{1}\n\
///            10\t2\tsrc/parser.rs\n\
///            -\t-\tassets/logo.png\n";
/// let events = parse_log(log, false);
/// assert_eq!(events.len(), 1);
/// assert_eq!(events[0].path, "src/parser.rs");
/// ```
pub fn parse_log(output: &str, preserve_authors: bool) -> Vec<ChangeEvent> {
    let mut events = Vec::new();
    let mut current: Option<CommitMeta> = None;
    let mut lines = output.lines();

    while let Some(line) = lines.next() {
        if line.is_empty() {
            continue;
        }

        // Commit header: hash|email|name|timestamp NUL body... SOH.
        // The NUL is the distinguishing byte; body text never contains one.
        if let Some((header, body_start)) = line.split_once('\u{0}') {
            let fields: Vec<&str> = header.split('|').collect();
            if fields.len() != 4 {
                continue;
            }

            let email = fields[1];

            // collect the full commit body (may span multiple lines)
            let mut body = String::from(body_start);
            while !body.contains('\u{1}') {
                let Some(next) = lines.next() else { break };
                body.push('\n');
                body.push_str(next);
            }

            let when = match DateTime::parse_from_rfc3339(fields[3]) {
                Ok(t) => t.with_timezone(&Utc),
                Err(_) => current
                    .as_ref()
                    .map(|c| c.when)
                    .unwrap_or(DateTime::UNIX_EPOCH),
            };

            current = Some(CommitMeta {
                author: hash_author(email),
                email: preserve_authors.then(|| email.trim().to_lowercase()),
                name: preserve_authors.then(|| fields[2].trim().to_string()),
                when,
                ai_assisted: detect_ai_marker(&body),
            });
            continue;
        }

        // Numstat line: added TAB deleted TAB path
        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() != 3 {
            continue;
        }
        // binary files report "-" instead of counts
        if fields[0] == "-" || fields[1] == "-" {
            continue;
        }
        let (Ok(added), Ok(deleted)) = (fields[0].parse::<u64>(), fields[1].parse::<u64>()) else {
            continue;
        };
        let Some(meta) = current.as_ref() else {
            continue;
        };

        events.push(ChangeEvent {
            when: meta.when,
            path: fields[2].to_string(),
            added,
            deleted,
            author: meta.author.clone(),
            author_email: meta.email.clone(),
            author_name: meta.name.clone(),
            role: None,
            ai_assisted: meta.ai_assisted,
        });
    }

    events
}

/// Check a commit body for explicit AI-assistance markers.
///
/// Case-insensitive substring search over the fixed marker set; never
/// infers assistance from anything else.
fn detect_ai_marker(body: &str) -> bool {
    let lower = body.to_lowercase();
    AI_MARKERS.iter().any(|marker| lower.contains(marker))
}

/// One-way anonymized author token: SHA-256 of the lowercased, trimmed
/// email, truncated to 16 hex chars.
fn hash_author(email: &str) -> String {
    let digest = Sha256::digest(email.trim().to_lowercase().as_bytes());
    digest[..8].iter().map(|b| format!("{b:02x}")).collect()
}

/// Assign roles to events from the scanner's path→role table.
///
/// This is the single role-assignment pass; events whose path is absent
/// from the table keep an unset role.
///
/// # Examples
///
/// ```
/// use reckon_core::{FileRecord, Role};
/// use reckon_gitsignal::history::{map_roles, parse_log};
///
/// let log = "abc|a@e.com|A|2026-03-01T10:00:00+00:00\u{0}msg\u{1}\n5\t0\tsrc/lib.rs\n";
/// let mut events = parse_log(log, false);
/// let records = vec![FileRecord { path: "src/lib.rs".into(), loc: 100, role: Role::Core }];
/// map_roles(&mut events, &records);
/// assert_eq!(events[0].role, Some(Role::Core));
/// ```
pub fn map_roles(events: &mut [ChangeEvent], records: &[FileRecord]) {
    let roles: HashMap<&str, Role> = records
        .iter()
        .map(|r| (r.path.as_str(), r.role))
        .collect();

    for event in events.iter_mut() {
        if let Some(role) = roles.get(event.path.as_str()) {
            event.role = Some(*role);
        }
    }
}

/// Build a path→current-LOC map from scanned records.
pub fn file_loc_map(records: &[FileRecord]) -> HashMap<String, u64> {
    records.iter().map(|r| (r.path.clone(), r.loc)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(email: &str, name: &str, timestamp: &str, body: &str) -> String {
        format!("deadbeef|{email}|{name}|{timestamp}\u{0}{body}\u{1}\n")
    }

    #[test]
    fn parses_header_and_numstat_lines() {
        let log = format!(
            "{}10\t2\tsrc/parser.rs\n3\t1\tsrc/lib.rs\n",
            header("alice@example.com", "Alice", "2026-03-01T10:00:00+00:00", "fix parser")
        );
        let events = parse_log(&log, false);
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].path, "src/parser.rs");
        assert_eq!(events[0].added, 10);
        assert_eq!(events[0].deleted, 2);
        assert_eq!(events[1].path, "src/lib.rs");
        // both events share the commit's author token and timestamp
        assert_eq!(events[0].author, events[1].author);
        assert_eq!(events[0].when, events[1].when);
    }

    #[test]
    fn binary_sentinel_produces_no_event() {
        let log = format!(
            "{}-\t-\tassets/logo.png\n4\t0\tsrc/main.rs\n",
            header("a@e.com", "A", "2026-03-01T10:00:00+00:00", "add logo")
        );
        let events = parse_log(&log, false);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].path, "src/main.rs");
    }

    #[test]
    fn malformed_numeric_fields_are_skipped() {
        let log = format!(
            "{}ten\t2\ta.rs\n5\tx\tb.rs\n5\t1\tc.rs\n",
            header("a@e.com", "A", "2026-03-01T10:00:00+00:00", "msg")
        );
        let events = parse_log(&log, false);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].path, "c.rs");
    }

    #[test]
    fn malformed_header_is_skipped() {
        // three fields instead of four; its stat line attaches to nothing
        let log = "bad|header|line\u{0}msg\u{1}\n5\t1\ta.rs\n";
        let events = parse_log(log, false);
        assert!(events.is_empty());
    }

    #[test]
    fn body_spanning_multiple_lines_is_accumulated() {
        let log = "abc|a@e.com|A|2026-03-01T10:00:00+00:00\u{0}first line\n\
                   second line\n\
                   Co-Authored-By: Claude <noreply@anthropic.com>\u{1}\n\
                   7\t0\tsrc/gen.rs\n";
        let events = parse_log(log, false);
        assert_eq!(events.len(), 1);
        assert!(events[0].ai_assisted);
    }

    #[test]
    fn ai_markers_are_case_insensitive() {
        for marker in [
            "CO-AUTHORED-BY: CLAUDE <x>",
            "co-authored-by: aider (gpt) <y>",
            "AI-Assisted: yes",
            "ai-assisted-by: somebot",
        ] {
            let log = format!(
                "{}1\t0\ta.rs\n",
                header("a@e.com", "A", "2026-03-01T10:00:00+00:00", marker)
            );
            let events = parse_log(&log, false);
            assert!(events[0].ai_assisted, "marker not detected: {marker}");
        }
    }

    #[test]
    fn unmarked_commits_are_not_ai_flagged() {
        let log = format!(
            "{}1\t0\ta.rs\n",
            header("a@e.com", "A", "2026-03-01T10:00:00+00:00", "refactor with care")
        );
        let events = parse_log(&log, false);
        assert!(!events[0].ai_assisted);
    }

    #[test]
    fn authors_are_hashed_by_default() {
        let log = format!(
            "{}1\t0\ta.rs\n",
            header("Alice@Example.COM ", "Alice", "2026-03-01T10:00:00+00:00", "msg")
        );
        let events = parse_log(&log, false);
        assert_eq!(events[0].author.len(), 16);
        assert!(events[0].author_email.is_none());
        assert!(events[0].author_name.is_none());
        // hashing normalizes case and whitespace first
        assert_eq!(events[0].author, hash_author("alice@example.com"));
    }

    #[test]
    fn preserve_authors_keeps_raw_identity() {
        let log = format!(
            "{}1\t0\ta.rs\n",
            header("Alice@Example.COM", " Alice W ", "2026-03-01T10:00:00+00:00", "msg")
        );
        let events = parse_log(&log, true);
        assert_eq!(events[0].author_email.as_deref(), Some("alice@example.com"));
        assert_eq!(events[0].author_name.as_deref(), Some("Alice W"));
        // the hash token is still present alongside
        assert_eq!(events[0].author.len(), 16);
    }

    #[test]
    fn numstat_before_any_header_is_dropped() {
        let events = parse_log("5\t1\torphan.rs\n", false);
        assert!(events.is_empty());
    }

    #[test]
    fn map_roles_leaves_unknown_paths_unset() {
        let log = format!(
            "{}1\t0\tknown.rs\n2\t0\tunknown.rs\n",
            header("a@e.com", "A", "2026-03-01T10:00:00+00:00", "msg")
        );
        let mut events = parse_log(&log, false);
        let records = vec![FileRecord {
            path: "known.rs".into(),
            loc: 50,
            role: Role::Test,
        }];
        map_roles(&mut events, &records);
        assert_eq!(events[0].role, Some(Role::Test));
        assert_eq!(events[1].role, None);
    }

    #[test]
    fn file_loc_map_indexes_by_path() {
        let records = vec![
            FileRecord { path: "a.rs".into(), loc: 10, role: Role::Core },
            FileRecord { path: "b.rs".into(), loc: 20, role: Role::Test },
        ];
        let map = file_loc_map(&records);
        assert_eq!(map.get("a.rs"), Some(&10));
        assert_eq!(map.get("b.rs"), Some(&20));
    }

    #[test]
    fn parse_history_fails_outside_a_repository() {
        let dir = tempfile::tempdir().unwrap();
        let result = parse_history(dir.path(), &ParseOptions::default());
        assert!(matches!(result, Err(ReckonError::Git(_))));
    }
}
