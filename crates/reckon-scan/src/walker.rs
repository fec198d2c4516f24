//! Repository walking and line counting.

use std::path::Path;

use reckon_core::{FileRecord, ReckonError};

use crate::roles::infer_role;

/// Number of bytes to check for binary detection.
const BINARY_CHECK_SIZE: usize = 8192;

/// Options for repository scanning.
///
/// # Examples
///
/// ```
/// use reckon_scan::walker::ScanOptions;
///
/// let opts = ScanOptions::default();
/// assert_eq!(opts.max_file_size, 1_048_576);
/// ```
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Skip files larger than this many bytes (default: 1 MB).
    pub max_file_size: u64,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            max_file_size: 1_048_576,
        }
    }
}

/// Walk a repository, respecting `.gitignore`, and inventory its files.
///
/// Skips binary files and files larger than the configured limit. Each
/// record carries the path relative to `root` (with `/` separators, to
/// match git log output), the non-blank line count, and the inferred
/// role. Unreadable entries are skipped rather than failing the scan.
///
/// # Errors
///
/// Currently infallible in practice (per-entry failures are skipped),
/// but returns `Result` so callers handle future walk-level errors
/// uniformly with the rest of the workspace.
///
/// # Examples
///
/// ```no_run
/// use std::path::Path;
/// use reckon_scan::walker::{scan_repository, ScanOptions};
///
/// let records = scan_repository(Path::new("."), &ScanOptions::default()).unwrap();
/// for record in &records {
///     println!("{} ({}, {} LOC)", record.path, record.role, record.loc);
/// }
/// ```
pub fn scan_repository(
    root: &Path,
    options: &ScanOptions,
) -> Result<Vec<FileRecord>, ReckonError> {
    let walker = ignore::WalkBuilder::new(root).build();
    let mut records = Vec::new();

    for entry in walker {
        let Ok(entry) = entry else { continue };

        let Some(file_type) = entry.file_type() else {
            continue;
        };
        if !file_type.is_file() {
            continue;
        }

        let path = entry.path();

        let Ok(metadata) = std::fs::metadata(path) else {
            continue;
        };
        if metadata.len() > options.max_file_size {
            continue;
        }

        let Ok(content) = std::fs::read_to_string(path) else {
            continue;
        };

        // binary content check: null bytes in the first 8KB
        let check_len = content.len().min(BINARY_CHECK_SIZE);
        if content.as_bytes()[..check_len].contains(&0) {
            continue;
        }

        let relative = path.strip_prefix(root).unwrap_or(path);
        let relative = relative.to_string_lossy().replace('\\', "/");

        let loc = content.lines().filter(|l| !l.trim().is_empty()).count() as u64;

        records.push(FileRecord {
            role: infer_role(&relative),
            path: relative,
            loc,
        });
    }

    Ok(records)
}
