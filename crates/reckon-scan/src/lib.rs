//! Repository scanning: the path→LOC and path→role inventory.
//!
//! This crate is the collaborator the git-signal engine consumes tables
//! from; the engine itself never walks the filesystem or classifies a
//! path. Classification here is a deliberately shallow path heuristic:
//! enough to feed role-keyed analysis, not a semantic inference engine.

pub mod roles;
pub mod walker;

pub use roles::infer_role;
pub use walker::{scan_repository, ScanOptions};
