use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Semantic role of a file in the codebase.
///
/// Roles form a closed set so that role-keyed logic (ownership, sparklines,
/// adjustment rules) stays exhaustive and statically checkable. The git-signal
/// engine never infers roles itself; it consumes a path→role mapping produced
/// by the scanner.
///
/// # Examples
///
/// ```
/// use reckon_core::Role;
///
/// let role: Role = "core".parse().unwrap();
/// assert_eq!(role, Role::Core);
/// assert_eq!(role.to_string(), "core");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Production source code.
    Core,
    /// Test code of any kind.
    Test,
    /// Build, CI, and infrastructure definitions.
    Infra,
    /// Documentation and prose.
    Docs,
    /// Data and configuration files.
    Config,
    /// Machine-generated files (lockfiles, codegen output).
    Generated,
    /// Vendored third-party code.
    Vendor,
    /// Operational scripts and tooling glue.
    Scripts,
}

impl Role {
    /// All roles, in display order.
    pub fn all() -> [Role; 8] {
        [
            Role::Core,
            Role::Test,
            Role::Infra,
            Role::Docs,
            Role::Config,
            Role::Generated,
            Role::Vendor,
            Role::Scripts,
        ]
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Role::Core => "core",
            Role::Test => "test",
            Role::Infra => "infra",
            Role::Docs => "docs",
            Role::Config => "config",
            Role::Generated => "generated",
            Role::Vendor => "vendor",
            Role::Scripts => "scripts",
        };
        write!(f, "{name}")
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "core" => Ok(Role::Core),
            "test" => Ok(Role::Test),
            "infra" => Ok(Role::Infra),
            "docs" => Ok(Role::Docs),
            "config" => Ok(Role::Config),
            "generated" => Ok(Role::Generated),
            "vendor" => Ok(Role::Vendor),
            "scripts" => Ok(Role::Scripts),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

/// A scanned file with its current line count and semantic role.
///
/// Produced by the scanner crate; the git-signal engine joins these onto
/// change events by path and weighs stability and ownership by `loc`.
///
/// # Examples
///
/// ```
/// use reckon_core::{FileRecord, Role};
///
/// let record = FileRecord {
///     path: "src/main.rs".into(),
///     loc: 120,
///     role: Role::Core,
/// };
/// assert_eq!(record.role, Role::Core);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileRecord {
    /// Path relative to the repository root, using `/` separators.
    pub path: String,
    /// Current lines of code (non-blank lines).
    pub loc: u64,
    /// Semantic role assigned by the scanner.
    pub role: Role,
}

/// Output format for command results.
///
/// # Examples
///
/// ```
/// use reckon_core::OutputFormat;
///
/// let fmt: OutputFormat = "json".parse().unwrap();
/// assert_eq!(fmt, OutputFormat::Json);
///
/// let fmt: OutputFormat = "md".parse().unwrap();
/// assert_eq!(fmt, OutputFormat::Markdown);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable tables and summaries.
    #[default]
    Text,
    /// Machine-readable JSON with camelCase keys.
    Json,
    /// Markdown-formatted output.
    Markdown,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Markdown => write!(f, "markdown"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            other => Err(format!("unknown output format: {other}")),
        }
    }
}
