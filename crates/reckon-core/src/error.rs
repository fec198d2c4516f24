/// Errors that can occur across the reckon workspace.
///
/// Each variant wraps a specific error domain. Library crates use this type
/// directly; the binary crate converts to `miette` diagnostics at the boundary.
///
/// # Examples
///
/// ```
/// use reckon_core::ReckonError;
///
/// let err = ReckonError::Git("repository has no commits".into());
/// assert!(err.to_string().contains("no commits"));
/// ```
#[derive(Debug, thiserror::Error)]
pub enum ReckonError {
    /// Filesystem I/O failure.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid or missing configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// Git subprocess or repository failure.
    #[error("git error: {0}")]
    Git(String),

    /// Log or data parsing failure.
    #[error("parse error: {0}")]
    Parse(String),

    /// JSON serialization / deserialization failure.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML deserialization failure.
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}
