//! Error taxonomy for stylesheet processing and configuration loading.

use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced to the caller.
///
/// Unreadable assets are not represented here: they are logged and the affected `url()`
/// reference is left untouched.
#[derive(Debug, Error)]
pub enum UserefError {
  /// The document arrived as a stream rather than a complete buffer.
  #[error("css-useref: streaming not supported ({})", path.display())]
  StreamingNotSupported {
    /// Source path of the rejected document.
    path: PathBuf,
  },
  /// The configured eligibility pattern is not a valid glob.
  #[error("invalid eligibility pattern `{pattern}`: {source}")]
  InvalidPattern {
    /// Pattern as written in the configuration.
    pattern: String,
    /// Underlying glob parse error.
    source: glob::PatternError,
  },
  /// The configuration file could not be read.
  #[error("failed to read {}: {source}", path.display())]
  ConfigRead {
    /// Path that caused the error.
    path: PathBuf,
    /// Source I/O error.
    source: std::io::Error,
  },
  /// The configuration file is not valid JSON for [`crate::UserefConfig`].
  #[error("failed to parse {}: {source}", path.display())]
  ConfigParse {
    /// Path that caused the error.
    path: PathBuf,
    /// Source parse error.
    source: serde_json::Error,
  },
}
