//! Error types for partsbin
//!
//! All modules use `PartsbinResult<T>` as their return type.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for partsbin operations
pub type PartsbinResult<T> = Result<T, PartsbinError>;

/// All errors that can occur in partsbin
#[derive(Error, Debug)]
pub enum PartsbinError {
    // Cache layout errors (the on-disk cache contradicts its own data model)
    #[error("Cache index path is a directory: {path}")]
    IndexIsDirectory { path: PathBuf },

    #[error("Cached blob path is a directory: {path}")]
    BlobIsDirectory { path: PathBuf },

    #[error("Expected a directory but found a file: {path}")]
    PathIsFile { path: PathBuf },

    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Failed to create config directory {path}: {source}")]
    ConfigDirCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // Remote errors
    #[error("Failed to fetch {url}: {reason}")]
    Fetch { url: String, reason: String },

    #[error("Invalid component path: {0}")]
    InvalidPath(String),

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    // General errors
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("{0}")]
    User(String),
}

impl PartsbinError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a fetch error
    pub fn fetch(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Fetch {
            url: url.into(),
            reason: reason.into(),
        }
    }

    /// Convert a directory walk error, keeping the underlying IO error when present
    pub fn walk(context: impl Into<String>, err: walkdir::Error) -> Self {
        let context = context.into();
        match err.into_io_error() {
            Some(source) => Self::Io { context, source },
            None => Self::Internal(format!("{}: filesystem loop detected", context)),
        }
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::IndexIsDirectory { .. } | Self::BlobIsDirectory { .. } | Self::PathIsFile { .. } => {
                Some("Remove the offending path or run: partsbin cache clear")
            }
            Self::ConfigInvalid { .. } => Some("Fix or delete the config file, or pass --config"),
            Self::Fetch { .. } => Some("Check the remote URL and your network connection"),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_includes_path() {
        let err = PartsbinError::BlobIsDirectory {
            path: PathBuf::from("/tmp/partsbin/remotes/ab/cd"),
        };
        assert!(err.to_string().contains("/tmp/partsbin/remotes/ab/cd"));
    }

    #[test]
    fn error_hint() {
        let err = PartsbinError::IndexIsDirectory {
            path: PathBuf::from("/tmp/cache.json"),
        };
        assert_eq!(
            err.hint(),
            Some("Remove the offending path or run: partsbin cache clear")
        );
        assert_eq!(PartsbinError::Internal("x".into()).hint(), None);
    }
}
