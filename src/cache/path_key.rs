//! Canonical keys for logical component paths
//!
//! A path like `components/Button.tsx` is a sequence of segments. The key
//! is the compact JSON array of those segments, so segment order matters
//! and `["a","b"]` never collides with `["a/b"]`.

use crate::error::{PartsbinError, PartsbinResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Order-preserving cache key for a logical file path
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PathKey(String);

impl PathKey {
    /// Build a key from path segments
    pub fn new<S: AsRef<str>>(segments: &[S]) -> Self {
        let segments: Vec<&str> = segments.iter().map(AsRef::as_ref).collect();
        // Serializing a list of strings cannot fail
        Self(serde_json::to_string(&segments).unwrap_or_default())
    }

    /// Split a slash-separated path into a key (`a/b.tsx` -> `["a","b.tsx"]`)
    pub fn parse(path: &str) -> PartsbinResult<Self> {
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        if segments.is_empty() {
            return Err(PartsbinError::InvalidPath(path.to_string()));
        }
        if segments.iter().any(|s| *s == "." || *s == "..") {
            return Err(PartsbinError::InvalidPath(path.to_string()));
        }
        Ok(Self::new(&segments))
    }

    /// Encoded form as stored in the index
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Decode back into segments
    pub fn segments(&self) -> PartsbinResult<Vec<String>> {
        Ok(serde_json::from_str(&self.0)?)
    }

    /// Slash-joined form for display, falling back to the raw key
    pub fn display_path(&self) -> String {
        self.segments()
            .map(|s| s.join("/"))
            .unwrap_or_else(|_| self.0.clone())
    }
}

impl fmt::Display for PathKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&[&str]> for PathKey {
    fn from(segments: &[&str]) -> Self {
        Self::new(segments)
    }
}

impl<const N: usize> From<[&str; N]> for PathKey {
    fn from(segments: [&str; N]) -> Self {
        Self::new(&segments)
    }
}

impl From<&[String]> for PathKey {
    fn from(segments: &[String]) -> Self {
        Self::new(segments)
    }
}

impl From<&PathKey> for PathKey {
    fn from(key: &PathKey) -> Self {
        key.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_as_json_array() {
        let key = PathKey::from(["components", "Button.tsx"]);
        assert_eq!(key.as_str(), r#"["components","Button.tsx"]"#);
    }

    #[test]
    fn order_is_significant() {
        assert_ne!(PathKey::from(["a", "b"]), PathKey::from(["b", "a"]));
        assert_ne!(PathKey::from(["a", "b"]), PathKey::from(["a/b"]));
    }

    #[test]
    fn parse_splits_on_slash() {
        let key = PathKey::parse("/ui/forms/Input.tsx").unwrap();
        assert_eq!(key, PathKey::from(["ui", "forms", "Input.tsx"]));
        assert_eq!(key.display_path(), "ui/forms/Input.tsx");
    }

    #[test]
    fn parse_rejects_empty_and_traversal() {
        assert!(PathKey::parse("").is_err());
        assert!(PathKey::parse("///").is_err());
        assert!(PathKey::parse("../etc/passwd").is_err());
    }

    #[test]
    fn segments_decode_from_index_json() {
        let key: PathKey = serde_json::from_str(r#""[\"x\",\"y.tsx\"]""#).unwrap();
        assert_eq!(key.segments().unwrap(), vec!["x", "y.tsx"]);
    }
}
