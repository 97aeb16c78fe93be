//! Plugin keys
//!
//! A key names one plugin definition inside a registry. Keys are non-empty,
//! taken verbatim (surrounding whitespace is an error rather than trimmed) and
//! limited to `[A-Za-z0-9._:/-]` so they stay printable in manifests and CLI
//! output (e.g. `ajax`, `util.dom`, `i18n/text`).

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum KeyError {
    #[error("Plugin key must not be empty")]
    Empty,

    #[error("Plugin key '{0}' has leading or trailing whitespace")]
    SurroundingWhitespace(String),

    #[error("Invalid character {ch:?} in plugin key '{key}'")]
    InvalidChar { key: String, ch: char },
}

fn is_key_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | ':' | '/' | '-')
}

/// A validated plugin key
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PluginKey(String);

impl PluginKey {
    /// Creates a key, validating its characters
    pub fn new(key: impl AsRef<str>) -> Result<Self, KeyError> {
        let key = key.as_ref();
        if key.trim().is_empty() {
            return Err(KeyError::Empty);
        }

        // Lookups compare raw strings, so a key is never normalized
        if key.trim() != key {
            return Err(KeyError::SurroundingWhitespace(key.to_string()));
        }

        if let Some(ch) = key.chars().find(|c| !is_key_char(*c)) {
            return Err(KeyError::InvalidChar {
                key: key.to_string(),
                ch,
            });
        }

        Ok(Self(key.to_string()))
    }

    /// Returns the key as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PluginKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for PluginKey {
    type Err = KeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for PluginKey {
    type Error = KeyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for PluginKey {
    type Error = KeyError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<PluginKey> for String {
    fn from(key: PluginKey) -> Self {
        key.0
    }
}

impl AsRef<str> for PluginKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// Lets maps keyed by `PluginKey` be queried with a plain `&str`.
impl Borrow<str> for PluginKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Formats a chain of keys as `a -> b -> c`
pub fn format_chain(keys: &[PluginKey]) -> String {
    keys.iter()
        .map(PluginKey::as_str)
        .collect::<Vec<_>>()
        .join(" -> ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_common_key_shapes() {
        for key in ["ajax", "util.dom", "i18n/text", "jex:indicator", "file_upload-v2"] {
            assert_eq!(PluginKey::new(key).unwrap().as_str(), key);
        }
    }

    #[test]
    fn rejects_surrounding_whitespace() {
        assert_eq!(
            PluginKey::new("  ajax \n"),
            Err(KeyError::SurroundingWhitespace("  ajax \n".to_string()))
        );
        assert!(" util".parse::<PluginKey>().is_err());
    }

    #[test]
    fn rejects_empty_key() {
        assert_eq!(PluginKey::new(""), Err(KeyError::Empty));
        assert_eq!(PluginKey::new("   "), Err(KeyError::Empty));
    }

    #[test]
    fn rejects_invalid_characters() {
        let err = PluginKey::new("my plugin").unwrap_err();
        assert_eq!(
            err,
            KeyError::InvalidChar {
                key: "my plugin".to_string(),
                ch: ' '
            }
        );
        assert!("tab\tkey".parse::<PluginKey>().is_err());
        assert!("é".parse::<PluginKey>().is_err());
    }

    #[test]
    fn serde_uses_plain_string() {
        let key = PluginKey::new("ajax").unwrap();
        let json = serde_json::to_string(&key).unwrap();
        assert_eq!(json, "\"ajax\"");

        let parsed: PluginKey = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, key);

        assert!(serde_json::from_str::<PluginKey>("\"\"").is_err());
    }

    #[test]
    fn chain_formatting() {
        let chain: Vec<_> = ["a", "b", "a"].iter().map(|k| PluginKey::new(k).unwrap()).collect();
        assert_eq!(format_chain(&chain), "a -> b -> a");
    }
}
