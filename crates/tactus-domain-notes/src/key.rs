use serde::{Deserialize, Serialize};
use std::fmt;

/// Normalized physical key identifier: uppercase single characters (`Q`, `;`)
/// or uppercase key names (`ENTER`, `SPACE`).
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeyToken(String);

impl KeyToken {
    pub fn new(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(Self(trimmed.to_uppercase()))
    }

    /// Builds a token from a key event's `key` text and optional `code`
    /// (`KeyQ`, `Space`). Single printable characters win, then letter codes,
    /// then the key name, then the raw code.
    pub fn from_event(key: &str, code: Option<&str>) -> Option<Self> {
        let mut chars = key.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            if !c.is_whitespace() {
                return Some(Self(c.to_uppercase().collect()));
            }
        }

        if let Some(letter) = code.and_then(|code| code.strip_prefix("Key")) {
            if let Some(token) = Self::new(letter) {
                return Some(token);
            }
        }

        Self::new(key).or_else(|| code.and_then(Self::new))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<char> for KeyToken {
    fn from(c: char) -> Self {
        Self(c.to_uppercase().collect())
    }
}

impl fmt::Display for KeyToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
