//! Core identifier types for domain entities.
//!
//! Newtype wrappers provide type safety for identifiers, preventing
//! accidental mixing of an email ID with, say, a session ID.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a Gmail message.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EmailId(pub String);

impl fmt::Display for EmailId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for EmailId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for EmailId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// Unique identifier for a browser session.
///
/// Generated at sign-in, carried in the signed session cookie, and used as
/// the key into the in-memory session store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

impl SessionId {
    /// Generates a fresh random session ID.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for SessionId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for SessionId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// A normalized company domain.
///
/// The join key across every pipeline stage: candidates are deduplicated by
/// domain, contacts are cached by domain, and selections reference domains.
/// Normalization lowercases and strips any scheme, `www.` prefix, path, and
/// trailing dot so that `https://www.Spotify.com/` and `spotify.com` compare
/// equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CompanyDomain(String);

impl CompanyDomain {
    /// Normalizes a raw domain string.
    pub fn new(raw: &str) -> Self {
        let mut s = raw.trim().to_ascii_lowercase();
        if let Some(rest) = s.strip_prefix("https://") {
            s = rest.to_string();
        } else if let Some(rest) = s.strip_prefix("http://") {
            s = rest.to_string();
        }
        if let Some(rest) = s.strip_prefix("www.") {
            s = rest.to_string();
        }
        if let Some(idx) = s.find('/') {
            s.truncate(idx);
        }
        let s = s.trim_end_matches('.').to_string();
        Self(s)
    }

    /// Returns the normalized domain as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the normalized value looks like a registrable domain.
    pub fn is_valid(&self) -> bool {
        !self.0.is_empty()
            && self.0.contains('.')
            && !self.0.contains(' ')
            && !self.0.starts_with('.')
    }
}

impl fmt::Display for CompanyDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for CompanyDomain {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}
