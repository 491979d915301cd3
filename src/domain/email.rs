//! Raw email records produced by the inbox scanner.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::EmailId;

/// An email address with an optional display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    /// The address itself, e.g. `no-reply@spotify.com`.
    pub email: String,
    /// Display name, if the header carried one.
    pub name: Option<String>,
}

impl Address {
    /// Creates an address without a display name.
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            name: None,
        }
    }

    /// Creates an address with a display name.
    pub fn with_name(email: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            name: Some(name.into()),
        }
    }

    /// Parses a header value like `"Spotify" <no-reply@spotify.com>`.
    pub fn parse(value: &str) -> Self {
        let value = value.trim();
        if let Some(start) = value.find('<') {
            if let Some(end) = value.find('>') {
                let email = value[start + 1..end].trim().to_string();
                let name = value[..start].trim().trim_matches('"').to_string();
                return Self {
                    email,
                    name: if name.is_empty() { None } else { Some(name) },
                };
            }
        }
        Self {
            email: value.to_string(),
            name: None,
        }
    }

    /// The domain portion of the address, if present.
    pub fn domain(&self) -> Option<&str> {
        self.email.split_once('@').map(|(_, d)| d)
    }
}

/// A raw inbox email, as handed to the classifier.
///
/// Read-only and short-lived: records are sourced from the mail provider,
/// classified, and discarded. Only the derived [`CompanyCandidate`] survives.
///
/// [`CompanyCandidate`]: super::CompanyCandidate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailRecord {
    /// Provider-assigned message ID.
    pub id: EmailId,
    /// Sender address.
    pub sender: Address,
    /// Subject line, if any.
    pub subject: Option<String>,
    /// Plain-text body (decoded).
    pub body: String,
    /// When the message was received.
    pub received_at: DateTime<Utc>,
}
