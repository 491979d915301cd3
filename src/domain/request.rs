//! GDPR request selections, the send log, and the signed-in user profile.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::CompanyDomain;

/// The data-subject right a request invokes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestType {
    /// Article 15 — access to the data held.
    Access,
    /// Article 17 — erasure ("right to be forgotten").
    Erase,
    /// Article 16 — rectification of inaccurate data.
    Modify,
}

impl RequestType {
    /// Human-readable name used in rendered subjects.
    pub fn display_name(&self) -> &'static str {
        match self {
            RequestType::Access => "Data Access Request",
            RequestType::Erase => "Data Erasure Request",
            RequestType::Modify => "Data Rectification Request",
        }
    }
}

/// A (company, request-type) pair the user has queued for sending.
///
/// Transient: lives only in the session context until sent or deselected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestSelection {
    /// Target company domain.
    pub company_domain: CompanyDomain,
    /// Which right to invoke.
    pub request_type: RequestType,
}

/// Outcome of a single send attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SendStatus {
    /// The provider accepted the message.
    Sent {
        /// Provider-assigned message ID.
        message_id: String,
    },
    /// The send failed; the batch continued.
    Failed {
        /// Why it failed, for inline display.
        reason: String,
    },
}

impl SendStatus {
    /// Whether this entry records a successful send.
    pub fn is_sent(&self) -> bool {
        matches!(self, SendStatus::Sent { .. })
    }
}

/// One line of the session's append-only send log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendLogEntry {
    /// Target company domain.
    pub company_domain: CompanyDomain,
    /// Which right was invoked.
    pub request_type: RequestType,
    /// When the attempt was made.
    pub sent_at: DateTime<Utc>,
    /// Success or failure, with detail.
    pub status: SendStatus,
}

/// The authenticated user's Google profile.
///
/// Sourced from the OAuth userinfo endpoint and carried in the signed
/// session cookie; the name and email also fill the request templates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Stable OAuth subject identifier.
    pub subject: String,
    /// Primary email address.
    pub email: String,
    /// Full display name.
    pub name: String,
    /// Avatar URL, if Google provided one.
    pub picture_url: Option<String>,
}
