//! Companies inferred from inbox content.

use serde::{Deserialize, Serialize};

use super::{CompanyDomain, EmailId};

/// How the user appears to have interacted with a company.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InteractionType {
    /// Recurring paid service (streaming, SaaS, membership).
    Subscription,
    /// One-off purchase or order.
    Purchase,
    /// Account registration or login activity.
    Account,
    /// Newsletter or mailing list.
    Newsletter,
    /// Promotional or marketing contact.
    Marketing,
    /// Anything the classifier could not categorize.
    Other,
}

impl InteractionType {
    /// Maps a free-form classifier label onto a known variant.
    ///
    /// Unrecognized labels fall back to [`InteractionType::Other`] rather
    /// than failing the classification.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "subscription" => Self::Subscription,
            "purchase" | "order" | "receipt" => Self::Purchase,
            "account" | "signup" | "login" => Self::Account,
            "newsletter" => Self::Newsletter,
            "marketing" | "promotion" | "promotional" => Self::Marketing,
            _ => Self::Other,
        }
    }
}

/// A company believed to hold the user's personal data.
///
/// Produced by the classifier from a single email; deduplicated by domain
/// when added to the session. The domain is the join key for contact
/// discovery and request sending.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyCandidate {
    /// Company display name, e.g. "Spotify".
    pub name: String,
    /// Normalized company domain, e.g. `spotify.com`.
    pub domain: CompanyDomain,
    /// How the user interacted with the company.
    pub interaction_type: InteractionType,
    /// ID of the email this candidate was derived from.
    pub source_email_id: EmailId,
    /// Logo image URL for display, when the lookup succeeded.
    pub logo_url: Option<String>,
}

impl CompanyCandidate {
    /// Merges a duplicate detection of the same domain into this candidate.
    ///
    /// Fills fields the first detection was missing and keeps the earliest
    /// source email. The interaction type keeps the first value that is not
    /// [`InteractionType::Other`].
    pub fn merge(&mut self, other: CompanyCandidate) {
        debug_assert_eq!(self.domain, other.domain);

        if self.name.is_empty() && !other.name.is_empty() {
            self.name = other.name;
        }
        if self.logo_url.is_none() {
            self.logo_url = other.logo_url;
        }
        if self.interaction_type == InteractionType::Other {
            self.interaction_type = other.interaction_type;
        }
    }
}
