//! Mail provider trait definition.
//!
//! [`MailProvider`] abstracts the mail backend behind the three operations
//! the application needs: list message IDs in a date range, fetch one
//! message, and send one message. The scanner and bulk sender only see this
//! trait, which keeps them testable with stub providers.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{Address, EmailId, EmailRecord};

/// Result type alias for mail provider operations.
pub type Result<T> = std::result::Result<T, MailError>;

/// Errors that can occur during mail provider operations.
#[derive(Debug, thiserror::Error)]
pub enum MailError {
    /// Access token missing, expired, or rejected.
    #[error("authentication failed: {0}")]
    Authentication(String),

    /// Network or connection error.
    #[error("connection error: {0}")]
    Connection(String),

    /// Rate limit exceeded.
    #[error("rate limit exceeded, retry after {retry_after_secs:?} seconds")]
    RateLimited {
        /// Seconds to wait before retrying, if the provider said.
        retry_after_secs: Option<u64>,
    },

    /// Requested message was not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// Internal or unexpected provider error.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Date-range query for an inbox scan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanQuery {
    /// Only messages received after this instant.
    pub after: DateTime<Utc>,
    /// Only messages received before this instant.
    pub before: DateTime<Utc>,
    /// Hard cap on the number of message IDs returned.
    pub max_results: usize,
}

impl ScanQuery {
    /// Creates a query covering the last `window_days` days.
    pub fn last_days(window_days: i64, max_results: usize) -> Self {
        let before = Utc::now();
        let after = before - chrono::Duration::days(window_days);
        Self {
            after,
            before,
            max_results,
        }
    }
}

/// A message to be sent from the authenticated account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutgoingMessage {
    /// Sender address (the authenticated user).
    pub from: Address,
    /// Recipient address.
    pub to: Address,
    /// Subject line.
    pub subject: String,
    /// Plain-text body.
    pub body_text: String,
}

/// Trait for mail backends.
///
/// Implementations are constructed per request with a fresh access token;
/// methods borrow `&self` and carry no mutable state.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MailProvider: Send + Sync {
    /// Lists message IDs matching the query, newest first, up to
    /// `query.max_results`.
    async fn list_message_ids(&self, query: &ScanQuery) -> Result<Vec<EmailId>>;

    /// Fetches a full message and decodes its body.
    ///
    /// # Errors
    ///
    /// Returns [`MailError::NotFound`] if the message no longer exists.
    async fn fetch_message(&self, id: &EmailId) -> Result<EmailRecord>;

    /// Sends a message from the authenticated account.
    ///
    /// # Returns
    ///
    /// The message ID assigned by the provider.
    async fn send_message(&self, message: &OutgoingMessage) -> Result<String>;
}
