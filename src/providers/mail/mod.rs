//! Mail provider abstraction and the Gmail implementation.

mod gmail;
mod traits;

pub use gmail::GmailClient;
pub use traits::{MailError, MailProvider, OutgoingMessage, Result, ScanQuery};

#[cfg(test)]
pub use traits::MockMailProvider;
