//! Core domain types.
//!
//! Entities shared across the scan, discovery, and send pipelines.
//! Everything here is session-scoped and ephemeral; nothing is persisted.

mod candidate;
mod contact;
mod email;
mod request;
mod types;

pub use candidate::{CompanyCandidate, InteractionType};
pub use contact::{is_plausible_email, ContactInfo};
pub use email::{Address, EmailRecord};
pub use request::{RequestSelection, RequestType, SendLogEntry, SendStatus, UserProfile};
pub use types::{CompanyDomain, EmailId, SessionId};
