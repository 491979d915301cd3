//! External service providers.
//!
//! Each submodule wraps one third-party API behind a small trait or client:
//! Gmail for reading and sending mail, Gemini for text completion, Firecrawl
//! for locating privacy-policy pages, and Logo.dev for company logos.

pub mod ai;
pub mod crawl;
pub mod logo;
pub mod mail;
