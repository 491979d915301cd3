//! GDPR contact information discovered for a company.

use serde::{Deserialize, Serialize};

use super::CompanyDomain;

/// The privacy contact discovered for a company domain.
///
/// Cached at most once per domain for the lifetime of the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactInfo {
    /// The company domain this contact belongs to.
    pub domain: CompanyDomain,
    /// Address to send GDPR requests to, e.g. `privacy@spotify.com`.
    pub gdpr_email: String,
    /// The privacy-policy page the address was extracted from.
    pub privacy_policy_url: String,
}

/// Checks whether a string is a syntactically plausible email address.
///
/// This is a deliverability-free sanity check on extracted model output:
/// exactly one `@`, a non-empty local part, a dotted domain, and no
/// whitespace. Anything failing it is treated as "not found" rather than
/// an error.
pub fn is_plausible_email(value: &str) -> bool {
    let value = value.trim();
    if value.is_empty() || value.chars().any(char::is_whitespace) {
        return false;
    }
    let mut parts = value.split('@');
    let (local, domain) = match (parts.next(), parts.next(), parts.next()) {
        (Some(local), Some(domain), None) => (local, domain),
        _ => return false,
    };
    if local.is_empty() || domain.is_empty() {
        return false;
    }
    domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_addresses() {
        assert!(is_plausible_email("privacy@spotify.com"));
        assert!(is_plausible_email("dpo@data-protection.example.co.uk"));
        assert!(is_plausible_email("  gdpr@example.org  "));
    }

    #[test]
    fn rejects_malformed_addresses() {
        assert!(!is_plausible_email(""));
        assert!(!is_plausible_email("not-an-address"));
        assert!(!is_plausible_email("two@at@signs.com"));
        assert!(!is_plausible_email("@example.com"));
        assert!(!is_plausible_email("user@"));
        assert!(!is_plausible_email("user@nodot"));
        assert!(!is_plausible_email("user@.com"));
        assert!(!is_plausible_email("user name@example.com"));
    }

    #[test]
    fn rejects_model_prose() {
        // Models sometimes answer in sentences instead of a bare address.
        assert!(!is_plausible_email(
            "The contact address is privacy@spotify.com"
        ));
        assert!(!is_plausible_email("No contact email was found."));
    }
}
