//! Bulk sending of GDPR requests.
//!
//! Walks the user's selections in order: look up the cached contact,
//! render the template, send through the mail provider, and record one
//! [`SendLogEntry`] per selection. An individual failure never aborts the
//! batch; partial completion is the expected outcome and every entry is
//! returned for inline display.

use std::collections::HashMap;

use chrono::Utc;

use crate::domain::{
    Address, CompanyCandidate, CompanyDomain, ContactInfo, RequestSelection, SendLogEntry,
    SendStatus, UserProfile,
};
use crate::providers::mail::{MailProvider, OutgoingMessage};
use crate::services::templates::{self, TemplateFields};

/// Sends every selection, returning one log entry per selection in order.
///
/// Selections whose domain has no cached contact or no matching candidate
/// fail individually with a descriptive reason, exactly like an upstream
/// send failure would.
pub async fn send_requests(
    mail: &dyn MailProvider,
    user: &UserProfile,
    selections: &[RequestSelection],
    candidates: &[CompanyCandidate],
    contacts: &HashMap<CompanyDomain, ContactInfo>,
) -> Vec<SendLogEntry> {
    let mut log = Vec::with_capacity(selections.len());

    for selection in selections {
        let status = send_one(mail, user, selection, candidates, contacts).await;

        if let SendStatus::Failed { reason } = &status {
            tracing::warn!(
                domain = %selection.company_domain,
                request_type = ?selection.request_type,
                reason,
                "send failed, continuing batch"
            );
        }

        log.push(SendLogEntry {
            company_domain: selection.company_domain.clone(),
            request_type: selection.request_type,
            sent_at: Utc::now(),
            status,
        });
    }

    log
}

async fn send_one(
    mail: &dyn MailProvider,
    user: &UserProfile,
    selection: &RequestSelection,
    candidates: &[CompanyCandidate],
    contacts: &HashMap<CompanyDomain, ContactInfo>,
) -> SendStatus {
    let Some(contact) = contacts.get(&selection.company_domain) else {
        return SendStatus::Failed {
            reason: "no GDPR contact discovered for this domain".to_string(),
        };
    };

    let company_name = candidates
        .iter()
        .find(|c| c.domain == selection.company_domain)
        .map(|c| c.name.clone())
        .unwrap_or_default();

    let fields = TemplateFields {
        company_name,
        company_domain: selection.company_domain.to_string(),
        user_name: user.name.clone(),
        user_email: user.email.clone(),
    };

    let rendered = match templates::render(selection.request_type, &fields) {
        Ok(rendered) => rendered,
        Err(e) => {
            return SendStatus::Failed {
                reason: e.to_string(),
            }
        }
    };

    let message = OutgoingMessage {
        from: Address::with_name(user.email.clone(), user.name.clone()),
        to: Address::new(contact.gdpr_email.clone()),
        subject: rendered.subject,
        body_text: rendered.body,
    };

    match mail.send_message(&message).await {
        Ok(message_id) => SendStatus::Sent { message_id },
        Err(e) => SendStatus::Failed {
            reason: e.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{EmailId, InteractionType, RequestType};
    use crate::providers::mail::{MailError, MockMailProvider};

    fn user() -> UserProfile {
        UserProfile {
            subject: "sub".to_string(),
            email: "jane@gmail.com".to_string(),
            name: "Jane Doe".to_string(),
            picture_url: None,
        }
    }

    fn candidate(domain: &str, name: &str) -> CompanyCandidate {
        CompanyCandidate {
            name: name.to_string(),
            domain: CompanyDomain::new(domain),
            interaction_type: InteractionType::Subscription,
            source_email_id: EmailId::from("e1"),
            logo_url: None,
        }
    }

    fn contact(domain: &str) -> (CompanyDomain, ContactInfo) {
        let d = CompanyDomain::new(domain);
        (
            d.clone(),
            ContactInfo {
                domain: d,
                gdpr_email: format!("privacy@{}", domain),
                privacy_policy_url: format!("https://{}/privacy", domain),
            },
        )
    }

    fn selection(domain: &str, request_type: RequestType) -> RequestSelection {
        RequestSelection {
            company_domain: CompanyDomain::new(domain),
            request_type,
        }
    }

    #[tokio::test]
    async fn partial_failure_logs_every_selection() {
        let mut mail = MockMailProvider::new();
        mail.expect_send_message().returning(|message| {
            // The Netflix send fails; the others succeed.
            if message.to.email.contains("netflix") {
                Err(MailError::Internal("upstream error".to_string()))
            } else {
                Ok(format!("sent-to-{}", message.to.email))
            }
        });

        let candidates = vec![
            candidate("spotify.com", "Spotify"),
            candidate("netflix.com", "Netflix"),
            candidate("github.com", "GitHub"),
        ];
        let contacts: HashMap<_, _> = vec![
            contact("spotify.com"),
            contact("netflix.com"),
            contact("github.com"),
        ]
        .into_iter()
        .collect();
        let selections = vec![
            selection("spotify.com", RequestType::Access),
            selection("netflix.com", RequestType::Erase),
            selection("github.com", RequestType::Modify),
        ];

        let log = send_requests(&mail, &user(), &selections, &candidates, &contacts).await;

        assert_eq!(log.len(), 3);
        assert!(log[0].status.is_sent());
        assert!(!log[1].status.is_sent());
        assert!(log[2].status.is_sent());
        // Order mirrors the selections.
        assert_eq!(log[1].company_domain, CompanyDomain::new("netflix.com"));
        assert_eq!(log[1].request_type, RequestType::Erase);
    }

    #[tokio::test]
    async fn missing_contact_fails_that_selection_without_sending() {
        // No send_message expectation: any call would panic the test.
        let mail = MockMailProvider::new();

        let candidates = vec![candidate("spotify.com", "Spotify")];
        let contacts = HashMap::new();
        let selections = vec![selection("spotify.com", RequestType::Access)];

        let log = send_requests(&mail, &user(), &selections, &candidates, &contacts).await;

        assert_eq!(log.len(), 1);
        match &log[0].status {
            SendStatus::Failed { reason } => assert!(reason.contains("no GDPR contact")),
            other => panic!("expected Failed, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn missing_candidate_name_fails_template_validation() {
        let mail = MockMailProvider::new();

        // Contact exists but no candidate carries the company name.
        let contacts: HashMap<_, _> = vec![contact("spotify.com")].into_iter().collect();
        let selections = vec![selection("spotify.com", RequestType::Access)];

        let log = send_requests(&mail, &user(), &selections, &[], &contacts).await;

        assert_eq!(log.len(), 1);
        match &log[0].status {
            SendStatus::Failed { reason } => assert!(reason.contains("company_name")),
            other => panic!("expected Failed, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn rendered_message_addresses_the_discovered_contact() {
        let mut mail = MockMailProvider::new();
        mail.expect_send_message()
            .withf(|message| {
                message.to.email == "privacy@spotify.com"
                    && message.subject.contains("Spotify")
                    && message.body_text.contains("Jane Doe")
            })
            .returning(|_| Ok("m-1".to_string()));

        let candidates = vec![candidate("spotify.com", "Spotify")];
        let contacts: HashMap<_, _> = vec![contact("spotify.com")].into_iter().collect();
        let selections = vec![selection("spotify.com", RequestType::Access)];

        let log = send_requests(&mail, &user(), &selections, &candidates, &contacts).await;
        assert!(log[0].status.is_sent());
    }

    #[tokio::test]
    async fn empty_selection_list_sends_nothing() {
        let mail = MockMailProvider::new();
        let log = send_requests(&mail, &user(), &[], &[], &HashMap::new()).await;
        assert!(log.is_empty());
    }
}
