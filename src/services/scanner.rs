//! Inbox scanning.
//!
//! Lists message IDs for the requested date range, fetches each message,
//! classifies it, and merges detections into a candidate set deduplicated
//! by domain. Per-email failures (fetch or classification) are warnings
//! that skip the email; only the initial listing call can fail the scan.

use std::sync::Arc;

use crate::domain::CompanyCandidate;
use crate::providers::logo::LogoClient;
use crate::providers::mail::{MailProvider, Result, ScanQuery};
use crate::services::{Classification, Classifier};

/// Result of one inbox scan.
#[derive(Debug, Clone)]
pub struct ScanOutcome {
    /// Companies detected, deduplicated by domain.
    pub candidates: Vec<CompanyCandidate>,
    /// How many messages were fetched and classified.
    pub emails_scanned: usize,
    /// How many messages were skipped because of an upstream failure or an
    /// unparsable model reply.
    pub skipped: usize,
}

/// Scans an inbox and classifies its contents.
pub struct InboxScanner {
    classifier: Classifier,
    logos: Arc<LogoClient>,
}

impl InboxScanner {
    /// Creates a scanner.
    pub fn new(classifier: Classifier, logos: Arc<LogoClient>) -> Self {
        Self { classifier, logos }
    }

    /// Runs a scan against the given mail provider.
    ///
    /// # Errors
    ///
    /// Fails only when the message listing itself fails; everything after
    /// that degrades per email.
    pub async fn scan(&self, mail: &dyn MailProvider, query: &ScanQuery) -> Result<ScanOutcome> {
        let ids = mail.list_message_ids(query).await?;
        tracing::info!(count = ids.len(), "scanning inbox messages");

        let mut candidates: Vec<CompanyCandidate> = Vec::new();
        let mut emails_scanned = 0;
        let mut skipped = 0;

        for id in &ids {
            let record = match mail.fetch_message(id).await {
                Ok(record) => record,
                Err(e) => {
                    tracing::warn!(email_id = %id, error = %e, "failed to fetch message, skipping");
                    skipped += 1;
                    continue;
                }
            };
            emails_scanned += 1;

            match self.classifier.classify(&record).await {
                Ok(Classification::Match(candidate)) => {
                    Self::merge_candidate(&mut candidates, candidate)
                }
                // Not a company interaction; nothing to record.
                Ok(Classification::Skip) => {}
                Ok(Classification::ParseError) => {
                    tracing::warn!(email_id = %record.id, "unparsable classifier reply, skipping email");
                    skipped += 1;
                }
                Err(e) => {
                    tracing::warn!(email_id = %record.id, error = %e, "classification failed, skipping email");
                    skipped += 1;
                }
            }
        }

        // Logo lookups run after dedup so each domain is probed once.
        for candidate in &mut candidates {
            if candidate.logo_url.is_none() {
                candidate.logo_url = self.logos.lookup(&candidate.domain).await;
            }
        }

        tracing::info!(
            candidates = candidates.len(),
            emails_scanned,
            skipped,
            "scan complete"
        );

        Ok(ScanOutcome {
            candidates,
            emails_scanned,
            skipped,
        })
    }

    fn merge_candidate(candidates: &mut Vec<CompanyCandidate>, candidate: CompanyCandidate) {
        match candidates.iter_mut().find(|c| c.domain == candidate.domain) {
            Some(existing) => existing.merge(candidate),
            None => candidates.push(candidate),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Address, EmailId, EmailRecord};
    use crate::providers::ai::{
        CompletionResponse, FinishReason, LlmError, MockLlmProvider, TokenUsage,
    };
    use crate::providers::mail::{MailError, MockMailProvider};
    use chrono::Utc;

    fn record(id: &str, sender: &str, subject: &str) -> EmailRecord {
        EmailRecord {
            id: EmailId::from(id),
            sender: Address::new(sender),
            subject: Some(subject.to_string()),
            body: "body".to_string(),
            received_at: Utc::now(),
        }
    }

    fn completion(text: &str) -> CompletionResponse {
        CompletionResponse {
            text: text.to_string(),
            tokens_used: TokenUsage::default(),
            finish_reason: FinishReason::Stop,
        }
    }

    fn scanner_with_llm(llm: MockLlmProvider) -> InboxScanner {
        InboxScanner::new(Classifier::new(Arc::new(llm)), Arc::new(LogoClient::new(None)))
    }

    #[tokio::test]
    async fn empty_inbox_yields_empty_outcome() {
        let mut mail = MockMailProvider::new();
        mail.expect_list_message_ids().returning(|_| Ok(vec![]));

        let scanner = scanner_with_llm(MockLlmProvider::new());
        let outcome = scanner
            .scan(&mail, &ScanQuery::last_days(30, 100))
            .await
            .unwrap();

        assert!(outcome.candidates.is_empty());
        assert_eq!(outcome.emails_scanned, 0);
        assert_eq!(outcome.skipped, 0);
    }

    #[tokio::test]
    async fn duplicate_domains_are_merged() {
        let mut mail = MockMailProvider::new();
        mail.expect_list_message_ids()
            .returning(|_| Ok(vec![EmailId::from("e1"), EmailId::from("e2")]));
        mail.expect_fetch_message().returning(|id| {
            Ok(record(&id.0, "no-reply@spotify.com", "Your Spotify receipt"))
        });

        let mut llm = MockLlmProvider::new();
        llm.expect_complete().returning(|_| {
            Ok(completion(
                r#"{"company": "Spotify", "domain": "spotify.com", "interaction_type": "subscription"}"#,
            ))
        });

        let scanner = scanner_with_llm(llm);
        let outcome = scanner
            .scan(&mail, &ScanQuery::last_days(30, 100))
            .await
            .unwrap();

        assert_eq!(outcome.candidates.len(), 1);
        assert_eq!(outcome.emails_scanned, 2);
        // The merged candidate keeps the earliest source email.
        assert_eq!(outcome.candidates[0].source_email_id, EmailId::from("e1"));
    }

    #[tokio::test]
    async fn fetch_failure_skips_that_email_only() {
        let mut mail = MockMailProvider::new();
        mail.expect_list_message_ids()
            .returning(|_| Ok(vec![EmailId::from("bad"), EmailId::from("good")]));
        mail.expect_fetch_message().returning(|id| {
            if id.0 == "bad" {
                Err(MailError::NotFound("gone".to_string()))
            } else {
                Ok(record(&id.0, "no-reply@netflix.com", "Your Netflix bill"))
            }
        });

        let mut llm = MockLlmProvider::new();
        llm.expect_complete().returning(|_| {
            Ok(completion(
                r#"{"company": "Netflix", "domain": "netflix.com", "interaction_type": "subscription"}"#,
            ))
        });

        let scanner = scanner_with_llm(llm);
        let outcome = scanner
            .scan(&mail, &ScanQuery::last_days(30, 100))
            .await
            .unwrap();

        assert_eq!(outcome.candidates.len(), 1);
        assert_eq!(outcome.emails_scanned, 1);
        assert_eq!(outcome.skipped, 1);
    }

    #[tokio::test]
    async fn classifier_failure_skips_but_scan_continues() {
        let mut mail = MockMailProvider::new();
        mail.expect_list_message_ids()
            .returning(|_| Ok(vec![EmailId::from("e1"), EmailId::from("e2")]));
        mail.expect_fetch_message()
            .returning(|id| Ok(record(&id.0, "no-reply@spotify.com", "receipt")));

        let mut llm = MockLlmProvider::new();
        let mut calls = 0;
        llm.expect_complete().returning_st(move |_| {
            calls += 1;
            if calls == 1 {
                Err(LlmError::Api {
                    status: 503,
                    message: "overloaded".to_string(),
                })
            } else {
                Ok(completion(
                    r#"{"company": "Spotify", "domain": "spotify.com", "interaction_type": "subscription"}"#,
                ))
            }
        });

        let scanner = scanner_with_llm(llm);
        let outcome = scanner
            .scan(&mail, &ScanQuery::last_days(30, 100))
            .await
            .unwrap();

        assert_eq!(outcome.candidates.len(), 1);
        assert_eq!(outcome.skipped, 1);
    }

    #[tokio::test]
    async fn listing_failure_fails_the_scan() {
        let mut mail = MockMailProvider::new();
        mail.expect_list_message_ids()
            .returning(|_| Err(MailError::Authentication("expired".to_string())));

        let scanner = scanner_with_llm(MockLlmProvider::new());
        let result = scanner.scan(&mail, &ScanQuery::last_days(30, 100)).await;
        assert!(matches!(result, Err(MailError::Authentication(_))));
    }
}
