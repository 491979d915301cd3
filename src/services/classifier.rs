//! Email classification.
//!
//! One LLM call per email: the prompt asks for a strict JSON object naming
//! the company behind the email, its domain, and the interaction type, or
//! an explicit null when the email is not a company interaction. The reply
//! is decoded through a typed struct and normalized into a tagged
//! [`Classification`] — handlers never see raw JSON.

use std::sync::Arc;

use serde::Deserialize;

use crate::domain::{CompanyCandidate, CompanyDomain, EmailRecord, InteractionType};
use crate::providers::ai::{CompletionRequest, LlmProvider, LlmResult};

/// Longest email body slice fed to the model. Keeps the prompt well inside
/// any model's context window; receipts and notifications front-load the
/// identifying content anyway.
const MAX_BODY_CHARS: usize = 4_000;

const SYSTEM_PROMPT: &str = "You identify which company sent an email and whether it holds \
the recipient's personal data. Reply with JSON only, no prose, no code fences.";

/// Result of classifying one email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// The email is from a company that holds the user's data.
    Match(CompanyCandidate),
    /// Not a company interaction (personal mail, mailing list chatter...).
    Skip,
    /// The model's reply was not valid against the expected schema.
    ParseError,
}

/// The JSON shape the model is asked to produce.
#[derive(Debug, Deserialize)]
struct ClassifierReply {
    company: Option<String>,
    domain: Option<String>,
    interaction_type: Option<String>,
}

/// Classifies emails with an LLM provider.
pub struct Classifier {
    llm: Arc<dyn LlmProvider>,
}

impl Classifier {
    /// Creates a classifier on the given provider.
    pub fn new(llm: Arc<dyn LlmProvider>) -> Self {
        Self { llm }
    }

    /// Classifies a single email.
    ///
    /// # Errors
    ///
    /// Returns the provider error when the completion call itself fails;
    /// the caller skips the email and continues the scan. A reply that
    /// fails to decode is [`Classification::ParseError`], not an error.
    pub async fn classify(&self, email: &EmailRecord) -> LlmResult<Classification> {
        let request = CompletionRequest::new(Self::build_prompt(email))
            .with_system_prompt(SYSTEM_PROMPT)
            .with_temperature(0.0)
            .with_max_tokens(256);

        let response = self.llm.complete(&request).await?;
        Ok(Self::decode_reply(&response.text, email))
    }

    /// Builds the classification prompt for one email.
    fn build_prompt(email: &EmailRecord) -> String {
        let subject = email.subject.as_deref().unwrap_or("(no subject)");
        let body: String = email.body.chars().take(MAX_BODY_CHARS).collect();

        format!(
            "Identify the company behind this email.\n\
             \n\
             From: {}\n\
             Subject: {}\n\
             Body:\n{}\n\
             \n\
             Reply with exactly this JSON shape:\n\
             {{\"company\": \"<name>\", \"domain\": \"<registrable domain>\", \
             \"interaction_type\": \"subscription|purchase|account|newsletter|marketing|other\"}}\n\
             If the email is not from a company that holds the recipient's personal data, \
             reply: {{\"company\": null, \"domain\": null, \"interaction_type\": null}}",
            email.sender.email, subject, body
        )
    }

    /// Decodes a model reply into a tagged classification.
    ///
    /// Tolerates code fences around the JSON (models add them despite
    /// instructions) but nothing else: any other deviation from the schema
    /// is a `ParseError`, which the scanner logs and skips.
    fn decode_reply(text: &str, email: &EmailRecord) -> Classification {
        let cleaned = strip_code_fences(text);

        let reply: ClassifierReply = match serde_json::from_str(cleaned) {
            Ok(reply) => reply,
            Err(e) => {
                tracing::warn!(email_id = %email.id, error = %e, "classifier reply failed to parse");
                return Classification::ParseError;
            }
        };

        let (name, domain) = match (reply.company, reply.domain) {
            (Some(name), Some(domain)) if !name.trim().is_empty() => (name, domain),
            _ => return Classification::Skip,
        };

        let domain = CompanyDomain::new(&domain);
        if !domain.is_valid() {
            tracing::debug!(email_id = %email.id, "classifier returned invalid domain, skipping");
            return Classification::Skip;
        }

        let interaction_type = reply
            .interaction_type
            .as_deref()
            .map(InteractionType::from_label)
            .unwrap_or(InteractionType::Other);

        Classification::Match(CompanyCandidate {
            name: name.trim().to_string(),
            domain,
            interaction_type,
            source_email_id: email.id.clone(),
            logo_url: None,
        })
    }
}

/// Strips a leading/trailing markdown code fence from a model reply.
fn strip_code_fences(text: &str) -> &str {
    let text = text.trim();
    let text = text
        .strip_prefix("```json")
        .or_else(|| text.strip_prefix("```"))
        .unwrap_or(text);
    text.strip_suffix("```").unwrap_or(text).trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Address, EmailId};
    use crate::providers::ai::{
        CompletionResponse, FinishReason, LlmError, MockLlmProvider, TokenUsage,
    };
    use chrono::Utc;

    fn spotify_email() -> EmailRecord {
        EmailRecord {
            id: EmailId::from("email-1"),
            sender: Address::with_name("no-reply@spotify.com", "Spotify"),
            subject: Some("Your Spotify Premium receipt".to_string()),
            body: "Thanks for subscribing to Spotify Premium.".to_string(),
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

    #[tokio::test]
    async fn classifies_subscription_receipt() {
        let mut llm = MockLlmProvider::new();
        llm.expect_complete().returning(|_| {
            Ok(completion(
                r#"{"company": "Spotify", "domain": "spotify.com", "interaction_type": "subscription"}"#,
            ))
        });

        let classifier = Classifier::new(Arc::new(llm));
        let result = classifier.classify(&spotify_email()).await.unwrap();

        match result {
            Classification::Match(candidate) => {
                assert_eq!(candidate.name, "Spotify");
                assert_eq!(candidate.domain, CompanyDomain::new("spotify.com"));
                assert_eq!(candidate.interaction_type, InteractionType::Subscription);
                assert_eq!(candidate.source_email_id, EmailId::from("email-1"));
            }
            other => panic!("expected Match, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn null_company_is_skip() {
        let mut llm = MockLlmProvider::new();
        llm.expect_complete().returning(|_| {
            Ok(completion(
                r#"{"company": null, "domain": null, "interaction_type": null}"#,
            ))
        });

        let classifier = Classifier::new(Arc::new(llm));
        let result = classifier.classify(&spotify_email()).await.unwrap();
        assert_eq!(result, Classification::Skip);
    }

    #[tokio::test]
    async fn malformed_reply_is_parse_error() {
        let mut llm = MockLlmProvider::new();
        llm.expect_complete()
            .returning(|_| Ok(completion("The company is Spotify.")));

        let classifier = Classifier::new(Arc::new(llm));
        let result = classifier.classify(&spotify_email()).await.unwrap();
        assert_eq!(result, Classification::ParseError);
    }

    #[tokio::test]
    async fn provider_error_propagates() {
        let mut llm = MockLlmProvider::new();
        llm.expect_complete().returning(|_| {
            Err(LlmError::Api {
                status: 503,
                message: "overloaded".to_string(),
            })
        });

        let classifier = Classifier::new(Arc::new(llm));
        assert!(classifier.classify(&spotify_email()).await.is_err());
    }

    #[test]
    fn decode_tolerates_code_fences() {
        let email = spotify_email();
        let fenced = "```json\n{\"company\": \"Spotify\", \"domain\": \"spotify.com\", \
                      \"interaction_type\": \"subscription\"}\n```";

        match Classifier::decode_reply(fenced, &email) {
            Classification::Match(candidate) => assert_eq!(candidate.name, "Spotify"),
            other => panic!("expected Match, got {:?}", other),
        }
    }

    #[test]
    fn decode_rejects_invalid_domain() {
        let email = spotify_email();
        let reply = r#"{"company": "Spotify", "domain": "not a domain", "interaction_type": "subscription"}"#;
        assert_eq!(Classifier::decode_reply(reply, &email), Classification::Skip);
    }

    #[test]
    fn prompt_truncates_long_bodies() {
        let mut email = spotify_email();
        email.body = "x".repeat(100_000);
        let prompt = Classifier::build_prompt(&email);
        assert!(prompt.len() < MAX_BODY_CHARS + 1_000);
    }
}
