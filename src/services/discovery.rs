//! GDPR contact discovery.
//!
//! Two-stage, best-effort pipeline per domain: ask the crawl service for
//! privacy-policy-like pages, then ask the LLM to pull a GDPR contact
//! address out of the top page. A failed or empty crawl short-circuits to
//! NotFound without spending the LLM call; an address that does not look
//! like an email is NotFound as well. No retries.

use std::sync::Arc;

use crate::domain::{is_plausible_email, CompanyDomain, ContactInfo};
use crate::providers::ai::{CompletionRequest, LlmProvider};
use crate::providers::crawl::CrawlProvider;

/// Longest slice of page markdown fed to the extraction prompt.
const MAX_PAGE_CHARS: usize = 6_000;

const SYSTEM_PROMPT: &str = "You extract contact email addresses from privacy-policy pages. \
Reply with the address only, or NONE.";

/// Result of a discovery attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiscoveryOutcome {
    /// A plausible GDPR contact was extracted.
    Found(ContactInfo),
    /// No privacy page, no address on it, or an upstream failure.
    NotFound,
}

/// Discovers GDPR contacts for company domains.
pub struct ContactDiscoverer {
    crawl: Arc<dyn CrawlProvider>,
    llm: Arc<dyn LlmProvider>,
}

impl ContactDiscoverer {
    /// Creates a discoverer.
    pub fn new(crawl: Arc<dyn CrawlProvider>, llm: Arc<dyn LlmProvider>) -> Self {
        Self { crawl, llm }
    }

    /// Attempts to discover the GDPR contact for a domain.
    ///
    /// Never errors: every failure mode collapses to
    /// [`DiscoveryOutcome::NotFound`] with a warning logged, because a
    /// missing contact is an expected state the UI must handle anyway.
    pub async fn discover(&self, domain: &CompanyDomain) -> DiscoveryOutcome {
        let pages = match self.crawl.find_privacy_pages(domain).await {
            Ok(pages) => pages,
            Err(e) => {
                tracing::warn!(%domain, error = %e, "privacy page search failed");
                return DiscoveryOutcome::NotFound;
            }
        };

        let Some(page) = pages.into_iter().next() else {
            tracing::info!(%domain, "no privacy page found");
            return DiscoveryOutcome::NotFound;
        };

        let crawled = match self.crawl.fetch_page(&page.url).await {
            Ok(crawled) => crawled,
            Err(e) => {
                tracing::warn!(%domain, url = %page.url, error = %e, "privacy page fetch failed");
                return DiscoveryOutcome::NotFound;
            }
        };

        let request = CompletionRequest::new(Self::build_prompt(domain, &crawled.markdown))
            .with_system_prompt(SYSTEM_PROMPT)
            .with_temperature(0.0)
            .with_max_tokens(64);

        let response = match self.llm.complete(&request).await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(%domain, error = %e, "contact extraction failed");
                return DiscoveryOutcome::NotFound;
            }
        };

        match Self::parse_reply(&response.text) {
            Some(gdpr_email) => DiscoveryOutcome::Found(ContactInfo {
                domain: domain.clone(),
                gdpr_email,
                privacy_policy_url: crawled.url,
            }),
            None => {
                tracing::info!(%domain, "no plausible contact address in privacy page");
                DiscoveryOutcome::NotFound
            }
        }
    }

    fn build_prompt(domain: &CompanyDomain, markdown: &str) -> String {
        let page: String = markdown.chars().take(MAX_PAGE_CHARS).collect();
        format!(
            "This is the privacy policy of {}. Find the email address for GDPR or \
             data-protection requests (often a privacy@, dpo@, or dataprotection@ address).\n\
             Reply with the bare address and nothing else. If the page lists none, reply NONE.\n\
             \n{}",
            domain, page
        )
    }

    /// Validates a model reply down to a plausible address, or `None`.
    fn parse_reply(text: &str) -> Option<String> {
        let candidate = text.trim().trim_matches(['`', '"', '<', '>']);
        if candidate.eq_ignore_ascii_case("none") {
            return None;
        }
        if is_plausible_email(candidate) {
            Some(candidate.to_string())
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::ai::{
        CompletionResponse, FinishReason, MockLlmProvider, TokenUsage,
    };
    use crate::providers::crawl::{CrawlError, CrawledPage, MockCrawlProvider, PageRef};

    fn completion(text: &str) -> CompletionResponse {
        CompletionResponse {
            text: text.to_string(),
            tokens_used: TokenUsage::default(),
            finish_reason: FinishReason::Stop,
        }
    }

    fn privacy_page() -> PageRef {
        PageRef {
            url: "https://spotify.com/privacy".to_string(),
            title: Some("Privacy Policy".to_string()),
        }
    }

    #[tokio::test]
    async fn discovers_contact_from_privacy_page() {
        let mut crawl = MockCrawlProvider::new();
        crawl
            .expect_find_privacy_pages()
            .returning(|_| Ok(vec![privacy_page()]));
        crawl.expect_fetch_page().returning(|url| {
            Ok(CrawledPage {
                url: url.to_string(),
                markdown: "# Privacy\nContact privacy@spotify.com".to_string(),
            })
        });

        let mut llm = MockLlmProvider::new();
        llm.expect_complete()
            .returning(|_| Ok(completion("privacy@spotify.com")));

        let discoverer = ContactDiscoverer::new(Arc::new(crawl), Arc::new(llm));
        let outcome = discoverer.discover(&CompanyDomain::new("spotify.com")).await;

        match outcome {
            DiscoveryOutcome::Found(contact) => {
                assert_eq!(contact.gdpr_email, "privacy@spotify.com");
                assert_eq!(contact.privacy_policy_url, "https://spotify.com/privacy");
                assert_eq!(contact.domain, CompanyDomain::new("spotify.com"));
            }
            DiscoveryOutcome::NotFound => panic!("expected Found"),
        }
    }

    #[tokio::test]
    async fn crawl_failure_short_circuits_without_llm_call() {
        let mut crawl = MockCrawlProvider::new();
        crawl.expect_find_privacy_pages().returning(|_| {
            Err(CrawlError::Api {
                status: 502,
                message: "bad gateway".to_string(),
            })
        });

        // The LLM mock has no expectations: any call would panic the test.
        let llm = MockLlmProvider::new();

        let discoverer = ContactDiscoverer::new(Arc::new(crawl), Arc::new(llm));
        let outcome = discoverer.discover(&CompanyDomain::new("spotify.com")).await;
        assert_eq!(outcome, DiscoveryOutcome::NotFound);
    }

    #[tokio::test]
    async fn empty_search_results_are_not_found() {
        let mut crawl = MockCrawlProvider::new();
        crawl.expect_find_privacy_pages().returning(|_| Ok(vec![]));

        let llm = MockLlmProvider::new();
        let discoverer = ContactDiscoverer::new(Arc::new(crawl), Arc::new(llm));
        let outcome = discoverer.discover(&CompanyDomain::new("spotify.com")).await;
        assert_eq!(outcome, DiscoveryOutcome::NotFound);
    }

    #[tokio::test]
    async fn implausible_extraction_is_not_found() {
        let mut crawl = MockCrawlProvider::new();
        crawl
            .expect_find_privacy_pages()
            .returning(|_| Ok(vec![privacy_page()]));
        crawl.expect_fetch_page().returning(|url| {
            Ok(CrawledPage {
                url: url.to_string(),
                markdown: "# Privacy".to_string(),
            })
        });

        let mut llm = MockLlmProvider::new();
        llm.expect_complete().returning(|_| {
            Ok(completion("I could not find any contact address on this page."))
        });

        let discoverer = ContactDiscoverer::new(Arc::new(crawl), Arc::new(llm));
        let outcome = discoverer.discover(&CompanyDomain::new("spotify.com")).await;
        assert_eq!(outcome, DiscoveryOutcome::NotFound);
    }

    #[test]
    fn parse_reply_handles_common_shapes() {
        assert_eq!(
            ContactDiscoverer::parse_reply("privacy@spotify.com"),
            Some("privacy@spotify.com".to_string())
        );
        assert_eq!(
            ContactDiscoverer::parse_reply("`dpo@example.org`\n"),
            Some("dpo@example.org".to_string())
        );
        assert_eq!(ContactDiscoverer::parse_reply("NONE"), None);
        assert_eq!(ContactDiscoverer::parse_reply("none"), None);
        assert_eq!(
            ContactDiscoverer::parse_reply("The address is privacy@spotify.com"),
            None
        );
    }
}
