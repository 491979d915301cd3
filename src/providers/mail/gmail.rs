//! Gmail API provider implementation.
//!
//! Implements [`MailProvider`] against the Gmail REST API v1:
//! - `users.messages.list` with a `q=` date-range query for scanning
//! - `users.messages.get` (format=full) for message bodies
//! - `users.messages.send` for outgoing GDPR requests
//!
//! The client is constructed per request with an access token that the auth
//! layer has already refreshed; it holds no credentials of its own.

use async_trait::async_trait;
use base64::prelude::*;
use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};

use super::{MailError, MailProvider, OutgoingMessage, Result, ScanQuery};
use crate::domain::{Address, EmailId, EmailRecord};

const GMAIL_API_BASE: &str = "https://gmail.googleapis.com/gmail/v1/users/me";

/// Gmail message list response.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MessageListResponse {
    messages: Option<Vec<MessageRef>>,
    next_page_token: Option<String>,
}

/// Reference to a message in a list response.
#[derive(Debug, Deserialize)]
struct MessageRef {
    id: String,
}

/// Gmail API message.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GmailMessage {
    id: String,
    payload: Option<GmailMessagePayload>,
    internal_date: Option<String>,
}

/// Gmail message payload (headers and body parts).
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GmailMessagePayload {
    headers: Option<Vec<GmailHeader>>,
    parts: Option<Vec<GmailPart>>,
    body: Option<GmailBody>,
}

/// Gmail message header.
#[derive(Debug, Deserialize)]
struct GmailHeader {
    name: String,
    value: String,
}

/// Gmail message part (for multipart messages).
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GmailPart {
    mime_type: Option<String>,
    body: Option<GmailBody>,
    parts: Option<Vec<GmailPart>>,
}

/// Gmail message body.
#[derive(Debug, Deserialize)]
struct GmailBody {
    data: Option<String>,
}

/// Gmail API client scoped to one access token.
pub struct GmailClient {
    client: reqwest::Client,
    access_token: String,
}

impl GmailClient {
    /// Creates a client for the given access token.
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            access_token: access_token.into(),
        }
    }

    /// Overrides the HTTP client.
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    fn auth_headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", self.access_token))
                .map_err(|e| MailError::Internal(format!("invalid header: {}", e)))?,
        );
        Ok(headers)
    }

    async fn get<T: for<'de> Deserialize<'de>>(&self, endpoint: &str) -> Result<T> {
        let url = format!("{}{}", GMAIL_API_BASE, endpoint);
        let response = self
            .client
            .get(&url)
            .headers(self.auth_headers()?)
            .send()
            .await
            .map_err(|e| MailError::Connection(e.to_string()))?;

        self.handle_response(response).await
    }

    async fn post<T: for<'de> Deserialize<'de>, B: Serialize>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> Result<T> {
        let url = format!("{}{}", GMAIL_API_BASE, endpoint);
        let mut headers = self.auth_headers()?;
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let response = self
            .client
            .post(&url)
            .headers(headers)
            .json(body)
            .send()
            .await
            .map_err(|e| MailError::Connection(e.to_string()))?;

        self.handle_response(response).await
    }

    async fn handle_response<T: for<'de> Deserialize<'de>>(
        &self,
        response: reqwest::Response,
    ) -> Result<T> {
        if !response.status().is_success() {
            return Err(self.handle_error(response).await);
        }

        response
            .json()
            .await
            .map_err(|e| MailError::Internal(format!("parse response: {}", e)))
    }

    async fn handle_error(&self, response: reqwest::Response) -> MailError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        match status.as_u16() {
            401 | 403 => MailError::Authentication(format!("unauthorized: {}", body)),
            404 => MailError::NotFound(body),
            429 => MailError::RateLimited {
                retry_after_secs: None,
            },
            _ => MailError::Internal(format!("API error ({}): {}", status, body)),
        }
    }

    /// Builds the Gmail search query for a date range.
    ///
    /// Gmail's `after:`/`before:` operators take `YYYY/MM/DD` in the user's
    /// local zone; UTC dates are close enough for a scan window.
    fn search_query(query: &ScanQuery) -> String {
        format!(
            "in:inbox after:{} before:{}",
            query.after.format("%Y/%m/%d"),
            query.before.format("%Y/%m/%d")
        )
    }

    /// Extracts the plain-text body from a message payload.
    ///
    /// Prefers `text/plain`; falls back to `text/html` when that is all the
    /// message carries. Multipart messages are walked recursively.
    fn extract_body(payload: &GmailMessagePayload) -> String {
        let mut text = None;
        let mut html = None;

        if let Some(body) = &payload.body {
            if let Some(decoded) = Self::decode_body(body) {
                text = Some(decoded);
            }
        }

        if let Some(parts) = &payload.parts {
            Self::extract_body_from_parts(parts, &mut text, &mut html);
        }

        text.or(html).unwrap_or_default()
    }

    fn extract_body_from_parts(
        parts: &[GmailPart],
        text: &mut Option<String>,
        html: &mut Option<String>,
    ) {
        for part in parts {
            let mime = part.mime_type.as_deref().unwrap_or("");

            if mime == "text/plain" && text.is_none() {
                if let Some(body) = &part.body {
                    *text = Self::decode_body(body);
                }
            } else if mime == "text/html" && html.is_none() {
                if let Some(body) = &part.body {
                    *html = Self::decode_body(body);
                }
            }

            if let Some(nested) = &part.parts {
                Self::extract_body_from_parts(nested, text, html);
            }
        }
    }

    fn decode_body(body: &GmailBody) -> Option<String> {
        let data = body.data.as_ref()?;
        let decoded = BASE64_URL_SAFE_NO_PAD.decode(data).ok()?;
        String::from_utf8(decoded).ok()
    }

    /// Converts a Gmail message to the domain record the classifier sees.
    fn to_email_record(msg: &GmailMessage) -> EmailRecord {
        let payload = msg.payload.as_ref();
        let headers = payload.and_then(|p| p.headers.as_ref());

        let get_header = |name: &str| -> Option<String> {
            headers.and_then(|h| {
                h.iter()
                    .find(|hdr| hdr.name.eq_ignore_ascii_case(name))
                    .map(|hdr| hdr.value.clone())
            })
        };

        let sender = get_header("From")
            .map(|v| Address::parse(&v))
            .unwrap_or_else(|| Address::new("unknown@unknown.invalid"));

        let subject = get_header("Subject");

        let received_at = msg
            .internal_date
            .as_ref()
            .and_then(|d| d.parse::<i64>().ok())
            .and_then(DateTime::from_timestamp_millis)
            .unwrap_or_else(Utc::now);

        let body = payload.map(Self::extract_body).unwrap_or_default();

        EmailRecord {
            id: EmailId::from(msg.id.clone()),
            sender,
            subject,
            body,
            received_at,
        }
    }

    /// Builds an RFC 5322 message for the send endpoint.
    fn build_raw_message(message: &OutgoingMessage) -> String {
        let mut raw = String::new();

        let from = match &message.from.name {
            Some(name) => format!("{} <{}>", name, message.from.email),
            None => message.from.email.clone(),
        };
        raw.push_str(&format!("From: {}\r\n", from));
        raw.push_str(&format!("To: {}\r\n", message.to.email));
        raw.push_str(&format!("Subject: {}\r\n", message.subject));
        raw.push_str("MIME-Version: 1.0\r\n");
        raw.push_str("Content-Type: text/plain; charset=utf-8\r\n");
        raw.push_str("\r\n");
        raw.push_str(&message.body_text);

        raw
    }
}

#[async_trait]
impl MailProvider for GmailClient {
    async fn list_message_ids(&self, query: &ScanQuery) -> Result<Vec<EmailId>> {
        if query.max_results == 0 {
            return Ok(vec![]);
        }

        let q = Self::search_query(query);
        let mut ids = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let page_size = (query.max_results - ids.len()).min(100);
            let mut endpoint = format!(
                "/messages?q={}&maxResults={}",
                urlencode(&q),
                page_size
            );
            if let Some(token) = &page_token {
                endpoint.push_str(&format!("&pageToken={}", token));
            }

            let response: MessageListResponse = self.get(&endpoint).await?;

            for msg in response.messages.unwrap_or_default() {
                ids.push(EmailId::from(msg.id));
                if ids.len() >= query.max_results {
                    return Ok(ids);
                }
            }

            match response.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        Ok(ids)
    }

    async fn fetch_message(&self, id: &EmailId) -> Result<EmailRecord> {
        let endpoint = format!("/messages/{}?format=full", id.0);
        let message: GmailMessage = self.get(&endpoint).await?;
        Ok(Self::to_email_record(&message))
    }

    async fn send_message(&self, message: &OutgoingMessage) -> Result<String> {
        let raw = Self::build_raw_message(message);
        let encoded = BASE64_URL_SAFE_NO_PAD.encode(raw.as_bytes());

        #[derive(Serialize)]
        struct SendRequest {
            raw: String,
        }

        #[derive(Deserialize)]
        struct SendResponse {
            id: String,
        }

        let response: SendResponse = self
            .post("/messages/send", &SendRequest { raw: encoded })
            .await?;

        tracing::info!(message_id = %response.id, to = %message.to.email, "email sent via Gmail API");
        Ok(response.id)
    }
}

/// Percent-encodes a query value for the Gmail `q=` parameter.
fn urlencode(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes()).collect()
}
