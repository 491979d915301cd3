//! Signed session cookie encoding and verification.
//!
//! The cookie value is `base64url(JSON claims) + "." + base64url(HMAC tag)`,
//! signed with HMAC-SHA256. Verification checks the signature before
//! touching the payload, then the expiry, then that every required identity
//! field is present. An invalid cookie is simply rejected; the caller
//! clears it and sends the user back to sign-in.

use base64::prelude::*;
use chrono::{DateTime, Duration, Utc};
use ring::hmac;
use serde::{Deserialize, Serialize};

use crate::domain::{SessionId, UserProfile};

/// Errors raised when a cookie fails verification.
#[derive(Debug, thiserror::Error)]
pub enum CookieError {
    /// The value is not `payload.tag`.
    #[error("malformed cookie value")]
    Malformed,

    /// The HMAC tag does not match the payload.
    #[error("cookie signature mismatch")]
    BadSignature,

    /// The payload is not valid JSON for the claims shape.
    #[error("cookie payload decode failed: {0}")]
    Decode(String),

    /// The cookie has expired.
    #[error("cookie expired")]
    Expired,

    /// A required identity field is empty.
    #[error("cookie missing required field {0}")]
    MissingField(&'static str),
}

/// Claims carried inside the signed cookie.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Key into the in-memory session store.
    pub session_id: SessionId,
    /// The signed-in user.
    pub profile: UserProfile,
    /// Google OAuth refresh token.
    pub refresh_token: String,
    /// Unix timestamp after which the cookie is invalid.
    pub expires_at: i64,
    /// Unix timestamp the cookie was issued.
    pub issued_at: i64,
}

impl SessionClaims {
    /// When this cookie expires.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.expires_at, 0)
    }
}

/// Signs and verifies session cookies.
pub struct CookieCodec {
    key: hmac::Key,
    expiry: Duration,
}

impl CookieCodec {
    /// Creates a codec from the signing key and expiry in days.
    pub fn new(signing_key: &str, expiry_days: f64) -> Self {
        Self {
            key: hmac::Key::new(hmac::HMAC_SHA256, signing_key.as_bytes()),
            expiry: Duration::seconds((expiry_days * 86_400.0) as i64),
        }
    }

    /// Issues fresh claims for a newly signed-in user.
    pub fn issue(&self, profile: UserProfile, refresh_token: String) -> SessionClaims {
        let now = Utc::now();
        SessionClaims {
            session_id: SessionId::generate(),
            profile,
            refresh_token,
            expires_at: (now + self.expiry).timestamp(),
            issued_at: now.timestamp(),
        }
    }

    /// Encodes and signs claims into a cookie value.
    pub fn encode(&self, claims: &SessionClaims) -> String {
        // Serialization of a plain struct cannot fail.
        let json = serde_json::to_vec(claims).expect("claims serialize");
        let payload = BASE64_URL_SAFE_NO_PAD.encode(&json);
        let tag = hmac::sign(&self.key, payload.as_bytes());
        let tag = BASE64_URL_SAFE_NO_PAD.encode(tag.as_ref());
        format!("{}.{}", payload, tag)
    }

    /// Verifies a cookie value and returns its claims.
    pub fn verify(&self, value: &str) -> Result<SessionClaims, CookieError> {
        let (payload, tag) = value.split_once('.').ok_or(CookieError::Malformed)?;

        let tag_bytes = BASE64_URL_SAFE_NO_PAD
            .decode(tag)
            .map_err(|_| CookieError::Malformed)?;
        hmac::verify(&self.key, payload.as_bytes(), &tag_bytes)
            .map_err(|_| CookieError::BadSignature)?;

        let json = BASE64_URL_SAFE_NO_PAD
            .decode(payload)
            .map_err(|_| CookieError::Malformed)?;
        let claims: SessionClaims =
            serde_json::from_slice(&json).map_err(|e| CookieError::Decode(e.to_string()))?;

        if claims.expires_at <= Utc::now().timestamp() {
            return Err(CookieError::Expired);
        }

        if claims.session_id.0.is_empty() {
            return Err(CookieError::MissingField("session_id"));
        }
        if claims.profile.subject.is_empty() {
            return Err(CookieError::MissingField("subject"));
        }
        if claims.profile.email.is_empty() {
            return Err(CookieError::MissingField("email"));
        }
        if claims.profile.name.is_empty() {
            return Err(CookieError::MissingField("name"));
        }
        if claims.refresh_token.is_empty() {
            return Err(CookieError::MissingField("refresh_token"));
        }

        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn test_profile() -> UserProfile {
        UserProfile {
            subject: "108177687".to_string(),
            email: "jane@gmail.com".to_string(),
            name: "Jane Doe".to_string(),
            picture_url: None,
        }
    }

    #[test]
    fn round_trip() {
        let codec = CookieCodec::new("test-signing-key", 30.0);
        let claims = codec.issue(test_profile(), "refresh-token".to_string());

        let value = codec.encode(&claims);
        let verified = codec.verify(&value).unwrap();

        assert_eq!(verified, claims);
    }

    #[test]
    fn tampered_payload_is_rejected() {
        let codec = CookieCodec::new("test-signing-key", 30.0);
        let claims = codec.issue(test_profile(), "refresh-token".to_string());
        let value = codec.encode(&claims);

        // Flip a character in the payload half.
        let (payload, tag) = value.split_once('.').unwrap();
        let mut bytes = payload.as_bytes().to_vec();
        bytes[4] = if bytes[4] == b'A' { b'B' } else { b'A' };
        let tampered = format!("{}.{}", String::from_utf8(bytes).unwrap(), tag);

        assert!(matches!(
            codec.verify(&tampered),
            Err(CookieError::BadSignature)
        ));
    }

    #[test]
    fn wrong_key_is_rejected() {
        let codec = CookieCodec::new("key-one", 30.0);
        let other = CookieCodec::new("key-two", 30.0);
        let value = codec.encode(&codec.issue(test_profile(), "rt".to_string()));

        assert!(matches!(
            other.verify(&value),
            Err(CookieError::BadSignature)
        ));
    }

    #[test]
    fn expired_cookie_is_rejected() {
        let codec = CookieCodec::new("test-signing-key", 30.0);
        let mut claims = codec.issue(test_profile(), "rt".to_string());
        claims.expires_at = (Utc::now() - Duration::hours(1)).timestamp();

        let value = codec.encode(&claims);
        assert!(matches!(codec.verify(&value), Err(CookieError::Expired)));
    }

    #[test]
    fn missing_identity_fields_are_rejected() {
        let codec = CookieCodec::new("test-signing-key", 30.0);
        let mut profile = test_profile();
        profile.email = String::new();
        let claims = codec.issue(profile, "rt".to_string());

        let value = codec.encode(&claims);
        assert!(matches!(
            codec.verify(&value),
            Err(CookieError::MissingField("email"))
        ));
    }

    #[test]
    fn garbage_values_are_malformed() {
        let codec = CookieCodec::new("test-signing-key", 30.0);
        assert!(matches!(codec.verify(""), Err(CookieError::Malformed)));
        assert!(matches!(
            codec.verify("no-dot-here"),
            Err(CookieError::Malformed)
        ));
        assert!(matches!(
            codec.verify("payload.!!!not-base64!!!"),
            Err(CookieError::Malformed)
        ));
    }
}
