//! Google OAuth 2.0 authorization-code flow.

use oauth2::basic::BasicClient;
use oauth2::reqwest::async_http_client;
use oauth2::{
    AuthUrl, AuthorizationCode, ClientId, ClientSecret, CsrfToken, RedirectUrl, RefreshToken,
    Scope, TokenResponse, TokenUrl,
};
use serde::Deserialize;
use url::Url;

use crate::config::GoogleSettings;
use crate::domain::UserProfile;

const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const GOOGLE_USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v2/userinfo";

/// The OAuth scopes this application requests: identity plus read and send
/// access to Gmail. Static by design; nothing is requested incrementally.
const SCOPES: &[&str] = &[
    "openid",
    "https://www.googleapis.com/auth/userinfo.profile",
    "https://www.googleapis.com/auth/userinfo.email",
    "https://www.googleapis.com/auth/gmail.readonly",
    "https://www.googleapis.com/auth/gmail.send",
];

/// Errors that can occur during the OAuth flow.
#[derive(Debug, thiserror::Error)]
pub enum OAuthError {
    /// The client configuration (URLs, redirect URI) is invalid.
    #[error("invalid OAuth configuration: {0}")]
    Configuration(String),

    /// The authorization-code exchange failed.
    #[error("code exchange failed: {0}")]
    Exchange(String),

    /// The refresh-token grant failed (token revoked or expired).
    #[error("token refresh failed: {0}")]
    Refresh(String),

    /// The userinfo fetch failed.
    #[error("failed to fetch user profile: {0}")]
    Profile(String),
}

/// Tokens returned by the authorization-code exchange.
#[derive(Debug, Clone)]
pub struct TokenSet {
    /// Short-lived access token.
    pub access_token: String,
    /// Long-lived refresh token. Google only returns one on the first
    /// consent, which is why the flow requests `prompt=consent`.
    pub refresh_token: Option<String>,
}

/// Google userinfo response (oauth2 v2 shape).
#[derive(Debug, Deserialize)]
struct UserInfoResponse {
    id: String,
    email: String,
    name: String,
    picture: Option<String>,
}

/// Google OAuth client.
pub struct GoogleOAuth {
    client: BasicClient,
    http: reqwest::Client,
}

impl GoogleOAuth {
    /// Builds the OAuth client from settings.
    pub fn new(settings: &GoogleSettings) -> Result<Self, OAuthError> {
        let auth_url = AuthUrl::new(GOOGLE_AUTH_URL.to_string())
            .map_err(|e| OAuthError::Configuration(e.to_string()))?;
        let token_url = TokenUrl::new(GOOGLE_TOKEN_URL.to_string())
            .map_err(|e| OAuthError::Configuration(e.to_string()))?;
        let redirect_url = RedirectUrl::new(settings.redirect_uri.clone())
            .map_err(|e| OAuthError::Configuration(format!("redirect URI: {}", e)))?;

        let client = BasicClient::new(
            ClientId::new(settings.client_id.clone()),
            Some(ClientSecret::new(settings.client_secret.clone())),
            auth_url,
            Some(token_url),
        )
        .set_redirect_uri(redirect_url);

        Ok(Self {
            client,
            http: reqwest::Client::new(),
        })
    }

    /// Builds the authorization URL the browser is redirected to.
    ///
    /// Requests offline access with a forced consent prompt so Google
    /// returns a refresh token, and returns the CSRF state to be checked
    /// on callback.
    pub fn authorization_url(&self) -> (Url, CsrfToken) {
        let mut request = self.client.authorize_url(CsrfToken::new_random);
        for scope in SCOPES {
            request = request.add_scope(Scope::new((*scope).to_string()));
        }
        request
            .add_extra_param("access_type", "offline")
            .add_extra_param("prompt", "consent")
            .url()
    }

    /// Exchanges the callback authorization code for tokens.
    pub async fn exchange_code(&self, code: String) -> Result<TokenSet, OAuthError> {
        let response = self
            .client
            .exchange_code(AuthorizationCode::new(code))
            .request_async(async_http_client)
            .await
            .map_err(|e| OAuthError::Exchange(e.to_string()))?;

        Ok(TokenSet {
            access_token: response.access_token().secret().clone(),
            refresh_token: response.refresh_token().map(|t| t.secret().clone()),
        })
    }

    /// Exchanges a refresh token for a fresh access token.
    ///
    /// Called on every request that touches Gmail; no access token is ever
    /// stored server-side.
    pub async fn refresh_access_token(&self, refresh_token: &str) -> Result<String, OAuthError> {
        let response = self
            .client
            .exchange_refresh_token(&RefreshToken::new(refresh_token.to_string()))
            .request_async(async_http_client)
            .await
            .map_err(|e| OAuthError::Refresh(e.to_string()))?;

        Ok(response.access_token().secret().clone())
    }

    /// Fetches the signed-in user's profile from the userinfo endpoint.
    pub async fn fetch_user_profile(&self, access_token: &str) -> Result<UserProfile, OAuthError> {
        let response = self
            .http
            .get(GOOGLE_USERINFO_URL)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| OAuthError::Profile(e.to_string()))?;

        if !response.status().is_success() {
            return Err(OAuthError::Profile(format!(
                "userinfo returned {}",
                response.status()
            )));
        }

        let info: UserInfoResponse = response
            .json()
            .await
            .map_err(|e| OAuthError::Profile(format!("parse userinfo: {}", e)))?;

        Ok(UserProfile {
            subject: info.id,
            email: info.email,
            name: info.name,
            picture_url: info.picture,
        })
    }
}
