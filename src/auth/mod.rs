//! Authentication: Google OAuth 2.0 and the signed session cookie.
//!
//! Sign-in follows the authorization-code flow; the resulting identity and
//! refresh token are carried in an HMAC-signed, expiring cookie. The server
//! holds no credentials at rest — every request that needs Gmail access
//! exchanges the cookie's refresh token for a fresh access token.

mod cookie;
mod oauth;

pub use cookie::{CookieCodec, CookieError, SessionClaims};
pub use oauth::{GoogleOAuth, OAuthError, TokenSet};
