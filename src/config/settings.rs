//! Application settings, sourced from the environment at startup.

use serde::{Deserialize, Serialize};
use std::env;

/// Error raised when required configuration is missing or unparsable.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A required environment variable was not set.
    #[error("missing required environment variable {0}")]
    MissingVar(&'static str),

    /// A numeric tunable could not be parsed.
    #[error("invalid value for {var}: {value}")]
    InvalidValue {
        /// The variable name.
        var: &'static str,
        /// The offending value.
        value: String,
    },
}

fn required(var: &'static str) -> Result<String, ConfigError> {
    env::var(var).map_err(|_| ConfigError::MissingVar(var))
}

fn parsed_or<T: std::str::FromStr>(var: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(var) {
        Ok(value) => value
            .parse()
            .map_err(|_| ConfigError::InvalidValue { var, value }),
        Err(_) => Ok(default),
    }
}

/// Top-level application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Google OAuth client configuration.
    pub google: GoogleSettings,
    /// Gemini text-generation configuration.
    pub gemini: GeminiSettings,
    /// Firecrawl web-crawl configuration.
    pub crawl: CrawlSettings,
    /// Logo lookup configuration.
    pub logo: LogoSettings,
    /// Session cookie configuration.
    pub cookie: CookieSettings,
    /// Inbox scan tunables.
    pub scan: ScanSettings,
    /// HTTP server configuration.
    pub server: ServerSettings,
}

impl Settings {
    /// Loads settings from the environment.
    ///
    /// Required variables: `GOOGLE_CLIENT_ID`, `GOOGLE_CLIENT_SECRET`,
    /// `OAUTH_REDIRECT_URI`, `GEMINI_API_KEY`, `FIRECRAWL_API_KEY`,
    /// `COOKIE_SIGNING_KEY`. Everything else has a default.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            google: GoogleSettings {
                client_id: required("GOOGLE_CLIENT_ID")?,
                client_secret: required("GOOGLE_CLIENT_SECRET")?,
                redirect_uri: required("OAUTH_REDIRECT_URI")?,
            },
            gemini: GeminiSettings {
                api_key: required("GEMINI_API_KEY")?,
                model: env::var("GEMINI_MODEL")
                    .unwrap_or_else(|_| "gemini-1.5-flash".to_string()),
            },
            crawl: CrawlSettings {
                api_key: required("FIRECRAWL_API_KEY")?,
                base_url: env::var("FIRECRAWL_BASE_URL")
                    .unwrap_or_else(|_| "https://api.firecrawl.dev".to_string()),
            },
            logo: LogoSettings {
                token: env::var("LOGO_DEV_TOKEN").ok(),
            },
            cookie: CookieSettings {
                name: env::var("COOKIE_NAME").unwrap_or_else(|_| "tracectrl_auth".to_string()),
                signing_key: required("COOKIE_SIGNING_KEY")?,
                expiry_days: parsed_or("COOKIE_EXPIRY_DAYS", 30.0)?,
            },
            scan: ScanSettings {
                max_emails: parsed_or("MAX_EMAILS_SCANNED", 100)?,
                default_window_days: parsed_or("DEFAULT_SCAN_WINDOW_DAYS", 30)?,
                session_idle_timeout_secs: parsed_or("SESSION_IDLE_TIMEOUT_SECS", 3600)?,
            },
            server: ServerSettings {
                bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:8501".to_string()),
            },
        })
    }
}

/// Google OAuth client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoogleSettings {
    /// OAuth client ID.
    pub client_id: String,
    /// OAuth client secret.
    pub client_secret: String,
    /// Redirect URI registered with Google.
    pub redirect_uri: String,
}

/// Gemini text-generation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiSettings {
    /// API key.
    pub api_key: String,
    /// Model identifier.
    pub model: String,
}

/// Firecrawl web-crawl configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlSettings {
    /// API key.
    pub api_key: String,
    /// Base URL, overridable for self-hosted deployments.
    pub base_url: String,
}

/// Logo lookup configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogoSettings {
    /// Logo.dev publishable token. Lookups are skipped when absent.
    pub token: Option<String>,
}

/// Session cookie configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CookieSettings {
    /// Cookie name on the client.
    pub name: String,
    /// HMAC signing key.
    pub signing_key: String,
    /// Days until the cookie (and session) expires.
    pub expiry_days: f64,
}

/// Inbox scan tunables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanSettings {
    /// Hard cap on messages fetched per scan.
    pub max_emails: usize,
    /// Scan window when the request does not specify dates.
    pub default_window_days: i64,
    /// Idle seconds before a session's in-memory state is reaped.
    pub session_idle_timeout_secs: u64,
}

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    /// Address and port to bind, e.g. `127.0.0.1:8501`.
    pub bind_addr: String,
}
