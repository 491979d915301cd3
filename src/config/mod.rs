//! Configuration management.
//!
//! All credentials and tunables come from environment variables; there is
//! no settings file. See [`Settings::from_env`] for the variable names.

mod settings;

pub use settings::{
    ConfigError, CookieSettings, CrawlSettings, GeminiSettings, GoogleSettings, LogoSettings,
    ScanSettings, ServerSettings, Settings,
};
