//! Centralized configuration management.
//!
//! All environment variables are read once at startup through this module and
//! missing required values fail startup immediately.

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("Missing required {0} env var")]
    Missing(&'static str),
    #[error("Invalid value for {0}: {1}")]
    Invalid(&'static str, String),
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// SQLite database URL (default: "sqlite:scrobblist.db")
    pub database_url: String,
    /// Last.fm API key (required)
    pub lastfm_api_key: String,
    /// Spotify application credentials (required)
    pub spotify_client_id: String,
    pub spotify_client_secret: String,
    /// Where Spotify sends the user after consent; must point at `/callback`
    pub spotify_redirect_uri: String,
    /// Optional proxy for all outbound provider traffic
    pub proxy_url: Option<String>,
    /// HTTP server port (default: 5000)
    pub port: u16,
    /// HTTP server bind address (default: "0.0.0.0")
    pub ip: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup; `from_env` passes the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let required = |key: &'static str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or(ConfigError::Missing(key))
        };

        let port = match lookup("PORT") {
            Some(p) => p
                .trim()
                .parse()
                .map_err(|_| ConfigError::Invalid("PORT", p.clone()))?,
            None => 5000,
        };

        Ok(Self {
            database_url: lookup("DATABASE_URL")
                .unwrap_or_else(|| "sqlite:scrobblist.db".to_string()),
            lastfm_api_key: required("LASTFM_API_KEY")?,
            spotify_client_id: required("SPOTIFY_CLIENT_ID")?,
            spotify_client_secret: required("SPOTIFY_CLIENT_SECRET")?,
            spotify_redirect_uri: required("SPOTIFY_REDIRECT_URI")?,
            proxy_url: lookup("PROXY_URL").filter(|v| !v.trim().is_empty()),
            port,
            ip: lookup("IP").unwrap_or_else(|| "0.0.0.0".to_string()),
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.ip, self.port)
    }
}
