//! Application configuration

use std::env;

/// Application configuration loaded from environment variables
///
/// Loaded once at startup and passed by injection; a missing signing secret
/// or mail credential stops the process before it accepts traffic.
#[derive(Debug, Clone)]
pub struct Config {
    // Server
    pub bind_address: String,
    pub public_url: String,

    // Database
    pub database_url: String,
    pub database_max_connections: u32,

    // Authentication
    pub jwt_secret: String,

    // Email
    pub resend_api_key: String,
    pub email_from: String,
    pub contact_inbox: String,

    // Rate limiting (sensitive routes)
    pub rate_limit_max_requests: u32,
    pub rate_limit_window_secs: i64,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            // Server
            bind_address: env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:3000".to_string()),
            public_url: env::var("PUBLIC_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),

            // Database
            database_url: env::var("DATABASE_URL")
                .map_err(|_| ConfigError::Missing("DATABASE_URL"))?,
            database_max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .unwrap_or(10),

            // Authentication
            jwt_secret: {
                let secret =
                    env::var("JWT_SECRET").map_err(|_| ConfigError::Missing("JWT_SECRET"))?;
                // A short signing key makes session tokens forgeable
                if secret.len() < 32 {
                    return Err(ConfigError::WeakSecret(
                        "JWT_SECRET must be at least 32 characters",
                    ));
                }
                secret
            },

            // Email: delivery of verification codes is part of the trust
            // path, so a missing key is a startup error, not a per-request one
            resend_api_key: env::var("RESEND_API_KEY")
                .map_err(|_| ConfigError::Missing("RESEND_API_KEY"))?,
            email_from: env::var("EMAIL_FROM")
                .unwrap_or_else(|_| "Cradle <noreply@localhost>".to_string()),
            contact_inbox: env::var("CONTACT_INBOX")
                .unwrap_or_else(|_| "support@localhost".to_string()),

            // Rate limiting
            rate_limit_max_requests: env::var("RATE_LIMIT_MAX_REQUESTS")
                .unwrap_or_else(|_| "100".to_string())
                .parse()
                .unwrap_or(100),
            rate_limit_window_secs: env::var("RATE_LIMIT_WINDOW_SECS")
                .unwrap_or_else(|_| "900".to_string())
                .parse()
                .unwrap_or(900),
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),
    #[error("Weak secret: {0}")]
    WeakSecret(&'static str),
}
