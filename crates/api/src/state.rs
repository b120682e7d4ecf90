//! Shared application state

use sqlx::PgPool;
use std::sync::Arc;

use crate::auth::middleware::AuthState;
use crate::auth::JwtManager;
use crate::config::Config;
use crate::email::{Mailer, MailerConfig};
use crate::rate_limit::RateLimiter;

/// Application state shared across all handlers
///
/// Everything in here is cheap to clone: the pool and limiter share their
/// state through `Arc`, the rest is immutable after startup.
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<Config>,
    pub jwt: JwtManager,
    pub mailer: Mailer,
    pub rate_limiter: RateLimiter,
}

impl AppState {
    pub fn new(pool: PgPool, config: Config) -> Self {
        let jwt = JwtManager::new(&config.jwt_secret);
        let mailer = Mailer::new(MailerConfig::from_config(&config));
        let rate_limiter = RateLimiter::new(
            config.rate_limit_max_requests,
            config.rate_limit_window_secs,
        );

        Self {
            pool,
            config: Arc::new(config),
            jwt,
            mailer,
            rate_limiter,
        }
    }

    /// State subset consumed by the auth middleware
    pub fn auth_state(&self) -> AuthState {
        AuthState {
            jwt: self.jwt.clone(),
        }
    }
}
