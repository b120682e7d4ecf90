//! Rate limiting for abuse-prone routes
//!
//! Fixed-window counters kept in process memory, one window per client key.
//! Requests beyond the ceiling are rejected, not queued. Counters are
//! per-process; a multi-instance deployment would need a shared store.

use std::collections::HashMap;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use time::OffsetDateTime;

use crate::error::ApiError;
use crate::routes::extract_client_ip;

/// Rate limit check result
#[derive(Debug, Clone)]
pub struct RateLimitDecision {
    pub allowed: bool,
    pub remaining: u32,
    pub retry_after_seconds: Option<u32>,
}

/// In-memory fixed-window rate limiter
///
/// Store: key -> (count, window_start). Windows are aligned to the epoch so
/// every key in the same wall-clock window shares a start time; the count
/// resets when the window elapses.
pub struct RateLimiter {
    max_requests: u32,
    window_secs: i64,
    windows: Arc<tokio::sync::RwLock<HashMap<String, (u32, i64)>>>,
}

impl RateLimiter {
    pub fn new(max_requests: u32, window_secs: i64) -> Self {
        Self {
            max_requests,
            window_secs,
            windows: Arc::new(tokio::sync::RwLock::new(HashMap::new())),
        }
    }

    /// Check and increment the counter for a client key
    pub async fn check(&self, key: &str) -> RateLimitDecision {
        let now = OffsetDateTime::now_utc().unix_timestamp();
        self.check_at(key, now).await
    }

    /// Check and increment at an explicit timestamp
    ///
    /// The increment-and-compare happens under a single write-lock
    /// acquisition, so concurrent requests from one client cannot both
    /// observe the last free slot.
    async fn check_at(&self, key: &str, now: i64) -> RateLimitDecision {
        let window_start = now - (now % self.window_secs);

        let mut windows = self.windows.write().await;
        let entry = windows.entry(key.to_string()).or_insert((0, window_start));

        // Reset if in new window
        if entry.1 != window_start {
            entry.0 = 0;
            entry.1 = window_start;
        }

        let allowed = entry.0 < self.max_requests;
        if allowed {
            entry.0 += 1;
        }

        let remaining = self.max_requests.saturating_sub(entry.0);
        let retry_after = if !allowed {
            Some((window_start + self.window_secs - now) as u32)
        } else {
            None
        };

        RateLimitDecision {
            allowed,
            remaining,
            retry_after_seconds: retry_after,
        }
    }

    /// Drop windows older than the current one (call periodically)
    pub async fn cleanup(&self) {
        let now = OffsetDateTime::now_utc().unix_timestamp();
        let cutoff = now - self.window_secs;

        let mut windows = self.windows.write().await;
        windows.retain(|_, (_, start)| *start > cutoff);
    }
}

impl Clone for RateLimiter {
    fn clone(&self) -> Self {
        Self {
            max_requests: self.max_requests,
            window_secs: self.window_secs,
            windows: Arc::clone(&self.windows),
        }
    }
}

/// Throttle middleware for sensitive routes (signup, login, verify, contact)
///
/// Buckets by client network identity. Requests with no resolvable address
/// share one bucket rather than bypassing the limiter.
pub async fn throttle(
    State(limiter): State<RateLimiter>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let client_key = extract_client_ip(req.headers()).unwrap_or_else(|| "unknown".to_string());

    let decision = limiter.check(&client_key).await;
    if !decision.allowed {
        let retry_after = decision.retry_after_seconds.unwrap_or(60);
        tracing::warn!(client = %client_key, "Rate limit exceeded");
        return Err(ApiError::TooManyRequests(format!(
            "Too many requests. Please try again in {} seconds.",
            retry_after
        )));
    }

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body, http::Request as HttpRequest, http::StatusCode,
        middleware::from_fn_with_state, routing::post, Router,
    };
    use tower::ServiceExt;

    const WINDOW: i64 = 900;

    #[tokio::test]
    async fn test_allows_up_to_ceiling() {
        let limiter = RateLimiter::new(100, WINDOW);
        let now = 1_000_000 - (1_000_000 % WINDOW);

        for i in 0..100 {
            let decision = limiter.check_at("203.0.113.7", now).await;
            assert!(decision.allowed, "Request {} should be allowed", i);
        }
    }

    #[tokio::test]
    async fn test_rejects_beyond_ceiling() {
        let limiter = RateLimiter::new(100, WINDOW);
        let now = 1_000_000 - (1_000_000 % WINDOW);

        for _ in 0..100 {
            limiter.check_at("203.0.113.7", now).await;
        }

        // The 101st request in the same window is rejected
        let decision = limiter.check_at("203.0.113.7", now).await;
        assert!(!decision.allowed);
        assert!(decision.retry_after_seconds.is_some());
    }

    #[tokio::test]
    async fn test_new_window_resets_count() {
        let limiter = RateLimiter::new(100, WINDOW);
        let now = 1_000_000 - (1_000_000 % WINDOW);

        for _ in 0..=100 {
            limiter.check_at("203.0.113.7", now).await;
        }
        assert!(!limiter.check_at("203.0.113.7", now).await.allowed);

        // First request after the window elapses is accepted
        let decision = limiter.check_at("203.0.113.7", now + WINDOW).await;
        assert!(decision.allowed);
        assert_eq!(decision.remaining, 99);
    }

    #[tokio::test]
    async fn test_keys_are_independent() {
        let limiter = RateLimiter::new(3, WINDOW);
        let now = 1_000_000;

        for _ in 0..3 {
            limiter.check_at("203.0.113.7", now).await;
        }
        assert!(!limiter.check_at("203.0.113.7", now).await.allowed);

        // A different client is unaffected
        assert!(limiter.check_at("198.51.100.2", now).await.allowed);
    }

    #[tokio::test]
    async fn test_clone_shares_state() {
        let limiter = RateLimiter::new(2, WINDOW);
        let cloned = limiter.clone();
        let now = 1_000_000;

        limiter.check_at("203.0.113.7", now).await;
        cloned.check_at("203.0.113.7", now).await;

        assert!(!limiter.check_at("203.0.113.7", now).await.allowed);
    }

    #[tokio::test]
    async fn test_cleanup_drops_stale_windows() {
        let limiter = RateLimiter::new(2, WINDOW);
        let stale = OffsetDateTime::now_utc().unix_timestamp() - 2 * WINDOW;

        limiter.check_at("203.0.113.7", stale).await;
        limiter.cleanup().await;

        let windows = limiter.windows.read().await;
        assert!(windows.is_empty());
    }

    #[tokio::test]
    async fn test_throttle_middleware_rejects_with_429() {
        let limiter = RateLimiter::new(2, WINDOW);
        let app = Router::new()
            .route("/login", post(|| async { "ok" }))
            .layer(from_fn_with_state(limiter, throttle));

        for _ in 0..2 {
            let response = app
                .clone()
                .oneshot(
                    HttpRequest::builder()
                        .method("POST")
                        .uri("/login")
                        .header("x-forwarded-for", "203.0.113.7")
                        .body(Body::empty())
                        .unwrap(),
                )
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }

        let response = app
            .oneshot(
                HttpRequest::builder()
                    .method("POST")
                    .uri("/login")
                    .header("x-forwarded-for", "203.0.113.7")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    }
}
