//! API routes

pub mod auth;
pub mod babies;
pub mod contact;
pub mod expenses;
pub mod health;
pub mod milestones;
pub mod reads;
pub mod schedules;
pub mod scriptures;

use axum::{
    extract::DefaultBodyLimit,
    http::HeaderMap,
    middleware,
    routing::{get, post},
    Router,
};

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    auth::require_auth,
    error::{ApiError, ApiResult},
    rate_limit,
    state::AppState,
};

/// Confirm a referenced baby belongs to the caller
///
/// Client-supplied ids are never trusted for ownership on their own.
pub(crate) async fn verify_baby_ownership(
    pool: &PgPool,
    baby_id: Uuid,
    user_id: Uuid,
) -> ApiResult<()> {
    let owned: Option<(bool,)> =
        sqlx::query_as("SELECT EXISTS(SELECT 1 FROM babies WHERE id = $1 AND user_id = $2)")
            .bind(baby_id)
            .bind(user_id)
            .fetch_optional(pool)
            .await?;

    if owned.map(|r| r.0).unwrap_or(false) {
        Ok(())
    } else {
        Err(ApiError::Validation("Unknown baby".to_string()))
    }
}

/// Extract client IP address from request headers.
/// Checks common proxy headers in order of preference.
pub fn extract_client_ip(headers: &HeaderMap) -> Option<String> {
    headers
        .get("cf-connecting-ip") // Cloudflare
        .or_else(|| headers.get("x-real-ip"))
        .or_else(|| headers.get("x-forwarded-for"))
        .and_then(|h| h.to_str().ok())
        .map(|s| s.split(',').next().unwrap_or(s).trim().to_string())
}

/// Create all API routes
pub fn create_router(state: AppState) -> Router {
    let auth_state = state.auth_state();
    let limiter = state.rate_limiter.clone();

    // Health check routes (at root level for infrastructure monitoring)
    let health_routes = Router::new()
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness));

    // Abuse-prone routes: public, throttled per client
    let sensitive_routes = Router::new()
        .route("/auth/signup", post(auth::signup))
        .route("/auth/login", post(auth::login))
        .route("/auth/verify-email", post(auth::verify_email))
        .route("/auth/resend-code", post(auth::resend_code))
        .route("/contact", post(contact::submit_contact))
        .route_layer(middleware::from_fn_with_state(
            limiter,
            rate_limit::throttle,
        ));

    // Protected routes (auth required) - under /api/v1
    let protected_routes = Router::new()
        .route("/auth/me", get(auth::me))
        // Baby profiles
        .route("/babies", get(babies::list_babies))
        .route("/babies", post(babies::create_baby))
        // Care schedules
        .route("/schedules", get(schedules::list_schedules))
        .route("/schedules", post(schedules::create_schedule))
        // Expenses
        .route("/expenses", get(expenses::list_expenses))
        .route("/expenses", post(expenses::create_expense))
        // Milestones
        .route("/milestones", get(milestones::list_milestones))
        .route("/milestones", post(milestones::create_milestone))
        // Daily content
        .route("/reads", get(reads::list_reads))
        .route("/reads", post(reads::create_read))
        .route("/scriptures", get(scriptures::list_scriptures))
        .route("/scriptures", post(scriptures::create_scripture))
        .layer(middleware::from_fn_with_state(auth_state, require_auth));

    let api_v1_routes = Router::new().merge(sensitive_routes).merge(protected_routes);

    Router::new()
        .merge(health_routes)
        .nest("/api/v1", api_v1_routes)
        // Global request body size limit to prevent DoS via large payloads
        .layer(DefaultBodyLimit::max(2 * 1024 * 1024)) // 2MB
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_extract_client_ip_prefers_cloudflare() {
        let mut headers = HeaderMap::new();
        headers.insert("cf-connecting-ip", HeaderValue::from_static("203.0.113.7"));
        headers.insert("x-forwarded-for", HeaderValue::from_static("198.51.100.2"));

        assert_eq!(
            extract_client_ip(&headers),
            Some("203.0.113.7".to_string())
        );
    }

    #[test]
    fn test_extract_client_ip_takes_first_forwarded_hop() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("203.0.113.7, 10.0.0.1"),
        );

        assert_eq!(
            extract_client_ip(&headers),
            Some("203.0.113.7".to_string())
        );
    }

    #[test]
    fn test_extract_client_ip_missing() {
        let headers = HeaderMap::new();
        assert_eq!(extract_client_ip(&headers), None);
    }
}
