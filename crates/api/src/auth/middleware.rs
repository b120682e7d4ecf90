//! Request authentication middleware

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::auth::jwt::JwtManager;
use crate::error::ApiError;

/// State required by the auth middleware
///
/// Carved out of `AppState` so routers under test don't need a database pool.
#[derive(Clone)]
pub struct AuthState {
    pub jwt: JwtManager,
}

/// Verified caller identity, injected as a request extension
///
/// Downstream handlers must treat this as the sole source of caller identity;
/// client-supplied id fields are never trusted for ownership checks.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: uuid::Uuid,
    pub email: String,
}

/// Require a valid bearer token on the request
///
/// Two-tier failure: no credentials presented at all is `Unauthorized` (401),
/// credentials presented but failing verification is `Forbidden` (403).
pub async fn require_auth(
    State(state): State<AuthState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = req
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .ok_or(ApiError::Unauthorized)?;

    let claims = state.jwt.verify(token).map_err(|_| ApiError::Forbidden)?;

    req.extensions_mut().insert(AuthUser {
        user_id: claims.sub,
        email: claims.email,
    });

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body, extract::Extension, http::Request as HttpRequest, http::StatusCode,
        middleware::from_fn_with_state, routing::get, Router,
    };
    use tower::ServiceExt;
    use uuid::Uuid;

    async fn whoami(Extension(user): Extension<AuthUser>) -> String {
        user.email
    }

    fn test_router(jwt: JwtManager) -> Router {
        Router::new()
            .route("/whoami", get(whoami))
            .layer(from_fn_with_state(AuthState { jwt }, require_auth))
    }

    fn jwt() -> JwtManager {
        JwtManager::new("test-secret-key-at-least-32-chars!!")
    }

    #[tokio::test]
    async fn test_missing_token_is_unauthorized() {
        let app = test_router(jwt());

        let response = app
            .oneshot(
                HttpRequest::builder()
                    .uri("/whoami")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_non_bearer_scheme_is_unauthorized() {
        let app = test_router(jwt());

        let response = app
            .oneshot(
                HttpRequest::builder()
                    .uri("/whoami")
                    .header("Authorization", "Basic dXNlcjpwYXNz")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_invalid_token_is_forbidden() {
        let app = test_router(jwt());

        let response = app
            .oneshot(
                HttpRequest::builder()
                    .uri("/whoami")
                    .header("Authorization", "Bearer not-a-real-token")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_truncated_token_is_forbidden() {
        let jwt = jwt();
        let token = jwt.issue(Uuid::new_v4(), "ama@x.com").unwrap();
        let app = test_router(jwt);

        let truncated = &token[..token.len() - 1];
        let response = app
            .oneshot(
                HttpRequest::builder()
                    .uri("/whoami")
                    .header("Authorization", format!("Bearer {}", truncated))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_valid_token_reaches_handler_with_claims() {
        let jwt = jwt();
        let token = jwt.issue(Uuid::new_v4(), "ama@x.com").unwrap();
        let app = test_router(jwt);

        let response = app
            .oneshot(
                HttpRequest::builder()
                    .uri("/whoami")
                    .header("Authorization", format!("Bearer {}", token))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let body = http_body_util::BodyExt::collect(response.into_body())
            .await
            .unwrap()
            .to_bytes();
        assert_eq!(&body[..], b"ama@x.com");
    }
}
