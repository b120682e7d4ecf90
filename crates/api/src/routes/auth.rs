//! Account lifecycle routes: signup, email verification, login

use axum::{
    extract::{Extension, State},
    http::StatusCode,
    Json,
};
use cradle_shared::User;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::{
    auth::{generate_code, hash_secret, validate_password, verify_secret, AuthUser},
    error::{ApiError, ApiResult},
    state::AppState,
};

// =============================================================================
// Request/Response Types
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct VerifyEmailRequest {
    pub email: String,
    pub code: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct ResendCodeRequest {
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct SignupResponse {
    pub message: String,
    pub redirect: String,
}

/// Response for a successful login or verification: token plus minimal
/// account info, never the password hash or any code material.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub message: String,
    pub token: String,
    pub user: UserResponse,
    pub redirect: String,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

// =============================================================================
// Database Row Types
// =============================================================================

#[derive(Debug, FromRow)]
struct UserProfileRow {
    id: Uuid,
    name: String,
    email: String,
}

// =============================================================================
// Handlers
// =============================================================================

/// Register a new account
///
/// The account is created *pending* with a hashed one-time code; the
/// plaintext code goes out by email only. A delivery failure does not roll
/// the account back - the caller gets a distinct error and a resend path.
pub async fn signup(
    State(state): State<AppState>,
    Json(req): Json<SignupRequest>,
) -> ApiResult<(StatusCode, Json<SignupResponse>)> {
    validate_signup_fields(&req.name, &req.email, &req.password)?;

    // Check if email already exists
    let exists: Option<(bool,)> =
        sqlx::query_as("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
            .bind(&req.email)
            .fetch_optional(&state.pool)
            .await?;

    if exists.map(|r| r.0).unwrap_or(false) {
        return Err(ApiError::EmailAlreadyExists);
    }

    // Hash the password and a fresh verification code
    let password_hash = hash_secret(&req.password).map_err(|_| ApiError::Internal)?;
    let code = generate_code();
    let code_hash = hash_secret(&code).map_err(|_| ApiError::Internal)?;

    let user_id = Uuid::new_v4();

    // The unique index on email is the real arbiter: a concurrent signup that
    // slipped past the existence check fails here and maps to the same outcome
    sqlx::query(
        r#"
        INSERT INTO users (id, email, name, password_hash, is_verified, verification_code_hash)
        VALUES ($1, $2, $3, $4, FALSE, $5)
        "#,
    )
    .bind(user_id)
    .bind(&req.email)
    .bind(req.name.trim())
    .bind(&password_hash)
    .bind(&code_hash)
    .execute(&state.pool)
    .await
    .map_err(|e| {
        if let sqlx::Error::Database(db_err) = &e {
            if db_err.code().as_deref() == Some("23505") {
                return ApiError::EmailAlreadyExists;
            }
        }
        e.into()
    })?;

    tracing::info!(user_id = %user_id, "signup: Account created, pending verification");

    // Deliver the code. The account stays created either way; failure is its
    // own outcome so the caller knows to use the resend path.
    if let Err(e) = state
        .mailer
        .send_verification_code(&req.email, req.name.trim(), &code)
        .await
    {
        tracing::error!(user_id = %user_id, error = %e, "signup: Verification email failed");
        return Err(ApiError::Notification(
            "Your account was created but the verification email could not be sent. \
             Request a new code to finish signing up."
                .to_string(),
        ));
    }

    Ok((
        StatusCode::CREATED,
        Json(SignupResponse {
            message: "Account created. Check your email for a verification code.".to_string(),
            redirect: "/verify-email".to_string(),
        }),
    ))
}

/// Verify an email address with the one-time code and log the user in
pub async fn verify_email(
    State(state): State<AppState>,
    Json(req): Json<VerifyEmailRequest>,
) -> ApiResult<Json<AuthResponse>> {
    if req.email.trim().is_empty() || req.code.trim().is_empty() {
        return Err(ApiError::Validation(
            "Email and verification code are required".to_string(),
        ));
    }

    let user: User = sqlx::query_as(
        r#"
        SELECT id, email, name, password_hash, is_verified, verification_code_hash, created_at
        FROM users
        WHERE email = $1
        "#,
    )
    .bind(&req.email)
    .fetch_optional(&state.pool)
    .await?
    .ok_or(ApiError::NotFound)?;

    // An already-active account has no stored hash, so any code fails here;
    // codes are usable at most once
    check_code(&req.code, user.verification_code_hash.as_deref())?;

    // Transition to active: flag set, code hash cleared
    sqlx::query(
        r#"
        UPDATE users
        SET is_verified = TRUE, verification_code_hash = NULL
        WHERE id = $1
        "#,
    )
    .bind(user.id)
    .execute(&state.pool)
    .await?;

    tracing::info!(user_id = %user.id, "verify_email: Account activated");

    // Auto-login on verify
    let token = state
        .jwt
        .issue(user.id, &user.email)
        .map_err(|_| ApiError::Internal)?;

    // Confirmation email is best-effort (fire and forget)
    let mailer = state.mailer.clone();
    let email_to = user.email.clone();
    let name = user.name.clone();
    tokio::spawn(async move {
        if let Err(e) = mailer.send_verified_confirmation(&email_to, &name).await {
            tracing::warn!(error = %e, "verify_email: Confirmation email failed");
        }
    });

    Ok(Json(AuthResponse {
        message: "Email verified successfully.".to_string(),
        token,
        user: UserResponse {
            id: user.id,
            name: user.name,
            email: user.email,
        },
        redirect: "/dashboard".to_string(),
    }))
}

/// Login with email and password
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    if req.email.trim().is_empty() || req.password.is_empty() {
        return Err(ApiError::Validation(
            "Email and password are required".to_string(),
        ));
    }

    // Unknown email and wrong password produce the same response, so a caller
    // cannot probe which addresses have accounts
    let user: User = sqlx::query_as(
        r#"
        SELECT id, email, name, password_hash, is_verified, verification_code_hash, created_at
        FROM users
        WHERE email = $1
        "#,
    )
    .bind(&req.email)
    .fetch_optional(&state.pool)
    .await?
    .ok_or(ApiError::InvalidCredentials)?;

    // Verification state is deliberately distinguishable - it reveals nothing
    // about secret correctness
    if !user.is_verified {
        return Err(ApiError::NotVerified);
    }

    let valid = verify_secret(&req.password, &user.password_hash).map_err(|e| {
        tracing::error!(error = %e, "login: Password verification failed");
        ApiError::Internal
    })?;

    if !valid {
        tracing::warn!(user_id = %user.id, "login: Invalid password");
        return Err(ApiError::InvalidCredentials);
    }

    let token = state
        .jwt
        .issue(user.id, &user.email)
        .map_err(|_| ApiError::Internal)?;

    tracing::info!(user_id = %user.id, "login: Login successful");

    Ok(Json(AuthResponse {
        message: "Login successful.".to_string(),
        token,
        user: UserResponse {
            id: user.id,
            name: user.name,
            email: user.email,
        },
        redirect: "/dashboard".to_string(),
    }))
}

/// Re-send a verification code
///
/// Rotates the stored code for pending accounts. Always answers with the
/// same message so the endpoint is not an enumeration oracle.
pub async fn resend_code(
    State(state): State<AppState>,
    Json(req): Json<ResendCodeRequest>,
) -> ApiResult<Json<MessageResponse>> {
    if req.email.trim().is_empty() {
        return Err(ApiError::Validation("Email is required".to_string()));
    }

    let user: Option<User> = sqlx::query_as(
        r#"
        SELECT id, email, name, password_hash, is_verified, verification_code_hash, created_at
        FROM users
        WHERE email = $1
        "#,
    )
    .bind(&req.email)
    .fetch_optional(&state.pool)
    .await?;

    if let Some(user) = user {
        if !user.is_verified {
            let code = generate_code();
            let code_hash = hash_secret(&code).map_err(|_| ApiError::Internal)?;

            // Old code stops working the moment the new hash lands
            sqlx::query("UPDATE users SET verification_code_hash = $1 WHERE id = $2")
                .bind(&code_hash)
                .bind(user.id)
                .execute(&state.pool)
                .await?;

            tracing::info!(user_id = %user.id, "resend_code: Verification code rotated");

            let mailer = state.mailer.clone();
            tokio::spawn(async move {
                if let Err(e) = mailer
                    .send_verification_code(&user.email, &user.name, &code)
                    .await
                {
                    tracing::error!(user_id = %user.id, error = %e, "resend_code: Email failed");
                }
            });
        }
    }

    Ok(Json(MessageResponse {
        message: "If an account exists with that email and is not yet verified, \
                  a new verification code has been sent."
            .to_string(),
    }))
}

/// Get the current user's profile
pub async fn me(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> ApiResult<Json<UserResponse>> {
    let user: UserProfileRow = sqlx::query_as("SELECT id, name, email FROM users WHERE id = $1")
        .bind(auth_user.user_id)
        .fetch_one(&state.pool)
        .await?;

    Ok(Json(UserResponse {
        id: user.id,
        name: user.name,
        email: user.email,
    }))
}

// =============================================================================
// Helpers
// =============================================================================

/// Validate signup input: presence, email shape, length bounds
fn validate_signup_fields(name: &str, email: &str, password: &str) -> ApiResult<()> {
    if name.trim().is_empty() || email.trim().is_empty() || password.is_empty() {
        return Err(ApiError::Validation(
            "Name, email and password are required".to_string(),
        ));
    }

    if name.len() > 255 {
        return Err(ApiError::Validation(
            "Name must be at most 255 characters".to_string(),
        ));
    }

    if email.len() > 255 {
        return Err(ApiError::Validation(
            "Email must be at most 255 characters".to_string(),
        ));
    }

    if !is_valid_email(email) {
        return Err(ApiError::Validation("Invalid email format".to_string()));
    }

    validate_password(password).map_err(|e| ApiError::Validation(e.to_string()))?;

    Ok(())
}

/// Compare a submitted code against the stored hash
///
/// A missing hash (already-verified account) fails the same way as a
/// mismatch; a corrupt hash is an internal failure, not a hint.
fn check_code(code: &str, stored_hash: Option<&str>) -> ApiResult<()> {
    let hash = stored_hash.ok_or(ApiError::InvalidCode)?;

    match verify_secret(code, hash) {
        Ok(true) => Ok(()),
        Ok(false) => Err(ApiError::InvalidCode),
        Err(e) => {
            tracing::error!(error = %e, "check_code: Hash verification failed");
            Err(ApiError::Internal)
        }
    }
}

/// Validates email address shape (simplified RFC 5322)
fn is_valid_email(email: &str) -> bool {
    let email = email.trim();

    if email.is_empty() || email.len() > 254 {
        return false;
    }

    let parts: Vec<&str> = email.split('@').collect();
    if parts.len() != 2 {
        return false;
    }

    let local = parts[0];
    let domain = parts[1];

    // Local part validation
    if local.is_empty() || local.len() > 64 {
        return false;
    }
    if local.starts_with('.') || local.ends_with('.') || local.contains("..") {
        return false;
    }
    if !local
        .chars()
        .all(|c| c.is_alphanumeric() || ".+-_".contains(c))
    {
        return false;
    }

    // Domain validation
    if domain.is_empty() || domain.len() > 255 {
        return false;
    }
    if domain.starts_with('-') || domain.ends_with('-') {
        return false;
    }
    if domain.starts_with('.') || domain.ends_with('.') || domain.contains("..") {
        return false;
    }
    if domain.split('.').count() < 2 {
        return false;
    }
    if !domain
        .chars()
        .all(|c| c.is_alphanumeric() || c == '.' || c == '-')
    {
        return false;
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_emails() {
        assert!(is_valid_email("ama@x.com"));
        assert!(is_valid_email("first.last@example.co.uk"));
        assert!(is_valid_email("user+tag@domain.org"));
        assert!(is_valid_email("under_score@host.net"));
    }

    #[test]
    fn test_invalid_emails() {
        assert!(!is_valid_email(""));
        assert!(!is_valid_email("plainaddress"));
        assert!(!is_valid_email("@no-local.com"));
        assert!(!is_valid_email("no-domain@"));
        assert!(!is_valid_email("two@@ats.com"));
        assert!(!is_valid_email(".leading@dot.com"));
        assert!(!is_valid_email("trailing.@dot.com"));
        assert!(!is_valid_email("double..dot@host.com"));
        assert!(!is_valid_email("user@no-tld"));
        assert!(!is_valid_email("user@-host.com"));
        assert!(!is_valid_email("spaces in@host.com"));
    }

    #[test]
    fn test_signup_field_validation() {
        // Presence
        assert!(matches!(
            validate_signup_fields("", "ama@x.com", "password1"),
            Err(ApiError::Validation(_))
        ));
        assert!(matches!(
            validate_signup_fields("Ama", "", "password1"),
            Err(ApiError::Validation(_))
        ));
        assert!(matches!(
            validate_signup_fields("Ama", "ama@x.com", ""),
            Err(ApiError::Validation(_))
        ));

        // Length bounds
        let long = "a".repeat(256);
        assert!(matches!(
            validate_signup_fields(&long, "ama@x.com", "password1"),
            Err(ApiError::Validation(_))
        ));
        let long_email = format!("{}@x.com", "a".repeat(250));
        assert!(matches!(
            validate_signup_fields("Ama", &long_email, "password1"),
            Err(ApiError::Validation(_))
        ));
        assert!(matches!(
            validate_signup_fields("Ama", "ama@x.com", "short"),
            Err(ApiError::Validation(_))
        ));

        // Shape
        assert!(matches!(
            validate_signup_fields("Ama", "not-an-email", "password1"),
            Err(ApiError::Validation(_))
        ));

        // Valid
        assert!(validate_signup_fields("Ama", "ama@x.com", "password1").is_ok());
    }

    #[test]
    fn test_check_code_matches_stored_hash() {
        let hash = hash_secret("483920").unwrap();

        assert!(check_code("483920", Some(&hash)).is_ok());
        assert!(matches!(
            check_code("000000", Some(&hash)),
            Err(ApiError::InvalidCode)
        ));
    }

    #[test]
    fn test_check_code_with_cleared_hash_fails() {
        // Once an account is active the hash is gone; re-verification with the
        // original (or any) code must fail
        assert!(matches!(
            check_code("483920", None),
            Err(ApiError::InvalidCode)
        ));
    }

    #[test]
    fn test_check_code_corrupt_hash_is_internal() {
        assert!(matches!(
            check_code("483920", Some("garbage")),
            Err(ApiError::Internal)
        ));
    }
}
