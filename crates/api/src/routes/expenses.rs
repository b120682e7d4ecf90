//! Expense routes

use axum::{
    extract::{Extension, State},
    http::StatusCode,
    Json,
};
use cradle_shared::Expense;
use serde::Deserialize;
use time::Date;
use uuid::Uuid;

use crate::{
    auth::AuthUser,
    error::{ApiError, ApiResult},
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct CreateExpenseRequest {
    pub title: String,
    pub amount_cents: i64,
    pub incurred_on: Date,
}

/// Record an expense for the authenticated user
pub async fn create_expense(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(req): Json<CreateExpenseRequest>,
) -> ApiResult<(StatusCode, Json<Expense>)> {
    if req.title.trim().is_empty() {
        return Err(ApiError::Validation("Expense title is required".to_string()));
    }

    if req.amount_cents < 0 {
        return Err(ApiError::Validation(
            "Expense amount cannot be negative".to_string(),
        ));
    }

    let expense: Expense = sqlx::query_as(
        r#"
        INSERT INTO expenses (id, user_id, title, amount_cents, incurred_on)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id, user_id, title, amount_cents, incurred_on, created_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(auth_user.user_id)
    .bind(req.title.trim())
    .bind(req.amount_cents)
    .bind(req.incurred_on)
    .fetch_one(&state.pool)
    .await?;

    Ok((StatusCode::CREATED, Json(expense)))
}

/// List the authenticated user's expenses
pub async fn list_expenses(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> ApiResult<Json<Vec<Expense>>> {
    let expenses: Vec<Expense> = sqlx::query_as(
        r#"
        SELECT id, user_id, title, amount_cents, incurred_on, created_at
        FROM expenses
        WHERE user_id = $1
        ORDER BY incurred_on DESC, created_at DESC
        "#,
    )
    .bind(auth_user.user_id)
    .fetch_all(&state.pool)
    .await?;

    Ok(Json(expenses))
}
