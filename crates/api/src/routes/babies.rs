//! Baby profile routes

use axum::{
    extract::{Extension, State},
    http::StatusCode,
    Json,
};
use cradle_shared::Baby;
use serde::Deserialize;
use time::Date;
use uuid::Uuid;

use crate::{
    auth::AuthUser,
    error::{ApiError, ApiResult},
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct CreateBabyRequest {
    pub name: String,
    pub date_of_birth: Date,
    pub gender: Option<String>,
}

/// Create a baby profile for the authenticated user
pub async fn create_baby(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(req): Json<CreateBabyRequest>,
) -> ApiResult<(StatusCode, Json<Baby>)> {
    if req.name.trim().is_empty() {
        return Err(ApiError::Validation("Baby name is required".to_string()));
    }

    let baby: Baby = sqlx::query_as(
        r#"
        INSERT INTO babies (id, user_id, name, date_of_birth, gender)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id, user_id, name, date_of_birth, gender, created_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(auth_user.user_id)
    .bind(req.name.trim())
    .bind(req.date_of_birth)
    .bind(&req.gender)
    .fetch_one(&state.pool)
    .await?;

    Ok((StatusCode::CREATED, Json(baby)))
}

/// List the authenticated user's baby profiles
pub async fn list_babies(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> ApiResult<Json<Vec<Baby>>> {
    let babies: Vec<Baby> = sqlx::query_as(
        r#"
        SELECT id, user_id, name, date_of_birth, gender, created_at
        FROM babies
        WHERE user_id = $1
        ORDER BY created_at DESC
        "#,
    )
    .bind(auth_user.user_id)
    .fetch_all(&state.pool)
    .await?;

    Ok(Json(babies))
}
