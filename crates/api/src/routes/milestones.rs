//! Milestone routes

use axum::{
    extract::{Extension, State},
    http::StatusCode,
    Json,
};
use cradle_shared::Milestone;
use serde::Deserialize;
use time::Date;
use uuid::Uuid;

use crate::{
    auth::AuthUser,
    error::{ApiError, ApiResult},
    state::AppState,
};

use super::verify_baby_ownership;

#[derive(Debug, Deserialize)]
pub struct CreateMilestoneRequest {
    pub baby_id: Option<Uuid>,
    pub title: String,
    pub achieved_on: Date,
    pub notes: Option<String>,
}

/// Record a milestone for the authenticated user
pub async fn create_milestone(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(req): Json<CreateMilestoneRequest>,
) -> ApiResult<(StatusCode, Json<Milestone>)> {
    if req.title.trim().is_empty() {
        return Err(ApiError::Validation(
            "Milestone title is required".to_string(),
        ));
    }

    if let Some(baby_id) = req.baby_id {
        verify_baby_ownership(&state.pool, baby_id, auth_user.user_id).await?;
    }

    let milestone: Milestone = sqlx::query_as(
        r#"
        INSERT INTO milestones (id, user_id, baby_id, title, achieved_on, notes)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id, user_id, baby_id, title, achieved_on, notes, created_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(auth_user.user_id)
    .bind(req.baby_id)
    .bind(req.title.trim())
    .bind(req.achieved_on)
    .bind(&req.notes)
    .fetch_one(&state.pool)
    .await?;

    Ok((StatusCode::CREATED, Json(milestone)))
}

/// List the authenticated user's milestones
pub async fn list_milestones(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> ApiResult<Json<Vec<Milestone>>> {
    let milestones: Vec<Milestone> = sqlx::query_as(
        r#"
        SELECT id, user_id, baby_id, title, achieved_on, notes, created_at
        FROM milestones
        WHERE user_id = $1
        ORDER BY achieved_on DESC, created_at DESC
        "#,
    )
    .bind(auth_user.user_id)
    .fetch_all(&state.pool)
    .await?;

    Ok(Json(milestones))
}
