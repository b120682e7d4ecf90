//! Care schedule routes

use axum::{
    extract::{Extension, State},
    http::StatusCode,
    Json,
};
use cradle_shared::Schedule;
use serde::Deserialize;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
    auth::AuthUser,
    error::{ApiError, ApiResult},
    state::AppState,
};

use super::verify_baby_ownership;

#[derive(Debug, Deserialize)]
pub struct CreateScheduleRequest {
    pub baby_id: Option<Uuid>,
    pub title: String,
    pub scheduled_at: OffsetDateTime,
    pub notes: Option<String>,
}

/// Create a schedule entry for the authenticated user
pub async fn create_schedule(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(req): Json<CreateScheduleRequest>,
) -> ApiResult<(StatusCode, Json<Schedule>)> {
    if req.title.trim().is_empty() {
        return Err(ApiError::Validation("Schedule title is required".to_string()));
    }

    if let Some(baby_id) = req.baby_id {
        verify_baby_ownership(&state.pool, baby_id, auth_user.user_id).await?;
    }

    let schedule: Schedule = sqlx::query_as(
        r#"
        INSERT INTO schedules (id, user_id, baby_id, title, scheduled_at, notes)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id, user_id, baby_id, title, scheduled_at, notes, created_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(auth_user.user_id)
    .bind(req.baby_id)
    .bind(req.title.trim())
    .bind(req.scheduled_at)
    .bind(&req.notes)
    .fetch_one(&state.pool)
    .await?;

    Ok((StatusCode::CREATED, Json(schedule)))
}

/// List the authenticated user's schedule entries
pub async fn list_schedules(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> ApiResult<Json<Vec<Schedule>>> {
    let schedules: Vec<Schedule> = sqlx::query_as(
        r#"
        SELECT id, user_id, baby_id, title, scheduled_at, notes, created_at
        FROM schedules
        WHERE user_id = $1
        ORDER BY scheduled_at ASC
        "#,
    )
    .bind(auth_user.user_id)
    .fetch_all(&state.pool)
    .await?;

    Ok(Json(schedules))
}
