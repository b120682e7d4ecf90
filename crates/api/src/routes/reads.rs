//! Daily reading content routes

use axum::{extract::State, http::StatusCode, Json};
use cradle_shared::DailyRead;
use serde::Deserialize;
use time::Date;
use uuid::Uuid;

use crate::{
    error::{ApiError, ApiResult},
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct CreateReadRequest {
    pub title: String,
    pub body: String,
    pub published_on: Date,
}

/// Publish a daily read
pub async fn create_read(
    State(state): State<AppState>,
    Json(req): Json<CreateReadRequest>,
) -> ApiResult<(StatusCode, Json<DailyRead>)> {
    if req.title.trim().is_empty() || req.body.trim().is_empty() {
        return Err(ApiError::Validation(
            "Title and body are required".to_string(),
        ));
    }

    let read: DailyRead = sqlx::query_as(
        r#"
        INSERT INTO daily_reads (id, title, body, published_on)
        VALUES ($1, $2, $3, $4)
        RETURNING id, title, body, published_on, created_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(req.title.trim())
    .bind(&req.body)
    .bind(req.published_on)
    .fetch_one(&state.pool)
    .await?;

    Ok((StatusCode::CREATED, Json(read)))
}

/// List daily reads, newest first
pub async fn list_reads(State(state): State<AppState>) -> ApiResult<Json<Vec<DailyRead>>> {
    let reads: Vec<DailyRead> = sqlx::query_as(
        r#"
        SELECT id, title, body, published_on, created_at
        FROM daily_reads
        ORDER BY published_on DESC
        "#,
    )
    .fetch_all(&state.pool)
    .await?;

    Ok(Json(reads))
}
