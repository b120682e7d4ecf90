//! Scripture entry routes

use axum::{extract::State, http::StatusCode, Json};
use cradle_shared::Scripture;
use serde::Deserialize;
use time::Date;
use uuid::Uuid;

use crate::{
    error::{ApiError, ApiResult},
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct CreateScriptureRequest {
    pub reference: String,
    pub text: String,
    pub published_on: Date,
}

/// Publish a scripture entry
pub async fn create_scripture(
    State(state): State<AppState>,
    Json(req): Json<CreateScriptureRequest>,
) -> ApiResult<(StatusCode, Json<Scripture>)> {
    if req.reference.trim().is_empty() || req.text.trim().is_empty() {
        return Err(ApiError::Validation(
            "Reference and text are required".to_string(),
        ));
    }

    let scripture: Scripture = sqlx::query_as(
        r#"
        INSERT INTO scriptures (id, reference, text, published_on)
        VALUES ($1, $2, $3, $4)
        RETURNING id, reference, text, published_on, created_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(req.reference.trim())
    .bind(&req.text)
    .bind(req.published_on)
    .fetch_one(&state.pool)
    .await?;

    Ok((StatusCode::CREATED, Json(scripture)))
}

/// List scripture entries, newest first
pub async fn list_scriptures(State(state): State<AppState>) -> ApiResult<Json<Vec<Scripture>>> {
    let scriptures: Vec<Scripture> = sqlx::query_as(
        r#"
        SELECT id, reference, text, published_on, created_at
        FROM scriptures
        ORDER BY published_on DESC
        "#,
    )
    .fetch_all(&state.pool)
    .await?;

    Ok(Json(scriptures))
}
