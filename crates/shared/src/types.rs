//! Common types used across Cradle

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::{Date, OffsetDateTime};
use uuid::Uuid;

// =============================================================================
// Accounts
// =============================================================================

/// User account model
///
/// A user is either *pending* (holds a verification code hash, cannot log in)
/// or *active* (`is_verified`, code hash cleared). The password hash and the
/// code hash are Argon2 PHC strings; plaintext secrets never reach storage.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub is_verified: bool,
    #[serde(skip_serializing)]
    pub verification_code_hash: Option<String>,
    pub created_at: OffsetDateTime,
}

// =============================================================================
// Family records
// =============================================================================

/// Baby profile model
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Baby {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub date_of_birth: Date,
    pub gender: Option<String>,
    pub created_at: OffsetDateTime,
}

/// Care schedule entry model
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Schedule {
    pub id: Uuid,
    pub user_id: Uuid,
    pub baby_id: Option<Uuid>,
    pub title: String,
    pub scheduled_at: OffsetDateTime,
    pub notes: Option<String>,
    pub created_at: OffsetDateTime,
}

/// Expense record model
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Expense {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub amount_cents: i64,
    pub incurred_on: Date,
    pub created_at: OffsetDateTime,
}

/// Milestone record model
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Milestone {
    pub id: Uuid,
    pub user_id: Uuid,
    pub baby_id: Option<Uuid>,
    pub title: String,
    pub achieved_on: Date,
    pub notes: Option<String>,
    pub created_at: OffsetDateTime,
}

// =============================================================================
// Daily content
// =============================================================================

/// Daily reading content model (shared across all users)
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DailyRead {
    pub id: Uuid,
    pub title: String,
    pub body: String,
    pub published_on: Date,
    pub created_at: OffsetDateTime,
}

/// Scripture entry model (shared across all users)
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Scripture {
    pub id: Uuid,
    pub reference: String,
    pub text: String,
    pub published_on: Date,
    pub created_at: OffsetDateTime,
}
