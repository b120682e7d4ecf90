//! Cradle API Library
//!
//! This crate contains the API server components for Cradle.

pub mod auth;
pub mod config;
pub mod email;
pub mod error;
pub mod rate_limit;
pub mod routes;
pub mod state;

pub use config::Config;
pub use error::{ApiError, ApiResult};
pub use state::AppState;
