//! Member model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// Full member model
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Member {
    pub id: i32,
    /// Human-facing identifier, assigned once at registration and
    /// immutable thereafter
    pub membership_number: String,
    pub first_name: String,
    pub last_name: String,
    pub national_id: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub registered_at: DateTime<Utc>,
}

/// Create member request
///
/// The membership number and registration date are assigned by the server.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateMember {
    #[validate(length(min = 1, message = "First name must not be empty"))]
    pub first_name: String,
    #[validate(length(min = 1, message = "Last name must not be empty"))]
    pub last_name: String,
    #[validate(length(min = 1, message = "National ID must not be empty"))]
    pub national_id: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    pub phone: String,
    pub address: String,
}

/// Update member request (membership number and registration date are
/// immutable)
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateMember {
    #[validate(length(min = 1, message = "First name must not be empty"))]
    pub first_name: String,
    #[validate(length(min = 1, message = "Last name must not be empty"))]
    pub last_name: String,
    #[validate(length(min = 1, message = "National ID must not be empty"))]
    pub national_id: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    pub phone: String,
    pub address: String,
}
