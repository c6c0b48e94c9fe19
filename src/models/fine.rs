//! Fine model and related types

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// Fine payment state, stored as an integer in the legacy schema
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
#[repr(i32)]
pub enum FineStatus {
    Unpaid = 0,
    Paid = 1,
}

impl From<i32> for FineStatus {
    fn from(v: i32) -> Self {
        match v {
            1 => FineStatus::Paid,
            _ => FineStatus::Unpaid,
        }
    }
}

impl From<FineStatus> for i32 {
    fn from(status: FineStatus) -> Self {
        status as i32
    }
}

/// Internal row structure for database queries
#[derive(Debug, Clone, FromRow)]
pub struct FineRow {
    id: i32,
    member_id: i32,
    reason: String,
    amount: Decimal,
    created_at: DateTime<Utc>,
    estado: i32,
}

impl From<FineRow> for Fine {
    fn from(row: FineRow) -> Self {
        Fine {
            id: row.id,
            member_id: row.member_id,
            reason: row.reason,
            amount: row.amount,
            created_at: row.created_at,
            status: FineStatus::from(row.estado),
        }
    }
}

/// Full fine model
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Fine {
    pub id: i32,
    pub member_id: i32,
    pub reason: String,
    #[schema(value_type = String)]
    pub amount: Decimal,
    pub created_at: DateTime<Utc>,
    pub status: FineStatus,
}
