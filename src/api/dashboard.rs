//! Dashboard endpoint

use axum::{extract::State, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::error::AppResult;

use super::AuthenticatedAdmin;

/// Dashboard counters
#[derive(Serialize, ToSchema)]
pub struct DashboardResponse {
    /// Books currently loaned out
    pub loaned_books: i64,
    /// Open loans past their due date
    pub overdue_loans: i64,
    /// Registered members
    pub total_members: i64,
    /// Books in the catalog
    pub total_books: i64,
}

/// Get the dashboard counters
#[utoipa::path(
    get,
    path = "/dashboard",
    tag = "dashboard",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Dashboard counters", body = DashboardResponse),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn get_dashboard(
    State(state): State<crate::AppState>,
    AuthenticatedAdmin(_claims): AuthenticatedAdmin,
) -> AppResult<Json<DashboardResponse>> {
    let counts = state.services.stats.dashboard().await?;

    Ok(Json(DashboardResponse {
        loaned_books: counts.loaned_books,
        overdue_loans: counts.overdue_loans,
        total_members: counts.total_members,
        total_books: counts.total_books,
    }))
}
