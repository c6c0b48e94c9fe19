//! Loan circulation endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::{
        fine::Fine,
        loan::{Loan, LoanDetails},
    },
};

use super::AuthenticatedAdmin;

/// Check-out request
#[derive(Deserialize, ToSchema)]
pub struct CheckOutRequest {
    /// Member borrowing the book
    pub member_id: i32,
    /// Book to lend
    pub book_id: i32,
    /// Agreed return date, strictly in the future
    pub due_date: DateTime<Utc>,
}

/// Check-in response
#[derive(Serialize, ToSchema)]
pub struct CheckInResponse {
    /// Return status
    pub status: String,
    /// The closed loan
    pub loan: Loan,
    /// Overdue fine created by this return, if any
    pub fine: Option<Fine>,
}

/// Check a book out to a member
#[utoipa::path(
    post,
    path = "/loans",
    tag = "loans",
    security(("bearer_auth" = [])),
    request_body = CheckOutRequest,
    responses(
        (status = 201, description = "Loan created", body = Loan),
        (status = 400, description = "Due date not in the future"),
        (status = 404, description = "Member or book not found"),
        (status = 422, description = "Book is not available")
    )
)]
pub async fn check_out(
    State(state): State<crate::AppState>,
    AuthenticatedAdmin(_claims): AuthenticatedAdmin,
    Json(request): Json<CheckOutRequest>,
) -> AppResult<(StatusCode, Json<Loan>)> {
    let loan = state
        .services
        .loans
        .check_out(request.member_id, request.book_id, request.due_date)
        .await?;

    Ok((StatusCode::CREATED, Json(loan)))
}

/// Return a borrowed book
#[utoipa::path(
    post,
    path = "/loans/{id}/return",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Loan ID")
    ),
    responses(
        (status = 200, description = "Book returned", body = CheckInResponse),
        (status = 404, description = "Loan not found"),
        (status = 422, description = "Loan already closed")
    )
)]
pub async fn check_in(
    State(state): State<crate::AppState>,
    AuthenticatedAdmin(_claims): AuthenticatedAdmin,
    Path(loan_id): Path<i32>,
) -> AppResult<Json<CheckInResponse>> {
    let (loan, fine) = state.services.loans.check_in(loan_id).await?;

    Ok(Json(CheckInResponse {
        status: "returned".to_string(),
        loan,
        fine,
    }))
}

/// List all overdue loans
#[utoipa::path(
    get,
    path = "/loans/overdue",
    tag = "loans",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Overdue loans", body = Vec<LoanDetails>),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_overdue(
    State(state): State<crate::AppState>,
    AuthenticatedAdmin(_claims): AuthenticatedAdmin,
) -> AppResult<Json<Vec<LoanDetails>>> {
    let loans = state.services.loans.list_overdue().await?;
    Ok(Json(loans))
}
