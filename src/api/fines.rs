//! Fine management endpoints

use axum::{
    extract::{Path, State},
    Json,
};

use crate::{error::AppResult, models::fine::Fine};

use super::AuthenticatedAdmin;

/// List all fines
#[utoipa::path(
    get,
    path = "/fines",
    tag = "fines",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "List of fines", body = Vec<Fine>),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_fines(
    State(state): State<crate::AppState>,
    AuthenticatedAdmin(_claims): AuthenticatedAdmin,
) -> AppResult<Json<Vec<Fine>>> {
    let fines = state.services.fines.list().await?;
    Ok(Json(fines))
}

/// Pay a fine
#[utoipa::path(
    post,
    path = "/fines/{id}/pay",
    tag = "fines",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Fine ID")
    ),
    responses(
        (status = 200, description = "Fine paid", body = Fine),
        (status = 404, description = "Fine not found"),
        (status = 422, description = "Fine already paid")
    )
)]
pub async fn pay_fine(
    State(state): State<crate::AppState>,
    AuthenticatedAdmin(_claims): AuthenticatedAdmin,
    Path(id): Path<i32>,
) -> AppResult<Json<Fine>> {
    let fine = state.services.fines.pay(id).await?;
    Ok(Json(fine))
}
