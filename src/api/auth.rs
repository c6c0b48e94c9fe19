//! Authentication endpoints

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::AppResult;

use super::AuthenticatedAdmin;

/// Login request
#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    /// Librarian username
    pub username: String,
    /// Librarian password
    pub password: String,
}

/// Login response
#[derive(Serialize, ToSchema)]
pub struct LoginResponse {
    /// Bearer token for subsequent requests
    pub token: String,
    /// Token type, always "Bearer"
    pub token_type: String,
    /// Authenticated username
    pub username: String,
}

/// Current session info
#[derive(Serialize, ToSchema)]
pub struct AdminInfo {
    /// Admin ID
    pub id: i32,
    /// Username
    pub username: String,
}

/// Authenticate a librarian
#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Authenticated", body = LoginResponse),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(state): State<crate::AppState>,
    Json(request): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let (token, admin) = state
        .services
        .auth
        .authenticate(&request.username, &request.password)
        .await?;

    Ok(Json(LoginResponse {
        token,
        token_type: "Bearer".to_string(),
        username: admin.username,
    }))
}

/// Get the authenticated librarian
#[utoipa::path(
    get,
    path = "/auth/me",
    tag = "auth",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current session", body = AdminInfo),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn me(
    State(state): State<crate::AppState>,
    AuthenticatedAdmin(claims): AuthenticatedAdmin,
) -> AppResult<Json<AdminInfo>> {
    let admin = state.services.auth.get_by_id(claims.admin_id).await?;

    Ok(Json(AdminInfo {
        id: admin.id,
        username: admin.username,
    }))
}
