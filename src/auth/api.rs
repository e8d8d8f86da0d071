//! Authentication API Endpoints
//! Mission: Token issuance and the self-service admin check

use crate::api::{AppState, JsonBody};
use crate::auth::{
    middleware::authorize_self,
    models::{AdminStatus, Claims, TokenResponse, UserRole},
};
use crate::error::ApiError;
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde_json::Value;
use tracing::info;

/// Issue token - POST /jwt
///
/// Unauthenticated: the submitted object is signed as-is.
pub async fn issue_token(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<Value>,
) -> Result<Json<TokenResponse>, ApiError> {
    let Value::Object(payload) = payload else {
        return Err(ApiError::bad_request("token payload must be a JSON object"));
    };

    let token = state.jwt.issue_token(payload)?;
    Ok(Json(TokenResponse { token }))
}

/// Admin self-check - GET /users/admin/:email (token required)
///
/// An unknown account reports `admin: false`.
pub async fn check_admin(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(email): Path<String>,
) -> Result<Json<AdminStatus>, ApiError> {
    authorize_self(&claims, &email)?;

    let role = state.users.role_of(&email).await?;
    let admin = role == Some(UserRole::Admin);

    info!("Admin check for {}: {}", email, admin);
    Ok(Json(AdminStatus { admin }))
}
