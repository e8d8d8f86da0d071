//! User management endpoints

use super::{into_document, parse_id, AppState, JsonBody};
use crate::error::ApiError;
use crate::store::{DeleteResult, DocId, InsertResult, UpdateResult};
use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum SignInResult {
    Created(InsertResult),
    Existing {
        message: &'static str,
        #[serde(rename = "insertedId")]
        inserted_id: Option<DocId>,
    },
}

/// List all users - GET /users (Admin only)
pub async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<Value>>, ApiError> {
    Ok(Json(state.users.list_users().await?))
}

/// Sign-in registration - POST /users
///
/// Stores the submitted profile on first sign-in; repeat sign-ins are
/// acknowledged without writing.
pub async fn create_user(
    State(state): State<AppState>,
    JsonBody(user): JsonBody<Value>,
) -> Result<Json<SignInResult>, ApiError> {
    let profile = into_document(user)?;
    let email = profile
        .get("email")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| ApiError::bad_request("user email is required"))?;

    let result = match state.users.create_if_absent(&email, profile).await? {
        Some(created) => SignInResult::Created(created),
        None => SignInResult::Existing {
            message: "User already exists",
            inserted_id: None,
        },
    };
    Ok(Json(result))
}

/// Promote user - PATCH /users/admin/:id (Admin only)
pub async fn make_admin(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<UpdateResult>, ApiError> {
    let id = parse_id(&id)?;
    Ok(Json(state.users.promote_to_admin(&id).await?))
}

/// Delete user - DELETE /users/:id (Admin only)
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeleteResult>, ApiError> {
    let id = parse_id(&id)?;
    Ok(Json(state.users.delete_user(&id).await?))
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    #[tokio::test]
    async fn test_first_sign_in_creates_user_once() {
        let state = test_state();
        let body = json!({"email": "ada@bistro.test", "name": "Ada"});

        let (status, first) = send(&state, Method::POST, "/users", None, Some(body.clone())).await;
        assert_eq!(status, StatusCode::OK);
        assert!(first["insertedId"].is_string());

        let (status, second) = send(&state, Method::POST, "/users", None, Some(body)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(second["message"], "User already exists");
        assert!(second["insertedId"].is_null());
    }

    #[tokio::test]
    async fn test_sign_in_requires_email() {
        let state = test_state();
        let (status, _) = send(&state, Method::POST, "/users", None, Some(json!({"name": "?"}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_admin_can_promote_and_delete() {
        let state = test_state();
        seed_user(&state, "boss@bistro.test", true).await;
        let target = seed_user(&state, "cook@bistro.test", false).await;
        let token = token_for(&state, "boss@bistro.test");

        let (status, users) = send(&state, Method::GET, "/users", Some(token.as_str()), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(users.as_array().unwrap().len(), 2);

        let (status, promoted) = send(
            &state,
            Method::PATCH,
            &format!("/users/admin/{}", target),
            Some(token.as_str()),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(promoted["modifiedCount"], 1);

        // The promoted cook now passes the role check on their own
        let cook = token_for(&state, "cook@bistro.test");
        let (status, _) = send(&state, Method::GET, "/admin-stats", Some(cook.as_str()), None).await;
        assert_eq!(status, StatusCode::OK);

        let (status, deleted) = send(
            &state,
            Method::DELETE,
            &format!("/users/{}", target),
            Some(token.as_str()),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(deleted["deletedCount"], 1);

        // Deleted account loses access on the very next request
        let (status, _) = send(&state, Method::GET, "/admin-stats", Some(cook.as_str()), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_self_check_only_for_own_email() {
        let state = test_state();
        seed_user(&state, "a@x.com", false).await;
        seed_user(&state, "b@x.com", true).await;
        let token = token_for(&state, "a@x.com");

        let (status, body) = send(
            &state,
            Method::GET,
            "/users/admin/a@x.com",
            Some(token.as_str()),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"admin": false}));

        let (status, _) = send(
            &state,
            Method::GET,
            "/users/admin/b@x.com",
            Some(token.as_str()),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let admin = token_for(&state, "b@x.com");
        let (_, body) = send(
            &state,
            Method::GET,
            "/users/admin/b@x.com",
            Some(admin.as_str()),
            None,
        )
        .await;
        assert_eq!(body, json!({"admin": true}));
    }
}
