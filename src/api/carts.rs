//! Cart endpoints

use super::{into_document, parse_id, AppState, JsonBody};
use crate::error::ApiError;
use crate::store::{Collection, DeleteResult, InsertResult};
use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Deserialize)]
pub struct CartQuery {
    pub email: Option<String>,
}

/// Cart items for `?email=`. Without the parameter, only items that carry
/// no email at all are returned.
pub async fn list_carts(
    State(state): State<AppState>,
    Query(query): Query<CartQuery>,
) -> Result<Json<Vec<Value>>, ApiError> {
    let items = state
        .db
        .find_by_field(Collection::Carts, "email", query.email.as_deref())
        .await?;
    Ok(Json(items))
}

pub async fn add_to_cart(
    State(state): State<AppState>,
    JsonBody(item): JsonBody<Value>,
) -> Result<Json<InsertResult>, ApiError> {
    let item = into_document(item)?;
    Ok(Json(state.db.insert_one(Collection::Carts, item).await?))
}

pub async fn remove_from_cart(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeleteResult>, ApiError> {
    let id = parse_id(&id)?;
    Ok(Json(state.db.delete_one(Collection::Carts, &id).await?))
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    #[tokio::test]
    async fn test_cart_is_scoped_by_email() {
        let state = test_state();
        for (email, name) in [("a@x.com", "Soup"), ("a@x.com", "Bread"), ("b@x.com", "Pie")] {
            let (status, _) = send(
                &state,
                Method::POST,
                "/carts",
                None,
                Some(json!({"email": email, "name": name, "price": 3})),
            )
            .await;
            assert_eq!(status, StatusCode::OK);
        }

        let (_, mine) = send(&state, Method::GET, "/carts?email=a@x.com", None, None).await;
        assert_eq!(mine.as_array().unwrap().len(), 2);

        let (_, nobody) = send(&state, Method::GET, "/carts", None, None).await;
        assert_eq!(nobody, json!([]));
    }

    #[tokio::test]
    async fn test_remove_from_cart() {
        let state = test_state();
        let (_, created) = send(
            &state,
            Method::POST,
            "/carts",
            None,
            Some(json!({"email": "a@x.com", "name": "Soup"})),
        )
        .await;
        let id = created["insertedId"].as_str().unwrap();

        let (status, deleted) =
            send(&state, Method::DELETE, &format!("/carts/{}", id), None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(deleted["deletedCount"], 1);

        let (_, again) = send(&state, Method::DELETE, &format!("/carts/{}", id), None, None).await;
        assert_eq!(again["deletedCount"], 0);
    }

    #[tokio::test]
    async fn test_cart_body_must_be_object() {
        let state = test_state();
        let (status, _) = send(&state, Method::POST, "/carts", None, Some(json!([1, 2]))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
