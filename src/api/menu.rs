//! Menu and review endpoints

use super::{into_document, parse_id, AppState, JsonBody};
use crate::error::ApiError;
use crate::store::{Collection, DeleteResult, InsertResult, UpdateResult};
use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use serde_json::{Number, Value};

/// Fields an item edit may change. Absent fields are left untouched.
#[derive(Debug, Deserialize)]
pub struct MenuItemUpdate {
    pub name: Option<String>,
    pub category: Option<String>,
    pub recipe: Option<String>,
    pub price: Option<Number>,
}

impl MenuItemUpdate {
    fn into_fields(self) -> Vec<(&'static str, Value)> {
        let mut fields = Vec::new();
        if let Some(name) = self.name {
            fields.push(("name", Value::String(name)));
        }
        if let Some(category) = self.category {
            fields.push(("category", Value::String(category)));
        }
        if let Some(recipe) = self.recipe {
            fields.push(("recipe", Value::String(recipe)));
        }
        if let Some(price) = self.price {
            fields.push(("price", Value::Number(price)));
        }
        fields
    }
}

pub async fn list_menu(State(state): State<AppState>) -> Result<Json<Vec<Value>>, ApiError> {
    Ok(Json(state.db.find_all(Collection::Menu).await?))
}

/// Unknown ids answer `null`, not 404.
pub async fn get_menu_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Option<Value>>, ApiError> {
    let id = parse_id(&id)?;
    Ok(Json(state.db.find_by_id(Collection::Menu, &id).await?))
}

pub async fn create_menu_item(
    State(state): State<AppState>,
    JsonBody(item): JsonBody<Value>,
) -> Result<Json<InsertResult>, ApiError> {
    let item = into_document(item)?;
    Ok(Json(state.db.insert_one(Collection::Menu, item).await?))
}

pub async fn update_menu_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(update): JsonBody<MenuItemUpdate>,
) -> Result<Json<UpdateResult>, ApiError> {
    let id = parse_id(&id)?;
    let result = state
        .db
        .set_fields(Collection::Menu, &id, update.into_fields())
        .await?;
    Ok(Json(result))
}

pub async fn delete_menu_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeleteResult>, ApiError> {
    let id = parse_id(&id)?;
    Ok(Json(state.db.delete_one(Collection::Menu, &id).await?))
}

pub async fn list_reviews(State(state): State<AppState>) -> Result<Json<Vec<Value>>, ApiError> {
    Ok(Json(state.db.find_all(Collection::Reviews).await?))
}
