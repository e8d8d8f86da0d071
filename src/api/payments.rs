//! Checkout endpoints
//! Mission: Record completed payments and hand out payment-intent secrets

use super::{into_document, parse_id, AppState, JsonBody};
use crate::error::ApiError;
use crate::payments::{Cents, CURRENCY};
use crate::store::{Collection, DeleteResult, DocId, InsertResult};
use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::info;

#[derive(Debug, Deserialize)]
pub struct PaymentIntentRequest {
    pub price: Value,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentIntentResponse {
    pub client_secret: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutReceipt {
    pub payment_result: InsertResult,
    pub delete_result: DeleteResult,
}

/// Payment history - GET /payments/:email (token required)
pub async fn payments_for(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> Result<Json<Vec<Value>>, ApiError> {
    let payments = state
        .db
        .find_by_field(Collection::Payments, "email", Some(&email))
        .await?;
    Ok(Json(payments))
}

/// Record checkout - POST /payments
///
/// Stores the payment, then clears exactly the cart entries it lists.
pub async fn record_payment(
    State(state): State<AppState>,
    JsonBody(payment): JsonBody<Value>,
) -> Result<Json<CheckoutReceipt>, ApiError> {
    let payment = into_document(payment)?;
    let cart_ids = cart_ids(&payment)?;

    let payment_result = state.db.insert_one(Collection::Payments, payment).await?;
    let delete_result = state.db.delete_many(Collection::Carts, &cart_ids).await?;

    info!(
        "🧾 Payment {} recorded, {} cart item(s) cleared",
        payment_result.inserted_id, delete_result.deleted_count
    );

    Ok(Json(CheckoutReceipt {
        payment_result,
        delete_result,
    }))
}

/// Create payment intent - POST /create-payment-intent
pub async fn create_payment_intent(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<PaymentIntentRequest>,
) -> Result<Json<PaymentIntentResponse>, ApiError> {
    let amount = Cents::from_price(&request.price)
        .ok_or_else(|| ApiError::bad_request("price must be a positive amount"))?;

    let intent = state.payments.create_intent(amount, CURRENCY).await?;

    Ok(Json(PaymentIntentResponse {
        client_secret: intent.client_secret,
    }))
}

/// `cartIds` must be an array of well-formed ids; checked before any write.
fn cart_ids(payment: &Map<String, Value>) -> Result<Vec<DocId>, ApiError> {
    let Some(Value::Array(raw)) = payment.get("cartIds") else {
        return Err(ApiError::bad_request("cartIds must be an array"));
    };

    raw.iter()
        .map(|id| match id {
            Value::String(s) => parse_id(s),
            other => Err(ApiError::bad_request(format!("invalid identifier: {}", other))),
        })
        .collect()
}
