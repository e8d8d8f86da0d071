//! Reporting endpoints

use super::AppState;
use crate::error::ApiError;
use crate::store::{AdminSummary, CategoryStats};
use axum::{extract::State, Json};

/// Dashboard totals - GET /admin-stats (Admin only)
pub async fn admin_stats(State(state): State<AppState>) -> Result<Json<AdminSummary>, ApiError> {
    Ok(Json(state.db.admin_summary().await?))
}

/// Per-category sales - GET /order-stats
pub async fn order_stats(
    State(state): State<AppState>,
) -> Result<Json<Vec<CategoryStats>>, ApiError> {
    Ok(Json(state.db.order_stats().await?))
}
