//! Aggregation Reports
//! Mission: Revenue and per-category order statistics computed inside the store
//!
//! Both reports are pure reads; running them twice without intervening writes
//! returns identical output.

use super::{Collection, Database};
use anyhow::{Context, Result};
use rusqlite::types::Value as Sql;
use serde::{Deserialize, Serialize};
use serde_json::Number;

/// Sums `$.price` over payments in a single grouping pass. Only JSON numbers
/// count; strings and missing prices contribute nothing. The sum stays an
/// integer while every counted price is one.
const REVENUE_PIPELINE: &str = "
    SELECT COALESCE(SUM(
        CASE WHEN json_type(doc, '$.price') IN ('integer', 'real')
             THEN json_extract(doc, '$.price') END
    ), 0)
    FROM payments";

/// Stages, in order:
/// 1. `unwound`  - one row per (payment, entry of menuIds)
/// 2. `resolved` - inner join against menu; an id with no menu item yields no row.
///    Ids are compared in stored form (lowercase, no hyphens).
/// 3. grouped by the resolved item's category
const ORDER_STATS_PIPELINE: &str = "
    WITH unwound AS (
        SELECT p.id AS payment_id, entry.value AS menu_id
        FROM payments AS p, json_each(p.doc, '$.menuIds') AS entry
    ),
    resolved AS (
        SELECT u.payment_id, m.doc AS item
        FROM unwound AS u
        JOIN menu AS m ON m.id = lower(replace(u.menu_id, '-', ''))
    )
    SELECT
        json_extract(item, '$.category') AS category,
        COUNT(*) AS total_quantity,
        COALESCE(SUM(
            CASE WHEN json_type(item, '$.price') IN ('integer', 'real')
                 THEN json_extract(item, '$.price') END
        ), 0) AS total_revenue
    FROM resolved
    GROUP BY category
    ORDER BY category";

/// Dashboard totals for administrators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminSummary {
    pub users: u64,
    pub menu_items: u64,
    pub orders: u64,
    pub revenue: Number,
}

/// One row of the order breakdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryStats {
    /// `None` when the menu item carries no category.
    pub category: Option<String>,
    pub total_quantity: u64,
    pub total_revenue: Number,
}

impl Database {
    pub async fn admin_summary(&self) -> Result<AdminSummary> {
        let users = self.estimated_count(Collection::Users).await?;
        let menu_items = self.estimated_count(Collection::Menu).await?;
        let orders = self.estimated_count(Collection::Payments).await?;
        let revenue = self.total_revenue().await?;

        Ok(AdminSummary {
            users,
            menu_items,
            orders,
            revenue,
        })
    }

    pub async fn total_revenue(&self) -> Result<Number> {
        let conn = self.conn.lock().await;
        let revenue: Sql = conn
            .query_row(REVENUE_PIPELINE, [], |row| row.get(0))
            .context("revenue pipeline")?;
        Ok(sum_to_number(revenue))
    }

    pub async fn order_stats(&self) -> Result<Vec<CategoryStats>> {
        let conn = self.conn.lock().await;
        let mut stmt = conn
            .prepare_cached(ORDER_STATS_PIPELINE)
            .context("order stats pipeline")?;

        let rows = stmt
            .query_map([], |row| {
                let category: Option<Sql> = row.get(0)?;
                let total_quantity: i64 = row.get(1)?;
                let total_revenue: Sql = row.get(2)?;
                Ok(CategoryStats {
                    category: category.and_then(category_label),
                    total_quantity: total_quantity.max(0) as u64,
                    total_revenue: sum_to_number(total_revenue),
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(rows)
    }
}

/// Categories are tags, but documents are schemaless: render numeric tags as
/// text and drop anything that is not a scalar.
fn category_label(value: Sql) -> Option<String> {
    match value {
        Sql::Text(text) => Some(text),
        Sql::Integer(n) => Some(n.to_string()),
        Sql::Real(x) => Some(x.to_string()),
        Sql::Null | Sql::Blob(_) => None,
    }
}

/// SQLite keeps `SUM` integral over integer inputs; carry that through to JSON.
fn sum_to_number(value: Sql) -> Number {
    match value {
        Sql::Integer(n) => Number::from(n),
        Sql::Real(x) => Number::from_f64(x).unwrap_or_else(|| Number::from(0)),
        Sql::Null | Sql::Text(_) | Sql::Blob(_) => Number::from(0),
    }
}
