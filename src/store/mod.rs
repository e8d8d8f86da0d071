//! Document Store
//! Mission: Keep schemaless JSON documents in SQLite, one table per collection
//!
//! Every collection table has the same shape:
//!
//! ```sql
//! CREATE TABLE <collection> (
//!     id TEXT PRIMARY KEY,      -- 32 hex chars, mirrored into doc._id
//!     doc TEXT NOT NULL,        -- the JSON document as stored
//!     created_at TEXT NOT NULL  -- RFC 3339, server side
//! );
//! ```
//!
//! All operations serialise on one connection, so each call is atomic with
//! respect to the documents it touches. Nothing spans more than one call.

pub mod reports;

use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension};
use serde::Serialize;
use serde_json::{Map, Value};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};
use uuid::Uuid;

pub use reports::{AdminSummary, CategoryStats};

/// Named collections of the bistro database.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    Users,
    Menu,
    Payments,
    Carts,
    Reviews,
}

impl Collection {
    pub const ALL: [Collection; 5] = [
        Collection::Users,
        Collection::Menu,
        Collection::Payments,
        Collection::Carts,
        Collection::Reviews,
    ];

    /// Table name; also the collection name used in logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Users => "users",
            Collection::Menu => "menu",
            Collection::Payments => "payments",
            Collection::Carts => "carts",
            Collection::Reviews => "reviews",
        }
    }
}

/// Opaque document identifier (lowercase simple-form UUID).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct DocId(String);

impl DocId {
    pub fn generate() -> Self {
        DocId(Uuid::new_v4().simple().to_string())
    }

    /// Accepts any UUID spelling and normalises it; anything else is rejected.
    pub fn parse(raw: &str) -> Option<Self> {
        Uuid::parse_str(raw.trim())
            .ok()
            .map(|u| DocId(u.simple().to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for DocId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertResult {
    pub acknowledged: bool,
    pub inserted_id: DocId,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UpdateResult {
    pub acknowledged: bool,
    pub matched_count: u64,
    pub modified_count: u64,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResult {
    pub acknowledged: bool,
    pub deleted_count: u64,
}

impl DeleteResult {
    fn new(deleted_count: u64) -> Self {
        Self {
            acknowledged: true,
            deleted_count,
        }
    }
}

/// Handle to the document database. Cheap to clone.
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Open (or create) the database file and make sure every collection exists.
    pub fn new(db_path: &str) -> Result<Self> {
        let conn = Connection::open(db_path).context("open bistro db")?;
        conn.pragma_update(None, "journal_mode", "WAL").ok();
        conn.pragma_update(None, "synchronous", "NORMAL").ok();
        Self::from_connection(conn)
    }

    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("open in-memory db")?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        for collection in Collection::ALL {
            conn.execute(
                &format!(
                    "CREATE TABLE IF NOT EXISTS {} (
                        id TEXT PRIMARY KEY,
                        doc TEXT NOT NULL,
                        created_at TEXT NOT NULL
                    )",
                    collection.as_str()
                ),
                [],
            )
            .with_context(|| format!("create collection {}", collection.as_str()))?;
        }

        conn.execute_batch(
            "CREATE UNIQUE INDEX IF NOT EXISTS idx_users_email
                ON users(json_extract(doc, '$.email'));
             CREATE INDEX IF NOT EXISTS idx_carts_email
                ON carts(json_extract(doc, '$.email'));
             CREATE INDEX IF NOT EXISTS idx_payments_email
                ON payments(json_extract(doc, '$.email'));",
        )
        .context("create collection indexes")?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Every document in insertion order.
    pub async fn find_all(&self, collection: Collection) -> Result<Vec<Value>> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare_cached(&format!(
            "SELECT doc FROM {} ORDER BY rowid",
            collection.as_str()
        ))?;
        let docs = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;

        docs.iter().map(|raw| parse_doc(collection, raw)).collect()
    }

    pub async fn find_by_id(&self, collection: Collection, id: &DocId) -> Result<Option<Value>> {
        let conn = self.conn.lock().await;
        let raw = load_doc(&conn, collection, id)?;
        raw.map(|raw| parse_doc(collection, &raw)).transpose()
    }

    /// Documents whose top-level `field` equals `value`. `None` matches
    /// documents where the field is missing or null.
    pub async fn find_by_field(
        &self,
        collection: Collection,
        field: &'static str,
        value: Option<&str>,
    ) -> Result<Vec<Value>> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare_cached(&format!(
            "SELECT doc FROM {} WHERE json_extract(doc, ?1) IS ?2 ORDER BY rowid",
            collection.as_str()
        ))?;
        let docs = stmt
            .query_map(params![json_path(field), value], |row| {
                row.get::<_, String>(0)
            })?
            .collect::<Result<Vec<_>, _>>()?;

        docs.iter().map(|raw| parse_doc(collection, raw)).collect()
    }

    pub async fn find_one_by_field(
        &self,
        collection: Collection,
        field: &'static str,
        value: &str,
    ) -> Result<Option<Value>> {
        let conn = self.conn.lock().await;
        let raw: Option<String> = conn
            .query_row(
                &format!(
                    "SELECT doc FROM {} WHERE json_extract(doc, ?1) = ?2 ORDER BY rowid LIMIT 1",
                    collection.as_str()
                ),
                params![json_path(field), value],
                |row| row.get(0),
            )
            .optional()?;

        raw.map(|raw| parse_doc(collection, &raw)).transpose()
    }

    /// Store a document under a freshly generated id. Any `_id` the caller
    /// supplied is replaced.
    pub async fn insert_one(
        &self,
        collection: Collection,
        mut doc: Map<String, Value>,
    ) -> Result<InsertResult> {
        let id = DocId::generate();
        doc.insert("_id".to_string(), Value::String(id.to_string()));
        let raw = serde_json::to_string(&doc)?;

        let conn = self.conn.lock().await;
        conn.execute(
            &format!(
                "INSERT INTO {} (id, doc, created_at) VALUES (?1, ?2, ?3)",
                collection.as_str()
            ),
            params![id.as_str(), raw, Utc::now().to_rfc3339()],
        )
        .with_context(|| format!("insert into {}", collection.as_str()))?;

        debug!("Inserted {} into {}", id, collection.as_str());

        Ok(InsertResult {
            acknowledged: true,
            inserted_id: id,
        })
    }

    /// Overwrite top-level fields of one document, leaving the rest intact.
    pub async fn set_fields(
        &self,
        collection: Collection,
        id: &DocId,
        fields: Vec<(&'static str, Value)>,
    ) -> Result<UpdateResult> {
        let conn = self.conn.lock().await;

        let Some(raw) = load_doc(&conn, collection, id)? else {
            return Ok(UpdateResult {
                acknowledged: true,
                matched_count: 0,
                modified_count: 0,
            });
        };

        let current = parse_doc(collection, &raw)?;
        let mut updated = match current.clone() {
            Value::Object(map) => map,
            _ => anyhow::bail!("document {} in {} is not an object", id, collection.as_str()),
        };
        for (field, value) in fields {
            updated.insert(field.to_string(), value);
        }
        let updated = Value::Object(updated);

        if updated == current {
            return Ok(UpdateResult {
                acknowledged: true,
                matched_count: 1,
                modified_count: 0,
            });
        }

        conn.execute(
            &format!("UPDATE {} SET doc = ?2 WHERE id = ?1", collection.as_str()),
            params![id.as_str(), serde_json::to_string(&updated)?],
        )
        .with_context(|| format!("update {} in {}", id, collection.as_str()))?;

        Ok(UpdateResult {
            acknowledged: true,
            matched_count: 1,
            modified_count: 1,
        })
    }

    pub async fn delete_one(&self, collection: Collection, id: &DocId) -> Result<DeleteResult> {
        let conn = self.conn.lock().await;
        let deleted = conn.execute(
            &format!("DELETE FROM {} WHERE id = ?1", collection.as_str()),
            params![id.as_str()],
        )?;

        if deleted > 0 {
            info!("🗑️  Deleted {} from {}", id, collection.as_str());
        }

        Ok(DeleteResult::new(deleted as u64))
    }

    /// Delete every listed document that exists. Ids that match nothing are
    /// ignored, so repeating the call is harmless.
    pub async fn delete_many(&self, collection: Collection, ids: &[DocId]) -> Result<DeleteResult> {
        if ids.is_empty() {
            return Ok(DeleteResult::new(0));
        }

        let placeholders = (1..=ids.len())
            .map(|i| format!("?{}", i))
            .collect::<Vec<_>>()
            .join(", ");

        let conn = self.conn.lock().await;
        let deleted = conn.execute(
            &format!(
                "DELETE FROM {} WHERE id IN ({})",
                collection.as_str(),
                placeholders
            ),
            params_from_iter(ids.iter().map(DocId::as_str)),
        )?;

        Ok(DeleteResult::new(deleted as u64))
    }

    /// Whole-collection document count, no filter applied.
    pub async fn estimated_count(&self, collection: Collection) -> Result<u64> {
        let conn = self.conn.lock().await;
        let count: i64 = conn.query_row(
            &format!("SELECT COUNT(*) FROM {}", collection.as_str()),
            [],
            |row| row.get(0),
        )?;
        Ok(count.max(0) as u64)
    }
}

fn json_path(field: &str) -> String {
    format!("$.{}", field)
}

fn load_doc(conn: &Connection, collection: Collection, id: &DocId) -> Result<Option<String>> {
    let raw = conn
        .query_row(
            &format!("SELECT doc FROM {} WHERE id = ?1", collection.as_str()),
            params![id.as_str()],
            |row| row.get(0),
        )
        .optional()?;
    Ok(raw)
}

fn parse_doc(collection: Collection, raw: &str) -> Result<Value> {
    serde_json::from_str(raw)
        .with_context(|| format!("corrupt document in {}", collection.as_str()))
}
