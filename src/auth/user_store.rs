//! User Storage
//! Mission: Look up, create and promote customer accounts in the users collection

use crate::auth::models::UserRole;
use crate::store::{Collection, Database, DeleteResult, DocId, InsertResult, UpdateResult};
use anyhow::{Context, Result};
use serde_json::{json, Map, Value};
use tracing::{info, warn};

/// User storage on top of the document database
pub struct UserStore {
    db: Database,
}

impl UserStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Get user by email
    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<Value>> {
        self.db
            .find_one_by_field(Collection::Users, "email", email)
            .await
    }

    /// Stored role for an email, or `None` when no such user exists.
    /// Always a fresh read.
    pub async fn role_of(&self, email: &str) -> Result<Option<UserRole>> {
        let user = self.get_user_by_email(email).await?;
        Ok(user.as_ref().map(UserRole::of_document))
    }

    /// Insert the profile unless a user with the same email is already
    /// stored. Returns `None` when the user existed.
    pub async fn create_if_absent(
        &self,
        email: &str,
        profile: Map<String, Value>,
    ) -> Result<Option<InsertResult>> {
        if self.get_user_by_email(email).await?.is_some() {
            return Ok(None);
        }

        let result = match self.db.insert_one(Collection::Users, profile).await {
            Ok(result) => result,
            // Lost a race with a concurrent sign-in for the same email
            Err(_) if self.get_user_by_email(email).await?.is_some() => return Ok(None),
            Err(e) => return Err(e.context("Failed to insert user")),
        };

        info!("✅ Created user: {} ({})", email, result.inserted_id);
        Ok(Some(result))
    }

    /// Grant the admin role to the user with this id.
    pub async fn promote_to_admin(&self, user_id: &DocId) -> Result<UpdateResult> {
        let result = self
            .db
            .set_fields(
                Collection::Users,
                user_id,
                vec![("role", json!(UserRole::Admin.as_str()))],
            )
            .await?;

        if result.matched_count > 0 {
            info!("🔐 Promoted user {} to admin", user_id);
        }
        Ok(result)
    }

    /// List all users (admin only)
    pub async fn list_users(&self) -> Result<Vec<Value>> {
        self.db.find_all(Collection::Users).await
    }

    /// Delete a user by ID (admin only)
    pub async fn delete_user(&self, user_id: &DocId) -> Result<DeleteResult> {
        self.db.delete_one(Collection::Users, user_id).await
    }

    /// Make sure at least one administrator exists by creating or promoting
    /// the given account. Does nothing if any admin is already stored.
    pub async fn ensure_admin(&self, email: &str) -> Result<()> {
        let admins = self
            .db
            .find_by_field(Collection::Users, "role", Some(UserRole::Admin.as_str()))
            .await
            .context("Failed to check for admin users")?;
        if !admins.is_empty() {
            return Ok(());
        }

        match self.get_user_by_email(email).await? {
            Some(user) => {
                let id = user
                    .get("_id")
                    .and_then(Value::as_str)
                    .and_then(DocId::parse)
                    .context("stored user has no usable _id")?;
                self.promote_to_admin(&id).await?;
            }
            None => {
                let mut profile = Map::new();
                profile.insert("email".to_string(), json!(email));
                profile.insert("role".to_string(), json!(UserRole::Admin.as_str()));
                self.db
                    .insert_one(Collection::Users, profile)
                    .await
                    .context("Failed to insert admin user")?;
            }
        }

        info!("🔐 Bootstrap admin ready: {}", email);
        warn!("⚠️  Anyone able to sign a token for {} has admin access", email);
        Ok(())
    }
}
