//! Authentication Models
//! Mission: Define identity claims and user roles

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// User roles. Anything other than `"admin"` in a stored document,
/// including a missing role, is a regular customer.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum UserRole {
    #[serde(rename = "admin")]
    Admin,
    #[default]
    #[serde(rename = "regular")]
    Regular,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "admin",
            UserRole::Regular => "regular",
        }
    }

    /// Role recorded on a user document. The comparison is exact, the way
    /// the stored value is written by the promote operation.
    pub fn of_document(doc: &Value) -> Self {
        match doc.get("role").and_then(Value::as_str) {
            Some("admin") => UserRole::Admin,
            _ => UserRole::Regular,
        }
    }
}

/// JWT claims payload.
///
/// Tokens are issued over whatever object the client submitted, so only
/// `email` and `exp` are guaranteed; everything else rides along in `profile`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Claims {
    pub email: String,
    pub exp: usize, // expiration timestamp
    #[serde(default)]
    pub iat: usize,
    #[serde(flatten)]
    pub profile: Map<String, Value>,
}

/// Token issuance response
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
}

/// Self-check response for `GET /users/admin/:email`
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct AdminStatus {
    pub admin: bool,
}
