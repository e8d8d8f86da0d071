//! Authentication Module
//! Mission: Bearer-token verification and admin role gating

pub mod api;
pub mod jwt;
pub mod middleware;
pub mod models;
pub mod user_store;

pub use jwt::JwtHandler;
pub use middleware::{authorize_self, verify_admin, verify_token, Gate};
pub use models::{Claims, UserRole};
pub use user_store::UserStore;
