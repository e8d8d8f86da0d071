//! Bistro Boss Backend Library
//!
//! Exposes the router, state and store so the binary and integration tests
//! share one wiring.

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod middleware;
pub mod payments;
pub mod store;
