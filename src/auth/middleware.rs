//! Authentication Middleware
//! Mission: Gate routes behind a verified token, then behind the admin role
//!
//! The two stages compose in a fixed order: `verify_token` attaches the
//! decoded [`Claims`] to the request, `verify_admin` trusts them and checks
//! the stored role. Routes opt in with [`Gate::verified`] or
//! [`Gate::admin_only`].

use crate::api::AppState;
use crate::auth::models::{Claims, UserRole};
use crate::error::ApiError;
use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::{self, Next},
    response::Response,
    routing::MethodRouter,
};
use tracing::{debug, warn};

/// Credential verifier: rejects the request unless it carries a valid
/// `Authorization: Bearer <token>`.
pub async fn verify_token(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(req.headers()).ok_or_else(|| {
        debug!("Rejected {}: no bearer token", req.uri().path());
        ApiError::Unauthorized
    })?;

    let claims = state.jwt.validate_token(&token).map_err(|e| {
        warn!("Rejected {}: {:#}", req.uri().path(), e);
        ApiError::Unauthorized
    })?;

    // Add claims to request extensions so later stages and handlers can read them
    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}

/// Role authorizer: the claimed email must belong to a stored admin.
/// Without claims from [`verify_token`] it fails closed.
pub async fn verify_admin(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let email = extract_claims(&req)
        .map(|claims| claims.email.clone())
        .ok_or(ApiError::Unauthorized)?;

    let role = state.users.role_of(&email).await?;
    if role != Some(UserRole::Admin) {
        warn!("Forbidden {} for {}", req.uri().path(), email);
        return Err(ApiError::Forbidden);
    }

    Ok(next.run(req).await)
}

/// Self-check: callers may only ask about their own account.
pub fn authorize_self(claims: &Claims, email: &str) -> Result<(), ApiError> {
    if claims.email != email {
        warn!("{} asked about {}", claims.email, email);
        return Err(ApiError::Forbidden);
    }
    Ok(())
}

/// Extract claims from request (use after auth middleware)
pub fn extract_claims(req: &Request) -> Option<&Claims> {
    req.extensions().get::<Claims>()
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(|t| t.to_string())
}

/// Attach the authorization stages to a single route.
pub trait Gate {
    /// Require a valid token.
    fn verified(self, state: &AppState) -> Self;
    /// Require a valid token, then the admin role.
    fn admin_only(self, state: &AppState) -> Self;
}

impl Gate for MethodRouter<AppState> {
    fn verified(self, state: &AppState) -> Self {
        self.route_layer(middleware::from_fn_with_state(state.clone(), verify_token))
    }

    fn admin_only(self, state: &AppState) -> Self {
        // Layers wrap outward: the last one added runs first
        self.route_layer(middleware::from_fn_with_state(state.clone(), verify_admin))
            .route_layer(middleware::from_fn_with_state(state.clone(), verify_token))
    }
}
