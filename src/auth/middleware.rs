//! Authentication Middleware
//! Mission: Protect API endpoints with bearer-token validation

use crate::auth::{error::AuthError, jwt::JwtHandler};
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::headers::{authorization::Bearer, Authorization, HeaderMapExt};
use std::sync::Arc;
use tracing::debug;

/// Auth middleware that validates `Authorization: Bearer <token>`.
/// Validation is in-memory only; no external call is made.
pub async fn auth_middleware(
    State(jwt_handler): State<Arc<JwtHandler>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let bearer = req
        .headers()
        .typed_get::<Authorization<Bearer>>()
        .ok_or(AuthError::Unauthenticated)?;

    let claims = jwt_handler.validate_token(bearer.token()).map_err(|e| {
        debug!("Rejected bearer token: {:#}", e);
        AuthError::Unauthenticated
    })?;

    // Add claims to request extensions so handlers can access them
    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}
