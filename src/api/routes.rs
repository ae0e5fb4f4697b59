use axum::{
    http::{header, HeaderValue, Method},
    middleware,
    routing::{get, post},
    Json, Router,
};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    auth::{api as auth_api, auth_middleware, AuthService, AuthState},
    middleware::{rate_limit_middleware, request_logging, RateLimitConfig, RateLimiter},
    portal::{portal_router, PortalService, PortalState},
};

/// Router-level settings that are not part of any service
#[derive(Debug, Clone, Default)]
pub struct RouterOptions {
    /// Allowed cross-origin caller. `None` refuses cross-origin requests.
    pub cors_origin: Option<String>,
    pub login_rate_limit: RateLimitConfig,
}

/// Assemble the full HTTP surface.
///
/// Returns the login limiter so the caller can schedule its cleanup.
pub fn build_router(
    auth: Arc<AuthService>,
    portal: Arc<PortalService>,
    options: RouterOptions,
) -> Result<(Router, RateLimiter)> {
    let jwt_handler = auth.jwt();
    let limiter = RateLimiter::new(options.login_rate_limit.clone());

    // Public auth routes, throttled per client IP
    let auth_router = Router::new()
        .route("/auth/login", post(auth_api::login))
        .route("/auth/password-reset", post(auth_api::request_password_reset))
        .route_layer(middleware::from_fn_with_state(
            limiter.clone(),
            rate_limit_middleware,
        ))
        .with_state(AuthState::new(auth));

    // Everything below requires a valid bearer token
    let protected_routes = Router::new()
        .route("/auth/me", get(auth_api::get_current_user))
        .merge(portal_router(PortalState::new(portal)))
        .route_layer(middleware::from_fn_with_state(jwt_handler, auth_middleware));

    let public_routes = Router::new().route("/health", get(health_check));

    let app = Router::new()
        .merge(public_routes)
        .merge(auth_router)
        .merge(protected_routes)
        .layer(middleware::from_fn(request_logging))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(options.cors_origin.as_deref())?);

    Ok((app, limiter))
}

/// CORS for a single allowed origin, or none at all
pub fn cors_layer(origin: Option<&str>) -> Result<CorsLayer> {
    let Some(origin) = origin.map(str::trim).filter(|o| !o.is_empty()) else {
        return Ok(CorsLayer::new());
    };

    let origin = HeaderValue::from_str(origin)
        .with_context(|| format!("Invalid CORS_ORIGIN: {}", origin))?;

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list([origin]))
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]))
}

// ===== Route Handlers =====

/// Health check endpoint
async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ===== Response Types =====

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}
