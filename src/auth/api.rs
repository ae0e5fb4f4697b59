//! Authentication API Endpoints
//! Mission: Provide login, password-reset and current-user endpoints

use crate::auth::{
    error::AuthError,
    models::{
        Claims, CurrentUserResponse, LoginRequest, LoginResponse, MessageResponse,
        PasswordResetRequest,
    },
    service::AuthService,
};
use axum::{extract::rejection::JsonRejection, extract::State, Extension, Json};
use std::sync::Arc;
use tracing::{info, warn};

const RESET_ACK_MESSAGE: &str =
    "If an account exists for this email, password reset instructions have been sent";

/// Shared auth state
#[derive(Clone)]
pub struct AuthState {
    pub service: Arc<AuthService>,
}

impl AuthState {
    pub fn new(service: Arc<AuthService>) -> Self {
        Self { service }
    }
}

fn require_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, AuthError> {
    payload
        .map(|Json(body)| body)
        .map_err(|e| AuthError::BadRequest(e.body_text()))
}

/// Login endpoint - POST /auth/login
/// Answers only 200, 401 or 500; an unreadable body is a failed login.
pub async fn login(
    State(state): State<AuthState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, AuthError> {
    let payload = payload.map(|Json(body)| body).map_err(|e| {
        warn!("❌ Unreadable login request: {}", e.body_text());
        AuthError::InvalidCredentials
    })?;
    info!("🔐 Login attempt: {}", payload.email);

    let response = state
        .service
        .authenticate(&payload.email, &payload.password)
        .await?;

    Ok(Json(response))
}

/// Password reset request - POST /auth/password-reset
/// Answers the same way for known and unknown emails.
pub async fn request_password_reset(
    State(state): State<AuthState>,
    payload: Result<Json<PasswordResetRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, AuthError> {
    let payload = require_body(payload)?;
    state.service.request_password_reset(&payload.email).await?;

    Ok(Json(MessageResponse {
        message: RESET_ACK_MESSAGE.to_string(),
    }))
}

/// Get current user info - GET /auth/me
/// Built from the validated token claims, no database lookup
pub async fn get_current_user(Extension(claims): Extension<Claims>) -> Json<CurrentUserResponse> {
    Json(CurrentUserResponse::from_claims(&claims))
}
