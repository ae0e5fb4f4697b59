//! Auth API Errors
//! Mission: One taxonomy for every authentication and authorization failure

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// The single message for both unknown email and wrong password.
pub const INVALID_CREDENTIALS_MESSAGE: &str = "Invalid email or password";

/// Auth API errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Unknown email or wrong password. Indistinguishable on purpose.
    InvalidCredentials,
    /// Missing, malformed, expired, or badly signed token.
    Unauthenticated,
    /// Authenticated, but the role may not do this.
    Forbidden,
    /// Database or pool trouble. Retryable, never reported as bad credentials.
    TransientInfrastructureFailure,
    BadRequest(String),
}

impl AuthError {
    pub fn status(&self) -> StatusCode {
        match self {
            AuthError::InvalidCredentials | AuthError::Unauthenticated => StatusCode::UNAUTHORIZED,
            AuthError::Forbidden => StatusCode::FORBIDDEN,
            AuthError::TransientInfrastructureFailure => StatusCode::INTERNAL_SERVER_ERROR,
            AuthError::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            AuthError::InvalidCredentials => INVALID_CREDENTIALS_MESSAGE,
            AuthError::Unauthenticated => "Authentication required",
            AuthError::Forbidden => "Insufficient permissions",
            AuthError::TransientInfrastructureFailure => {
                "An error occurred while processing the request"
            }
            AuthError::BadRequest(msg) => msg,
        }
    }
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

impl std::error::Error for AuthError {}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "message": self.message() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_error_statuses() {
        assert_eq!(
            AuthError::InvalidCredentials.into_response().status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AuthError::Unauthenticated.into_response().status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AuthError::Forbidden.into_response().status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            AuthError::TransientInfrastructureFailure
                .into_response()
                .status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            AuthError::BadRequest("nope".into()).into_response().status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_infrastructure_failure_is_not_a_credentials_message() {
        assert_ne!(
            AuthError::TransientInfrastructureFailure.message(),
            AuthError::InvalidCredentials.message()
        );
    }
}
