//! Authentication Service
//! Mission: Turn an email/password pair into a bearer token, or one generic refusal

use crate::auth::{
    error::AuthError,
    jwt::JwtHandler,
    models::{Claims, LoginResponse, UserProfile},
    password::PasswordVerifier,
    user_store::UserStore,
};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Login, token validation and password-reset acknowledgement.
/// Stateless beyond the credential store: nothing is written on login.
pub struct AuthService {
    users: UserStore,
    verifier: Arc<PasswordVerifier>,
    jwt: Arc<JwtHandler>,
}

impl AuthService {
    pub fn new(users: UserStore, verifier: Arc<PasswordVerifier>, jwt: Arc<JwtHandler>) -> Self {
        Self {
            users,
            verifier,
            jwt,
        }
    }

    pub fn jwt(&self) -> Arc<JwtHandler> {
        self.jwt.clone()
    }

    pub async fn authenticate(
        &self,
        email: &str,
        password: &str,
    ) -> Result<LoginResponse, AuthError> {
        let record = self.users.get_user_by_email(email).await.map_err(|e| {
            error!(
                retryable = e.is_retryable(),
                "Credential lookup failed for {}: {}", email, e
            );
            AuthError::TransientInfrastructureFailure
        })?;

        let stored_hash = record.as_ref().map(|r| r.password_hash.clone());
        let valid = self
            .verifier
            .verify(password.to_string(), stored_hash)
            .await
            .map_err(|e| {
                error!("Password verification failed for {}: {:#}", email, e);
                AuthError::TransientInfrastructureFailure
            })?;

        let record = match record {
            Some(record) if valid => record,
            _ => {
                warn!("❌ Failed login attempt: {}", email);
                return Err(AuthError::InvalidCredentials);
            }
        };

        let role_name = record.role_name.clone();
        let user = record.into_user().ok_or_else(|| {
            error!(
                "Account {} references role '{}' which has no permission entry",
                email, role_name
            );
            AuthError::TransientInfrastructureFailure
        })?;

        let (token, _claims) = self.jwt.generate_token(&user).map_err(|e| {
            error!("Token issuance failed for {}: {:#}", email, e);
            AuthError::TransientInfrastructureFailure
        })?;

        info!("✅ Login successful: {} ({})", user.email, user.role);

        Ok(LoginResponse {
            token,
            user: UserProfile::from_user(&user),
        })
    }

    /// Validate a bearer token presented on a protected request.
    pub fn validate(&self, token: &str) -> Result<Claims, AuthError> {
        self.jwt
            .validate_token(token)
            .map_err(|_| AuthError::Unauthenticated)
    }

    /// Acknowledge a password-reset request. The outcome never reveals
    /// whether the email belongs to an account.
    pub async fn request_password_reset(&self, email: &str) -> Result<(), AuthError> {
        let found = self.users.get_user_by_email(email).await.map_err(|e| {
            error!(
                retryable = e.is_retryable(),
                "Credential lookup failed for reset of {}: {}", email, e
            );
            AuthError::TransientInfrastructureFailure
        })?;

        match found {
            // No mail transport is wired in; the request is recorded in the log only.
            Some(record) => info!(user_id = record.id, "Password reset requested"),
            None => debug!("Password reset requested for unknown email"),
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        access::Role,
        auth::password::BCRYPT_MIN_COST,
        db::{DbPool, PoolConfig},
    };
    use tempfile::NamedTempFile;

    async fn create_test_service() -> (AuthService, DbPool, NamedTempFile) {
        let temp_file = NamedTempFile::new().unwrap();
        let pool = DbPool::open(temp_file.path().to_str().unwrap(), PoolConfig::default()).unwrap();
        let users = UserStore::new(pool.clone()).await.unwrap();
        let verifier = Arc::new(PasswordVerifier::new(BCRYPT_MIN_COST).unwrap());

        let hash = verifier.hash("teacher123".to_string()).await.unwrap();
        users
            .create_user("Prof. Smith", "teacher@campus.edu", hash, Role::Teacher)
            .await
            .unwrap();

        let jwt = Arc::new(JwtHandler::new("test-secret-key-12345"));
        (AuthService::new(users, verifier, jwt), pool, temp_file)
    }

    #[tokio::test]
    async fn test_successful_login_issues_matching_token() {
        let (service, _pool, _temp) = create_test_service().await;

        let response = service
            .authenticate("teacher@campus.edu", "teacher123")
            .await
            .unwrap();

        assert_eq!(response.user.email, "teacher@campus.edu");
        assert_eq!(response.user.name, "Prof. Smith");
        assert_eq!(response.user.role, Role::Teacher);

        let claims = service.validate(&response.token).unwrap();
        assert_eq!(claims.user_id, response.user.id);
        assert_eq!(claims.email, "teacher@campus.edu");
        assert_eq!(claims.role, Role::Teacher);
        assert_eq!(claims.exp - claims.iat, 24 * 3600);
    }

    #[tokio::test]
    async fn test_wrong_password_and_unknown_email_fail_identically() {
        let (service, _pool, _temp) = create_test_service().await;

        let wrong_password = service
            .authenticate("teacher@campus.edu", "nope")
            .await
            .unwrap_err();
        let unknown_email = service
            .authenticate("ghost@campus.edu", "teacher123")
            .await
            .unwrap_err();

        assert_eq!(wrong_password, AuthError::InvalidCredentials);
        assert_eq!(wrong_password, unknown_email);
        assert_eq!(wrong_password.message(), unknown_email.message());
    }

    #[tokio::test]
    async fn test_unknown_role_is_not_reported_as_bad_credentials() {
        let (service, pool, _temp) = create_test_service().await;
        let hash = bcrypt::hash("pw", BCRYPT_MIN_COST).unwrap();
        pool.with_conn(move |conn| {
            conn.execute("INSERT INTO roles (id, name) VALUES (9, 'student')", [])?;
            conn.execute(
                "INSERT INTO users (name, email, password_hash, role_id, created_at)
                 VALUES ('S', 's@campus.edu', ?1, 9, 'now')",
                [hash],
            )
        })
        .await
        .unwrap();

        let err = service.authenticate("s@campus.edu", "pw").await.unwrap_err();
        assert_eq!(err, AuthError::TransientInfrastructureFailure);
    }

    #[tokio::test]
    async fn test_closed_pool_is_infrastructure_failure() {
        let (service, pool, _temp) = create_test_service().await;
        pool.close();

        let err = service
            .authenticate("teacher@campus.edu", "teacher123")
            .await
            .unwrap_err();
        assert_eq!(err, AuthError::TransientInfrastructureFailure);
    }

    #[tokio::test]
    async fn test_password_reset_is_uniform() {
        let (service, _pool, _temp) = create_test_service().await;
        assert!(service.request_password_reset("teacher@campus.edu").await.is_ok());
        assert!(service.request_password_reset("ghost@campus.edu").await.is_ok());
    }

    #[tokio::test]
    async fn test_garbage_token_is_unauthenticated() {
        let (service, _pool, _temp) = create_test_service().await;
        assert_eq!(
            service.validate("not-a-token").unwrap_err(),
            AuthError::Unauthenticated
        );
    }
}
