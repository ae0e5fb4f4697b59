//! JWT Token Handler
//! Mission: Issue and validate fixed-lifetime bearer tokens

use crate::auth::models::{Claims, User};
use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use tracing::debug;

/// Tokens live exactly this long. There is no refresh.
pub const TOKEN_LIFETIME_HOURS: i64 = 24;

/// JWT Handler for token operations
pub struct JwtHandler {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    expiration_hours: i64,
}

impl JwtHandler {
    /// Create a new JWT handler with secret key
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::default();
        validation.leeway = 0; // expiry is exact, no grace window
        validation.validate_exp = true;

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            expiration_hours: TOKEN_LIFETIME_HOURS,
        }
    }

    /// Generate a JWT token for a user, issued now
    pub fn generate_token(&self, user: &User) -> Result<(String, Claims)> {
        self.generate_token_at(user, Utc::now())
    }

    /// Generate a JWT token as if issued at `issued_at`
    pub fn generate_token_at(
        &self,
        user: &User,
        issued_at: DateTime<Utc>,
    ) -> Result<(String, Claims)> {
        let expiration = issued_at
            .checked_add_signed(Duration::hours(self.expiration_hours))
            .context("Invalid timestamp")?;

        let claims = Claims {
            user_id: user.id.to_string(),
            email: user.email.clone(),
            name: user.name.clone(),
            role: user.role,
            iat: issued_at.timestamp(),
            exp: expiration.timestamp(),
        };

        debug!(
            "Generating JWT for user {} ({}), expires in {}h",
            user.email, user.id, self.expiration_hours
        );

        let token = encode(&Header::default(), &claims, &self.encoding_key)
            .context("Failed to generate JWT")?;

        Ok((token, claims))
    }

    /// Validate a JWT token and extract claims.
    /// Fails on bad signature, malformed payload, or `exp` in the past.
    pub fn validate_token(&self, token: &str) -> Result<Claims> {
        let decoded = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .context("Invalid or expired token")?;

        debug!("Validated JWT for user {}", decoded.claims.email);

        Ok(decoded.claims)
    }
}
