//! Authentication Models
//! Mission: Define secure user and authentication data structures

use crate::access::Role;
use serde::{Deserialize, Serialize};

/// Staff account, as read from the credential store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String, // bcrypt hash - never serialize
    pub role: Role,
}

/// Raw credential-store row. `role_name` comes from the joined roles table
/// and may name a role the portal does not know.
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role_name: String,
}

impl UserRecord {
    pub fn into_user(self) -> Option<User> {
        let role = Role::from_str(&self.role_name)?;
        Some(User {
            id: self.id,
            name: self.name,
            email: self.email,
            password_hash: self.password_hash,
            role,
        })
    }
}

/// JWT Claims payload
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    #[serde(rename = "userId")]
    pub user_id: String,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub iat: i64, // issued-at, unix seconds
    pub exp: i64, // expiration, unix seconds
}

/// Login request body
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Login response
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserProfile,
}

/// User profile (sanitized, no password hash)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserProfile {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: Role,
}

impl UserProfile {
    pub fn from_user(user: &User) -> Self {
        Self {
            id: user.id.to_string(),
            email: user.email.clone(),
            name: user.name.clone(),
            role: user.role,
        }
    }
}

/// Identity carried by a validated token - GET /auth/me
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentUserResponse {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub expires_at: i64,
}

impl CurrentUserResponse {
    pub fn from_claims(claims: &Claims) -> Self {
        Self {
            id: claims.user_id.clone(),
            email: claims.email.clone(),
            name: claims.name.clone(),
            role: claims.role,
            expires_at: claims.exp,
        }
    }
}

/// Password reset request body
#[derive(Debug, Deserialize)]
pub struct PasswordResetRequest {
    pub email: String,
}

/// Generic `{ message }` body
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}
