//! Portal HTTP Client
//! Mission: Log in, attach the bearer token, and drop the session when the server rejects it

use crate::{
    auth::models::{
        CurrentUserResponse, LoginRequest, LoginResponse, MessageResponse, UserProfile,
    },
    config::api_base_url,
    portal::models::{
        AccessSummary, Announcement, LeaveDecision, LeaveDecisionRequest, LeaveRequest,
        Notification,
    },
    session::holder::SessionHolder,
};
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::json;
use std::{sync::Arc, time::Duration};
use tracing::{debug, warn};

/// Shown for every failed login, whatever the cause
pub const LOGIN_FAILED_MESSAGE: &str = "Login failed. Check your email and password.";

#[derive(Debug)]
pub enum ClientError {
    LoginFailed,
    /// Missing, expired or rejected token. The session has been cleared.
    Unauthenticated,
    Forbidden,
    Server { status: u16, message: String },
    Transport(reqwest::Error),
    Storage(anyhow::Error),
}

impl std::fmt::Display for ClientError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClientError::LoginFailed => write!(f, "{}", LOGIN_FAILED_MESSAGE),
            ClientError::Unauthenticated => write!(f, "Session expired, please log in again"),
            ClientError::Forbidden => write!(f, "Insufficient permissions"),
            ClientError::Server { status, message } => {
                write!(f, "Server error ({}): {}", status, message)
            }
            ClientError::Transport(e) => write!(f, "Request failed: {}", e),
            ClientError::Storage(e) => write!(f, "Session storage error: {}", e),
        }
    }
}

impl std::error::Error for ClientError {}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        ClientError::Transport(e)
    }
}

pub struct PortalClient {
    http: Client,
    base_url: String,
    session: Arc<SessionHolder>,
}

impl PortalClient {
    pub fn new(base_url: &str, session: Arc<SessionHolder>) -> Self {
        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            session,
        }
    }

    /// Client for the server named by `API_BASE_URL`, or the local default.
    pub fn from_env(session: Arc<SessionHolder>) -> Self {
        Self::new(&api_base_url(), session)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &Arc<SessionHolder> {
        &self.session
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// POST /auth/login and persist the session.
    /// Every failure collapses into `LoginFailed`, except local storage errors.
    pub async fn login(&self, email: &str, password: &str) -> Result<UserProfile, ClientError> {
        let request = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };

        let response = match self
            .http
            .post(self.url("/auth/login"))
            .json(&request)
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => {
                warn!("Login request failed: {}", e);
                return Err(ClientError::LoginFailed);
            }
        };

        if !response.status().is_success() {
            warn!("Login rejected with status {}", response.status());
            return Err(ClientError::LoginFailed);
        }

        let login: LoginResponse = match response.json().await {
            Ok(body) => body,
            Err(e) => {
                warn!("Unreadable login response: {}", e);
                return Err(ClientError::LoginFailed);
            }
        };

        self.session.establish(login).map_err(ClientError::Storage)
    }

    /// Local only. The server is not told; the token stays valid until expiry.
    pub fn logout(&self) -> Result<(), ClientError> {
        self.session.clear().map_err(ClientError::Storage)
    }

    /// POST /auth/password-reset. Public, no session needed.
    pub async fn request_password_reset(&self, email: &str) -> Result<String, ClientError> {
        let response = self
            .http
            .post(self.url("/auth/password-reset"))
            .json(&json!({ "email": email }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(server_error(status, response).await);
        }
        let body: MessageResponse = response.json().await?;
        Ok(body.message)
    }

    pub async fn me(&self) -> Result<CurrentUserResponse, ClientError> {
        self.get("/auth/me").await
    }

    pub async fn access(&self) -> Result<AccessSummary, ClientError> {
        self.get("/api/access").await
    }

    pub async fn announcements(&self) -> Result<Vec<Announcement>, ClientError> {
        self.get("/api/announcements").await
    }

    pub async fn notifications(&self) -> Result<Vec<Notification>, ClientError> {
        self.get("/api/notifications").await
    }

    /// PATCH /api/leave-requests/:id/status
    pub async fn decide_leave_request(
        &self,
        id: &str,
        decision: LeaveDecision,
    ) -> Result<LeaveRequest, ClientError> {
        self.patch(
            &format!("/api/leave-requests/{}/status", id),
            &LeaveDecisionRequest { status: decision },
        )
        .await
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        self.protected(self.http.request(Method::GET, self.url(path)))
            .await
    }

    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.protected(self.http.request(Method::POST, self.url(path)).json(body))
            .await
    }

    pub async fn patch<B, T>(&self, path: &str, body: &B) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.protected(self.http.request(Method::PATCH, self.url(path)).json(body))
            .await
    }

    /// Send with the bearer header. A 401 ends the session.
    async fn protected<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<T, ClientError> {
        let Some(bearer) = self.session.bearer_header() else {
            return Err(ClientError::Unauthenticated);
        };

        let response = request
            .header(reqwest::header::AUTHORIZATION, bearer)
            .send()
            .await?;

        match response.status() {
            StatusCode::UNAUTHORIZED => {
                warn!("🚪 Token rejected by server, logging out");
                self.session.clear().map_err(ClientError::Storage)?;
                Err(ClientError::Unauthenticated)
            }
            StatusCode::FORBIDDEN => Err(ClientError::Forbidden),
            status if status.is_success() => {
                debug!("Protected call succeeded ({})", status);
                Ok(response.json().await?)
            }
            status => Err(server_error(status, response).await),
        }
    }
}

async fn server_error(status: StatusCode, response: reqwest::Response) -> ClientError {
    let message = response
        .json::<MessageResponse>()
        .await
        .map(|m| m.message)
        .unwrap_or_else(|_| status.to_string());

    ClientError::Server {
        status: status.as_u16(),
        message,
    }
}
