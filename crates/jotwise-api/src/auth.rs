//! Session resolution.
//!
//! Login, signup and token refresh happen against the hosted auth service
//! directly; this server only resolves the bearer token on each request.

use std::time::Duration;

use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts};
use reqwest::{Client, StatusCode};
use tracing::{debug, warn};

use jotwise_core::{Error, Result, SessionGateway, SessionUser};

use crate::error::ApiError;
use crate::state::AppState;

/// Resolves tokens with `GET {auth_url}/auth/v1/user`.
pub struct HostedSessionGateway {
    client: Client,
    auth_url: String,
    anon_key: String,
}

impl HostedSessionGateway {
    pub fn new(auth_url: impl Into<String>, anon_key: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self::with_client(client, auth_url, anon_key))
    }

    pub fn with_client(
        client: Client,
        auth_url: impl Into<String>,
        anon_key: impl Into<String>,
    ) -> Self {
        Self {
            client,
            auth_url: auth_url.into().trim_end_matches('/').to_string(),
            anon_key: anon_key.into(),
        }
    }
}

#[async_trait]
impl SessionGateway for HostedSessionGateway {
    async fn resolve(&self, access_token: &str) -> Result<SessionUser> {
        let response = self
            .client
            .get(format!("{}/auth/v1/user", self.auth_url))
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| Error::Request(format!("Auth service unreachable: {}", e)))?;

        match response.status() {
            status if status.is_success() => {
                let user: SessionUser = response
                    .json()
                    .await
                    .map_err(|e| Error::Serialization(format!("Invalid user payload: {}", e)))?;
                debug!(subsystem = "api", component = "auth", user_id = %user.id, "Session resolved");
                Ok(user)
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                Err(Error::Unauthorized("Invalid or expired session".to_string()))
            }
            status => {
                warn!(
                    subsystem = "api",
                    component = "auth",
                    status = status.as_u16(),
                    "Auth service returned an unexpected status"
                );
                Err(Error::Request(format!("Auth service error: {}", status)))
            }
        }
    }
}

/// Extractor for requests carrying a valid session.
#[derive(Debug, Clone)]
pub struct AuthUser(pub SessionUser);

impl AuthUser {
    pub fn id(&self) -> uuid::Uuid {
        self.0.id
    }
}

#[axum::async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> std::result::Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ApiError::Unauthorized("Authentication required".to_string()))?;

        let user = state.sessions.resolve(token).await?;
        Ok(AuthUser(user))
    }
}
