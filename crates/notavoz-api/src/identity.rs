//! Bearer-token resolution against the identity service.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;
use uuid::Uuid;

use notavoz_core::{Error, IdentityConfig, IdentityService, Principal, Result};

const RESOLVE_TIMEOUT_SECS: u64 = 10;

#[derive(Deserialize)]
struct UserResponse {
    id: Uuid,
    #[serde(default)]
    email: Option<String>,
}

/// Identity client over a GoTrue-style `GET /auth/v1/user` endpoint.
///
/// Any failure to positively resolve the token (network error, non-2xx
/// status, malformed payload) is reported as [`Error::Unauthorized`], so the
/// caller can never distinguish a bad token from an unreachable service.
pub struct HttpIdentityService {
    base_url: String,
    anon_key: String,
    client: reqwest::Client,
}

impl HttpIdentityService {
    pub fn new(config: &IdentityConfig) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            anon_key: config.anon_key.clone(),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl IdentityService for HttpIdentityService {
    async fn resolve_user(&self, token: &str) -> Result<Principal> {
        let response = self
            .client
            .get(format!("{}/auth/v1/user", self.base_url))
            .bearer_auth(token)
            .header("apikey", &self.anon_key)
            .timeout(Duration::from_secs(RESOLVE_TIMEOUT_SECS))
            .send()
            .await
            .map_err(|e| Error::Unauthorized(format!("Identity service unreachable: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::Unauthorized(
                "Invalid or expired token".to_string(),
            ));
        }

        let user: UserResponse = response.json().await.map_err(|_| {
            Error::Unauthorized("Identity service returned a malformed user".to_string())
        })?;

        debug!(
            subsystem = "api",
            component = "identity",
            op = "resolve_user",
            owner_id = %user.id,
            "Token resolved"
        );
        Ok(Principal {
            id: user.id,
            email: user.email,
        })
    }
}
