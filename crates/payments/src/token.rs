//! OAuth client-credentials token acquisition and in-memory caching.
//!
//! The gateway issues short-lived bearer tokens. [`TokenCache`] holds the
//! current token behind an `RwLock` and refreshes it ahead of expiry, so
//! concurrent charge calls share one token instead of racing the
//! `/oauth/token` endpoint.

use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use tokio::sync::RwLock;

use crate::config::GatewayConfig;
use crate::error::PaymentError;

/// Response body of `POST /oauth/token`.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

/// A cached bearer token with its expiry instant.
#[derive(Debug, Clone)]
struct CachedToken {
    access_token: String,
    expires_at: DateTime<Utc>,
}

/// Shared token cache for the gateway's client-credentials grant.
pub struct TokenCache {
    current: RwLock<Option<CachedToken>>,
}

impl TokenCache {
    pub fn new() -> Self {
        Self {
            current: RwLock::new(None),
        }
    }

    /// Return a valid bearer token, fetching a fresh one if the cached
    /// token is absent or inside the refresh margin.
    pub async fn bearer(
        &self,
        http: &reqwest::Client,
        config: &GatewayConfig,
    ) -> Result<String, PaymentError> {
        let margin = Duration::seconds(config.token_refresh_margin_secs);

        {
            let current = self.current.read().await;
            if let Some(token) = current.as_ref() {
                if token.expires_at - margin > Utc::now() {
                    return Ok(token.access_token.clone());
                }
            }
        }

        // Token missing or near expiry: refresh under the write lock.
        let mut current = self.current.write().await;
        // Another caller may have refreshed while we waited for the lock.
        if let Some(token) = current.as_ref() {
            if token.expires_at - margin > Utc::now() {
                return Ok(token.access_token.clone());
            }
        }

        let fresh = Self::fetch(http, config).await?;
        let access_token = fresh.access_token.clone();
        *current = Some(fresh);
        Ok(access_token)
    }

    /// Perform the client-credentials grant.
    async fn fetch(
        http: &reqwest::Client,
        config: &GatewayConfig,
    ) -> Result<CachedToken, PaymentError> {
        let url = format!("{}/oauth/token", config.base_url);
        let response = http
            .post(&url)
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", config.client_id.as_str()),
                ("client_secret", config.client_secret.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PaymentError::Auth(format!(
                "token endpoint returned {status}: {body}"
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| PaymentError::Deserialize(e.to_string()))?;

        tracing::debug!(expires_in = token.expires_in, "Acquired gateway access token");

        Ok(CachedToken {
            access_token: token.access_token,
            expires_at: Utc::now() + Duration::seconds(token.expires_in),
        })
    }
}

impl Default for TokenCache {
    fn default() -> Self {
        Self::new()
    }
}
