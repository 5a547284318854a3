//! HTTP client for the payment gateway's charge API.
//!
//! Charge creation always carries an `Idempotency-Key` header derived by
//! the caller from the proposal id, so a retried or double-submitted
//! accept cannot create two charges.

use serde::{Deserialize, Serialize};
use wayside_core::types::Cents;

use crate::config::GatewayConfig;
use crate::error::PaymentError;
use crate::token::TokenCache;

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

/// Settlement state of a charge as reported by the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChargeStatus {
    Pending,
    Confirmed,
    Failed,
    Refunded,
}

/// A split recipient: who receives which share of the charge, in basis
/// points of the total.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SplitRecipient {
    /// Gateway account identifier of the recipient.
    pub account_id: String,
    /// Share of the total, in basis points (summing to 10_000 across
    /// recipients).
    pub share_bps: u32,
}

/// Request body for `POST /v1/charges`.
#[derive(Debug, Clone, Serialize)]
pub struct ChargeRequest {
    /// Total amount to charge the payer, in cents.
    pub amount_cents: Cents,
    /// ISO currency code (`"BRL"`).
    pub currency: String,
    /// Human-readable statement descriptor.
    pub description: String,
    /// How the amount is divided between platform and provider.
    pub split: Vec<SplitRecipient>,
}

/// Response body for charge creation and polling.
#[derive(Debug, Clone, Deserialize)]
pub struct ChargeResponse {
    /// Gateway-assigned charge identifier.
    pub id: String,
    pub status: ChargeStatus,
    pub amount_cents: Cents,
}

/// Error body the gateway returns on 4xx/5xx.
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: Option<String>,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Client for the payment gateway's REST API.
///
/// Cheap to share behind `Arc`; the inner `reqwest::Client` pools
/// connections and the token cache is refreshed on demand.
pub struct PaymentClient {
    http: reqwest::Client,
    config: GatewayConfig,
    tokens: TokenCache,
}

impl PaymentClient {
    pub fn new(config: GatewayConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
            tokens: TokenCache::new(),
        }
    }

    /// Create a charge.
    ///
    /// `idempotency_key` must be stable across retries of the same
    /// logical payment (wayside derives it from the proposal id); the
    /// gateway returns the original charge for a replayed key.
    pub async fn create_charge(
        &self,
        request: &ChargeRequest,
        idempotency_key: &str,
    ) -> Result<ChargeResponse, PaymentError> {
        let token = self.tokens.bearer(&self.http, &self.config).await?;
        let url = format!("{}/v1/charges", self.config.base_url);

        let response = self
            .http
            .post(&url)
            .bearer_auth(token)
            .header("Idempotency-Key", idempotency_key)
            .json(request)
            .send()
            .await?;

        Self::parse_charge_response(response).await
    }

    /// Poll the settlement status of an existing charge.
    pub async fn get_charge(&self, charge_id: &str) -> Result<ChargeResponse, PaymentError> {
        let token = self.tokens.bearer(&self.http, &self.config).await?;
        let url = format!("{}/v1/charges/{charge_id}", self.config.base_url);

        let response = self.http.get(&url).bearer_auth(token).send().await?;
        Self::parse_charge_response(response).await
    }

    /// Refund a charge in full.
    pub async fn refund_charge(&self, charge_id: &str) -> Result<ChargeResponse, PaymentError> {
        let token = self.tokens.bearer(&self.http, &self.config).await?;
        let url = format!("{}/v1/charges/{charge_id}/refund", self.config.base_url);

        let response = self.http.post(&url).bearer_auth(token).send().await?;
        Self::parse_charge_response(response).await
    }

    /// The configured webhook shared secret (used by the API layer to
    /// verify inbound gateway callbacks).
    pub fn webhook_secret(&self) -> &str {
        &self.config.webhook_secret
    }

    /// Turn a gateway HTTP response into a typed result.
    async fn parse_charge_response(
        response: reqwest::Response,
    ) -> Result<ChargeResponse, PaymentError> {
        let status = response.status();
        if status.is_success() {
            return response
                .json::<ChargeResponse>()
                .await
                .map_err(|e| PaymentError::Deserialize(e.to_string()));
        }

        let message = response
            .json::<ApiErrorBody>()
            .await
            .ok()
            .and_then(|b| b.message)
            .unwrap_or_else(|| "no error body".to_string());

        Err(PaymentError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

/// Build the two-way split for an accepted proposal: the provider's
/// share plus the platform's fee share, in basis points of the total.
///
/// The platform share absorbs any rounding remainder so the two shares
/// always sum to exactly 10_000.
pub fn split_for(
    provider_account: &str,
    platform_account: &str,
    amount_cents: Cents,
    total_cents: Cents,
) -> Vec<SplitRecipient> {
    let provider_bps = ((amount_cents * 10_000) / total_cents) as u32;
    vec![
        SplitRecipient {
            account_id: provider_account.to_string(),
            share_bps: provider_bps,
        },
        SplitRecipient {
            account_id: platform_account.to_string(),
            share_bps: 10_000 - provider_bps,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_shares_sum_to_whole() {
        // 10000 provider / 11500 total at the default 15% fee.
        let split = split_for("acct_provider", "acct_platform", 10_000, 11_500);
        assert_eq!(split.len(), 2);
        let total: u32 = split.iter().map(|r| r.share_bps).sum();
        assert_eq!(total, 10_000);
        // Provider gets the floor share, platform absorbs the remainder.
        assert_eq!(split[0].share_bps, 8_695);
        assert_eq!(split[1].share_bps, 1_305);
    }

    #[test]
    fn test_charge_status_wire_format() {
        let status: ChargeStatus = serde_json::from_str("\"confirmed\"").unwrap();
        assert_eq!(status, ChargeStatus::Confirmed);
        assert_eq!(
            serde_json::to_string(&ChargeStatus::Refunded).unwrap(),
            "\"refunded\""
        );
    }

    #[test]
    fn test_charge_request_serializes_split() {
        let request = ChargeRequest {
            amount_cents: 11_500,
            currency: "BRL".to_string(),
            description: "Roadside assistance".to_string(),
            split: split_for("acct_p", "acct_w", 10_000, 11_500),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["amount_cents"], 11_500);
        assert_eq!(json["split"][0]["account_id"], "acct_p");
        assert_eq!(json["split"][1]["share_bps"], 1_305);
    }
}
