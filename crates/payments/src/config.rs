//! Payment gateway configuration loaded from environment variables.

/// Connection settings for the external payment gateway.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Base URL, e.g. `https://api.gateway.example`.
    pub base_url: String,
    /// OAuth client id for the client-credentials grant.
    pub client_id: String,
    /// OAuth client secret.
    pub client_secret: String,
    /// Shared secret for webhook signature verification.
    pub webhook_secret: String,
    /// Seconds before token expiry at which a refresh is forced
    /// (default: `60`).
    pub token_refresh_margin_secs: i64,
}

/// Default refresh margin before token expiry.
const DEFAULT_REFRESH_MARGIN_SECS: i64 = 60;

impl GatewayConfig {
    /// Load gateway configuration from environment variables.
    ///
    /// | Env Var                       | Required | Default |
    /// |-------------------------------|----------|---------|
    /// | `GATEWAY_BASE_URL`            | **yes**  | --      |
    /// | `GATEWAY_CLIENT_ID`           | **yes**  | --      |
    /// | `GATEWAY_CLIENT_SECRET`       | **yes**  | --      |
    /// | `GATEWAY_WEBHOOK_SECRET`      | **yes**  | --      |
    /// | `GATEWAY_TOKEN_REFRESH_MARGIN`| no       | `60`    |
    ///
    /// # Panics
    ///
    /// Panics if a required variable is not set. Misconfiguration should
    /// fail at startup, not at the first charge.
    pub fn from_env() -> Self {
        let base_url = std::env::var("GATEWAY_BASE_URL")
            .expect("GATEWAY_BASE_URL must be set in the environment");
        let client_id = std::env::var("GATEWAY_CLIENT_ID")
            .expect("GATEWAY_CLIENT_ID must be set in the environment");
        let client_secret = std::env::var("GATEWAY_CLIENT_SECRET")
            .expect("GATEWAY_CLIENT_SECRET must be set in the environment");
        let webhook_secret = std::env::var("GATEWAY_WEBHOOK_SECRET")
            .expect("GATEWAY_WEBHOOK_SECRET must be set in the environment");

        let token_refresh_margin_secs: i64 = std::env::var("GATEWAY_TOKEN_REFRESH_MARGIN")
            .unwrap_or_else(|_| DEFAULT_REFRESH_MARGIN_SECS.to_string())
            .parse()
            .expect("GATEWAY_TOKEN_REFRESH_MARGIN must be a valid i64");

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client_id,
            client_secret,
            webhook_secret,
            token_refresh_margin_secs,
        }
    }
}
