//! Payment gateway error taxonomy.

/// Errors that can occur when talking to the payment gateway.
#[derive(Debug, thiserror::Error)]
pub enum PaymentError {
    /// Transport-level failure (connect, timeout, TLS).
    #[error("Gateway request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The gateway returned a non-success status with a message body.
    #[error("Gateway error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Token acquisition failed or the credentials were rejected.
    #[error("Gateway authentication failed: {0}")]
    Auth(String),

    /// A webhook payload failed signature verification.
    #[error("Invalid webhook signature")]
    InvalidSignature,

    /// The gateway returned a body we could not interpret.
    #[error("Unexpected gateway response: {0}")]
    Deserialize(String),
}
