//! REST client for the external payment gateway: OAuth
//! client-credentials token acquisition, charge creation with split
//! recipients and idempotency keys, status polling, refunds, and
//! webhook signature verification.

pub mod client;
pub mod config;
pub mod error;
pub mod token;
pub mod webhook;

pub use client::{ChargeRequest, ChargeResponse, ChargeStatus, PaymentClient, SplitRecipient};
pub use config::GatewayConfig;
pub use error::PaymentError;
