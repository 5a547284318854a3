//! Platform fee schedule and payment-split arithmetic.
//!
//! All amounts are integer cents and the fee rate is expressed in basis
//! points, so split math is exact. The rate has a single source of truth
//! (the configured [`FeeSchedule`]); handlers, the gateway split payload,
//! and stored proposal rows must all derive from the same schedule.

use serde::Serialize;

use crate::error::CoreError;
use crate::types::Cents;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Default platform fee: 15% (1500 basis points).
pub const DEFAULT_PLATFORM_FEE_BPS: u32 = 1_500;

/// Basis points in a whole (100%).
pub const BPS_DENOMINATOR: i64 = 10_000;

/// Upper bound on a configurable fee rate (50%). A rate above this is a
/// misconfiguration, not a pricing decision.
pub const MAX_PLATFORM_FEE_BPS: u32 = 5_000;

// ---------------------------------------------------------------------------
// Fee schedule
// ---------------------------------------------------------------------------

/// The marketplace fee rate, in basis points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeeSchedule {
    rate_bps: u32,
}

impl Default for FeeSchedule {
    fn default() -> Self {
        Self {
            rate_bps: DEFAULT_PLATFORM_FEE_BPS,
        }
    }
}

impl FeeSchedule {
    /// Build a schedule from a basis-point rate, rejecting rates above
    /// [`MAX_PLATFORM_FEE_BPS`].
    pub fn new(rate_bps: u32) -> Result<Self, CoreError> {
        if rate_bps > MAX_PLATFORM_FEE_BPS {
            return Err(CoreError::Validation(format!(
                "Platform fee rate {rate_bps} bps exceeds the {MAX_PLATFORM_FEE_BPS} bps maximum"
            )));
        }
        Ok(Self { rate_bps })
    }

    /// The configured rate in basis points.
    pub fn rate_bps(self) -> u32 {
        self.rate_bps
    }

    /// Compute the platform fee for an amount, rounded half-up to the cent.
    pub fn fee_for(self, amount_cents: Cents) -> Cents {
        (amount_cents * i64::from(self.rate_bps) + BPS_DENOMINATOR / 2) / BPS_DENOMINATOR
    }

    /// Compute the full split for a proposal amount.
    ///
    /// The provider receives `amount_cents`; the client is charged
    /// `total_cents = amount_cents + platform_fee_cents`.
    pub fn split(self, amount_cents: Cents) -> Result<PaymentSplit, CoreError> {
        if amount_cents <= 0 {
            return Err(CoreError::Validation(
                "Proposal amount must be positive".into(),
            ));
        }
        let platform_fee_cents = self.fee_for(amount_cents);
        Ok(PaymentSplit {
            amount_cents,
            platform_fee_cents,
            total_cents: amount_cents + platform_fee_cents,
        })
    }
}

/// The three monetary components of an accepted proposal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PaymentSplit {
    /// What the provider quoted and will receive.
    pub amount_cents: Cents,
    /// What the marketplace retains.
    pub platform_fee_cents: Cents,
    /// What the client is charged.
    pub total_cents: Cents,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_rate_is_fifteen_percent() {
        // R$100.00 at the default 15% rate: fee R$15.00, total R$115.00.
        let split = FeeSchedule::default().split(10_000).unwrap();
        assert_eq!(split.platform_fee_cents, 1_500);
        assert_eq!(split.total_cents, 11_500);
        assert_eq!(split.amount_cents, 10_000);
    }

    #[test]
    fn test_fee_rounds_half_up() {
        // 33 cents at 15% = 4.95 cents -> 5.
        let schedule = FeeSchedule::default();
        assert_eq!(schedule.fee_for(33), 5);
        // 3 cents at 15% = 0.45 cents -> 0.
        assert_eq!(schedule.fee_for(3), 0);
    }

    #[test]
    fn test_custom_rate() {
        let schedule = FeeSchedule::new(1_000).unwrap();
        let split = schedule.split(10_000).unwrap();
        assert_eq!(split.platform_fee_cents, 1_000);
        assert_eq!(split.total_cents, 11_000);
    }

    #[test]
    fn test_rate_above_maximum_rejected() {
        assert!(FeeSchedule::new(5_001).is_err());
        assert!(FeeSchedule::new(5_000).is_ok());
    }

    #[test]
    fn test_non_positive_amount_rejected() {
        let schedule = FeeSchedule::default();
        assert!(schedule.split(0).is_err());
        assert!(schedule.split(-100).is_err());
    }
}
