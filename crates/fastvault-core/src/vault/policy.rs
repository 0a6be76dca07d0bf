//! Vault accounting policy.
//!
//! The deposit, per-fast recovery, and period length are policy data
//! injected into the ledger, not constants baked into the logic. All
//! monetary values are integer minor currency units (cents) to avoid
//! floating-point drift.

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Immutable accounting rule set consumed by the vault ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultPolicy {
    deposit_minor: u64,
    recovery_per_fast_minor: u64,
    period_length_days: u32,
}

impl VaultPolicy {
    /// Build a policy. All values must be strictly positive.
    pub fn new(
        deposit_minor: u64,
        recovery_per_fast_minor: u64,
        period_length_days: u32,
    ) -> Result<Self, ConfigError> {
        if deposit_minor == 0 {
            return Err(invalid("deposit_minor", "deposit must be positive"));
        }
        if recovery_per_fast_minor == 0 {
            return Err(invalid(
                "recovery_per_fast_minor",
                "recovery per fast must be positive",
            ));
        }
        if period_length_days == 0 {
            return Err(invalid(
                "period_length_days",
                "period length must be positive",
            ));
        }
        Ok(Self {
            deposit_minor,
            recovery_per_fast_minor,
            period_length_days,
        })
    }

    pub fn deposit_minor(&self) -> u64 {
        self.deposit_minor
    }

    pub fn recovery_per_fast_minor(&self) -> u64 {
        self.recovery_per_fast_minor
    }

    pub fn period_length_days(&self) -> u32 {
        self.period_length_days
    }

    pub fn period_length(&self) -> Duration {
        Duration::days(self.period_length_days as i64)
    }

    /// Completed fasts needed to recover the whole deposit.
    pub fn fasts_for_full_refund(&self) -> u64 {
        self.deposit_minor.div_ceil(self.recovery_per_fast_minor)
    }
}

/// The product defaults: $20 monthly deposit, $2 back per completed fast.
impl Default for VaultPolicy {
    fn default() -> Self {
        Self {
            deposit_minor: 2000,
            recovery_per_fast_minor: 200,
            period_length_days: 30,
        }
    }
}

fn invalid(field: &'static str, message: &str) -> ConfigError {
    ConfigError::InvalidValue {
        field,
        message: message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_policy_needs_ten_fasts() {
        let policy = VaultPolicy::default();
        assert_eq!(policy.fasts_for_full_refund(), 10);
    }

    #[test]
    fn full_refund_rounds_up() {
        let policy = VaultPolicy::new(2000, 300, 30).unwrap();
        assert_eq!(policy.fasts_for_full_refund(), 7);
    }

    #[test]
    fn rejects_non_positive_values() {
        assert!(VaultPolicy::new(0, 200, 30).is_err());
        assert!(VaultPolicy::new(2000, 0, 30).is_err());
        assert!(VaultPolicy::new(2000, 200, 0).is_err());
    }

    #[test]
    fn period_length_in_days() {
        let policy = VaultPolicy::default();
        assert_eq!(policy.period_length(), Duration::days(30));
    }
}
