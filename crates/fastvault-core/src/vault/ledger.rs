//! Commitment vault ledger.
//!
//! Converts a stream of completed fasting sessions into recovered amount,
//! net cost, and refund progress for the current billing period. The
//! ledger is in-memory and serializable; the host persists it after every
//! successful mutation.
//!
//! Crediting is safe under at-least-once delivery: every credited session
//! id is remembered and a duplicate submission is rejected with
//! `DuplicateSession` instead of double-crediting.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::policy::VaultPolicy;
use crate::error::{ConfigError, LedgerError};
use crate::events::Event;
use crate::fast::{FastingSession, SessionStatus};

/// The monthly deposit account for one billing period.
///
/// Invariant: `0 <= recovered_minor <= deposit_minor`, and
/// `net_cost_minor = deposit_minor - recovered_minor`, after every
/// operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultAccount {
    pub deposit_minor: u64,
    pub recovery_per_fast_minor: u64,
    pub fasts_completed: u32,
    pub recovered_minor: u64,
    pub net_cost_minor: u64,
    pub period_start: DateTime<Utc>,
    pub period_end: DateTime<Utc>,
}

/// Deposit/recovery ledger driven by completed sessions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VaultLedger {
    policy: VaultPolicy,
    account: VaultAccount,
    /// Session ids credited so far. Never cleared on period rollover, so
    /// a retried submission from before the rollover still cannot credit
    /// twice.
    credited: HashSet<Uuid>,
}

impl VaultLedger {
    /// Open the first billing period at `period_start`, funded with the
    /// policy's deposit.
    pub fn new(policy: VaultPolicy, period_start: DateTime<Utc>) -> Self {
        let account = VaultAccount {
            deposit_minor: policy.deposit_minor(),
            recovery_per_fast_minor: policy.recovery_per_fast_minor(),
            fasts_completed: 0,
            recovered_minor: 0,
            net_cost_minor: policy.deposit_minor(),
            period_start,
            period_end: period_start + policy.period_length(),
        };
        Self {
            policy,
            account,
            credited: HashSet::new(),
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn policy(&self) -> &VaultPolicy {
        &self.policy
    }

    pub fn account(&self) -> &VaultAccount {
        &self.account
    }

    /// Completed fasts needed to recover the current period's deposit.
    pub fn projected_fasts_for_full_refund(&self) -> u64 {
        self.account
            .deposit_minor
            .div_ceil(self.account.recovery_per_fast_minor.max(1))
    }

    /// How many more qualifying fasts until the deposit is fully
    /// recovered this period.
    pub fn fasts_remaining_for_full_refund(&self) -> u64 {
        self.projected_fasts_for_full_refund()
            .saturating_sub(self.account.fasts_completed as u64)
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Credit one qualifying session against the deposit.
    ///
    /// Fails with `NonQualifyingSession` unless the session is
    /// `Completed` with frozen elapsed time at least its target, and with
    /// `DuplicateSession` if this id was credited before. Errors leave
    /// the account unchanged.
    pub fn record_completed_session(
        &mut self,
        session: &FastingSession,
        now: DateTime<Utc>,
    ) -> Result<Event, LedgerError> {
        let session_id = session.id();
        match session.status() {
            SessionStatus::Completed => {}
            status => {
                return Err(LedgerError::NonQualifyingSession {
                    session_id,
                    reason: format!("session is {status}, not completed"),
                });
            }
        }
        let elapsed = session.final_elapsed_seconds().unwrap_or(0);
        if elapsed < session.target_duration_secs() {
            return Err(LedgerError::NonQualifyingSession {
                session_id,
                reason: format!(
                    "elapsed {elapsed}s is short of the {}s target",
                    session.target_duration_secs()
                ),
            });
        }
        if self.credited.contains(&session_id) {
            return Err(LedgerError::DuplicateSession { session_id });
        }

        self.credited.insert(session_id);
        self.account.fasts_completed += 1;
        self.recompute();
        Ok(Event::FastCredited {
            session_id,
            fasts_completed: self.account.fasts_completed,
            recovered_minor: self.account.recovered_minor,
            net_cost_minor: self.account.net_cost_minor,
            at: now,
        })
    }

    /// Open the next billing period with a freshly authorized deposit.
    ///
    /// Only valid once the current period has ended; resets the fast
    /// counter and recovered amount.
    pub fn start_new_period(
        &mut self,
        deposit_minor: u64,
        period_start: DateTime<Utc>,
        period_end: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<Event, LedgerError> {
        if now < self.account.period_end {
            return Err(LedgerError::PeriodStillOpen {
                period_end: self.account.period_end,
            });
        }
        self.apply_new_period(deposit_minor, period_start, period_end)?;
        Ok(Event::PeriodOpened {
            period_start,
            period_end,
            deposit_minor,
            at: now,
        })
    }

    /// Administrative override: open a new period mid-cycle (e.g. a
    /// subscription cancellation settlement). Recorded as a distinct
    /// event rather than silently allowed.
    pub fn force_new_period(
        &mut self,
        deposit_minor: u64,
        period_start: DateTime<Utc>,
        period_end: DateTime<Utc>,
        reason: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Result<Event, LedgerError> {
        self.apply_new_period(deposit_minor, period_start, period_end)?;
        Ok(Event::PeriodForceOpened {
            reason: reason.into(),
            period_start,
            period_end,
            deposit_minor,
            at: now,
        })
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn apply_new_period(
        &mut self,
        deposit_minor: u64,
        period_start: DateTime<Utc>,
        period_end: DateTime<Utc>,
    ) -> Result<(), LedgerError> {
        if deposit_minor == 0 {
            return Err(ConfigError::InvalidValue {
                field: "deposit_minor",
                message: "deposit must be positive".to_string(),
            }
            .into());
        }
        if period_end <= period_start {
            return Err(ConfigError::InvalidValue {
                field: "period_end",
                message: "period end must be after period start".to_string(),
            }
            .into());
        }
        self.account.deposit_minor = deposit_minor;
        self.account.fasts_completed = 0;
        self.account.period_start = period_start;
        self.account.period_end = period_end;
        self.recompute();
        Ok(())
    }

    fn recompute(&mut self) {
        let earned = (self.account.fasts_completed as u64)
            .saturating_mul(self.account.recovery_per_fast_minor);
        self.account.recovered_minor = earned.min(self.account.deposit_minor);
        self.account.net_cost_minor = self.account.deposit_minor - self.account.recovered_minor;
    }
}
