use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Every successful state change in the core produces an Event.
/// The host renders them, and persists the snapshot that follows each one.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    SessionStarted {
        session_id: Uuid,
        target_secs: u64,
        at: DateTime<Utc>,
    },
    SessionPaused {
        session_id: Uuid,
        elapsed_secs: u64,
        at: DateTime<Utc>,
    },
    SessionResumed {
        session_id: Uuid,
        /// Length of the pause that just ended, in seconds.
        paused_secs: u64,
        at: DateTime<Utc>,
    },
    /// Session stopped at or past its target duration (qualifying).
    SessionCompleted {
        session_id: Uuid,
        elapsed_secs: u64,
        target_secs: u64,
        at: DateTime<Utc>,
    },
    /// Session stopped short of its target duration (non-qualifying).
    SessionAborted {
        session_id: Uuid,
        elapsed_secs: u64,
        target_secs: u64,
        at: DateTime<Utc>,
    },
    /// A qualifying fast was credited against the vault deposit.
    FastCredited {
        session_id: Uuid,
        fasts_completed: u32,
        recovered_minor: u64,
        net_cost_minor: u64,
        at: DateTime<Utc>,
    },
    /// A new billing period opened after the previous one ended.
    PeriodOpened {
        period_start: DateTime<Utc>,
        period_end: DateTime<Utc>,
        deposit_minor: u64,
        at: DateTime<Utc>,
    },
    /// A new billing period was forced open mid-period by an
    /// administrative override (e.g. subscription settlement).
    PeriodForceOpened {
        reason: String,
        period_start: DateTime<Utc>,
        period_end: DateTime<Utc>,
        deposit_minor: u64,
        at: DateTime<Utc>,
    },
}
