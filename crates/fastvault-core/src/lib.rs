//! # Fastvault Core Library
//!
//! This library provides the core business logic for Fastvault, the
//! fasting app built around a refundable commitment vault: a fixed
//! monthly deposit that users earn back, fast by fast. All operations
//! are available through this library; the CLI binary (and any GUI) is a
//! thin host layer over the same core.
//!
//! ## Architecture
//!
//! - **Fasting session**: A wall-clock-based state machine. Elapsed time
//!   is recomputed from absolute timestamps on every read, never
//!   accumulated per tick, so host suspensions cannot drift it
//! - **Phase classifier**: A pure table lookup from elapsed fasting
//!   hours to metabolic phase (Fed, Fat Burning, Ketosis, Autophagy)
//! - **Milestone detector**: A pure reducer over snapshot pairs that
//!   reports every hour/phase/goal boundary actually crossed
//! - **Vault ledger**: Converts qualifying sessions into recovered
//!   amount and net cost for the billing period, with duplicate-credit
//!   protection
//! - **Storage**: SQLite fast history and TOML configuration for hosts
//!   that persist between invocations
//!
//! The core is single-threaded and cooperative: nothing blocks, nothing
//! spawns threads, and every failure is a typed, state-preserving error.
//!
//! ## Key Components
//!
//! - [`FastingSession`]: Session lifecycle state machine
//! - [`PhaseTable`]: Metabolic phase classification
//! - [`MilestoneDetector`]: One-shot celebration events
//! - [`VaultLedger`]: Deposit/recovery accounting
//! - [`Database`]: Fast history and snapshot persistence

pub mod clock;
pub mod error;
pub mod events;
pub mod fast;
pub mod storage;
pub mod vault;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{
    ConfigError, CoreError, DatabaseError, LedgerError, Result, TransitionError,
};
pub use events::Event;
pub use fast::{
    FastingPlan, FastingSession, Milestone, MilestoneDetector, Phase, PhaseBand, PhaseReading,
    PhaseTable, SessionSnapshot, SessionStatus,
};
pub use storage::{Config, Database, FastRecord, FastStats};
pub use vault::{VaultAccount, VaultLedger, VaultPolicy};
