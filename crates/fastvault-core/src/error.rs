//! Core error types for fastvault-core.
//!
//! Every failure in the core is a rejected operation: the call returns a
//! typed error and leaves state unchanged. Nothing in the core retries or
//! recovers silently -- that is the host's decision.

use std::path::PathBuf;
use thiserror::Error;

use crate::fast::SessionStatus;

/// Core error type for fastvault-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Invalid configuration supplied at construction
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// State-machine operation requested from a state that forbids it
    #[error("Transition error: {0}")]
    Transition(#[from] TransitionError),

    /// Vault ledger rejected an operation
    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),

    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors.
///
/// Fatal to the call that supplied the value; never retried automatically.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A duration, amount, or period that must be positive was not
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: &'static str, message: String },

    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),
}

/// Session state-machine errors.
///
/// Recoverable: the UI should not have offered the action, but the state
/// machine still guards against misuse. The session is left unchanged.
#[derive(Error, Debug)]
pub enum TransitionError {
    /// The requested operation is not allowed in the current state
    #[error("Cannot {operation} a session that is {status}")]
    InvalidTransition {
        operation: &'static str,
        status: SessionStatus,
    },
}

/// Vault ledger errors.
#[derive(Error, Debug)]
pub enum LedgerError {
    /// Session is not terminal, or did not fast the committed duration
    #[error("Session {session_id} does not qualify for credit: {reason}")]
    NonQualifyingSession {
        session_id: uuid::Uuid,
        reason: String,
    },

    /// Session id was already credited; treated as a no-op by hosts
    #[error("Session {session_id} was already credited")]
    DuplicateSession { session_id: uuid::Uuid },

    /// `start_new_period` called before the current period ended
    #[error("Current billing period is still open until {period_end}")]
    PeriodStillOpen {
        period_end: chrono::DateTime<chrono::Utc>,
    },

    /// Invalid deposit amount or period boundaries
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Database-specific errors.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Failed to create the data directory
    #[error("Failed to create data directory {path}: {message}")]
    DataDirFailed { path: PathBuf, message: String },

    /// Failed to open database connection
    #[error("Failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Migration failed
    #[error("Database migration failed: {0}")]
    MigrationFailed(String),
}

impl From<rusqlite::Error> for DatabaseError {
    fn from(err: rusqlite::Error) -> Self {
        DatabaseError::QueryFailed(err.to_string())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
