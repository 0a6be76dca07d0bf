pub mod config;
pub mod fast;
pub mod stats;
pub mod vault;

use fastvault_core::{Database, FastingSession, VaultLedger};

pub(crate) type CliResult = Result<(), Box<dyn std::error::Error>>;

/// kv keys for the snapshots persisted between invocations.
pub(crate) const SESSION_KEY: &str = "fasting_session";
pub(crate) const SNAPSHOT_KEY: &str = "last_snapshot";
pub(crate) const LEDGER_KEY: &str = "vault_ledger";

pub(crate) fn load_session(db: &Database) -> Option<FastingSession> {
    let json = db.kv_get(SESSION_KEY).ok().flatten()?;
    serde_json::from_str(&json).ok()
}

pub(crate) fn save_session(db: &Database, session: &FastingSession) -> CliResult {
    db.kv_set(SESSION_KEY, &serde_json::to_string(session)?)?;
    Ok(())
}

pub(crate) fn load_ledger(db: &Database) -> Option<VaultLedger> {
    let json = db.kv_get(LEDGER_KEY).ok().flatten()?;
    serde_json::from_str(&json).ok()
}

pub(crate) fn save_ledger(db: &Database, ledger: &VaultLedger) -> CliResult {
    db.kv_set(LEDGER_KEY, &serde_json::to_string(ledger)?)?;
    Ok(())
}
