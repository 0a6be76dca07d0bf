pub mod config;
pub mod database;

pub use config::Config;
pub use database::{Database, FastRecord, FastStats};

use std::path::PathBuf;

/// Returns `~/.config/fastvault[-dev]/` based on FASTVAULT_ENV.
///
/// Set FASTVAULT_ENV=dev to use the development data directory. The
/// directory is not created here; callers create it before writing.
pub fn data_dir() -> PathBuf {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    match std::env::var("FASTVAULT_ENV").as_deref() {
        Ok("dev") => base_dir.join("fastvault-dev"),
        _ => base_dir.join("fastvault"),
    }
}
