//! TOML-based application configuration.
//!
//! Stores user preferences:
//! - The chosen fasting plan
//! - Vault accounting values (deposit, recovery per fast, period length)
//! - An optional custom metabolic phase table
//!
//! Configuration is stored at `~/.config/fastvault/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::data_dir;
use crate::error::ConfigError;
use crate::fast::{FastingPlan, PhaseBand, PhaseTable};
use crate::vault::VaultPolicy;

/// Fasting-specific configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FastingConfig {
    #[serde(default)]
    pub plan: FastingPlan,
}

/// Vault accounting configuration, in minor currency units / days.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VaultConfig {
    #[serde(default = "default_deposit_minor")]
    pub deposit_minor: u64,
    #[serde(default = "default_recovery_minor")]
    pub recovery_per_fast_minor: u64,
    #[serde(default = "default_period_days")]
    pub period_length_days: u32,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            deposit_minor: default_deposit_minor(),
            recovery_per_fast_minor: default_recovery_minor(),
            period_length_days: default_period_days(),
        }
    }
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/fastvault/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub fasting: FastingConfig,
    #[serde(default)]
    pub vault: VaultConfig,
    /// Custom metabolic phase bands; the built-in table when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phases: Option<Vec<PhaseBand>>,
}

impl Config {
    pub fn path() -> PathBuf {
        data_dir().join("config.toml")
    }

    /// Load the configuration, falling back to defaults when the file
    /// does not exist yet.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::path();
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(&path).map_err(|e| ConfigError::LoadFailed {
            path: path.clone(),
            message: e.to_string(),
        })?;
        toml::from_str(&raw).map_err(|e| ConfigError::ParseFailed(e.to_string()))
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        let dir = data_dir();
        std::fs::create_dir_all(&dir).map_err(|e| ConfigError::SaveFailed {
            path: dir.clone(),
            message: e.to_string(),
        })?;
        let path = Self::path();
        let raw = self.to_toml()?;
        std::fs::write(&path, raw).map_err(|e| ConfigError::SaveFailed {
            path,
            message: e.to_string(),
        })
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::SaveFailed {
            path: Self::path(),
            message: e.to_string(),
        })
    }

    /// Validated vault policy from the configured values.
    pub fn vault_policy(&self) -> Result<VaultPolicy, ConfigError> {
        VaultPolicy::new(
            self.vault.deposit_minor,
            self.vault.recovery_per_fast_minor,
            self.vault.period_length_days,
        )
    }

    /// Validated phase table: the custom bands if configured, otherwise
    /// the default metabolic timeline.
    pub fn phase_table(&self) -> Result<PhaseTable, ConfigError> {
        match &self.phases {
            Some(bands) => PhaseTable::new(bands.clone()),
            None => Ok(PhaseTable::default()),
        }
    }

    pub fn target_duration_secs(&self) -> u64 {
        self.fasting.plan.target_duration_secs()
    }
}

fn default_deposit_minor() -> u64 {
    2000
}

fn default_recovery_minor() -> u64 {
    200
}

fn default_period_days() -> u32 {
    30
}
