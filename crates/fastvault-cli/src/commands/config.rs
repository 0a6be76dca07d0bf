use clap::Subcommand;
use fastvault_core::Config;

use super::CliResult;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print the current configuration as TOML
    Show,
    /// Set the fasting plan: 16:8, 18:6, or omad
    SetPlan { plan: String },
    /// Set the monthly deposit, in minor currency units
    SetDeposit { minor: u64 },
    /// Set the per-fast recovery, in minor currency units
    SetRecovery { minor: u64 },
    /// Set the billing period length, in days
    SetPeriodDays { days: u32 },
}

pub fn run(action: ConfigAction) -> CliResult {
    match action {
        ConfigAction::Show => {
            let config = Config::load()?;
            print!("{}", config.to_toml()?);
        }
        ConfigAction::SetPlan { plan } => {
            let mut config = Config::load()?;
            config.fasting.plan = plan.parse()?;
            config.save()?;
            println!("plan = \"{}\"", config.fasting.plan);
        }
        ConfigAction::SetDeposit { minor } => {
            let mut config = Config::load()?;
            config.vault.deposit_minor = minor;
            config.vault_policy()?; // reject zero before persisting
            config.save()?;
            println!("deposit_minor = {minor}");
        }
        ConfigAction::SetRecovery { minor } => {
            let mut config = Config::load()?;
            config.vault.recovery_per_fast_minor = minor;
            config.vault_policy()?;
            config.save()?;
            println!("recovery_per_fast_minor = {minor}");
        }
        ConfigAction::SetPeriodDays { days } => {
            let mut config = Config::load()?;
            config.vault.period_length_days = days;
            config.vault_policy()?;
            config.save()?;
            println!("period_length_days = {days}");
        }
    }
    Ok(())
}
