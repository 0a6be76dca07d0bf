use clap::Subcommand;
use fastvault_core::{Clock, Config, Database, SystemClock, VaultLedger, VaultPolicy};

use super::{load_ledger, save_ledger, CliResult};

#[derive(Subcommand)]
pub enum VaultAction {
    /// Print the vault account as JSON
    Status,
    /// Record an authorized deposit and open a new billing period
    Deposit {
        /// Deposit in minor currency units; defaults to the configured amount
        #[arg(long)]
        amount: Option<u64>,
    },
    /// Force-close the current period early (subscription settlement)
    Settle {
        /// Why the period is being settled early
        #[arg(long)]
        reason: String,
        /// Deposit for the replacement period, in minor currency units
        #[arg(long)]
        amount: Option<u64>,
    },
}

pub fn run(action: VaultAction) -> CliResult {
    let db = Database::open()?;
    let config = Config::load()?;
    let now = SystemClock.now();
    let policy = config.vault_policy()?;

    match action {
        VaultAction::Status => match load_ledger(&db) {
            None => println!("{}", serde_json::json!({ "authorized": false })),
            Some(ledger) => {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&serde_json::json!({
                        "account": ledger.account(),
                        "projected_fasts_for_full_refund":
                            ledger.projected_fasts_for_full_refund(),
                        "fasts_remaining_for_full_refund":
                            ledger.fasts_remaining_for_full_refund(),
                    }))?
                );
            }
        },
        VaultAction::Deposit { amount } => {
            let deposit_minor = amount.unwrap_or(policy.deposit_minor());
            let (ledger, event) = match load_ledger(&db) {
                None => {
                    let opening = VaultPolicy::new(
                        deposit_minor,
                        policy.recovery_per_fast_minor(),
                        policy.period_length_days(),
                    )?;
                    (VaultLedger::new(opening, now), None)
                }
                Some(mut ledger) => {
                    let event = ledger.start_new_period(
                        deposit_minor,
                        now,
                        now + policy.period_length(),
                        now,
                    )?;
                    (ledger, Some(event))
                }
            };
            save_ledger(&db, &ledger)?;
            println!(
                "{}",
                serde_json::to_string_pretty(&serde_json::json!({
                    "event": event,
                    "account": ledger.account(),
                }))?
            );
        }
        VaultAction::Settle { reason, amount } => {
            let mut ledger =
                load_ledger(&db).ok_or("no vault account; run `vault deposit` first")?;
            let deposit_minor = amount.unwrap_or(policy.deposit_minor());
            let event = ledger.force_new_period(
                deposit_minor,
                now,
                now + policy.period_length(),
                reason,
                now,
            )?;
            save_ledger(&db, &ledger)?;
            println!(
                "{}",
                serde_json::to_string_pretty(&serde_json::json!({
                    "event": event,
                    "account": ledger.account(),
                }))?
            );
        }
    }
    Ok(())
}
