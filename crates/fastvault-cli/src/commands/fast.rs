use clap::Subcommand;
use fastvault_core::{
    Clock, Config, Database, FastingPlan, FastingSession, LedgerError, MilestoneDetector,
    SessionSnapshot, SessionStatus, SystemClock, VaultLedger,
};

use super::{
    load_ledger, load_session, save_ledger, save_session, CliResult, SNAPSHOT_KEY,
};

#[derive(Subcommand)]
pub enum FastAction {
    /// Start a new fast, or resume a paused one
    Start {
        /// Target duration in hours (overrides the configured plan)
        #[arg(long)]
        hours: Option<u64>,
        /// Fasting plan to use: 16:8, 18:6, or omad
        #[arg(long)]
        plan: Option<String>,
    },
    /// Pause the running fast
    Pause,
    /// Resume a paused fast
    Resume,
    /// Stop the current fast; completes or aborts based on elapsed time
    Stop,
    /// Print the current snapshot and newly crossed milestones as JSON
    Status,
}

pub fn run(action: FastAction) -> CliResult {
    let db = Database::open()?;
    let config = Config::load()?;
    let now = SystemClock.now();

    match action {
        FastAction::Start { hours, plan } => {
            if let Some(mut session) = load_session(&db) {
                if !session.status().is_terminal() {
                    // A live session exists: resume it (or fail if running).
                    let event = session.start(now)?;
                    save_session(&db, &session)?;
                    println!("{}", serde_json::to_string_pretty(&event)?);
                    return Ok(());
                }
            }
            let table = config.phase_table()?;
            let mut session = match (hours, plan) {
                (Some(hours), _) => FastingSession::new(hours * 3600)?.with_phase_table(table),
                (None, Some(plan)) => {
                    let plan: FastingPlan = plan.parse()?;
                    FastingSession::for_plan(plan).with_phase_table(table)
                }
                (None, None) => {
                    FastingSession::for_plan(config.fasting.plan).with_phase_table(table)
                }
            };
            let event = session.start(now)?;
            db.kv_delete(SNAPSHOT_KEY)?;
            save_session(&db, &session)?;
            println!("{}", serde_json::to_string_pretty(&event)?);
        }
        FastAction::Pause => {
            let mut session = load_session(&db).ok_or("no active fast")?;
            let event = session.pause(now)?;
            save_session(&db, &session)?;
            println!("{}", serde_json::to_string_pretty(&event)?);
        }
        FastAction::Resume => {
            let mut session = load_session(&db).ok_or("no active fast")?;
            let event = session.start(now)?;
            save_session(&db, &session)?;
            println!("{}", serde_json::to_string_pretty(&event)?);
        }
        FastAction::Stop => {
            let mut session = load_session(&db).ok_or("no active fast")?;
            let event = session.stop(now)?;
            db.record_fast(&session)?;
            save_session(&db, &session)?;

            let mut credit = None;
            if session.status() == SessionStatus::Completed {
                let mut ledger = match load_ledger(&db) {
                    Some(ledger) => ledger,
                    None => VaultLedger::new(config.vault_policy()?, now),
                };
                match ledger.record_completed_session(&session, now) {
                    Ok(credited) => {
                        save_ledger(&db, &ledger)?;
                        credit = Some(credited);
                    }
                    Err(LedgerError::DuplicateSession { session_id }) => {
                        eprintln!("warning: session {session_id} was already credited");
                    }
                    Err(e) => return Err(e.into()),
                }
            }
            println!(
                "{}",
                serde_json::to_string_pretty(&serde_json::json!({
                    "session": event,
                    "vault": credit,
                }))?
            );
        }
        FastAction::Status => match load_session(&db) {
            None => println!("{}", serde_json::json!({ "active": false })),
            Some(session) => {
                let snapshot = session.snapshot(now);
                let detector = MilestoneDetector::new(session.phases().clone());
                let milestones = match previous_snapshot(&db) {
                    Some(prev) if prev.session_id == snapshot.session_id => {
                        detector.detect(&prev, &snapshot)
                    }
                    _ => Vec::new(),
                };
                db.kv_set(SNAPSHOT_KEY, &serde_json::to_string(&snapshot)?)?;
                println!(
                    "{}",
                    serde_json::to_string_pretty(&serde_json::json!({
                        "snapshot": snapshot,
                        "phase": session.current_phase(now),
                        "milestones": milestones,
                    }))?
                );
            }
        },
    }
    Ok(())
}

fn previous_snapshot(db: &Database) -> Option<SessionSnapshot> {
    let json = db.kv_get(SNAPSHOT_KEY).ok().flatten()?;
    serde_json::from_str(&json).ok()
}
