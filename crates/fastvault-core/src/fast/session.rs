//! Fasting session state machine.
//!
//! The session is a wall-clock-based state machine. It owns no thread and
//! no timer: the host calls the transition operations and polls the read
//! operations at whatever cadence it likes, passing `now` explicitly.
//! Elapsed time is recomputed from absolute timestamps on every read, so
//! arbitrarily large gaps between calls (a frozen background tab, a
//! suspended process) cannot drift the accounting.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Running <-> Paused
//!         Running | Paused -> Completed (elapsed >= target)
//!         Running | Paused -> Aborted   (elapsed <  target)
//! ```
//!
//! `Completed` and `Aborted` are terminal: every further transition fails
//! with `InvalidTransition` and leaves the session unchanged.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::phase::{Phase, PhaseReading, PhaseTable};
use super::plan::FastingPlan;
use crate::clock;
use crate::error::{ConfigError, TransitionError};
use crate::events::Event;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Idle,
    Running,
    Paused,
    Completed,
    Aborted,
}

impl SessionStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionStatus::Completed | SessionStatus::Aborted)
    }
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SessionStatus::Idle => "idle",
            SessionStatus::Running => "running",
            SessionStatus::Paused => "paused",
            SessionStatus::Completed => "completed",
            SessionStatus::Aborted => "aborted",
        };
        f.write_str(s)
    }
}

/// Point-in-time sample of a session, consumed by the render layer and
/// the milestone detector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub session_id: Uuid,
    pub status: SessionStatus,
    pub plan: Option<FastingPlan>,
    pub elapsed_secs: u64,
    pub target_secs: u64,
    pub phase: Phase,
    /// 0.0 .. 100.0, clamped at 100 once past target.
    pub progress_pct: f64,
    pub at: DateTime<Utc>,
}

/// One fast's lifecycle and elapsed-time accounting.
///
/// Owned by exactly one logical "current fast"; hosts serialize access.
/// Snapshots serialize losslessly, so the host can persist the session
/// after every transition and rehydrate it on restart.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FastingSession {
    id: Uuid,
    status: SessionStatus,
    /// Immutable for the life of the session; always > 0.
    target_duration_secs: u64,
    #[serde(default)]
    plan: Option<FastingPlan>,
    #[serde(default)]
    started_at: Option<DateTime<Utc>>,
    #[serde(default)]
    paused_at: Option<DateTime<Utc>>,
    #[serde(default)]
    accumulated_paused_secs: u64,
    #[serde(default)]
    completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    aborted_at: Option<DateTime<Utc>>,
    #[serde(default)]
    phases: PhaseTable,
}

impl FastingSession {
    /// Create an idle session with the default phase table.
    ///
    /// Rejects a zero target duration.
    pub fn new(target_duration_secs: u64) -> Result<Self, ConfigError> {
        if target_duration_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "target_duration_secs",
                message: "target duration must be positive".to_string(),
            });
        }
        Ok(Self {
            id: Uuid::new_v4(),
            status: SessionStatus::Idle,
            target_duration_secs,
            plan: None,
            started_at: None,
            paused_at: None,
            accumulated_paused_secs: 0,
            completed_at: None,
            aborted_at: None,
            phases: PhaseTable::default(),
        })
    }

    /// Create an idle session for a named plan.
    pub fn for_plan(plan: FastingPlan) -> Self {
        Self {
            id: Uuid::new_v4(),
            status: SessionStatus::Idle,
            target_duration_secs: plan.target_duration_secs(),
            plan: Some(plan),
            started_at: None,
            paused_at: None,
            accumulated_paused_secs: 0,
            completed_at: None,
            aborted_at: None,
            phases: PhaseTable::default(),
        }
    }

    /// Replace the phase table (e.g. with a configured custom timeline).
    pub fn with_phase_table(mut self, phases: PhaseTable) -> Self {
        self.phases = phases;
        self
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn plan(&self) -> Option<FastingPlan> {
        self.plan
    }

    pub fn target_duration_secs(&self) -> u64 {
        self.target_duration_secs
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    pub fn accumulated_paused_secs(&self) -> u64 {
        self.accumulated_paused_secs
    }

    /// Terminal timestamp, once `Completed` or `Aborted`.
    pub fn ended_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at.or(self.aborted_at)
    }

    pub fn phases(&self) -> &PhaseTable {
        &self.phases
    }

    /// Seconds of actual fasting: wall time since start minus time spent
    /// paused. Frozen at the terminal timestamp once the session ends;
    /// may exceed the target while the user keeps a fast running.
    pub fn elapsed_seconds(&self, now: DateTime<Utc>) -> u64 {
        let Some(started_at) = self.started_at else {
            return 0;
        };
        let reference = match self.status {
            SessionStatus::Idle => return 0,
            SessionStatus::Running => now,
            SessionStatus::Paused => self.paused_at.unwrap_or(now),
            SessionStatus::Completed => self.completed_at.unwrap_or(now),
            SessionStatus::Aborted => self.aborted_at.unwrap_or(now),
        };
        clock::elapsed_seconds(started_at, self.accumulated_paused_secs, reference)
    }

    /// Frozen elapsed time of a terminal session; `None` while live.
    pub fn final_elapsed_seconds(&self) -> Option<u64> {
        let ended_at = self.ended_at()?;
        Some(self.elapsed_seconds(ended_at))
    }

    /// Classify the current metabolic phase from elapsed fasting hours.
    ///
    /// Keeps returning the (open-ended) final phase past the target.
    pub fn current_phase(&self, now: DateTime<Utc>) -> PhaseReading {
        self.phases.classify(self.elapsed_seconds(now) as f64 / 3600.0)
    }

    /// 0.0 .. 100.0 progress toward the target duration.
    pub fn progress_pct(&self, now: DateTime<Utc>) -> f64 {
        let pct =
            self.elapsed_seconds(now) as f64 / self.target_duration_secs as f64 * 100.0;
        pct.min(100.0)
    }

    /// Build a full point-in-time sample.
    pub fn snapshot(&self, now: DateTime<Utc>) -> SessionSnapshot {
        SessionSnapshot {
            session_id: self.id,
            status: self.status,
            plan: self.plan,
            elapsed_secs: self.elapsed_seconds(now),
            target_secs: self.target_duration_secs,
            phase: self.current_phase(now).phase,
            progress_pct: self.progress_pct(now),
            at: now,
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Begin a fast, or resume a paused one.
    ///
    /// `Idle -> Running` stamps `started_at`; `Paused -> Running` folds
    /// the ended pause into the accumulated paused total. Any other state
    /// fails with `InvalidTransition`.
    pub fn start(&mut self, now: DateTime<Utc>) -> Result<Event, TransitionError> {
        match self.status {
            SessionStatus::Idle => {
                self.started_at = Some(now);
                self.status = SessionStatus::Running;
                Ok(Event::SessionStarted {
                    session_id: self.id,
                    target_secs: self.target_duration_secs,
                    at: now,
                })
            }
            SessionStatus::Paused => {
                let paused_at = self.paused_at.take().unwrap_or(now);
                let paused_secs = (now - paused_at).num_seconds().max(0) as u64;
                self.accumulated_paused_secs += paused_secs;
                self.status = SessionStatus::Running;
                Ok(Event::SessionResumed {
                    session_id: self.id,
                    paused_secs,
                    at: now,
                })
            }
            status => Err(TransitionError::InvalidTransition {
                operation: "start",
                status,
            }),
        }
    }

    /// `Running -> Paused`. Elapsed time freezes at `now` until resumed.
    pub fn pause(&mut self, now: DateTime<Utc>) -> Result<Event, TransitionError> {
        match self.status {
            SessionStatus::Running => {
                self.paused_at = Some(now);
                self.status = SessionStatus::Paused;
                Ok(Event::SessionPaused {
                    session_id: self.id,
                    elapsed_secs: self.elapsed_seconds(now),
                    at: now,
                })
            }
            status => Err(TransitionError::InvalidTransition {
                operation: "pause",
                status,
            }),
        }
    }

    /// End the fast: `Completed` when the committed duration was reached,
    /// `Aborted` otherwise. Not idempotent -- a second `stop` fails.
    pub fn stop(&mut self, now: DateTime<Utc>) -> Result<Event, TransitionError> {
        match self.status {
            SessionStatus::Running | SessionStatus::Paused => {
                if let Some(paused_at) = self.paused_at.take() {
                    // Close the open pause so the frozen elapsed time
                    // equals the value at the moment of pausing.
                    self.accumulated_paused_secs +=
                        (now - paused_at).num_seconds().max(0) as u64;
                }
                let elapsed = clock::elapsed_seconds(
                    self.started_at.unwrap_or(now),
                    self.accumulated_paused_secs,
                    now,
                );
                if elapsed >= self.target_duration_secs {
                    self.completed_at = Some(now);
                    self.status = SessionStatus::Completed;
                    Ok(Event::SessionCompleted {
                        session_id: self.id,
                        elapsed_secs: elapsed,
                        target_secs: self.target_duration_secs,
                        at: now,
                    })
                } else {
                    self.aborted_at = Some(now);
                    self.status = SessionStatus::Aborted;
                    Ok(Event::SessionAborted {
                        session_id: self.id,
                        elapsed_secs: elapsed,
                        target_secs: self.target_duration_secs,
                        at: now,
                    })
                }
            }
            status => Err(TransitionError::InvalidTransition {
                operation: "stop",
                status,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fast::Phase;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 10, 20, 0, 0).unwrap()
    }

    fn hours(h: i64) -> Duration {
        Duration::hours(h)
    }

    #[test]
    fn rejects_zero_target() {
        assert!(FastingSession::new(0).is_err());
    }

    #[test]
    fn start_pause_resume_stop() {
        let mut session = FastingSession::new(16 * 3600).unwrap();
        assert_eq!(session.status(), SessionStatus::Idle);
        assert_eq!(session.elapsed_seconds(t0()), 0);

        session.start(t0()).unwrap();
        assert_eq!(session.status(), SessionStatus::Running);

        session.pause(t0() + hours(8)).unwrap();
        assert_eq!(session.status(), SessionStatus::Paused);

        session.start(t0() + hours(10)).unwrap();
        assert_eq!(session.status(), SessionStatus::Running);
        assert_eq!(session.accumulated_paused_secs(), 2 * 3600);

        let event = session.stop(t0() + hours(18)).unwrap();
        assert_eq!(session.status(), SessionStatus::Completed);
        match event {
            Event::SessionCompleted { elapsed_secs, .. } => assert_eq!(elapsed_secs, 57_600),
            other => panic!("expected SessionCompleted, got {other:?}"),
        }
    }

    // Target 16h, pause for 2h at +8h, resume, stop when cumulative
    // running time reaches 16h. Wall time is 18h but fasting time is 16h,
    // so the session completes and reads as Ketosis, not Autophagy.
    #[test]
    fn paused_time_does_not_count_toward_phase() {
        let mut session = FastingSession::new(57_600).unwrap();
        session.start(t0()).unwrap();
        session.pause(t0() + hours(8)).unwrap();
        session.start(t0() + hours(10)).unwrap();

        let stop_at = t0() + hours(18);
        assert_eq!(session.elapsed_seconds(stop_at), 57_600);
        session.stop(stop_at).unwrap();

        assert_eq!(session.status(), SessionStatus::Completed);
        assert_eq!(session.final_elapsed_seconds(), Some(57_600));
        assert_eq!(session.current_phase(stop_at).phase, Phase::Ketosis);
    }

    #[test]
    fn elapsed_is_frozen_while_paused() {
        let mut session = FastingSession::new(57_600).unwrap();
        session.start(t0()).unwrap();
        session.pause(t0() + hours(5)).unwrap();
        assert_eq!(session.elapsed_seconds(t0() + hours(5)), 5 * 3600);
        assert_eq!(session.elapsed_seconds(t0() + hours(9)), 5 * 3600);
    }

    #[test]
    fn stop_from_paused_freezes_elapsed_at_pause_time() {
        let mut session = FastingSession::new(57_600).unwrap();
        session.start(t0()).unwrap();
        session.pause(t0() + hours(6)).unwrap();
        session.stop(t0() + hours(12)).unwrap();
        assert_eq!(session.status(), SessionStatus::Aborted);
        assert_eq!(session.final_elapsed_seconds(), Some(6 * 3600));
    }

    #[test]
    fn stop_short_of_target_aborts() {
        let mut session = FastingSession::new(18 * 3600).unwrap();
        session.start(t0()).unwrap();
        let event = session.stop(t0() + hours(10)).unwrap();
        assert_eq!(session.status(), SessionStatus::Aborted);
        match event {
            Event::SessionAborted { elapsed_secs, .. } => assert_eq!(elapsed_secs, 36_000),
            other => panic!("expected SessionAborted, got {other:?}"),
        }
    }

    #[test]
    fn session_may_run_past_target() {
        let mut session = FastingSession::new(16 * 3600).unwrap();
        session.start(t0()).unwrap();
        let late = t0() + hours(20);
        assert_eq!(session.elapsed_seconds(late), 20 * 3600);
        assert_eq!(session.current_phase(late).phase, Phase::Autophagy);
        assert_eq!(session.current_phase(late).next_phase, None);
        assert_eq!(session.progress_pct(late), 100.0);

        session.stop(late).unwrap();
        assert_eq!(session.status(), SessionStatus::Completed);
    }

    #[test]
    fn invalid_transitions_are_rejected() {
        let mut session = FastingSession::new(3600).unwrap();
        assert!(session.pause(t0()).is_err());
        assert!(session.stop(t0()).is_err());

        session.start(t0()).unwrap();
        assert!(session.start(t0()).is_err()); // already running

        session.pause(t0() + hours(1)).unwrap();
        assert!(session.pause(t0() + hours(1)).is_err()); // already paused
    }

    #[test]
    fn terminal_sessions_are_immutable() {
        let mut session = FastingSession::new(3600).unwrap();
        session.start(t0()).unwrap();
        session.stop(t0() + hours(2)).unwrap();
        let before = serde_json::to_string(&session).unwrap();

        assert!(session.start(t0() + hours(3)).is_err());
        assert!(session.pause(t0() + hours(3)).is_err());
        assert!(session.stop(t0() + hours(3)).is_err());

        let after = serde_json::to_string(&session).unwrap();
        assert_eq!(before, after);
        // Elapsed stays frozen no matter how late it is read.
        assert_eq!(session.elapsed_seconds(t0() + hours(50)), 2 * 3600);
    }

    #[test]
    fn for_plan_uses_plan_target() {
        let session = FastingSession::for_plan(FastingPlan::EighteenSix);
        assert_eq!(session.target_duration_secs(), 18 * 3600);
        assert_eq!(session.plan(), Some(FastingPlan::EighteenSix));
    }

    #[test]
    fn snapshot_roundtrips_through_json() {
        let mut session = FastingSession::for_plan(FastingPlan::SixteenEight);
        session.start(t0()).unwrap();
        let json = serde_json::to_string(&session).unwrap();
        let restored: FastingSession = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.id(), session.id());
        assert_eq!(restored.status(), SessionStatus::Running);
        assert_eq!(
            restored.elapsed_seconds(t0() + hours(3)),
            session.elapsed_seconds(t0() + hours(3))
        );
    }
}
