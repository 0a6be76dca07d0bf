//! One-shot milestone detection over session snapshots.
//!
//! The detector is a pure reducer: the host feeds it the previous and
//! current [`SessionSnapshot`] at whatever cadence it likes (including a
//! single huge jump after resuming from background) and gets back every
//! boundary actually crossed in between, in chronological order. It keeps
//! no timers and no internal state, so each logical crossing is reported
//! exactly once no matter how irregular the sampling is.

use serde::{Deserialize, Serialize};

use super::phase::{Phase, PhaseTable};
use super::session::SessionSnapshot;

/// Discrete celebration-worthy events derived from a snapshot pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Milestone {
    /// An integer hour boundary was crossed (`hour` is 1-based).
    HourCrossed { hour: u64 },
    /// The fast moved into a new metabolic phase.
    PhaseChanged { from: Phase, to: Phase },
    /// Elapsed time first reached the committed target duration.
    GoalReached,
}

/// Derives [`Milestone`]s from consecutive session snapshots.
#[derive(Debug, Clone, Default)]
pub struct MilestoneDetector {
    phases: PhaseTable,
}

impl MilestoneDetector {
    /// Detector using the same phase table the session was built with.
    pub fn new(phases: PhaseTable) -> Self {
        Self { phases }
    }

    /// Every milestone crossed between `prev` and `curr`.
    ///
    /// Events are ordered by the instant they occurred; where an hour
    /// boundary and a phase boundary coincide the hour event comes first,
    /// and `GoalReached` sorts after both. Non-increasing elapsed time
    /// yields no events.
    pub fn detect(&self, prev: &SessionSnapshot, curr: &SessionSnapshot) -> Vec<Milestone> {
        let prev_secs = prev.elapsed_secs;
        let curr_secs = curr.elapsed_secs;
        if curr_secs <= prev_secs {
            return Vec::new();
        }

        // (instant in seconds, tie-break rank, milestone)
        let mut crossings: Vec<(u64, u8, Milestone)> = Vec::new();

        let first_hour = prev_secs / 3600 + 1;
        let last_hour = curr_secs / 3600;
        for hour in first_hour..=last_hour {
            crossings.push((hour * 3600, 0, Milestone::HourCrossed { hour }));
        }

        let prev_hours = prev_secs as f64 / 3600.0;
        let curr_hours = curr_secs as f64 / 3600.0;
        for pair in self.phases.bands().windows(2) {
            let boundary = pair[1].start_hour;
            if prev_hours < boundary && curr_hours >= boundary {
                crossings.push((
                    (boundary * 3600.0).ceil() as u64,
                    1,
                    Milestone::PhaseChanged {
                        from: pair[0].phase,
                        to: pair[1].phase,
                    },
                ));
            }
        }

        let target = curr.target_secs;
        if prev_secs < target && curr_secs >= target {
            crossings.push((target, 2, Milestone::GoalReached));
        }

        crossings.sort_by_key(|(at, rank, _)| (*at, *rank));
        crossings.into_iter().map(|(_, _, m)| m).collect()
    }
}
