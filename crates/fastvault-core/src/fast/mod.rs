mod milestones;
mod phase;
mod plan;
mod session;

pub use milestones::{Milestone, MilestoneDetector};
pub use phase::{Phase, PhaseBand, PhaseReading, PhaseTable};
pub use plan::FastingPlan;
pub use session::{FastingSession, SessionSnapshot, SessionStatus};
