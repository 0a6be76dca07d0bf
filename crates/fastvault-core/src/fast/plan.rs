use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Named fasting plans offered by the onboarding wizard.
///
/// The wire names (`16:8`, `18:6`, `omad`) match the values the host app
/// stores for the user's chosen plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FastingPlan {
    #[serde(rename = "16:8")]
    SixteenEight,
    #[serde(rename = "18:6")]
    EighteenSix,
    /// One meal a day (23:1).
    #[serde(rename = "omad")]
    Omad,
}

impl FastingPlan {
    /// Hours of the daily fasting window.
    pub fn fasting_hours(&self) -> u64 {
        match self {
            FastingPlan::SixteenEight => 16,
            FastingPlan::EighteenSix => 18,
            FastingPlan::Omad => 23,
        }
    }

    /// Hours of the daily eating window.
    pub fn eating_hours(&self) -> u64 {
        24 - self.fasting_hours()
    }

    /// Target duration of a single fast under this plan.
    pub fn target_duration_secs(&self) -> u64 {
        self.fasting_hours() * 3600
    }

    pub fn label(&self) -> &'static str {
        match self {
            FastingPlan::SixteenEight => "16:8",
            FastingPlan::EighteenSix => "18:6",
            FastingPlan::Omad => "23:1 OMAD",
        }
    }
}

impl Default for FastingPlan {
    fn default() -> Self {
        FastingPlan::SixteenEight
    }
}

impl std::fmt::Display for FastingPlan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for FastingPlan {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "16:8" => Ok(FastingPlan::SixteenEight),
            "18:6" => Ok(FastingPlan::EighteenSix),
            "omad" | "23:1" => Ok(FastingPlan::Omad),
            other => Err(ConfigError::InvalidValue {
                field: "plan",
                message: format!("unknown fasting plan '{other}' (expected 16:8, 18:6, or omad)"),
            }),
        }
    }
}
