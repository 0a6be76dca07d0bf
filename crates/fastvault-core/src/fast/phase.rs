//! Metabolic phase classification.
//!
//! Phases are a fixed, ordered partition of elapsed fasting hours: each
//! band covers `[start_hour, end_hour)` and the last band is open-ended.
//! Classification is a pure function over the table -- no hidden state --
//! so it can be table-driven tested exhaustively.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// A named metabolic stage, keyed purely off elapsed fasting hours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Fed,
    FatBurning,
    Ketosis,
    Autophagy,
}

impl Phase {
    pub fn label(&self) -> &'static str {
        match self {
            Phase::Fed => "Fed",
            Phase::FatBurning => "Fat Burning",
            Phase::Ketosis => "Ketosis",
            Phase::Autophagy => "Autophagy",
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// One row of the phase table: `phase` holds for hours in
/// `[start_hour, end_hour)`, or `[start_hour, inf)` when `end_hour` is `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseBand {
    pub phase: Phase,
    pub start_hour: f64,
    /// `None` marks the open-ended final band.
    pub end_hour: Option<f64>,
    #[serde(default)]
    pub description: String,
}

/// Result of classifying an elapsed duration against a [`PhaseTable`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhaseReading {
    pub phase: Phase,
    pub hours_into_phase: f64,
    /// `None` once inside the final, open-ended phase.
    pub next_phase: Option<Phase>,
    pub hours_to_next: Option<f64>,
}

/// Ordered, contiguous, non-overlapping phase bands covering `[0, inf)` hours.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseTable {
    bands: Vec<PhaseBand>,
}

impl PhaseTable {
    /// Validate and build a table.
    ///
    /// The first band must start at hour 0, consecutive bands must be
    /// contiguous, every bounded band must have `end_hour > start_hour`,
    /// and exactly the last band must be open-ended.
    pub fn new(bands: Vec<PhaseBand>) -> Result<Self, ConfigError> {
        if bands.is_empty() {
            return Err(invalid("phase table must contain at least one band"));
        }
        if bands[0].start_hour != 0.0 {
            return Err(invalid("first phase band must start at hour 0"));
        }
        for (i, band) in bands.iter().enumerate() {
            if !band.start_hour.is_finite() {
                return Err(invalid("phase band start must be finite"));
            }
            let is_last = i == bands.len() - 1;
            match band.end_hour {
                None if !is_last => {
                    return Err(invalid("only the last phase band may be open-ended"));
                }
                Some(_) if is_last => {
                    return Err(invalid("last phase band must be open-ended"));
                }
                Some(end) if !end.is_finite() || end <= band.start_hour => {
                    return Err(invalid("phase band end must be greater than its start"));
                }
                _ => {}
            }
            if !is_last && band.end_hour != Some(bands[i + 1].start_hour) {
                return Err(invalid("phase bands must be contiguous"));
            }
        }
        Ok(Self { bands })
    }

    pub fn bands(&self) -> &[PhaseBand] {
        &self.bands
    }

    /// Classify an elapsed fasting duration.
    ///
    /// Total over all `elapsed_hours >= 0`: exactly one band matches, with
    /// the final band acting as catch-all. Negative or non-finite inputs
    /// are clamped to zero.
    pub fn classify(&self, elapsed_hours: f64) -> PhaseReading {
        let h = if elapsed_hours.is_finite() && elapsed_hours > 0.0 {
            elapsed_hours
        } else {
            0.0
        };
        let idx = self
            .bands
            .iter()
            .position(|band| match band.end_hour {
                Some(end) => h >= band.start_hour && h < end,
                None => h >= band.start_hour,
            })
            .unwrap_or(self.bands.len() - 1);
        let band = &self.bands[idx];
        let next = self.bands.get(idx + 1);
        PhaseReading {
            phase: band.phase,
            hours_into_phase: h - band.start_hour,
            next_phase: next.map(|b| b.phase),
            hours_to_next: next.map(|b| b.start_hour - h),
        }
    }

    /// The default metabolic timeline: Fed `[0,4)`, Fat Burning `[4,12)`,
    /// Ketosis `[12,18)`, Autophagy `[18,inf)`.
    pub fn default_metabolic() -> Self {
        Self {
            bands: vec![
                PhaseBand {
                    phase: Phase::Fed,
                    start_hour: 0.0,
                    end_hour: Some(4.0),
                    description: "Digesting food, insulin elevated".into(),
                },
                PhaseBand {
                    phase: Phase::FatBurning,
                    start_hour: 4.0,
                    end_hour: Some(12.0),
                    description: "Glycogen depleting, fat burning begins".into(),
                },
                PhaseBand {
                    phase: Phase::Ketosis,
                    start_hour: 12.0,
                    end_hour: Some(18.0),
                    description: "Full ketone production, mental clarity".into(),
                },
                PhaseBand {
                    phase: Phase::Autophagy,
                    start_hour: 18.0,
                    end_hour: None,
                    description: "Cellular cleanup and regeneration".into(),
                },
            ],
        }
    }
}

impl Default for PhaseTable {
    fn default() -> Self {
        Self::default_metabolic()
    }
}

fn invalid(message: &str) -> ConfigError {
    ConfigError::InvalidValue {
        field: "phase_table",
        message: message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn default_table_boundaries() {
        let table = PhaseTable::default();
        assert_eq!(table.classify(0.0).phase, Phase::Fed);
        assert_eq!(table.classify(3.999).phase, Phase::Fed);
        assert_eq!(table.classify(4.0).phase, Phase::FatBurning);
        assert_eq!(table.classify(11.999).phase, Phase::FatBurning);
        assert_eq!(table.classify(12.0).phase, Phase::Ketosis);
        assert_eq!(table.classify(16.0).phase, Phase::Ketosis);
        assert_eq!(table.classify(18.0).phase, Phase::Autophagy);
        assert_eq!(table.classify(500.0).phase, Phase::Autophagy);
    }

    #[test]
    fn reading_reports_distance_to_next_phase() {
        let reading = PhaseTable::default().classify(9.5);
        assert_eq!(reading.phase, Phase::FatBurning);
        assert!((reading.hours_into_phase - 5.5).abs() < 1e-9);
        assert_eq!(reading.next_phase, Some(Phase::Ketosis));
        assert!((reading.hours_to_next.unwrap() - 2.5).abs() < 1e-9);
    }

    #[test]
    fn final_phase_has_no_next() {
        let reading = PhaseTable::default().classify(26.0);
        assert_eq!(reading.phase, Phase::Autophagy);
        assert!((reading.hours_into_phase - 8.0).abs() < 1e-9);
        assert_eq!(reading.next_phase, None);
        assert_eq!(reading.hours_to_next, None);
    }

    #[test]
    fn negative_input_clamps_to_zero() {
        let reading = PhaseTable::default().classify(-3.0);
        assert_eq!(reading.phase, Phase::Fed);
        assert_eq!(reading.hours_into_phase, 0.0);
    }

    #[test]
    fn rejects_gap_between_bands() {
        let result = PhaseTable::new(vec![
            PhaseBand {
                phase: Phase::Fed,
                start_hour: 0.0,
                end_hour: Some(4.0),
                description: String::new(),
            },
            PhaseBand {
                phase: Phase::Ketosis,
                start_hour: 5.0,
                end_hour: None,
                description: String::new(),
            },
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn rejects_bounded_last_band() {
        let result = PhaseTable::new(vec![PhaseBand {
            phase: Phase::Fed,
            start_hour: 0.0,
            end_hour: Some(4.0),
            description: String::new(),
        }]);
        assert!(result.is_err());
    }

    #[test]
    fn rejects_nonzero_first_band() {
        let result = PhaseTable::new(vec![PhaseBand {
            phase: Phase::Fed,
            start_hour: 1.0,
            end_hour: None,
            description: String::new(),
        }]);
        assert!(result.is_err());
    }

    #[test]
    fn single_open_band_is_valid() {
        let table = PhaseTable::new(vec![PhaseBand {
            phase: Phase::Autophagy,
            start_hour: 0.0,
            end_hour: None,
            description: String::new(),
        }])
        .unwrap();
        assert_eq!(table.classify(100.0).phase, Phase::Autophagy);
        assert_eq!(table.classify(100.0).next_phase, None);
    }

    proptest! {
        // Totality and exclusivity: for any h >= 0 exactly one band
        // matches and the returned band's interval contains h.
        #[test]
        fn classify_is_total_and_exclusive(h in 0.0f64..10_000.0) {
            let table = PhaseTable::default();
            let matching = table
                .bands()
                .iter()
                .filter(|band| match band.end_hour {
                    Some(end) => h >= band.start_hour && h < end,
                    None => h >= band.start_hour,
                })
                .count();
            prop_assert_eq!(matching, 1);

            let reading = table.classify(h);
            let band = table
                .bands()
                .iter()
                .find(|b| b.phase == reading.phase)
                .unwrap();
            prop_assert!(h >= band.start_hour);
            if let Some(end) = band.end_hour {
                prop_assert!(h < end);
            }
            prop_assert!(reading.hours_into_phase >= 0.0);
        }
    }
}
