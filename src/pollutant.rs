//! Pollutants and readings of their concentrations.
use crate::error::{AnalysisResult, ensure_or};
use serde::{Deserialize, Serialize};
use serde_string_enum::{DeserializeLabeledStringEnum, SerializeLabeledStringEnum};
use std::collections::BTreeMap;
use strum::EnumIter;

/// A pollutant covered by the national AQI.
///
/// The declaration order is the canonical order used when reporting and when breaking ties
/// between equal sub-indices.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    EnumIter,
    SerializeLabeledStringEnum,
    DeserializeLabeledStringEnum,
)]
pub enum Pollutant {
    /// Fine particulate matter (µg/m³)
    #[string = "PM2.5"]
    PM25,
    /// Coarse particulate matter (µg/m³)
    #[string = "PM10"]
    PM10,
    /// Nitrogen dioxide (µg/m³)
    #[string = "NO2"]
    NO2,
    /// Sulphur dioxide (µg/m³)
    #[string = "SO2"]
    SO2,
    /// Carbon monoxide (mg/m³)
    #[string = "CO"]
    CO,
    /// Ozone (µg/m³)
    #[string = "O3"]
    O3,
}

impl Pollutant {
    /// The unit in which concentrations of this pollutant are given
    pub fn unit(self) -> &'static str {
        match self {
            Self::CO => "mg/m³",
            _ => "µg/m³",
        }
    }
}

/// Check that a concentration is physically meaningful
pub fn check_concentration(pollutant: Pollutant, concentration: f64) -> AnalysisResult<()> {
    ensure_or!(
        concentration.is_finite() && concentration >= 0.0,
        InvalidInput,
        "concentration of {pollutant} must be a finite, non-negative number (got {concentration})"
    );

    Ok(())
}

/// Measured concentrations of some or all pollutants.
///
/// Pollutants which were not measured are absent from the reading. A concentration of zero
/// means the pollutant was measured as zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PollutantReading(BTreeMap<Pollutant, f64>);

impl PollutantReading {
    /// Create an empty reading
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the concentration of a pollutant, replacing any previous value
    pub fn insert(&mut self, pollutant: Pollutant, concentration: f64) {
        self.0.insert(pollutant, concentration);
    }

    /// Record the concentration of a pollutant if one is given
    pub fn insert_opt(&mut self, pollutant: Pollutant, concentration: Option<f64>) {
        if let Some(concentration) = concentration {
            self.insert(pollutant, concentration);
        }
    }

    /// Get the concentration of a pollutant, if it was measured
    pub fn get(&self, pollutant: Pollutant) -> Option<f64> {
        self.0.get(&pollutant).copied()
    }

    /// Whether no pollutants were measured
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of measured pollutants
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterate over measured pollutants in canonical order
    pub fn iter(&self) -> impl Iterator<Item = (Pollutant, f64)> + '_ {
        self.0.iter().map(|(pollutant, value)| (*pollutant, *value))
    }

    /// Check every concentration in the reading
    pub fn validate(&self) -> AnalysisResult<()> {
        for (pollutant, concentration) in self.iter() {
            check_concentration(pollutant, concentration)?;
        }

        Ok(())
    }
}

impl FromIterator<(Pollutant, f64)> for PollutantReading {
    fn from_iter<T: IntoIterator<Item = (Pollutant, f64)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn test_pollutant_labels() {
        let labels: Vec<_> = Pollutant::iter().map(|p| p.to_string()).collect();
        assert_eq!(labels, ["PM2.5", "PM10", "NO2", "SO2", "CO", "O3"]);
        assert_eq!(Pollutant::from_str("PM2.5").unwrap(), Pollutant::PM25);
        assert!(Pollutant::from_str("PM1").is_err());
        // Labels are matched case-insensitively
        assert_eq!(Pollutant::from_str("pm10").unwrap(), Pollutant::PM10);
    }

    #[test]
    fn test_reading_iterates_in_canonical_order() {
        let reading: PollutantReading = [
            (Pollutant::O3, 10.0),
            (Pollutant::PM25, 20.0),
            (Pollutant::NO2, 0.0),
        ]
        .into_iter()
        .collect();
        let order: Vec<_> = reading.iter().map(|(p, _)| p).collect();
        assert_eq!(order, [Pollutant::PM25, Pollutant::NO2, Pollutant::O3]);
    }

    #[test]
    fn test_reading_absent_is_not_zero() {
        let mut reading = PollutantReading::new();
        reading.insert_opt(Pollutant::PM10, None);
        reading.insert_opt(Pollutant::CO, Some(0.0));
        assert_eq!(reading.get(Pollutant::PM10), None);
        assert_eq!(reading.get(Pollutant::CO), Some(0.0));
        assert_eq!(reading.len(), 1);
    }

    #[rstest]
    #[case(0.0, true)]
    #[case(187.0, true)]
    #[case(-0.1, false)]
    #[case(f64::NAN, false)]
    #[case(f64::INFINITY, false)]
    fn test_check_concentration(#[case] value: f64, #[case] valid: bool) {
        assert_eq!(check_concentration(Pollutant::PM25, value).is_ok(), valid);
    }
}
