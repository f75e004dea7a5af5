//! Pollution-control policies and the periods in which they were in force.
use crate::city::CityID;
use crate::error::{AnalysisError, AnalysisResult, ensure_or};
use crate::id::{define_id_getter, define_id_type};
use crate::pollutant::Pollutant;
use chrono::{Days, NaiveDate};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_string_enum::{DeserializeLabeledStringEnum, SerializeLabeledStringEnum};
use std::fmt;

define_id_type! {PolicyID}

/// A map of [`PolicyIntervention`]s, keyed by policy ID, in catalogue order
pub type PolicyCatalog = IndexMap<PolicyID, PolicyIntervention>;

/// How the effect of a policy is assessed
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, SerializeLabeledStringEnum, DeserializeLabeledStringEnum,
)]
pub enum PolicyKind {
    /// A scheme in force over bounded date windows (e.g. odd-even vehicle rationing).
    ///
    /// Assessed by comparing AQI before, during and after each window.
    #[string = "windowed"]
    Windowed,
    /// A standing emergency framework introduced on a cutover date (e.g. GRAP).
    ///
    /// Assessed by the change in the share of hazardous days in the polluted season.
    #[string = "emergency_threshold"]
    EmergencyThreshold,
    /// A permanent standard introduced on a cutover date (e.g. BS6 fuel).
    ///
    /// Assessed by the change in mean concentration of one pollutant.
    #[string = "emission_standard"]
    EmissionStandard,
}

/// An inclusive range of days during which a policy was in force
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateWindow {
    /// First day in force
    pub start: NaiveDate,
    /// Last day in force
    pub end: NaiveDate,
}

impl DateWindow {
    /// Create a window, checking that it doesn't end before it starts
    pub fn new(start: NaiveDate, end: NaiveDate) -> AnalysisResult<Self> {
        ensure_or!(
            start <= end,
            Configuration,
            "window ends ({end}) before it starts ({start})"
        );

        Ok(Self { start, end })
    }

    /// The date `days` before the start of the window
    pub fn days_before_start(&self, days: u32) -> AnalysisResult<NaiveDate> {
        self.start
            .checked_sub_days(Days::new(days.into()))
            .ok_or_else(|| AnalysisError::Configuration("date out of range".into()))
    }

    /// The date `days` after the end of the window
    pub fn days_after_end(&self, days: u32) -> AnalysisResult<NaiveDate> {
        self.end
            .checked_add_days(Days::new(days.into()))
            .ok_or_else(|| AnalysisError::Configuration("date out of range".into()))
    }
}

impl fmt::Display for DateWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", self.start, self.end)
    }
}

/// A catalogued policy intervention
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PolicyIntervention {
    /// Unique identifier (e.g. "odd_even")
    pub id: PolicyID,
    /// Human-readable name
    pub name: String,
    /// How the policy's effect is assessed
    pub kind: PolicyKind,
    /// Cities in which the policy applies
    pub cities: Vec<CityID>,
    /// Windows during which the policy was in force (for windowed policies)
    pub windows: Vec<DateWindow>,
    /// The day from which the policy applied (for cutover policies)
    pub cutover: Option<NaiveDate>,
    /// The pollutant whose trend is assessed (for emission standards)
    pub pollutant: Option<Pollutant>,
    /// Free-text description of the expected effect
    pub expected_impact: String,
}
define_id_getter! {PolicyIntervention, PolicyID}

impl PolicyIntervention {
    /// Get one of the policy's windows
    pub fn window(&self, period_index: usize) -> AnalysisResult<&DateWindow> {
        self.windows.get(period_index).ok_or_else(|| {
            AnalysisError::Configuration(format!(
                "policy {} has no period {period_index} ({} defined)",
                self.id,
                self.windows.len()
            ))
        })
    }

    /// The cutover date, which cutover policies must have
    pub fn require_cutover(&self) -> AnalysisResult<NaiveDate> {
        self.cutover.ok_or_else(|| {
            AnalysisError::Configuration(format!("policy {} has no cutover date", self.id))
        })
    }

    /// Whether the policy applies in a city
    pub fn applies_to(&self, city: &CityID) -> bool {
        self.cities.contains(city)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::{date, odd_even};
    use rstest::rstest;

    #[test]
    fn test_date_window_new() {
        assert!(DateWindow::new(date("2016-01-01"), date("2016-01-15")).is_ok());
        assert!(DateWindow::new(date("2016-01-01"), date("2016-01-01")).is_ok());
        assert_eq!(
            DateWindow::new(date("2016-01-15"), date("2016-01-01")),
            Err(AnalysisError::Configuration(
                "window ends (2016-01-01) before it starts (2016-01-15)".into()
            ))
        );
    }

    #[test]
    fn test_date_window_padding() {
        let window = DateWindow::new(date("2016-01-01"), date("2016-01-15")).unwrap();
        assert_eq!(window.days_before_start(15).unwrap(), date("2015-12-17"));
        assert_eq!(window.days_after_end(15).unwrap(), date("2016-01-30"));
        assert_eq!(window.to_string(), "2016-01-01 to 2016-01-15");
    }

    #[rstest]
    fn test_window(odd_even: PolicyIntervention) {
        assert_eq!(odd_even.window(0).unwrap().start, date("2016-01-01"));
        assert_eq!(
            odd_even.window(5),
            Err(AnalysisError::Configuration(
                "policy odd_even has no period 5 (2 defined)".into()
            ))
        );
    }

    #[rstest]
    fn test_require_cutover(odd_even: PolicyIntervention) {
        assert!(odd_even.require_cutover().is_err());
        assert!(odd_even.applies_to(&"Delhi".into()));
        assert!(!odd_even.applies_to(&"Pune".into()));
    }
}
