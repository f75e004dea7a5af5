//! Assessment of standing emergency frameworks that apply from a cutover date.
use super::Trend;
use crate::city::CityID;
use crate::error::{AnalysisResult, ensure_or};
use crate::series::{HistoricalRecord, HistoricalSeries, in_months};
use chrono::NaiveDate;
use log::debug;
use serde::Serialize;

/// Share of hazardous days in the polluted season before and after a cutover
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HazardousDaysReport {
    /// The day the framework came into force
    pub cutover: NaiveDate,
    /// AQI above which a day counts as hazardous
    pub hazardous_aqi: f64,
    /// Number of in-season city-days before the cutover
    pub before_days: usize,
    /// Number of those days which were hazardous
    pub before_hazardous_days: usize,
    /// Percentage of in-season days before the cutover which were hazardous
    pub before_hazardous_pct: f64,
    /// Number of in-season city-days on or after the cutover
    pub after_days: usize,
    /// Number of those days which were hazardous
    pub after_hazardous_days: usize,
    /// Percentage of in-season days on or after the cutover which were hazardous
    pub after_hazardous_pct: f64,
    /// Change in the hazardous percentage, in percentage points
    pub change_pct_points: f64,
    /// Whether the share of hazardous days went down
    pub trend: Trend,
}

impl HazardousDaysReport {
    /// One-line verdict for display
    pub fn assessment(&self) -> &'static str {
        match self.trend {
            Trend::Improved => "Reduced hazardous days",
            Trend::NotImproved => "No improvement in worst days",
        }
    }
}

/// Count the days in a slice and how many of them were hazardous
fn count_hazardous(records: &[&HistoricalRecord], hazardous_aqi: f64) -> (usize, usize, f64) {
    let hazardous = records.iter().filter(|r| r.aqi > hazardous_aqi).count();
    let pct = hazardous as f64 / records.len() as f64 * 100.0;

    (records.len(), hazardous, pct)
}

/// Compare the share of hazardous days in the polluted season before and after a cutover.
///
/// Only records for `cities` in `seasonal_months` are considered. Days before `cutover` form the
/// first slice and days on or after it the second. At least one city must be in scope.
pub fn analyse_emergency_threshold_policy(
    series: &HistoricalSeries,
    cities: &[CityID],
    cutover: NaiveDate,
    hazardous_aqi: f64,
    seasonal_months: &[u32],
) -> AnalysisResult<HazardousDaysReport> {
    ensure_or!(!cities.is_empty(), InsufficientData, "no cities in scope");
    let (before, after): (Vec<_>, Vec<_>) = series
        .for_cities(cities)
        .filter(|r| in_months(r.date, seasonal_months))
        .partition(|r| r.date < cutover);
    ensure_or!(
        !before.is_empty(),
        InsufficientData,
        "no in-season records before {cutover}"
    );
    ensure_or!(
        !after.is_empty(),
        InsufficientData,
        "no in-season records on or after {cutover}"
    );

    let (before_days, before_hazardous_days, before_hazardous_pct) =
        count_hazardous(&before, hazardous_aqi);
    let (after_days, after_hazardous_days, after_hazardous_pct) =
        count_hazardous(&after, hazardous_aqi);
    let change_pct_points = after_hazardous_pct - before_hazardous_pct;
    debug!(
        "Hazardous days from {cutover}: {before_hazardous_pct:.1}% -> {after_hazardous_pct:.1}%"
    );

    Ok(HazardousDaysReport {
        cutover,
        hazardous_aqi,
        before_days,
        before_hazardous_days,
        before_hazardous_pct,
        after_days,
        after_hazardous_days,
        after_hazardous_pct,
        change_pct_points,
        trend: Trend::from_change(change_pct_points),
    })
}
