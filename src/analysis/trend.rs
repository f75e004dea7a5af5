//! Assessment of emission standards by the trend in one pollutant.
use super::Trend;
use crate::city::CityID;
use crate::error::{AnalysisResult, ensure_or};
use crate::pollutant::Pollutant;
use crate::series::HistoricalSeries;
use crate::stats::{mean, percentage_change};
use chrono::NaiveDate;
use log::debug;
use serde::Serialize;

/// Mean concentration of a pollutant before and after a cutover
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PollutantTrendReport {
    /// The pollutant
    pub pollutant: Pollutant,
    /// The day the standard came into force
    pub cutover: NaiveDate,
    /// Number of measurements before the cutover
    pub before_count: usize,
    /// Mean concentration before the cutover
    pub before_mean: f64,
    /// Number of measurements on or after the cutover
    pub after_count: usize,
    /// Mean concentration on or after the cutover
    pub after_mean: f64,
    /// Change in mean concentration, in percent
    pub change_pct: f64,
    /// Whether the mean concentration went down
    pub trend: Trend,
}

impl PollutantTrendReport {
    /// One-line verdict for display
    pub fn assessment(&self) -> &'static str {
        match self.trend {
            Trend::Improved => "Gradual improvement observed",
            Trend::NotImproved => "No clear improvement",
        }
    }
}

/// Compare the mean concentration of `pollutant` before and after `cutover`.
///
/// Only records which measured the pollutant are used. **An empty `cities` slice means every city
/// in the series**; otherwise only the listed cities are included.
pub fn analyse_pollutant_trend(
    series: &HistoricalSeries,
    cities: &[CityID],
    cutover: NaiveDate,
    pollutant: Pollutant,
) -> AnalysisResult<PollutantTrendReport> {
    let (before, after): (Vec<_>, Vec<_>) = series
        .for_cities(cities)
        .partition(|record| record.date < cutover);
    let before = HistoricalSeries::concentrations(before, pollutant);
    let after = HistoricalSeries::concentrations(after, pollutant);
    ensure_or!(
        !before.is_empty() && !after.is_empty(),
        InsufficientData,
        "{pollutant} needs measurements both before and after {cutover} (got {} and {})",
        before.len(),
        after.len()
    );

    let before_mean = mean(&before)?;
    let after_mean = mean(&after)?;
    let change_pct = percentage_change(before_mean, after_mean)?;
    debug!("Mean {pollutant} from {cutover}: {before_mean:.1} -> {after_mean:.1}");

    Ok(PollutantTrendReport {
        pollutant,
        cutover,
        before_count: before.len(),
        before_mean,
        after_count: after.len(),
        after_mean,
        change_pct,
        trend: Trend::from_change(change_pct),
    })
}
