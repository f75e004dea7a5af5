//! Before/during/after assessment of policies that were in force over date windows.
use crate::error::{AnalysisError, AnalysisResult, ensure_or};
use crate::policy::{DateWindow, PolicyID, PolicyIntervention};
use crate::series::HistoricalSeries;
use crate::stats::{TTestMethod, mean, percentage_change, two_sample_t_test};
use chrono::{Days, NaiveDate};
use itertools::Itertools;
use log::debug;
use serde::{Deserialize, Serialize};
use serde_string_enum::{DeserializeLabeledStringEnum, SerializeLabeledStringEnum};
use std::ops::RangeInclusive;

/// Verdict on whether a policy window reduced pollution
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    SerializeLabeledStringEnum,
    DeserializeLabeledStringEnum,
)]
pub enum Effectiveness {
    /// AQI fell by at least the required amount and the fall was significant
    #[string = "Effective"]
    Effective,
    /// Anything else
    #[string = "Limited/No Effect"]
    LimitedOrNoEffect,
}

/// Thresholds for judging a window effective
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EffectivenessCriteria {
    /// The percentage change in mean AQI during the window must be at or below this value
    pub change_pct: f64,
    /// The t-test p-value must be below this value
    pub significance_level: f64,
    /// The t-test used to compare the before and during slices
    pub t_test: TTestMethod,
}

impl Default for EffectivenessCriteria {
    fn default() -> Self {
        Self {
            change_pct: -5.0,
            significance_level: 0.05,
            t_test: TTestMethod::Student,
        }
    }
}

impl EffectivenessCriteria {
    /// Classify a window from its change in mean AQI and p-value
    pub fn classify(&self, change_pct: f64, p_value: f64) -> Effectiveness {
        if change_pct <= self.change_pct && p_value < self.significance_level {
            Effectiveness::Effective
        } else {
            Effectiveness::LimitedOrNoEffect
        }
    }
}

/// The three disjoint, contiguous date ranges around a policy window
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowPartition {
    /// The `before_days` days up to the day before the window starts
    pub before: RangeInclusive<NaiveDate>,
    /// The window itself
    pub during: RangeInclusive<NaiveDate>,
    /// The `after_days` days from the day after the window ends
    pub after: RangeInclusive<NaiveDate>,
}

impl WindowPartition {
    /// Split the days around `window`.
    ///
    /// A zero-length padding gives an empty range.
    pub fn new(window: &DateWindow, before_days: u32, after_days: u32) -> AnalysisResult<Self> {
        let out_of_range =
            || AnalysisError::Configuration(format!("dates around {window} are out of range"));
        let day_before = window
            .start
            .checked_sub_days(Days::new(1))
            .ok_or_else(out_of_range)?;
        let day_after = window
            .end
            .checked_add_days(Days::new(1))
            .ok_or_else(out_of_range)?;

        Ok(Self {
            before: window.days_before_start(before_days)?..=day_before,
            during: window.start..=window.end,
            after: day_after..=window.days_after_end(after_days)?,
        })
    }
}

/// The outcome of assessing one window of a policy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterventionPeriodReport {
    /// The policy assessed
    pub policy_id: PolicyID,
    /// Index of the window in the policy's list of windows
    pub period_index: usize,
    /// First day of the window
    pub start: NaiveDate,
    /// Last day of the window
    pub end: NaiveDate,
    /// Number of records before the window
    pub before_count: usize,
    /// Number of records during the window
    pub during_count: usize,
    /// Number of records after the window
    pub after_count: usize,
    /// Mean AQI before the window
    pub before_mean: f64,
    /// Mean AQI during the window
    pub during_mean: f64,
    /// Mean AQI after the window
    pub after_mean: f64,
    /// Change in mean AQI from before to during, in percent
    pub change_during_pct: f64,
    /// Change in mean AQI from before to after, in percent
    pub change_after_pct: f64,
    /// t statistic comparing before with during
    pub t_statistic: f64,
    /// p-value comparing before with during
    pub p_value: f64,
    /// Whether the p-value is below the significance level
    pub significant: bool,
    /// The verdict
    pub effectiveness: Effectiveness,
}

/// Collect the AQI values of the policy's cities for a range of days
fn aqi_between(
    series: &HistoricalSeries,
    intervention: &PolicyIntervention,
    range: &RangeInclusive<NaiveDate>,
) -> Vec<f64> {
    intervention
        .cities
        .iter()
        .unique()
        .flat_map(|city| series.for_city_between(&city.0, range.clone()))
        .map(|record| record.aqi)
        .collect()
}

/// Assess one window of a policy.
///
/// The AQI of every city the policy covers is pooled, one observation per city-day. The mean AQI
/// in the `before_days` before the window is compared with the means during the window and in the
/// `after_days` after it, and a t-test compares the before and during slices.
///
/// # Arguments
///
/// * `series` - The historical series
/// * `intervention` - The policy, which must have at least `period_index + 1` windows
/// * `period_index` - Which of the policy's windows to assess
/// * `before_days` - Length of the baseline before the window
/// * `after_days` - Length of the period after the window
/// * `criteria` - Thresholds for the verdict
pub fn analyse_intervention(
    series: &HistoricalSeries,
    intervention: &PolicyIntervention,
    period_index: usize,
    before_days: u32,
    after_days: u32,
    criteria: &EffectivenessCriteria,
) -> AnalysisResult<InterventionPeriodReport> {
    let window = intervention.window(period_index)?;
    let partition = WindowPartition::new(window, before_days, after_days)?;

    let before = aqi_between(series, intervention, &partition.before);
    let during = aqi_between(series, intervention, &partition.during);
    let after = aqi_between(series, intervention, &partition.after);
    for (name, slice) in [("before", &before), ("during", &during), ("after", &after)] {
        ensure_or!(
            !slice.is_empty(),
            InsufficientData,
            "no records {name} {} window {window}",
            intervention.id
        );
    }

    let before_mean = mean(&before)?;
    let during_mean = mean(&during)?;
    let after_mean = mean(&after)?;
    let change_during_pct = percentage_change(before_mean, during_mean)?;
    let change_after_pct = percentage_change(before_mean, after_mean)?;
    let t_test = two_sample_t_test(&before, &during, criteria.t_test)?;
    let effectiveness = criteria.classify(change_during_pct, t_test.p_value);
    debug!(
        "{} window {window}: {change_during_pct:.1}% change (p = {:.4}), {effectiveness}",
        intervention.id, t_test.p_value
    );

    Ok(InterventionPeriodReport {
        policy_id: intervention.id.clone(),
        period_index,
        start: window.start,
        end: window.end,
        before_count: before.len(),
        during_count: during.len(),
        after_count: after.len(),
        before_mean,
        during_mean,
        after_mean,
        change_during_pct,
        change_after_pct,
        t_statistic: t_test.t_statistic,
        p_value: t_test.p_value,
        significant: t_test.p_value < criteria.significance_level,
        effectiveness,
    })
}

/// Assess every window of a policy independently, in the order they are catalogued.
///
/// A window without enough data doesn't stop the others being assessed.
pub fn analyse_intervention_periods(
    series: &HistoricalSeries,
    intervention: &PolicyIntervention,
    before_days: u32,
    after_days: u32,
    criteria: &EffectivenessCriteria,
) -> Vec<AnalysisResult<InterventionPeriodReport>> {
    (0..intervention.windows.len())
        .map(|period_index| {
            analyse_intervention(
                series,
                intervention,
                period_index,
                before_days,
                after_days,
                criteria,
            )
        })
        .collect()
}
