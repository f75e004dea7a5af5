//! Defines the `AnalysisParameters` struct, which represents the contents of `parameters.toml`.
use crate::analysis::{EffectivenessCriteria, HealthCostRates};
use crate::input::{input_err_msg, read_toml};
use crate::stats::TTestMethod;
use anyhow::{Context, Result, ensure};
use itertools::Itertools;
use log::warn;
use serde::Deserialize;
use std::path::Path;

const PARAMETERS_FILE_NAME: &str = "parameters.toml";

macro_rules! define_param_default {
    ($name:ident, $type: ty, $value: expr) => {
        fn $name() -> $type {
            $value
        }
    };
}

define_param_default!(default_before_window_days, u32, 15);
define_param_default!(default_after_window_days, u32, 15);
define_param_default!(default_effective_change_pct, f64, -5.0);
define_param_default!(default_significance_level, f64, 0.05);
define_param_default!(default_hazardous_aqi, f64, 300.0);
define_param_default!(default_seasonal_months, Vec<u32>, vec![10, 11, 12, 1, 2]);

/// Represents the contents of the entire parameters file.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct AnalysisParameters {
    /// Number of days before a policy window used as the baseline
    #[serde(default = "default_before_window_days")]
    pub before_window_days: u32,
    /// Number of days after a policy window compared with the baseline
    #[serde(default = "default_after_window_days")]
    pub after_window_days: u32,
    /// Percentage change in mean AQI at or below which a window may be judged effective
    #[serde(default = "default_effective_change_pct")]
    pub effective_change_pct: f64,
    /// p-value below which a change is significant
    #[serde(default = "default_significance_level")]
    pub significance_level: f64,
    /// The t-test used to compare AQI before and during a window
    #[serde(default)]
    pub t_test: TTestMethod,
    /// AQI above which a day counts as hazardous
    #[serde(default = "default_hazardous_aqi")]
    pub hazardous_aqi: f64,
    /// Months (1-12) in which pollution is seasonally worst
    #[serde(default = "default_seasonal_months")]
    pub seasonal_months: Vec<u32>,
    /// Calendar year for health-cost estimates.
    ///
    /// Defaults to the last year in the series.
    #[serde(default)]
    pub health_cost_year: Option<i32>,
    /// Cost per resident of a day in each category band
    #[serde(default)]
    pub health_cost_per_day: HealthCostRates,
}

impl Default for AnalysisParameters {
    fn default() -> Self {
        Self {
            before_window_days: default_before_window_days(),
            after_window_days: default_after_window_days(),
            effective_change_pct: default_effective_change_pct(),
            significance_level: default_significance_level(),
            t_test: TTestMethod::default(),
            hazardous_aqi: default_hazardous_aqi(),
            seasonal_months: default_seasonal_months(),
            health_cost_year: None,
            health_cost_per_day: HealthCostRates::default(),
        }
    }
}

/// Check that a window length is valid
fn check_window_days(name: &str, days: u32) -> Result<()> {
    ensure!(days > 0, "{name} cannot be zero");

    Ok(())
}

/// Check that the `effective_change_pct` parameter is valid
fn check_effective_change_pct(value: f64) -> Result<()> {
    ensure!(
        value.is_finite(),
        "effective_change_pct must be a finite number"
    );
    if value > 0.0 {
        warn!("effective_change_pct is positive, so windows where AQI rose may be judged effective");
    }

    Ok(())
}

/// Check that the `significance_level` parameter is valid
fn check_significance_level(value: f64) -> Result<()> {
    ensure!(
        value > 0.0 && value < 1.0,
        "significance_level must be between 0 and 1 (exclusive)"
    );

    Ok(())
}

/// Check that the `hazardous_aqi` parameter is valid
fn check_hazardous_aqi(value: f64) -> Result<()> {
    ensure!(
        value.is_finite() && value >= 0.0,
        "hazardous_aqi must be a finite, non-negative number"
    );

    Ok(())
}

/// Check that the `seasonal_months` parameter is valid
fn check_seasonal_months(months: &[u32]) -> Result<()> {
    ensure!(!months.is_empty(), "seasonal_months is empty");
    ensure!(
        months.iter().all(|month| (1..=12).contains(month)),
        "seasonal_months must be between 1 and 12"
    );
    ensure!(
        months.iter().all_unique(),
        "seasonal_months cannot contain duplicates"
    );

    Ok(())
}

impl AnalysisParameters {
    /// Read a parameters file from the specified directory.
    ///
    /// # Arguments
    ///
    /// * `study_dir` - Folder containing study input files
    ///
    /// # Returns
    ///
    /// The file contents as an [`AnalysisParameters`] struct or an error if the file is invalid
    pub fn from_path<P: AsRef<Path>>(study_dir: P) -> Result<AnalysisParameters> {
        let file_path = study_dir.as_ref().join(PARAMETERS_FILE_NAME);
        let params: AnalysisParameters = read_toml(&file_path)?;

        params
            .validate()
            .with_context(|| input_err_msg(file_path))?;

        Ok(params)
    }

    /// Thresholds for judging policy windows
    pub fn criteria(&self) -> EffectivenessCriteria {
        EffectivenessCriteria {
            change_pct: self.effective_change_pct,
            significance_level: self.significance_level,
            t_test: self.t_test,
        }
    }

    /// Validate parameters after reading in file
    fn validate(&self) -> Result<()> {
        check_window_days("before_window_days", self.before_window_days)?;
        check_window_days("after_window_days", self.after_window_days)?;
        check_effective_change_pct(self.effective_change_pct)?;
        check_significance_level(self.significance_level)?;
        check_hazardous_aqi(self.hazardous_aqi)?;
        check_seasonal_months(&self.seasonal_months)?;
        self.health_cost_per_day.validate()?;

        Ok(())
    }
}
