//! A study: the reference data, historical series and parameters for a set of policy assessments.
use crate::analysis::{
    CommitmentRanking, HazardousDaysReport, HealthCostReport, InterventionPeriodReport,
    PollutantTrendReport, analyse_emergency_threshold_policy, analyse_intervention_periods,
    analyse_pollutant_trend, estimate_health_cost_impact, rank_policy_commitment,
};
use crate::breakpoint::BreakpointTables;
use crate::category::CategoryBands;
use crate::city::{CityID, CityMap};
use crate::error::{AnalysisError, AnalysisResult};
use crate::input::{
    read_breakpoint_tables, read_category_bands, read_cities, read_policies, read_series,
};
use crate::policy::{PolicyCatalog, PolicyID, PolicyIntervention, PolicyKind};
use crate::pollutant::Pollutant;
use crate::series::HistoricalSeries;
use anyhow::{Context, Result};
use chrono::Datelike;
use log::{info, warn};
use std::path::Path;

pub mod parameters;
pub use parameters::AnalysisParameters;

/// Reference data shared by every calculation.
///
/// Loaded once and then only read.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceData {
    /// Breakpoint tables for each pollutant
    pub tables: BreakpointTables,
    /// The AQI category bands
    pub bands: CategoryBands,
    /// The city catalogue
    pub cities: CityMap,
    /// The policy catalogue
    pub policies: PolicyCatalog,
}

/// A loaded study
#[derive(Debug, Clone, PartialEq)]
pub struct Study {
    /// Parameters for the assessments
    pub parameters: AnalysisParameters,
    /// Reference data
    pub reference: ReferenceData,
    /// The historical series
    pub series: HistoricalSeries,
}

/// The result of assessing one catalogued policy
#[derive(Debug, Clone, PartialEq)]
pub enum PolicyAssessment {
    /// One result per window of a windowed policy, in catalogue order
    Windowed(Vec<AnalysisResult<InterventionPeriodReport>>),
    /// Result for an emergency framework
    EmergencyThreshold(HazardousDaysReport),
    /// Result for an emission standard
    EmissionStandard(PollutantTrendReport),
}

/// Results of every assessment in a study.
///
/// An assessment without enough data is kept as an error rather than dropped, so that callers
/// can report it.
#[derive(Debug, Clone, PartialEq)]
pub struct StudyReport {
    /// One entry per catalogued policy, in catalogue order
    pub policies: Vec<(PolicyID, AnalysisResult<PolicyAssessment>)>,
    /// One entry per city, in catalogue order
    pub health_costs: Vec<(CityID, AnalysisResult<HealthCostReport>)>,
    /// Cities ranked by the number of policies applying to them
    pub commitment: Vec<CommitmentRanking>,
}

impl Study {
    /// Read a study from the specified directory.
    ///
    /// # Arguments
    ///
    /// * `study_dir` - Folder containing study input files
    pub fn from_path<P: AsRef<Path>>(study_dir: P) -> Result<Study> {
        let study_dir = study_dir.as_ref();
        let parameters = AnalysisParameters::from_path(study_dir)?;
        let tables = read_breakpoint_tables(study_dir)?;
        let bands = read_category_bands(study_dir)?;
        let cities = read_cities(study_dir)?;
        let policies = read_policies(study_dir, &cities)?;
        let series = read_series(study_dir, &cities, &tables, &bands)?;
        info!(
            "Loaded {} records for {} cities and {} policies",
            series.len(),
            cities.len(),
            policies.len()
        );

        Ok(Study {
            parameters,
            reference: ReferenceData {
                tables,
                bands,
                cities,
                policies,
            },
            series,
        })
    }

    /// Assess one policy with the operation matching its kind
    pub fn assess_policy(&self, policy: &PolicyIntervention) -> AnalysisResult<PolicyAssessment> {
        let params = &self.parameters;
        match policy.kind {
            PolicyKind::Windowed => Ok(PolicyAssessment::Windowed(analyse_intervention_periods(
                &self.series,
                policy,
                params.before_window_days,
                params.after_window_days,
                &params.criteria(),
            ))),
            PolicyKind::EmergencyThreshold => analyse_emergency_threshold_policy(
                &self.series,
                &policy.cities,
                policy.require_cutover()?,
                params.hazardous_aqi,
                &params.seasonal_months,
            )
            .map(PolicyAssessment::EmergencyThreshold),
            PolicyKind::EmissionStandard => analyse_pollutant_trend(
                &self.series,
                &policy.cities,
                policy.require_cutover()?,
                policy.pollutant.unwrap_or(Pollutant::NO2),
            )
            .map(PolicyAssessment::EmissionStandard),
        }
    }

    /// The year used for health-cost estimates
    pub fn health_cost_year(&self) -> AnalysisResult<i32> {
        if let Some(year) = self.parameters.health_cost_year {
            return Ok(year);
        }

        self.series
            .records()
            .iter()
            .map(|record| record.date.year())
            .max()
            .ok_or_else(|| AnalysisError::NoData("series is empty".into()))
    }

    /// Run every assessment in the study
    pub fn run_assessments(&self) -> Result<StudyReport> {
        let policies = self
            .reference
            .policies
            .values()
            .map(|policy| {
                let assessment = self.assess_policy(policy);
                if let Err(err) = &assessment {
                    warn!("Could not assess policy {}: {err}", policy.id);
                }
                (policy.id.clone(), assessment)
            })
            .collect();

        let year = self
            .health_cost_year()
            .context("Cannot choose a year for health-cost estimates")?;
        info!("Estimating health costs for {year}");
        let health_costs = self
            .reference
            .cities
            .values()
            .map(|city| {
                let report = estimate_health_cost_impact(
                    &self.series,
                    &city.id,
                    year,
                    city.population,
                    &self.parameters.health_cost_per_day,
                    &self.reference.bands,
                );
                if let Err(err) = &report {
                    warn!("Could not estimate health costs for {}: {err}", city.id);
                }
                (city.id.clone(), report)
            })
            .collect();

        let commitment = rank_policy_commitment(
            &self.series,
            &self.reference.cities,
            &self.reference.policies,
            &self.parameters.seasonal_months,
        );

        Ok(StudyReport {
            policies,
            health_costs,
            commitment,
        })
    }
}
