//! The module responsible for writing study reports to disk.
use crate::analysis::{
    CommitmentRanking, HazardousDaysReport, HealthCostReport, InterventionPeriodReport,
    PollutantTrendReport, Trend,
};
use crate::category::AqiCategory;
use crate::city::CityID;
use crate::error::AnalysisResult;
use crate::policy::PolicyID;
use crate::pollutant::Pollutant;
use crate::study::{PolicyAssessment, StudyReport};
use crate::units::{Money, MoneyPerPerson};
use anyhow::{Context, Result, ensure};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs;
use std::fs::File;
use std::path::{Path, PathBuf};

/// The root folder in which study-specific output folders will be created
const OUTPUT_DIRECTORY_ROOT: &str = "aqi_impact_results";

/// The output file name for windowed policy assessments
const INTERVENTION_PERIODS_FILE_NAME: &str = "intervention_periods.csv";

/// The output file name for emergency framework assessments
const HAZARDOUS_DAYS_FILE_NAME: &str = "hazardous_days.csv";

/// The output file name for emission standard assessments
const POLLUTANT_TRENDS_FILE_NAME: &str = "pollutant_trends.csv";

/// The output file name for health-cost estimates
const HEALTH_COSTS_FILE_NAME: &str = "health_costs.csv";

/// The output file name for the policy commitment ranking
const POLICY_COMMITMENT_FILE_NAME: &str = "policy_commitment.csv";

/// The output file name for assessments which could not be carried out
const ASSESSMENT_ERRORS_FILE_NAME: &str = "assessment_errors.csv";

/// Get the output folder for the study in the specified directory
pub fn get_output_dir(study_dir: &Path) -> Result<PathBuf> {
    // canonicalise in case the user has specified "."
    let study_dir = study_dir
        .canonicalize()
        .context("Could not resolve path to study")?;

    let study_name = study_dir
        .file_name()
        .context("Study cannot be in root folder")?
        .to_str()
        .context("Invalid chars in study dir name")?;

    Ok([OUTPUT_DIRECTORY_ROOT, study_name].iter().collect())
}

/// Create a new output directory, if it doesn't already exist.
///
/// An existing directory with files in it is only reused if `overwrite` is set.
///
/// # Returns
///
/// Whether existing files will be overwritten
pub fn create_output_directory(output_dir: &Path, overwrite: bool) -> Result<bool> {
    if output_dir.is_dir() {
        let is_empty = fs::read_dir(output_dir)?.next().is_none();
        ensure!(
            is_empty || overwrite,
            "Output folder already exists and is not empty. Use --overwrite to replace its contents."
        );

        return Ok(!is_empty);
    }

    // Try to create the directory, with parents
    fs::create_dir_all(output_dir)?;

    Ok(false)
}

/// Represents an emergency framework assessment in the output CSV file
#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct HazardousDaysRow {
    policy_id: PolicyID,
    cutover: NaiveDate,
    hazardous_aqi: f64,
    before_days: usize,
    before_hazardous_days: usize,
    before_hazardous_pct: f64,
    after_days: usize,
    after_hazardous_days: usize,
    after_hazardous_pct: f64,
    change_pct_points: f64,
    trend: Trend,
    assessment: String,
}

impl HazardousDaysRow {
    fn new(policy_id: &PolicyID, report: &HazardousDaysReport) -> Self {
        Self {
            policy_id: policy_id.clone(),
            cutover: report.cutover,
            hazardous_aqi: report.hazardous_aqi,
            before_days: report.before_days,
            before_hazardous_days: report.before_hazardous_days,
            before_hazardous_pct: report.before_hazardous_pct,
            after_days: report.after_days,
            after_hazardous_days: report.after_hazardous_days,
            after_hazardous_pct: report.after_hazardous_pct,
            change_pct_points: report.change_pct_points,
            trend: report.trend,
            assessment: report.assessment().to_string(),
        }
    }
}

/// Represents an emission standard assessment in the output CSV file
#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct PollutantTrendRow {
    policy_id: PolicyID,
    pollutant: Pollutant,
    cutover: NaiveDate,
    before_count: usize,
    before_mean: f64,
    after_count: usize,
    after_mean: f64,
    change_pct: f64,
    trend: Trend,
    assessment: String,
}

impl PollutantTrendRow {
    fn new(policy_id: &PolicyID, report: &PollutantTrendReport) -> Self {
        Self {
            policy_id: policy_id.clone(),
            pollutant: report.pollutant,
            cutover: report.cutover,
            before_count: report.before_count,
            before_mean: report.before_mean,
            after_count: report.after_count,
            after_mean: report.after_mean,
            change_pct: report.change_pct,
            trend: report.trend,
            assessment: report.assessment().to_string(),
        }
    }
}

/// Represents a health-cost estimate in the output CSV file.
///
/// Days in each category band get a column each.
#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct HealthCostRow {
    city: CityID,
    year: i32,
    population: u64,
    days_recorded: usize,
    good_days: usize,
    satisfactory_days: usize,
    moderate_days: usize,
    poor_days: usize,
    very_poor_days: usize,
    severe_days: usize,
    unhealthy_days: usize,
    total_cost: Money,
    total_cost_crores: f64,
    cost_per_capita: MoneyPerPerson,
}

impl HealthCostRow {
    fn new(report: &HealthCostReport) -> Self {
        let days = |category| {
            report
                .days_by_category
                .get(&category)
                .copied()
                .unwrap_or_default()
        };

        Self {
            city: report.city.clone(),
            year: report.year,
            population: report.population,
            days_recorded: report.days_recorded,
            good_days: days(AqiCategory::Good),
            satisfactory_days: days(AqiCategory::Satisfactory),
            moderate_days: days(AqiCategory::Moderate),
            poor_days: days(AqiCategory::Poor),
            very_poor_days: days(AqiCategory::VeryPoor),
            severe_days: days(AqiCategory::Severe),
            unhealthy_days: report.unhealthy_days,
            total_cost: report.total_cost,
            total_cost_crores: report.total_cost_crores(),
            cost_per_capita: report.cost_per_capita,
        }
    }
}

/// Represents a city's place in the policy commitment ranking
#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct PolicyCommitmentRow {
    rank: usize,
    city: CityID,
    tier: u8,
    num_policies: usize,
    policies: String,
    mean_seasonal_aqi: Option<f64>,
}

/// Represents an assessment which could not be carried out
#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct AssessmentErrorRow {
    /// The kind of assessment (`policy` or `health_cost`)
    assessment: String,
    /// The policy or city being assessed
    subject: String,
    /// For windowed policies, which window failed
    period_index: Option<usize>,
    error: String,
}

impl AssessmentErrorRow {
    fn new<E: ToString>(
        assessment: &str,
        subject: &str,
        period_index: Option<usize>,
        error: &E,
    ) -> Self {
        Self {
            assessment: assessment.to_string(),
            subject: subject.to_string(),
            period_index,
            error: error.to_string(),
        }
    }
}

/// An object for writing the results of a study to CSV files
pub struct ReportWriter {
    periods_writer: csv::Writer<File>,
    hazardous_days_writer: csv::Writer<File>,
    trends_writer: csv::Writer<File>,
    health_costs_writer: csv::Writer<File>,
    commitment_writer: csv::Writer<File>,
    errors_writer: csv::Writer<File>,
}

impl ReportWriter {
    /// Open CSV files to write reports to
    ///
    /// # Arguments
    ///
    /// * `output_path` - Folder where files will be saved
    pub fn create(output_path: &Path) -> Result<Self> {
        let new_writer = |file_name| {
            let file_path = output_path.join(file_name);
            csv::Writer::from_path(file_path)
        };

        Ok(Self {
            periods_writer: new_writer(INTERVENTION_PERIODS_FILE_NAME)?,
            hazardous_days_writer: new_writer(HAZARDOUS_DAYS_FILE_NAME)?,
            trends_writer: new_writer(POLLUTANT_TRENDS_FILE_NAME)?,
            health_costs_writer: new_writer(HEALTH_COSTS_FILE_NAME)?,
            commitment_writer: new_writer(POLICY_COMMITMENT_FILE_NAME)?,
            errors_writer: new_writer(ASSESSMENT_ERRORS_FILE_NAME)?,
        })
    }

    /// Write every part of a study report
    pub fn write_report(&mut self, report: &StudyReport) -> Result<()> {
        for (policy_id, assessment) in &report.policies {
            match assessment {
                Ok(assessment) => self.write_policy_assessment(policy_id, assessment)?,
                Err(err) => self.errors_writer.serialize(AssessmentErrorRow::new(
                    "policy",
                    &policy_id.0,
                    None,
                    err,
                ))?,
            }
        }
        self.write_health_costs(&report.health_costs)?;
        self.write_commitment(&report.commitment)?;

        Ok(())
    }

    /// Write the assessment of a single policy to the file for its kind
    fn write_policy_assessment(
        &mut self,
        policy_id: &PolicyID,
        assessment: &PolicyAssessment,
    ) -> Result<()> {
        match assessment {
            PolicyAssessment::Windowed(periods) => {
                for (period_index, period) in periods.iter().enumerate() {
                    self.write_intervention_period(policy_id, period_index, period)?;
                }
            }
            PolicyAssessment::EmergencyThreshold(report) => self
                .hazardous_days_writer
                .serialize(HazardousDaysRow::new(policy_id, report))?,
            PolicyAssessment::EmissionStandard(report) => self
                .trends_writer
                .serialize(PollutantTrendRow::new(policy_id, report))?,
        }

        Ok(())
    }

    fn write_intervention_period(
        &mut self,
        policy_id: &PolicyID,
        period_index: usize,
        period: &AnalysisResult<InterventionPeriodReport>,
    ) -> Result<()> {
        match period {
            Ok(report) => self.periods_writer.serialize(report)?,
            Err(err) => self.errors_writer.serialize(AssessmentErrorRow::new(
                "policy",
                &policy_id.0,
                Some(period_index),
                err,
            ))?,
        }

        Ok(())
    }

    /// Write health-cost estimates to a CSV file
    pub fn write_health_costs(
        &mut self,
        reports: &[(CityID, AnalysisResult<HealthCostReport>)],
    ) -> Result<()> {
        for (city_id, report) in reports {
            match report {
                Ok(report) => self
                    .health_costs_writer
                    .serialize(HealthCostRow::new(report))?,
                Err(err) => self.errors_writer.serialize(AssessmentErrorRow::new(
                    "health_cost",
                    &city_id.0,
                    None,
                    err,
                ))?,
            }
        }

        Ok(())
    }

    /// Write the policy commitment ranking to a CSV file
    pub fn write_commitment(&mut self, ranking: &[CommitmentRanking]) -> Result<()> {
        for (rank, entry) in ranking.iter().enumerate() {
            self.commitment_writer.serialize(PolicyCommitmentRow {
                rank: rank + 1,
                city: entry.city.clone(),
                tier: entry.tier,
                num_policies: entry.num_policies,
                policies: entry.policy_list(),
                mean_seasonal_aqi: entry.mean_seasonal_aqi,
            })?;
        }

        Ok(())
    }

    /// Flush the underlying streams
    pub fn flush(&mut self) -> Result<()> {
        self.periods_writer.flush()?;
        self.hazardous_days_writer.flush()?;
        self.trends_writer.flush()?;
        self.health_costs_writer.flush()?;
        self.commitment_writer.flush()?;
        self.errors_writer.flush()?;

        Ok(())
    }
}

/// Write a study report to CSV files in the given folder
pub fn write_study_report(output_path: &Path, report: &StudyReport) -> Result<()> {
    let mut writer = ReportWriter::create(output_path)?;
    writer.write_report(report)?;
    writer.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::Effectiveness;
    use crate::error::AnalysisError;
    use crate::fixture::date;
    use itertools::Itertools;
    use serde::de::DeserializeOwned;
    use std::collections::BTreeMap;
    use tempfile::tempdir;

    fn read_rows<T: DeserializeOwned>(dir: &Path, file_name: &str) -> Vec<T> {
        csv::Reader::from_path(dir.join(file_name))
            .unwrap()
            .into_deserialize()
            .try_collect()
            .unwrap()
    }

    fn period() -> InterventionPeriodReport {
        InterventionPeriodReport {
            policy_id: "odd_even".into(),
            period_index: 0,
            start: date("2016-01-01"),
            end: date("2016-01-15"),
            before_count: 15,
            during_count: 15,
            after_count: 15,
            before_mean: 300.0,
            during_mean: 250.0,
            after_mean: 275.0,
            change_during_pct: -16.666_666_666_666_668,
            change_after_pct: -8.333_333_333_333_334,
            t_statistic: 32.4,
            p_value: 1e-20,
            significant: true,
            effectiveness: Effectiveness::Effective,
        }
    }

    fn health_cost() -> HealthCostReport {
        let days_by_category: BTreeMap<AqiCategory, usize> = [
            (AqiCategory::Good, 0),
            (AqiCategory::Satisfactory, 10),
            (AqiCategory::Moderate, 0),
            (AqiCategory::Poor, 4),
            (AqiCategory::VeryPoor, 2),
            (AqiCategory::Severe, 1),
        ]
        .into_iter()
        .collect();

        HealthCostReport {
            city: "Delhi".into(),
            year: 2019,
            population: 1000,
            days_recorded: 17,
            days_by_category,
            unhealthy_days: 7,
            total_cost: Money(10_000.0),
            cost_per_capita: MoneyPerPerson(10.0),
        }
    }

    #[test]
    fn test_write_report() {
        let trend_report = PollutantTrendReport {
            pollutant: Pollutant::NO2,
            cutover: date("2020-04-01"),
            before_count: 10,
            before_mean: 60.0,
            after_count: 10,
            after_mean: 45.0,
            change_pct: -25.0,
            trend: Trend::Improved,
        };
        let report = StudyReport {
            policies: vec![
                (
                    "odd_even".into(),
                    Ok(PolicyAssessment::Windowed(vec![
                        Ok(period()),
                        Err(AnalysisError::NoData("no records".into())),
                    ])),
                ),
                ("bs6".into(), Ok(PolicyAssessment::EmissionStandard(trend_report))),
                (
                    "grap".into(),
                    Err(AnalysisError::InsufficientData("too few".into())),
                ),
            ],
            health_costs: vec![
                ("Delhi".into(), Ok(health_cost())),
                (
                    "Noida".into(),
                    Err(AnalysisError::NoData("no records for Noida in 2019".into())),
                ),
            ],
            commitment: vec![CommitmentRanking {
                city: "Delhi".into(),
                num_policies: 3,
                policies: vec!["odd_even".into(), "bs6".into(), "grap".into()],
                mean_seasonal_aqi: Some(310.5),
                tier: 1,
            }],
        };

        let dir = tempdir().unwrap();
        write_study_report(dir.path(), &report).unwrap();

        let periods: Vec<InterventionPeriodReport> =
            read_rows(dir.path(), INTERVENTION_PERIODS_FILE_NAME);
        assert_eq!(periods, [period()]);

        let trends: Vec<PollutantTrendRow> = read_rows(dir.path(), POLLUTANT_TRENDS_FILE_NAME);
        assert_eq!(trends.len(), 1);
        assert_eq!(trends[0].policy_id.to_string(), "bs6");
        assert_eq!(trends[0].assessment, "Gradual improvement observed");

        let health_costs: Vec<HealthCostRow> = read_rows(dir.path(), HEALTH_COSTS_FILE_NAME);
        assert_eq!(health_costs, [HealthCostRow::new(&health_cost())]);
        assert_eq!(health_costs[0].poor_days, 4);

        let commitment: Vec<PolicyCommitmentRow> =
            read_rows(dir.path(), POLICY_COMMITMENT_FILE_NAME);
        assert_eq!(commitment[0].rank, 1);
        assert_eq!(commitment[0].policies, "odd_even, bs6, grap");

        let errors: Vec<AssessmentErrorRow> = read_rows(dir.path(), ASSESSMENT_ERRORS_FILE_NAME);
        assert_eq!(
            errors,
            [
                AssessmentErrorRow::new(
                    "policy",
                    "odd_even",
                    Some(1),
                    &AnalysisError::NoData("no records".into())
                ),
                AssessmentErrorRow::new(
                    "policy",
                    "grap",
                    None,
                    &AnalysisError::InsufficientData("too few".into())
                ),
                AssessmentErrorRow::new(
                    "health_cost",
                    "Noida",
                    None,
                    &AnalysisError::NoData("no records for Noida in 2019".into())
                ),
            ]
        );
    }

    #[test]
    fn test_write_hazardous_days() {
        let report = HazardousDaysReport {
            cutover: date("2017-01-01"),
            hazardous_aqi: 300.0,
            before_days: 20,
            before_hazardous_days: 10,
            before_hazardous_pct: 50.0,
            after_days: 20,
            after_hazardous_days: 12,
            after_hazardous_pct: 60.0,
            change_pct_points: 10.0,
            trend: Trend::NotImproved,
        };
        let policy_id: PolicyID = "grap".into();

        let dir = tempdir().unwrap();
        {
            let mut writer = ReportWriter::create(dir.path()).unwrap();
            writer
                .write_policy_assessment(
                    &policy_id,
                    &PolicyAssessment::EmergencyThreshold(report.clone()),
                )
                .unwrap();
            writer.flush().unwrap();
        }

        let rows: Vec<HazardousDaysRow> = read_rows(dir.path(), HAZARDOUS_DAYS_FILE_NAME);
        assert_eq!(rows, [HazardousDaysRow::new(&policy_id, &report)]);
        assert_eq!(rows[0].assessment, "No improvement in worst days");
    }

    #[test]
    fn test_create_output_directory_new() {
        let dir = tempdir().unwrap();
        let output_dir = dir.path().join("a").join("b");
        assert!(!create_output_directory(&output_dir, false).unwrap());
        assert!(output_dir.is_dir());
    }

    #[test]
    fn test_create_output_directory_existing() {
        let dir = tempdir().unwrap();

        // Empty folders can always be reused
        assert!(!create_output_directory(dir.path(), false).unwrap());

        fs::write(dir.path().join(HEALTH_COSTS_FILE_NAME), "").unwrap();
        assert!(create_output_directory(dir.path(), false).is_err());
        assert!(create_output_directory(dir.path(), true).unwrap());
    }

    #[test]
    fn test_get_output_dir() {
        let dir = tempdir().unwrap();
        let study_dir = dir.path().join("delhi");
        fs::create_dir(&study_dir).unwrap();

        let expected: PathBuf = [OUTPUT_DIRECTORY_ROOT, "delhi"].iter().collect();
        assert_eq!(get_output_dir(&study_dir).unwrap(), expected);
    }
}
