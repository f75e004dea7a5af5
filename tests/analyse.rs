//! Integration tests for the `analyse` command.
use aqi_impact::cli::{AnalyseOpts, handle_analyse_command};
use aqi_impact::settings::Settings;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

/// Get the path to the demo study.
fn get_study_dir() -> PathBuf {
    PathBuf::from("demos/delhi")
}

/// Count the data rows in a CSV file
fn count_rows(path: &Path) -> usize {
    csv::Reader::from_path(path).unwrap().records().count()
}

/// An integration test for the `analyse` command.
#[test]
fn test_handle_analyse_command() {
    unsafe { std::env::set_var("AQI_IMPACT_LOG_LEVEL", "off") };

    // Save results to non-existent directory to check that directory creation works
    let tempdir = tempdir().unwrap();
    let output_dir = tempdir.path().join("results");
    let opts = AnalyseOpts {
        output_dir: Some(output_dir.clone()),
        overwrite: false,
    };
    handle_analyse_command(&get_study_dir(), &opts, Some(Settings::default())).unwrap();

    assert_eq!(count_rows(&output_dir.join("intervention_periods.csv")), 3);
    assert_eq!(count_rows(&output_dir.join("hazardous_days.csv")), 1);
    assert_eq!(count_rows(&output_dir.join("pollutant_trends.csv")), 1);
    assert_eq!(count_rows(&output_dir.join("health_costs.csv")), 4);
    assert_eq!(count_rows(&output_dir.join("policy_commitment.csv")), 4);
    assert_eq!(count_rows(&output_dir.join("assessment_errors.csv")), 0);
    assert!(output_dir.join("aqi_impact_info.log").is_file());

    // The folder now has files in it, so it won't be reused without --overwrite
    let err = handle_analyse_command(&get_study_dir(), &opts, Some(Settings::default()))
        .unwrap_err();
    assert!(err.to_string().starts_with("Failed to create output directory"));
    assert!(fs::read_dir(&output_dir).unwrap().count() > 0);
}
