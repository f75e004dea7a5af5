//! Integration tests running every assessment on the demo study.
use aqi_impact::analysis::{Effectiveness, Trend};
use aqi_impact::pollutant::Pollutant;
use aqi_impact::study::{PolicyAssessment, Study};
use std::path::PathBuf;

/// Get the path to the demo study.
fn get_study_dir() -> PathBuf {
    PathBuf::from("demos/delhi")
}

#[test]
fn test_demo_study_assessments() {
    let study = Study::from_path(get_study_dir()).unwrap();
    assert_eq!(study.reference.cities.len(), 4);
    assert_eq!(study.reference.policies.len(), 3);

    let report = study.run_assessments().unwrap();
    let assessments: Vec<_> = report
        .policies
        .iter()
        .map(|(id, assessment)| (id.to_string(), assessment.as_ref().unwrap()))
        .collect();

    let ("odd_even", PolicyAssessment::Windowed(periods)) =
        (assessments[0].0.as_str(), assessments[0].1)
    else {
        panic!("Unexpected assessment: {:?}", assessments[0]);
    };
    assert_eq!(periods.len(), 3);
    for period in periods {
        let period = period.as_ref().unwrap();
        assert_eq!(period.before_count, 15);
        assert!(period.change_during_pct < -5.0);
        assert_eq!(period.effectiveness, Effectiveness::Effective);
    }

    let PolicyAssessment::EmergencyThreshold(hazardous) = assessments[1].1 else {
        panic!("Unexpected assessment: {:?}", assessments[1]);
    };
    assert!(hazardous.before_hazardous_pct > hazardous.after_hazardous_pct);
    assert_eq!(hazardous.trend, Trend::Improved);

    let PolicyAssessment::EmissionStandard(trend) = assessments[2].1 else {
        panic!("Unexpected assessment: {:?}", assessments[2]);
    };
    assert_eq!(trend.pollutant, Pollutant::NO2);
    assert!(trend.change_pct < -20.0);
    assert_eq!(trend.assessment(), "Gradual improvement observed");
}

#[test]
fn test_demo_study_health_costs_and_commitment() {
    let study = Study::from_path(get_study_dir()).unwrap();
    let report = study.run_assessments().unwrap();

    let delhi = report.health_costs[0].1.as_ref().unwrap();
    assert_eq!(delhi.year, 2019);
    assert_eq!(delhi.days_recorded, 365);
    assert!(delhi.unhealthy_days > 150);
    let mumbai = report.health_costs[3].1.as_ref().unwrap();
    assert!(mumbai.unhealthy_days < delhi.unhealthy_days);
    assert!(mumbai.cost_per_capita < delhi.cost_per_capita);

    let ranking: Vec<_> = report
        .commitment
        .iter()
        .map(|entry| (entry.city.to_string(), entry.num_policies))
        .collect();
    assert_eq!(
        ranking,
        [
            ("Delhi".to_string(), 3),
            ("Noida".to_string(), 2),
            ("Gurgaon".to_string(), 2),
            ("Mumbai".to_string(), 1),
        ]
    );
    assert!(
        report
            .commitment
            .iter()
            .all(|entry| entry.mean_seasonal_aqi.is_some())
    );
}
