//! Fixtures for tests

use crate::breakpoint::BreakpointTables;
use crate::category::CategoryBands;
use crate::city::{City, CityID, CityMap};
use crate::policy::{DateWindow, PolicyIntervention, PolicyKind};
use crate::pollutant::PollutantReading;
use crate::series::{HistoricalRecord, HistoricalSeries};
use chrono::{Days, NaiveDate};
use indexmap::indexmap;
use rstest::fixture;

/// Assert that an error with the given message occurs
macro_rules! assert_error {
    ($result:expr, $msg:expr) => {
        assert_eq!(
            $result.unwrap_err().chain().next().unwrap().to_string(),
            $msg
        );
    };
}
pub(crate) use assert_error;

/// Parse an ISO 8601 date
pub fn date(s: &str) -> NaiveDate {
    s.parse().unwrap()
}

/// A record with an AQI but no concentrations
pub fn record(city: &str, day: &str, aqi: f64) -> HistoricalRecord {
    HistoricalRecord {
        city: city.into(),
        date: date(day),
        reading: PollutantReading::new(),
        aqi,
    }
}

/// Records for consecutive days starting on `first_day`, one per AQI value
pub fn daily_records(city: &str, first_day: &str, aqi: &[f64]) -> Vec<HistoricalRecord> {
    let first_day = date(first_day);
    aqi.iter()
        .enumerate()
        .map(|(i, &aqi)| HistoricalRecord {
            city: city.into(),
            date: first_day + Days::new(i as u64),
            reading: PollutantReading::new(),
            aqi,
        })
        .collect()
}

/// Repeat a short pattern of AQI values to fill `days` days
pub fn repeat_pattern(pattern: &[f64], days: usize) -> Vec<f64> {
    pattern.iter().copied().cycle().take(days).collect()
}

#[fixture]
pub fn tables() -> BreakpointTables {
    BreakpointTables::cpcb()
}

#[fixture]
pub fn bands() -> CategoryBands {
    CategoryBands::cpcb()
}

#[fixture]
pub fn cities() -> CityMap {
    indexmap! {
        "Delhi".into() => City {
            id: "Delhi".into(),
            description: "Delhi".into(),
            population: 32_000_000,
            tier: 1,
        },
        "Noida".into() => City {
            id: "Noida".into(),
            description: "Noida".into(),
            population: 700_000,
            tier: 2,
        },
    }
}

#[fixture]
pub fn odd_even() -> PolicyIntervention {
    PolicyIntervention {
        id: "odd_even".into(),
        name: "Odd-even vehicle rationing".into(),
        kind: PolicyKind::Windowed,
        cities: vec![CityID::new("Delhi")],
        windows: vec![
            DateWindow::new(date("2016-01-01"), date("2016-01-15")).unwrap(),
            DateWindow::new(date("2016-04-15"), date("2016-04-30")).unwrap(),
        ],
        cutover: None,
        pollutant: None,
        expected_impact: "Lower vehicular emissions while in force".into(),
    }
}

/// Delhi AQI around the first odd-even window.
///
/// The 15 days before average 300, the 15 days in force average 250 and the 15 days after average
/// 275. There is no data around the second window.
#[fixture]
pub fn odd_even_series() -> HistoricalSeries {
    let mut records = daily_records(
        "Delhi",
        "2015-12-17",
        &repeat_pattern(&[295.0, 300.0, 305.0], 15),
    );
    records.extend(daily_records(
        "Delhi",
        "2016-01-01",
        &repeat_pattern(&[245.0, 250.0, 255.0], 15),
    ));
    records.extend(daily_records(
        "Delhi",
        "2016-01-16",
        &repeat_pattern(&[270.0, 275.0, 280.0], 15),
    ));

    HistoricalSeries::new(records).unwrap()
}
