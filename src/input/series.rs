//! Code for reading the historical series of daily records from a CSV file.
use super::*;
use crate::aqi::compute_aqi;
use crate::breakpoint::BreakpointTables;
use crate::category::CategoryBands;
use crate::city::{CityID, CityMap};
use crate::id::IDCollection;
use crate::pollutant::{Pollutant, PollutantReading};
use crate::series::{HistoricalRecord, HistoricalSeries};
use chrono::NaiveDate;
use indexmap::IndexSet;
use log::info;
use serde::Deserialize;

const SERIES_FILE_NAME: &str = "series.csv";

/// A row of the series file, where any measurement may be missing
#[derive(Debug, Deserialize)]
struct HistoricalRecordRaw {
    city: String,
    date: NaiveDate,
    #[serde(rename = "PM2.5")]
    pm25: Option<f64>,
    #[serde(rename = "PM10")]
    pm10: Option<f64>,
    #[serde(rename = "NO2")]
    no2: Option<f64>,
    #[serde(rename = "SO2")]
    so2: Option<f64>,
    #[serde(rename = "CO")]
    co: Option<f64>,
    #[serde(rename = "O3")]
    o3: Option<f64>,
    #[serde(rename = "AQI")]
    aqi: Option<f64>,
}

impl HistoricalRecordRaw {
    fn reading(&self) -> PollutantReading {
        let mut reading = PollutantReading::new();
        reading.insert_opt(Pollutant::PM25, self.pm25);
        reading.insert_opt(Pollutant::PM10, self.pm10);
        reading.insert_opt(Pollutant::NO2, self.no2);
        reading.insert_opt(Pollutant::SO2, self.so2);
        reading.insert_opt(Pollutant::CO, self.co);
        reading.insert_opt(Pollutant::O3, self.o3);
        reading
    }
}

/// Read the historical series.
///
/// Rows without an AQI value have it computed from their concentrations.
///
/// # Arguments
///
/// * `study_dir` - Folder containing study input files
/// * `cities` - The city catalogue, which every row's city must belong to
/// * `tables` - Breakpoint tables for computing missing AQI values
/// * `bands` - Category bands for computing missing AQI values
pub fn read_series(
    study_dir: &Path,
    cities: &CityMap,
    tables: &BreakpointTables,
    bands: &CategoryBands,
) -> Result<HistoricalSeries> {
    let file_path = study_dir.join(SERIES_FILE_NAME);
    let rows = read_csv::<HistoricalRecordRaw>(&file_path)?;
    read_series_from_iter(rows, cities, tables, bands).with_context(|| input_err_msg(&file_path))
}

fn read_series_from_iter<I>(
    iter: I,
    cities: &CityMap,
    tables: &BreakpointTables,
    bands: &CategoryBands,
) -> Result<HistoricalSeries>
where
    I: Iterator<Item = HistoricalRecordRaw>,
{
    let city_ids: IndexSet<CityID> = cities.keys().cloned().collect();
    let mut computed = 0;
    let mut records = Vec::new();
    for raw in iter {
        let city = city_ids.get_id_by_str(&raw.city)?;
        let reading = raw.reading();
        let aqi = match raw.aqi {
            Some(aqi) => aqi,
            None => {
                computed += 1;
                let result = compute_aqi(&reading, tables, bands).with_context(|| {
                    format!("Cannot compute AQI for {city} on {}", raw.date)
                })?;
                result.aqi as f64
            }
        };

        records.push(HistoricalRecord {
            city,
            date: raw.date,
            reading,
            aqi,
        });
    }
    if computed > 0 {
        info!("Computed AQI from concentrations for {computed} records");
    }

    Ok(HistoricalSeries::new(records)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::{bands, cities, date, tables};
    use rstest::rstest;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    /// Create an example series file in dir_path
    fn create_series_file(dir_path: &Path, rows: &str) {
        let file_path = dir_path.join(SERIES_FILE_NAME);
        let mut file = File::create(file_path).unwrap();
        writeln!(file, "city,date,PM2.5,PM10,NO2,SO2,CO,O3,AQI\n{rows}").unwrap();
    }

    #[rstest]
    fn test_read_series(cities: CityMap, tables: BreakpointTables, bands: CategoryBands) {
        let dir = tempdir().unwrap();
        create_series_file(
            dir.path(),
            "Delhi,2020-01-02,120,,60,,1.2,,290
Noida,2020-01-01,73,,,,,,
Delhi,2020-01-01,,,,,,,310",
        );

        let series = read_series(dir.path(), &cities, &tables, &bands).unwrap();
        assert_eq!(series.len(), 3);

        let delhi = series.for_city("Delhi");
        assert_eq!(delhi[0].date, date("2020-01-01"));
        assert_eq!(delhi[0].aqi, 310.0);
        assert!(delhi[0].reading.is_empty());
        assert_eq!(delhi[1].reading.get(Pollutant::NO2), Some(60.0));
        assert_eq!(delhi[1].reading.get(Pollutant::PM10), None);

        // Computed from the PM2.5 concentration
        assert_eq!(series.for_city("Noida")[0].aqi, 142.0);
    }

    #[rstest]
    #[case::unknown_city("Pune,2020-01-01,,,,,,,100")]
    #[case::no_aqi_or_concentrations("Delhi,2020-01-01,,,,,,,")]
    #[case::negative_concentration("Delhi,2020-01-01,-4,,,,,,")]
    #[case::bad_date("Delhi,2020-13-01,,,,,,,100")]
    #[case::duplicate_day("Delhi,2020-01-01,,,,,,,100\nDelhi,2020-01-01,,,,,,,120")]
    fn test_read_series_invalid(
        cities: CityMap,
        tables: BreakpointTables,
        bands: CategoryBands,
        #[case] rows: &str,
    ) {
        let dir = tempdir().unwrap();
        create_series_file(dir.path(), rows);
        assert!(read_series(dir.path(), &cities, &tables, &bands).is_err());
    }
}
