//! The historical series of daily air-quality records.
use crate::city::CityID;
use crate::error::{AnalysisResult, ensure_or};
use crate::pollutant::{Pollutant, PollutantReading};
use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use std::ops::{Bound, RangeBounds};

/// Air quality in one city on one day
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoricalRecord {
    /// The city
    pub city: CityID,
    /// The day
    pub date: NaiveDate,
    /// Mean concentrations over the day
    pub reading: PollutantReading,
    /// The day's AQI
    pub aqi: f64,
}

/// Daily records, sorted by city and then date, with at most one record per city-day.
///
/// The series is never modified once built; analyses only read slices of it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HistoricalSeries(Vec<HistoricalRecord>);

impl HistoricalSeries {
    /// Build a series from records in any order.
    ///
    /// Fails if a record has a non-physical AQI or if a city has two records for the same day.
    pub fn new(mut records: Vec<HistoricalRecord>) -> AnalysisResult<Self> {
        for record in &records {
            ensure_or!(
                record.aqi.is_finite() && record.aqi >= 0.0,
                InvalidInput,
                "AQI for {} on {} must be a finite, non-negative number (got {})",
                record.city,
                record.date,
                record.aqi
            );
            record.reading.validate()?;
        }

        records.sort_by(|a, b| a.city.cmp(&b.city).then(a.date.cmp(&b.date)));
        for (a, b) in records.iter().zip(records.iter().skip(1)) {
            ensure_or!(
                a.city != b.city || a.date != b.date,
                InvalidInput,
                "duplicate record for {} on {}",
                a.city,
                a.date
            );
        }

        Ok(Self(records))
    }

    /// All records, sorted by city and date
    pub fn records(&self) -> &[HistoricalRecord] {
        &self.0
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the series has no records
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The records for one city, in date order
    pub fn for_city(&self, city: &str) -> &[HistoricalRecord] {
        let start = self.0.partition_point(|r| &*r.city.0 < city);
        let end = self.0.partition_point(|r| &*r.city.0 <= city);
        &self.0[start..end]
    }

    /// The records for one city with dates in `range`, in date order
    pub fn for_city_between<R>(&self, city: &str, range: R) -> &[HistoricalRecord]
    where
        R: RangeBounds<NaiveDate>,
    {
        let records = self.for_city(city);
        let start = match range.start_bound() {
            Bound::Included(date) => records.partition_point(|r| r.date < *date),
            Bound::Excluded(date) => records.partition_point(|r| r.date <= *date),
            Bound::Unbounded => 0,
        };
        let end = match range.end_bound() {
            Bound::Included(date) => records.partition_point(|r| r.date <= *date),
            Bound::Excluded(date) => records.partition_point(|r| r.date < *date),
            Bound::Unbounded => records.len(),
        };

        &records[start..end.max(start)]
    }

    /// Records for any of the given cities (all cities if `cities` is empty)
    pub fn for_cities<'a>(
        &'a self,
        cities: &'a [CityID],
    ) -> impl Iterator<Item = &'a HistoricalRecord> + 'a {
        self.0
            .iter()
            .filter(move |r| cities.is_empty() || cities.contains(&r.city))
    }

    /// Concentrations of a pollutant across records, skipping records where it wasn't measured
    pub fn concentrations<'a, I>(records: I, pollutant: Pollutant) -> Vec<f64>
    where
        I: IntoIterator<Item = &'a HistoricalRecord>,
    {
        records
            .into_iter()
            .filter_map(|r| r.reading.get(pollutant))
            .collect()
    }
}

/// Whether a date falls in one of the given months (1-12)
pub fn in_months(date: NaiveDate, months: &[u32]) -> bool {
    months.contains(&date.month())
}
