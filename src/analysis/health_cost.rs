//! An illustrative estimate of the health cost of polluted days.
//!
//! This is a simple aggregation over category bands, not a medically validated model: each day
//! in a band is assigned a fixed cost per resident, and the total is annualised over the year.
use crate::category::{AqiCategory, CategoryBands};
use crate::city::CityID;
use crate::error::{AnalysisError, AnalysisResult, ensure_or};
use crate::series::HistoricalSeries;
use crate::units::{Days, Dimensionless, Money, MoneyPerPerson, MoneyPerPersonDay, Population};
use chrono::NaiveDate;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use strum::IntoEnumIterator;

/// Rupees in one crore
const RUPEES_PER_CRORE: f64 = 10_000_000.0;

/// Days over which costs are annualised
const DAYS_PER_YEAR: f64 = 365.0;

/// Cost per resident of one day in each category band.
///
/// Every category has a rate. Categories not given in the input take the default rate, which is
/// zero for the three least severe bands.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HealthCostRates {
    /// Cost of a Good day
    pub good: MoneyPerPersonDay,
    /// Cost of a Satisfactory day
    pub satisfactory: MoneyPerPersonDay,
    /// Cost of a Moderate day
    pub moderate: MoneyPerPersonDay,
    /// Cost of a Poor day
    pub poor: MoneyPerPersonDay,
    /// Cost of a Very Poor day
    pub very_poor: MoneyPerPersonDay,
    /// Cost of a Severe day
    pub severe: MoneyPerPersonDay,
}

impl Default for HealthCostRates {
    fn default() -> Self {
        Self {
            good: MoneyPerPersonDay(0.0),
            satisfactory: MoneyPerPersonDay(0.0),
            moderate: MoneyPerPersonDay(0.0),
            poor: MoneyPerPersonDay(250.0),
            very_poor: MoneyPerPersonDay(500.0),
            severe: MoneyPerPersonDay(1000.0),
        }
    }
}

impl HealthCostRates {
    /// The rate for a category
    pub fn rate(&self, category: AqiCategory) -> MoneyPerPersonDay {
        match category {
            AqiCategory::Good => self.good,
            AqiCategory::Satisfactory => self.satisfactory,
            AqiCategory::Moderate => self.moderate,
            AqiCategory::Poor => self.poor,
            AqiCategory::VeryPoor => self.very_poor,
            AqiCategory::Severe => self.severe,
        }
    }

    /// Check that every rate is finite and non-negative
    pub fn validate(&self) -> AnalysisResult<()> {
        for category in AqiCategory::iter() {
            let rate = self.rate(category);
            ensure_or!(
                rate.is_finite() && rate.value() >= 0.0,
                Configuration,
                "health cost for a {category} day must be a finite, non-negative number"
            );
        }

        Ok(())
    }
}

/// Estimated health cost of one year of air quality in a city
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthCostReport {
    /// The city
    pub city: CityID,
    /// The calendar year
    pub year: i32,
    /// Number of residents
    pub population: u64,
    /// Number of days with records
    pub days_recorded: usize,
    /// Number of days in each category band (every category is present)
    pub days_by_category: BTreeMap<AqiCategory, usize>,
    /// Number of Poor, Very Poor and Severe days
    pub unhealthy_days: usize,
    /// Annualised cost across the population
    pub total_cost: Money,
    /// Annualised cost per resident
    pub cost_per_capita: MoneyPerPerson,
}

impl HealthCostReport {
    /// Total cost in crores of rupees
    pub fn total_cost_crores(&self) -> f64 {
        self.total_cost.value() / RUPEES_PER_CRORE
    }
}

/// Estimate the health cost of polluted days in a city for a calendar year.
///
/// Each recorded day is placed in its category band and costed at that band's rate per resident.
/// The sum is scaled by the population and divided by 365. A year with no unhealthy days costs
/// nothing, but a year with no records at all is an error.
pub fn estimate_health_cost_impact(
    series: &HistoricalSeries,
    city: &CityID,
    year: i32,
    population: u64,
    rates: &HealthCostRates,
    bands: &CategoryBands,
) -> AnalysisResult<HealthCostReport> {
    let out_of_range = || AnalysisError::InvalidInput(format!("year {year} is out of range"));
    let first_day = NaiveDate::from_ymd_opt(year, 1, 1).ok_or_else(out_of_range)?;
    let last_day = NaiveDate::from_ymd_opt(year, 12, 31).ok_or_else(out_of_range)?;
    let records = series.for_city_between(&city.0, first_day..=last_day);
    ensure_or!(!records.is_empty(), NoData, "no records for {city} in {year}");

    let mut days_by_category: BTreeMap<AqiCategory, usize> =
        AqiCategory::iter().map(|c| (c, 0)).collect();
    for record in records {
        let category = bands.band_for(record.aqi)?.category;
        *days_by_category.entry(category).or_default() += 1;
    }

    let cost_over_days: MoneyPerPerson = days_by_category
        .iter()
        .map(|(&category, &days)| rates.rate(category) * Days(days as f64))
        .sum();
    let cost_per_capita = cost_over_days / Dimensionless(DAYS_PER_YEAR);
    let total_cost = cost_per_capita * Population(population as f64);
    let unhealthy_days = days_by_category
        .iter()
        .filter(|&(&category, _)| category >= AqiCategory::Poor)
        .map(|(_, &days)| days)
        .sum();
    debug!("Health cost for {city} in {year}: {total_cost:?}");

    Ok(HealthCostReport {
        city: city.clone(),
        year,
        population,
        days_recorded: records.len(),
        days_by_category,
        unhealthy_days,
        total_cost,
        cost_per_capita,
    })
}
