//! Calculation of the national Air Quality Index from pollutant concentrations.
//!
//! Each pollutant's concentration is mapped onto an index range with its breakpoint table
//! ([`compute_sub_index`]). The overall AQI is the largest of these sub-indices and the pollutant
//! which reaches it is reported as dominant ([`compute_aqi`]).
use crate::breakpoint::{BreakpointTable, BreakpointTables};
use crate::category::{AqiCategory, CategoryBands};
use crate::error::{AnalysisError, AnalysisResult, ensure_or};
use crate::pollutant::{Pollutant, PollutantReading, check_concentration};
use log::debug;
use serde::Serialize;
use std::collections::BTreeMap;

/// The result of one AQI calculation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AqiResult {
    /// The overall index (the largest sub-index)
    pub aqi: u32,
    /// The category band containing `aqi`
    pub category: AqiCategory,
    /// Display colour of the category
    pub colour: String,
    /// Health impact of the category
    pub health_impact: String,
    /// The pollutant whose sub-index equals `aqi`
    pub dominant_pollutant: Pollutant,
    /// Sub-index of every pollutant in the reading
    pub sub_indices: BTreeMap<Pollutant, u32>,
}

/// Calculate the sub-index for one pollutant's concentration.
///
/// The bracket containing the concentration is found and the index is linearly interpolated
/// within it, then rounded to the nearest integer (halves away from zero).
///
/// Brackets are scanned in order and the first one whose upper concentration is at least
/// `concentration` is used. Hence a value on a boundary shared by two brackets belongs to the
/// lower one, and a value in the gap between two brackets (e.g. 30.5 when one bracket ends at 30
/// and the next starts at 31) is given the lower bracket's highest index.
///
/// Concentrations beyond the last bracket are given the table's maximum index rather than being
/// extrapolated.
///
/// # Arguments
///
/// * `concentration` - Concentration in the table's units
/// * `table` - Breakpoint table for the pollutant
pub fn compute_sub_index(concentration: f64, table: &BreakpointTable) -> AnalysisResult<u32> {
    check_concentration(table.pollutant(), concentration)?;

    let brackets = table.brackets();
    if concentration < brackets[0].concentration_low {
        return Ok(table.min_index());
    }

    let Some(pos) = brackets
        .iter()
        .position(|bracket| concentration <= bracket.concentration_high)
    else {
        // Off the chart
        return Ok(table.max_index());
    };

    let bracket = &brackets[pos];
    if concentration < bracket.concentration_low {
        // In the gap after the previous bracket. pos > 0 here, as the first bracket's lower
        // bound was checked above.
        return Ok(brackets[pos - 1].index_high);
    }

    let index = bracket
        .interpolate(concentration)
        .round()
        .clamp(bracket.index_low as f64, bracket.index_high as f64);

    Ok(index as u32)
}

/// Calculate the AQI for a reading.
///
/// Every pollutant in the reading must have a breakpoint table. Pollutants with an invalid
/// concentration (negative or non-finite) are left out of the result, and the calculation fails
/// with [`AnalysisError::NoData`] if no valid pollutant remains. When two pollutants share the
/// highest sub-index, the first in canonical order ([`Pollutant`]) is dominant.
///
/// # Arguments
///
/// * `reading` - Measured concentrations (at least one)
/// * `tables` - Breakpoint tables for the pollutants in the reading
/// * `bands` - Category bands used to classify the result
pub fn compute_aqi(
    reading: &PollutantReading,
    tables: &BreakpointTables,
    bands: &CategoryBands,
) -> AnalysisResult<AqiResult> {
    ensure_or!(!reading.is_empty(), NoData, "reading contains no pollutants");

    let mut sub_indices = BTreeMap::new();
    for (pollutant, concentration) in reading.iter() {
        let table = tables.get(pollutant)?;
        match compute_sub_index(concentration, table) {
            Ok(index) => {
                sub_indices.insert(pollutant, index);
            }
            Err(err @ AnalysisError::InvalidInput(_)) => debug!("Skipping {pollutant}: {err}"),
            Err(err) => return Err(err),
        }
    }

    // Iteration is in canonical order, so on a tie the earlier pollutant is kept
    let (dominant_pollutant, aqi) = sub_indices
        .iter()
        .fold(None, |best: Option<(Pollutant, u32)>, (&pollutant, &index)| {
            match best {
                Some((_, best_index)) if best_index >= index => best,
                _ => Some((pollutant, index)),
            }
        })
        .ok_or_else(|| {
            AnalysisError::NoData("reading contains no valid concentrations".into())
        })?;

    let band = bands.band_for(aqi as f64)?;
    debug!("AQI {aqi} ({}), dominant pollutant {dominant_pollutant}", band.category);

    Ok(AqiResult {
        aqi,
        category: band.category,
        colour: band.colour.clone(),
        health_impact: band.health_impact.clone(),
        dominant_pollutant,
        sub_indices,
    })
}
