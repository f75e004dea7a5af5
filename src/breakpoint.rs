//! Breakpoint tables mapping pollutant concentrations onto index ranges.
//!
//! The built-in tables are those of the CPCB National Air Quality Index. Tables are immutable
//! once built and are checked for contiguity when constructed.
use crate::error::{AnalysisError, AnalysisResult, ensure_or};
use crate::pollutant::Pollutant;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The largest gap allowed between the upper concentration of one bracket and the lower
/// concentration of the next.
///
/// CPCB tables are written with integer (or 0.1 mg/m³ for CO) precision, so that one bracket
/// ends at 30 and the next starts at 31.
pub const MAX_CONCENTRATION_GAP: f64 = 1.0;

/// The largest gap allowed between the upper index of one bracket and the lower index of the
/// next
pub const MAX_INDEX_GAP: u32 = 1;

/// One bracket of a breakpoint table
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Breakpoint {
    /// Lowest concentration in the bracket
    pub concentration_low: f64,
    /// Highest concentration in the bracket
    pub concentration_high: f64,
    /// Index value at `concentration_low`
    pub index_low: u32,
    /// Index value at `concentration_high`
    pub index_high: u32,
}

impl Breakpoint {
    /// Create a new [`Breakpoint`]
    pub const fn new(
        concentration_low: f64,
        concentration_high: f64,
        index_low: u32,
        index_high: u32,
    ) -> Self {
        Self {
            concentration_low,
            concentration_high,
            index_low,
            index_high,
        }
    }

    /// Linearly interpolate the (unrounded) index for a concentration inside this bracket
    pub fn interpolate(&self, concentration: f64) -> f64 {
        let index_low = self.index_low as f64;
        let index_high = self.index_high as f64;
        let width = self.concentration_high - self.concentration_low;
        if width <= 0.0 {
            return index_high;
        }

        (index_high - index_low) / width * (concentration - self.concentration_low) + index_low
    }

    fn check(&self) -> AnalysisResult<()> {
        ensure_or!(
            self.concentration_low.is_finite()
                && self.concentration_high.is_finite()
                && self.concentration_low >= 0.0,
            Configuration,
            "bracket concentrations must be finite and non-negative"
        );
        ensure_or!(
            self.concentration_low <= self.concentration_high,
            Configuration,
            "bracket concentrations are decreasing ({} > {})",
            self.concentration_low,
            self.concentration_high
        );
        ensure_or!(
            self.index_low <= self.index_high,
            Configuration,
            "bracket indices are decreasing ({} > {})",
            self.index_low,
            self.index_high
        );

        Ok(())
    }
}

/// The ordered brackets for one pollutant
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BreakpointTable {
    pollutant: Pollutant,
    brackets: Vec<Breakpoint>,
}

impl BreakpointTable {
    /// Create a table, checking that its brackets are ordered and contiguous.
    ///
    /// Adjacent brackets must not overlap. The gap between them may be at most
    /// [`MAX_CONCENTRATION_GAP`] in concentration and [`MAX_INDEX_GAP`] in index.
    pub fn new(pollutant: Pollutant, brackets: Vec<Breakpoint>) -> AnalysisResult<Self> {
        let table = Self {
            pollutant,
            brackets,
        };
        table.validate().map_err(|err| match err {
            AnalysisError::Configuration(msg) => {
                AnalysisError::Configuration(format!("breakpoint table for {pollutant}: {msg}"))
            }
            other => other,
        })?;

        Ok(table)
    }

    fn validate(&self) -> AnalysisResult<()> {
        ensure_or!(!self.brackets.is_empty(), Configuration, "table is empty");
        for bracket in &self.brackets {
            bracket.check()?;
        }

        for (lower, upper) in self.brackets.iter().zip(self.brackets.iter().skip(1)) {
            let gap = upper.concentration_low - lower.concentration_high;
            ensure_or!(
                gap >= 0.0,
                Configuration,
                "brackets overlap at {} and {}",
                lower.concentration_high,
                upper.concentration_low
            );
            ensure_or!(
                gap <= MAX_CONCENTRATION_GAP,
                Configuration,
                "brackets are not contiguous between {} and {}",
                lower.concentration_high,
                upper.concentration_low
            );
            ensure_or!(
                upper.index_low >= lower.index_high
                    && upper.index_low - lower.index_high <= MAX_INDEX_GAP,
                Configuration,
                "index ranges are not contiguous between {} and {}",
                lower.index_high,
                upper.index_low
            );
        }

        Ok(())
    }

    /// The pollutant the table applies to
    pub fn pollutant(&self) -> Pollutant {
        self.pollutant
    }

    /// The brackets, in increasing order of concentration
    pub fn brackets(&self) -> &[Breakpoint] {
        &self.brackets
    }

    /// The smallest index the table can produce
    pub fn min_index(&self) -> u32 {
        self.brackets[0].index_low
    }

    /// The largest index the table can produce
    pub fn max_index(&self) -> u32 {
        self.brackets[self.brackets.len() - 1].index_high
    }
}

/// One breakpoint table per pollutant
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BreakpointTables(BTreeMap<Pollutant, BreakpointTable>);

impl BreakpointTables {
    /// Collect tables, rejecting duplicate pollutants
    pub fn new<I>(tables: I) -> AnalysisResult<Self>
    where
        I: IntoIterator<Item = BreakpointTable>,
    {
        let mut map = BTreeMap::new();
        for table in tables {
            let pollutant = table.pollutant();
            ensure_or!(
                map.insert(pollutant, table).is_none(),
                Configuration,
                "duplicate breakpoint table for {pollutant}"
            );
        }

        Ok(Self(map))
    }

    /// The CPCB National Air Quality Index tables
    pub fn cpcb() -> Self {
        use Pollutant::{CO, NO2, O3, PM10, PM25, SO2};

        let raw: [(Pollutant, [(f64, f64, u32, u32); 6]); 6] = [
            (
                PM25,
                [
                    (0.0, 30.0, 0, 50),
                    (31.0, 60.0, 51, 100),
                    (61.0, 90.0, 101, 200),
                    (91.0, 120.0, 201, 300),
                    (121.0, 250.0, 301, 400),
                    (251.0, 500.0, 401, 500),
                ],
            ),
            (
                PM10,
                [
                    (0.0, 50.0, 0, 50),
                    (51.0, 100.0, 51, 100),
                    (101.0, 250.0, 101, 200),
                    (251.0, 350.0, 201, 300),
                    (351.0, 430.0, 301, 400),
                    (431.0, 600.0, 401, 500),
                ],
            ),
            (
                NO2,
                [
                    (0.0, 40.0, 0, 50),
                    (41.0, 80.0, 51, 100),
                    (81.0, 180.0, 101, 200),
                    (181.0, 280.0, 201, 300),
                    (281.0, 400.0, 301, 400),
                    (401.0, 1000.0, 401, 500),
                ],
            ),
            (
                SO2,
                [
                    (0.0, 40.0, 0, 50),
                    (41.0, 80.0, 51, 100),
                    (81.0, 380.0, 101, 200),
                    (381.0, 800.0, 201, 300),
                    (801.0, 1600.0, 301, 400),
                    (1601.0, 2400.0, 401, 500),
                ],
            ),
            (
                CO,
                [
                    (0.0, 1.0, 0, 50),
                    (1.1, 2.0, 51, 100),
                    (2.1, 10.0, 101, 200),
                    (10.1, 17.0, 201, 300),
                    (17.1, 34.0, 301, 400),
                    (34.1, 50.0, 401, 500),
                ],
            ),
            (
                O3,
                [
                    (0.0, 50.0, 0, 50),
                    (51.0, 100.0, 51, 100),
                    (101.0, 168.0, 101, 200),
                    (169.0, 208.0, 201, 300),
                    (209.0, 748.0, 301, 400),
                    (749.0, 1000.0, 401, 500),
                ],
            ),
        ];

        let map = raw
            .into_iter()
            .map(|(pollutant, brackets)| {
                let brackets = brackets
                    .into_iter()
                    .map(|(c_lo, c_hi, i_lo, i_hi)| Breakpoint::new(c_lo, c_hi, i_lo, i_hi))
                    .collect();
                (
                    pollutant,
                    BreakpointTable {
                        pollutant,
                        brackets,
                    },
                )
            })
            .collect();

        Self(map)
    }

    /// Get the table for a pollutant
    pub fn get(&self, pollutant: Pollutant) -> AnalysisResult<&BreakpointTable> {
        self.0.get(&pollutant).ok_or_else(|| {
            AnalysisError::Configuration(format!("no breakpoint table for {pollutant}"))
        })
    }

    /// Iterate over the tables in canonical pollutant order
    pub fn iter(&self) -> impl Iterator<Item = &BreakpointTable> {
        self.0.values()
    }
}

impl Default for BreakpointTables {
    fn default() -> Self {
        Self::cpcb()
    }
}
