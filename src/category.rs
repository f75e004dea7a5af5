//! AQI category bands (Good to Severe) and lookup of the band for an index value.
use crate::error::{AnalysisError, AnalysisResult, ensure_or};
use serde::Serialize;
use serde_string_enum::{DeserializeLabeledStringEnum, SerializeLabeledStringEnum};
use strum::EnumIter;

/// The six ordered severity bands of the national AQI
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    EnumIter,
    SerializeLabeledStringEnum,
    DeserializeLabeledStringEnum,
)]
pub enum AqiCategory {
    /// AQI 0-50
    #[string = "Good"]
    Good,
    /// AQI 51-100
    #[string = "Satisfactory"]
    Satisfactory,
    /// AQI 101-200
    #[string = "Moderate"]
    Moderate,
    /// AQI 201-300
    #[string = "Poor"]
    Poor,
    /// AQI 301-400
    #[string = "Very Poor"]
    VeryPoor,
    /// AQI 401 and above
    #[string = "Severe"]
    Severe,
}

/// The index range covered by one category, with how it is presented to users
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryBand {
    /// The category
    pub category: AqiCategory,
    /// Lowest AQI in the band
    pub index_low: u32,
    /// Highest AQI in the band
    pub index_high: u32,
    /// Display colour as a hex string (e.g. `#00B050`)
    pub colour: String,
    /// Short description of health effects
    pub health_impact: String,
}

impl CategoryBand {
    /// Whether the band's range contains the given AQI
    pub fn contains(&self, aqi: f64) -> bool {
        aqi >= self.index_low as f64 && aqi <= self.index_high as f64
    }
}

/// The full, ordered set of category bands.
///
/// The bands start at zero, are contiguous and cover every category exactly once, in order. The
/// last band is open-ended: AQI values above its ceiling are placed in it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryBands(Vec<CategoryBand>);

impl CategoryBands {
    /// Create a set of bands, checking they are complete, ordered and contiguous
    pub fn new(bands: Vec<CategoryBand>) -> AnalysisResult<Self> {
        use strum::IntoEnumIterator;

        ensure_or!(
            bands.len() == AqiCategory::iter().count(),
            Configuration,
            "expected {} category bands, found {}",
            AqiCategory::iter().count(),
            bands.len()
        );
        for (band, category) in bands.iter().zip(AqiCategory::iter()) {
            ensure_or!(
                band.category == category,
                Configuration,
                "category bands must be given in order of severity (expected {category}, found {})",
                band.category
            );
            ensure_or!(
                band.index_low <= band.index_high,
                Configuration,
                "band {category} has decreasing range"
            );
        }
        ensure_or!(
            bands[0].index_low == 0,
            Configuration,
            "first category band must start at zero"
        );
        for (lower, upper) in bands.iter().zip(bands.iter().skip(1)) {
            ensure_or!(
                upper.index_low == lower.index_high + 1,
                Configuration,
                "category bands {} and {} are not contiguous",
                lower.category,
                upper.category
            );
        }

        Ok(Self(bands))
    }

    /// The CPCB category bands
    pub fn cpcb() -> Self {
        let band = |category, index_low, index_high, colour: &str, health_impact: &str| {
            CategoryBand {
                category,
                index_low,
                index_high,
                colour: colour.into(),
                health_impact: health_impact.into(),
            }
        };

        Self(vec![
            band(AqiCategory::Good, 0, 50, "#00B050", "Minimal impact"),
            band(
                AqiCategory::Satisfactory,
                51,
                100,
                "#92D050",
                "Minor breathing discomfort for sensitive people",
            ),
            band(
                AqiCategory::Moderate,
                101,
                200,
                "#FFFF00",
                "Breathing discomfort for people with lung/heart disease",
            ),
            band(
                AqiCategory::Poor,
                201,
                300,
                "#FF9900",
                "Breathing discomfort for most people",
            ),
            band(
                AqiCategory::VeryPoor,
                301,
                400,
                "#FF0000",
                "Respiratory illness on prolonged exposure",
            ),
            band(
                AqiCategory::Severe,
                401,
                500,
                "#C00000",
                "Affects healthy people, serious impact on ill",
            ),
        ])
    }

    /// Find the band for an AQI value.
    ///
    /// The first band whose ceiling is at least `aqi` is returned, so fractional values between
    /// two integer bands (e.g. 200.5) go into the upper one. Values above the last ceiling go
    /// into the last band.
    pub fn band_for(&self, aqi: f64) -> AnalysisResult<&CategoryBand> {
        ensure_or!(
            aqi.is_finite() && aqi >= 0.0,
            InvalidInput,
            "AQI must be a finite, non-negative number (got {aqi})"
        );

        let band = self
            .0
            .iter()
            .find(|band| aqi <= band.index_high as f64)
            .unwrap_or_else(|| self.terminal());

        Ok(band)
    }

    /// The band for a category
    pub fn get(&self, category: AqiCategory) -> &CategoryBand {
        // Bands are checked on construction to hold every category in order
        &self.0[category as usize]
    }

    /// The most severe, open-ended band
    pub fn terminal(&self) -> &CategoryBand {
        &self.0[self.0.len() - 1]
    }

    /// Iterate over the bands in order of severity
    pub fn iter(&self) -> impl Iterator<Item = &CategoryBand> {
        self.0.iter()
    }
}

impl Default for CategoryBands {
    fn default() -> Self {
        Self::cpcb()
    }
}

impl TryFrom<Vec<CategoryBand>> for CategoryBands {
    type Error = AnalysisError;

    fn try_from(bands: Vec<CategoryBand>) -> AnalysisResult<Self> {
        Self::new(bands)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use strum::IntoEnumIterator;

    #[test]
    fn test_cpcb_bands_are_valid() {
        let bands = CategoryBands::cpcb();
        assert_eq!(CategoryBands::new(bands.0.clone()).unwrap(), bands);
    }

    #[rstest]
    #[case(0.0, AqiCategory::Good)]
    #[case(50.0, AqiCategory::Good)]
    #[case(50.5, AqiCategory::Satisfactory)]
    #[case(51.0, AqiCategory::Satisfactory)]
    #[case(142.0, AqiCategory::Moderate)]
    #[case(200.0, AqiCategory::Moderate)]
    #[case(201.0, AqiCategory::Poor)]
    #[case(352.0, AqiCategory::VeryPoor)]
    #[case(401.0, AqiCategory::Severe)]
    #[case(500.0, AqiCategory::Severe)]
    #[case(650.0, AqiCategory::Severe)] // Overflow goes into the terminal band
    fn test_band_for(#[case] aqi: f64, #[case] expected: AqiCategory) {
        let bands = CategoryBands::cpcb();
        assert_eq!(bands.band_for(aqi).unwrap().category, expected);
    }

    #[rstest]
    #[case(-1.0)]
    #[case(f64::NAN)]
    fn test_band_for_invalid(#[case] aqi: f64) {
        assert!(matches!(
            CategoryBands::cpcb().band_for(aqi),
            Err(AnalysisError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_category_labels() {
        let labels: Vec<_> = AqiCategory::iter().map(|c| c.to_string()).collect();
        assert_eq!(
            labels,
            ["Good", "Satisfactory", "Moderate", "Poor", "Very Poor", "Severe"]
        );
    }

    #[test]
    fn test_get() {
        let bands = CategoryBands::cpcb();
        assert_eq!(bands.get(AqiCategory::VeryPoor).index_low, 301);
        assert_eq!(bands.terminal().category, AqiCategory::Severe);
    }

    #[test]
    fn test_bands_not_contiguous() {
        let mut bands = CategoryBands::cpcb().0;
        bands[2].index_low = 105;
        assert_eq!(
            CategoryBands::new(bands),
            Err(AnalysisError::Configuration(
                "category bands Satisfactory and Moderate are not contiguous".into()
            ))
        );
    }

    #[test]
    fn test_bands_out_of_order() {
        let mut bands = CategoryBands::cpcb().0;
        bands.swap(0, 1);
        assert!(CategoryBands::new(bands).is_err());
    }

    #[test]
    fn test_bands_missing() {
        let mut bands = CategoryBands::cpcb().0;
        bands.pop();
        assert_eq!(
            CategoryBands::new(bands),
            Err(AnalysisError::Configuration(
                "expected 6 category bands, found 5".into()
            ))
        );
    }
}
