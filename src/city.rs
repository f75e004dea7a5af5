//! Cities (or regions) for which air quality is recorded.
use crate::id::{define_id_getter, define_id_type};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

define_id_type! {CityID}

/// A map of [`City`]s, keyed by city ID, in catalogue order
pub type CityMap = IndexMap<CityID, City>;

/// A city with the metadata needed for health-cost estimates and rankings
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct City {
    /// A unique identifier for the city (e.g. "Delhi")
    pub id: CityID,
    /// A longer description (e.g. "Delhi NCT")
    pub description: String,
    /// Number of residents
    pub population: u64,
    /// Administrative tier (1 for the largest metros)
    pub tier: u8,
}
define_id_getter! {City, CityID}
