//! Ranking of cities by how many catalogued policies apply to them.
use crate::city::{CityID, CityMap};
use crate::policy::{PolicyCatalog, PolicyID};
use crate::series::{HistoricalSeries, in_months};
use crate::stats::mean;
use itertools::Itertools;
use serde::Serialize;

/// One city's place in the policy-commitment ranking
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommitmentRanking {
    /// The city
    pub city: CityID,
    /// Number of catalogued policies which apply to the city
    pub num_policies: usize,
    /// The policies, in catalogue order
    pub policies: Vec<PolicyID>,
    /// Mean AQI over the seasonal months, if the city has any records in them
    pub mean_seasonal_aqi: Option<f64>,
    /// Administrative tier
    pub tier: u8,
}

impl CommitmentRanking {
    /// Policy IDs joined for display (`None` if no policy applies)
    pub fn policy_list(&self) -> String {
        if self.policies.is_empty() {
            "None".into()
        } else {
            self.policies.iter().join(", ")
        }
    }
}

/// Rank every city by the number of catalogued policies which apply to it.
///
/// Cities with the same number of policies keep their catalogue order.
pub fn rank_policy_commitment(
    series: &HistoricalSeries,
    cities: &CityMap,
    policies: &PolicyCatalog,
    seasonal_months: &[u32],
) -> Vec<CommitmentRanking> {
    cities
        .values()
        .map(|city| {
            let applicable = policies
                .values()
                .filter(|policy| policy.applies_to(&city.id))
                .map(|policy| policy.id.clone())
                .collect_vec();
            let seasonal_aqi = series
                .for_city(&city.id.0)
                .iter()
                .filter(|record| in_months(record.date, seasonal_months))
                .map(|record| record.aqi)
                .collect_vec();

            CommitmentRanking {
                city: city.id.clone(),
                num_policies: applicable.len(),
                policies: applicable,
                mean_seasonal_aqi: mean(&seasonal_aqi).ok(),
                tier: city.tier,
            }
        })
        .sorted_by(|a, b| b.num_policies.cmp(&a.num_policies))
        .collect()
}
