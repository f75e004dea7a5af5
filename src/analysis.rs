//! Assessment of whether pollution-control policies changed air quality.
//!
//! Every function here is a pure function of the series and reference data passed in. Nothing is
//! cached between calls and running an analysis twice gives identical output.
pub mod commitment;
pub mod emergency;
pub mod health_cost;
pub mod intervention;
pub mod trend;

pub use commitment::{CommitmentRanking, rank_policy_commitment};
pub use emergency::{HazardousDaysReport, analyse_emergency_threshold_policy};
pub use health_cost::{HealthCostRates, HealthCostReport, estimate_health_cost_impact};
pub use intervention::{
    Effectiveness, EffectivenessCriteria, InterventionPeriodReport, WindowPartition,
    analyse_intervention, analyse_intervention_periods,
};
pub use trend::{PollutantTrendReport, analyse_pollutant_trend};

use serde_string_enum::{DeserializeLabeledStringEnum, SerializeLabeledStringEnum};

/// Direction of a change in some measure of pollution
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, SerializeLabeledStringEnum, DeserializeLabeledStringEnum,
)]
pub enum Trend {
    /// The measure went down
    #[string = "improved"]
    Improved,
    /// The measure stayed the same or went up
    #[string = "not_improved"]
    NotImproved,
}

impl Trend {
    /// Classify a change, where negative values mean less pollution
    pub fn from_change(change: f64) -> Self {
        if change < 0.0 {
            Self::Improved
        } else {
            Self::NotImproved
        }
    }
}
