//! Code for reading the policy catalogue from a TOML file.
use super::*;
use crate::city::{CityID, CityMap};
use crate::id::IDCollection;
use crate::policy::{DateWindow, PolicyCatalog, PolicyID, PolicyIntervention, PolicyKind};
use crate::pollutant::Pollutant;
use chrono::NaiveDate;
use indexmap::IndexSet;
use log::warn;
use serde::Deserialize;

const POLICIES_FILE_NAME: &str = "policies.toml";

/// The pollutant tracked for emission standards which don't name one
const DEFAULT_STANDARD_POLLUTANT: Pollutant = Pollutant::NO2;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct PoliciesFile {
    policies: Vec<PolicyRaw>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct PolicyRaw {
    id: PolicyID,
    name: String,
    kind: PolicyKind,
    cities: Vec<String>,
    #[serde(default)]
    windows: Vec<DateWindow>,
    cutover: Option<NaiveDate>,
    pollutant: Option<Pollutant>,
    #[serde(default)]
    expected_impact: String,
}

impl PolicyRaw {
    /// Check the raw policy against the city catalogue and its kind
    fn into_policy(self, city_ids: &IndexSet<CityID>) -> Result<PolicyIntervention> {
        ensure!(!self.cities.is_empty(), "policy must apply to at least one city");
        let mut cities = IndexSet::new();
        for city in &self.cities {
            let id = city_ids.get_id_by_str(city)?;
            ensure!(cities.insert(id), "City {city} is listed more than once");
        }
        let windows = self
            .windows
            .iter()
            .map(|window| DateWindow::new(window.start, window.end))
            .collect::<Result<Vec<_>, _>>()?;

        let mut policy = PolicyIntervention {
            id: self.id,
            name: self.name,
            kind: self.kind,
            cities: cities.into_iter().collect(),
            windows,
            cutover: self.cutover,
            pollutant: self.pollutant,
            expected_impact: self.expected_impact,
        };
        match policy.kind {
            PolicyKind::Windowed => {
                ensure!(
                    !policy.windows.is_empty(),
                    "windowed policy needs at least one window"
                );
            }
            PolicyKind::EmergencyThreshold => {
                policy.require_cutover()?;
            }
            PolicyKind::EmissionStandard => {
                policy.require_cutover()?;
                if policy.pollutant.is_none() {
                    warn!(
                        "No pollutant given for policy {}; assessing {DEFAULT_STANDARD_POLLUTANT}",
                        policy.id
                    );
                    policy.pollutant = Some(DEFAULT_STANDARD_POLLUTANT);
                }
            }
        }

        Ok(policy)
    }
}

/// Read the policy catalogue.
///
/// # Arguments
///
/// * `study_dir` - Folder containing study input files
/// * `cities` - The city catalogue, which every policy's cities must belong to
///
/// # Returns
///
/// The policies, keyed by ID in file order, or an error
pub fn read_policies(study_dir: &Path, cities: &CityMap) -> Result<PolicyCatalog> {
    let file_path = study_dir.join(POLICIES_FILE_NAME);
    let file: PoliciesFile = read_toml(&file_path)?;
    read_policies_from_iter(file.policies.into_iter(), cities)
        .with_context(|| input_err_msg(&file_path))
}

fn read_policies_from_iter<I>(iter: I, cities: &CityMap) -> Result<PolicyCatalog>
where
    I: Iterator<Item = PolicyRaw>,
{
    let city_ids: IndexSet<CityID> = cities.keys().cloned().collect();
    let mut policies = PolicyCatalog::new();
    for raw in iter {
        let id = raw.id.clone();
        let policy = raw
            .into_policy(&city_ids)
            .with_context(|| format!("Invalid policy {id}"))?;
        ensure!(
            policies.insert(id.clone(), policy).is_none(),
            "Duplicate policy ID found: {id}"
        );
    }
    ensure!(!policies.is_empty(), "No policies defined");

    Ok(policies)
}
