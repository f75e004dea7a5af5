//! Common functionality for aqi_impact.
#![warn(missing_docs)]
use dirs::config_dir;
use std::path::PathBuf;

pub mod analysis;
pub mod aqi;
pub mod breakpoint;
pub mod category;
pub mod city;
pub mod cli;
pub mod error;
pub mod id;
pub mod input;
pub mod log;
pub mod output;
pub mod policy;
pub mod pollutant;
pub mod series;
pub mod settings;
pub mod stats;
pub mod study;
pub mod units;

#[cfg(test)]
mod fixture;

/// Get config dir for program.
///
/// On Linux this will be `~/.config/aqi_impact`.
pub fn get_aqi_impact_config_dir() -> PathBuf {
    let mut path = config_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("aqi_impact");
    path
}
