use crate::data::{Gender, TransportMode};
use crate::filter::FilterCriteria;
use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::error::Error;
use std::fs::File;
use std::io::BufReader;
use std::str::FromStr;

// Field definitions and associated default values

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Param {
    #[serde(default)]
    pub general: General,
    #[serde(default)]
    pub data: DataParam,
    #[serde(default)]
    pub filters: Filters,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct General {
    #[serde(default = "log_base_default")]
    pub log_base: String,
    #[serde(default = "log_suffix_default")]
    pub log_suffix: String,
    #[serde(default = "log_level_default")]
    pub log_level: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct DataParam {
    #[serde(default = "dataset_path_default")]
    pub path: String,
    #[serde(default = "mock_samples_default")]
    pub mock_samples: usize,
    #[serde(default = "seed_default")]
    pub seed: u64,
}

/// Initial sidebar state. Empty category lists mean "everything selected",
/// the multiselect default.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Filters {
    #[serde(default = "age_min_default")]
    pub age_min: u32,
    #[serde(default = "age_max_default")]
    pub age_max: u32,
    #[serde(default)]
    pub genders: Vec<String>,
    #[serde(default)]
    pub districts: Vec<String>,
    #[serde(default)]
    pub transport_modes: Vec<String>,
}

impl Filters {
    /// Build criteria from the configured selections. Empty lists expand
    /// to the full category sets; an empty district list leaves districts
    /// unconstrained.
    pub fn to_criteria(&self) -> Result<FilterCriteria, Box<dyn Error>> {
        let genders: HashSet<Gender> = if self.genders.is_empty() {
            Gender::ALL.into_iter().collect()
        } else {
            self.genders
                .iter()
                .map(|s| Gender::from_str(s))
                .collect::<Result<_, _>>()?
        };
        let transport_modes: HashSet<TransportMode> = if self.transport_modes.is_empty() {
            TransportMode::ALL.into_iter().collect()
        } else {
            self.transport_modes
                .iter()
                .map(|s| TransportMode::from_str(s))
                .collect::<Result<_, _>>()?
        };
        let districts = if self.districts.is_empty() {
            None
        } else {
            Some(self.districts.iter().cloned().collect())
        };
        Ok(FilterCriteria {
            age_min: self.age_min,
            age_max: self.age_max,
            genders,
            transport_modes,
            districts,
        })
    }
}

// Default section definitions

impl Default for General {
    fn default() -> Self {
        serde_json::from_value(serde_json::json!({})).unwrap()
    }
}

impl Default for DataParam {
    fn default() -> Self {
        serde_json::from_value(serde_json::json!({})).unwrap()
    }
}

impl Default for Filters {
    fn default() -> Self {
        serde_json::from_value(serde_json::json!({})).unwrap()
    }
}

impl Default for Param {
    fn default() -> Self {
        serde_json::from_value(serde_json::json!({})).unwrap()
    }
}

impl Param {
    pub fn new() -> Self {
        Self::default()
    }
}

pub fn get(param_file: String) -> Result<Param, Box<dyn Error>> {
    let param_file_reader = File::open(param_file)?;
    let param_reader = BufReader::new(param_file_reader);

    let mut config: Param = serde_yaml::from_reader(param_reader)?;

    validate(&mut config)?;

    Ok(config)
}

pub fn validate(param: &mut Param) -> Result<(), String> {
    if param.data.mock_samples == 0 {
        return Err("Invalid mock_samples=0. The fallback generator needs at least one row.".to_string());
    }

    if param.filters.age_min > param.filters.age_max {
        return Err(format!(
            "Invalid age range [{}, {}]. age_min must not exceed age_max.",
            param.filters.age_min, param.filters.age_max
        ));
    }

    if param.filters.age_max > 120 {
        warn!(
            "age_max={} exceeds the expected age domain; the upper bound will never exclude anything.",
            param.filters.age_max
        );
    }

    Ok(())
}

// Default value definitions

fn dataset_path_default() -> String {
    "dataset/smart_city_citizen_activity.csv".to_string()
}
fn mock_samples_default() -> usize {
    300
}
fn seed_default() -> u64 {
    42
}
fn log_base_default() -> String {
    "".to_string()
}
fn log_suffix_default() -> String {
    "log".to_string()
}
fn log_level_default() -> String {
    "info".to_string()
}
fn age_min_default() -> u32 {
    20
}
fn age_max_default() -> u32 {
    60
}
