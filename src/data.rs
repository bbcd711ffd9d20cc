use crate::param::DataParam;
use log::{info, warn};
use rand::distributions::Distribution;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use statrs::distribution::{Exp, Normal};
use std::error::Error;
use std::fmt;
use std::path::Path;

/// Gender categories as they appear in the dataset column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
    #[serde(rename = "Non-binary")]
    NonBinary,
}

impl Gender {
    pub const ALL: [Gender; 3] = [Gender::Male, Gender::Female, Gender::NonBinary];

    pub fn label(&self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
            Gender::NonBinary => "Non-binary",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl std::str::FromStr for Gender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Male" => Ok(Gender::Male),
            "Female" => Ok(Gender::Female),
            "Non-binary" => Ok(Gender::NonBinary),
            other => Err(format!("Unknown gender category: {}", other)),
        }
    }
}

/// Transport modes as they appear in the dataset column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TransportMode {
    Bus,
    Car,
    Bicycle,
    Walk,
    #[serde(rename = "EV")]
    Ev,
    Train,
    Motorcycle,
}

impl TransportMode {
    pub const ALL: [TransportMode; 7] = [
        TransportMode::Bus,
        TransportMode::Car,
        TransportMode::Bicycle,
        TransportMode::Walk,
        TransportMode::Ev,
        TransportMode::Train,
        TransportMode::Motorcycle,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            TransportMode::Bus => "Bus",
            TransportMode::Car => "Car",
            TransportMode::Bicycle => "Bicycle",
            TransportMode::Walk => "Walk",
            TransportMode::Ev => "EV",
            TransportMode::Train => "Train",
            TransportMode::Motorcycle => "Motorcycle",
        }
    }
}

impl fmt::Display for TransportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl std::str::FromStr for TransportMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Bus" => Ok(TransportMode::Bus),
            "Car" => Ok(TransportMode::Car),
            "Bicycle" => Ok(TransportMode::Bicycle),
            "Walk" => Ok(TransportMode::Walk),
            "EV" => Ok(TransportMode::Ev),
            "Train" => Ok(TransportMode::Train),
            "Motorcycle" => Ok(TransportMode::Motorcycle),
            other => Err(format!("Unknown transport mode: {}", other)),
        }
    }
}

/// Fixed age bins: half-open intervals [18,25) [25,35) [35,45) [45,55)
/// [55,65) [65,75) and the open-ended [75,...]. A value equal to a
/// boundary falls into the higher bin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AgeGroup {
    From18To24,
    From25To34,
    From35To44,
    From45To54,
    From55To64,
    From65To74,
    From75,
}

impl AgeGroup {
    pub const ALL: [AgeGroup; 7] = [
        AgeGroup::From18To24,
        AgeGroup::From25To34,
        AgeGroup::From35To44,
        AgeGroup::From45To54,
        AgeGroup::From55To64,
        AgeGroup::From65To74,
        AgeGroup::From75,
    ];

    /// Bin an age; ages below the first boundary belong to no bin.
    pub fn from_age(age: u32) -> Option<AgeGroup> {
        match age {
            18..=24 => Some(AgeGroup::From18To24),
            25..=34 => Some(AgeGroup::From25To34),
            35..=44 => Some(AgeGroup::From35To44),
            45..=54 => Some(AgeGroup::From45To54),
            55..=64 => Some(AgeGroup::From55To64),
            65..=74 => Some(AgeGroup::From65To74),
            75.. => Some(AgeGroup::From75),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AgeGroup::From18To24 => "18-24",
            AgeGroup::From25To34 => "25-34",
            AgeGroup::From35To44 => "35-44",
            AgeGroup::From45To54 => "45-54",
            AgeGroup::From55To64 => "55-64",
            AgeGroup::From65To74 => "65-74",
            AgeGroup::From75 => "75+",
        }
    }
}

impl fmt::Display for AgeGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// One citizen's row of attributes. Column names in the CSV match the
/// serde renames exactly (header row required).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CitizenRecord {
    #[serde(rename = "Age")]
    pub age: u32,
    #[serde(rename = "Gender")]
    pub gender: Gender,
    #[serde(rename = "District", default)]
    pub district: Option<String>,
    #[serde(rename = "Mode_of_Transport")]
    pub mode_of_transport: TransportMode,
    #[serde(rename = "Carbon_Footprint_kgCO2")]
    pub carbon_footprint_kg_co2: f64,
    #[serde(rename = "Steps_Walked")]
    pub steps_walked: u32,
    #[serde(rename = "Sleep_Hours")]
    pub sleep_hours: f64,
    #[serde(rename = "Social_Media_Hours")]
    pub social_media_hours: f64,
    #[serde(rename = "Recycling_Rate")]
    pub recycling_rate: f64,
    #[serde(rename = "Digital_Service_Usage")]
    pub digital_service_usage: u32,
}

impl CitizenRecord {
    /// Derived age bin of this record.
    pub fn age_group(&self) -> Option<AgeGroup> {
        AgeGroup::from_age(self.age)
    }
}

/// Districts used by the mock generator.
pub const MOCK_DISTRICTS: [&str; 6] = [
    "Downtown",
    "Uptown",
    "Westside",
    "Eastside",
    "Suburbs",
    "Industrial",
];

/// An immutable table of citizen records. Rows are never mutated after
/// load; filtering produces new `Dataset` values.
#[derive(Clone, Serialize, Deserialize, PartialEq)]
pub struct Dataset {
    pub records: Vec<CitizenRecord>,
    /// Whether the District column carries any values. Aggregations over
    /// districts short-circuit to empty tables when this is false.
    pub has_district: bool,
}

impl Dataset {
    pub fn new() -> Dataset {
        Dataset {
            records: Vec::new(),
            has_district: false,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn from_records(records: Vec<CitizenRecord>) -> Dataset {
        let has_district = records.iter().any(|r| r.district.is_some());
        Dataset {
            records,
            has_district,
        }
    }

    /// Load a dataset from a comma-separated file with a header row.
    /// A malformed row is a fatal load error.
    pub fn load(path: &str) -> Result<Dataset, Box<dyn Error>> {
        info!("Loading dataset from {}...", path);
        let mut reader = csv::Reader::from_path(path)?;
        let mut records: Vec<CitizenRecord> = Vec::new();
        for row in reader.deserialize() {
            let record: CitizenRecord = row?;
            records.push(record);
        }
        if records.is_empty() {
            warn!("Dataset {} contains no rows", path);
        }
        Ok(Dataset::from_records(records))
    }

    /// Synthesize `n` rows from a fixed seed. Two calls with the same
    /// seed and `n` produce identical datasets.
    pub fn generate_mock(n: usize, seed: u64) -> Dataset {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);

        // Distribution parameters mirror the reference dataset
        let carbon = Normal::new(10.0, 5.0).unwrap();
        let sleep = Normal::new(7.0, 1.5).unwrap();
        let social = Exp::new(0.5).unwrap(); // mean of 2 hours
        let recycling = Normal::new(65.0, 20.0).unwrap();

        let records = (0..n)
            .map(|_| CitizenRecord {
                age: rng.gen_range(18..80),
                gender: *Gender::ALL.choose(&mut rng).unwrap(),
                district: Some((*MOCK_DISTRICTS.choose(&mut rng).unwrap()).to_string()),
                mode_of_transport: *TransportMode::ALL.choose(&mut rng).unwrap(),
                carbon_footprint_kg_co2: carbon.sample(&mut rng).clamp(0.0, 30.0),
                steps_walked: rng.gen_range(1000..15000),
                sleep_hours: sleep.sample(&mut rng).clamp(4.0, 10.0),
                social_media_hours: social.sample(&mut rng).clamp(0.0, 10.0),
                recycling_rate: recycling.sample(&mut rng).clamp(0.0, 100.0),
                digital_service_usage: rng.gen_range(1..10),
            })
            .collect();

        Dataset {
            records,
            has_district: true,
        }
    }

    /// Sorted unique district names present in the dataset.
    pub fn districts(&self) -> Vec<String> {
        let mut districts: Vec<String> = self
            .records
            .iter()
            .filter_map(|r| r.district.clone())
            .collect();
        districts.sort();
        districts.dedup();
        districts
    }
}

/// Read the dataset from the configured path, falling back to the mock
/// generator when the file is absent. The fallback is an expected
/// alternate path, not an error: it is reported once, informationally.
pub fn load_or_generate(param: &DataParam) -> Result<Dataset, Box<dyn Error>> {
    if Path::new(&param.path).exists() {
        Dataset::load(&param.path)
    } else {
        info!(
            "Dataset {} not found: generating {} mock records instead (seed {})",
            param.path, param.mock_samples, param.seed
        );
        Ok(Dataset::generate_mock(param.mock_samples, param.seed))
    }
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Records: {}   District column: {}",
            self.len(),
            if self.has_district { "yes" } else { "no" }
        )?;
        writeln!(
            f,
            "{:<5} {:<11} {:<11} {:<11} {:>8} {:>7} {:>6} {:>7} {:>7} {:>4}",
            "Age",
            "Gender",
            "District",
            "Transport",
            "CO2(kg)",
            "Steps",
            "Sleep",
            "Social",
            "Recycl",
            "Dig"
        )?;
        // Limit the preview to the first 20 rows
        for r in self.records.iter().take(20) {
            writeln!(
                f,
                "{:<5} {:<11} {:<11} {:<11} {:>8.2} {:>7} {:>6.2} {:>7.2} {:>7.1} {:>4}",
                r.age,
                r.gender.label(),
                r.district.as_deref().unwrap_or(""),
                r.mode_of_transport.label(),
                r.carbon_footprint_kg_co2,
                r.steps_walked,
                r.sleep_hours,
                r.social_media_hours,
                r.recycling_rate,
                r.digital_service_usage,
            )?;
        }
        if self.len() > 20 {
            writeln!(f, "... ({} more rows)", self.len() - 20)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Reuse the Display formatter
        write!(f, "{}", self)
    }
}
