use crate::data::{AgeGroup, Dataset, Gender, TransportMode};
use crate::filter::{count_by, mean_by};
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Headline averages over the interactively filtered view. None when the
/// filter matched no rows; the consumer renders a "no data" state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyMetrics {
    pub avg_carbon_kg_co2: Option<f64>,
    pub avg_steps_walked: Option<f64>,
    pub avg_sleep_hours: Option<f64>,
    pub avg_social_media_hours: Option<f64>,
}

impl KeyMetrics {
    pub fn compute(dataset: &Dataset) -> KeyMetrics {
        KeyMetrics {
            avg_carbon_kg_co2: mean_of(dataset, |v| v.carbon_footprint_kg_co2),
            avg_steps_walked: mean_of(dataset, |v| v.steps_walked as f64),
            avg_sleep_hours: mean_of(dataset, |v| v.sleep_hours),
            avg_social_media_hours: mean_of(dataset, |v| v.social_media_hours),
        }
    }
}

/// Demographics tab: age histogram input, gender and district breakdowns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemographicsTab {
    pub age_values: Vec<u32>,
    pub gender_counts: Vec<(Gender, usize)>,
    pub district_counts: Vec<(String, usize)>,
}

/// Transport & environment tab. The EV-users table is the one view that
/// deliberately ignores the age-range selection: it slices the full
/// population by transport mode only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransportTab {
    pub mode_counts: Vec<(TransportMode, usize)>,
    pub carbon_by_mode: Vec<(TransportMode, f64)>,
    pub ev_users_by_age_group: Vec<(AgeGroup, usize)>,
    pub carbon_by_district: Vec<(String, f64)>,
}

/// Lifestyle tab: sleep histogram input, steps by gender, the social-media
/// vs sleep scatter pairs, recycling by age bin, digital usage by district.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LifestyleTab {
    pub sleep_values: Vec<f64>,
    pub steps_by_gender: Vec<(Gender, f64)>,
    pub social_vs_sleep: Vec<(f64, f64)>,
    pub recycling_by_age_group: Vec<(AgeGroup, f64)>,
    pub digital_usage_by_district: Vec<(String, f64)>,
}

/// Everything the dashboard renders for one filter interaction. Every
/// table has a deterministic order: counts descend (category tiebreak),
/// carbon-by-mode ascends by mean, age-group tables follow bin order,
/// district tables follow name order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardSnapshot {
    pub generated_at: String,
    pub total_records: usize,
    pub matching_records: usize,
    pub metrics: KeyMetrics,
    pub demographics: DemographicsTab,
    pub transport: TransportTab,
    pub lifestyle: LifestyleTab,
}

impl DashboardSnapshot {
    /// Build the full snapshot from the two named views: `population` is
    /// the complete cached dataset, `filtered` the interactively filtered
    /// one. Single synchronous pass per table, linear in row count.
    pub fn compute(population: &Dataset, filtered: &Dataset) -> DashboardSnapshot {
        let metrics = KeyMetrics::compute(filtered);

        let demographics = DemographicsTab {
            age_values: filtered.records.iter().map(|r| r.age).collect(),
            gender_counts: by_count_desc(count_by(filtered, |r| Some(r.gender))),
            district_counts: if filtered.has_district {
                by_count_desc(count_by(filtered, |r| r.district.clone()))
            } else {
                Vec::new()
            },
        };

        // EV adoption is read over the full population so the age-group
        // axis always spans all ages, whatever the slider says.
        let ev_users_by_age_group = by_key(count_by(population, |r| {
            if r.mode_of_transport == TransportMode::Ev {
                r.age_group()
            } else {
                None
            }
        }));

        let transport = TransportTab {
            mode_counts: by_count_desc(count_by(filtered, |r| Some(r.mode_of_transport))),
            carbon_by_mode: by_mean_asc(mean_by(
                filtered,
                |r| Some(r.mode_of_transport),
                |r| r.carbon_footprint_kg_co2,
            )),
            ev_users_by_age_group,
            carbon_by_district: if filtered.has_district {
                by_key(mean_by(
                    filtered,
                    |r| r.district.clone(),
                    |r| r.carbon_footprint_kg_co2,
                ))
            } else {
                Vec::new()
            },
        };

        let lifestyle = LifestyleTab {
            sleep_values: filtered.records.iter().map(|r| r.sleep_hours).collect(),
            steps_by_gender: by_key(mean_by(
                filtered,
                |r| Some(r.gender),
                |r| r.steps_walked as f64,
            )),
            social_vs_sleep: filtered
                .records
                .iter()
                .map(|r| (r.social_media_hours, r.sleep_hours))
                .collect(),
            recycling_by_age_group: by_key(mean_by(
                filtered,
                |r| r.age_group(),
                |r| r.recycling_rate,
            )),
            digital_usage_by_district: if filtered.has_district {
                by_key(mean_by(
                    filtered,
                    |r| r.district.clone(),
                    |r| r.digital_service_usage as f64,
                ))
            } else {
                Vec::new()
            },
        };

        DashboardSnapshot {
            generated_at: Local::now().format("%Y-%m-%d_%H-%M-%S").to_string(),
            total_records: population.len(),
            matching_records: filtered.len(),
            metrics,
            demographics,
            transport,
            lifestyle,
        }
    }
}

fn mean_of<F>(dataset: &Dataset, value: F) -> Option<f64>
where
    F: Fn(&crate::data::CitizenRecord) -> f64,
{
    if dataset.is_empty() {
        return None;
    }
    let sum: f64 = dataset.records.iter().map(|r| value(r)).sum();
    Some(sum / dataset.len() as f64)
}

/// Order a count mapping by descending count, category order on ties.
fn by_count_desc<K: Ord>(counts: HashMap<K, usize>) -> Vec<(K, usize)> {
    let mut table: Vec<(K, usize)> = counts.into_iter().collect();
    table.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    table
}

/// Order a mean mapping by ascending mean, category order on ties.
fn by_mean_asc<K: Ord>(means: HashMap<K, f64>) -> Vec<(K, f64)> {
    let mut table: Vec<(K, f64)> = means.into_iter().collect();
    table.sort_by(|a, b| match a.1.partial_cmp(&b.1) {
        Some(ordering) => ordering.then_with(|| a.0.cmp(&b.0)),
        None => std::cmp::Ordering::Equal,
    });
    table
}

/// Order a mapping by its key (bin order for age groups, name order for
/// districts and genders).
fn by_key<K: Ord, V>(map: HashMap<K, V>) -> Vec<(K, V)> {
    let mut table: Vec<(K, V)> = map.into_iter().collect();
    table.sort_by(|a, b| a.0.cmp(&b.0));
    table
}

fn write_metric(f: &mut fmt::Formatter<'_>, label: &str, value: Option<f64>) -> fmt::Result {
    match value {
        Some(v) => writeln!(f, "  {:<32} {:>10.1}", label, v),
        None => writeln!(f, "  {:<32} {:>10}", label, "no data"),
    }
}

impl fmt::Display for DashboardSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Snapshot {} — showing {} of {} records",
            self.generated_at, self.matching_records, self.total_records
        )?;

        writeln!(f, "\nKey metrics")?;
        write_metric(f, "Average carbon footprint (kg CO2)", self.metrics.avg_carbon_kg_co2)?;
        write_metric(f, "Average daily steps", self.metrics.avg_steps_walked)?;
        write_metric(f, "Average sleep hours", self.metrics.avg_sleep_hours)?;
        write_metric(f, "Average social media hours", self.metrics.avg_social_media_hours)?;

        writeln!(f, "\nDemographics")?;
        for (gender, count) in &self.demographics.gender_counts {
            writeln!(f, "  {:<16} {:>6}", gender.label(), count)?;
        }
        for (district, count) in &self.demographics.district_counts {
            writeln!(f, "  {:<16} {:>6}", district, count)?;
        }

        writeln!(f, "\nTransport & environment")?;
        for (mode, count) in &self.transport.mode_counts {
            writeln!(f, "  {:<16} {:>6}", mode.label(), count)?;
        }
        writeln!(f, "  Average CO2 by mode:")?;
        for (mode, mean) in &self.transport.carbon_by_mode {
            writeln!(f, "    {:<14} {:>8.2}", mode.label(), mean)?;
        }
        writeln!(f, "  EV users by age group (full population):")?;
        for (group, count) in &self.transport.ev_users_by_age_group {
            writeln!(f, "    {:<14} {:>6}", group.label(), count)?;
        }

        writeln!(f, "\nLifestyle")?;
        for (gender, steps) in &self.lifestyle.steps_by_gender {
            writeln!(f, "  {:<16} {:>8.0} steps", gender.label(), steps)?;
        }
        for (group, rate) in &self.lifestyle.recycling_by_age_group {
            writeln!(f, "  {:<16} {:>7.1}% recycled", group.label(), rate)?;
        }
        for (district, usage) in &self.lifestyle.digital_usage_by_district {
            writeln!(f, "  {:<16} {:>7.1}/10 digital", district, usage)?;
        }

        Ok(())
    }
}
