use crate::data::{CitizenRecord, Dataset, Gender, TransportMode};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::hash::Hash;

/// The active combination of range/multiselect selections defining which
/// records are included. Immutable value object: rebuilt from the caller's
/// state on each interaction, never mutated in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterCriteria {
    pub age_min: u32,
    pub age_max: u32,
    pub genders: HashSet<Gender>,
    pub transport_modes: HashSet<TransportMode>,
    /// None, or an empty set, means the district is not constrained.
    pub districts: Option<HashSet<String>>,
}

impl FilterCriteria {
    /// Criteria matching every record: full age domain, every gender and
    /// transport mode, no district constraint.
    pub fn permissive() -> FilterCriteria {
        FilterCriteria {
            age_min: 18,
            age_max: 100,
            genders: Gender::ALL.into_iter().collect(),
            transport_modes: TransportMode::ALL.into_iter().collect(),
            districts: None,
        }
    }

    pub fn with_age_range(mut self, age_min: u32, age_max: u32) -> FilterCriteria {
        self.age_min = age_min;
        self.age_max = age_max;
        self
    }

    pub fn matches(&self, record: &CitizenRecord) -> bool {
        if record.age < self.age_min || record.age > self.age_max {
            return false;
        }
        if !self.genders.contains(&record.gender) {
            return false;
        }
        if !self.transport_modes.contains(&record.mode_of_transport) {
            return false;
        }
        match &self.districts {
            Some(districts) if !districts.is_empty() => match &record.district {
                Some(district) => districts.contains(district),
                None => false,
            },
            _ => true,
        }
    }
}

/// Return the sub-sequence of rows matching the criteria, in their
/// original order. Pure: the input dataset is left untouched, and an
/// empty result is a valid dataset, not an error.
pub fn apply_filters(dataset: &Dataset, criteria: &FilterCriteria) -> Dataset {
    Dataset {
        records: dataset
            .records
            .iter()
            .filter(|r| criteria.matches(r))
            .cloned()
            .collect(),
        has_district: dataset.has_district,
    }
}

/// Count records per category. Records whose key accessor yields None are
/// skipped, so counts sum to the number of keyed rows. No ordering is
/// imposed; callers sort as they need.
pub fn count_by<K, F>(dataset: &Dataset, key: F) -> HashMap<K, usize>
where
    K: Eq + Hash,
    F: Fn(&CitizenRecord) -> Option<K>,
{
    let mut counts: HashMap<K, usize> = HashMap::new();
    for record in &dataset.records {
        if let Some(k) = key(record) {
            *counts.entry(k).or_insert(0) += 1;
        }
    }
    counts
}

/// Mean of a value column per category. A group with no rows is simply
/// absent from the result, so an empty dataset yields an empty mapping
/// rather than NaN placeholders.
pub fn mean_by<K, F, V>(dataset: &Dataset, key: F, value: V) -> HashMap<K, f64>
where
    K: Eq + Hash,
    F: Fn(&CitizenRecord) -> Option<K>,
    V: Fn(&CitizenRecord) -> f64,
{
    let mut sums: HashMap<K, (f64, usize)> = HashMap::new();
    for record in &dataset.records {
        if let Some(k) = key(record) {
            let entry = sums.entry(k).or_insert((0.0, 0));
            entry.0 += value(record);
            entry.1 += 1;
        }
    }
    sums.into_iter()
        .map(|(k, (sum, n))| (k, sum / n as f64))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::AgeGroup;

    fn create_test_data() -> Dataset {
        let male_ages = [20u32, 30, 40, 50, 60];
        let female_ages = [22u32, 33, 44, 55, 66];
        let mut records = Vec::new();
        for (i, &age) in male_ages.iter().enumerate() {
            records.push(CitizenRecord {
                age,
                gender: Gender::Male,
                district: Some(if i % 2 == 0 { "Downtown" } else { "Uptown" }.to_string()),
                mode_of_transport: TransportMode::Car,
                carbon_footprint_kg_co2: 10.0 + i as f64,
                steps_walked: 5000 + 1000 * i as u32,
                sleep_hours: 7.0,
                social_media_hours: 2.0,
                recycling_rate: 60.0,
                digital_service_usage: 5,
            });
        }
        for (i, &age) in female_ages.iter().enumerate() {
            records.push(CitizenRecord {
                age,
                gender: Gender::Female,
                district: Some(if i % 2 == 0 { "Downtown" } else { "Uptown" }.to_string()),
                mode_of_transport: TransportMode::Ev,
                carbon_footprint_kg_co2: 4.0,
                steps_walked: 8000,
                sleep_hours: 7.5,
                social_media_hours: 1.0,
                recycling_rate: 70.0,
                digital_service_usage: 7,
            });
        }
        Dataset::from_records(records)
    }

    #[test]
    fn test_apply_filters_scenario() {
        // 10 rows, 5 Male with ages [20,30,40,50,60]; age 25-55 and Male
        // must keep exactly the 30 and 40 year olds.
        let data = create_test_data();
        let criteria = FilterCriteria {
            age_min: 25,
            age_max: 55,
            genders: [Gender::Male].into_iter().collect(),
            transport_modes: TransportMode::ALL.into_iter().collect(),
            districts: None,
        };
        let filtered = apply_filters(&data, &criteria);
        assert_eq!(filtered.len(), 2, "exactly two Male rows fall in [25,55]");
        let ages: Vec<u32> = filtered.records.iter().map(|r| r.age).collect();
        assert_eq!(ages, vec![30, 40], "the surviving rows keep their original order");
        assert_eq!(data.len(), 10, "the input dataset is never mutated");
    }

    #[test]
    fn test_apply_filters_is_exact_and_idempotent() {
        let data = create_test_data();
        let criteria = FilterCriteria::permissive().with_age_range(30, 60);
        let once = apply_filters(&data, &criteria);
        assert!(
            once.records.iter().all(|r| criteria.matches(r)),
            "every kept row must satisfy the predicate"
        );
        let excluded = data.len() - once.len();
        let non_matching = data.records.iter().filter(|r| !criteria.matches(r)).count();
        assert_eq!(
            excluded, non_matching,
            "no row satisfying the predicate may be excluded"
        );
        let twice = apply_filters(&once, &criteria);
        assert_eq!(
            once, twice,
            "applying the same criteria twice must yield an identical result set"
        );
    }

    #[test]
    fn test_empty_gender_set_matches_nothing() {
        let data = create_test_data();
        let mut criteria = FilterCriteria::permissive();
        criteria.genders.clear();
        let filtered = apply_filters(&data, &criteria);
        assert!(
            filtered.is_empty(),
            "an empty gender selection excludes every record"
        );
    }

    #[test]
    fn test_empty_district_set_matches_everything() {
        let data = create_test_data();
        let mut criteria = FilterCriteria::permissive();
        criteria.districts = Some(HashSet::new());
        assert_eq!(
            apply_filters(&data, &criteria).len(),
            data.len(),
            "an empty district selection leaves the district unconstrained"
        );
        criteria.districts = Some(["Downtown".to_string()].into_iter().collect());
        let downtown = apply_filters(&data, &criteria);
        assert_eq!(downtown.len(), 6, "six test rows live Downtown");
    }

    #[test]
    fn test_district_filter_excludes_rows_without_district() {
        let mut data = create_test_data();
        data.records[0].district = None;
        let mut criteria = FilterCriteria::permissive();
        criteria.districts = Some(["Downtown".to_string(), "Uptown".to_string()].into_iter().collect());
        let filtered = apply_filters(&data, &criteria);
        assert_eq!(
            filtered.len(),
            9,
            "a row without a district cannot match an explicit district selection"
        );
    }

    #[test]
    fn test_count_by_sums_to_len() {
        let data = create_test_data();
        let counts = count_by(&data, |r| Some(r.gender));
        assert_eq!(counts[&Gender::Male], 5, "five Male rows");
        assert_eq!(counts[&Gender::Female], 5, "five Female rows");
        assert_eq!(
            counts.values().sum::<usize>(),
            data.len(),
            "counts must sum to the dataset length when every row is keyed"
        );
        assert!(
            !counts.contains_key(&Gender::NonBinary),
            "a category with zero rows is absent, not a zero entry"
        );
    }

    #[test]
    fn test_count_by_age_group_skips_unbinned() {
        let mut data = create_test_data();
        data.records[0].age = 15; // below the first bin boundary
        let counts = count_by(&data, |r| r.age_group());
        assert_eq!(
            counts.values().sum::<usize>(),
            9,
            "a row whose key accessor yields None is skipped"
        );
    }

    #[test]
    fn test_mean_by_groups() {
        let data = create_test_data();
        let means = mean_by(
            &data,
            |r| Some(r.mode_of_transport),
            |r| r.carbon_footprint_kg_co2,
        );
        assert_eq!(
            means[&TransportMode::Car], 12.0,
            "the Car group mean is the mean of 10..14"
        );
        assert_eq!(means[&TransportMode::Ev], 4.0, "the EV group mean is constant 4");
        assert!(
            !means.contains_key(&TransportMode::Walk),
            "a group with zero matching rows is omitted"
        );
    }

    #[test]
    fn test_mean_by_on_empty_dataset() {
        let data = create_test_data();
        let mut criteria = FilterCriteria::permissive();
        criteria.genders.clear();
        let empty = apply_filters(&data, &criteria);
        let means = mean_by(&empty, |r| Some(r.gender), |r| r.sleep_hours);
        assert!(
            means.is_empty(),
            "an empty filtered dataset yields an empty mapping, never a NaN entry"
        );
        let counts = count_by(&empty, |r| Some(r.gender));
        assert!(counts.is_empty(), "counts over an empty dataset are empty too");
    }

    #[test]
    fn test_mean_by_age_group() {
        let data = create_test_data();
        let means = mean_by(&data, |r| r.age_group(), |r| r.recycling_rate);
        assert_eq!(
            means[&AgeGroup::From18To24], 65.0,
            "ages 20 and 22 share the 18-24 bin, averaging 60 and 70"
        );
    }
}
