/// End-to-end tests for the citypulse pipeline
///
/// These tests ensure that:
/// 1. Mock generation is byte-identical across runs with the same seed
/// 2. The load -> filter -> aggregate chain behaves per contract
/// 3. An empty filter result flows through every table as empty output
///
/// Run with: cargo test --test test_dashboard_e2e -- --nocapture
use citypulse::data::{Dataset, Gender, TransportMode};
use citypulse::filter::{apply_filters, count_by, FilterCriteria};
use citypulse::param::Param;
use citypulse::{run, Session};
use sha2::{Digest, Sha256};

fn content_hash(dataset: &Dataset) -> String {
    let serialized = bincode::serialize(dataset).unwrap();
    let mut hasher = Sha256::new();
    hasher.update(serialized);
    format!("{:x}", hasher.finalize())
}

#[test]
fn test_mock_generation_is_byte_identical() {
    let a = Dataset::generate_mock(300, 42);
    let b = Dataset::generate_mock(300, 42);
    assert_eq!(
        bincode::serialize(&a).unwrap(),
        bincode::serialize(&b).unwrap(),
        "two generations from the same seed must serialize to identical bytes"
    );
    assert_eq!(
        content_hash(&a),
        content_hash(&b),
        "and therefore hash identically"
    );
    assert_ne!(
        content_hash(&a),
        content_hash(&Dataset::generate_mock(300, 7)),
        "a different seed must change the content hash"
    );
}

#[test]
fn test_filter_scenario_from_loaded_fixture() {
    let data = Dataset::load("samples/tests/citizens.csv").expect("fixture must load");
    let criteria = FilterCriteria {
        age_min: 25,
        age_max: 55,
        genders: [Gender::Male].into_iter().collect(),
        transport_modes: TransportMode::ALL.into_iter().collect(),
        districts: None,
    };
    let filtered = apply_filters(&data, &criteria);
    assert_eq!(
        filtered.len(),
        2,
        "of the five Male rows aged [20,30,40,50,60], only 30 and 40 fall in [25,55]"
    );
    let counts = count_by(&filtered, |r| Some(r.gender));
    assert_eq!(
        counts.values().sum::<usize>(),
        filtered.len(),
        "counts over the filtered view sum to its length"
    );
}

#[test]
fn test_empty_filter_yields_empty_tables_end_to_end() {
    let data = Dataset::load("samples/tests/citizens.csv").expect("fixture must load");
    let session = Session::from_dataset(data);
    // Nobody in the fixture is a 90+ year old
    let criteria = FilterCriteria::permissive().with_age_range(90, 100);
    let snapshot = session.snapshot(&criteria);

    assert_eq!(snapshot.matching_records, 0, "the age window matches nobody");
    assert_eq!(
        snapshot.metrics.avg_sleep_hours, None,
        "key metrics report no data instead of NaN"
    );
    assert!(
        snapshot.demographics.gender_counts.is_empty(),
        "gender counts are empty, not zero-filled"
    );
    assert!(
        snapshot.transport.carbon_by_mode.is_empty(),
        "carbon-by-mode is empty"
    );
    assert!(
        snapshot.lifestyle.recycling_by_age_group.is_empty(),
        "recycling-by-age-group is empty"
    );
    assert!(
        !snapshot.transport.ev_users_by_age_group.is_empty(),
        "the EV table still shows the full population's riders: it ignores the interactive filter"
    );
}

#[test]
fn test_run_over_fixture_with_configured_filters() {
    let mut param = Param::default();
    param.data.path = "samples/tests/citizens.csv".to_string();
    param.filters.age_min = 25;
    param.filters.age_max = 55;
    param.filters.genders = vec!["Male".to_string()];

    let snapshot = run(&param).expect("the configured pipeline must run");
    assert_eq!(snapshot.total_records, 10, "the fixture population has 10 rows");
    assert_eq!(
        snapshot.matching_records, 2,
        "the configured criteria reproduce the two-row scenario"
    );
    assert_eq!(
        snapshot.demographics.gender_counts,
        vec![(Gender::Male, 2)],
        "only the selected gender appears in the counts"
    );
}

#[test]
fn test_snapshot_is_deterministic_for_identical_criteria() {
    let session = Session::from_dataset(Dataset::generate_mock(300, 42));
    let criteria = FilterCriteria::permissive().with_age_range(20, 60);
    let first = session.snapshot(&criteria);
    let second = session.snapshot(&criteria);
    assert_eq!(
        (first.matching_records, &first.demographics, &first.transport, &first.lifestyle),
        (second.matching_records, &second.demographics, &second.transport, &second.lifestyle),
        "two snapshots of the same session and criteria carry identical tables"
    );
}
