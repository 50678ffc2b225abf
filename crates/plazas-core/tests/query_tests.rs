//! Integration tests for filtering, paging and aggregation
//!
//! Property tests run against one store built from the sample dataset; each
//! generated filter is checked for count/page agreement, page coverage and
//! preset equivalence.

#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::{sample_rows, Dataset, RowFixture};
use plazas_core::query::TOP_PER_SPECIALTY;
use plazas_core::{
    ensure_store, query_page, query_summary, query_top_n, Column, FilterSpec, GroupCount,
    NumericRange, OrderPreset, PlacementRecord, Store, YearFilter,
};
use proptest::prelude::*;
use proptest::test_runner::{Config, TestRunner};
use std::num::NonZeroU32;

fn size(n: u32) -> NonZeroU32 {
    NonZeroU32::new(n).unwrap()
}

fn sample_store() -> (Dataset, Store) {
    let dataset = Dataset::new(&sample_rows());
    let store = ensure_store(dataset.source(), &dataset.store()).unwrap();
    (dataset, store)
}

fn everything(store: &Store, spec: &FilterSpec) -> Vec<PlacementRecord> {
    query_page(store, spec, size(10_000), 1).unwrap().rows
}

fn order_values(rows: &[PlacementRecord]) -> Vec<Option<i64>> {
    rows.iter().map(|row| row.last_year_order_max).collect()
}

// ============================================================================
// Examples
// ============================================================================

#[test]
fn test_single_row_round_trip() {
    let dataset = Dataset::new(&[RowFixture::new("CARDIO")
        .with_location("MADRID", "MADRID", "MADRID")
        .with_center("H. X")
        .with_places(10)
        .with_year(2025)
        .with_order_max(1234)]);
    let store = ensure_store(dataset.source(), &dataset.store()).unwrap();

    let spec = FilterSpec {
        specialties: vec!["CARDIO".to_string()],
        year: YearFilter::Exact(2025),
        ..Default::default()
    };
    let page = query_page(&store, &spec, size(200), 1).unwrap();
    assert_eq!(page.total_count(), 1);
    assert_eq!(page.total_pages(), 1);
    assert_eq!(page.rows.len(), 1);
    assert_eq!(page.rows[0].specialty.as_deref(), Some("CARDIO"));
    assert_eq!(page.rows[0].total_places, Some(10));
    assert_eq!(page.rows[0].last_year_order_max, Some(1234));
}

#[test]
fn test_null_ranking_sorts_last() {
    let dataset = Dataset::new(&[
        RowFixture::new("A").with_year(2025),
        RowFixture::new("B").with_year(2025).with_order_max(500),
    ]);
    let store = ensure_store(dataset.source(), &dataset.store()).unwrap();

    let rows = everything(&store, &FilterSpec::default());
    assert_eq!(order_values(&rows), vec![Some(500), None]);
}

#[test]
fn test_page_order_is_descending_with_nulls_last() {
    let (_dataset, store) = sample_store();
    let rows = everything(&store, &FilterSpec::default());
    assert_eq!(
        order_values(&rows),
        vec![
            Some(6400),
            Some(5200),
            Some(3300),
            Some(2100),
            Some(1400),
            Some(900),
            Some(450),
            None
        ]
    );
}

#[test]
fn test_empty_store_still_has_one_page() {
    let (_dataset, store) = sample_store();
    let spec = FilterSpec {
        specialties: vec!["NEUROLOGÍA".to_string()],
        ..Default::default()
    };
    let page = query_page(&store, &spec, size(200), 1).unwrap();
    assert_eq!(page.total_count(), 0);
    assert_eq!(page.total_pages(), 1);
    assert!(page.rows.is_empty());
}

#[test]
fn test_out_of_range_pages_are_empty() {
    let (_dataset, store) = sample_store();
    let spec = FilterSpec::default();

    let beyond = query_page(&store, &spec, size(3), 4).unwrap();
    assert_eq!(beyond.total_pages(), 3);
    assert!(beyond.rows.is_empty());
    assert_eq!(beyond.total_count(), 8);

    let zero = query_page(&store, &spec, size(3), 0).unwrap();
    assert!(zero.rows.is_empty());
}

#[test]
fn test_clamped_page_moves_to_nearest_valid_page() {
    let (_dataset, store) = sample_store();
    let predicate = store.predicate_for(&FilterSpec::default()).unwrap();

    let last = store.page_clamped(&predicate, size(3), 99).unwrap();
    assert_eq!(last.pagination.page, 3);
    assert_eq!(last.rows.len(), 2);
    assert_eq!(last.total_count(), 8);

    let first = store.page_clamped(&predicate, size(3), 0).unwrap();
    assert_eq!(first.pagination.page, 1);
    assert_eq!(first.rows.len(), 3);
    assert_eq!(first.rows, store.page(&predicate, size(3), 1).unwrap().rows);
}

#[test]
fn test_empty_sets_match_everything() {
    let (_dataset, store) = sample_store();
    let spec = FilterSpec {
        specialties: vec![],
        ccaas: vec![],
        provinces: vec![],
        cities: vec![],
        ..Default::default()
    };
    assert_eq!(everything(&store, &spec).len(), 8);
}

#[test]
fn test_set_membership_and_year() {
    let (_dataset, store) = sample_store();
    let spec = FilterSpec {
        ccaas: vec!["ANDALUCÍA".to_string(), "MADRID".to_string()],
        year: YearFilter::Exact(2025),
        ..Default::default()
    };
    let rows = everything(&store, &spec);
    assert_eq!(order_values(&rows), vec![Some(2100), Some(900), Some(450)]);
}

#[test]
fn test_substring_is_trimmed_and_case_insensitive() {
    let (_dataset, store) = sample_store();

    let spec = FilterSpec {
        city_text: Some("  málaga ".to_string()),
        ..Default::default()
    };
    let rows = everything(&store, &spec);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].city.as_deref(), Some("MÁLAGA"));

    let spec = FilterSpec {
        center_text: Some("h. u.".to_string()),
        ..Default::default()
    };
    assert_eq!(everything(&store, &spec).len(), 4);

    let spec = FilterSpec {
        province_text: Some("   ".to_string()),
        ..Default::default()
    };
    assert_eq!(everything(&store, &spec).len(), 8);
}

#[test]
fn test_substring_has_no_wildcards() {
    let (_dataset, store) = sample_store();
    for needle in ["%", "_", "S_VILLA"] {
        let spec = FilterSpec {
            city_text: Some(needle.to_string()),
            ..Default::default()
        };
        assert!(everything(&store, &spec).is_empty(), "needle {needle}");
    }
}

#[test]
fn test_places_range_is_inclusive() {
    let (_dataset, store) = sample_store();
    let spec = FilterSpec {
        total_places: Some(NumericRange::new(2, 4)),
        ..Default::default()
    };
    let mut places: Vec<i64> = everything(&store, &spec)
        .iter()
        .filter_map(|row| row.total_places)
        .collect();
    places.sort();
    assert_eq!(places, vec![2, 2, 4]);
}

#[test]
fn test_at_least_preset_uses_observed_max() {
    let (_dataset, store) = sample_store();
    let spec = FilterSpec {
        order_preset: OrderPreset::AtLeast5000,
        order_range: Some(NumericRange::new(0, 10)),
        ..Default::default()
    };
    assert_eq!(
        order_values(&everything(&store, &spec)),
        vec![Some(6400), Some(5200)]
    );
}

#[test]
fn test_at_least_preset_above_max_matches_nothing() {
    let dataset = Dataset::new(&[RowFixture::new("A").with_order_max(4000)]);
    let store = ensure_store(dataset.source(), &dataset.store()).unwrap();
    let spec = FilterSpec {
        order_preset: OrderPreset::AtLeast6000,
        ..Default::default()
    };
    assert!(everything(&store, &spec).is_empty());
}

#[test]
fn test_preset_on_store_without_rankings_adds_no_clause() {
    let dataset = Dataset::new(&[RowFixture::new("A"), RowFixture::new("B")]);
    let store = ensure_store(dataset.source(), &dataset.store()).unwrap();
    assert_eq!(store.order_bounds().unwrap(), None);

    let spec = FilterSpec {
        order_preset: OrderPreset::AtLeast1000,
        ..Default::default()
    };
    assert!(store.predicate_for(&spec).unwrap().is_empty());
    assert_eq!(everything(&store, &spec).len(), 2);
}

// ============================================================================
// Aggregates and facets
// ============================================================================

#[test]
fn test_top_n_orders_by_count_then_first_seen() {
    let (_dataset, store) = sample_store();
    let groups = query_top_n(&store, &FilterSpec::default(), Column::Specialty, 2).unwrap();
    assert_eq!(
        groups,
        vec![
            GroupCount {
                value: Some("CARDIOLOGÍA".to_string()),
                count: 4
            },
            GroupCount {
                value: Some("DERMATOLOGÍA".to_string()),
                count: 2
            },
        ]
    );
}

#[test]
fn test_top_n_shares_the_filter() {
    let (_dataset, store) = sample_store();
    let spec = FilterSpec {
        year: YearFilter::Exact(2024),
        ..Default::default()
    };
    let groups = query_summary(&store, &spec).unwrap();
    let total: u64 = groups.iter().map(|g| g.count).sum();
    assert_eq!(total, 2);
    assert_eq!(groups.len(), 2);
}

#[test]
fn test_top_n_groups_absent_values() {
    let dataset = Dataset::new(&[
        RowFixture::new("A"),
        RowFixture::new("B").with_location("MADRID", "MADRID", "MADRID"),
        RowFixture::new("C"),
    ]);
    let store = ensure_store(dataset.source(), &dataset.store()).unwrap();
    let groups = query_top_n(&store, &FilterSpec::default(), Column::City, 5).unwrap();
    assert_eq!(groups[0], GroupCount { value: None, count: 2 });
    assert_eq!(groups[1].value.as_deref(), Some("MADRID"));
}

#[test]
fn test_top_by_specialty_keeps_requested_order() {
    let (_dataset, store) = sample_store();
    let specialties = vec![
        "PEDIATRÍA".to_string(),
        "CARDIOLOGÍA".to_string(),
        "NEUROLOGÍA".to_string(),
    ];
    let tops = store
        .top_by_specialty(2025, &specialties, TOP_PER_SPECIALTY)
        .unwrap();

    assert_eq!(tops.len(), 3);
    assert_eq!(tops[0].specialty, "PEDIATRÍA");
    assert_eq!(order_values(&tops[0].rows), vec![Some(5200)]);
    assert_eq!(tops[1].specialty, "CARDIOLOGÍA");
    assert_eq!(
        order_values(&tops[1].rows),
        vec![Some(3300), Some(2100), Some(1400)]
    );
    assert!(!tops[2].has_data());
}

#[test]
fn test_top_by_specialty_skips_unranked_rows() {
    let (_dataset, store) = sample_store();
    let tops = store
        .top_by_specialty(2024, &["DERMATOLOGÍA".to_string()], TOP_PER_SPECIALTY)
        .unwrap();
    assert!(tops[0].rows.is_empty());
}

#[test]
fn test_facets() {
    let (_dataset, store) = sample_store();
    assert_eq!(
        store.distinct_values(Column::Specialty).unwrap(),
        vec!["CARDIOLOGÍA", "DERMATOLOGÍA", "PEDIATRÍA"]
    );
    assert!(store.distinct_values(Column::TotalPlaces).is_err());
    assert_eq!(
        store.order_bounds().unwrap(),
        Some(NumericRange::new(450, 6400))
    );
    assert_eq!(store.places_bounds().unwrap(), Some(NumericRange::new(1, 8)));
}

// ============================================================================
// Properties
// ============================================================================

fn spec_strategy() -> impl Strategy<Value = FilterSpec> {
    let specialties = prop::sample::subsequence(
        vec![
            "CARDIOLOGÍA".to_string(),
            "DERMATOLOGÍA".to_string(),
            "PEDIATRÍA".to_string(),
            "UROLOGÍA".to_string(),
        ],
        0..=3,
    );
    let ccaas = prop::sample::subsequence(
        vec![
            "ANDALUCÍA".to_string(),
            "MADRID".to_string(),
            "GALICIA".to_string(),
        ],
        0..=2,
    );
    let city_text = prop::option::of(prop::sample::select(vec![
        "sev", " MADRID ", "a", "zaragoza", "   ", "ñ",
    ]));
    let year = prop::sample::select(vec![
        YearFilter::All,
        YearFilter::Exact(2025),
        YearFilter::Exact(2024),
    ]);
    let places = prop::option::of((0i64..10, 0i64..10).prop_map(|(a, b)| {
        NumericRange::new(a.min(b), a.max(b))
    }));
    let order = prop::option::of((0i64..7000, 0i64..7000).prop_map(|(a, b)| {
        NumericRange::new(a.min(b), a.max(b))
    }));
    let preset = prop::sample::select(OrderPreset::ALL.to_vec());

    (specialties, ccaas, city_text, year, places, order, preset).prop_map(
        |(specialties, ccaas, city_text, year, total_places, order_range, order_preset)| {
            FilterSpec {
                specialties,
                ccaas,
                city_text: city_text.map(str::to_string),
                year,
                total_places,
                order_range,
                order_preset,
                ..Default::default()
            }
        },
    )
}

#[test]
fn test_count_matches_full_page_for_any_filter() {
    let (_dataset, store) = sample_store();
    let mut runner = TestRunner::new(Config::with_cases(128));
    runner
        .run(&spec_strategy(), |spec| {
            let predicate = store.predicate_for(&spec).unwrap();
            let total = store.count(&predicate).unwrap();
            let page_size = size(u32::try_from(total.max(1)).unwrap());
            let page = store.page(&predicate, page_size, 1).unwrap();
            prop_assert_eq!(page.rows.len() as u64, total);
            prop_assert_eq!(page.total_count(), total);
            Ok(())
        })
        .unwrap();
}

#[test]
fn test_pages_concatenate_to_the_filtered_set() {
    let (_dataset, store) = sample_store();
    let mut runner = TestRunner::new(Config::with_cases(128));
    runner
        .run(&(spec_strategy(), 1u32..10), |(spec, page_size)| {
            let page_size = size(page_size);
            let predicate = store.predicate_for(&spec).unwrap();
            let full = store.page(&predicate, size(10_000), 1).unwrap().rows;

            let first = store.page(&predicate, page_size, 1).unwrap();
            let mut joined = first.rows.clone();
            for page in 2..=first.total_pages() {
                let page = u32::try_from(page).unwrap();
                joined.extend(store.page(&predicate, page_size, page).unwrap().rows);
            }
            prop_assert_eq!(joined, full);
            Ok(())
        })
        .unwrap();
}

#[test]
fn test_preset_equals_its_expanded_range() {
    let (_dataset, store) = sample_store();
    let observed_max = store.order_bounds().unwrap().map(|r| r.high);
    let mut runner = TestRunner::new(Config::with_cases(128));
    runner
        .run(&spec_strategy(), |spec| {
            if spec.order_preset.is_custom() {
                return Ok(());
            }
            let explicit = FilterSpec {
                order_preset: OrderPreset::Custom,
                order_range: spec.order_preset.expand(observed_max),
                ..spec.clone()
            };
            prop_assert_eq!(everything(&store, &spec), everything(&store, &explicit));
            prop_assert_eq!(
                store.predicate_for(&spec).unwrap(),
                store.predicate_for(&explicit).unwrap()
            );
            Ok(())
        })
        .unwrap();
}

proptest! {
    #[test]
    fn test_predicate_is_deterministic(spec in spec_strategy(), max in prop::option::of(0i64..10_000)) {
        let rebuilt = spec.clone();
        prop_assert_eq!(spec.to_predicate(max).to_sql(), rebuilt.to_predicate(max).to_sql());
    }
}
