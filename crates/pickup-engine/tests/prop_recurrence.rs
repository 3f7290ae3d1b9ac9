//! Property-based tests for recurrence expansion and bulk generation using proptest.
//!
//! These tests verify invariants that should hold for *any* valid input, not
//! just the specific examples in `recurrence_tests.rs` and `bulk_tests.rs`.

use chrono::{Datelike, NaiveDate};
use pickup_engine::{
    expand_dates, generate_labels, BulkApartmentSpec, ComplexId, RecurrenceType, ScheduleError,
    WeekdaySet,
};
use proptest::prelude::*;

// ---------------------------------------------------------------------------
// Strategies
// ---------------------------------------------------------------------------

fn arb_recurring() -> impl Strategy<Value = RecurrenceType> {
    prop_oneof![
        Just(RecurrenceType::Daily),
        Just(RecurrenceType::Weekly),
        Just(RecurrenceType::BiWeekly),
    ]
}

fn arb_days() -> impl Strategy<Value = WeekdaySet> {
    proptest::collection::vec(0u8..=6, 0..=7)
        .prop_map(|v| WeekdaySet::from_indices(v).expect("indices are in range"))
}

/// A start date in 2023-2027 and a span of up to ~4 months.
fn arb_range() -> impl Strategy<Value = (NaiveDate, NaiveDate)> {
    (2023i32..=2027, 1u32..=12, 1u32..=28, 0i64..=120).prop_map(|(y, m, d, span)| {
        let start = NaiveDate::from_ymd_opt(y, m, d).expect("day capped at 28");
        (start, start + chrono::Duration::days(span))
    })
}

fn config() -> ProptestConfig {
    ProptestConfig {
        cases: 256,
        ..ProptestConfig::default()
    }
}

// ---------------------------------------------------------------------------
// Property 1: Output is strictly ascending (so also duplicate-free)
// ---------------------------------------------------------------------------
proptest! {
    #![proptest_config(config())]

    #[test]
    fn expansion_is_strictly_ascending(
        recurrence in arb_recurring(),
        days in arb_days(),
        (start, end) in arb_range(),
    ) {
        if let Ok(dates) = expand_dates(start, end, recurrence, days) {
            for pair in dates.windows(2) {
                prop_assert!(pair[0] < pair[1], "not ascending: {} then {}", pair[0], pair[1]);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Property 2: Every date lies in range and on a selected weekday
// ---------------------------------------------------------------------------
proptest! {
    #![proptest_config(config())]

    #[test]
    fn dates_in_range_on_selected_days(
        recurrence in arb_recurring(),
        days in arb_days(),
        (start, end) in arb_range(),
    ) {
        if let Ok(dates) = expand_dates(start, end, recurrence, days) {
            for d in &dates {
                prop_assert!(*d >= start && *d <= end, "{} outside {}..={}", d, start, end);
                let daily_all = recurrence == RecurrenceType::Daily && days.is_empty();
                prop_assert!(daily_all || days.contains(d.weekday()), "{} not a selected day", d);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Property 3: Weekly emits every selected weekday in range
// ---------------------------------------------------------------------------
proptest! {
    #![proptest_config(config())]

    #[test]
    fn weekly_is_complete(
        days in arb_days(),
        (start, end) in arb_range(),
    ) {
        let expected: Vec<NaiveDate> = start
            .iter_days()
            .take_while(|d| *d <= end)
            .filter(|d| days.contains(d.weekday()))
            .collect();

        match expand_dates(start, end, RecurrenceType::Weekly, days) {
            Ok(dates) => prop_assert_eq!(dates, expected),
            Err(ScheduleError::EmptyResult { .. }) => prop_assert!(expected.is_empty()),
            Err(other) => prop_assert!(false, "unexpected error: {}", other),
        }
    }
}

// ---------------------------------------------------------------------------
// Property 4: Bi-weekly is weekly restricted to even 7-day blocks
// ---------------------------------------------------------------------------
proptest! {
    #![proptest_config(config())]

    #[test]
    fn bi_weekly_is_subset_of_weekly(
        days in arb_days(),
        (start, end) in arb_range(),
    ) {
        if let Ok(bi) = expand_dates(start, end, RecurrenceType::BiWeekly, days) {
            let weekly = expand_dates(start, end, RecurrenceType::Weekly, days)
                .expect("weekly is a superset, so cannot be empty");
            for d in &bi {
                prop_assert!(weekly.contains(d));
                prop_assert_eq!((*d - start).num_days() / 7 % 2, 0);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Property 5: Bulk count law and idempotence
// ---------------------------------------------------------------------------
proptest! {
    #![proptest_config(config())]

    #[test]
    fn bulk_count_law(
        start_floor in -3i32..=20,
        extra_floors in 0i32..=10,
        units in 1u32..=30,
    ) {
        let spec = BulkApartmentSpec {
            complex_id: ComplexId::new(),
            building_name: "Tower".into(),
            start_floor,
            end_floor: start_floor + extra_floors,
            units_per_floor: units,
            naming_pattern: "{floor}{unit:02d}".into(),
        };

        let first = generate_labels(&spec).expect("spec is valid");
        let second = generate_labels(&spec).expect("spec is valid");

        prop_assert_eq!(
            first.len() as u64,
            (spec.end_floor - spec.start_floor + 1) as u64 * u64::from(spec.units_per_floor)
        );
        prop_assert_eq!(first.len() as u64, spec.expected_count());
        prop_assert_eq!(first, second);
    }
}
