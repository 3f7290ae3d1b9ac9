//! Tests for bulk apartment generation and creation.

use pickup_engine::{
    create_units, generate_labels, generate_units, BulkApartmentSpec, BulkError, Capability,
    CapabilitySet, ComplexId, MemoryStore, PropertyAssignment, Role, Session, StoreError, UserId,
};

fn spec(building: &str, start: i32, end: i32, units: u32) -> BulkApartmentSpec {
    BulkApartmentSpec {
        complex_id: ComplexId::new(),
        building_name: building.into(),
        start_floor: start,
        end_floor: end,
        units_per_floor: units,
        naming_pattern: "{floor}{unit:02d}".into(),
    }
}

fn admin() -> Session {
    Session::new(UserId::new(), Role::Admin)
}

#[test]
fn two_floors_two_units() {
    let s = spec("A", 1, 2, 2);
    let labels = generate_labels(&s).expect("valid spec");

    assert_eq!(labels, vec!["A - 101", "A - 102", "A - 201", "A - 202"]);
    assert_eq!(labels.len() as u64, s.expected_count());
    assert_eq!(s.expected_count(), 4);
}

#[test]
fn units_carry_floor_and_number() {
    let units = generate_units(&spec("Tower", 10, 10, 3)).expect("valid spec");

    assert_eq!(units.len(), 3);
    assert!(units.iter().all(|u| u.floor_number == 10 && u.building == "Tower"));
    assert_eq!(units[2].unit_number, "1003");
    assert_eq!(units[2].label(), "Tower - 1003");
}

#[test]
fn same_spec_same_labels() {
    let s = spec("C", 1, 4, 6);
    assert_eq!(generate_labels(&s).unwrap(), generate_labels(&s).unwrap());
}

#[test]
fn every_placeholder_occurrence_is_replaced() {
    let mut s = spec("D", 2, 2, 1);
    s.naming_pattern = "{floor}-{unit:02d}/{floor}".into();
    assert_eq!(generate_labels(&s).unwrap(), vec!["D - 2-01/2"]);
}

#[test]
fn blank_building_is_rejected() {
    assert!(matches!(
        generate_labels(&spec("  ", 1, 1, 1)),
        Err(BulkError::Validation(_))
    ));
}

#[test]
fn spec_reads_json_with_default_pattern() {
    let json = r#"{
        "complex_id": "0190f5a0-0000-7000-8000-000000000004",
        "building_name": "East",
        "start_floor": 1,
        "end_floor": 1,
        "units_per_floor": 2
    }"#;
    let s: BulkApartmentSpec = serde_json::from_str(json).expect("parses");
    assert_eq!(generate_labels(&s).unwrap(), vec!["East - 101", "East - 102"]);
}

// ---------------------------------------------------------------------------
// Creation through a store
// ---------------------------------------------------------------------------

#[tokio::test]
async fn create_reports_labels_and_count() {
    let store = MemoryStore::new();
    let s = spec("A", 1, 3, 4);

    let outcome = create_units(&store, &admin(), &s).await.expect("created");

    assert_eq!(outcome.count, 12);
    assert_eq!(outcome.labels.len(), 12);
    assert_eq!(store.units().len(), 12);
    assert!(store.units().iter().all(|u| u.complex_id == s.complex_id));
}

#[tokio::test]
async fn short_insert_is_a_count_mismatch() {
    let store = MemoryStore::new();
    store.drop_next_units(2);

    let err = create_units(&store, &admin(), &spec("A", 1, 2, 5))
        .await
        .unwrap_err();

    assert_eq!(
        err,
        BulkError::CountMismatch {
            expected: 10,
            created: 8
        }
    );
}

#[tokio::test]
async fn backend_rejection_is_a_store_error() {
    let store = MemoryStore::new();
    store.fail_next_insert_units(StoreError::Constraint("apartments_unit_unique".into()));

    let err = create_units(&store, &admin(), &spec("A", 1, 1, 1))
        .await
        .unwrap_err();

    assert!(matches!(err, BulkError::Store(StoreError::Constraint(_))));
    assert!(store.units().is_empty());
}

#[tokio::test]
async fn creating_needs_manage_properties() {
    let store = MemoryStore::new();
    let s = spec("A", 1, 1, 2);

    let plain = Session::new(UserId::new(), Role::EliteValet)
        .with_assignment(PropertyAssignment::complex(s.complex_id));
    assert_eq!(
        create_units(&store, &plain, &s).await.unwrap_err(),
        BulkError::Unauthorized(Capability::ManageProperties)
    );

    let manager = Session::new(UserId::new(), Role::EliteValet).with_assignment(
        PropertyAssignment::complex(s.complex_id)
            .with_capabilities(CapabilitySet::EMPTY.with(Capability::ManageProperties)),
    );
    assert_eq!(create_units(&store, &manager, &s).await.unwrap().count, 2);
}
