//! Bulk apartment generation -- expands a building spec into unit labels.
//!
//! Floors run `start_floor..=end_floor`, units `1..=units_per_floor`. Each unit
//! number is the naming pattern with `{floor}` replaced by the floor number and
//! `{unit:02d}` by the zero-padded unit index; its label is
//! `"{building} - {unit number}"`.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{BulkError, ValidationError};
use crate::ids::ComplexId;
use crate::session::{Capability, Session};
use crate::store::UnitStore;
use crate::target::TargetScope;

pub const DEFAULT_NAMING_PATTERN: &str = "{floor}{unit:02d}";

/// How many labels the dashboard preview shows.
pub const PREVIEW_LIMIT: usize = 10;

const FLOOR_PLACEHOLDER: &str = "{floor}";
const UNIT_PLACEHOLDER: &str = "{unit:02d}";

fn default_naming_pattern() -> String {
    DEFAULT_NAMING_PATTERN.to_string()
}

/// Input for generating a building's worth of apartments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkApartmentSpec {
    pub complex_id: ComplexId,
    pub building_name: String,
    pub start_floor: i32,
    pub end_floor: i32,
    pub units_per_floor: u32,
    #[serde(default = "default_naming_pattern")]
    pub naming_pattern: String,
}

impl BulkApartmentSpec {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.building_name.trim().is_empty() {
            return Err(ValidationError::EmptyBuildingName);
        }
        if self.start_floor > self.end_floor {
            return Err(ValidationError::InvalidFloorRange {
                start: self.start_floor,
                end: self.end_floor,
            });
        }
        if self.units_per_floor == 0 {
            return Err(ValidationError::NoUnitsPerFloor);
        }
        if self.naming_pattern.trim().is_empty() {
            return Err(ValidationError::EmptyNamingPattern);
        }
        Ok(())
    }

    /// `(end_floor - start_floor + 1) * units_per_floor`.
    pub fn expected_count(&self) -> u64 {
        let floors = (i64::from(self.end_floor) - i64::from(self.start_floor) + 1).max(0);
        floors as u64 * u64::from(self.units_per_floor)
    }

    /// Unit number for one floor/unit position.
    pub fn unit_number(&self, floor: i32, unit: u32) -> String {
        self.naming_pattern
            .replace(FLOOR_PLACEHOLDER, &floor.to_string())
            .replace(UNIT_PLACEHOLDER, &format!("{:02}", unit))
    }
}

/// A reusable building layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildingTemplate {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub floors_count: u32,
    pub units_per_floor: u32,
    #[serde(default = "default_naming_pattern")]
    pub naming_pattern: String,
}

impl BuildingTemplate {
    /// A spec covering floors `1..=floors_count` of `building_name`.
    pub fn apply(
        &self,
        complex_id: ComplexId,
        building_name: impl Into<String>,
    ) -> BulkApartmentSpec {
        BulkApartmentSpec {
            complex_id,
            building_name: building_name.into(),
            start_floor: 1,
            end_floor: i32::try_from(self.floors_count).unwrap_or(i32::MAX),
            units_per_floor: self.units_per_floor,
            naming_pattern: self.naming_pattern.clone(),
        }
    }
}

/// One generated apartment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedUnit {
    pub building: String,
    pub floor_number: i32,
    pub unit_number: String,
}

impl GeneratedUnit {
    pub fn label(&self) -> String {
        format!("{} - {}", self.building, self.unit_number)
    }
}

/// Result of a bulk creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkOutcome {
    pub labels: Vec<String>,
    pub count: u64,
}

fn units_iter(spec: &BulkApartmentSpec) -> impl Iterator<Item = GeneratedUnit> + '_ {
    let building = spec.building_name.trim();
    (spec.start_floor..=spec.end_floor).flat_map(move |floor| {
        (1..=spec.units_per_floor).map(move |unit| GeneratedUnit {
            building: building.to_string(),
            floor_number: floor,
            unit_number: spec.unit_number(floor, unit),
        })
    })
}

/// Generate every unit in floor-major order.
pub fn generate_units(spec: &BulkApartmentSpec) -> Result<Vec<GeneratedUnit>, BulkError> {
    spec.validate()?;
    Ok(units_iter(spec).collect())
}

/// Generate every unit's label, e.g. `"A - 101"`.
pub fn generate_labels(spec: &BulkApartmentSpec) -> Result<Vec<String>, BulkError> {
    spec.validate()?;
    Ok(units_iter(spec).map(|u| u.label()).collect())
}

/// The first `limit` labels drawn from at most the first two floors.
pub fn preview(spec: &BulkApartmentSpec, limit: usize) -> Result<Vec<String>, BulkError> {
    spec.validate()?;
    let last_floor = spec.start_floor.saturating_add(1).min(spec.end_floor);
    Ok(units_iter(spec)
        .take_while(|u| u.floor_number <= last_floor)
        .take(limit)
        .map(|u| u.label())
        .collect())
}

/// Generate and persist a building's apartments on behalf of `session`.
///
/// # Errors
/// - `BulkError::Validation` -- nothing was written.
/// - `BulkError::Unauthorized` -- the session cannot manage this complex.
/// - `BulkError::Store` -- the backend rejected the insert.
/// - `BulkError::CountMismatch` -- the backend created a different number of rows.
pub async fn create_units<S: UnitStore>(
    store: &S,
    session: &Session,
    spec: &BulkApartmentSpec,
) -> Result<BulkOutcome, BulkError> {
    let units = generate_units(spec)?;

    let scope = TargetScope::Complex {
        complex_id: spec.complex_id,
    };
    if !session.can(Capability::ManageProperties, &scope) {
        return Err(BulkError::Unauthorized(Capability::ManageProperties));
    }

    let expected = spec.expected_count();
    let labels: Vec<String> = units.iter().map(GeneratedUnit::label).collect();
    debug!(
        complex_id = %spec.complex_id,
        building = %spec.building_name.trim(),
        expected,
        "creating apartments"
    );

    let created = store.insert_units(spec.complex_id, units).await?;
    if created != expected {
        return Err(BulkError::CountMismatch { expected, created });
    }
    info!(complex_id = %spec.complex_id, created, "created apartments");

    Ok(BulkOutcome {
        labels,
        count: created,
    })
}
