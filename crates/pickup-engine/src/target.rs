//! Pickup targets: which physical scope a schedule applies to.
//!
//! A request carries a loose [`TargetDescriptor`] (the shape the dashboard form
//! submits). [`resolve`] checks that the sub-fields required by the chosen
//! target type are present and produces a [`TargetScope`], the set of foreign
//! keys every record of the group is stamped with. Building, floor, and
//! complex targets stay a single logical target; no per-unit fan-out happens
//! here.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::ids::{ApartmentId, ComplexId};

/// The kind of physical scope a pickup covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetType {
    Apartment,
    Building,
    Floor,
    Complex,
}

impl TargetType {
    pub fn as_str(self) -> &'static str {
        match self {
            TargetType::Apartment => "apartment",
            TargetType::Building => "building",
            TargetType::Floor => "floor",
            TargetType::Complex => "complex",
        }
    }
}

impl fmt::Display for TargetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Target as submitted by a caller: a type tag plus whichever references the
/// caller filled in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetDescriptor {
    #[serde(rename = "type")]
    pub target_type: TargetType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub apartment_id: Option<ApartmentId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub complex_id: Option<ComplexId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub building: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub floor_number: Option<i32>,
}

impl TargetDescriptor {
    pub fn apartment(apartment_id: ApartmentId) -> Self {
        Self {
            target_type: TargetType::Apartment,
            apartment_id: Some(apartment_id),
            complex_id: None,
            building: None,
            floor_number: None,
        }
    }

    pub fn building(complex_id: ComplexId, building: impl Into<String>) -> Self {
        Self {
            target_type: TargetType::Building,
            apartment_id: None,
            complex_id: Some(complex_id),
            building: Some(building.into()),
            floor_number: None,
        }
    }

    pub fn floor(complex_id: ComplexId, building: impl Into<String>, floor_number: i32) -> Self {
        Self {
            target_type: TargetType::Floor,
            apartment_id: None,
            complex_id: Some(complex_id),
            building: Some(building.into()),
            floor_number: Some(floor_number),
        }
    }

    pub fn complex(complex_id: ComplexId) -> Self {
        Self {
            target_type: TargetType::Complex,
            apartment_id: None,
            complex_id: Some(complex_id),
            building: None,
            floor_number: None,
        }
    }

    /// Attach the complex an apartment belongs to.
    pub fn in_complex(mut self, complex_id: ComplexId) -> Self {
        self.complex_id = Some(complex_id);
        self
    }
}

/// A validated target, carrying exactly the keys its type needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "target_type", rename_all = "snake_case")]
pub enum TargetScope {
    Apartment {
        apartment_id: ApartmentId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        complex_id: Option<ComplexId>,
    },
    Building {
        complex_id: ComplexId,
        building: String,
    },
    Floor {
        complex_id: ComplexId,
        building: String,
        floor_number: i32,
    },
    Complex {
        complex_id: ComplexId,
    },
}

impl TargetScope {
    pub fn target_type(&self) -> TargetType {
        match self {
            TargetScope::Apartment { .. } => TargetType::Apartment,
            TargetScope::Building { .. } => TargetType::Building,
            TargetScope::Floor { .. } => TargetType::Floor,
            TargetScope::Complex { .. } => TargetType::Complex,
        }
    }

    pub fn apartment_id(&self) -> Option<ApartmentId> {
        match self {
            TargetScope::Apartment { apartment_id, .. } => Some(*apartment_id),
            _ => None,
        }
    }

    /// The complex this target lives in, when known.
    pub fn complex_id(&self) -> Option<ComplexId> {
        match self {
            TargetScope::Apartment { complex_id, .. } => *complex_id,
            TargetScope::Building { complex_id, .. }
            | TargetScope::Floor { complex_id, .. }
            | TargetScope::Complex { complex_id } => Some(*complex_id),
        }
    }

    pub fn building(&self) -> Option<&str> {
        match self {
            TargetScope::Building { building, .. } | TargetScope::Floor { building, .. } => {
                Some(building)
            }
            _ => None,
        }
    }

    pub fn floor_number(&self) -> Option<i32> {
        match self {
            TargetScope::Floor { floor_number, .. } => Some(*floor_number),
            _ => None,
        }
    }
}

/// Resolve a descriptor into a scope, failing if a required sub-field is
/// missing for the chosen target type.
pub fn resolve(target: &TargetDescriptor) -> Result<TargetScope, ValidationError> {
    let kind = target.target_type;
    let missing = |field: &'static str| ValidationError::MissingTargetField {
        target: kind,
        field,
    };

    // Blank building names count as missing.
    let building = target
        .building
        .as_deref()
        .map(str::trim)
        .filter(|b| !b.is_empty());

    let scope = match kind {
        TargetType::Apartment => TargetScope::Apartment {
            apartment_id: target.apartment_id.ok_or_else(|| missing("apartment_id"))?,
            complex_id: target.complex_id,
        },
        TargetType::Building => TargetScope::Building {
            complex_id: target.complex_id.ok_or_else(|| missing("complex_id"))?,
            building: building.ok_or_else(|| missing("building"))?.to_string(),
        },
        TargetType::Floor => TargetScope::Floor {
            complex_id: target.complex_id.ok_or_else(|| missing("complex_id"))?,
            building: building.ok_or_else(|| missing("building"))?.to_string(),
            floor_number: target.floor_number.ok_or_else(|| missing("floor_number"))?,
        },
        TargetType::Complex => TargetScope::Complex {
            complex_id: target.complex_id.ok_or_else(|| missing("complex_id"))?,
        },
    };

    Ok(scope)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apartment_resolves_to_single_unit() {
        let id = ApartmentId::new();
        let scope = resolve(&TargetDescriptor::apartment(id)).unwrap();
        assert_eq!(scope.target_type(), TargetType::Apartment);
        assert_eq!(scope.apartment_id(), Some(id));
        assert_eq!(scope.complex_id(), None);
    }

    #[test]
    fn floor_without_number_is_rejected() {
        let mut target = TargetDescriptor::floor(ComplexId::new(), "B", 3);
        target.floor_number = None;
        assert_eq!(
            resolve(&target),
            Err(ValidationError::MissingTargetField {
                target: TargetType::Floor,
                field: "floor_number",
            })
        );
    }

    #[test]
    fn blank_building_is_missing() {
        let target = TargetDescriptor::building(ComplexId::new(), "   ");
        assert!(matches!(
            resolve(&target),
            Err(ValidationError::MissingTargetField { field: "building", .. })
        ));
    }

    #[test]
    fn building_name_is_trimmed() {
        let complex = ComplexId::new();
        let scope = resolve(&TargetDescriptor::building(complex, " North ")).unwrap();
        assert_eq!(scope.building(), Some("North"));
        assert_eq!(scope.complex_id(), Some(complex));
    }

    #[test]
    fn complex_ignores_extra_fields() {
        let complex = ComplexId::new();
        let mut target = TargetDescriptor::complex(complex);
        target.floor_number = Some(4);
        let scope = resolve(&target).unwrap();
        assert_eq!(scope, TargetScope::Complex { complex_id: complex });
        assert_eq!(scope.floor_number(), None);
    }

    #[test]
    fn descriptor_reads_dashboard_json() {
        let json = r#"{"type":"complex","complex_id":"0190f5a0-0000-7000-8000-000000000001"}"#;
        let target: TargetDescriptor = serde_json::from_str(json).unwrap();
        assert_eq!(target.target_type, TargetType::Complex);
        assert!(resolve(&target).is_ok());
    }
}
