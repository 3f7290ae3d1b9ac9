//! Caller identity: roles, property assignments, and capabilities.
//!
//! A [`Session`] is built by whatever authenticates the caller and passed
//! explicitly to the operations that need identity. There is no process-wide
//! "current user" and no built-in bypass account.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ids::{ComplexId, UserId};
use crate::target::TargetScope;

/// A user's role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    EliteValet,
    Resident,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Role::Admin => "admin",
            Role::EliteValet => "elite_valet",
            Role::Resident => "resident",
        })
    }
}

/// Something a property assignment may allow its holder to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    ViewSchedules,
    CreateSchedules,
    ManageUsers,
    ManageProperties,
    ViewReports,
    ExportData,
}

impl Capability {
    pub const ALL: [Capability; 6] = [
        Capability::ViewSchedules,
        Capability::CreateSchedules,
        Capability::ManageUsers,
        Capability::ManageProperties,
        Capability::ViewReports,
        Capability::ExportData,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Capability::ViewSchedules => "view_schedules",
            Capability::CreateSchedules => "create_schedules",
            Capability::ManageUsers => "manage_users",
            Capability::ManageProperties => "manage_properties",
            Capability::ViewReports => "view_reports",
            Capability::ExportData => "export_data",
        }
    }

    fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fixed set of capabilities, serialized as a list of names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "Vec<Capability>", into = "Vec<Capability>")]
pub struct CapabilitySet(u8);

impl CapabilitySet {
    pub const EMPTY: CapabilitySet = CapabilitySet(0);

    pub fn all() -> Self {
        Capability::ALL.into_iter().collect()
    }

    /// What a new property assignment grants unless configured otherwise.
    pub fn assignment_default() -> Self {
        [
            Capability::ViewSchedules,
            Capability::CreateSchedules,
            Capability::ViewReports,
        ]
        .into_iter()
        .collect()
    }

    pub fn with(mut self, cap: Capability) -> Self {
        self.insert(cap);
        self
    }

    pub fn insert(&mut self, cap: Capability) {
        self.0 |= cap.bit();
    }

    pub fn remove(&mut self, cap: Capability) {
        self.0 &= !cap.bit();
    }

    pub fn contains(self, cap: Capability) -> bool {
        self.0 & cap.bit() != 0
    }

    pub fn iter(self) -> impl Iterator<Item = Capability> {
        Capability::ALL.into_iter().filter(move |c| self.contains(*c))
    }
}

impl FromIterator<Capability> for CapabilitySet {
    fn from_iter<T: IntoIterator<Item = Capability>>(iter: T) -> Self {
        let mut set = CapabilitySet::EMPTY;
        for cap in iter {
            set.insert(cap);
        }
        set
    }
}

impl From<Vec<Capability>> for CapabilitySet {
    fn from(caps: Vec<Capability>) -> Self {
        caps.into_iter().collect()
    }
}

impl From<CapabilitySet> for Vec<Capability> {
    fn from(set: CapabilitySet) -> Self {
        set.iter().collect()
    }
}

/// A user's assignment to a complex, optionally narrowed to a building or a
/// floor within it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyAssignment {
    pub complex_id: ComplexId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub building: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub floor_number: Option<i32>,
    #[serde(default = "CapabilitySet::assignment_default")]
    pub capabilities: CapabilitySet,
}

impl PropertyAssignment {
    /// Whole-complex assignment with the default capabilities.
    pub fn complex(complex_id: ComplexId) -> Self {
        Self {
            complex_id,
            building: None,
            floor_number: None,
            capabilities: CapabilitySet::assignment_default(),
        }
    }

    pub fn with_capabilities(mut self, capabilities: CapabilitySet) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// Whether `scope` lies inside this assignment.
    ///
    /// Apartment targets submitted without their complex are never covered.
    pub fn covers(&self, scope: &TargetScope) -> bool {
        if scope.complex_id() != Some(self.complex_id) {
            return false;
        }
        if let Some(building) = &self.building {
            if scope.building() != Some(building.as_str()) {
                return false;
            }
        }
        if let Some(floor) = self.floor_number {
            if scope.floor_number() != Some(floor) {
                return false;
            }
        }
        true
    }
}

/// An authenticated caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: UserId,
    pub role: Role,
    #[serde(default)]
    pub assignments: Vec<PropertyAssignment>,
}

impl Session {
    pub fn new(user_id: UserId, role: Role) -> Self {
        Self {
            user_id,
            role,
            assignments: Vec::new(),
        }
    }

    pub fn with_assignment(mut self, assignment: PropertyAssignment) -> Self {
        self.assignments.push(assignment);
        self
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Whether the caller may exercise `cap` on `scope`. Admins always may;
    /// everyone else needs an assignment that covers the scope and grants it.
    pub fn can(&self, cap: Capability, scope: &TargetScope) -> bool {
        self.is_admin()
            || self
                .assignments
                .iter()
                .any(|a| a.capabilities.contains(cap) && a.covers(scope))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::ApartmentId;

    #[test]
    fn default_assignment_capabilities() {
        let caps = CapabilitySet::assignment_default();
        assert!(caps.contains(Capability::ViewSchedules));
        assert!(caps.contains(Capability::CreateSchedules));
        assert!(caps.contains(Capability::ViewReports));
        assert!(!caps.contains(Capability::ManageUsers));
        assert!(!caps.contains(Capability::ExportData));
    }

    #[test]
    fn capability_set_serializes_as_names() {
        let caps = CapabilitySet::EMPTY
            .with(Capability::ExportData)
            .with(Capability::ViewSchedules);
        let json = serde_json::to_string(&caps).unwrap();
        assert_eq!(json, r#"["view_schedules","export_data"]"#);
        assert_eq!(serde_json::from_str::<CapabilitySet>(&json).unwrap(), caps);
        assert!(serde_json::from_str::<CapabilitySet>(r#"["fly"]"#).is_err());
    }

    #[test]
    fn admin_can_do_anything() {
        let session = Session::new(UserId::new(), Role::Admin);
        let scope = TargetScope::Apartment {
            apartment_id: ApartmentId::new(),
            complex_id: None,
        };
        assert!(session.can(Capability::ManageUsers, &scope));
    }

    #[test]
    fn building_assignment_does_not_cover_other_buildings() {
        let complex = ComplexId::new();
        let mut assignment = PropertyAssignment::complex(complex);
        assignment.building = Some("North".into());
        let session = Session::new(UserId::new(), Role::EliteValet).with_assignment(assignment);

        let north = TargetScope::Floor {
            complex_id: complex,
            building: "North".into(),
            floor_number: 2,
        };
        let south = TargetScope::Building {
            complex_id: complex,
            building: "South".into(),
        };
        let whole = TargetScope::Complex { complex_id: complex };

        assert!(session.can(Capability::CreateSchedules, &north));
        assert!(!session.can(Capability::CreateSchedules, &south));
        assert!(!session.can(Capability::CreateSchedules, &whole));
        assert!(!session.can(Capability::ManageProperties, &north));
    }

    #[test]
    fn apartment_without_complex_needs_admin() {
        let complex = ComplexId::new();
        let session = Session::new(UserId::new(), Role::Resident)
            .with_assignment(PropertyAssignment::complex(complex));
        let bare = TargetScope::Apartment {
            apartment_id: ApartmentId::new(),
            complex_id: None,
        };
        let placed = TargetScope::Apartment {
            apartment_id: ApartmentId::new(),
            complex_id: Some(complex),
        };
        assert!(!session.can(Capability::CreateSchedules, &bare));
        assert!(session.can(Capability::CreateSchedules, &placed));
    }
}
