//! Error types for pickup-engine operations.
//!
//! Validation failures are always raised before any expansion or persistence
//! runs. Persistence failures record which stage failed so the caller can tell
//! a total failure (nothing written) from a partial one (orphaned parent).

use chrono::NaiveDate;
use thiserror::Error;

use crate::ids::ScheduleId;
use crate::recurrence::RecurrenceType;
use crate::record::ScheduleStatus;
use crate::session::{Capability, Role};
use crate::target::TargetType;

/// A malformed schedule request or bulk apartment spec.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{target} target requires a {field}")]
    MissingTargetField {
        target: TargetType,
        field: &'static str,
    },

    #[error("recurring schedules require an end date")]
    MissingEndDate,

    #[error("end date {end} must be after start date {start}")]
    EndNotAfterStart { start: NaiveDate, end: NaiveDate },

    #[error("{recurrence} recurrence requires at least one day of the week")]
    NoRecurrenceDays { recurrence: RecurrenceType },

    #[error("weekday {0} is out of range, expected 0 (Sunday) through 6 (Saturday)")]
    WeekdayOutOfRange(u8),

    #[error("time window {start}-{end} must end after it starts")]
    InvertedWindow { start: String, end: String },

    #[error("pickup window {start}-{end} falls outside allowed hours {earliest}-{latest}")]
    WindowOutOfBounds {
        start: String,
        end: String,
        earliest: String,
        latest: String,
    },

    #[error("notes are {len} characters long, the limit is {max}")]
    NotesTooLong { len: usize, max: usize },

    #[error("building name must not be empty")]
    EmptyBuildingName,

    #[error("start floor {start} is above end floor {end}")]
    InvalidFloorRange { start: i32, end: i32 },

    #[error("units per floor must be at least 1")]
    NoUnitsPerFloor,

    #[error("naming pattern must not be empty")]
    EmptyNamingPattern,
}

/// A failure reported by the persistence backend.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("constraint violation: {0}")]
    Constraint(String),

    #[error("backend unavailable: {0}")]
    Unavailable(String),
}

/// Which persistence stage of a schedule group failed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PersistenceError {
    /// The parent insert was rejected. Nothing was written.
    #[error("failed to create parent schedule: {source}")]
    ParentInsert { source: StoreError },

    /// The parent was written but the child batch was rejected. The parent
    /// remains in the backend without its children.
    #[error("created parent schedule {parent_id} but failed to create {pending} child schedules: {source}")]
    ChildInsert {
        parent_id: ScheduleId,
        pending: usize,
        source: StoreError,
    },
}

impl PersistenceError {
    /// True when some rows were durably written before the failure.
    pub fn is_partial(&self) -> bool {
        matches!(self, PersistenceError::ChildInsert { .. })
    }

    /// The parent left behind by a partial failure, if any.
    pub fn orphaned_parent(&self) -> Option<ScheduleId> {
        match self {
            PersistenceError::ParentInsert { .. } => None,
            PersistenceError::ChildInsert { parent_id, .. } => Some(*parent_id),
        }
    }
}

/// Errors from validating, expanding, or materializing a schedule request.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("invalid schedule request: {0}")]
    Validation(#[from] ValidationError),

    #[error("no pickups fall between {start} and {end} for {recurrence} recurrence")]
    EmptyResult {
        recurrence: RecurrenceType,
        start: NaiveDate,
        end: NaiveDate,
    },

    #[error("session is missing the {0} capability for this target")]
    Unauthorized(Capability),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

/// Errors from bulk apartment generation and creation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BulkError {
    #[error("invalid bulk apartment spec: {0}")]
    Validation(#[from] ValidationError),

    #[error("session is missing the {0} capability for this complex")]
    Unauthorized(Capability),

    #[error("failed to create apartments: {0}")]
    Store(#[from] StoreError),

    #[error("expected to create {expected} apartments but the backend created {created}")]
    CountMismatch { expected: u64, created: u64 },
}

/// Errors from moving a persisted schedule through its status lifecycle.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransitionError {
    #[error("cannot move a pickup from {from} to {to}")]
    Invalid {
        from: ScheduleStatus,
        to: ScheduleStatus,
    },

    #[error("{role} users may not {action} pickups")]
    Forbidden { role: Role, action: &'static str },
}

/// Convenience alias used throughout pickup-engine.
pub type Result<T> = std::result::Result<T, ScheduleError>;
