//! # pickup-engine
//!
//! Recurring pickup scheduling for a property waste-pickup valet service.
//!
//! A [`ScheduleRequest`] names a target (an apartment, a building, a floor, or a
//! whole complex), a date range, a daily time window, and a recurrence rule.
//! The engine validates it, expands the rule into concrete dates, and writes
//! the result as one recurring group: a parent record plus children that point
//! at it. A second, much smaller generator turns a building layout into
//! apartment unit labels.
//!
//! ## Modules
//!
//! - [`target`]: request target → validated scope (foreign keys)
//! - [`recurrence`]: date range + rule → ordered occurrence dates
//! - [`materializer`]: occurrences → parent/child records, persisted in order
//! - [`bulk`]: building spec → unit labels, and bulk creation
//! - [`record`]: persisted records and the pickup status lifecycle
//! - [`session`]: roles, property assignments, capabilities
//! - [`store`]: persistence traits and an in-memory store
//! - [`analytics`]: monthly activity, status counts, completion rate
//! - [`legacy`]: import adapter for old single-date schedules
//! - [`policy`]: configurable pickup hours and limits
//! - [`error`]: Error types

pub mod analytics;
pub mod bulk;
pub mod clock;
pub mod error;
pub mod ids;
pub mod legacy;
pub mod materializer;
pub mod policy;
pub mod record;
pub mod recurrence;
pub mod request;
pub mod session;
pub mod store;
pub mod target;
pub mod weekday;

pub use analytics::{summarize, MonthBucket, ScheduleSummary, StatusCount};
pub use bulk::{
    create_units, generate_labels, generate_units, preview, BuildingTemplate, BulkApartmentSpec,
    BulkOutcome, GeneratedUnit,
};
pub use error::{
    BulkError, PersistenceError, ScheduleError, StoreError, TransitionError, ValidationError,
};
pub use ids::{ApartmentId, ComplexId, ScheduleId, UserId};
pub use materializer::{materialize, plan, MaterializedGroup, SchedulePlan};
pub use policy::SchedulingPolicy;
pub use record::{
    CompletionDetails, NewScheduleRecord, ScheduleRecord, ScheduleStatus, ServiceReport,
};
pub use recurrence::{expand_dates, expand_request, Occurrence, RecurrenceType};
pub use request::{ScheduleRequest, TimeWindow};
pub use session::{Capability, CapabilitySet, PropertyAssignment, Role, Session};
pub use store::{MemoryStore, ScheduleStore, UnitStore};
pub use target::{resolve, TargetDescriptor, TargetScope, TargetType};
pub use weekday::WeekdaySet;
