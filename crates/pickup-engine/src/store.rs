//! Persistence collaborators and an in-memory implementation.
//!
//! The backend owns durable consistency. It is assumed to make each single
//! call atomic, but nothing spans two calls.

use std::future::Future;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::bulk::GeneratedUnit;
use crate::error::StoreError;
use crate::ids::{ComplexId, ScheduleId};
use crate::record::{NewScheduleRecord, ScheduleRecord};

/// Where schedule rows are written.
pub trait ScheduleStore {
    /// Insert one row and return the id the backend assigned to it.
    fn insert_one(
        &self,
        record: NewScheduleRecord,
    ) -> impl Future<Output = Result<ScheduleId, StoreError>> + Send;

    /// Insert a batch of rows atomically.
    fn insert_many(
        &self,
        records: Vec<NewScheduleRecord>,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;
}

/// Where generated apartments are written.
pub trait UnitStore {
    /// Insert the units into `complex_id` and return how many rows were created.
    fn insert_units(
        &self,
        complex_id: ComplexId,
        units: Vec<GeneratedUnit>,
    ) -> impl Future<Output = Result<u64, StoreError>> + Send;
}

/// An apartment row held by [`MemoryStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredUnit {
    pub complex_id: ComplexId,
    pub unit: GeneratedUnit,
}

#[derive(Debug, Default)]
struct Faults {
    insert_one: Option<StoreError>,
    insert_many: Option<StoreError>,
    insert_units: Option<StoreError>,
    unit_shortfall: u64,
}

/// Process-local store used by the CLI and tests.
///
/// Failures can be injected per call kind; an injected failure fires once.
#[derive(Debug, Default)]
pub struct MemoryStore {
    schedules: Mutex<Vec<ScheduleRecord>>,
    units: Mutex<Vec<StoredUnit>>,
    faults: Mutex<Faults>,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `insert_one` fail with `err`.
    pub fn fail_next_insert_one(&self, err: StoreError) {
        lock(&self.faults).insert_one = Some(err);
    }

    /// Make the next `insert_many` fail with `err`.
    pub fn fail_next_insert_many(&self, err: StoreError) {
        lock(&self.faults).insert_many = Some(err);
    }

    /// Make the next `insert_units` fail with `err`.
    pub fn fail_next_insert_units(&self, err: StoreError) {
        lock(&self.faults).insert_units = Some(err);
    }

    /// Make the next `insert_units` silently drop its last `n` rows.
    pub fn drop_next_units(&self, n: u64) {
        lock(&self.faults).unit_shortfall = n;
    }

    /// Snapshot of every stored schedule, in insertion order.
    pub fn schedules(&self) -> Vec<ScheduleRecord> {
        lock(&self.schedules).clone()
    }

    pub fn schedule(&self, id: ScheduleId) -> Option<ScheduleRecord> {
        lock(&self.schedules).iter().find(|r| r.id == id).cloned()
    }

    /// Snapshot of every stored apartment, in insertion order.
    pub fn units(&self) -> Vec<StoredUnit> {
        lock(&self.units).clone()
    }
}

impl ScheduleStore for MemoryStore {
    async fn insert_one(&self, record: NewScheduleRecord) -> Result<ScheduleId, StoreError> {
        if let Some(err) = lock(&self.faults).insert_one.take() {
            return Err(err);
        }
        let id = ScheduleId::new();
        lock(&self.schedules).push(ScheduleRecord::new(id, record));
        Ok(id)
    }

    async fn insert_many(&self, records: Vec<NewScheduleRecord>) -> Result<(), StoreError> {
        if let Some(err) = lock(&self.faults).insert_many.take() {
            return Err(err);
        }
        let mut schedules = lock(&self.schedules);
        schedules.extend(
            records
                .into_iter()
                .map(|r| ScheduleRecord::new(ScheduleId::new(), r)),
        );
        Ok(())
    }
}

impl UnitStore for MemoryStore {
    async fn insert_units(
        &self,
        complex_id: ComplexId,
        mut units: Vec<GeneratedUnit>,
    ) -> Result<u64, StoreError> {
        let shortfall = {
            let mut faults = lock(&self.faults);
            if let Some(err) = faults.insert_units.take() {
                return Err(err);
            }
            std::mem::take(&mut faults.unit_shortfall)
        };

        let keep = units.len().saturating_sub(shortfall as usize);
        units.truncate(keep);

        let created = units.len() as u64;
        lock(&self.units).extend(units.into_iter().map(|unit| StoredUnit { complex_id, unit }));
        Ok(created)
    }
}
