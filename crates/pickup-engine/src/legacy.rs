//! Import adapter for schedules stored in the old single-date shape.
//!
//! Older rows carry only `scheduled_date` and `scheduled_time` against one
//! apartment. They are converted once into a canonical, non-recurring
//! [`ScheduleRequest`]; nothing else reads the old shape.

use chrono::{Duration, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::clock::hhmm;
use crate::error::ValidationError;
use crate::ids::{ApartmentId, ComplexId};
use crate::policy::SchedulingPolicy;
use crate::request::{ScheduleRequest, TimeWindow};
use crate::target::TargetDescriptor;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacySchedule {
    pub apartment_id: ApartmentId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub complex_id: Option<ComplexId>,
    pub scheduled_date: NaiveDate,
    #[serde(with = "hhmm")]
    pub scheduled_time: NaiveTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl LegacySchedule {
    /// Convert to a single-pickup request whose window starts at
    /// `scheduled_time` and lasts `policy.legacy_duration_minutes`, cut off at
    /// the latest allowed pickup time.
    pub fn into_request(
        self,
        policy: &SchedulingPolicy,
    ) -> Result<ScheduleRequest, ValidationError> {
        let duration = Duration::minutes(i64::from(policy.legacy_duration_minutes));
        let (end, wrapped) = self.scheduled_time.overflowing_add_signed(duration);
        let end = if wrapped != 0 {
            policy.latest_pickup
        } else {
            end.min(policy.latest_pickup)
        };
        let window = TimeWindow::new(self.scheduled_time, end)?;

        let mut target = TargetDescriptor::apartment(self.apartment_id);
        target.complex_id = self.complex_id;

        let mut request = ScheduleRequest::single(self.scheduled_date, window, target);
        request.notes = self.notes;
        Ok(request)
    }
}
