//! Schedule requests and their validation.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::clock::{format_clock, hhmm};
use crate::error::ValidationError;
use crate::policy::SchedulingPolicy;
use crate::recurrence::RecurrenceType;
use crate::target::{resolve, TargetDescriptor, TargetScope};
use crate::weekday::WeekdaySet;

/// Start and end of a pickup on a given day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeWindow {
    #[serde(with = "hhmm")]
    pub start: NaiveTime,
    #[serde(with = "hhmm")]
    pub end: NaiveTime,
}

impl TimeWindow {
    /// Build a window, rejecting empty or inverted ranges.
    pub fn new(start: NaiveTime, end: NaiveTime) -> Result<Self, ValidationError> {
        let window = Self { start, end };
        window.check_order()?;
        Ok(window)
    }

    fn check_order(&self) -> Result<(), ValidationError> {
        if self.start >= self.end {
            return Err(ValidationError::InvertedWindow {
                start: format_clock(self.start),
                end: format_clock(self.end),
            });
        }
        Ok(())
    }

    /// Check the window is ordered and sits inside the policy's pickup hours.
    pub fn check(&self, policy: &SchedulingPolicy) -> Result<(), ValidationError> {
        self.check_order()?;
        if self.start < policy.earliest_pickup || self.end > policy.latest_pickup {
            return Err(ValidationError::WindowOutOfBounds {
                start: format_clock(self.start),
                end: format_clock(self.end),
                earliest: format_clock(policy.earliest_pickup),
                latest: format_clock(policy.latest_pickup),
            });
        }
        Ok(())
    }
}

/// A request to schedule one pickup or a recurring series of pickups.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleRequest {
    pub start_date: NaiveDate,
    /// Last day of a recurring series. Ignored for `none`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    pub time_window: TimeWindow,
    #[serde(default)]
    pub recurrence_type: RecurrenceType,
    /// Ignored for `none`.
    #[serde(default)]
    pub recurrence_days: WeekdaySet,
    pub target: TargetDescriptor,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl ScheduleRequest {
    /// A single, non-recurring pickup.
    pub fn single(date: NaiveDate, time_window: TimeWindow, target: TargetDescriptor) -> Self {
        Self {
            start_date: date,
            end_date: None,
            time_window,
            recurrence_type: RecurrenceType::None,
            recurrence_days: WeekdaySet::EMPTY,
            target,
            notes: None,
        }
    }

    /// A recurring series between `start` and `end` inclusive.
    pub fn recurring(
        start: NaiveDate,
        end: NaiveDate,
        time_window: TimeWindow,
        recurrence_type: RecurrenceType,
        recurrence_days: WeekdaySet,
        target: TargetDescriptor,
    ) -> Self {
        Self {
            start_date: start,
            end_date: Some(end),
            time_window,
            recurrence_type,
            recurrence_days,
            target,
            notes: None,
        }
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Notes with surrounding whitespace removed; blank notes become `None`.
    pub fn trimmed_notes(&self) -> Option<&str> {
        self.notes
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
    }

    /// Validate the whole request and resolve its target.
    ///
    /// Nothing is expanded or persisted when this fails.
    pub fn validate(&self, policy: &SchedulingPolicy) -> Result<TargetScope, ValidationError> {
        let scope = resolve(&self.target)?;

        self.time_window.check(policy)?;

        // The limit applies to the text as typed, padding included.
        if let Some(notes) = self.notes.as_deref() {
            let len = notes.chars().count();
            if len > policy.max_notes_len {
                return Err(ValidationError::NotesTooLong {
                    len,
                    max: policy.max_notes_len,
                });
            }
        }

        if self.recurrence_type.is_recurring() {
            let end = self.end_date.ok_or(ValidationError::MissingEndDate)?;
            if end <= self.start_date {
                return Err(ValidationError::EndNotAfterStart {
                    start: self.start_date,
                    end,
                });
            }
            if self.recurrence_days.is_empty() {
                return Err(ValidationError::NoRecurrenceDays {
                    recurrence: self.recurrence_type,
                });
            }
        }

        Ok(scope)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::ApartmentId;

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn morning() -> TimeWindow {
        TimeWindow::new(time(8, 0), time(9, 0)).unwrap()
    }

    #[test]
    fn window_must_be_ordered() {
        assert!(matches!(
            TimeWindow::new(time(9, 0), time(9, 0)),
            Err(ValidationError::InvertedWindow { .. })
        ));
    }

    #[test]
    fn window_outside_hours_is_rejected() {
        let policy = SchedulingPolicy::default();
        let early = TimeWindow::new(time(5, 30), time(7, 0)).unwrap();
        let late = TimeWindow::new(time(21, 0), time(22, 30)).unwrap();
        let edge = TimeWindow::new(time(6, 0), time(22, 0)).unwrap();

        assert!(matches!(
            early.check(&policy),
            Err(ValidationError::WindowOutOfBounds { .. })
        ));
        assert!(late.check(&policy).is_err());
        assert!(edge.check(&policy).is_ok());
    }

    #[test]
    fn recurring_needs_end_after_start() {
        let policy = SchedulingPolicy::default();
        let mut req = ScheduleRequest::recurring(
            date(2024, 3, 4),
            date(2024, 3, 4),
            morning(),
            RecurrenceType::Weekly,
            WeekdaySet::WEEKDAYS,
            TargetDescriptor::apartment(ApartmentId::new()),
        );
        assert!(matches!(
            req.validate(&policy),
            Err(ValidationError::EndNotAfterStart { .. })
        ));

        req.end_date = None;
        assert_eq!(req.validate(&policy), Err(ValidationError::MissingEndDate));
    }

    #[test]
    fn recurring_needs_days() {
        let policy = SchedulingPolicy::default();
        let req = ScheduleRequest::recurring(
            date(2024, 3, 4),
            date(2024, 3, 20),
            morning(),
            RecurrenceType::BiWeekly,
            WeekdaySet::EMPTY,
            TargetDescriptor::apartment(ApartmentId::new()),
        );
        assert_eq!(
            req.validate(&policy),
            Err(ValidationError::NoRecurrenceDays {
                recurrence: RecurrenceType::BiWeekly
            })
        );
    }

    #[test]
    fn single_ignores_days_and_end_date() {
        let policy = SchedulingPolicy::default();
        let mut req = ScheduleRequest::single(
            date(2024, 3, 4),
            morning(),
            TargetDescriptor::apartment(ApartmentId::new()),
        );
        req.end_date = Some(date(2024, 1, 1));
        assert!(req.validate(&policy).is_ok());
    }

    #[test]
    fn notes_over_limit_are_rejected() {
        let policy = SchedulingPolicy::default();
        let req = ScheduleRequest::single(
            date(2024, 3, 4),
            morning(),
            TargetDescriptor::apartment(ApartmentId::new()),
        )
        .with_notes("x".repeat(1001));
        assert_eq!(
            req.validate(&policy),
            Err(ValidationError::NotesTooLong { len: 1001, max: 1000 })
        );
    }

    #[test]
    fn padding_counts_toward_notes_limit() {
        let policy = SchedulingPolicy::default();
        let req = ScheduleRequest::single(
            date(2024, 3, 4),
            morning(),
            TargetDescriptor::apartment(ApartmentId::new()),
        )
        .with_notes(format!("  {}  ", "x".repeat(998)));
        assert_eq!(
            req.validate(&policy),
            Err(ValidationError::NotesTooLong { len: 1002, max: 1000 })
        );
        assert_eq!(req.trimmed_notes().map(str::len), Some(998));
    }

    #[test]
    fn blank_notes_are_dropped() {
        let req = ScheduleRequest::single(
            date(2024, 3, 4),
            morning(),
            TargetDescriptor::apartment(ApartmentId::new()),
        )
        .with_notes("   ");
        assert_eq!(req.trimmed_notes(), None);
    }

    #[test]
    fn parses_dashboard_json() {
        let json = r#"{
            "start_date": "2024-01-01",
            "end_date": "2024-01-31",
            "time_window": {"start": "07:00", "end": "08:30"},
            "recurrence_type": "bi-weekly",
            "recurrence_days": [1, 4],
            "target": {"type": "apartment", "apartment_id": "0190f5a0-0000-7000-8000-000000000002"}
        }"#;
        let req: ScheduleRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.recurrence_type, RecurrenceType::BiWeekly);
        assert_eq!(req.recurrence_days.len(), 2);
        assert_eq!(req.time_window.end, time(8, 30));
        assert!(req.validate(&SchedulingPolicy::default()).is_ok());
    }
}
