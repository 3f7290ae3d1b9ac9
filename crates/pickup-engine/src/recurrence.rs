//! Recurrence expansion -- turns a date range and recurrence rule into concrete
//! pickup dates.
//!
//! Expansion is a day-by-day scan over the inclusive range, evaluating each
//! calendar day exactly once. Output is therefore strictly ascending with no
//! duplicates by construction.

use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{Result, ScheduleError, ValidationError};
use crate::request::{ScheduleRequest, TimeWindow};
use crate::weekday::WeekdaySet;

/// How a schedule repeats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RecurrenceType {
    /// A single pickup on the start date.
    #[default]
    None,
    /// Every selected weekday; an empty day set means every day.
    Daily,
    /// Every selected weekday.
    Weekly,
    /// Selected weekdays in the weeks at even 7-day offsets from the start.
    BiWeekly,
}

impl RecurrenceType {
    pub fn as_str(self) -> &'static str {
        match self {
            RecurrenceType::None => "none",
            RecurrenceType::Daily => "daily",
            RecurrenceType::Weekly => "weekly",
            RecurrenceType::BiWeekly => "bi-weekly",
        }
    }

    pub fn is_recurring(self) -> bool {
        self != RecurrenceType::None
    }
}

impl fmt::Display for RecurrenceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One concrete pickup: a date plus its time window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Occurrence {
    pub date: NaiveDate,
    pub window: TimeWindow,
}

/// Expand a recurrence rule over `[start, end]` into ordered dates.
///
/// # Arguments
/// - `start` -- first day of the range; always the only result for `None`
/// - `end` -- last day of the range, inclusive; unused for `None`
/// - `recurrence` -- which days qualify
/// - `days` -- selected weekdays (0 = Sunday)
///
/// # Errors
/// Returns `ScheduleError::EmptyResult` if no day in the range qualifies.
pub fn expand_dates(
    start: NaiveDate,
    end: NaiveDate,
    recurrence: RecurrenceType,
    days: WeekdaySet,
) -> Result<Vec<NaiveDate>> {
    if recurrence == RecurrenceType::None {
        return Ok(vec![start]);
    }

    let dates: Vec<NaiveDate> = start
        .iter_days()
        .take_while(|d| *d <= end)
        .filter(|d| qualifies(start, *d, recurrence, days))
        .collect();

    if dates.is_empty() {
        return Err(ScheduleError::EmptyResult {
            recurrence,
            start,
            end,
        });
    }

    Ok(dates)
}

fn qualifies(
    start: NaiveDate,
    day: NaiveDate,
    recurrence: RecurrenceType,
    days: WeekdaySet,
) -> bool {
    let weekday = day.weekday();
    match recurrence {
        RecurrenceType::None => day == start,
        RecurrenceType::Daily => days.is_empty() || days.contains(weekday),
        RecurrenceType::Weekly => days.contains(weekday),
        RecurrenceType::BiWeekly => {
            // `day >= start`, so integer division is the floor.
            let week_index = (day - start).num_days() / 7;
            week_index % 2 == 0 && days.contains(weekday)
        }
    }
}

/// Expand a request into its occurrences.
///
/// Only the fields expansion needs are checked here; callers persisting the
/// result should run [`ScheduleRequest::validate`] first.
///
/// # Errors
/// Returns `ValidationError::MissingEndDate` for a recurring request without an
/// end date, and `ScheduleError::EmptyResult` if nothing qualifies.
pub fn expand_request(request: &ScheduleRequest) -> Result<Vec<Occurrence>> {
    let end = match (request.recurrence_type, request.end_date) {
        (RecurrenceType::None, _) => request.start_date,
        (_, Some(end)) => end,
        (_, None) => return Err(ValidationError::MissingEndDate.into()),
    };

    let dates = expand_dates(
        request.start_date,
        end,
        request.recurrence_type,
        request.recurrence_days,
    )?;

    Ok(dates
        .into_iter()
        .map(|date| Occurrence {
            date,
            window: request.time_window,
        })
        .collect())
}
