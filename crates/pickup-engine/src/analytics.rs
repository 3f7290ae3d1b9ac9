//! Dashboard analytics over schedule records.
//!
//! Everything here is a pure function of the records passed in; fetching them
//! (and any filtering by complex or valet) is the caller's job.

use chrono::{Datelike, Months, NaiveDate};
use serde::Serialize;

use crate::record::{ScheduleRecord, ScheduleStatus};

/// Number of months shown by the activity chart, current month included.
pub const ACTIVITY_MONTHS: u32 = 6;

/// Scheduled vs completed pickups in one calendar month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthBucket {
    pub year: i32,
    pub month: u32,
    /// Short label such as `Jan 24`.
    pub label: String,
    pub scheduled: u64,
    pub completed: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusCount {
    pub status: ScheduleStatus,
    pub count: u64,
}

/// Headline numbers for the analytics page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScheduleSummary {
    pub total: u64,
    pub completed: u64,
    /// Percentage in `0.0..=100.0`; `0.0` when there are no records.
    pub completion_rate: f64,
    pub monthly: Vec<MonthBucket>,
    pub statuses: Vec<StatusCount>,
}

/// Bucket records by month of `scheduled_date` for the `months` calendar
/// months ending with the one containing `today`, oldest first.
///
/// Records outside the window are ignored. Empty months are still returned.
pub fn monthly_activity(
    records: &[ScheduleRecord],
    today: NaiveDate,
    months: u32,
) -> Vec<MonthBucket> {
    let first_of_month = today.with_day(1).unwrap_or(today);

    let mut buckets: Vec<MonthBucket> = (0..months)
        .rev()
        .filter_map(|back| first_of_month.checked_sub_months(Months::new(back)))
        .map(|month| MonthBucket {
            year: month.year(),
            month: month.month(),
            label: month.format("%b %y").to_string(),
            scheduled: 0,
            completed: 0,
        })
        .collect();

    for record in records {
        let date = record.fields.scheduled_date;
        if let Some(bucket) = buckets
            .iter_mut()
            .find(|b| b.year == date.year() && b.month == date.month())
        {
            bucket.scheduled += 1;
            if record.status() == ScheduleStatus::Completed {
                bucket.completed += 1;
            }
        }
    }

    buckets
}

/// Count records per status, in lifecycle order, skipping statuses with no
/// records.
pub fn status_distribution(records: &[ScheduleRecord]) -> Vec<StatusCount> {
    ScheduleStatus::ALL
        .iter()
        .map(|&status| StatusCount {
            status,
            count: records.iter().filter(|r| r.status() == status).count() as u64,
        })
        .filter(|c| c.count > 0)
        .collect()
}

/// Completed records as a percentage of all records.
pub fn completion_rate(records: &[ScheduleRecord]) -> f64 {
    rate(completed_count(records), records.len() as u64)
}

pub fn summarize(records: &[ScheduleRecord], today: NaiveDate) -> ScheduleSummary {
    let total = records.len() as u64;
    let completed = completed_count(records);
    ScheduleSummary {
        total,
        completed,
        completion_rate: rate(completed, total),
        monthly: monthly_activity(records, today, ACTIVITY_MONTHS),
        statuses: status_distribution(records),
    }
}

fn completed_count(records: &[ScheduleRecord]) -> u64 {
    records
        .iter()
        .filter(|r| r.status() == ScheduleStatus::Completed)
        .count() as u64
}

fn rate(completed: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    completed as f64 * 100.0 / total as f64
}
