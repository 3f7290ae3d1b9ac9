//! Pickup schedule records and their status lifecycle.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::TransitionError;
use crate::ids::{ScheduleId, UserId};
use crate::recurrence::RecurrenceType;
use crate::request::TimeWindow;
use crate::session::{Role, Session};
use crate::target::TargetScope;
use crate::weekday::WeekdaySet;

/// Where a pickup is in its lifecycle.
///
/// `scheduled -> in-progress -> completed`; `scheduled` and `in-progress` may
/// also end as `missed` or `cancelled`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScheduleStatus {
    #[default]
    Scheduled,
    InProgress,
    Completed,
    Missed,
    Cancelled,
}

impl ScheduleStatus {
    pub const ALL: [ScheduleStatus; 5] = [
        ScheduleStatus::Scheduled,
        ScheduleStatus::InProgress,
        ScheduleStatus::Completed,
        ScheduleStatus::Missed,
        ScheduleStatus::Cancelled,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ScheduleStatus::Scheduled => "scheduled",
            ScheduleStatus::InProgress => "in-progress",
            ScheduleStatus::Completed => "completed",
            ScheduleStatus::Missed => "missed",
            ScheduleStatus::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            ScheduleStatus::Completed | ScheduleStatus::Missed | ScheduleStatus::Cancelled
        )
    }

    pub fn can_transition_to(self, next: ScheduleStatus) -> bool {
        use ScheduleStatus::*;
        matches!(
            (self, next),
            (Scheduled, InProgress)
                | (Scheduled, Missed)
                | (Scheduled, Cancelled)
                | (InProgress, Completed)
                | (InProgress, Missed)
                | (InProgress, Cancelled)
        )
    }
}

impl fmt::Display for ScheduleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A schedule row ready to be inserted. The backend assigns its id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewScheduleRecord {
    #[serde(flatten)]
    pub target: TargetScope,
    pub scheduled_date: NaiveDate,
    pub time_window: TimeWindow,
    pub status: ScheduleStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_by: UserId,
    pub recurrence_type: RecurrenceType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurrence_days: Option<WeekdaySet>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurrence_end_date: Option<NaiveDate>,
    pub is_recurring_parent: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_schedule_id: Option<ScheduleId>,
}

/// A persisted schedule row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleRecord {
    pub id: ScheduleId,
    #[serde(flatten)]
    pub fields: NewScheduleRecord,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valet_notes: Option<String>,
}

/// What the valet fills in when finishing a pickup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionDetails {
    #[serde(default = "default_service_type")]
    pub service_type: String,
    #[serde(default)]
    pub items_collected: u32,
    #[serde(default)]
    pub valet_notes: Option<String>,
    #[serde(default)]
    pub customer_notes: Option<String>,
}

fn default_service_type() -> String {
    "pickup".to_string()
}

impl Default for CompletionDetails {
    fn default() -> Self {
        Self {
            service_type: default_service_type(),
            items_collected: 0,
            valet_notes: None,
            customer_notes: None,
        }
    }
}

impl CompletionDetails {
    pub fn with_items(mut self, items_collected: u32) -> Self {
        self.items_collected = items_collected;
        self
    }

    pub fn with_valet_notes(mut self, notes: impl Into<String>) -> Self {
        self.valet_notes = Some(notes.into());
        self
    }

    pub fn with_customer_notes(mut self, notes: impl Into<String>) -> Self {
        self.customer_notes = Some(notes.into());
        self
    }
}

/// Service report row written when a pickup completes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceReport {
    pub pickup_schedule_id: ScheduleId,
    pub valet_id: UserId,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub service_type: String,
    pub items_collected: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valet_notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_notes: Option<String>,
    pub status: ScheduleStatus,
}

impl ScheduleRecord {
    pub fn new(id: ScheduleId, fields: NewScheduleRecord) -> Self {
        Self {
            id,
            fields,
            started_at: None,
            completed_at: None,
            valet_notes: None,
        }
    }

    pub fn status(&self) -> ScheduleStatus {
        self.fields.status
    }

    /// Valet begins the pickup.
    pub fn start(&mut self, session: &Session, now: DateTime<Utc>) -> Result<(), TransitionError> {
        require_staff(session, "start")?;
        self.transition(ScheduleStatus::InProgress)?;
        self.started_at = Some(now);
        Ok(())
    }

    /// Valet finishes the pickup and files a service report for it.
    ///
    /// The report's `start_time` is when the pickup was started. The record
    /// keeps the valet's notes; customer notes live on the report only.
    pub fn complete(
        &mut self,
        session: &Session,
        now: DateTime<Utc>,
        details: CompletionDetails,
    ) -> Result<ServiceReport, TransitionError> {
        require_staff(session, "complete")?;
        self.transition(ScheduleStatus::Completed)?;
        self.completed_at = Some(now);

        let valet_notes = non_blank(details.valet_notes);
        self.valet_notes = valet_notes.clone();

        Ok(ServiceReport {
            pickup_schedule_id: self.id,
            valet_id: session.user_id,
            start_time: self.started_at.unwrap_or(now),
            end_time: now,
            service_type: details.service_type,
            items_collected: details.items_collected,
            valet_notes,
            customer_notes: non_blank(details.customer_notes),
            status: ScheduleStatus::Completed,
        })
    }

    pub fn mark_missed(&mut self, session: &Session) -> Result<(), TransitionError> {
        require_staff(session, "mark missed")?;
        self.transition(ScheduleStatus::Missed)
    }

    /// Only admins cancel pickups.
    pub fn cancel(&mut self, session: &Session) -> Result<(), TransitionError> {
        if !session.is_admin() {
            return Err(TransitionError::Forbidden {
                role: session.role,
                action: "cancel",
            });
        }
        self.transition(ScheduleStatus::Cancelled)
    }

    fn transition(&mut self, to: ScheduleStatus) -> Result<(), TransitionError> {
        let from = self.fields.status;
        if !from.can_transition_to(to) {
            return Err(TransitionError::Invalid { from, to });
        }
        self.fields.status = to;
        Ok(())
    }
}

fn non_blank(notes: Option<String>) -> Option<String> {
    notes.filter(|n| !n.trim().is_empty())
}

fn require_staff(session: &Session, action: &'static str) -> Result<(), TransitionError> {
    match session.role {
        Role::Admin | Role::EliteValet => Ok(()),
        role => Err(TransitionError::Forbidden { role, action }),
    }
}
