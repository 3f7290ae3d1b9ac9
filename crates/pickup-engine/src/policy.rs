//! Scheduling policy: the configurable bounds requests are validated against.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use crate::clock::hhmm;

/// Bounds applied to every schedule request before expansion.
///
/// All fields have defaults, so a partial config file only overrides what it
/// names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulingPolicy {
    /// Earliest time a pickup window may start.
    #[serde(with = "hhmm")]
    pub earliest_pickup: NaiveTime,
    /// Latest time a pickup window may end.
    #[serde(with = "hhmm")]
    pub latest_pickup: NaiveTime,
    /// Maximum length of schedule notes, in characters.
    pub max_notes_len: usize,
    /// Window length given to legacy single-time schedules on import.
    pub legacy_duration_minutes: u32,
}

impl Default for SchedulingPolicy {
    fn default() -> Self {
        Self {
            earliest_pickup: NaiveTime::from_hms_opt(6, 0, 0).unwrap_or_default(),
            latest_pickup: NaiveTime::from_hms_opt(22, 0, 0).unwrap_or_default(),
            max_notes_len: 1000,
            legacy_duration_minutes: 60,
        }
    }
}
