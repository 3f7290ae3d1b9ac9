//! Day-of-week sets for recurring pickups.
//!
//! Days are numbered 0 (Sunday) through 6 (Saturday), the same numbering the
//! dashboard stores in `recurrence_days`.

use std::fmt;

use chrono::Weekday;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// A set of weekdays, stored as a 7-bit mask.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "Vec<u8>", into = "Vec<u8>")]
pub struct WeekdaySet(u8);

impl WeekdaySet {
    pub const EMPTY: WeekdaySet = WeekdaySet(0);
    /// Every day of the week.
    pub const ALL: WeekdaySet = WeekdaySet(0b0111_1111);
    /// Monday through Friday.
    pub const WEEKDAYS: WeekdaySet = WeekdaySet(0b0011_1110);
    /// Sunday through Thursday.
    pub const SUN_THURS: WeekdaySet = WeekdaySet(0b0001_1111);
    /// Saturday and Sunday.
    pub const WEEKENDS: WeekdaySet = WeekdaySet(0b0100_0001);

    /// Build a set from day indices, rejecting anything outside `0..=6`.
    pub fn from_indices<I>(days: I) -> Result<Self, ValidationError>
    where
        I: IntoIterator<Item = u8>,
    {
        let mut set = WeekdaySet::EMPTY;
        for day in days {
            if day > 6 {
                return Err(ValidationError::WeekdayOutOfRange(day));
            }
            set.0 |= 1 << day;
        }
        Ok(set)
    }

    /// Look up a named preset: `weekdays`, `sun-thurs`, or `weekends`.
    pub fn preset(name: &str) -> Option<Self> {
        match name {
            "weekdays" => Some(WeekdaySet::WEEKDAYS),
            "sun-thurs" => Some(WeekdaySet::SUN_THURS),
            "weekends" => Some(WeekdaySet::WEEKENDS),
            _ => None,
        }
    }

    pub fn contains(self, day: Weekday) -> bool {
        self.0 & bit(day) != 0
    }

    pub fn insert(&mut self, day: Weekday) {
        self.0 |= bit(day);
    }

    pub fn remove(&mut self, day: Weekday) {
        self.0 &= !bit(day);
    }

    /// Flip membership of `day`, as the dashboard's day buttons do.
    pub fn toggle(&mut self, day: Weekday) {
        self.0 ^= bit(day);
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Day indices in ascending order.
    pub fn indices(self) -> impl Iterator<Item = u8> {
        (0u8..7).filter(move |i| self.0 & (1 << i) != 0)
    }
}

fn bit(day: Weekday) -> u8 {
    1 << day.num_days_from_sunday()
}

impl FromIterator<Weekday> for WeekdaySet {
    fn from_iter<T: IntoIterator<Item = Weekday>>(iter: T) -> Self {
        let mut set = WeekdaySet::EMPTY;
        for day in iter {
            set.insert(day);
        }
        set
    }
}

impl TryFrom<Vec<u8>> for WeekdaySet {
    type Error = ValidationError;

    fn try_from(days: Vec<u8>) -> Result<Self, Self::Error> {
        WeekdaySet::from_indices(days)
    }
}

impl From<WeekdaySet> for Vec<u8> {
    fn from(set: WeekdaySet) -> Self {
        set.indices().collect()
    }
}

impl fmt::Debug for WeekdaySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.indices()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_match_dashboard_buttons() {
        assert_eq!(WeekdaySet::WEEKDAYS.indices().collect::<Vec<_>>(), [1, 2, 3, 4, 5]);
        assert_eq!(WeekdaySet::SUN_THURS.indices().collect::<Vec<_>>(), [0, 1, 2, 3, 4]);
        assert_eq!(WeekdaySet::WEEKENDS.indices().collect::<Vec<_>>(), [0, 6]);
        assert_eq!(WeekdaySet::preset("weekends"), Some(WeekdaySet::WEEKENDS));
        assert_eq!(WeekdaySet::preset("fortnightly"), None);
    }

    #[test]
    fn rejects_out_of_range_index() {
        assert_eq!(
            WeekdaySet::from_indices([1, 7]),
            Err(ValidationError::WeekdayOutOfRange(7))
        );
    }

    #[test]
    fn sunday_is_zero() {
        let set = WeekdaySet::from_indices([0]).unwrap();
        assert!(set.contains(Weekday::Sun));
        assert!(!set.contains(Weekday::Mon));
    }

    #[test]
    fn toggle_adds_then_removes() {
        let mut set = WeekdaySet::EMPTY;
        set.toggle(Weekday::Wed);
        assert!(set.contains(Weekday::Wed));
        set.toggle(Weekday::Wed);
        assert!(set.is_empty());
    }

    #[test]
    fn serializes_as_sorted_indices() {
        let set: WeekdaySet = [Weekday::Fri, Weekday::Mon, Weekday::Wed].into_iter().collect();
        assert_eq!(serde_json::to_string(&set).unwrap(), "[1,3,5]");

        let back: WeekdaySet = serde_json::from_str("[5,3,1,3]").unwrap();
        assert_eq!(back, set);
        assert_eq!(back.len(), 3);

        assert!(serde_json::from_str::<WeekdaySet>("[9]").is_err());
    }
}
