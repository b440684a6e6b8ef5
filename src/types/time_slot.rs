// src/types/time_slot.rs

use chrono::{DateTime, Datelike, TimeZone, Timelike, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::MapError;

/// Day-of-week and hour selected on the dashboard.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct TimeSlot {
    pub weekday: Weekday,
    pub hour: u32,
}

impl TimeSlot {
    pub fn new(weekday: Weekday, hour: u32) -> Result<Self, MapError> {
        if hour > 23 {
            return Err(MapError::InvalidConfig(format!(
                "Hour must be between 0 and 23, got {}",
                hour
            )));
        }
        Ok(TimeSlot { weekday, hour })
    }

    /// The slot containing `instant`, truncated to the hour.
    pub fn from_datetime<Tz: TimeZone>(instant: &DateTime<Tz>) -> Self {
        TimeSlot {
            weekday: instant.weekday(),
            hour: instant.hour(),
        }
    }

    /// 0 for Monday through 6 for Sunday.
    pub fn day_index(&self) -> u32 {
        self.weekday.num_days_from_monday()
    }

    /// Every selectable slot of a week, Monday 00:00 first.
    pub fn all() -> impl Iterator<Item = TimeSlot> {
        std::iter::successors(Some(Weekday::Mon), |d| Some(d.succ()))
            .take(7)
            .flat_map(|weekday| (0..24).map(move |hour| TimeSlot { weekday, hour }))
    }
}

impl std::fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {:02}:00", self.weekday, self.hour)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_from_datetime_truncates_to_hour() {
        // 2024-03-15 is a Friday.
        let instant = Utc.with_ymd_and_hms(2024, 3, 15, 19, 47, 12).unwrap();
        let slot = TimeSlot::from_datetime(&instant);
        assert_eq!(slot.weekday, Weekday::Fri);
        assert_eq!(slot.hour, 19);
        assert_eq!(slot.day_index(), 4);
        assert_eq!(slot.to_string(), "Fri 19:00");
    }

    #[test]
    fn test_new_rejects_bad_hour() {
        assert!(TimeSlot::new(Weekday::Mon, 23).is_ok());
        assert!(TimeSlot::new(Weekday::Mon, 24).is_err());
    }

    #[test]
    fn test_all_slots() {
        let slots: Vec<TimeSlot> = TimeSlot::all().collect();
        assert_eq!(slots.len(), 7 * 24);
        assert_eq!(slots[0], TimeSlot::new(Weekday::Mon, 0).unwrap());
        assert_eq!(slots[167], TimeSlot::new(Weekday::Sun, 23).unwrap());
    }
}
