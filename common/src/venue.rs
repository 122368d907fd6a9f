use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::HorarioError;
use crate::schedule::{format, parse, DaySchedule, WeeklySchedule};
use crate::status::{describe_week, is_open_now, DayStatus, Now};
use crate::weekday::WeekdayKey;

/// Brasília local time, UTC−3, with no daylight saving.
pub const BRASILIA_UTC_OFFSET_MINUTES: i32 = -180;

fn default_offset() -> i32 {
    BRASILIA_UTC_OFFSET_MINUTES
}

/// The hours-related part of a venue record, as stored by the directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VenueHours {
    pub name: String,
    /// Free-text schedule as typed into the admin form.
    #[serde(default)]
    pub hours_text: String,
    #[serde(default = "default_offset")]
    pub utc_offset_minutes: i32,
}

impl VenueHours {
    pub fn new(name: impl Into<String>, hours_text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            hours_text: hours_text.into(),
            utc_offset_minutes: BRASILIA_UTC_OFFSET_MINUTES,
        }
    }

    pub fn schedule(&self) -> WeeklySchedule {
        WeeklySchedule::parse(&self.hours_text)
    }

    /// Local weekday and time at this venue for a UTC instant.
    pub fn local_now(&self, utc_time: DateTime<Utc>) -> Result<Now, HorarioError> {
        Now::from_datetime(utc_time, self.utc_offset_minutes)
    }

    /// Check if the venue is open at a specific UTC time.
    pub fn is_open_at(&self, utc_time: DateTime<Utc>) -> Result<bool, HorarioError> {
        let now = self.local_now(utc_time)?;
        Ok(is_open_now(&self.schedule(), now))
    }

    /// Check if the venue is open right now according to the system clock.
    #[cfg(feature = "std")]
    pub fn is_currently_open(&self) -> Result<bool, HorarioError> {
        self.is_open_at(chrono::Utc::now())
    }

    /// Weekly display rows with the venue's current local day flagged.
    pub fn week_at(&self, utc_time: DateTime<Utc>) -> Result<Vec<DayStatus>, HorarioError> {
        let now = self.local_now(utc_time)?;
        Ok(describe_week(&self.schedule(), now.weekday))
    }

    /// Replace one day's hours and store the canonical text.
    pub fn set_day(&mut self, day: WeekdayKey, hours: DaySchedule) {
        self.hours_text = edit_hours(&self.hours_text, [day], hours);
    }
}

/// Admin edit cycle: parse `raw`, give every day in `days` the same hours,
/// write canonical text.
///
/// Lines that didn't parse are dropped from the result.
pub fn edit_hours(
    raw: &str,
    days: impl IntoIterator<Item = WeekdayKey>,
    hours: DaySchedule,
) -> String {
    let mut schedule = parse(raw, &WeeklySchedule::new());
    for day in days {
        schedule.set(day, hours);
    }
    format(&schedule)
}
