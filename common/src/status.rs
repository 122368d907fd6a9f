use chrono::{DateTime, Datelike, FixedOffset, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::error::HorarioError;
use crate::schedule::{WeeklySchedule, CLOSED_MARKER};
use crate::time_window::{is_within, LocalTime};
use crate::weekday::WeekdayKey;

/// A local weekday and time of day, already resolved by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Now {
    pub weekday: WeekdayKey,
    pub time: LocalTime,
}

impl Now {
    pub fn new(weekday: WeekdayKey, time: LocalTime) -> Self {
        Self { weekday, time }
    }

    /// Local weekday and time for a UTC instant at a fixed offset
    /// (e.g. -180 for Brasília).
    pub fn from_datetime(
        utc_time: DateTime<Utc>,
        utc_offset_minutes: i32,
    ) -> Result<Self, HorarioError> {
        let offset = utc_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .ok_or(HorarioError::InvalidOffset(utc_offset_minutes))?;
        let local = utc_time.with_timezone(&offset);
        // chrono guarantees hour < 24 and minute < 60.
        let time = LocalTime::new(local.hour() as u8, local.minute() as u8)?;
        Ok(Self::new(local.weekday().into(), time))
    }
}

/// Whether the venue is open at `now`.
///
/// Only today's entry is consulted. A closed or unspecified day is never
/// open, even if yesterday's hours ran past midnight.
pub fn is_open_now(schedule: &WeeklySchedule, now: Now) -> bool {
    match schedule.get(now.weekday).hours() {
        Some((open, close)) => is_within(open, close, now.time),
        None => false,
    }
}

/// [`is_open_now`] straight from schedule text, with no defaults.
pub fn is_open_now_text(raw: &str, now: Now) -> bool {
    is_open_now(&WeeklySchedule::parse(raw), now)
}

/// One row of the weekly display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayStatus {
    pub weekday: WeekdayKey,
    pub day_name: String,
    pub display_text: String,
    pub is_today: bool,
}

/// Seven display rows, Monday first, with `today` flagged.
///
/// Closed days and days without hours both read `FECHADO`.
pub fn describe_week(schedule: &WeeklySchedule, today: WeekdayKey) -> Vec<DayStatus> {
    WeekdayKey::BUSINESS_ORDER
        .iter()
        .map(|&day| {
            let display_text = match schedule.get(day).hours() {
                Some((open, close)) => format!("{open} - {close}"),
                None => CLOSED_MARKER.to_string(),
            };
            DayStatus {
                weekday: day,
                day_name: day.display_name().to_string(),
                display_text,
                is_today: day == today,
            }
        })
        .collect()
}
