use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::HorarioError;

const MINUTES_PER_DAY: u16 = 24 * 60;

/// Wall-clock time of day with minute precision. No date, no offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LocalTime {
    hour: u8,
    minute: u8,
}

impl LocalTime {
    /// `hour` 0–23, `minute` 0–59.
    pub fn new(hour: u8, minute: u8) -> Result<Self, HorarioError> {
        if hour > 23 || minute > 59 {
            return Err(HorarioError::InvalidTime(format!("{hour}:{minute:02}")));
        }
        Ok(Self { hour, minute })
    }

    pub fn hour(&self) -> u8 {
        self.hour
    }

    pub fn minute(&self) -> u8 {
        self.minute
    }

    /// `hour * 60 + minute`, 0–1439.
    pub fn minute_of_day(&self) -> u16 {
        self.hour as u16 * 60 + self.minute as u16
    }
}

impl fmt::Display for LocalTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

impl FromStr for LocalTime {
    type Err = HorarioError;

    /// Parses `H:MM` or `HH:MM`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || HorarioError::InvalidTime(s.to_string());
        let (h, m) = s.trim().split_once(':').ok_or_else(invalid)?;
        let digits = |part: &str, max_len: usize| {
            !part.is_empty() && part.len() <= max_len && part.bytes().all(|b| b.is_ascii_digit())
        };
        if !digits(h, 2) || m.len() != 2 || !digits(m, 2) {
            return Err(invalid());
        }
        let hour: u8 = h.parse().map_err(|_| invalid())?;
        let minute: u8 = m.parse().map_err(|_| invalid())?;
        LocalTime::new(hour, minute).map_err(|_| invalid())
    }
}

// Serialized as the same "HH:MM" text the schedule format uses.
impl Serialize for LocalTime {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for LocalTime {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text: String = Deserialize::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

/// Whether `now` falls inside the window `open..=close`, all on one day.
///
/// A window whose closing hour is before its opening hour runs past
/// midnight. Both ends are inclusive. For an overnight window, an early
/// `now` (before the closing time, and before the opening hour) counts as
/// the tail of the same entry: the day's own hours are used for the small
/// hours after midnight, not the previous day's.
pub fn is_within(open: LocalTime, close: LocalTime, now: LocalTime) -> bool {
    let open_m = open.minute_of_day();
    let now_m = now.minute_of_day();
    let mut close_m = close.minute_of_day();

    if close.hour < open.hour {
        close_m += MINUTES_PER_DAY;
    }

    if now_m >= open_m && now_m <= close_m {
        tracing::trace!(%open, %close, %now, "inside window");
        return true;
    }

    let after_midnight = close_m >= MINUTES_PER_DAY
        && now_m < close_m - MINUTES_PER_DAY
        && now.hour < open.hour;
    if after_midnight {
        tracing::trace!(%open, %close, %now, "inside overnight tail");
    }
    after_midnight
}
