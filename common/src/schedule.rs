use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::time_window::LocalTime;
use crate::weekday::{resolve_days, WeekdayKey};

/// Marker that closes the named days for the whole day.
pub const CLOSED_MARKER: &str = "FECHADO";

/// `H:MM - HH:MM`, with or without spaces around the hyphen.
static TIME_RANGE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"([0-9]{1,2}):([0-9]{2})\s*-\s*([0-9]{1,2}):([0-9]{2})")
        .expect("time range pattern is valid")
});

/// Opening hours for one weekday.
///
/// A closed day may still carry the times it had before it was closed; they
/// are kept for editing and ignored by status queries. A day that is neither
/// closed nor has both times is unspecified.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaySchedule {
    #[serde(default)]
    pub open_time: Option<LocalTime>,
    #[serde(default)]
    pub close_time: Option<LocalTime>,
    #[serde(default)]
    pub closed: bool,
}

impl DaySchedule {
    pub fn open(open_time: LocalTime, close_time: LocalTime) -> Self {
        Self {
            open_time: Some(open_time),
            close_time: Some(close_time),
            closed: false,
        }
    }

    pub fn closed() -> Self {
        Self {
            open_time: None,
            close_time: None,
            closed: true,
        }
    }

    /// Open/close pair when the day is open with both times set.
    pub fn hours(&self) -> Option<(LocalTime, LocalTime)> {
        if self.closed {
            return None;
        }
        Some((self.open_time?, self.close_time?))
    }

    /// Either explicitly closed or fully timed.
    pub fn is_specified(&self) -> bool {
        self.closed || self.hours().is_some()
    }

    /// Same hours as far as status and canonical text are concerned: two
    /// closed days match whatever times they still carry.
    pub fn same_hours(&self, other: &Self) -> bool {
        match (self.closed, other.closed) {
            (true, true) => true,
            (false, false) => self == other,
            _ => false,
        }
    }
}

/// Opening hours for a whole week: always exactly one entry per weekday.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WeeklySchedule {
    days: [DaySchedule; 7],
}

// Serialized as a map keyed by weekday ("sun", "mon", ...). Keys missing on
// input are filled with an unspecified day.
impl Serialize for WeeklySchedule {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.iter())
    }
}

impl<'de> Deserialize<'de> for WeeklySchedule {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let entries: BTreeMap<WeekdayKey, DaySchedule> = Deserialize::deserialize(deserializer)?;
        let mut schedule = WeeklySchedule::new();
        for (day, entry) in entries {
            schedule.set(day, entry);
        }
        Ok(schedule)
    }
}

impl WeeklySchedule {
    /// A schedule with every day unspecified.
    pub fn new() -> Self {
        Self::default()
    }

    /// The same hours on all seven days.
    pub fn uniform(day: DaySchedule) -> Self {
        Self { days: [day; 7] }
    }

    pub fn get(&self, day: WeekdayKey) -> &DaySchedule {
        &self.days[day.index()]
    }

    pub fn set(&mut self, day: WeekdayKey, schedule: DaySchedule) {
        self.days[day.index()] = schedule;
    }

    /// Builder-style [`set`](Self::set).
    pub fn with(mut self, day: WeekdayKey, schedule: DaySchedule) -> Self {
        self.set(day, schedule);
        self
    }

    /// Entries in calendar order (Sunday first).
    pub fn iter(&self) -> impl Iterator<Item = (WeekdayKey, &DaySchedule)> {
        WeekdayKey::ALL.into_iter().zip(self.days.iter())
    }

    /// [`DaySchedule::same_hours`] on every weekday.
    pub fn same_hours(&self, other: &Self) -> bool {
        self.days
            .iter()
            .zip(other.days.iter())
            .all(|(a, b)| a.same_hours(b))
    }

    /// True when every day is closed or fully timed.
    pub fn is_fully_specified(&self) -> bool {
        self.days.iter().all(DaySchedule::is_specified)
    }

    /// Parse schedule text with every untouched day left unspecified.
    pub fn parse(raw: &str) -> Self {
        parse(raw, &WeeklySchedule::new())
    }

    /// Canonical text; see [`format`].
    pub fn to_text(&self) -> String {
        format(self)
    }
}

/// What a schedule line says about its days.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineHours {
    Closed,
    Open(LocalTime, LocalTime),
}

impl LineHours {
    /// Read the part of a line after the day descriptor: the closed marker
    /// (any case, anywhere) or the first `H:MM - H:MM` range.
    pub fn parse(text: &str) -> Option<LineHours> {
        if text.to_lowercase().contains("fechado") {
            return Some(LineHours::Closed);
        }
        let (open, close) = parse_time_range(text)?;
        Some(LineHours::Open(open, close))
    }
}

impl From<LineHours> for DaySchedule {
    fn from(hours: LineHours) -> Self {
        match hours {
            LineHours::Closed => DaySchedule::closed(),
            LineHours::Open(open, close) => DaySchedule::open(open, close),
        }
    }
}

/// One meaningful line of schedule text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleLine {
    pub day_descriptor: String,
    pub hours: LineHours,
}

impl ScheduleLine {
    /// Read one line. `None` for blank lines, lines without a `:`, and lines
    /// whose remainder is neither the closed marker nor a time range.
    pub fn parse(line: &str) -> Option<ScheduleLine> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }
        let (descriptor, remainder) = line.split_once(':')?;
        Some(ScheduleLine {
            day_descriptor: descriptor.trim().to_string(),
            hours: LineHours::parse(remainder)?,
        })
    }
}

fn parse_time_range(text: &str) -> Option<(LocalTime, LocalTime)> {
    let caps = TIME_RANGE.captures(text)?;
    let field = |i: usize| caps.get(i)?.as_str().parse::<u8>().ok();
    let open = LocalTime::new(field(1)?, field(2)?).ok()?;
    let close = LocalTime::new(field(3)?, field(4)?).ok()?;
    Some((open, close))
}

/// Parse free-text schedule lines on top of `defaults`.
///
/// Lines are applied in order, so the last line naming a weekday decides
/// it. A closed line only sets the flag; the day's previous times stay.
/// Anything that can't be read is skipped and the affected days keep their
/// current value.
pub fn parse(raw: &str, defaults: &WeeklySchedule) -> WeeklySchedule {
    raw.lines().fold(defaults.clone(), |mut schedule, line| {
        let Some(parsed) = ScheduleLine::parse(line) else {
            if !line.trim().is_empty() {
                tracing::debug!(line, "skipping unreadable schedule line");
            }
            return schedule;
        };
        let days = resolve_days(&parsed.day_descriptor);
        if days.is_empty() {
            tracing::debug!(descriptor = %parsed.day_descriptor, "no weekday matched");
            return schedule;
        }
        for day in days {
            let entry = match parsed.hours {
                LineHours::Closed => DaySchedule {
                    closed: true,
                    ..*schedule.get(day)
                },
                LineHours::Open(open, close) => DaySchedule::open(open, close),
            };
            schedule.set(day, entry);
        }
        schedule
    })
}

/// Canonical text: one line per specified day, Monday first, joined by a
/// single newline with no trailing newline.
pub fn format(schedule: &WeeklySchedule) -> String {
    WeekdayKey::BUSINESS_ORDER
        .iter()
        .filter_map(|&day| {
            let entry = schedule.get(day);
            let name = day.display_name();
            if entry.closed {
                Some(format!("{name}: {CLOSED_MARKER}"))
            } else {
                entry
                    .hours()
                    .map(|(open, close)| format!("{name}: {open} - {close}"))
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use WeekdayKey::*;

    fn t(hour: u8, minute: u8) -> LocalTime {
        LocalTime::new(hour, minute).unwrap()
    }

    fn bar_week() -> WeeklySchedule {
        WeeklySchedule::new()
            .with(Mon, DaySchedule::open(t(18, 0), t(0, 0)))
            .with(Tue, DaySchedule::closed())
            .with(Wed, DaySchedule::open(t(18, 0), t(0, 0)))
            .with(Thu, DaySchedule::open(t(18, 0), t(0, 0)))
            .with(Fri, DaySchedule::open(t(18, 0), t(2, 0)))
            .with(Sat, DaySchedule::open(t(18, 0), t(2, 0)))
            .with(Sun, DaySchedule::open(t(16, 0), t(22, 0)))
    }

    #[test]
    fn new_schedule_is_unspecified() {
        let sched = WeeklySchedule::new();
        assert_eq!(sched.iter().count(), 7);
        assert!(sched.iter().all(|(_, d)| !d.is_specified()));
        assert_eq!(format(&sched), "");
    }

    #[test]
    fn parses_single_day_lines() {
        let sched = WeeklySchedule::parse("Segunda: 18:00 - 00:00\nDomingo: 16:00 - 22:00");
        assert_eq!(*sched.get(Mon), DaySchedule::open(t(18, 0), t(0, 0)));
        assert_eq!(*sched.get(Sun), DaySchedule::open(t(16, 0), t(22, 0)));
        assert!(!sched.get(Tue).is_specified());
    }

    #[test]
    fn parses_ranges_and_combinations() {
        let sched = WeeklySchedule::parse(
            "Segunda a Quinta: 18:00 - 00:00\nSexta e Sábado: 18:00 - 02:00\nDomingo: FECHADO",
        );
        for day in [Mon, Tue, Wed, Thu] {
            assert_eq!(*sched.get(day), DaySchedule::open(t(18, 0), t(0, 0)));
        }
        for day in [Fri, Sat] {
            assert_eq!(*sched.get(day), DaySchedule::open(t(18, 0), t(2, 0)));
        }
        assert!(sched.get(Sun).closed);
    }

    #[test]
    fn short_hours_and_tight_hyphen() {
        let sched = WeeklySchedule::parse("sex: 9:30-17:05");
        assert_eq!(*sched.get(Fri), DaySchedule::open(t(9, 30), t(17, 5)));
        assert_eq!(format(&sched), "Sexta: 09:30 - 17:05");
    }

    #[test]
    fn closed_marker_wins_over_times() {
        let sched = WeeklySchedule::parse("Terça: 18:00 - 23:00 FECHADO");
        assert!(sched.get(Tue).closed);
        assert_eq!(sched.get(Tue).hours(), None);

        let lower = WeeklySchedule::parse("terça: fechado");
        assert!(lower.get(Tue).closed);
    }

    #[test]
    fn closing_keeps_earlier_times() {
        let sched = WeeklySchedule::parse("Terça: 18:00 - 23:00\nTerça: FECHADO");
        let tue = sched.get(Tue);
        assert!(tue.closed);
        assert_eq!(tue.open_time, Some(t(18, 0)));
        assert_eq!(tue.close_time, Some(t(23, 0)));
    }

    #[test]
    fn last_line_wins() {
        let sched = WeeklySchedule::parse("Segunda a Sexta: 10:00 - 18:00\nSexta: 10:00 - 22:00");
        assert_eq!(*sched.get(Thu), DaySchedule::open(t(10, 0), t(18, 0)));
        assert_eq!(*sched.get(Fri), DaySchedule::open(t(10, 0), t(22, 0)));

        let reopened = WeeklySchedule::parse("Domingo: FECHADO\nDomingo: 12:00 - 16:00");
        assert_eq!(*reopened.get(Sun), DaySchedule::open(t(12, 0), t(16, 0)));
    }

    #[test]
    fn garbage_leaves_defaults_untouched() {
        let defaults = WeeklySchedule::uniform(DaySchedule::open(t(9, 0), t(17, 0)));
        let text = "abacate: xyz\nsem dois pontos\n\n   \nSegunda: 25:00 - 26:00\nferiado: 10:00 - 12:00";
        assert_eq!(parse(text, &defaults), defaults);
    }

    #[test]
    fn untouched_days_keep_defaults() {
        let defaults = WeeklySchedule::uniform(DaySchedule::closed());
        let sched = parse("Sábado: 10:00 - 14:00", &defaults);
        assert_eq!(*sched.get(Sat), DaySchedule::open(t(10, 0), t(14, 0)));
        assert!(sched.get(Mon).closed);
        assert!(sched.get(Sun).closed);
    }

    #[test]
    fn crlf_and_padding_are_tolerated() {
        let sched = WeeklySchedule::parse("  Quarta :  08:00  -  12:00  \r\nQuinta: FECHADO\r\n");
        assert_eq!(*sched.get(Wed), DaySchedule::open(t(8, 0), t(12, 0)));
        assert!(sched.get(Thu).closed);
    }

    #[test]
    fn format_is_monday_first_without_trailing_newline() {
        let text = format(&bar_week());
        assert_eq!(
            text,
            "Segunda: 18:00 - 00:00\n\
             Terça: FECHADO\n\
             Quarta: 18:00 - 00:00\n\
             Quinta: 18:00 - 00:00\n\
             Sexta: 18:00 - 02:00\n\
             Sábado: 18:00 - 02:00\n\
             Domingo: 16:00 - 22:00"
        );
    }

    #[test]
    fn format_skips_unspecified_days() {
        let sched = WeeklySchedule::new()
            .with(Wed, DaySchedule::closed())
            .with(
                Thu,
                DaySchedule {
                    open_time: Some(t(10, 0)),
                    close_time: None,
                    closed: false,
                },
            );
        assert_eq!(format(&sched), "Quarta: FECHADO");
    }

    #[test]
    fn format_then_parse_roundtrip() {
        let sched = bar_week();
        assert!(sched.is_fully_specified());
        assert_eq!(WeeklySchedule::parse(&sched.to_text()), sched);
    }

    #[test]
    fn parse_is_idempotent_through_format() {
        let raw = "Seg a Qua: 9:00 - 18:00\nquarta: FECHADO\nsexta e sabado: 20:00-04:00\nlixo";
        let once = WeeklySchedule::parse(raw);
        let twice = WeeklySchedule::parse(&format(&once));
        assert!(twice.same_hours(&once));
        // Wednesday's retained 09:00 - 18:00 isn't in the text, so only
        // the comparison that ignores closed-day times holds.
        assert_ne!(twice, once);
    }

    #[test]
    fn closed_days_have_same_hours_regardless_of_times() {
        let plain = DaySchedule::closed();
        let with_times = DaySchedule {
            closed: true,
            ..DaySchedule::open(t(10, 0), t(12, 0))
        };
        assert_ne!(plain, with_times);
        assert!(plain.same_hours(&with_times));
        assert!(!plain.same_hours(&DaySchedule::open(t(10, 0), t(12, 0))));
        assert!(!DaySchedule::open(t(10, 0), t(12, 0))
            .same_hours(&DaySchedule::open(t(10, 0), t(13, 0))));
    }

    #[test]
    fn schedule_line_parse() {
        assert_eq!(
            ScheduleLine::parse("Sexta e Sábado: 18:00 - 02:00"),
            Some(ScheduleLine {
                day_descriptor: "Sexta e Sábado".into(),
                hours: LineHours::Open(t(18, 0), t(2, 0)),
            })
        );
        assert_eq!(
            ScheduleLine::parse("Domingo: Fechado"),
            Some(ScheduleLine {
                day_descriptor: "Domingo".into(),
                hours: LineHours::Closed,
            })
        );
        assert_eq!(ScheduleLine::parse("Domingo 10:00 - 12:00"), None);
        assert_eq!(ScheduleLine::parse("Domingo: xyz"), None);
        assert_eq!(ScheduleLine::parse("   "), None);
    }

    #[test]
    fn line_hours_into_day_schedule() {
        let closed: DaySchedule = LineHours::parse("Fechado para reforma").unwrap().into();
        assert_eq!(closed, DaySchedule::closed());
        let open: DaySchedule = LineHours::parse("das 11:00 - 15:00").unwrap().into();
        assert_eq!(open, DaySchedule::open(t(11, 0), t(15, 0)));
        assert_eq!(LineHours::parse("o dia todo"), None);
    }

    #[test]
    fn serialization_roundtrip() {
        let sched = bar_week();
        let json = serde_json::to_string(&sched).unwrap();
        let back: WeeklySchedule = serde_json::from_str(&json).unwrap();
        assert_eq!(back, sched);
    }

    #[test]
    fn serialization_keeps_closed_day_times() {
        let sched = WeeklySchedule::parse("Terça: 18:00 - 23:00\nTerça: FECHADO");
        let json = serde_json::to_string(&sched).unwrap();
        let back: WeeklySchedule = serde_json::from_str(&json).unwrap();
        assert_eq!(back, sched);
        let tue = back.get(Tue);
        assert!(tue.closed);
        assert_eq!(tue.open_time, Some(t(18, 0)));
        assert_eq!(tue.close_time, Some(t(23, 0)));
    }

    #[test]
    fn deserialize_fills_missing_days() {
        let json = r#"{"fri": {"open_time": "18:00", "close_time": "02:00"}, "sun": {"closed": true}}"#;
        let sched: WeeklySchedule = serde_json::from_str(json).unwrap();
        assert_eq!(*sched.get(Fri), DaySchedule::open(t(18, 0), t(2, 0)));
        assert!(sched.get(Sun).closed);
        assert!(!sched.get(Mon).is_specified());
    }
}
