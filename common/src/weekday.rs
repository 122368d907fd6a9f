use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::HorarioError;

/// Canonical weekday, in calendar order starting Sunday.
///
/// The ordering matters: ranges are resolved by index, and when a day
/// descriptor could match several weekdays the earliest one in this order
/// wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeekdayKey {
    Sun,
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
    Sat,
}

impl WeekdayKey {
    /// Calendar order, Sunday first.
    pub const ALL: [WeekdayKey; 7] = [
        WeekdayKey::Sun,
        WeekdayKey::Mon,
        WeekdayKey::Tue,
        WeekdayKey::Wed,
        WeekdayKey::Thu,
        WeekdayKey::Fri,
        WeekdayKey::Sat,
    ];

    /// Order used for display and canonical text: Monday through Sunday.
    pub const BUSINESS_ORDER: [WeekdayKey; 7] = [
        WeekdayKey::Mon,
        WeekdayKey::Tue,
        WeekdayKey::Wed,
        WeekdayKey::Thu,
        WeekdayKey::Fri,
        WeekdayKey::Sat,
        WeekdayKey::Sun,
    ];

    /// Index 0–6 (Sun–Sat).
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<WeekdayKey> {
        Self::ALL.get(index).copied()
    }

    /// Short lower-case key ("sun", "mon", ...).
    pub fn key(self) -> &'static str {
        match self {
            WeekdayKey::Sun => "sun",
            WeekdayKey::Mon => "mon",
            WeekdayKey::Tue => "tue",
            WeekdayKey::Wed => "wed",
            WeekdayKey::Thu => "thu",
            WeekdayKey::Fri => "fri",
            WeekdayKey::Sat => "sat",
        }
    }

    /// Name written into canonical schedule text.
    pub fn display_name(self) -> &'static str {
        match self {
            WeekdayKey::Sun => "Domingo",
            WeekdayKey::Mon => "Segunda",
            WeekdayKey::Tue => "Terça",
            WeekdayKey::Wed => "Quarta",
            WeekdayKey::Thu => "Quinta",
            WeekdayKey::Fri => "Sexta",
            WeekdayKey::Sat => "Sábado",
        }
    }

    /// Lower-case aliases recognised anywhere inside a day descriptor.
    pub fn aliases(self) -> &'static [&'static str] {
        match self {
            WeekdayKey::Sun => &["domingo", "dom"],
            WeekdayKey::Mon => &["segunda-feira", "segunda", "seg"],
            WeekdayKey::Tue => &["terça-feira", "terca-feira", "terça", "terca", "ter"],
            WeekdayKey::Wed => &["quarta-feira", "quarta", "qua"],
            WeekdayKey::Thu => &["quinta-feira", "quinta", "qui"],
            WeekdayKey::Fri => &["sexta-feira", "sexta", "sex"],
            WeekdayKey::Sat => &["sábado", "sabado", "sáb", "sab"],
        }
    }

    fn matches(self, segment: &str) -> bool {
        self.aliases().iter().any(|alias| segment.contains(alias))
    }
}

impl fmt::Display for WeekdayKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl From<chrono::Weekday> for WeekdayKey {
    fn from(day: chrono::Weekday) -> Self {
        // chrono counts from Sunday = 0 here, same as the canonical order.
        Self::ALL[day.num_days_from_sunday() as usize]
    }
}

impl FromStr for WeekdayKey {
    type Err = HorarioError;

    /// Accepts exactly a canonical key ("fri") or one Portuguese alias
    /// ("Sexta-feira"). Unlike descriptor matching, no substrings.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|day| day.key() == lowered || day.aliases().contains(&lowered.as_str()))
            .ok_or_else(|| HorarioError::UnknownWeekday(s.to_string()))
    }
}

const RANGE_SEPARATOR: &str = " a ";
const COMBINATION_SEPARATOR: &str = " e ";

/// The day-naming part of a schedule line, before it is resolved to weekdays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DayDescriptor {
    /// One alias, e.g. "sexta-feira".
    Single(String),
    /// Inclusive span, e.g. "segunda a sexta". May wrap past Saturday.
    Range(String, String),
    /// Discrete set, e.g. "sexta e sábado".
    Combination(Vec<String>),
}

impl DayDescriptor {
    /// Classify a descriptor. Text is lower-cased; a range separator takes
    /// precedence over a combination separator.
    pub fn parse(text: &str) -> DayDescriptor {
        let lowered = text.trim().to_lowercase();
        if let Some((start, end)) = lowered.split_once(RANGE_SEPARATOR) {
            return DayDescriptor::Range(start.trim().to_string(), end.trim().to_string());
        }
        if lowered.contains(COMBINATION_SEPARATOR) {
            return Self::combination(&lowered);
        }
        DayDescriptor::Single(lowered)
    }

    fn combination(lowered: &str) -> DayDescriptor {
        DayDescriptor::Combination(
            lowered
                .split(COMBINATION_SEPARATOR)
                .map(|s| s.trim().to_string())
                .collect(),
        )
    }

    pub fn resolve(&self) -> BTreeSet<WeekdayKey> {
        match self {
            DayDescriptor::Single(segment) => resolve_single(segment).into_iter().collect(),
            DayDescriptor::Range(start, end) => resolve_range(start, end),
            DayDescriptor::Combination(segments) => segments
                .iter()
                .filter_map(|segment| resolve_single(segment))
                .collect(),
        }
    }
}

/// Resolve a free-text day descriptor to the weekdays it names.
///
/// A range is tried first; if it doesn't resolve and the text also reads as
/// a combination ("segunda a sexta e sábado" with a garbled side), the
/// combination reading is used instead. Unknown text resolves to nothing.
pub fn resolve_days(descriptor: &str) -> BTreeSet<WeekdayKey> {
    let parsed = DayDescriptor::parse(descriptor);
    let days = parsed.resolve();
    if !days.is_empty() {
        return days;
    }
    match parsed {
        DayDescriptor::Range(..) => {
            let lowered = descriptor.trim().to_lowercase();
            if lowered.contains(COMBINATION_SEPARATOR) {
                DayDescriptor::combination(&lowered).resolve()
            } else {
                days
            }
        }
        _ => days,
    }
}

/// First weekday (calendar order) with an alias occurring in `segment`.
fn resolve_single(segment: &str) -> Option<WeekdayKey> {
    WeekdayKey::ALL.into_iter().find(|day| day.matches(segment))
}

fn resolve_range(start: &str, end: &str) -> BTreeSet<WeekdayKey> {
    let (Some(start), Some(end)) = (resolve_single(start), resolve_single(end)) else {
        return BTreeSet::new();
    };
    let (start, end) = (start.index(), end.index());
    let span = if start <= end {
        end - start + 1
    } else {
        7 - start + end + 1
    };
    (0..span)
        .filter_map(|offset| WeekdayKey::from_index((start + offset) % 7))
        .collect()
}
