//! Weekly operating-hours engine for venue listings.
//!
//! Parses free-text Portuguese schedules ("Segunda a Quinta: 18:00 - 00:00",
//! "Domingo: FECHADO") into a [`schedule::WeeklySchedule`], writes them back
//! as canonical text, and answers whether a venue is open at a given local
//! weekday and time. Every function is pure; the caller supplies "now".

pub mod error;
pub mod schedule;
pub mod status;
pub mod time_window;
pub mod venue;
pub mod weekday;

pub use error::HorarioError;
pub use schedule::{DaySchedule, WeeklySchedule};
pub use status::{describe_week, is_open_now, DayStatus, Now};
pub use time_window::{is_within, LocalTime};
pub use venue::VenueHours;
pub use weekday::{resolve_days, DayDescriptor, WeekdayKey};
