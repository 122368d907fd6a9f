use thiserror::Error;

/// Failures of the strict conversions used at the edges of the engine.
///
/// Schedule parsing never produces these: free-text lines that don't make
/// sense are skipped. They only come from explicit conversions such as
/// reading a `--time` flag or a weekday key.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HorarioError {
    #[error("invalid time of day: {0}")]
    InvalidTime(String),

    #[error("unknown weekday: {0}")]
    UnknownWeekday(String),

    #[error("invalid UTC offset: {0} minutes")]
    InvalidOffset(i32),
}
