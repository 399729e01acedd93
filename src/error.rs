//! Errors raised at the data and configuration boundary
//!
//! The simulation itself never fails; only loading level tables, tuning, or
//! requesting a level that does not exist can.

/// Failures while reading the level table or selecting a level.
#[derive(Debug, thiserror::Error)]
pub enum LevelError {
    /// Requested level index is outside the table (state is left untouched).
    #[error("level {requested} does not exist ({available} levels available)")]
    OutOfRange { requested: usize, available: usize },
    /// Level table could not be parsed.
    #[error("invalid level table: {0}")]
    Parse(#[from] serde_json::Error),
    /// Level table parsed but contains no levels.
    #[error("level table is empty")]
    Empty,
}

/// Failures while reading tuning data.
#[derive(Debug, thiserror::Error)]
pub enum TuningError {
    #[error("invalid tuning json: {0}")]
    Parse(#[from] serde_json::Error),
    /// A field that must be strictly positive was not.
    #[error("tuning field `{field}` must be positive, got {value}")]
    NotPositive { field: &'static str, value: f32 },
}
