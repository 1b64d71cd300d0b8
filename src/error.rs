use thiserror::Error;

/// Errors surfaced by the routine engine and its stores.
#[derive(Error, Debug)]
pub enum Error {
    /// A training session needs at least one exercise
    #[error("Exercise list can't be empty")]
    EmptyRoutine,

    #[error("Name can't be empty")]
    EmptyName,

    /// Duration input that is not `HH:MM:SS` with minutes and seconds in 00-59
    #[error("Invalid duration '{0}': expected HH:MM:SS")]
    InvalidDuration(String),

    #[error("Invalid repetitions '{0}': expected a whole number")]
    InvalidRepetitions(String),

    #[error("No routine named '{0}'")]
    UnknownRoutine(String),

    #[error("A routine named '{0}' already exists")]
    DuplicateRoutine(String),

    /// A history row whose outcome column is neither `finished` nor `abandoned`
    #[error("Unknown session outcome '{0}'")]
    UnknownOutcome(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
