use thiserror::Error;

/// Failure to read a time-of-day value
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimeError {
    #[error("unrecognised time of day: {0:?}")]
    Unparseable(String),
    #[error("time of day out of range: {0:?}")]
    OutOfRange(String),
    #[error("time slot ends before it starts: {0}")]
    Inverted(String),
}

#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("house {house:?} has an invalid time slot: {source}")]
    InvalidTime {
        house: String,
        #[source]
        source: TimeError,
    },
    #[error("no houses configured")]
    NoHouses,
    #[error("vendor roster has no active vendors")]
    NoActiveVendors,
    #[error("number of weeks must be at least 1")]
    NoWeeks,
    #[error("house {0:?} is listed more than once")]
    DuplicateHouse(String),
    #[error("vendor {0:?} is listed more than once")]
    DuplicateVendor(String),
    #[error("unknown house {0:?}")]
    UnknownHouse(String),
    #[error("invalid date {0:?}")]
    InvalidDate(String),
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl ScheduleError {
    /// True for the roster-is-empty family of errors, as opposed to bad data
    pub fn is_empty_input(&self) -> bool {
        matches!(self, ScheduleError::NoHouses | ScheduleError::NoActiveVendors)
    }
}

pub type Result<T> = std::result::Result<T, ScheduleError>;
