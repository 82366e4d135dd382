use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Invalid {field} {value}: must be between -{limit} and {limit}")]
    InvalidCoordinate {
        field: &'static str,
        value: f64,
        limit: f64,
    },

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Storage error: {0}")]
    Storage(String),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Invalid pages {0}: must be a non-negative number")]
    InvalidPages(f64),

    #[error("Invalid time_minutes {0}: must be a non-negative integer")]
    InvalidTimeMinutes(i64),

    #[error("Notes too long: {0} characters (max {max})", max = crate::validation::MAX_NOTES_LEN)]
    NotesTooLong(usize),

    #[error("Invalid attendance: {0}")]
    InvalidAttendance(String),

    #[error("Invalid name: {0}")]
    InvalidName(String),
}

impl CoreError {
    pub fn invalid_latitude(value: f64) -> Self {
        CoreError::InvalidCoordinate {
            field: "latitude",
            value,
            limit: 90.0,
        }
    }

    pub fn invalid_longitude(value: f64) -> Self {
        CoreError::InvalidCoordinate {
            field: "longitude",
            value,
            limit: 180.0,
        }
    }
}
