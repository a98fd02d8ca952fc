use thiserror::Error;

use crate::time::Minutes;

/// Errors raised by the timetable engine. Every operation that returns one of
/// these leaves the state it was given untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimetableError {
    #[error("invalid time '{input}', expected HH:MM")]
    Parse { input: String },

    #[error("invalid input: {0}")]
    Validation(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("lesson {number} would end at minute {end}, past midnight")]
    DayOverflow { number: u32, end: Minutes },
}

impl TimetableError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }
}

pub type TimetableResult<T> = Result<T, TimetableError>;
