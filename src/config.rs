use serde::{Deserialize, Serialize};

use crate::error::{TimetableError, TimetableResult};
use crate::time::{MINUTES_PER_DAY, Minutes};

pub const DEFAULT_LESSON_DURATION: Minutes = 45;
pub const DEFAULT_BREAK_DURATION: Minutes = 10;

/// Lesson and break lengths shared by every slot of a timetable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeConfig {
    pub lesson_duration_minutes: Minutes,
    pub break_duration_minutes: Minutes,
}

impl Default for TimeConfig {
    fn default() -> Self {
        Self {
            lesson_duration_minutes: DEFAULT_LESSON_DURATION,
            break_duration_minutes: DEFAULT_BREAK_DURATION,
        }
    }
}

impl TimeConfig {
    pub fn new(lesson_duration_minutes: Minutes, break_duration_minutes: Minutes) -> TimetableResult<Self> {
        let config = Self {
            lesson_duration_minutes,
            break_duration_minutes,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> TimetableResult<()> {
        if self.lesson_duration_minutes == 0 {
            return Err(TimetableError::validation(
                "lesson duration must be at least one minute",
            ));
        }
        if self.lesson_duration_minutes >= MINUTES_PER_DAY {
            return Err(TimetableError::validation(format!(
                "lesson duration {} does not fit in a day",
                self.lesson_duration_minutes
            )));
        }
        if self.break_duration_minutes >= MINUTES_PER_DAY {
            return Err(TimetableError::validation(format!(
                "break duration {} does not fit in a day",
                self.break_duration_minutes
            )));
        }
        Ok(())
    }

    pub fn with_lesson_duration(self, minutes: Minutes) -> TimetableResult<Self> {
        Self::new(minutes, self.break_duration_minutes)
    }

    pub fn with_break_duration(self, minutes: Minutes) -> TimetableResult<Self> {
        Self::new(self.lesson_duration_minutes, minutes)
    }
}
