pub mod calendar;
pub mod config;
pub mod conflict;
pub mod course;
pub mod error;
pub mod persistence;
pub mod schedule;
pub mod shared;
pub mod slots;
pub mod telemetry;
pub mod time;
pub mod timetable;

pub use config::TimeConfig;
pub use conflict::{find_conflicts, overwrite_conflicts};
pub use course::{Color, Course};
pub use error::{TimetableError, TimetableResult};
#[cfg(feature = "sqlite")]
pub use persistence::sqlite::SqliteTimetableStore;
pub use persistence::{
    JsonFileStore, PersistenceError, PersistenceResult, TimetableStore, export_courses_to_csv,
    import_courses_from_csv, load_or_sample, load_timetable_from_json, save_timetable_to_json,
};
pub use schedule::{CommitOutcome, Schedule, VisibleCourse};
pub use shared::SharedTimetable;
pub use slots::{Block, DayBlocks, LessonSlot};
pub use time::{Minutes, format_time, parse_time};
pub use timetable::Timetable;
