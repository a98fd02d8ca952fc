use std::io;

use chrono::NaiveDate;
use serde_json::Error as SerdeJsonError;
use thiserror::Error;
use tracing::info;

use crate::Timetable;
use crate::error::TimetableError;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("serialization error: {0}")]
    Serialization(#[from] SerdeJsonError),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[cfg(feature = "sqlite")]
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("invalid data: {0}")]
    InvalidData(String),
    #[error(transparent)]
    Timetable(#[from] TimetableError),
}

pub type PersistenceResult<T> = Result<T, PersistenceError>;

/// Durable home of a [`Timetable`].
pub trait TimetableStore {
    fn save_timetable(&self, timetable: &Timetable) -> PersistenceResult<()>;
    fn load_timetable(&self) -> PersistenceResult<Option<Timetable>>;
}

/// Check a timetable before it is written or after it is read.
pub fn validate_timetable(timetable: &Timetable) -> PersistenceResult<()> {
    timetable.validate().map_err(invalid_timetable)
}

/// Stored data that fails timetable validation, whichever store it came from.
pub(crate) fn invalid_timetable(err: TimetableError) -> PersistenceError {
    PersistenceError::InvalidData(err.to_string())
}

/// Load the stored timetable, or the sample timetable when the store is empty.
pub fn load_or_sample<S: TimetableStore + ?Sized>(
    store: &S,
    semester_start_date: NaiveDate,
) -> PersistenceResult<Timetable> {
    match store.load_timetable()? {
        Some(timetable) => Ok(timetable),
        None => {
            info!("no stored timetable, starting from sample data");
            Ok(Timetable::sample(semester_start_date))
        }
    }
}

pub mod file;
#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use file::{
    JsonFileStore, export_courses_to_csv, import_courses_from_csv, load_timetable_from_json,
    save_timetable_to_json,
};
