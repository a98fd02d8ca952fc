//! One writer at a time per timetable.

use chrono::NaiveDate;
use parking_lot::Mutex;
use tracing::warn;

use crate::Timetable;
use crate::error::TimetableResult;
use crate::persistence::{self, PersistenceResult, TimetableStore};

/// A timetable plus the store it is saved to. Every edit runs under one lock
/// against a copy; the copy replaces the live state only once it has been
/// saved, so a failed edit or save changes nothing.
pub struct SharedTimetable<S> {
    state: Mutex<Timetable>,
    store: S,
}

impl<S: TimetableStore> SharedTimetable<S> {
    pub fn new(timetable: Timetable, store: S) -> Self {
        Self {
            state: Mutex::new(timetable),
            store,
        }
    }

    /// Load from `store`, seeding sample data when it is empty.
    pub fn open(store: S, semester_start_date: NaiveDate) -> PersistenceResult<Self> {
        let timetable = persistence::load_or_sample(&store, semester_start_date)?;
        Ok(Self::new(timetable, store))
    }

    pub fn snapshot(&self) -> Timetable {
        self.state.lock().clone()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn edit<T, F>(&self, edit: F) -> PersistenceResult<T>
    where
        F: FnOnce(&mut Timetable) -> TimetableResult<T>,
    {
        let mut live = self.state.lock();
        let mut draft = live.clone();
        let output = edit(&mut draft).inspect_err(|err| warn!(%err, "timetable edit rejected"))?;
        self.store.save_timetable(&draft)?;
        *live = draft;
        Ok(output)
    }
}
