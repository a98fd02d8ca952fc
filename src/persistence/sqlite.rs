use std::path::Path;

use parking_lot::Mutex;
use rusqlite::{Connection, OptionalExtension, params};
use tracing::debug;

use super::{PersistenceResult, TimetableStore};
use crate::{Schedule, Timetable};

pub struct SqliteTimetableStore {
    connection: Mutex<Connection>,
}

impl SqliteTimetableStore {
    pub fn new<P: AsRef<Path>>(path: P) -> PersistenceResult<Self> {
        let connection = Connection::open(path)?;
        Self::initialize_schema(&connection)?;
        Ok(Self {
            connection: Mutex::new(connection),
        })
    }

    pub fn in_memory() -> PersistenceResult<Self> {
        let connection = Connection::open_in_memory()?;
        Self::initialize_schema(&connection)?;
        Ok(Self {
            connection: Mutex::new(connection),
        })
    }

    fn initialize_schema(connection: &Connection) -> PersistenceResult<()> {
        let ddl = r#"
            CREATE TABLE IF NOT EXISTS timetable_settings (
                id INTEGER PRIMARY KEY CHECK (id = 1),
                time_config_json TEXT NOT NULL,
                day_blocks_json TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS schedules (
                id TEXT PRIMARY KEY,
                position INTEGER NOT NULL,
                schedule_json TEXT NOT NULL
            );
        "#;
        connection.execute_batch(ddl)?;
        Ok(())
    }

    fn save_settings(
        &self,
        tx: &rusqlite::Transaction,
        timetable: &Timetable,
    ) -> PersistenceResult<()> {
        let config_json = serde_json::to_string(&timetable.time_config())?;
        let blocks_json = serde_json::to_string(timetable.day_blocks())?;
        tx.execute("DELETE FROM timetable_settings", [])?;
        tx.execute(
            "INSERT INTO timetable_settings (id, time_config_json, day_blocks_json) VALUES (1, ?1, ?2)",
            params![config_json, blocks_json],
        )?;
        Ok(())
    }

    fn save_schedules(
        &self,
        tx: &rusqlite::Transaction,
        timetable: &Timetable,
    ) -> PersistenceResult<()> {
        tx.execute("DELETE FROM schedules", [])?;
        let mut stmt =
            tx.prepare("INSERT INTO schedules (id, position, schedule_json) VALUES (?1, ?2, ?3)")?;
        for (position, schedule) in timetable.schedules().iter().enumerate() {
            let json = serde_json::to_string(schedule)?;
            stmt.execute(params![schedule.id.to_string(), position as i64, json])?;
        }
        Ok(())
    }
}

impl TimetableStore for SqliteTimetableStore {
    fn save_timetable(&self, timetable: &Timetable) -> PersistenceResult<()> {
        super::validate_timetable(timetable)?;
        let mut conn = self.connection.lock();
        let tx = conn.transaction()?;
        self.save_settings(&tx, timetable)?;
        self.save_schedules(&tx, timetable)?;
        tx.commit()?;
        debug!(schedules = timetable.schedules().len(), "saved timetable to sqlite");
        Ok(())
    }

    fn load_timetable(&self) -> PersistenceResult<Option<Timetable>> {
        let conn = self.connection.lock();

        let mut stmt = conn.prepare(
            "SELECT time_config_json, day_blocks_json FROM timetable_settings WHERE id = 1",
        )?;
        let settings: Option<(String, String)> = stmt
            .query_row([], |row| Ok((row.get(0)?, row.get(1)?)))
            .optional()?;

        let Some((config_json, blocks_json)) = settings else {
            return Ok(None);
        };

        let time_config = serde_json::from_str(&config_json)?;
        let day_blocks = serde_json::from_str(&blocks_json)?;

        let mut stmt = conn.prepare("SELECT schedule_json FROM schedules ORDER BY position ASC")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;

        let mut schedules = Vec::new();
        for json in rows {
            let schedule: Schedule = serde_json::from_str(&json?)?;
            schedules.push(schedule);
        }

        let timetable = Timetable::from_parts(schedules, time_config, day_blocks)
            .map_err(super::invalid_timetable)?;
        Ok(Some(timetable))
    }
}
