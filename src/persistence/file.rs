use std::collections::{BTreeSet, HashSet};
use std::fs::{self, File};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use super::{PersistenceError, PersistenceResult, TimetableStore};
use crate::course::{Color, Course};
use crate::{Schedule, Timetable};

pub fn save_timetable_to_json<P: AsRef<Path>>(
    timetable: &Timetable,
    path: P,
) -> PersistenceResult<()> {
    super::validate_timetable(timetable)?;
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, timetable)?;
    Ok(())
}

pub fn load_timetable_from_json<P: AsRef<Path>>(path: P) -> PersistenceResult<Timetable> {
    let file = File::open(path)?;
    let timetable: Timetable = serde_json::from_reader(file)?;
    super::validate_timetable(&timetable)?;
    Ok(timetable)
}

/// Keeps the timetable in one JSON document. Writes go to a sibling
/// temporary file first and replace the document with a rename.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TimetableStore for JsonFileStore {
    fn save_timetable(&self, timetable: &Timetable) -> PersistenceResult<()> {
        let staging = self.path.with_extension("json.tmp");
        save_timetable_to_json(timetable, &staging)?;
        fs::rename(&staging, &self.path)?;
        debug!(path = %self.path.display(), "saved timetable");
        Ok(())
    }

    fn load_timetable(&self) -> PersistenceResult<Option<Timetable>> {
        if !self.path.exists() {
            return Ok(None);
        }
        load_timetable_from_json(&self.path).map(Some)
    }
}

#[derive(Default, Serialize, Deserialize)]
struct CourseCsvRecord {
    id: String,
    name: String,
    location: String,
    teacher: String,
    weeks: String,
    day_of_week: u8,
    start_period: u32,
    end_period: u32,
    color: String,
}

impl From<&Course> for CourseCsvRecord {
    fn from(course: &Course) -> Self {
        Self {
            id: course.id.to_string(),
            name: course.name.clone(),
            location: course.location.clone(),
            teacher: course.teacher.clone().unwrap_or_default(),
            weeks: course.week_label(),
            day_of_week: course.day_of_week,
            start_period: course.start_period,
            end_period: course.end_period,
            color: format!("#{:08X}", course.color.0),
        }
    }
}

impl CourseCsvRecord {
    fn into_course(self) -> PersistenceResult<Course> {
        let id = if self.id.trim().is_empty() {
            Uuid::new_v4()
        } else {
            Uuid::parse_str(self.id.trim()).map_err(|err| {
                PersistenceError::InvalidData(format!("invalid course id '{}': {err}", self.id))
            })?
        };
        let mut course = Course::new(
            self.name,
            self.location,
            self.day_of_week,
            self.start_period,
            self.end_period,
        );
        course.id = id;
        course.teacher = parse_string_option(self.teacher);
        course.weeks = parse_weeks(&self.weeks)?;
        course.color = parse_color(&self.color)?;
        Ok(course)
    }
}

/// Write a schedule's courses as CSV, one course per row.
pub fn export_courses_to_csv<P: AsRef<Path>>(schedule: &Schedule, path: P) -> PersistenceResult<()> {
    let file = File::create(path)?;
    let mut writer = csv::Writer::from_writer(file);
    for course in schedule.courses() {
        writer.serialize(CourseCsvRecord::from(course))?;
    }
    writer.flush()?;
    Ok(())
}

/// Read courses written by [`export_courses_to_csv`]. Rows without an id get a
/// fresh one.
pub fn import_courses_from_csv<P: AsRef<Path>>(path: P) -> PersistenceResult<Vec<Course>> {
    let file = File::open(path)?;
    let mut reader = csv::Reader::from_reader(file);
    let mut courses = Vec::new();
    let mut seen = HashSet::new();
    for record in reader.deserialize::<CourseCsvRecord>() {
        let course = record?.into_course()?;
        course.validate()?;
        if !seen.insert(course.id) {
            return Err(PersistenceError::InvalidData(format!(
                "duplicate course id {}",
                course.id
            )));
        }
        courses.push(course);
    }
    Ok(courses)
}

fn parse_weeks(input: &str) -> PersistenceResult<BTreeSet<u32>> {
    let invalid = |part: &str| PersistenceError::InvalidData(format!("invalid week list entry '{part}'"));
    let mut weeks = BTreeSet::new();
    for part in input.split(',').map(str::trim).filter(|part| !part.is_empty()) {
        match part.split_once('-') {
            Some((first, last)) => {
                let first: u32 = first.trim().parse().map_err(|_| invalid(part))?;
                let last: u32 = last.trim().parse().map_err(|_| invalid(part))?;
                if first > last {
                    return Err(invalid(part));
                }
                weeks.extend(first..=last);
            }
            None => {
                weeks.insert(part.parse().map_err(|_| invalid(part))?);
            }
        }
    }
    Ok(weeks)
}

fn parse_color(input: &str) -> PersistenceResult<Color> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(Color::default());
    }
    let digits = trimmed.strip_prefix('#').unwrap_or(trimmed);
    let value = u32::from_str_radix(digits, 16)
        .map_err(|err| PersistenceError::InvalidData(format!("invalid color '{input}': {err}")))?;
    Ok(if digits.len() <= 6 {
        Color(0xFF00_0000 | value)
    } else {
        Color(value)
    })
}

fn parse_string_option(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}
