use chrono::NaiveDate;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::calendar;
use crate::conflict;
use crate::course::Course;
use crate::error::{TimetableError, TimetableResult};
use crate::slots::DayBlocks;
use crate::time::{self, Minutes};

pub const DEFAULT_SCHEDULE_NAME: &str = "我的课表";
pub const DEFAULT_TERM: &str = "2024-2025-1";
pub const DEFAULT_TOTAL_WEEKS: u32 = 20;

/// Outcome of trying to save a course into a schedule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitOutcome {
    /// The course was inserted or replaced.
    Saved,
    /// Nothing changed; these courses occupy the same slot. The caller can
    /// retry with [`Schedule::overwrite_course`].
    Blocked(Vec<Course>),
}

/// A course as drawn on the weekly grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisibleCourse<'a> {
    pub course: &'a Course,
    /// The course does not meet in the displayed week.
    pub dimmed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    pub id: Uuid,
    pub name: String,
    pub term: String,
    pub semester_start_date: NaiveDate,
    total_weeks: u32,
    #[serde(default)]
    pub is_current: bool,
    #[serde(default)]
    class_period_count: u32,
    #[serde(default, with = "time::clock_list")]
    class_start_times: Vec<Minutes>,
    #[serde(default)]
    courses: Vec<Course>,
    #[serde(default = "default_show_non_current")]
    pub show_non_current_week_courses: bool,
}

fn default_show_non_current() -> bool {
    true
}

impl Schedule {
    pub fn new(
        name: impl Into<String>,
        term: impl Into<String>,
        semester_start_date: NaiveDate,
        total_weeks: u32,
    ) -> TimetableResult<Self> {
        validate_total_weeks(total_weeks)?;
        Ok(Self {
            id: Uuid::new_v4(),
            name: name.into(),
            term: term.into(),
            semester_start_date,
            total_weeks,
            is_current: false,
            class_period_count: 0,
            class_start_times: Vec::new(),
            courses: Vec::new(),
            show_non_current_week_courses: true,
        })
    }

    /// A schedule with the stock name, term and length.
    pub fn untitled(semester_start_date: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: DEFAULT_SCHEDULE_NAME.to_string(),
            term: DEFAULT_TERM.to_string(),
            semester_start_date,
            total_weeks: DEFAULT_TOTAL_WEEKS,
            is_current: false,
            class_period_count: 0,
            class_start_times: Vec::new(),
            courses: Vec::new(),
            show_non_current_week_courses: true,
        }
    }

    pub(crate) fn seeded(
        name: &str,
        semester_start_date: NaiveDate,
        total_weeks: u32,
        courses: Vec<Course>,
    ) -> Self {
        let mut schedule = Self::untitled(semester_start_date);
        schedule.name = name.to_string();
        schedule.total_weeks = total_weeks.max(1);
        schedule.courses = courses;
        schedule
    }

    pub fn total_weeks(&self) -> u32 {
        self.total_weeks
    }

    /// Change the semester length. Rejected when a course meets in a week
    /// past the new end.
    pub fn set_total_weeks(&mut self, total_weeks: u32) -> TimetableResult<()> {
        validate_total_weeks(total_weeks)?;
        if let Some(course) = self
            .courses
            .iter()
            .find(|course| course.weeks.last().is_some_and(|week| *week > total_weeks))
        {
            return Err(TimetableError::validation(format!(
                "course '{}' meets after week {total_weeks}",
                course.name
            )));
        }
        self.total_weeks = total_weeks;
        Ok(())
    }

    pub fn courses(&self) -> &[Course] {
        &self.courses
    }

    pub fn find_course(&self, id: Uuid) -> Option<&Course> {
        self.courses.iter().find(|course| course.id == id)
    }

    pub fn class_period_count(&self) -> u32 {
        self.class_period_count
    }

    pub fn class_start_times(&self) -> &[Minutes] {
        &self.class_start_times
    }

    /// Take the period table from the slot sequencer's latest output.
    pub fn apply_day_blocks(&mut self, blocks: &DayBlocks) {
        self.class_period_count = blocks.period_count();
        self.class_start_times = blocks.class_start_times();
    }

    /// Week of the semester on `today`, clamped to the semester length.
    pub fn week_on(&self, today: NaiveDate) -> u32 {
        self.clamp_week(calendar::week_on(self.semester_start_date, today))
    }

    pub fn current_week(&self) -> u32 {
        self.clamp_week(calendar::current_week(self.semester_start_date))
    }

    // A deserialized schedule may carry zero weeks until it is validated.
    fn clamp_week(&self, week: u32) -> u32 {
        week.clamp(1, self.total_weeks.max(1))
    }

    /// Draft for a tap on the empty cell at (`day_of_week`, `period`), meeting
    /// in the week that contains `today`.
    pub fn draft_course<R: Rng>(
        &self,
        day_of_week: u8,
        period: u32,
        today: NaiveDate,
        rng: &mut R,
    ) -> Course {
        Course::for_empty_cell(day_of_week, period, self.week_on(today), rng)
    }

    fn validate_course(&self, course: &Course) -> TimetableResult<()> {
        course.validate()?;
        if let Some(week) = course.weeks.iter().find(|week| **week > self.total_weeks) {
            return Err(TimetableError::validation(format!(
                "course '{}' meets in week {week} but the semester has {} weeks",
                course.name, self.total_weeks
            )));
        }
        Ok(())
    }

    fn upsert(&mut self, course: Course) {
        match self.courses.iter_mut().find(|existing| existing.id == course.id) {
            Some(existing) => *existing = course,
            None => self.courses.push(course),
        }
    }

    /// Insert a new course or replace the one with the same id, unless it
    /// clashes with another course.
    pub fn commit_course(&mut self, course: Course) -> TimetableResult<CommitOutcome> {
        self.validate_course(&course)?;
        let conflicts: Vec<Course> = conflict::find_conflicts(&course, &self.courses)
            .into_iter()
            .cloned()
            .collect();
        if !conflicts.is_empty() {
            return Ok(CommitOutcome::Blocked(conflicts));
        }
        debug!(schedule = %self.id, course = %course.id, "saved course");
        self.upsert(course);
        Ok(CommitOutcome::Saved)
    }

    /// Save `course`, deleting every course it clashes with. Returns the
    /// deleted courses.
    pub fn overwrite_course(&mut self, course: Course) -> TimetableResult<Vec<Course>> {
        self.validate_course(&course)?;
        let result = conflict::overwrite_conflicts(course, &self.courses);
        info!(
            schedule = %self.id,
            removed = result.removed.len(),
            "overwrote conflicting courses"
        );
        self.courses = result.courses;
        Ok(result.removed)
    }

    pub fn delete_course(&mut self, id: Uuid) -> TimetableResult<Course> {
        let index = self
            .courses
            .iter()
            .position(|course| course.id == id)
            .ok_or_else(|| TimetableError::not_found(format!("course {id}")))?;
        Ok(self.courses.remove(index))
    }

    /// Courses to draw for `week`. Courses of other weeks are included, dimmed,
    /// only when `show_non_current_week_courses` is set.
    pub fn visible_courses(&self, week: u32) -> Vec<VisibleCourse<'_>> {
        self.courses
            .iter()
            .filter_map(|course| {
                let in_week = course.occurs_in_week(week);
                (in_week || self.show_non_current_week_courses).then_some(VisibleCourse {
                    course,
                    dimmed: !in_week,
                })
            })
            .collect()
    }

    /// Check the stored state: semester length and every course.
    pub fn validate(&self) -> TimetableResult<()> {
        validate_total_weeks(self.total_weeks)?;
        let mut seen = std::collections::HashSet::with_capacity(self.courses.len());
        for course in &self.courses {
            if !seen.insert(course.id) {
                return Err(TimetableError::validation(format!(
                    "duplicate course id {}",
                    course.id
                )));
            }
            self.validate_course(course)?;
        }
        Ok(())
    }
}

fn validate_total_weeks(total_weeks: u32) -> TimetableResult<()> {
    if total_weeks == 0 {
        return Err(TimetableError::validation(
            "a semester needs at least one week",
        ));
    }
    Ok(())
}
