//! Overlap detection between a candidate course and a schedule's courses.

use std::collections::HashSet;

use tracing::debug;
use uuid::Uuid;

use crate::course::Course;

/// Two courses clash when they meet on the same day, in at least one common
/// week, over at least one common period.
pub fn clashes(candidate: &Course, other: &Course) -> bool {
    candidate.id != other.id
        && candidate.day_of_week == other.day_of_week
        && candidate.shares_week_with(other)
        && candidate.overlaps_periods(other)
}

/// Every course in `existing` that clashes with `candidate`, in the order they
/// appear. A course never clashes with itself, so re-checking an edited course
/// against its own schedule is safe.
pub fn find_conflicts<'a>(candidate: &Course, existing: &'a [Course]) -> Vec<&'a Course> {
    let conflicts: Vec<&Course> = existing
        .iter()
        .filter(|other| clashes(candidate, other))
        .collect();
    if !conflicts.is_empty() {
        debug!(
            candidate = %candidate.id,
            count = conflicts.len(),
            "course placement conflicts with existing courses"
        );
    }
    conflicts
}

/// Result of forcing a candidate into a course list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Overwrite {
    pub courses: Vec<Course>,
    pub removed: Vec<Course>,
}

/// Drop every course clashing with `candidate`, then replace the course with
/// the candidate's id or append the candidate. The input is not modified.
pub fn overwrite_conflicts(candidate: Course, existing: &[Course]) -> Overwrite {
    let clashing: HashSet<Uuid> = find_conflicts(&candidate, existing)
        .into_iter()
        .map(|course| course.id)
        .collect();

    let (removed, mut courses): (Vec<Course>, Vec<Course>) = existing
        .iter()
        .cloned()
        .partition(|course| clashing.contains(&course.id));

    match courses.iter_mut().find(|course| course.id == candidate.id) {
        Some(slot) => *slot = candidate,
        None => courses.push(candidate),
    }

    Overwrite { courses, removed }
}
