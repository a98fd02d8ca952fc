use std::collections::BTreeSet;
use std::ops::RangeInclusive;

use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{TimetableError, TimetableResult};

/// Display color packed as ARGB.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Color(pub u32);

impl Color {
    pub const WHITE: Color = Color(0xFFFF_FFFF);

    pub fn from_rgb(red: u8, green: u8, blue: u8) -> Self {
        Color(0xFF00_0000 | (u32::from(red) << 16) | (u32::from(green) << 8) | u32::from(blue))
    }

    pub fn random<R: Rng>(rng: &mut R) -> Self {
        Self::from_rgb(rng.r#gen(), rng.r#gen(), rng.r#gen())
    }

    pub fn rgb(self) -> (u8, u8, u8) {
        ((self.0 >> 16) as u8, (self.0 >> 8) as u8, self.0 as u8)
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::WHITE
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    pub id: Uuid,
    pub name: String,
    pub location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub teacher: Option<String>,
    pub weeks: BTreeSet<u32>,
    /// 1 is Monday, 7 is Sunday.
    pub day_of_week: u8,
    pub start_period: u32,
    pub end_period: u32,
    #[serde(default)]
    pub color: Color,
}

impl Course {
    pub fn new(
        name: impl Into<String>,
        location: impl Into<String>,
        day_of_week: u8,
        start_period: u32,
        end_period: u32,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            location: location.into(),
            teacher: None,
            weeks: BTreeSet::new(),
            day_of_week,
            start_period,
            end_period,
            color: Color::default(),
        }
    }

    /// Draft course for a tap on an empty grid cell: one period long, meeting
    /// only in `current_week`, with a random color. The name stays blank until
    /// the user fills it in.
    pub fn for_empty_cell<R: Rng>(
        day_of_week: u8,
        period: u32,
        current_week: u32,
        rng: &mut R,
    ) -> Self {
        let mut course = Self::new("", "", day_of_week, period, period);
        course.weeks.insert(current_week);
        course.color = Color::random(rng);
        course
    }

    pub fn with_weeks(mut self, weeks: impl IntoIterator<Item = u32>) -> Self {
        self.weeks = weeks.into_iter().collect();
        self
    }

    pub fn with_week_range(self, weeks: RangeInclusive<u32>) -> Self {
        self.with_weeks(weeks)
    }

    pub fn with_teacher(mut self, teacher: impl Into<String>) -> Self {
        self.teacher = Some(teacher.into());
        self
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn occurs_in_week(&self, week: u32) -> bool {
        self.weeks.contains(&week)
    }

    pub fn shares_week_with(&self, other: &Course) -> bool {
        !self.weeks.is_disjoint(&other.weeks)
    }

    pub fn overlaps_periods(&self, other: &Course) -> bool {
        self.start_period <= other.end_period && self.end_period >= other.start_period
    }

    /// Contiguous runs of the week set, e.g. `{1,2,3,5}` gives `1..=3, 5..=5`.
    pub fn week_ranges(&self) -> Vec<RangeInclusive<u32>> {
        let mut ranges: Vec<RangeInclusive<u32>> = Vec::new();
        for &week in &self.weeks {
            match ranges.last_mut() {
                Some(range) if *range.end() + 1 == week => {
                    *range = *range.start()..=week;
                }
                _ => ranges.push(week..=week),
            }
        }
        ranges
    }

    /// Week ranges as `1-3,5`.
    pub fn week_label(&self) -> String {
        self.week_ranges()
            .iter()
            .map(|range| {
                if range.start() == range.end() {
                    range.start().to_string()
                } else {
                    format!("{}-{}", range.start(), range.end())
                }
            })
            .collect::<Vec<_>>()
            .join(",")
    }

    pub fn validate(&self) -> TimetableResult<()> {
        if self.name.trim().is_empty() {
            return Err(TimetableError::validation(format!(
                "course {} needs a name",
                self.id
            )));
        }
        if !(1..=7).contains(&self.day_of_week) {
            return Err(TimetableError::validation(format!(
                "course '{}' has day of week {} (must be 1-7)",
                self.name, self.day_of_week
            )));
        }
        if self.start_period == 0 {
            return Err(TimetableError::validation(format!(
                "course '{}' starts at period 0",
                self.name
            )));
        }
        if self.start_period > self.end_period {
            return Err(TimetableError::validation(format!(
                "course '{}' starts at period {} after it ends at period {}",
                self.name, self.start_period, self.end_period
            )));
        }
        if self.weeks.is_empty() {
            return Err(TimetableError::validation(format!(
                "course '{}' meets in no week",
                self.name
            )));
        }
        if self.weeks.contains(&0) {
            return Err(TimetableError::validation(format!(
                "course '{}' lists week 0",
                self.name
            )));
        }
        Ok(())
    }
}
