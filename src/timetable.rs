use std::collections::HashSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::config::TimeConfig;
use crate::course::{Color, Course};
use crate::error::{TimetableError, TimetableResult};
use crate::schedule::{DEFAULT_SCHEDULE_NAME, Schedule};
use crate::slots::{Block, DayBlocks};
use crate::time::Minutes;

/// Everything a host loads at startup and saves after each edit: the
/// schedules, the lesson and break lengths, and the day's lesson slots.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timetable {
    #[serde(default)]
    schedules: Vec<Schedule>,
    #[serde(default)]
    time_config: TimeConfig,
    #[serde(default)]
    day_blocks: DayBlocks,
}

impl Timetable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_parts(
        schedules: Vec<Schedule>,
        time_config: TimeConfig,
        day_blocks: DayBlocks,
    ) -> TimetableResult<Self> {
        let timetable = Self {
            schedules,
            time_config,
            day_blocks,
        };
        timetable.validate()?;
        Ok(timetable)
    }

    /// Two example schedules for a first launch.
    pub fn sample(semester_start_date: NaiveDate) -> Self {
        let course = |name: &str,
                      location: &str,
                      teacher: &str,
                      weeks: std::ops::RangeInclusive<u32>,
                      day: u8,
                      periods: (u32, u32),
                      color: u32| {
            Course::new(name, location, day, periods.0, periods.1)
                .with_teacher(teacher)
                .with_week_range(weeks)
                .with_color(Color(color))
        };

        let mut primary = Schedule::seeded(DEFAULT_SCHEDULE_NAME, semester_start_date, 18, vec![
            course("软件工程", "教A-101", "张老师", 1..=10, 1, (1, 2), 0xFFF0_6292),
            course("操作系统", "实验B-203", "李教授", 2..=12, 3, (3, 4), 0xFF4D_B6AC),
            course("大学物理", "图书馆-305", "王博士", 5..=15, 5, (6, 7), 0xFF95_75CD),
        ]);
        primary.is_current = true;

        let minor = Schedule::seeded("辅修课表", semester_start_date, 18, vec![
            course("线性代数", "综-C401", "赵老师", 1..=16, 2, (1, 2), 0xFF4F_C3F7),
            course("数据结构", "电-505", "孙老师", 1..=12, 4, (3, 5), 0xFFFF_D54F),
        ]);

        Self {
            schedules: vec![primary, minor],
            time_config: TimeConfig::default(),
            day_blocks: DayBlocks::default(),
        }
    }

    pub fn schedules(&self) -> &[Schedule] {
        &self.schedules
    }

    pub fn time_config(&self) -> TimeConfig {
        self.time_config
    }

    pub fn day_blocks(&self) -> &DayBlocks {
        &self.day_blocks
    }

    pub fn schedule(&self, id: Uuid) -> Option<&Schedule> {
        self.schedules.iter().find(|schedule| schedule.id == id)
    }

    pub fn schedule_mut(&mut self, id: Uuid) -> TimetableResult<&mut Schedule> {
        self.schedules
            .iter_mut()
            .find(|schedule| schedule.id == id)
            .ok_or_else(|| TimetableError::not_found(format!("schedule {id}")))
    }

    pub fn current_schedule(&self) -> Option<&Schedule> {
        self.schedules.iter().find(|schedule| schedule.is_current)
    }

    /// Add a schedule. It becomes the current one when no other schedule is.
    pub fn add_schedule(&mut self, mut schedule: Schedule) -> TimetableResult<Uuid> {
        schedule.validate()?;
        if self.schedule(schedule.id).is_some() {
            return Err(TimetableError::validation(format!(
                "schedule {} already exists",
                schedule.id
            )));
        }
        if schedule.is_current {
            self.clear_current();
        } else if self.current_schedule().is_none() {
            schedule.is_current = true;
        }
        schedule.apply_day_blocks(&self.day_blocks);
        let id = schedule.id;
        info!(schedule = %id, name = %schedule.name, "added schedule");
        self.schedules.push(schedule);
        Ok(id)
    }

    /// Swap in an edited copy of an existing schedule. The current flag is
    /// kept from the stored copy.
    pub fn replace_schedule(&mut self, mut schedule: Schedule) -> TimetableResult<()> {
        schedule.validate()?;
        let blocks = self.day_blocks.clone();
        let slot = self.schedule_mut(schedule.id)?;
        schedule.is_current = slot.is_current;
        schedule.apply_day_blocks(&blocks);
        *slot = schedule;
        Ok(())
    }

    /// Delete every schedule in `ids`. Fails without deleting anything when
    /// an id is unknown.
    pub fn remove_schedules(&mut self, ids: &[Uuid]) -> TimetableResult<Vec<Schedule>> {
        if let Some(missing) = ids.iter().find(|id| self.schedule(**id).is_none()) {
            return Err(TimetableError::not_found(format!("schedule {missing}")));
        }
        let doomed: HashSet<Uuid> = ids.iter().copied().collect();
        let (removed, kept): (Vec<Schedule>, Vec<Schedule>) = std::mem::take(&mut self.schedules)
            .into_iter()
            .partition(|schedule| doomed.contains(&schedule.id));
        self.schedules = kept;
        info!(count = removed.len(), "removed schedules");
        Ok(removed)
    }

    pub fn set_current(&mut self, id: Uuid) -> TimetableResult<()> {
        if self.schedule(id).is_none() {
            return Err(TimetableError::not_found(format!("schedule {id}")));
        }
        for schedule in &mut self.schedules {
            schedule.is_current = schedule.id == id;
        }
        Ok(())
    }

    fn clear_current(&mut self) {
        for schedule in &mut self.schedules {
            schedule.is_current = false;
        }
    }

    fn install_blocks(&mut self, config: TimeConfig, blocks: DayBlocks) {
        for schedule in &mut self.schedules {
            schedule.apply_day_blocks(&blocks);
        }
        self.time_config = config;
        self.day_blocks = blocks;
    }

    pub fn set_lesson_duration(&mut self, minutes: Minutes) -> TimetableResult<()> {
        let config = self.time_config.with_lesson_duration(minutes)?;
        let blocks = self.day_blocks.recalculate(&config)?;
        self.install_blocks(config, blocks);
        Ok(())
    }

    pub fn set_break_duration(&mut self, minutes: Minutes) -> TimetableResult<()> {
        let config = self.time_config.with_break_duration(minutes)?;
        let blocks = self.day_blocks.recalculate(&config)?;
        self.install_blocks(config, blocks);
        Ok(())
    }

    pub fn edit_slot_start(&mut self, block: Block, position: usize, text: &str) -> TimetableResult<()> {
        let config = self.time_config;
        let blocks = self
            .day_blocks
            .edit_slot_start_text(&config, block, position, text)?;
        self.install_blocks(config, blocks);
        Ok(())
    }

    pub fn adjust_slot_count(&mut self, block: Block, delta: i32) -> TimetableResult<()> {
        let config = self.time_config;
        let blocks = self.day_blocks.adjust_slot_count(&config, block, delta)?;
        self.install_blocks(config, blocks);
        Ok(())
    }

    pub fn validate(&self) -> TimetableResult<()> {
        self.time_config.validate()?;
        self.day_blocks.validate()?;
        let mut ids = HashSet::with_capacity(self.schedules.len());
        for schedule in &self.schedules {
            if !ids.insert(schedule.id) {
                return Err(TimetableError::validation(format!(
                    "duplicate schedule id {}",
                    schedule.id
                )));
            }
            schedule.validate()?;
        }
        if self.schedules.iter().filter(|schedule| schedule.is_current).count() > 1 {
            return Err(TimetableError::validation(
                "more than one schedule is marked current",
            ));
        }
        Ok(())
    }
}
