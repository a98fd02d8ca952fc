//! Lesson slots grouped into the three blocks of a teaching day, and the
//! cascade that keeps their start and end times chained together.
//!
//! Every operation here takes `&self` and returns a fresh [`DayBlocks`]; on
//! error the receiver is untouched and nothing is returned.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::TimeConfig;
use crate::error::{TimetableError, TimetableResult};
use crate::time::{self, MINUTES_PER_DAY, Minutes};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Block {
    Morning,
    Afternoon,
    Evening,
}

impl Block {
    pub const ALL: [Block; 3] = [Block::Morning, Block::Afternoon, Block::Evening];

    pub fn index(self) -> usize {
        match self {
            Block::Morning => 0,
            Block::Afternoon => 1,
            Block::Evening => 2,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Start of the block's first lesson when no earlier block has any.
    pub fn default_start(self) -> Minutes {
        match self {
            Block::Morning => 8 * 60,
            Block::Afternoon => 13 * 60,
            Block::Evening => 18 * 60,
        }
    }

    fn preceding(self) -> &'static [Block] {
        match self {
            Block::Morning => &[],
            Block::Afternoon => &[Block::Morning],
            Block::Evening => &[Block::Morning, Block::Afternoon],
        }
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Block::Morning => "morning",
            Block::Afternoon => "afternoon",
            Block::Evening => "evening",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LessonSlot {
    pub number: u32,
    #[serde(with = "time::clock")]
    pub start: Minutes,
    #[serde(with = "time::clock")]
    pub end: Minutes,
}

impl LessonSlot {
    pub fn new(number: u32, start: Minutes, end: Minutes) -> Self {
        Self { number, start, end }
    }

    pub fn start_text(&self) -> String {
        time::format_time(self.start)
    }

    pub fn end_text(&self) -> String {
        time::format_time(self.end)
    }
}

/// The morning, afternoon and evening slot sequences of one timetable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayBlocks {
    #[serde(default)]
    morning: Vec<LessonSlot>,
    #[serde(default)]
    afternoon: Vec<LessonSlot>,
    #[serde(default)]
    evening: Vec<LessonSlot>,
}

impl DayBlocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap slot sequences supplied by a host. Times are taken as given as
    /// long as they fall within the day; numbers must be unique and nonzero.
    pub fn from_blocks(
        morning: Vec<LessonSlot>,
        afternoon: Vec<LessonSlot>,
        evening: Vec<LessonSlot>,
    ) -> TimetableResult<Self> {
        let blocks = Self {
            morning,
            afternoon,
            evening,
        };
        blocks.validate()?;
        Ok(blocks)
    }

    /// Build a day with the given number of lessons per block, laid out from
    /// the default anchors.
    pub fn with_counts(
        config: &TimeConfig,
        morning: usize,
        afternoon: usize,
        evening: usize,
    ) -> TimetableResult<Self> {
        let mut blocks = Self::new();
        for (block, count) in Block::ALL.into_iter().zip([morning, afternoon, evening]) {
            for _ in 0..count {
                blocks = blocks.append_slot(config, block)?;
            }
        }
        Ok(blocks)
    }

    pub fn block(&self, block: Block) -> &[LessonSlot] {
        match block {
            Block::Morning => &self.morning,
            Block::Afternoon => &self.afternoon,
            Block::Evening => &self.evening,
        }
    }

    fn block_mut(&mut self, block: Block) -> &mut Vec<LessonSlot> {
        match block {
            Block::Morning => &mut self.morning,
            Block::Afternoon => &mut self.afternoon,
            Block::Evening => &mut self.evening,
        }
    }

    pub fn is_empty(&self) -> bool {
        Block::ALL.iter().all(|block| self.block(*block).is_empty())
    }

    /// All slots in teaching order: morning, afternoon, evening.
    pub fn slots(&self) -> impl Iterator<Item = (Block, &LessonSlot)> + '_ {
        Block::ALL
            .into_iter()
            .flat_map(move |block| self.block(block).iter().map(move |slot| (block, slot)))
    }

    pub fn period_count(&self) -> u32 {
        self.slots().count() as u32
    }

    /// Start times of every period, in teaching order.
    pub fn class_start_times(&self) -> Vec<Minutes> {
        self.slots().map(|(_, slot)| slot.start).collect()
    }

    /// Start and end of the 1-based `period`, counted across all blocks.
    pub fn period_time(&self, period: u32) -> Option<(Minutes, Minutes)> {
        let index = usize::try_from(period).ok()?.checked_sub(1)?;
        self.slots()
            .nth(index)
            .map(|(_, slot)| (slot.start, slot.end))
    }

    pub fn position_of(&self, number: u32) -> Option<(Block, usize)> {
        Block::ALL.into_iter().find_map(|block| {
            self.block(block)
                .iter()
                .position(|slot| slot.number == number)
                .map(|position| (block, position))
        })
    }

    fn next_number(&self) -> u32 {
        self.slots().map(|(_, slot)| slot.number).max().unwrap_or(0) + 1
    }

    /// Where `block` starts when it has no slots of its own: right after the
    /// nearest earlier block that has any, else the block's default.
    pub fn anchor(&self, block: Block, config: &TimeConfig) -> Minutes {
        block
            .preceding()
            .iter()
            .rev()
            .find_map(|previous| self.block(*previous).last())
            .map(|slot| slot.end + config.break_duration_minutes)
            .unwrap_or_else(|| block.default_start())
    }

    /// Recompute every slot from the anchors under `config`. No previous time
    /// survives.
    pub fn recalculate(&self, config: &TimeConfig) -> TimetableResult<Self> {
        config.validate()?;
        let mut next = self.clone();
        next.cascade_all(config);
        next.ensure_within_day()?;
        debug!(
            periods = next.period_count(),
            lesson = config.lesson_duration_minutes,
            pause = config.break_duration_minutes,
            "recalculated all lesson times"
        );
        Ok(next)
    }

    /// Set the start of the slot at `position` in `block` and push the change
    /// forward. Slots before it keep their times.
    pub fn edit_slot_start(
        &self,
        config: &TimeConfig,
        block: Block,
        position: usize,
        start: Minutes,
    ) -> TimetableResult<Self> {
        config.validate()?;
        if start >= MINUTES_PER_DAY {
            return Err(TimetableError::validation(format!(
                "start minute {start} is not a time of day"
            )));
        }
        if position >= self.block(block).len() {
            return Err(TimetableError::not_found(format!(
                "{block} block has no lesson at position {position}"
            )));
        }
        let mut next = self.clone();
        next.cascade_from(config, block, position, start);
        next.ensure_within_day()?;
        debug!(%block, position, start = %time::format_time(start), "edited lesson start");
        Ok(next)
    }

    /// Like [`DayBlocks::edit_slot_start`], taking the user's `HH:MM` text.
    pub fn edit_slot_start_text(
        &self,
        config: &TimeConfig,
        block: Block,
        position: usize,
        text: &str,
    ) -> TimetableResult<Self> {
        let start = time::parse_time(text)?;
        self.edit_slot_start(config, block, position, start)
    }

    /// Add a lesson at the end of `block`. Later blocks are shifted if they
    /// chain from it.
    pub fn append_slot(&self, config: &TimeConfig, block: Block) -> TimetableResult<Self> {
        config.validate()?;
        let number = self.next_number();
        let start = match self.block(block).last() {
            Some(last) => last.end + config.break_duration_minutes,
            None => self.anchor(block, config),
        };

        let mut next = self.clone();
        let slots = next.block_mut(block);
        slots.push(LessonSlot::new(
            number,
            start,
            start + config.lesson_duration_minutes,
        ));
        let position = slots.len() - 1;
        next.cascade_from(config, block, position, start);
        next.ensure_within_day()?;
        debug!(%block, number, start = %time::format_time(start), "appended lesson");
        Ok(next)
    }

    /// Drop the final lesson of `block`, then recompute the whole day.
    pub fn remove_last_slot(&self, config: &TimeConfig, block: Block) -> TimetableResult<Self> {
        config.validate()?;
        let mut next = self.clone();
        let removed = next.block_mut(block).pop().ok_or_else(|| {
            TimetableError::not_found(format!("{block} block has no lessons to remove"))
        })?;
        next.cascade_all(config);
        next.ensure_within_day()?;
        debug!(%block, number = removed.number, "removed last lesson");
        Ok(next)
    }

    /// Apply `delta` appends (positive) or removals (negative) to `block` as a
    /// single step.
    pub fn adjust_slot_count(
        &self,
        config: &TimeConfig,
        block: Block,
        delta: i32,
    ) -> TimetableResult<Self> {
        let mut next = self.clone();
        for _ in 0..delta.unsigned_abs() {
            next = if delta > 0 {
                next.append_slot(config, block)?
            } else {
                next.remove_last_slot(config, block)?
            };
        }
        Ok(next)
    }

    fn cascade_all(&mut self, config: &TimeConfig) {
        let first = Block::ALL
            .into_iter()
            .find(|block| !self.block(*block).is_empty());
        if let Some(block) = first {
            let start = self.anchor(block, config);
            self.cascade_from(config, block, 0, start);
        }
    }

    fn cascade_from(&mut self, config: &TimeConfig, block: Block, position: usize, start: Minutes) {
        let mut next_start = start;
        let mut offset = position;
        for current in Block::ALL.into_iter().skip(block.index()) {
            for slot in self.block_mut(current).iter_mut().skip(offset) {
                slot.start = next_start;
                slot.end = next_start + config.lesson_duration_minutes;
                next_start = slot.end + config.break_duration_minutes;
            }
            offset = 0;
        }
    }

    fn ensure_within_day(&self) -> TimetableResult<()> {
        if let Some((_, slot)) = self.slots().find(|(_, slot)| slot.end > MINUTES_PER_DAY) {
            warn!(number = slot.number, end = slot.end, "lesson runs past midnight");
            return Err(TimetableError::DayOverflow {
                number: slot.number,
                end: slot.end,
            });
        }
        Ok(())
    }

    /// Check numbering and that every time lies within the day.
    pub(crate) fn validate(&self) -> TimetableResult<()> {
        let mut seen = HashSet::new();
        for (block, slot) in self.slots() {
            if slot.start > MINUTES_PER_DAY || slot.end > MINUTES_PER_DAY {
                return Err(TimetableError::validation(format!(
                    "lesson {} in the {block} block is not within the day",
                    slot.number
                )));
            }
            if slot.number == 0 {
                return Err(TimetableError::validation(format!(
                    "{block} block has a lesson numbered 0"
                )));
            }
            if !seen.insert(slot.number) {
                return Err(TimetableError::validation(format!(
                    "lesson number {} is used more than once",
                    slot.number
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> TimeConfig {
        TimeConfig::default()
    }

    #[test]
    fn anchor_chains_from_nearest_non_empty_block() {
        let blocks = DayBlocks::from_blocks(vec![LessonSlot::new(1, 480, 525)], vec![], vec![]).unwrap();
        assert_eq!(blocks.anchor(Block::Morning, &config()), 480);
        assert_eq!(blocks.anchor(Block::Afternoon, &config()), 535);
        assert_eq!(blocks.anchor(Block::Evening, &config()), 535);
    }

    #[test]
    fn anchor_falls_back_to_block_default() {
        let blocks = DayBlocks::new();
        assert_eq!(blocks.anchor(Block::Afternoon, &config()), 13 * 60);
        assert_eq!(blocks.anchor(Block::Evening, &config()), 18 * 60);
    }

    #[test]
    fn from_blocks_rejects_duplicate_numbers() {
        let result = DayBlocks::from_blocks(
            vec![LessonSlot::new(1, 480, 525)],
            vec![LessonSlot::new(1, 780, 825)],
            vec![],
        );
        assert!(matches!(result, Err(TimetableError::Validation(_))));
    }

    #[test]
    fn from_blocks_rejects_times_past_the_day() {
        let result = DayBlocks::from_blocks(
            vec![LessonSlot::new(1, 0, u32::MAX - 3)],
            vec![],
            vec![],
        );
        assert!(matches!(result, Err(TimetableError::Validation(_))));

        let late_start = DayBlocks::from_blocks(
            vec![],
            vec![],
            vec![LessonSlot::new(1, MINUTES_PER_DAY + 1, MINUTES_PER_DAY)],
        );
        assert!(matches!(late_start, Err(TimetableError::Validation(_))));

        let ends_at_midnight =
            DayBlocks::from_blocks(vec![LessonSlot::new(1, 1395, MINUTES_PER_DAY)], vec![], vec![]);
        assert!(ends_at_midnight.is_ok());
    }

    #[test]
    fn period_time_counts_across_blocks() {
        let blocks = DayBlocks::with_counts(&config(), 1, 1, 0).unwrap();
        assert_eq!(blocks.period_time(1), Some((480, 525)));
        assert_eq!(blocks.period_time(2), Some((535, 580)));
        assert_eq!(blocks.period_time(0), None);
        assert_eq!(blocks.period_time(3), None);
    }

    #[test]
    fn slots_serialize_as_clock_text() {
        let slot = LessonSlot::new(3, 535, 580);
        let json = serde_json::to_string(&slot).unwrap();
        assert_eq!(json, r#"{"number":3,"start":"08:55","end":"09:40"}"#);
        let back: LessonSlot = serde_json::from_str(&json).unwrap();
        assert_eq!(back, slot);
    }

    #[test]
    fn midnight_end_survives_serialization() {
        let slot = LessonSlot::new(9, 1395, MINUTES_PER_DAY);
        let json = serde_json::to_string(&slot).unwrap();
        assert!(json.contains(r#""end":"24:00""#));
        assert_eq!(serde_json::from_str::<LessonSlot>(&json).unwrap(), slot);
    }
}
