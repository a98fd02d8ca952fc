use chrono::{Days, Local, NaiveDate};

/// Teaching week containing `today` for a semester starting on `start`.
/// Days before the start count as week 1. Not clamped to the semester length.
pub fn week_on(start: NaiveDate, today: NaiveDate) -> u32 {
    if today < start {
        return 1;
    }
    let days = (today - start).num_days();
    u32::try_from(days / 7 + 1).unwrap_or(u32::MAX).max(1)
}

/// [`week_on`] for the local calendar date.
pub fn current_week(start: NaiveDate) -> u32 {
    week_on(start, Local::now().date_naive())
}

/// First day of the 1-based `week`, or `None` past the end of the calendar.
pub fn week_start(start: NaiveDate, week: u32) -> Option<NaiveDate> {
    start.checked_add_days(Days::new(u64::from(week.saturating_sub(1)) * 7))
}

/// The seven dates of `week`, beginning with its first day.
pub fn week_dates(start: NaiveDate, week: u32) -> Option<[NaiveDate; 7]> {
    let first = week_start(start, week)?;
    first.checked_add_days(Days::new(6))?;
    Some(std::array::from_fn(|offset| first + Days::new(offset as u64)))
}
