use chrono::NaiveDate;
use class_timetable::{
    Block, CommitOutcome, Course, DayBlocks, Schedule, TimeConfig, Timetable, TimetableError,
    find_conflicts, parse_time,
};
use rand::SeedableRng;
use rand::rngs::StdRng;

fn d(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn schedule() -> Schedule {
    Schedule::new("Main", "2025-2026-1", d(2025, 9, 1), 18).unwrap()
}

fn course(name: &str, day: u8, periods: (u32, u32), weeks: std::ops::RangeInclusive<u32>) -> Course {
    Course::new(name, "Room 101", day, periods.0, periods.1).with_week_range(weeks)
}

#[test]
fn week_and_period_overlap_is_a_conflict() {
    let candidate = course("OS", 1, (3, 4), 1..=10);
    let existing = vec![course("Physics", 1, (4, 5), 5..=15)];
    assert_eq!(find_conflicts(&candidate, &existing).len(), 1);

    let moved = course("OS", 1, (1, 2), 1..=10);
    assert!(find_conflicts(&moved, &existing).is_empty());
}

#[test]
fn blocked_commit_leaves_schedule_unchanged() {
    let mut schedule = schedule();
    let physics = course("Physics", 1, (4, 5), 5..=15);
    assert_eq!(schedule.commit_course(physics.clone()).unwrap(), CommitOutcome::Saved);

    let os = course("OS", 1, (3, 4), 1..=10);
    let outcome = schedule.commit_course(os).unwrap();
    assert_eq!(outcome, CommitOutcome::Blocked(vec![physics.clone()]));
    assert_eq!(schedule.courses(), &[physics]);
}

#[test]
fn overwrite_replaces_every_conflicting_course() {
    let mut schedule = schedule();
    let a = course("A", 2, (1, 2), 1..=4);
    let b = course("B", 2, (3, 4), 3..=6);
    let c = course("C", 3, (1, 4), 1..=18);
    for course in [&a, &b, &c] {
        schedule.commit_course(course.clone()).unwrap();
    }

    let wide = course("Wide", 2, (1, 4), 1..=18);
    let removed = schedule.overwrite_course(wide.clone()).unwrap();
    assert_eq!(removed, vec![a, b]);
    assert_eq!(schedule.courses(), &[c, wide]);
}

#[test]
fn editing_a_course_in_place_keeps_its_position() {
    let mut schedule = schedule();
    let first = course("First", 1, (1, 2), 1..=8);
    let second = course("Second", 2, (1, 2), 1..=8);
    schedule.commit_course(first.clone()).unwrap();
    schedule.commit_course(second.clone()).unwrap();

    let mut longer = first.clone();
    longer.end_period = 4;
    longer.location = "Lab".into();
    assert_eq!(schedule.commit_course(longer.clone()).unwrap(), CommitOutcome::Saved);
    assert_eq!(schedule.courses(), &[longer, second]);
}

#[test]
fn invalid_courses_are_rejected_before_conflict_checks() {
    let mut schedule = schedule();
    let inverted = course("Backwards", 1, (4, 3), 1..=2);
    assert!(matches!(
        schedule.commit_course(inverted),
        Err(TimetableError::Validation(_))
    ));

    let past_end = course("Too long", 1, (1, 1), 17..=19);
    assert!(matches!(
        schedule.overwrite_course(past_end),
        Err(TimetableError::Validation(_))
    ));
    assert!(schedule.courses().is_empty());
}

#[test]
fn deleting_unknown_course_is_not_found() {
    let mut schedule = schedule();
    let keep = course("Keep", 1, (1, 1), 1..=1);
    schedule.commit_course(keep.clone()).unwrap();
    assert!(matches!(
        schedule.delete_course(uuid::Uuid::new_v4()),
        Err(TimetableError::NotFound(_))
    ));
    assert_eq!(schedule.delete_course(keep.id).unwrap(), keep);
    assert!(schedule.courses().is_empty());
}

#[test]
fn total_weeks_cannot_cut_off_courses() {
    let mut schedule = schedule();
    schedule.commit_course(course("Late", 4, (1, 2), 14..=16)).unwrap();
    assert!(matches!(
        schedule.set_total_weeks(15),
        Err(TimetableError::Validation(_))
    ));
    assert!(matches!(
        schedule.set_total_weeks(0),
        Err(TimetableError::Validation(_))
    ));
    schedule.set_total_weeks(16).unwrap();
    assert_eq!(schedule.total_weeks(), 16);
    assert!(Schedule::new("Empty", "t", d(2025, 9, 1), 0).is_err());
}

#[test]
fn week_on_is_clamped_to_semester() {
    let schedule = schedule();
    assert_eq!(schedule.week_on(d(2025, 8, 1)), 1);
    assert_eq!(schedule.week_on(d(2025, 9, 10)), 2);
    assert_eq!(schedule.week_on(d(2026, 6, 1)), 18);
}

#[test]
fn zero_week_schedule_from_json_still_answers_week_queries() {
    let json = format!(
        r#"{{"id":"{}","name":"Broken","term":"t","semester_start_date":"2025-09-01","total_weeks":0}}"#,
        uuid::Uuid::new_v4()
    );
    let schedule: Schedule = serde_json::from_str(&json).unwrap();
    assert_eq!(schedule.week_on(d(2025, 9, 20)), 1);
    assert!(matches!(
        schedule.validate(),
        Err(TimetableError::Validation(_))
    ));
}

#[test]
fn empty_cell_draft_lands_in_current_week() {
    let schedule = schedule();
    let mut rng = StdRng::seed_from_u64(42);
    let draft = schedule.draft_course(5, 3, d(2025, 9, 16), &mut rng);
    assert!(draft.occurs_in_week(3));
    assert_eq!(draft.weeks.len(), 1);
    assert_eq!((draft.day_of_week, draft.start_period, draft.end_period), (5, 3, 3));
}

#[test]
fn visible_courses_dim_other_weeks_when_enabled() {
    let mut schedule = schedule();
    let early = course("Early", 1, (1, 2), 1..=4);
    let late = course("Late", 2, (1, 2), 10..=12);
    schedule.commit_course(early.clone()).unwrap();
    schedule.commit_course(late.clone()).unwrap();

    let shown = schedule.visible_courses(2);
    assert_eq!(shown.len(), 2);
    assert!(!shown[0].dimmed);
    assert!(shown[1].dimmed);

    schedule.show_non_current_week_courses = false;
    let shown = schedule.visible_courses(2);
    assert_eq!(shown.len(), 1);
    assert_eq!(shown[0].course.id, early.id);
}

#[test]
fn period_table_follows_day_blocks() {
    let mut schedule = schedule();
    let blocks = DayBlocks::with_counts(&TimeConfig::default(), 2, 0, 1).unwrap();
    schedule.apply_day_blocks(&blocks);
    assert_eq!(schedule.class_period_count(), 3);
    assert_eq!(
        schedule.class_start_times(),
        &[
            parse_time("08:00").unwrap(),
            parse_time("08:55").unwrap(),
            parse_time("09:50").unwrap()
        ]
    );
}

#[test]
fn first_added_schedule_becomes_current() {
    let mut timetable = Timetable::new();
    let first = timetable.add_schedule(schedule()).unwrap();
    let second = timetable.add_schedule(schedule()).unwrap();
    assert_eq!(timetable.current_schedule().map(|s| s.id), Some(first));

    timetable.set_current(second).unwrap();
    assert_eq!(timetable.current_schedule().map(|s| s.id), Some(second));
    assert_eq!(timetable.schedules().iter().filter(|s| s.is_current).count(), 1);
}

#[test]
fn removing_schedules_is_all_or_nothing() {
    let mut timetable = Timetable::new();
    let a = timetable.add_schedule(schedule()).unwrap();
    let b = timetable.add_schedule(schedule()).unwrap();
    let c = timetable.add_schedule(schedule()).unwrap();

    let err = timetable
        .remove_schedules(&[a, uuid::Uuid::new_v4()])
        .unwrap_err();
    assert!(matches!(err, TimetableError::NotFound(_)));
    assert_eq!(timetable.schedules().len(), 3);

    let removed = timetable.remove_schedules(&[a, c]).unwrap();
    assert_eq!(removed.len(), 2);
    assert_eq!(timetable.schedules().len(), 1);
    assert_eq!(timetable.schedules()[0].id, b);
}

#[test]
fn replace_schedule_keeps_current_flag() {
    let mut timetable = Timetable::new();
    let id = timetable.add_schedule(schedule()).unwrap();

    let mut edited = timetable.schedule(id).unwrap().clone();
    edited.name = "Renamed".into();
    edited.is_current = false;
    timetable.replace_schedule(edited).unwrap();

    let stored = timetable.schedule(id).unwrap();
    assert_eq!(stored.name, "Renamed");
    assert!(stored.is_current);
    assert!(matches!(
        timetable.replace_schedule(schedule()),
        Err(TimetableError::NotFound(_))
    ));
}

#[test]
fn timetable_slot_edits_flow_into_every_schedule() {
    let mut timetable = Timetable::new();
    let a = timetable.add_schedule(schedule()).unwrap();
    let b = timetable.add_schedule(schedule()).unwrap();

    timetable.adjust_slot_count(Block::Morning, 2).unwrap();
    timetable.set_lesson_duration(50).unwrap();
    timetable.edit_slot_start(Block::Morning, 1, "09:30").unwrap();

    let expected = vec![parse_time("08:00").unwrap(), parse_time("09:30").unwrap()];
    for id in [a, b] {
        let schedule = timetable.schedule(id).unwrap();
        assert_eq!(schedule.class_period_count(), 2);
        assert_eq!(schedule.class_start_times(), expected.as_slice());
    }
    assert_eq!(timetable.time_config().lesson_duration_minutes, 50);

    let before = timetable.clone();
    assert!(timetable.set_lesson_duration(0).is_err());
    assert!(timetable.edit_slot_start(Block::Morning, 0, "later").is_err());
    assert_eq!(timetable, before);
}

#[test]
fn sample_timetable_is_consistent() {
    let sample = Timetable::sample(d(2024, 9, 2));
    sample.validate().unwrap();
    assert_eq!(sample.schedules().len(), 2);
    assert_eq!(sample.current_schedule().map(|s| s.name.as_str()), Some("我的课表"));
    for schedule in sample.schedules() {
        for course in schedule.courses() {
            assert!(find_conflicts(course, schedule.courses()).is_empty());
        }
    }
}
