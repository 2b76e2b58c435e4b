use chrono::{DateTime, TimeZone, Utc};
use spreadbook_core::{Calendar, DayId, FixedClock, Spread, SpreadNavigator, Task, Zone};

fn instant(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, 0, 0)
        .single()
        .expect("valid instant")
}

fn day(raw: &str) -> DayId {
    DayId::parse(raw).expect("valid day")
}

fn calendar_at(now: DateTime<Utc>, zone: &str) -> Calendar<FixedClock> {
    Calendar::new(FixedClock(now), Zone::parse(zone).expect("zone"))
}

#[test]
fn task_dated_today_lands_on_right_page_of_today_spread() {
    // Late evening in Los Angeles, already tomorrow in UTC.
    let now = instant(2025, 1, 24, 6);
    let calendar = calendar_at(now, "America/Los_Angeles");
    let nav = SpreadNavigator::new(&calendar);

    let spread = nav.today_spread().expect("today spread");
    assert_eq!(spread.right, day("2025-01-23"));

    let task = Task::new("test task".to_string(), calendar.today(), now);
    let placed = nav.tasks_for_spread(spread, std::slice::from_ref(&task));

    assert_eq!(placed.right.len(), 1);
    assert!(placed.left.is_empty());
    assert_eq!(placed.right[0].date, task.date);
}

#[test]
fn literal_spread_places_task_on_matching_page() {
    let now = instant(2026, 10, 19, 12);
    let calendar = calendar_at(now, "UTC");
    let nav = SpreadNavigator::new(&calendar);

    let spread = Spread::new(day("2025-01-22"), day("2025-01-23"));
    let tasks = vec![Task::new("test task".to_string(), day("2025-01-23"), now)];
    let placed = nav.tasks_for_spread(spread, &tasks);

    assert_eq!(placed.right.len(), 1);
    assert!(placed.left.is_empty());
    assert_eq!(placed.right[0].date.to_string(), "2025-01-23");
}

#[test]
fn deleted_tasks_are_hidden_on_both_pages() {
    let now = instant(2025, 5, 5, 12);
    let calendar = calendar_at(now, "UTC");
    let nav = SpreadNavigator::new(&calendar);
    let spread = nav.today_spread().expect("today spread");

    let mut left = Task::new("left".to_string(), spread.left, now);
    let mut right = Task::new("right".to_string(), spread.right, now);
    left.deleted = true;
    right.deleted = true;

    assert!(nav.tasks_for_spread(spread, &[left, right]).is_empty());
}

#[test]
fn month_end_arithmetic_in_leap_and_common_years() {
    let calendar = calendar_at(instant(2025, 1, 1, 0), "UTC");
    assert_eq!(calendar.relative_day(day("2025-02-28"), 1).expect("offset"), day("2025-03-01"));
    assert_eq!(calendar.relative_day(day("2024-02-28"), 1).expect("offset"), day("2024-02-29"));
}

#[test]
fn navigation_preserves_one_day_gap_from_today_spread() {
    let calendar = calendar_at(instant(2024, 12, 30, 9), "Australia/Sydney");
    let nav = SpreadNavigator::new(&calendar);
    let start = nav.today_spread().expect("today spread");

    let mut forward = start;
    let mut backward = start;
    for _ in 0..200 {
        let next = nav.next_spread(forward).expect("next");
        assert_eq!(calendar.days_between(forward.left, next.left), 2);
        forward = next;
        backward = nav.previous_spread(backward).expect("previous");
        assert_eq!(calendar.days_between(forward.left, forward.right), 1);
        assert_eq!(calendar.days_between(backward.left, backward.right), 1);
    }

    assert_eq!(nav.shift(forward, -200).expect("rewind"), start);
    assert_eq!(nav.shift(backward, 200).expect("advance"), start);
}

#[test]
fn descriptions_follow_today() {
    let calendar = calendar_at(instant(2025, 3, 30, 23), "Europe/London");
    let today = calendar.today();
    assert_eq!(today, day("2025-03-31"));

    let describe = |offset| {
        let target = calendar.relative_day(today, offset).expect("offset");
        calendar.describe_relative_to_today(target).to_string()
    };
    assert_eq!(describe(-1), "yesterday");
    assert_eq!(describe(-7), "7 days ago");
    assert_eq!(describe(3), "in 3 days");
    assert_eq!(describe(0), "today");
}
