//! Two-day page windows over the calendar.
//!
//! The entry spread shows yesterday on the left page and today on the right.
//! Moving forward or back shifts both pages by two days, so every spread
//! reached from the entry spread keeps its pages one day apart.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::calendar::Calendar;
use crate::clock::Clock;
use crate::day::{DayError, DayId};
use crate::task::Placement;

const SPREAD_STEP_DAYS: i64 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Spread {
    pub left: DayId,
    pub right: DayId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Left,
    Right,
}

impl Spread {
    /// Any pair is accepted here; only spreads built by the navigator are
    /// guaranteed to be one day apart.
    pub fn new(left: DayId, right: DayId) -> Self {
        Self { left, right }
    }

    pub fn gap(&self) -> i64 {
        self.left.days_until(self.right)
    }

    pub fn page_of(&self, day: DayId) -> Option<Page> {
        if day == self.right {
            Some(Page::Right)
        } else if day == self.left {
            Some(Page::Left)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpreadTasks<'a, T> {
    pub left: Vec<&'a T>,
    pub right: Vec<&'a T>,
}

impl<T> SpreadTasks<'_, T> {
    pub fn is_empty(&self) -> bool {
        self.left.is_empty() && self.right.is_empty()
    }

    pub fn len(&self) -> usize {
        self.left.len() + self.right.len()
    }
}

/// Snapshot of how a spread sits relative to today.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpreadReport {
    pub spread: Spread,
    pub today: DayId,
    pub left_before_right: bool,
    pub days_apart: i64,
    pub left_from_today: i64,
    pub right_from_today: i64,
}

#[derive(Debug, Clone, Copy)]
pub struct SpreadNavigator<'c, C> {
    calendar: &'c Calendar<C>,
}

impl<'c, C: Clock> SpreadNavigator<'c, C> {
    pub fn new(calendar: &'c Calendar<C>) -> Self {
        Self { calendar }
    }

    pub fn today_spread(&self) -> Result<Spread, DayError> {
        let spread = Spread::new(self.calendar.yesterday()?, self.calendar.today());
        debug!(left = %spread.left, right = %spread.right, "built today spread");
        Ok(spread)
    }

    pub fn next_spread(&self, spread: Spread) -> Result<Spread, DayError> {
        self.step(spread, SPREAD_STEP_DAYS)
    }

    pub fn previous_spread(&self, spread: Spread) -> Result<Spread, DayError> {
        self.step(spread, -SPREAD_STEP_DAYS)
    }

    /// Applies `spreads` next (positive) or previous (negative) moves at once.
    pub fn shift(&self, spread: Spread, spreads: i64) -> Result<Spread, DayError> {
        self.step(spread, spreads.saturating_mul(SPREAD_STEP_DAYS))
    }

    /// The spread reachable from [`Self::today_spread`] that shows `day` on
    /// one of its pages.
    #[tracing::instrument(skip(self))]
    pub fn spread_containing(&self, day: DayId) -> Result<Spread, DayError> {
        let entry = self.today_spread()?;
        let distance = self.calendar.days_between(entry.right, day);
        self.shift(entry, (distance + 1).div_euclid(SPREAD_STEP_DAYS))
    }

    /// Splits `tasks` into the two pages by date equality, keeping input order.
    /// Deleted tasks and tasks on other days are left out.
    pub fn tasks_for_spread<'a, T: Placement>(
        &self,
        spread: Spread,
        tasks: &'a [T],
    ) -> SpreadTasks<'a, T> {
        let mut out = SpreadTasks {
            left: Vec::new(),
            right: Vec::new(),
        };

        for task in tasks.iter().filter(|task| !task.is_deleted()) {
            let day = task.day();
            if day == spread.left {
                out.left.push(task);
            }
            if day == spread.right {
                out.right.push(task);
            }
        }

        debug!(
            left = %spread.left,
            right = %spread.right,
            left_count = out.left.len(),
            right_count = out.right.len(),
            "placed tasks on spread"
        );
        out
    }

    pub fn inspect(&self, spread: Spread) -> SpreadReport {
        let today = self.calendar.today();
        let report = SpreadReport {
            spread,
            today,
            left_before_right: spread.left < spread.right,
            days_apart: self.calendar.days_between(spread.left, spread.right),
            left_from_today: self.calendar.days_between(today, spread.left),
            right_from_today: self.calendar.days_between(today, spread.right),
        };
        debug!(?report, "spread inspection");
        report
    }

    fn step(&self, spread: Spread, days: i64) -> Result<Spread, DayError> {
        let moved = Spread::new(
            self.calendar.relative_day(spread.left, days)?,
            self.calendar.relative_day(spread.right, days)?,
        );
        debug!(
            from_left = %spread.left,
            to_left = %moved.left,
            to_right = %moved.right,
            days,
            "moved spread"
        );
        Ok(moved)
    }
}
