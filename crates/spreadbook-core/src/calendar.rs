use std::fmt;
use std::sync::LazyLock;

use anyhow::{Context, anyhow};
use chrono::{DateTime, Utc};
use regex::Regex;

use crate::clock::{Clock, SystemClock};
use crate::day::{DayError, DayId};
use crate::zone::Zone;

static RELATIVE_DAY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<sign>[+-])(?P<num>\d+)d$").expect("relative day pattern compiles")
});

/// Single source of "what day is it" and of day arithmetic.
///
/// Callers only ever see [`DayId`]s; instants stay inside the calendar and
/// are converted through [`DayId::from_instant`].
#[derive(Debug, Clone)]
pub struct Calendar<C = SystemClock> {
    clock: C,
    zone: Zone,
}

impl Calendar<SystemClock> {
    pub fn system(zone: Zone) -> Self {
        Self::new(SystemClock, zone)
    }
}

impl<C: Clock> Calendar<C> {
    pub fn new(clock: C, zone: Zone) -> Self {
        Self { clock, zone }
    }

    /// The clock's current instant, for timestamps such as `created_at`.
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub fn today(&self) -> DayId {
        DayId::from_instant(self.clock.now(), &self.zone)
    }

    pub fn yesterday(&self) -> Result<DayId, DayError> {
        self.relative_day(self.today(), -1)
    }

    pub fn tomorrow(&self) -> Result<DayId, DayError> {
        self.relative_day(self.today(), 1)
    }

    pub fn relative_day(&self, reference: DayId, offset_days: i64) -> Result<DayId, DayError> {
        reference.offset(offset_days)
    }

    /// `b` minus `a` in whole days; positive when `b` is later.
    pub fn days_between(&self, a: DayId, b: DayId) -> i64 {
        a.days_until(b)
    }

    pub fn describe_relative_to_today(&self, day: DayId) -> RelativeDescription {
        RelativeDescription::from_difference(self.days_between(self.today(), day))
    }

    /// Resolves `today`, `yesterday`, `tomorrow`, `+Nd`/`-Nd` (relative to
    /// today) or a literal `YYYY-MM-DD`.
    #[tracing::instrument(skip(self))]
    pub fn parse_day_expr(&self, input: &str) -> anyhow::Result<DayId> {
        let token = input.trim();

        match token.to_ascii_lowercase().as_str() {
            "today" => return Ok(self.today()),
            "yesterday" => return Ok(self.yesterday()?),
            "tomorrow" => return Ok(self.tomorrow()?),
            _ => {}
        }

        if let Some(caps) = RELATIVE_DAY_RE.captures(token) {
            let num: i64 = caps
                .name("num")
                .map(|m| m.as_str())
                .ok_or_else(|| anyhow!("missing relative amount"))?
                .parse()
                .context("invalid relative number")?;
            let offset = match caps.name("sign").map(|m| m.as_str()) {
                Some("-") => -num,
                _ => num,
            };
            return Ok(self.relative_day(self.today(), offset)?);
        }

        DayId::parse(token)
            .map_err(anyhow::Error::from)
            .with_context(|| {
                format!(
                    "unrecognized day expression {input:?}; supported forms: \
                     today/yesterday/tomorrow, +Nd/-Nd, YYYY-MM-DD"
                )
            })
    }
}

/// Human description of a day relative to today.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelativeDescription {
    Today,
    Yesterday,
    Tomorrow,
    DaysAgo(u64),
    InDays(u64),
}

impl RelativeDescription {
    pub fn from_difference(days: i64) -> Self {
        match days {
            0 => Self::Today,
            -1 => Self::Yesterday,
            1 => Self::Tomorrow,
            d if d < 0 => Self::DaysAgo(d.unsigned_abs()),
            d => Self::InDays(d.unsigned_abs()),
        }
    }
}

impl fmt::Display for RelativeDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Today => f.write_str("today"),
            Self::Yesterday => f.write_str("yesterday"),
            Self::Tomorrow => f.write_str("tomorrow"),
            Self::DaysAgo(k) => write!(f, "{k} days ago"),
            Self::InDays(k) => write!(f, "in {k} days"),
        }
    }
}
