use std::fmt;

use anyhow::anyhow;
use chrono::{
  DateTime,
  Local,
  NaiveDate,
  Utc
};
use chrono_tz::Tz;

pub const TIMEZONE_ENV_VAR: &str =
  "SPREADBOOK_TIMEZONE";

/// Timezone in which instants are turned
/// into calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Zone {
  Local,
  Named(Tz)
}

impl Zone {
  pub fn parse(
    raw: &str
  ) -> anyhow::Result<Self> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
      return Err(anyhow!(
        "timezone cannot be empty"
      ));
    }

    if trimmed
      .eq_ignore_ascii_case("local")
    {
      return Ok(Self::Local);
    }

    trimmed
      .parse::<Tz>()
      .map(Self::Named)
      .map_err(|err| {
        anyhow!(
          "unknown timezone \
           {trimmed:?}: {err}"
        )
      })
  }

  #[must_use]
  pub fn date_of(
    &self,
    instant: DateTime<Utc>
  ) -> NaiveDate {
    match self {
      | Self::Local => {
        instant
          .with_timezone(&Local)
          .date_naive()
      }
      | Self::Named(tz) => {
        instant
          .with_timezone(tz)
          .date_naive()
      }
    }
  }
}

impl fmt::Display for Zone {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>
  ) -> fmt::Result {
    match self {
      | Self::Local => f.write_str("local"),
      | Self::Named(tz) => {
        f.write_str(tz.name())
      }
    }
  }
}

/// Picks the zone from the environment,
/// then the configured value, then the
/// host's local zone.
pub fn resolve_zone(
  configured: Option<&str>
) -> Zone {
  let env =
    std::env::var(TIMEZONE_ENV_VAR).ok();
  resolve_zone_from(
    env.as_deref(),
    configured
  )
}

/// Same precedence as [`resolve_zone`]
/// with the environment value passed in.
/// Unparseable values fall through to the
/// next source.
pub fn resolve_zone_from(
  env: Option<&str>,
  configured: Option<&str>
) -> Zone {
  if let Some(raw) = env
    && let Some(zone) =
      parse_logged(raw, TIMEZONE_ENV_VAR)
  {
    return zone;
  }

  if let Some(raw) = configured
    && let Some(zone) =
      parse_logged(raw, "config")
  {
    return zone;
  }

  tracing::debug!(
    "no timezone configured; using \
     host local zone"
  );
  Zone::Local
}

fn parse_logged(
  raw: &str,
  source: &str
) -> Option<Zone> {
  match Zone::parse(raw) {
    | Ok(zone) => {
      tracing::info!(
        source,
        timezone = %zone,
        "configured planner timezone"
      );
      Some(zone)
    }
    | Err(err) => {
      tracing::error!(
        source,
        timezone = %raw.trim(),
        error = %err,
        "failed to parse timezone id"
      );
      None
    }
  }
}
