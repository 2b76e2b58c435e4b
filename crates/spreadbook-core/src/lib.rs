pub mod book;
pub mod calendar;
pub mod cli;
pub mod clock;
pub mod commands;
pub mod config;
pub mod datastore;
pub mod day;
pub mod render;
pub mod spread;
pub mod task;
pub mod zone;

use std::ffi::OsString;

use anyhow::Context;
use clap::Parser;
use tracing::{
  debug,
  info
};

pub use calendar::{
  Calendar,
  RelativeDescription
};
pub use clock::{
  Clock,
  FixedClock,
  SystemClock
};
pub use day::{
  DayError,
  DayId
};
pub use spread::{
  Spread,
  SpreadNavigator,
  SpreadTasks
};
pub use task::{
  Placement,
  Task
};
pub use zone::Zone;

#[tracing::instrument(skip_all)]
pub fn run(
  raw_args: Vec<OsString>
) -> anyhow::Result<()> {
  let cli =
    cli::GlobalCli::parse_from(raw_args);

  cli::init_tracing(
    cli.verbose,
    cli.quiet
  )?;

  info!(
    verbose = cli.verbose,
    quiet = cli.quiet,
    "starting spreadbook CLI"
  );

  let mut cfg = config::Config::load(
    cli.config.as_deref()
  )?;
  cfg.apply_overrides(
    cli
      .rc_overrides
      .into_iter()
      .map(|kv| (kv.key, kv.value))
  );
  debug!(loaded = ?cfg.loaded_file, "resolved configuration");

  let data_dir =
    config::resolve_data_dir(
      &cfg,
      cli.data.as_deref()
    )
    .context(
      "failed to resolve data \
       directory"
    )?;

  let store =
    datastore::DataStore::open(
      &data_dir
    )
    .with_context(|| {
      format!(
        "failed to open datastore at \
         {}",
        data_dir.display()
      )
    })?;

  let zone = zone::resolve_zone(
    cfg.get("timezone").as_deref()
  );
  let calendar =
    Calendar::system(zone);
  let renderer = render::Renderer::new(
    cfg.get_bool("color").unwrap_or(true)
  );

  commands::dispatch(
    &store,
    &renderer,
    &calendar,
    cli.command.unwrap_or_default()
  )?;

  info!("done");
  Ok(())
}
