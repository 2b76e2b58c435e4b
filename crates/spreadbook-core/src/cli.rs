use std::io::IsTerminal;
use std::path::PathBuf;

use anyhow::anyhow;
use clap::{ArgAction, Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone)]
pub struct KeyVal {
    pub key: String,
    pub value: String,
}

impl std::str::FromStr for KeyVal {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (k, v) = s
            .split_once('=')
            .ok_or_else(|| anyhow!("expected KEY=VALUE, got: {s}"))?;
        Ok(Self {
            key: k.trim().to_string(),
            value: v.trim().to_string(),
        })
    }
}

#[derive(Parser, Debug, Clone)]
#[command(
    name = "spreadbook",
    version,
    about = "Spreadbook: a two-page day planner",
    disable_help_subcommand = true
)]
pub struct GlobalCli {
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[arg(short = 'q', long = "quiet", action = ArgAction::Count, global = true)]
    pub quiet: u8,

    #[arg(
        long = "rc",
        value_parser = clap::builder::ValueParser::new(|s: &str| s.parse::<KeyVal>()),
        action = ArgAction::Append
    )]
    pub rc_overrides: Vec<KeyVal>,

    #[arg(long = "config")]
    pub config: Option<PathBuf>,

    #[arg(long = "data")]
    pub data: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Show a spread; defaults to yesterday and today.
    Show {
        /// Move this many spreads forward (negative moves back).
        #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
        spreads: i64,

        /// Open the spread that contains this day.
        #[arg(long, allow_hyphen_values = true)]
        at: Option<String>,
    },

    /// Add a task (to today unless --day is given).
    Add {
        #[arg(long, allow_hyphen_values = true)]
        day: Option<String>,

        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },

    /// Reassign a task to another day.
    Move {
        id: String,

        #[arg(allow_hyphen_values = true)]
        day: String,
    },

    Done {
        id: String,
    },

    Undone {
        id: String,
    },

    /// Mark a task deleted; it stays on disk until `purge`.
    Delete {
        id: String,
    },

    Purge,

    List {
        #[arg(long, allow_hyphen_values = true)]
        day: Option<String>,
    },

    /// Describe a day relative to today.
    Describe {
        #[arg(allow_hyphen_values = true)]
        day: String,
    },
}

impl Default for Command {
    fn default() -> Self {
        Self::Show {
            spreads: 0,
            at: None,
        }
    }
}

pub fn init_tracing(verbose: u8, quiet: u8) -> anyhow::Result<()> {
    let default_level = if quiet >= 2 {
        "error"
    } else if quiet == 1 {
        "warn"
    } else if verbose >= 3 {
        "trace"
    } else if verbose == 2 {
        "debug"
    } else if verbose == 1 {
        "info"
    } else {
        "warn"
    };

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .map_err(|e| anyhow!("invalid RUST_LOG / log filter: {e}"))?;

    let init_result = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_level(true)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .try_init();

    if let Err(err) = init_result {
        debug!(error = %err, "tracing subscriber already set, continuing");
    }

    Ok(())
}
