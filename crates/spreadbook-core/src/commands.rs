use std::io::{self, Write};

use anyhow::Context;
use tracing::{debug, info, instrument};

use crate::book::TaskBook;
use crate::calendar::Calendar;
use crate::cli::Command;
use crate::clock::Clock;
use crate::datastore::DataStore;
use crate::render::Renderer;
use crate::spread::SpreadNavigator;

#[instrument(skip(store, renderer, calendar))]
pub fn dispatch<C: Clock>(
    store: &DataStore,
    renderer: &Renderer,
    calendar: &Calendar<C>,
    command: Command,
) -> anyhow::Result<()> {
    let mut book = TaskBook::new(store.load_tasks()?);
    debug!(tasks = book.tasks().len(), today = %calendar.today(), "loaded task book");

    let dirty = match command {
        Command::Show { spreads, at } => {
            let nav = SpreadNavigator::new(calendar);
            let base = match at {
                Some(expr) => nav.spread_containing(calendar.parse_day_expr(&expr)?)?,
                None => nav.today_spread()?,
            };
            let spread = nav.shift(base, spreads)?;
            let placed = nav.tasks_for_spread(spread, book.tasks());
            renderer.print_spread(spread, &placed, calendar)?;
            false
        }
        Command::Add { day, text } => {
            let day = match day {
                Some(expr) => calendar.parse_day_expr(&expr)?,
                None => calendar.today(),
            };
            let task = book.create_task(&text.join(" "), day, calendar.now())?;
            say(&format!("Created task {} on {}.", task.short_id(), task.date))?;
            true
        }
        Command::Move { id, day } => {
            let target = calendar.parse_day_expr(&day)?;
            let id = book.find(&id)?.id;
            let task = book.move_task(id, target)?;
            say(&format!(
                "Moved task {} to {} ({}).",
                task.short_id(),
                task.date,
                calendar.describe_relative_to_today(task.date)
            ))?;
            true
        }
        Command::Done { id } => {
            let id = book.find(&id)?.id;
            let task = book.set_completed(id, true)?;
            say(&format!("Completed task {}.", task.short_id()))?;
            true
        }
        Command::Undone { id } => {
            let id = book.find(&id)?.id;
            let task = book.set_completed(id, false)?;
            say(&format!("Reopened task {}.", task.short_id()))?;
            true
        }
        Command::Delete { id } => {
            let id = book.find(&id)?.id;
            let task = book.delete_task(id)?;
            say(&format!("Deleted task {}.", task.short_id()))?;
            true
        }
        Command::Purge => {
            let removed = book.purge_deleted();
            say(&format!("Purged {removed} deleted task(s)."))?;
            removed > 0
        }
        Command::List { day } => {
            let mut tasks: Vec<_> = match day {
                Some(expr) => {
                    let day = calendar.parse_day_expr(&expr)?;
                    book.tasks_for_day(day).into_iter().filter(|task| !task.deleted).collect()
                }
                None => book.live_tasks().collect(),
            };
            tasks.sort_by_key(|task| task.date);
            renderer.print_task_list(&tasks, calendar)?;
            false
        }
        Command::Describe { day } => {
            let day = calendar.parse_day_expr(&day)?;
            say(&format!("{day}: {}", calendar.describe_relative_to_today(day)))?;
            false
        }
    };

    if dirty {
        store
            .save_tasks(book.tasks())
            .with_context(|| format!("failed to save tasks in {}", store.data_dir.display()))?;
        info!(tasks = book.tasks().len(), "saved task book");
    }

    Ok(())
}

fn say(message: &str) -> anyhow::Result<()> {
    let mut out = io::stdout().lock();
    writeln!(out, "{message}")?;
    Ok(())
}
