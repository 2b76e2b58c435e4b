use std::io::{self, IsTerminal, Write};

use unicode_width::UnicodeWidthStr;

use crate::calendar::Calendar;
use crate::clock::Clock;
use crate::day::DayId;
use crate::spread::{Spread, SpreadTasks};
use crate::task::Task;

#[derive(Debug, Clone)]
pub struct Renderer {
    color: bool,
}

impl Renderer {
    /// Color is only emitted when requested and stdout is a terminal.
    pub fn new(color: bool) -> Self {
        Self {
            color: color && io::stdout().is_terminal(),
        }
    }

    #[tracing::instrument(skip(self, placed, calendar))]
    pub fn print_spread<C: Clock>(
        &self,
        spread: Spread,
        placed: &SpreadTasks<'_, Task>,
        calendar: &Calendar<C>,
    ) -> anyhow::Result<()> {
        let mut out = io::stdout().lock();
        self.write_spread(&mut out, spread, placed, calendar)
    }

    pub fn write_spread<W: Write, C: Clock>(
        &self,
        mut writer: W,
        spread: Spread,
        placed: &SpreadTasks<'_, Task>,
        calendar: &Calendar<C>,
    ) -> anyhow::Result<()> {
        let left = self.page_lines(spread.left, &placed.left, calendar);
        let right = self.page_lines(spread.right, &placed.right, calendar);

        let width = visible_width(&left);

        for idx in 0..left.len().max(right.len()) {
            let cell = left.get(idx).map(String::as_str).unwrap_or("");
            let visible = UnicodeWidthStr::width(strip_ansi(cell).as_str());
            let padding = width.saturating_sub(visible);
            let other = right.get(idx).map(String::as_str).unwrap_or("");

            if idx == 1 {
                writeln!(writer, "{:-<width$}-+-{:-<rw$}", "", "", rw = visible_width(&right))?;
            } else {
                writeln!(writer, "{}{} | {}", cell, " ".repeat(padding), other)?;
            }
        }

        Ok(())
    }

    #[tracing::instrument(skip(self, tasks, calendar))]
    pub fn print_task_list<C: Clock>(&self, tasks: &[&Task], calendar: &Calendar<C>) -> anyhow::Result<()> {
        let mut out = io::stdout().lock();

        let headers = vec![
            "ID".to_string(),
            "Day".to_string(),
            "When".to_string(),
            "Done".to_string(),
            "Text".to_string(),
        ];

        let rows = tasks
            .iter()
            .map(|task| {
                vec![
                    self.paint(&task.short_id(), "33"),
                    task.date.to_string(),
                    calendar.describe_relative_to_today(task.date).to_string(),
                    if task.completed { "x".to_string() } else { String::new() },
                    task.text.clone(),
                ]
            })
            .collect();

        write_table(&mut out, headers, rows)?;
        Ok(())
    }

    fn page_lines<C: Clock>(&self, day: DayId, tasks: &[&Task], calendar: &Calendar<C>) -> Vec<String> {
        let heading = format!("{day} ({})", calendar.describe_relative_to_today(day));
        let heading = if day == calendar.today() {
            self.paint(&heading, "1;36")
        } else {
            self.paint(&heading, "1")
        };

        // Second line is reserved for the rule under the headings.
        let mut lines = vec![heading, String::new()];
        if tasks.is_empty() {
            lines.push("(no tasks)".to_string());
        }
        for task in tasks {
            let marker = if task.completed { "[x]" } else { "[ ]" };
            lines.push(format!("{marker} {} {}", self.paint(&task.short_id(), "33"), task.text));
        }
        lines
    }

    fn paint(&self, text: &str, code: &str) -> String {
        if !self.color {
            return text.to_string();
        }
        format!("\x1b[{code}m{text}\x1b[0m")
    }
}

fn visible_width(lines: &[String]) -> usize {
    lines
        .iter()
        .map(|line| UnicodeWidthStr::width(strip_ansi(line).as_str()))
        .max()
        .unwrap_or(0)
}

fn write_table<W: Write>(
    mut writer: W,
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
) -> anyhow::Result<()> {
    let column_count = headers.len();
    let mut widths = vec![0usize; column_count];

    for (idx, header) in headers.iter().enumerate() {
        widths[idx] = widths[idx].max(UnicodeWidthStr::width(header.as_str()));
    }

    for row in &rows {
        for (idx, cell) in row.iter().enumerate() {
            widths[idx] = widths[idx].max(UnicodeWidthStr::width(strip_ansi(cell).as_str()));
        }
    }

    for idx in 0..column_count {
        write!(writer, "{:width$} ", headers[idx], width = widths[idx])?;
    }
    writeln!(writer)?;

    for width in &widths {
        write!(writer, "{:-<width$} ", "", width = *width)?;
    }
    writeln!(writer)?;

    for row in rows {
        for (idx, cell) in row.iter().enumerate() {
            let visible_width = UnicodeWidthStr::width(strip_ansi(cell).as_str());
            let padding = widths[idx].saturating_sub(visible_width);
            write!(writer, "{}{} ", cell, " ".repeat(padding))?;
        }
        writeln!(writer)?;
    }

    Ok(())
}

fn strip_ansi(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut escaped = false;

    for ch in s.chars() {
        if escaped {
            if ch == 'm' {
                escaped = false;
            }
            continue;
        }

        if ch == '\x1b' {
            escaped = true;
            continue;
        }

        out.push(ch);
    }

    out
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::{Renderer, strip_ansi};
    use crate::calendar::Calendar;
    use crate::clock::FixedClock;
    use crate::day::DayId;
    use crate::spread::SpreadNavigator;
    use crate::task::Task;
    use crate::zone::Zone;

    #[test]
    fn spread_renders_side_by_side() {
        let now = Utc.with_ymd_and_hms(2025, 1, 23, 12, 0, 0).single().expect("valid now");
        let calendar = Calendar::new(FixedClock(now), Zone::parse("UTC").expect("zone"));
        let nav = SpreadNavigator::new(&calendar);
        let spread = nav.today_spread().expect("spread");
        let tasks = vec![Task::new(
            "ship release".to_string(),
            DayId::parse("2025-01-23").expect("day"),
            now,
        )];
        let placed = nav.tasks_for_spread(spread, &tasks);

        let mut buf = Vec::new();
        Renderer::new(false)
            .write_spread(&mut buf, spread, &placed, &calendar)
            .expect("render");
        let text = String::from_utf8(buf).expect("utf8");
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "2025-01-22 (yesterday) | 2025-01-23 (today)");
        assert!(lines[1].starts_with("-----------------------+-"));
        assert!(lines[2].starts_with("(no tasks)"));
        assert!(lines[2].ends_with(&format!("[ ] {} ship release", tasks[0].short_id())));
    }

    #[test]
    fn disabled_color_leaves_text_plain() {
        let renderer = Renderer::new(false);
        assert_eq!(renderer.paint("abc", "33"), "abc");
    }

    #[test]
    fn strips_color_codes() {
        assert_eq!(strip_ansi("\x1b[33mabc\x1b[0m"), "abc");
    }
}
