use anyhow::anyhow;
use chrono::{DateTime, Utc};
use tracing::{debug, info};
use uuid::Uuid;

use crate::calendar::Calendar;
use crate::clock::Clock;
use crate::day::DayId;
use crate::task::Task;

/// In-memory task collection. Loading and saving is the datastore's job;
/// the book only keeps the list consistent between the two.
#[derive(Debug, Clone, Default)]
pub struct TaskBook {
    tasks: Vec<Task>,
}

impl TaskBook {
    pub fn new(tasks: Vec<Task>) -> Self {
        Self { tasks }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn live_tasks(&self) -> impl Iterator<Item = &Task> {
        self.tasks.iter().filter(|task| !task.deleted)
    }

    /// Every task dated `day`, deleted ones included.
    pub fn tasks_for_day(&self, day: DayId) -> Vec<&Task> {
        self.tasks.iter().filter(|task| task.date == day).collect()
    }

    /// Looks a task up by full UUID or by a unique prefix of its hex form.
    pub fn find(&self, key: &str) -> anyhow::Result<&Task> {
        let needle = key.trim().to_ascii_lowercase().replace('-', "");
        if needle.is_empty() {
            return Err(anyhow!("task id cannot be empty"));
        }

        let mut matches = self
            .tasks
            .iter()
            .filter(|task| task.id.simple().to_string().starts_with(&needle));

        let first = matches
            .next()
            .ok_or_else(|| anyhow!("no task matches id {key:?}"))?;
        let extra = matches.count();
        if extra > 0 {
            return Err(anyhow!(
                "id {key:?} is ambiguous: {} tasks match",
                extra + 1
            ));
        }
        Ok(first)
    }

    #[tracing::instrument(skip(self, text))]
    pub fn create_task(&mut self, text: &str, day: DayId, now: DateTime<Utc>) -> anyhow::Result<&Task> {
        let text = text.trim();
        if text.is_empty() {
            return Err(anyhow!("task text cannot be empty"));
        }

        let task = Task::new(text.to_string(), day, now);
        info!(id = %task.id, day = %day, "created task");
        self.tasks.push(task);
        let idx = self.tasks.len() - 1;
        Ok(&self.tasks[idx])
    }

    /// Replaces the task with the same id, or appends it.
    pub fn upsert(&mut self, task: Task) {
        match self.tasks.iter().position(|existing| existing.id == task.id) {
            Some(idx) => {
                debug!(id = %task.id, "replacing task");
                self.tasks[idx] = task;
            }
            None => {
                debug!(id = %task.id, "appending task");
                self.tasks.push(task);
            }
        }
    }

    #[tracing::instrument(skip(self))]
    pub fn move_task(&mut self, id: Uuid, day: DayId) -> anyhow::Result<&Task> {
        let task = self.get_mut(id)?;
        let from = task.date;
        task.date = day;
        info!(from = %from, to = %day, "moved task");
        Ok(&*task)
    }

    /// Reassigns the task to exactly `calendar.today()`.
    pub fn move_to_today<C: Clock>(&mut self, id: Uuid, calendar: &Calendar<C>) -> anyhow::Result<&Task> {
        self.move_task(id, calendar.today())
    }

    pub fn set_completed(&mut self, id: Uuid, completed: bool) -> anyhow::Result<&Task> {
        let task = self.get_mut(id)?;
        task.completed = completed;
        debug!(id = %id, completed, "updated completion");
        Ok(&*task)
    }

    pub fn delete_task(&mut self, id: Uuid) -> anyhow::Result<&Task> {
        let task = self.get_mut(id)?;
        task.deleted = true;
        info!(id = %id, "marked task deleted");
        Ok(&*task)
    }

    pub fn purge_deleted(&mut self) -> usize {
        let before = self.tasks.len();
        self.tasks.retain(|task| !task.deleted);
        let removed = before - self.tasks.len();
        info!(before, after = self.tasks.len(), "purged deleted tasks");
        removed
    }

    fn get_mut(&mut self, id: Uuid) -> anyhow::Result<&mut Task> {
        self.tasks
            .iter_mut()
            .find(|task| task.id == id)
            .ok_or_else(|| anyhow!("task not found: {id}"))
    }
}
