use std::fs;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, anyhow};
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::task::Task;

const TASKS_FILE: &str = "tasks.data";

/// Task persistence: one JSON object per line in `tasks.data`.
#[derive(Debug)]
pub struct DataStore {
    pub data_dir: PathBuf,
    pub tasks_path: PathBuf,
}

impl DataStore {
    #[tracing::instrument(skip(data_dir))]
    pub fn open(data_dir: &Path) -> anyhow::Result<Self> {
        let data_dir = data_dir.to_path_buf();
        fs::create_dir_all(&data_dir)
            .with_context(|| format!("failed to create {}", data_dir.display()))?;

        let tasks_path = data_dir.join(TASKS_FILE);
        if !tasks_path.exists() {
            fs::write(&tasks_path, "")
                .with_context(|| format!("failed to create {}", tasks_path.display()))?;
        }

        info!(
            data_dir = %data_dir.display(),
            tasks = %tasks_path.display(),
            "opened datastore"
        );

        Ok(Self {
            data_dir,
            tasks_path,
        })
    }

    #[tracing::instrument(skip(self))]
    pub fn load_tasks(&self) -> anyhow::Result<Vec<Task>> {
        load_jsonl(&self.tasks_path).context("failed to load tasks.data")
    }

    #[tracing::instrument(skip(self, tasks))]
    pub fn save_tasks(&self, tasks: &[Task]) -> anyhow::Result<()> {
        save_jsonl_atomic(&self.tasks_path, tasks).context("failed to save tasks.data")
    }
}

#[tracing::instrument(skip(path))]
fn load_jsonl(path: &Path) -> anyhow::Result<Vec<Task>> {
    debug!(file = %path.display(), "loading jsonl");
    let file = fs::File::open(path)?;
    let reader = BufReader::new(file);

    let mut out = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let task: Task = serde_json::from_str(trimmed)
            .with_context(|| format!("failed parsing {} line {}", path.display(), idx + 1))?;
        out.push(task);
    }

    debug!(count = out.len(), "loaded tasks from jsonl");
    Ok(out)
}

#[tracing::instrument(skip(path, tasks))]
fn save_jsonl_atomic(path: &Path, tasks: &[Task]) -> anyhow::Result<()> {
    debug!(file = %path.display(), count = tasks.len(), "saving jsonl atomically");

    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut temp = NamedTempFile::new_in(dir)?;
    for task in tasks {
        let serialized = serde_json::to_string(task)?;
        writeln!(temp, "{serialized}")?;
    }
    temp.flush()?;

    temp.persist(path)
        .map_err(|err| anyhow!("failed to persist {}: {}", path.display(), err))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::fs;

    use chrono::{TimeZone, Utc};
    use tempfile::tempdir;

    use super::DataStore;
    use crate::day::DayId;
    use crate::task::Task;

    #[test]
    fn open_creates_empty_store() {
        let temp = tempdir().expect("tempdir");
        let store = DataStore::open(&temp.path().join("nested")).expect("open datastore");
        assert!(store.tasks_path.exists());
        assert!(store.load_tasks().expect("load").is_empty());
    }

    #[test]
    fn reports_line_of_bad_record() {
        let temp = tempdir().expect("tempdir");
        let store = DataStore::open(temp.path()).expect("open datastore");
        let now = Utc.with_ymd_and_hms(2025, 1, 23, 8, 0, 0).single().expect("valid now");
        let task = Task::new("ok".to_string(), DayId::parse("2025-01-23").expect("day"), now);
        let good = serde_json::to_string(&task).expect("serialize");
        let bad = good.replace("2025-01-23", "2025-1-23");
        fs::write(&store.tasks_path, format!("{good}\n\n{bad}\n")).expect("write");

        let err = store.load_tasks().expect_err("malformed day must fail");
        assert!(format!("{err:#}").contains("line 3"), "{err:#}");
    }

    #[test]
    fn missing_flags_default_to_false() {
        let temp = tempdir().expect("tempdir");
        let store = DataStore::open(temp.path()).expect("open datastore");
        fs::write(
            &store.tasks_path,
            r#"{"id":"67e55044-10b1-426f-9247-bb680e5fe0c8","text":"legacy","date":"2025-01-22","created_at":"2025-01-20T10:00:00Z"}"#,
        )
        .expect("write");

        let tasks = store.load_tasks().expect("load");
        assert_eq!(tasks.len(), 1);
        assert!(!tasks[0].deleted);
        assert!(!tasks[0].completed);
        assert_eq!(tasks[0].date.to_string(), "2025-01-22");
    }
}
