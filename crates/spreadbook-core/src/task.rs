use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::day::DayId;

/// What the spread navigator needs to know about anything it places on a page.
pub trait Placement {
    fn day(&self) -> DayId;
    fn is_deleted(&self) -> bool;
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Task {
    pub id: Uuid,

    pub text: String,

    #[serde(default)]
    pub completed: bool,

    pub date: DayId,

    #[serde(default)]
    pub deleted: bool,

    pub created_at: DateTime<Utc>,
}

impl Task {
    pub fn new(text: String, date: DayId, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            text,
            completed: false,
            date,
            deleted: false,
            created_at: now,
        }
    }

    pub fn short_id(&self) -> String {
        self.id.simple().to_string()[..8].to_string()
    }
}

impl Placement for Task {
    fn day(&self) -> DayId {
        self.date
    }

    fn is_deleted(&self) -> bool {
        self.deleted
    }
}
