//! Personal task list.
//!
//! The whole list is stored as one JSON array; every mutation rewrites it.
//! New tasks go to the front.

use crate::{FeatureError, FeatureResult};
use chrono::{DateTime, NaiveDate};
use local_store::{LocalStoreExt, SharedStore, StorageError, StorageKeys};
use parking_lot::Mutex;
use serde::{de, Deserialize, Deserializer, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub text: String,
    pub completed: bool,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_due_date"
    )]
    pub due_date: Option<NaiveDate>,
}

/// Accepts `2024-05-01` as well as full RFC 3339 timestamps.
fn deserialize_due_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(raw) = Option::<String>::deserialize(deserializer)? else {
        return Ok(None);
    };
    NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(&raw).ok().map(|dt| dt.date_naive()))
        .map(Some)
        .ok_or_else(|| de::Error::custom(format!("invalid due date '{}'", raw)))
}

fn normalize_text(text: &str) -> FeatureResult<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(FeatureError::EmptyTaskText);
    }
    Ok(trimmed.to_string())
}

/// Ordered task list persisted under [`StorageKeys::TASKS`].
pub struct TaskManager {
    store: SharedStore,
    tasks: Mutex<Vec<Task>>,
}

impl TaskManager {
    /// Load the stored list. An unreadable list is discarded.
    pub fn load(store: SharedStore) -> FeatureResult<Self> {
        let tasks = match store.get_json::<Vec<Task>>(StorageKeys::TASKS) {
            Ok(tasks) => tasks.unwrap_or_default(),
            Err(StorageError::Encoding { key, source }) => {
                warn!(key = %key, error = %source, "Discarding unreadable task list");
                Vec::new()
            }
            Err(e) => return Err(e.into()),
        };
        debug!(count = tasks.len(), "Loaded tasks");
        Ok(Self {
            store,
            tasks: Mutex::new(tasks),
        })
    }

    /// All tasks, newest first.
    pub fn tasks(&self) -> Vec<Task> {
        self.tasks.lock().clone()
    }

    pub fn pending(&self) -> Vec<Task> {
        self.tasks.lock().iter().filter(|t| !t.completed).cloned().collect()
    }

    pub fn completed(&self) -> Vec<Task> {
        self.tasks.lock().iter().filter(|t| t.completed).cloned().collect()
    }

    pub fn add(&self, text: &str, due_date: Option<NaiveDate>) -> FeatureResult<Task> {
        let task = Task {
            id: Uuid::new_v4().to_string(),
            text: normalize_text(text)?,
            completed: false,
            due_date,
        };
        self.update(|tasks| {
            tasks.insert(0, task.clone());
            Ok(())
        })?;
        debug!(id = %task.id, "Task added");
        Ok(task)
    }

    /// Flip the completion flag.
    pub fn toggle(&self, id: &str) -> FeatureResult<Task> {
        self.update_one(id, |task| {
            task.completed = !task.completed;
            Ok(())
        })
    }

    pub fn edit(&self, id: &str, text: &str) -> FeatureResult<Task> {
        let text = normalize_text(text)?;
        self.update_one(id, move |task| {
            task.text = text;
            Ok(())
        })
    }

    pub fn delete(&self, id: &str) -> FeatureResult<()> {
        self.update(|tasks| {
            let before = tasks.len();
            tasks.retain(|t| t.id != id);
            if tasks.len() == before {
                return Err(FeatureError::TaskNotFound(id.to_string()));
            }
            Ok(())
        })?;
        debug!(id, "Task deleted");
        Ok(())
    }

    fn update_one<F>(&self, id: &str, change: F) -> FeatureResult<Task>
    where
        F: FnOnce(&mut Task) -> FeatureResult<()>,
    {
        let mut updated = None;
        self.update(|tasks| {
            let task = tasks
                .iter_mut()
                .find(|t| t.id == id)
                .ok_or_else(|| FeatureError::TaskNotFound(id.to_string()))?;
            change(task)?;
            updated = Some(task.clone());
            Ok(())
        })?;
        updated.ok_or_else(|| FeatureError::TaskNotFound(id.to_string()))
    }

    /// Apply `change` to a copy, persist it, then commit.
    fn update<F>(&self, change: F) -> FeatureResult<()>
    where
        F: FnOnce(&mut Vec<Task>) -> FeatureResult<()>,
    {
        let mut tasks = self.tasks.lock();
        let mut next = tasks.clone();
        change(&mut next)?;
        self.store.set_json(StorageKeys::TASKS, &next)?;
        *tasks = next;
        Ok(())
    }
}
