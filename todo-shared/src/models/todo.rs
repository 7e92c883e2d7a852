/// To-do model
///
/// # Schema
///
/// ```sql
/// CREATE TABLE todos (
///     id UUID PRIMARY KEY,
///     task TEXT NOT NULL CHECK (task <> ''),
///     task_description TEXT NOT NULL CHECK (task_description <> ''),
///     user_id UUID REFERENCES users (id),
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A to-do item as stored and as returned to clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    /// Unique ID (UUID v4)
    pub id: Uuid,

    /// Short task title
    pub task: String,

    /// Longer description
    pub task_description: String,

    /// Owning user
    pub user_id: Option<Uuid>,

    /// When the item was created
    pub created_at: DateTime<Utc>,
}

/// Input for creating a to-do item
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTodo {
    pub task: String,
    pub task_description: String,
    pub user_id: Option<Uuid>,
}

impl CreateTodo {
    /// First required field that is empty, if any
    ///
    /// Both text fields are required; an empty string counts as absent.
    pub fn missing_field(&self) -> Option<&'static str> {
        if self.task.trim().is_empty() {
            Some("task")
        } else if self.task_description.trim().is_empty() {
            Some("taskDescription")
        } else {
            None
        }
    }
}

impl Todo {
    /// Builds a fresh record from creation input, as a store would on insert
    pub fn from_create(data: CreateTodo) -> Self {
        Self {
            id: Uuid::new_v4(),
            task: data.task,
            task_description: data.task_description,
            user_id: data.user_id,
            created_at: Utc::now(),
        }
    }
}
