//! Task model definitions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

/// A task record owned by a single user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: Uuid,
    pub description: String,
    pub completed: bool,
    /// Logical date of the task, used for range filtering
    pub date: DateTime<Utc>,
    /// Identity of the owning user, fixed at creation
    pub owner: String,
    /// Storage path of an attached image, if any
    pub image_path: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Create a new task for the given owner.
    ///
    /// The description is trimmed and must be non-empty afterwards.
    pub fn new(owner: impl Into<String>, description: &str) -> Result<Self> {
        let description = description.trim();
        if description.is_empty() {
            return Err(Error::InvalidInput(
                "Description cannot be empty".to_string(),
            ));
        }

        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            description: description.to_string(),
            completed: false,
            date: now,
            owner: owner.into(),
            image_path: None,
            created_at: now,
            updated_at: now,
        })
    }

    /// Set the completed flag
    pub fn with_completed(mut self, completed: bool) -> Self {
        self.completed = completed;
        self
    }

    /// Set the logical date
    pub fn with_date(mut self, date: DateTime<Utc>) -> Self {
        self.date = date;
        self
    }

    /// Set the attached image path
    pub fn with_image_path(mut self, image_path: impl Into<String>) -> Self {
        self.image_path = Some(image_path.into());
        self
    }
}

/// Allow-listed partial update of a task.
///
/// Only the fields here may be changed after creation; `owner`, `id` and
/// `date` are fixed once the task exists.
#[derive(Debug, Clone, Default)]
pub struct TaskUpdate {
    pub description: Option<String>,
    pub completed: Option<bool>,
    pub image_path: Option<String>,
}

impl TaskUpdate {
    /// True when no field is set
    pub fn is_empty(&self) -> bool {
        self.description.is_none() && self.completed.is_none() && self.image_path.is_none()
    }

    /// Check the update against the same rules as creation.
    ///
    /// Runs before any store mutation so a bad update never half-applies.
    pub fn validate(&self) -> Result<()> {
        if let Some(description) = &self.description {
            if description.trim().is_empty() {
                return Err(Error::InvalidInput(
                    "Description cannot be empty".to_string(),
                ));
            }
        }
        Ok(())
    }

    /// Apply the update to a task in place.
    pub fn apply(&self, task: &mut Task) {
        if let Some(description) = &self.description {
            task.description = description.trim().to_string();
        }
        if let Some(completed) = self.completed {
            task.completed = completed;
        }
        if let Some(image_path) = &self.image_path {
            task.image_path = Some(image_path.clone());
        }
    }
}
