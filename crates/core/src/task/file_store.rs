//! File-based task storage implementation
//!
//! Stores tasks as JSON in a file on disk, with an in-memory cache guarded
//! by a `RwLock`. Mutations find and modify under the write lock so that
//! concurrent requests cannot interleave a stale read with a write.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::path::PathBuf;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::model::{Task, TaskUpdate};
use super::query::TaskQuery;
use super::repository::TaskRepository;
use crate::{Error, Result};

/// File-based task store using JSON
pub struct FileTaskStore {
    /// Path to the JSON file
    path: PathBuf,
    /// In-memory cache of tasks
    cache: RwLock<HashMap<Uuid, Task>>,
}

impl FileTaskStore {
    /// Create a new FileTaskStore
    ///
    /// If the file doesn't exist, it will be created on first write.
    pub async fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let cache = if path.exists() {
            let content = tokio::fs::read_to_string(&path).await?;
            let tasks: Vec<Task> = serde_json::from_str(&content)?;
            tasks.into_iter().map(|t| (t.id, t)).collect()
        } else {
            HashMap::new()
        };

        Ok(Self {
            path,
            cache: RwLock::new(cache),
        })
    }

    /// Persist the cache to disk
    async fn persist(&self) -> Result<()> {
        let cache = self.cache.read().await;
        let tasks: Vec<&Task> = cache.values().collect();
        let content = serde_json::to_string_pretty(&tasks)?;

        // Ensure parent directory exists
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        tokio::fs::write(&self.path, content).await?;
        tracing::debug!("Persisted {} tasks to {:?}", cache.len(), self.path);
        Ok(())
    }
}

#[async_trait]
impl TaskRepository for FileTaskStore {
    async fn create(&self, task: Task) -> Result<Task> {
        {
            let mut cache = self.cache.write().await;
            if cache.contains_key(&task.id) {
                return Err(Error::InvalidInput(format!(
                    "Task with ID {} already exists",
                    task.id
                )));
            }
            cache.insert(task.id, task.clone());
        }
        self.persist().await?;
        Ok(task)
    }

    async fn get(&self, owner: &str, id: Uuid) -> Result<Option<Task>> {
        let cache = self.cache.read().await;
        Ok(cache.get(&id).filter(|t| t.owner == owner).cloned())
    }

    async fn list(&self, owner: &str, query: &TaskQuery) -> Result<Vec<Task>> {
        let cache = self.cache.read().await;
        let mut tasks: Vec<Task> = cache
            .values()
            .filter(|t| t.owner == owner && query.matches(t))
            .cloned()
            .collect();

        match query.sort {
            Some(sort) => tasks.sort_by(|a, b| sort.compare(a, b)),
            // Default listing order: newest first
            None => tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        }

        let skip = query.skip.unwrap_or(0);
        let tasks: Vec<Task> = match query.limit {
            Some(limit) => tasks.into_iter().skip(skip).take(limit).collect(),
            None => tasks.into_iter().skip(skip).collect(),
        };

        Ok(tasks)
    }

    async fn update(&self, owner: &str, id: Uuid, update: &TaskUpdate) -> Result<Option<Task>> {
        update.validate()?;

        let updated = {
            let mut cache = self.cache.write().await;
            match cache.get_mut(&id).filter(|t| t.owner == owner) {
                Some(task) => {
                    update.apply(task);
                    task.updated_at = Utc::now();
                    Some(task.clone())
                }
                None => None,
            }
        };

        if updated.is_some() {
            self.persist().await?;
        }
        Ok(updated)
    }

    async fn delete(&self, owner: &str, id: Uuid) -> Result<Option<Task>> {
        let removed = {
            let mut cache = self.cache.write().await;
            if cache.get(&id).is_some_and(|t| t.owner == owner) {
                cache.remove(&id)
            } else {
                None
            }
        };

        if removed.is_some() {
            self.persist().await?;
        }
        Ok(removed)
    }

    async fn delete_many(&self, owner: &str, ids: &[Uuid]) -> Result<u64> {
        let removed = {
            let mut cache = self.cache.write().await;
            let mut removed = 0u64;
            for id in ids {
                if cache.get(id).is_some_and(|t| t.owner == owner) {
                    cache.remove(id);
                    removed += 1;
                }
            }
            removed
        };

        if removed > 0 {
            self.persist().await?;
        }
        Ok(removed)
    }
}
