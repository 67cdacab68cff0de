//! Task repository trait
//!
//! Defines the interface for owner-scoped task storage operations. Every
//! read and write takes the requesting owner; a task belonging to someone
//! else is indistinguishable from one that does not exist.

use async_trait::async_trait;
use uuid::Uuid;

use super::model::{Task, TaskUpdate};
use super::query::TaskQuery;
use crate::Result;

/// Repository interface for owner-scoped task CRUD operations
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Persist a new task
    async fn create(&self, task: Task) -> Result<Task>;

    /// Get a task by ID, scoped to the owner
    async fn get(&self, owner: &str, id: Uuid) -> Result<Option<Task>>;

    /// List the owner's tasks matching the query, sorted and paginated
    async fn list(&self, owner: &str, query: &TaskQuery) -> Result<Vec<Task>>;

    /// Atomically find an owned task and apply the update.
    ///
    /// Returns `None` when no task matches the id/owner pair. The lookup and
    /// mutation happen as one operation so concurrent updates cannot
    /// interleave a stale read with a write.
    async fn update(&self, owner: &str, id: Uuid, update: &TaskUpdate) -> Result<Option<Task>>;

    /// Atomically find and remove an owned task, returning the removed record
    async fn delete(&self, owner: &str, id: Uuid) -> Result<Option<Task>>;

    /// Remove every owned task whose id is in `ids`, returning the count.
    ///
    /// Ids that do not match an owned task are silently skipped.
    async fn delete_many(&self, owner: &str, ids: &[Uuid]) -> Result<u64>;
}
