//! Application state

use std::path::PathBuf;
use std::sync::Arc;

use tt_core::task::FileTaskStore;

use crate::upload::ImageStore;

/// Shared application state, constructed once at startup and injected into
/// every handler.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    task_store: FileTaskStore,
    image_store: ImageStore,
}

impl AppState {
    /// Create a new AppState with the given data and upload directories
    pub async fn new(data_dir: PathBuf, upload_dir: PathBuf) -> tt_core::Result<Self> {
        let tasks_path = data_dir.join("tasks.json");
        let task_store = FileTaskStore::new(tasks_path).await?;
        let image_store = ImageStore::new(upload_dir);

        Ok(Self {
            inner: Arc::new(AppStateInner {
                task_store,
                image_store,
            }),
        })
    }

    /// Get reference to the task store
    pub fn task_store(&self) -> &FileTaskStore {
        &self.inner.task_store
    }

    /// Get reference to the image store
    pub fn image_store(&self) -> &ImageStore {
        &self.inner.image_store
    }
}
