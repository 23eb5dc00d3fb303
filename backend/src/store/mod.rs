//! Task persistence port and its adapters.

mod memory;
mod redis_store;

use std::sync::Arc;

use async_trait::async_trait;
use tasks_shared::{NewTask, Task, TaskAttribute, TaskId};
use thiserror::Error;

pub use self::memory::InMemoryTaskStore;
pub use self::redis_store::RedisTaskStore;

pub type StoreResult<T> = Result<T, StoreError>;

/// Outcome of a lookup. A miss is an ordinary value, not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    Found(Task),
    NotFound,
}

impl Lookup {
    pub fn into_option(self) -> Option<Task> {
        match self {
            Self::Found(task) => Some(task),
            Self::NotFound => None,
        }
    }
}

impl From<Option<Task>> for Lookup {
    fn from(task: Option<Task>) -> Self {
        task.map_or(Self::NotFound, Self::Found)
    }
}

/// Task persistence contract.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Returns every task ordered by id.
    async fn find_all(&self) -> StoreResult<Vec<Task>>;

    async fn find_by_id(&self, id: TaskId) -> StoreResult<Lookup>;

    /// Returns the lowest-id task matching `attribute`.
    async fn find_by(&self, attribute: &TaskAttribute) -> StoreResult<Lookup>;

    /// Persists a new task and assigns its id.
    async fn create(&self, attributes: NewTask) -> StoreResult<Task>;

    /// Replaces a stored task.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] when no task has this id.
    async fn update(&self, task: &Task) -> StoreResult<()>;

    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] when no task has this id.
    async fn delete(&self, id: TaskId) -> StoreResult<()>;

    async fn count(&self) -> StoreResult<usize>;
}

#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("task not found: {0}")]
    NotFound(TaskId),

    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),

    #[error("stored task {id} could not be decoded: {source}")]
    Corrupt {
        id: TaskId,
        source: Arc<serde_json::Error>,
    },

    #[error("task {id} could not be encoded: {source}")]
    Encode {
        id: TaskId,
        source: Arc<serde_json::Error>,
    },
}

impl StoreError {
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
