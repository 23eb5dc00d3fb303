use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use tasks_shared::{NewTask, Task, TaskAttribute, TaskId};

use super::{Lookup, StoreError, StoreResult, TaskStore};

/// Thread-safe in-memory task store. Clones share the same tasks.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTaskStore {
    state: Arc<RwLock<MemoryState>>,
}

#[derive(Debug, Default)]
struct MemoryState {
    tasks: BTreeMap<TaskId, Task>,
    last_id: i64,
}

impl InMemoryTaskStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned(err: impl ToString) -> StoreError {
    StoreError::persistence(std::io::Error::other(err.to_string()))
}

#[async_trait]
impl TaskStore for InMemoryTaskStore {
    async fn find_all(&self) -> StoreResult<Vec<Task>> {
        let state = self.state.read().map_err(poisoned)?;
        Ok(state.tasks.values().cloned().collect())
    }

    async fn find_by_id(&self, id: TaskId) -> StoreResult<Lookup> {
        let state = self.state.read().map_err(poisoned)?;
        Ok(state.tasks.get(&id).cloned().into())
    }

    async fn find_by(&self, attribute: &TaskAttribute) -> StoreResult<Lookup> {
        let state = self.state.read().map_err(poisoned)?;
        Ok(state
            .tasks
            .values()
            .find(|task| attribute.matches(task))
            .cloned()
            .into())
    }

    async fn create(&self, attributes: NewTask) -> StoreResult<Task> {
        let mut state = self.state.write().map_err(poisoned)?;
        state.last_id += 1;
        let task = Task::new(TaskId::new(state.last_id), attributes);
        state.tasks.insert(task.id, task.clone());
        Ok(task)
    }

    async fn update(&self, task: &Task) -> StoreResult<()> {
        let mut state = self.state.write().map_err(poisoned)?;
        let stored = state
            .tasks
            .get_mut(&task.id)
            .ok_or(StoreError::NotFound(task.id))?;
        *stored = task.clone();
        Ok(())
    }

    async fn delete(&self, id: TaskId) -> StoreResult<()> {
        let mut state = self.state.write().map_err(poisoned)?;
        state
            .tasks
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound(id))
    }

    async fn count(&self) -> StoreResult<usize> {
        let state = self.state.read().map_err(poisoned)?;
        Ok(state.tasks.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn store() -> InMemoryTaskStore {
        InMemoryTaskStore::new()
    }

    #[rstest]
    #[tokio::test]
    async fn create_assigns_increasing_ids(store: InMemoryTaskStore) {
        let first = store.create(NewTask::new("one")).await.unwrap();
        let second = store.create(NewTask::new("two")).await.unwrap();

        assert_eq!(first.id, TaskId::new(1));
        assert_eq!(second.id, TaskId::new(2));
        assert_eq!(store.count().await.unwrap(), 2);
    }

    #[rstest]
    #[tokio::test]
    async fn ids_are_not_reused_after_delete(store: InMemoryTaskStore) {
        let first = store.create(NewTask::new("one")).await.unwrap();
        store.delete(first.id).await.unwrap();
        let second = store.create(NewTask::new("two")).await.unwrap();

        assert_ne!(first.id, second.id);
    }

    #[rstest]
    #[tokio::test]
    async fn lookups_report_misses(store: InMemoryTaskStore) {
        assert_eq!(
            store.find_by_id(TaskId::new(-1)).await.unwrap(),
            Lookup::NotFound
        );
        assert_eq!(
            store
                .find_by(&TaskAttribute::Name("missing".into()))
                .await
                .unwrap(),
            Lookup::NotFound
        );
    }

    #[rstest]
    #[tokio::test]
    async fn find_by_returns_matching_task(store: InMemoryTaskStore) {
        store.create(NewTask::new("a")).await.unwrap();
        let wanted = store
            .create(NewTask::new("b").with_description("second"))
            .await
            .unwrap();

        let found = store
            .find_by(&TaskAttribute::Description("second".into()))
            .await
            .unwrap();
        assert_eq!(found, Lookup::Found(wanted));
    }

    #[rstest]
    #[tokio::test]
    async fn update_and_delete_require_existing_task(store: InMemoryTaskStore) {
        let ghost = Task::new(TaskId::new(42), NewTask::new("ghost"));

        assert!(matches!(
            store.update(&ghost).await,
            Err(StoreError::NotFound(id)) if id == ghost.id
        ));
        assert!(matches!(
            store.delete(ghost.id).await,
            Err(StoreError::NotFound(_))
        ));
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[rstest]
    #[tokio::test]
    async fn update_replaces_stored_task(store: InMemoryTaskStore) {
        let mut task = store.create(NewTask::new("before")).await.unwrap();
        task.name = "after".into();
        store.update(&task).await.unwrap();

        let stored = store.find_by_id(task.id).await.unwrap().into_option();
        assert_eq!(stored.map(|t| t.name), Some("after".to_string()));
    }

    #[rstest]
    #[tokio::test]
    async fn clones_share_state(store: InMemoryTaskStore) {
        let handle = store.clone();
        handle.create(NewTask::new("shared")).await.unwrap();

        assert_eq!(store.find_all().await.unwrap().len(), 1);
    }
}
