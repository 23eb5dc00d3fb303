//! Redis-backed task store. Each task is a JSON document at `task:{id}`;
//! the `tasks:index` sorted set (score = id) keeps ordering and count.

use async_trait::async_trait;
use redis::aio::Connection;
use redis::{AsyncCommands, Client};
use tasks_shared::{NewTask, Task, TaskAttribute, TaskId};

use super::{Lookup, StoreError, StoreResult, TaskStore};

const NEXT_ID_KEY: &str = "tasks:next_id";
const INDEX_KEY: &str = "tasks:index";

fn task_key(id: TaskId) -> String {
    format!("task:{id}")
}

fn decode(id: TaskId, json: &str) -> StoreResult<Task> {
    serde_json::from_str(json).map_err(|source| StoreError::Corrupt {
        id,
        source: source.into(),
    })
}

fn encode(task: &Task) -> StoreResult<String> {
    serde_json::to_string(task).map_err(|source| StoreError::Encode {
        id: task.id,
        source: source.into(),
    })
}

#[derive(Debug, Clone)]
pub struct RedisTaskStore {
    client: Client,
}

impl RedisTaskStore {
    /// Validates `url`; no connection is made until the first command.
    pub fn open(url: &str) -> StoreResult<Self> {
        let client = Client::open(url).map_err(StoreError::persistence)?;
        Ok(Self { client })
    }

    async fn connection(&self) -> StoreResult<Connection> {
        self.client
            .get_async_connection()
            .await
            .map_err(StoreError::persistence)
    }

    async fn load(&self, conn: &mut Connection, id: TaskId) -> StoreResult<Option<Task>> {
        let json: Option<String> = conn
            .get(task_key(id))
            .await
            .map_err(StoreError::persistence)?;
        json.map(|json| decode(id, &json)).transpose()
    }
}

#[async_trait]
impl TaskStore for RedisTaskStore {
    async fn find_all(&self) -> StoreResult<Vec<Task>> {
        let mut conn = self.connection().await?;
        let ids: Vec<i64> = conn
            .zrange(INDEX_KEY, 0, -1)
            .await
            .map_err(StoreError::persistence)?;

        let mut tasks = Vec::with_capacity(ids.len());
        for id in ids.into_iter().map(TaskId::new) {
            if let Some(task) = self.load(&mut conn, id).await? {
                tasks.push(task);
            }
        }
        Ok(tasks)
    }

    async fn find_by_id(&self, id: TaskId) -> StoreResult<Lookup> {
        let mut conn = self.connection().await?;
        Ok(self.load(&mut conn, id).await?.into())
    }

    async fn find_by(&self, attribute: &TaskAttribute) -> StoreResult<Lookup> {
        let tasks = self.find_all().await?;
        Ok(tasks
            .into_iter()
            .find(|task| attribute.matches(task))
            .into())
    }

    async fn create(&self, attributes: NewTask) -> StoreResult<Task> {
        let mut conn = self.connection().await?;
        let id: i64 = conn
            .incr(NEXT_ID_KEY, 1)
            .await
            .map_err(StoreError::persistence)?;
        let task = Task::new(TaskId::new(id), attributes);
        let json = encode(&task)?;

        redis::pipe()
            .atomic()
            .set(task_key(task.id), json)
            .ignore()
            .zadd(INDEX_KEY, id, id)
            .ignore()
            .query_async::<_, ()>(&mut conn)
            .await
            .map_err(StoreError::persistence)?;
        Ok(task)
    }

    async fn update(&self, task: &Task) -> StoreResult<()> {
        let mut conn = self.connection().await?;
        let json = encode(task)?;
        // SET XX only writes when the key already exists.
        let written: Option<String> = redis::cmd("SET")
            .arg(task_key(task.id))
            .arg(json)
            .arg("XX")
            .query_async(&mut conn)
            .await
            .map_err(StoreError::persistence)?;
        written.map(|_| ()).ok_or(StoreError::NotFound(task.id))
    }

    async fn delete(&self, id: TaskId) -> StoreResult<()> {
        let mut conn = self.connection().await?;
        let (deleted, _): (usize, usize) = redis::pipe()
            .atomic()
            .del(task_key(id))
            .zrem(INDEX_KEY, id.get())
            .query_async(&mut conn)
            .await
            .map_err(StoreError::persistence)?;

        if deleted > 0 {
            Ok(())
        } else {
            Err(StoreError::NotFound(id))
        }
    }

    async fn count(&self) -> StoreResult<usize> {
        let mut conn = self.connection().await?;
        conn.zcard(INDEX_KEY).await.map_err(StoreError::persistence)
    }
}
