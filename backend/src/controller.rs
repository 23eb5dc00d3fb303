//! Request handlers for the task resource.
//!
//! Every handler that takes an id checks that the task exists before touching
//! the store. A missing task (or an id that is not a number) is answered with a
//! redirect to the list and a flash notice, never with an error page.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::Json;
use chrono::SubsecRound;
use serde_json::json;
use tasks_shared::{NewTask, Task, TaskChanges, TaskId};
use tracing::{debug, info, warn};

use crate::error::AppError;
use crate::flash::{self, Flash, Notice};
use crate::params::TaskForm;
use crate::routes;
use crate::store::{Lookup, StoreError, StoreResult};
use crate::views::FormView;
use crate::AppState;

type HandlerResult = Result<Response, AppError>;

async fn lookup(state: &AppState, raw_id: &str) -> Result<Lookup, AppError> {
    let Ok(id) = raw_id.parse::<TaskId>() else {
        debug!(id = raw_id, "unparseable task id");
        return Ok(Lookup::NotFound);
    };
    Ok(state.store.find_by_id(id).await?)
}

fn not_found(raw_id: &str) -> Response {
    warn!(id = raw_id, "task not found, redirecting to list");
    flash::redirect(routes::tasks_path(), Notice::TaskNotFound)
}

/// `Ok(false)` when the task disappeared between lookup and write.
fn written(result: StoreResult<()>) -> Result<bool, AppError> {
    match result {
        Ok(()) => Ok(true),
        Err(StoreError::NotFound(_)) => Ok(false),
        Err(error) => Err(error.into()),
    }
}

/// A form echoes the stored completion time back at second precision;
/// such an echo is not a change.
fn drop_echoed_completion(task: &Task, changes: &mut TaskChanges) {
    if let (Some(Some(submitted)), Some(stored)) = (changes.completed, task.completed) {
        if stored.trunc_subsecs(0) == submitted {
            changes.completed = None;
        }
    }
}

fn unprocessable(html: String) -> Response {
    (StatusCode::UNPROCESSABLE_ENTITY, Html(html)).into_response()
}

pub async fn index(State(state): State<AppState>, flash: Flash) -> HandlerResult {
    let tasks = state.store.find_all().await?;
    let html = state.views.index(&tasks, flash)?;
    Ok(flash.consume(Html(html)))
}

pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
    flash: Flash,
) -> HandlerResult {
    let Lookup::Found(task) = lookup(&state, &id).await? else {
        return Ok(not_found(&id));
    };
    let html = state.views.show(&task, flash)?;
    Ok(flash.consume(Html(html)))
}

pub async fn new(State(state): State<AppState>) -> HandlerResult {
    let html = state.views.new_form(&FormView::for_new(&NewTask::default()))?;
    Ok(Html(html).into_response())
}

pub async fn create(
    State(state): State<AppState>,
    TaskForm(attributes): TaskForm<NewTask>,
) -> HandlerResult {
    if let Err(error) = attributes.validate() {
        debug!(%error, "rejected new task");
        let form = FormView::for_new(&attributes).with_error(&error);
        return Ok(unprocessable(state.views.new_form(&form)?));
    }

    let task = state.store.create(attributes).await?;
    info!(id = %task.id, name = %task.name, "created task");
    Ok(flash::redirect(&routes::task_path(task.id), Notice::TaskCreated))
}

pub async fn edit(State(state): State<AppState>, Path(id): Path<String>) -> HandlerResult {
    let Lookup::Found(task) = lookup(&state, &id).await? else {
        return Ok(not_found(&id));
    };
    let html = state.views.edit_form(&FormView::for_edit(&task))?;
    Ok(Html(html).into_response())
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    TaskForm(mut changes): TaskForm<TaskChanges>,
) -> HandlerResult {
    let Lookup::Found(mut task) = lookup(&state, &id).await? else {
        return Ok(not_found(&id));
    };

    if let Err(error) = changes.validate() {
        debug!(id = %task.id, %error, "rejected task changes");
        task.apply(changes);
        let form = FormView::for_edit(&task).with_error(&error);
        return Ok(unprocessable(state.views.edit_form(&form)?));
    }

    drop_echoed_completion(&task, &mut changes);
    task.apply(changes);
    if !written(state.store.update(&task).await)? {
        return Ok(not_found(&id));
    }
    info!(id = %task.id, "updated task");
    Ok(flash::redirect(&routes::task_path(task.id), Notice::TaskUpdated))
}

pub async fn destroy(State(state): State<AppState>, Path(id): Path<String>) -> HandlerResult {
    let Lookup::Found(task) = lookup(&state, &id).await? else {
        return Ok(not_found(&id));
    };
    if !written(state.store.delete(task.id).await)? {
        return Ok(not_found(&id));
    }
    info!(id = %task.id, "deleted task");
    Ok(flash::redirect(routes::tasks_path(), Notice::TaskDeleted))
}

pub async fn complete(State(state): State<AppState>, Path(id): Path<String>) -> HandlerResult {
    let Lookup::Found(mut task) = lookup(&state, &id).await? else {
        return Ok(not_found(&id));
    };
    task.complete_at(state.clock.utc());
    if !written(state.store.update(&task).await)? {
        return Ok(not_found(&id));
    }
    info!(id = %task.id, "marked task complete");
    Ok(Redirect::to(routes::tasks_path()).into_response())
}

pub async fn uncomplete(State(state): State<AppState>, Path(id): Path<String>) -> HandlerResult {
    let Lookup::Found(mut task) = lookup(&state, &id).await? else {
        return Ok(not_found(&id));
    };
    task.uncomplete();
    if !written(state.store.update(&task).await)? {
        return Ok(not_found(&id));
    }
    info!(id = %task.id, "marked task incomplete");
    Ok(Redirect::to(routes::tasks_path()).into_response())
}

pub async fn api_index(State(state): State<AppState>) -> Result<Json<Vec<Task>>, AppError> {
    Ok(Json(state.store.find_all().await?))
}

pub async fn api_show(State(state): State<AppState>, Path(id): Path<String>) -> HandlerResult {
    match lookup(&state, &id).await? {
        Lookup::Found(task) => Ok(Json(task).into_response()),
        Lookup::NotFound => Ok((
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "task not found", "id": id })),
        )
            .into_response()),
    }
}
