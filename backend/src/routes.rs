//! URL layout and path helpers.

use axum::routing::{get, post};
use axum::Router;
use tasks_shared::TaskId;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::controller;
use crate::AppState;

pub fn tasks_path() -> &'static str {
    "/tasks"
}

pub fn new_task_path() -> &'static str {
    "/tasks/new"
}

pub fn task_path(id: TaskId) -> String {
    format!("/tasks/{id}")
}

pub fn edit_task_path(id: TaskId) -> String {
    format!("/tasks/{id}/edit")
}

pub fn complete_task_path(id: TaskId) -> String {
    format!("/tasks/{id}/complete")
}

pub fn uncomplete_task_path(id: TaskId) -> String {
    format!("/tasks/{id}/uncomplete")
}

/// POST target for HTML delete buttons.
pub fn destroy_task_path(id: TaskId) -> String {
    format!("/tasks/{id}/destroy")
}

/// Builds the application router. Static assets are mounted by the caller.
pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route("/tasks", get(controller::api_index))
        .route("/tasks/:id", get(controller::api_show))
        .layer(CorsLayer::permissive());

    Router::new()
        .route("/", get(controller::index))
        .route("/tasks", get(controller::index).post(controller::create))
        .route("/tasks/new", get(controller::new))
        .route(
            "/tasks/:id",
            get(controller::show)
                .patch(controller::update)
                .post(controller::update)
                .delete(controller::destroy),
        )
        .route("/tasks/:id/edit", get(controller::edit))
        .route("/tasks/:id/destroy", post(controller::destroy))
        .route("/tasks/:id/complete", get(controller::complete))
        .route("/tasks/:id/uncomplete", get(controller::uncomplete))
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn member_paths_embed_the_id() {
        let id = TaskId::new(-1);
        assert_eq!(task_path(id), "/tasks/-1");
        assert_eq!(edit_task_path(id), "/tasks/-1/edit");
        assert_eq!(complete_task_path(id), "/tasks/-1/complete");
        assert_eq!(uncomplete_task_path(id), "/tasks/-1/uncomplete");
        assert_eq!(destroy_task_path(id), "/tasks/-1/destroy");
        assert_eq!(new_task_path(), "/tasks/new");
    }
}
