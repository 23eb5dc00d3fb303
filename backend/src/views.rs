//! HTML rendering. Templates are compiled into the binary and HTML-escaped.

use minijinja::{context, Environment};
use serde::Serialize;
use tasks_shared::{NewTask, Task, ValidationError};

use crate::error::AppError;
use crate::flash::Flash;
use crate::routes;

const TEMPLATES: [(&str, &str); 6] = [
    ("layout.html", include_str!("../templates/layout.html")),
    ("_form.html", include_str!("../templates/_form.html")),
    ("index.html", include_str!("../templates/index.html")),
    ("show.html", include_str!("../templates/show.html")),
    ("new.html", include_str!("../templates/new.html")),
    ("edit.html", include_str!("../templates/edit.html")),
];

const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M UTC";
const INPUT_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

pub struct Views {
    env: Environment<'static>,
}

impl Views {
    pub fn new() -> Result<Self, minijinja::Error> {
        let mut env = Environment::new();
        for (name, source) in TEMPLATES {
            env.add_template(name, source)?;
        }
        Ok(Self { env })
    }

    fn render(&self, template: &'static str, ctx: minijinja::Value) -> Result<String, AppError> {
        self.env
            .get_template(template)
            .and_then(|tmpl| tmpl.render(ctx))
            .map_err(|source| AppError::Render { template, source })
    }

    pub fn index(&self, tasks: &[Task], flash: Flash) -> Result<String, AppError> {
        let tasks: Vec<TaskView> = tasks.iter().map(TaskView::from).collect();
        self.render(
            "index.html",
            context! {
                tasks => tasks,
                new_path => routes::new_task_path(),
                flash => flash.view(),
            },
        )
    }

    pub fn show(&self, task: &Task, flash: Flash) -> Result<String, AppError> {
        self.render(
            "show.html",
            context! { task => TaskView::from(task), flash => flash.view() },
        )
    }

    pub fn new_form(&self, form: &FormView) -> Result<String, AppError> {
        self.render("new.html", context! { form => form })
    }

    pub fn edit_form(&self, form: &FormView) -> Result<String, AppError> {
        self.render("edit.html", context! { form => form })
    }
}

/// A task as the templates see it: display strings plus its links.
#[derive(Debug, Clone, Serialize)]
pub struct TaskView {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub completed: Option<String>,
    pub path: String,
    pub edit_path: String,
    pub complete_path: String,
    pub uncomplete_path: String,
    pub destroy_path: String,
}

impl From<&Task> for TaskView {
    fn from(task: &Task) -> Self {
        Self {
            id: task.id.get(),
            name: task.name.clone(),
            description: task.description.clone(),
            completed: task
                .completed
                .map(|at| at.format(DISPLAY_FORMAT).to_string()),
            path: routes::task_path(task.id),
            edit_path: routes::edit_task_path(task.id),
            complete_path: routes::complete_task_path(task.id),
            uncomplete_path: routes::uncomplete_task_path(task.id),
            destroy_path: routes::destroy_task_path(task.id),
        }
    }
}

/// Values for the shared task form.
#[derive(Debug, Clone, Serialize)]
pub struct FormView {
    pub action: String,
    pub submit_label: &'static str,
    pub name: String,
    pub description: String,
    pub completed: String,
    pub errors: Vec<FieldErrorView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FieldErrorView {
    pub field: &'static str,
    pub message: String,
}

impl FormView {
    pub fn for_new(attributes: &NewTask) -> Self {
        Self {
            action: routes::tasks_path().to_owned(),
            submit_label: "Create Task",
            name: attributes.name.clone(),
            description: attributes.description.clone().unwrap_or_default(),
            completed: attributes
                .completed
                .map(|at| at.format(INPUT_FORMAT).to_string())
                .unwrap_or_default(),
            errors: Vec::new(),
        }
    }

    pub fn for_edit(task: &Task) -> Self {
        Self {
            action: routes::task_path(task.id),
            submit_label: "Update Task",
            name: task.name.clone(),
            description: task.description.clone().unwrap_or_default(),
            completed: task
                .completed
                .map(|at| at.format(INPUT_FORMAT).to_string())
                .unwrap_or_default(),
            errors: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_error(mut self, error: &ValidationError) -> Self {
        self.errors.push(FieldErrorView {
            field: error.field(),
            message: error.to_string(),
        });
        self
    }
}
