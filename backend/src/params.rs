//! Extraction of `task`-keyed attributes from JSON or HTML form bodies.

use axum::async_trait;
use axum::extract::{FromRequest, Request};
use axum::http::header::CONTENT_TYPE;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Form, Json};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tasks_shared::{NewTask, TaskChanges, TaskParams};
use thiserror::Error;

/// Task attributes read from the request body.
///
/// `application/json` bodies must look like `{"task": {...}}`; anything else
/// is read as a urlencoded form with `task[name]`-style fields.
#[derive(Debug, Clone)]
pub struct TaskForm<T>(pub T);

/// Urlencoded task fields as browsers submit them.
#[derive(Debug, Default, Deserialize)]
pub struct FormFields {
    #[serde(rename = "task[name]")]
    pub name: Option<String>,
    #[serde(rename = "task[description]")]
    pub description: Option<String>,
    #[serde(rename = "task[completed]")]
    pub completed: Option<String>,
}

pub trait FromFormFields: Sized {
    fn from_fields(fields: FormFields) -> Result<Self, ParamsRejection>;
}

impl FromFormFields for NewTask {
    fn from_fields(fields: FormFields) -> Result<Self, ParamsRejection> {
        let completed = match fields.completed.as_deref() {
            None | Some("") => None,
            Some(raw) => Some(parse_timestamp(raw)?),
        };
        Ok(Self {
            name: fields.name.unwrap_or_default(),
            description: fields.description,
            completed,
        })
    }
}

impl FromFormFields for TaskChanges {
    fn from_fields(fields: FormFields) -> Result<Self, ParamsRejection> {
        // A submitted but empty completion field clears the timestamp.
        let completed = match fields.completed.as_deref() {
            None => None,
            Some("") => Some(None),
            Some(raw) => Some(Some(parse_timestamp(raw)?)),
        };
        Ok(Self {
            name: fields.name,
            description: fields.description,
            completed,
        })
    }
}

/// Accepts RFC 3339, or a `datetime-local` value read as UTC.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, ParamsRejection> {
    let raw = raw.trim();
    if let Ok(at) = DateTime::parse_from_rfc3339(raw) {
        return Ok(at.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .map(|naive| naive.and_utc())
        .ok_or_else(|| ParamsRejection::InvalidTimestamp(raw.to_owned()))
}

#[derive(Debug, Error)]
pub enum ParamsRejection {
    #[error("malformed task parameters: {0}")]
    Malformed(String),

    #[error("invalid completion time: {0:?}")]
    InvalidTimestamp(String),
}

impl IntoResponse for ParamsRejection {
    fn into_response(self) -> Response {
        tracing::debug!(error = %self, "rejected task parameters");
        (StatusCode::UNPROCESSABLE_ENTITY, self.to_string()).into_response()
    }
}

fn is_json(req: &Request) -> bool {
    req.headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|content_type| content_type.starts_with("application/json"))
}

#[async_trait]
impl<S, T> FromRequest<S> for TaskForm<T>
where
    S: Send + Sync,
    T: DeserializeOwned + FromFormFields + Send,
{
    type Rejection = ParamsRejection;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if is_json(&req) {
            let Json(TaskParams { task }) = Json::<TaskParams<T>>::from_request(req, state)
                .await
                .map_err(|rejection| ParamsRejection::Malformed(rejection.body_text()))?;
            return Ok(Self(task));
        }

        let Form(fields) = Form::<FormFields>::from_request(req, state)
            .await
            .map_err(|rejection| ParamsRejection::Malformed(rejection.body_text()))?;
        T::from_fields(fields).map(Self)
    }
}
