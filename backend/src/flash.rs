//! One-shot notices carried across a redirect in a `flash` cookie.
//!
//! The cookie holds a fixed notice code rather than free text, so the value
//! never needs escaping and cannot be used to inject markup.

use std::convert::Infallible;

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::{COOKIE, SET_COOKIE};
use axum::http::request::Parts;
use axum::http::HeaderValue;
use axum::response::{AppendHeaders, IntoResponse, Redirect, Response};
use serde::Serialize;

const COOKIE_NAME: &str = "flash";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    TaskNotFound,
    TaskCreated,
    TaskUpdated,
    TaskDeleted,
}

impl Notice {
    const ALL: [Self; 4] = [
        Self::TaskNotFound,
        Self::TaskCreated,
        Self::TaskUpdated,
        Self::TaskDeleted,
    ];

    pub fn code(self) -> &'static str {
        match self {
            Self::TaskNotFound => "task_not_found",
            Self::TaskCreated => "task_created",
            Self::TaskUpdated => "task_updated",
            Self::TaskDeleted => "task_deleted",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|notice| notice.code() == code)
    }

    pub fn message(self) -> &'static str {
        match self {
            Self::TaskNotFound => "Task not found",
            Self::TaskCreated => "Task was successfully created.",
            Self::TaskUpdated => "Task was successfully updated.",
            Self::TaskDeleted => "Task was successfully deleted.",
        }
    }

    pub fn is_error(self) -> bool {
        matches!(self, Self::TaskNotFound)
    }

    fn set_cookie(self) -> HeaderValue {
        HeaderValue::from_static(match self {
            Self::TaskNotFound => "flash=task_not_found; Path=/; HttpOnly; SameSite=Lax",
            Self::TaskCreated => "flash=task_created; Path=/; HttpOnly; SameSite=Lax",
            Self::TaskUpdated => "flash=task_updated; Path=/; HttpOnly; SameSite=Lax",
            Self::TaskDeleted => "flash=task_deleted; Path=/; HttpOnly; SameSite=Lax",
        })
    }
}

/// Template-facing shape of a notice.
#[derive(Debug, Clone, Serialize)]
pub struct NoticeView {
    pub message: &'static str,
    pub kind: &'static str,
}

/// The notice left by the previous response, if any.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Flash(pub Option<Notice>);

impl Flash {
    pub fn view(self) -> Option<NoticeView> {
        self.0.map(|notice| NoticeView {
            message: notice.message(),
            kind: if notice.is_error() { "error" } else { "notice" },
        })
    }

    /// Attaches a cookie removal to `response` when a notice was consumed.
    pub fn consume(self, response: impl IntoResponse) -> Response {
        if self.0.is_none() {
            return response.into_response();
        }
        let clear = HeaderValue::from_static("flash=; Path=/; Max-Age=0; HttpOnly; SameSite=Lax");
        (AppendHeaders([(SET_COOKIE, clear)]), response).into_response()
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Flash
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let notice = parts
            .headers
            .get_all(COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(|header| header.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(name, _)| *name == COOKIE_NAME)
            .and_then(|(_, code)| Notice::from_code(code));
        Ok(Self(notice))
    }
}

/// 303 redirect to `to` that leaves `notice` for the next page.
pub fn redirect(to: &str, notice: Notice) -> Response {
    (
        AppendHeaders([(SET_COOKIE, notice.set_cookie())]),
        Redirect::to(to),
    )
        .into_response()
}
