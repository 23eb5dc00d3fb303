use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Store-assigned task identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(i64);

impl TaskId {
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TaskId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}

/// A to-do item. A task is complete exactly when `completed` holds a timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub name: String,
    pub description: Option<String>,
    pub completed: Option<DateTime<Utc>>,
}

impl Task {
    /// Builds a task from exactly the supplied attributes.
    pub fn new(id: TaskId, attributes: NewTask) -> Self {
        Self {
            id,
            name: attributes.name,
            description: attributes.description,
            completed: attributes.completed,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.completed.is_some()
    }

    pub fn complete_at(&mut self, now: DateTime<Utc>) {
        self.completed = Some(now);
    }

    pub fn uncomplete(&mut self) {
        self.completed = None;
    }

    /// Applies only the attributes present in `changes`.
    pub fn apply(&mut self, changes: TaskChanges) {
        if let Some(name) = changes.name {
            self.name = name;
        }
        if let Some(description) = changes.description {
            self.description = Some(description);
        }
        if let Some(completed) = changes.completed {
            self.completed = completed;
        }
    }
}

/// Attributes for creating a task. Nothing is defaulted, `completed` included.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTask {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub completed: Option<DateTime<Utc>>,
}

impl NewTask {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn with_completed(mut self, completed: DateTime<Utc>) -> Self {
        self.completed = Some(completed);
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_name(&self.name)
    }
}

/// Partial attributes for updating a task.
///
/// For `completed`, `None` leaves the field alone while `Some(None)` clears it,
/// so a JSON body can distinguish a missing key from an explicit `null`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskChanges {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(
        default,
        deserialize_with = "deserialize_present",
        skip_serializing_if = "Option::is_none"
    )]
    pub completed: Option<Option<DateTime<Utc>>>,
}

impl TaskChanges {
    pub fn validate(&self) -> Result<(), ValidationError> {
        match &self.name {
            Some(name) => validate_name(name),
            None => Ok(()),
        }
    }
}

fn deserialize_present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

fn validate_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        Err(ValidationError::BlankName)
    } else {
        Ok(())
    }
}

/// Request envelope: task attributes arrive under a `task` key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskParams<T> {
    pub task: T,
}

/// Attributes a task can be looked up by.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskAttribute {
    Name(String),
    Description(String),
}

impl TaskAttribute {
    pub fn matches(&self, task: &Task) -> bool {
        match self {
            Self::Name(name) => task.name == *name,
            Self::Description(description) => {
                task.description.as_deref() == Some(description.as_str())
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("name can't be blank")]
    BlankName,
}

impl ValidationError {
    /// Name of the offending attribute, for attaching the message to a form field.
    pub fn field(&self) -> &'static str {
        match self {
            Self::BlankName => "name",
        }
    }
}
