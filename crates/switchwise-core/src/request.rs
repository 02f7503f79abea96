//! Analyze payload normalization.
//!
//! Two payload shapes are accepted:
//!
//! - a task list: `{"tasks": [{"title", "url", "active"}, ...], ...}` where the
//!   first entry with `active: true` is analyzed, else the first entry;
//! - the legacy flat shape: `{"next_window_title", "next_url", ...}`.
//!
//! Both carry `current_state`, `snippet_text`, `current_task_context`,
//! `time_of_day` and `session_duration` at the top level.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::RequestError;
use crate::types::{AnalyzeRequest, FocusState, SessionContext};

/// Values used when a payload omits an optional field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RequestDefaults {
    #[serde(default)]
    pub current_state: FocusState,
    #[serde(default = "default_time_of_day")]
    pub time_of_day: f64,
    #[serde(default)]
    pub session_duration: f64,
}

fn default_time_of_day() -> f64 {
    SessionContext::default().time_of_day
}

impl Default for RequestDefaults {
    fn default() -> Self {
        let session = SessionContext::default();
        Self {
            current_state: FocusState::default(),
            time_of_day: session.time_of_day,
            session_duration: session.session_duration,
        }
    }
}

/// A payload reduced to what the pipeline consumes.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedRequest {
    pub request: AnalyzeRequest,
    pub session: SessionContext,
}

/// One entry of the `tasks` list.
#[derive(Debug, Clone, Deserialize)]
pub struct TaskEntry {
    pub title: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default, deserialize_with = "truthy")]
    pub active: bool,
}

/// Null, `false`, zero, `""` and empty containers are false; anything else is true.
fn truthy<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => false,
        Value::Bool(b) => b,
        Value::Number(n) => n.as_f64().is_some_and(|v| v != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(fields) => !fields.is_empty(),
    })
}

#[derive(Debug, Deserialize)]
struct SharedFields {
    #[serde(default)]
    current_state: Option<String>,
    #[serde(default)]
    snippet_text: Option<String>,
    #[serde(default)]
    current_task_context: Option<String>,
    #[serde(default)]
    time_of_day: Option<f64>,
    #[serde(default)]
    session_duration: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct TaskListPayload {
    tasks: Vec<TaskEntry>,
    #[serde(flatten)]
    shared: SharedFields,
}

#[derive(Debug, Deserialize)]
struct LegacyPayload {
    next_window_title: String,
    #[serde(default)]
    next_url: Option<String>,
    #[serde(flatten)]
    shared: SharedFields,
}

/// Pick the first active task, else the first task.
pub fn select_active_task(tasks: &[TaskEntry]) -> Option<&TaskEntry> {
    tasks.iter().find(|t| t.active).or_else(|| tasks.first())
}

/// Parse a raw request body.
pub fn parse_payload(
    body: &str,
    defaults: &RequestDefaults,
) -> Result<NormalizedRequest, RequestError> {
    let value: Value = serde_json::from_str(body).map_err(|_| RequestError::InvalidJson)?;
    normalize(value, defaults)
}

/// Normalize an already-decoded JSON payload.
pub fn normalize(
    value: Value,
    defaults: &RequestDefaults,
) -> Result<NormalizedRequest, RequestError> {
    let is_empty_object = value.as_object().map_or(true, |obj| obj.is_empty());
    if is_empty_object {
        return Err(RequestError::InvalidJson);
    }

    let invalid = |e: serde_json::Error| RequestError::InvalidFields(e.to_string());

    if value.get("tasks").is_some() {
        let payload: TaskListPayload = serde_json::from_value(value).map_err(invalid)?;
        let task = select_active_task(&payload.tasks).ok_or(RequestError::NoTasks)?;
        let (title, url) = (task.title.clone(), task.url.clone());
        build(title, url, payload.shared, defaults)
    } else {
        let payload: LegacyPayload = serde_json::from_value(value).map_err(invalid)?;
        build(payload.next_window_title, payload.next_url, payload.shared, defaults)
    }
}

fn build(
    next_window_title: String,
    next_url: Option<String>,
    shared: SharedFields,
    defaults: &RequestDefaults,
) -> Result<NormalizedRequest, RequestError> {
    let current_state = match shared.current_state.as_deref() {
        Some(raw) => raw.parse()?,
        None => defaults.current_state,
    };

    Ok(NormalizedRequest {
        request: AnalyzeRequest {
            current_state,
            next_window_title,
            next_url,
            snippet_text: shared.snippet_text,
            current_task_context: shared.current_task_context,
        },
        session: SessionContext {
            time_of_day: shared.time_of_day.unwrap_or(defaults.time_of_day),
            session_duration: shared.session_duration.unwrap_or(defaults.session_duration),
        },
    })
}
