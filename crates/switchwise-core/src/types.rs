//! Per-request data model shared by the pipeline stages.
//!
//! `FocusState` is closed: the set of states is fixed by the product.
//! `TaskCategory` and `Suitability` are open labels because learned models
//! may emit values outside any canonical vocabulary.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::RequestError;

/// The user's current attentional/energy condition.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FocusState {
    HighlyFocused,
    #[default]
    Focused,
    Distracted,
    HighlyDistracted,
    Tired,
}

impl FocusState {
    pub const ALL: [FocusState; 5] = [
        FocusState::HighlyFocused,
        FocusState::Focused,
        FocusState::Distracted,
        FocusState::HighlyDistracted,
        FocusState::Tired,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FocusState::HighlyFocused => "highly_focused",
            FocusState::Focused => "focused",
            FocusState::Distracted => "distracted",
            FocusState::HighlyDistracted => "highly_distracted",
            FocusState::Tired => "tired",
        }
    }
}

impl fmt::Display for FocusState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FocusState {
    type Err = RequestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FocusState::ALL
            .into_iter()
            .find(|state| state.as_str() == s)
            .ok_or_else(|| RequestError::UnknownState(s.to_string()))
    }
}

/// Semantic type of an upcoming activity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskCategory(String);

impl TaskCategory {
    pub const DEEP_WORK_CODING: &'static str = "deep_work_coding";
    pub const STUDYING_READING: &'static str = "studying_reading";
    pub const WRITING_NOTES: &'static str = "writing_notes";
    pub const RESEARCH_BROWSING: &'static str = "research_browsing";
    pub const LIGHT_BROWSING: &'static str = "light_browsing";
    pub const SOCIAL_MEDIA: &'static str = "social_media";
    pub const ENTERTAINMENT_VIDEO: &'static str = "entertainment_video";
    pub const COMMUNICATION: &'static str = "communication";
    pub const UTILITY_PRODUCTIVE: &'static str = "utility_productive";
    pub const OTHER_UNKNOWN: &'static str = "other_unknown";

    /// Canonical labels in model output order.
    pub const CANONICAL: [&'static str; 10] = [
        Self::DEEP_WORK_CODING,
        Self::STUDYING_READING,
        Self::WRITING_NOTES,
        Self::RESEARCH_BROWSING,
        Self::LIGHT_BROWSING,
        Self::SOCIAL_MEDIA,
        Self::ENTERTAINMENT_VIDEO,
        Self::COMMUNICATION,
        Self::UTILITY_PRODUCTIVE,
        Self::OTHER_UNKNOWN,
    ];

    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_one_of(&self, labels: &[&str]) -> bool {
        labels.contains(&self.0.as_str())
    }
}

impl fmt::Display for TaskCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TaskCategory {
    fn from(label: &str) -> Self {
        Self::new(label)
    }
}

/// Judgment of whether switching to the next task is beneficial.
///
/// Nominally `good`, `neutral`, `bad` or `harmful`, but never validated.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Suitability(String);

impl Suitability {
    pub const GOOD: &'static str = "good";
    pub const NEUTRAL: &'static str = "neutral";
    pub const BAD: &'static str = "bad";
    pub const HARMFUL: &'static str = "harmful";

    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    pub fn neutral() -> Self {
        Self::new(Self::NEUTRAL)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_one_of(&self, labels: &[&str]) -> bool {
        labels.contains(&self.0.as_str())
    }
}

impl fmt::Display for Suitability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Suitability {
    fn from(label: &str) -> Self {
        Self::new(label)
    }
}

/// Normalized analyze request, independent of the payload shape it came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzeRequest {
    #[serde(default)]
    pub current_state: FocusState,
    pub next_window_title: String,
    #[serde(default)]
    pub next_url: Option<String>,
    #[serde(default)]
    pub snippet_text: Option<String>,
    /// Reserved; no rule reads it yet.
    #[serde(default)]
    pub current_task_context: Option<String>,
}

/// Numeric features fed to the fusion model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SessionContext {
    /// Hour of day, 0-23. Fractional hours pass through unchanged.
    pub time_of_day: f64,
    /// Minutes spent in the current session.
    pub session_duration: f64,
}

impl Default for SessionContext {
    fn default() -> Self {
        Self {
            time_of_day: 12.0,
            session_duration: 0.0,
        }
    }
}

/// Machine-readable tag plus human-readable guidance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    #[serde(rename = "type")]
    pub kind: String,
    pub message: String,
}

/// Response returned for every successful analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzeResponse {
    pub next_task_category: TaskCategory,
    pub suitability: Suitability,
    pub reason: String,
    pub recommendation: Recommendation,
}
