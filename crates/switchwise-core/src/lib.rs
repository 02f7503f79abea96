//! # Switchwise Core Library
//!
//! This library provides the core logic for Switchwise, a task-switch
//! recommender. Given a user's current focus state and a description of the
//! task they are about to switch to, it produces one recommendation. The CLI
//! binary and the HTTP service are thin layers over this crate.
//!
//! ## Architecture
//!
//! - **Task Classifier**: maps window title, URL and snippet text to a task
//!   category using a sequence model, a tabular model or keyword heuristics
//! - **Fusion Model**: estimates how suitable the transition is from the
//!   focus state, the category and session context
//! - **Decision Engine**: an ordered rule table that turns the triple into a
//!   reason and a recommendation
//! - **Storage**: TOML-based configuration
//!
//! ## Key Components
//!
//! - [`Analyzer`]: Runs the three stages over one request
//! - [`TaskClassifier`]: Backend chosen once at startup, never fails per call
//! - [`FusionModel`]: Falls back to `neutral` when unavailable
//! - [`decide`]: Pure rule evaluation
//! - [`Config`]: Application configuration management

pub mod analyzer;
pub mod classifier;
pub mod decision;
pub mod error;
pub mod fusion;
pub mod request;
pub mod storage;
pub mod types;

pub use analyzer::{Analysis, Analyzer, ModelStatus};
pub use classifier::{ClassifierMode, TaskClassifier};
pub use decision::{decide, Decision};
pub use error::{ConfigError, CoreError, ModelError, RequestError, Result};
pub use fusion::FusionModel;
pub use request::RequestDefaults;
pub use storage::Config;
pub use types::{
    AnalyzeRequest, AnalyzeResponse, FocusState, Recommendation, SessionContext, Suitability,
    TaskCategory,
};
