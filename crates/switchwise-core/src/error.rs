//! Core error types for switchwise-core.
//!
//! This module defines the error hierarchy using thiserror. Only request and
//! configuration errors ever reach a caller of the pipeline; model errors are
//! caught where they happen and turned into fallback results.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for switchwise-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Model loading or inference errors
    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    /// Malformed analyze payloads
    #[error("Request error: {0}")]
    Request(#[from] RequestError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Key does not exist in the configuration tree
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Could not determine or create the data directory
    #[error("Data directory unavailable: {0}")]
    DataDir(String),
}

/// Errors raised while loading a model artifact or running inference.
#[derive(Error, Debug)]
pub enum ModelError {
    /// Artifact exists but could not be read or parsed
    #[error("Failed to load model from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Artifact parsed but its tensors/tables are inconsistent
    #[error("Invalid model artifact: {0}")]
    InvalidArtifact(String),

    /// Inference produced no usable output
    #[error("Inference failed: {0}")]
    Inference(String),
}

/// Errors in the shape of an analyze request.
#[derive(Error, Debug)]
pub enum RequestError {
    /// Body is not a JSON object
    #[error("Invalid JSON")]
    InvalidJson,

    /// `tasks` was present but empty
    #[error("No tasks provided")]
    NoTasks,

    /// A required field is absent or has the wrong type
    #[error("Missing or invalid fields: {0}")]
    InvalidFields(String),

    /// `current_state` is not one of the known focus states
    #[error("Unknown focus state '{0}'")]
    UnknownState(String),
}

impl ModelError {
    pub(crate) fn load(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        ModelError::LoadFailed {
            path: path.into(),
            message: message.to_string(),
        }
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
