//! Error types for pipeline construction and execution.
//!
//! Argument errors are raised eagerly by the builder call that introduced
//! them. Everything else surfaces from the pull chain to the caller of the
//! terminal consumer, aborting the pass.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T, E = PipelineError> = std::result::Result<T, E>;

/// The main error type for pipeline operations.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A builder or constructor received a malformed argument.
    #[error("{0}")]
    InvalidArgument(#[from] ArgumentError),

    /// A user-supplied stage or consumer function failed.
    #[error("{0}")]
    Stage(#[from] StageError),

    /// A fallible source produced an error.
    #[error("Source error: {0}")]
    Source(#[source] anyhow::Error),

    /// IO error while reading a byte source.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl PipelineError {
    /// Wraps a user error raised by the named operation.
    pub fn stage(operation: &'static str, source: impl Into<anyhow::Error>) -> Self {
        Self::Stage(StageError::new(operation, source))
    }

    /// Wraps an error produced by a fallible source.
    pub fn from_source(source: impl Into<anyhow::Error>) -> Self {
        Self::Source(source.into())
    }

    /// Returns true if this is an eager argument error.
    #[must_use]
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument(_))
    }

    /// Returns the failing operation name for stage errors.
    #[must_use]
    pub fn operation(&self) -> Option<&'static str> {
        match self {
            Self::Stage(err) => Some(err.operation),
            Self::InvalidArgument(err) => Some(err.operation),
            _ => None,
        }
    }
}

/// Metadata about an error for better diagnostics.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct ErrorInfo {
    /// Error code (e.g., "PIPELINE-ARG-BATCH_SIZE").
    pub code: String,
    /// Short summary of the error.
    pub summary: String,
    /// Hint for fixing the error.
    pub fix_hint: Option<String>,
    /// Additional context key-value pairs.
    #[serde(default)]
    pub context: HashMap<String, String>,
}

impl ErrorInfo {
    /// Creates a new error info.
    #[must_use]
    pub fn new(code: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            summary: summary.into(),
            fix_hint: None,
            context: HashMap::new(),
        }
    }

    /// Sets the fix hint.
    #[must_use]
    pub fn with_fix_hint(mut self, hint: impl Into<String>) -> Self {
        self.fix_hint = Some(hint.into());
        self
    }

    /// Adds a single context entry.
    #[must_use]
    pub fn with_context_entry(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    /// Converts to a dictionary representation.
    #[must_use]
    pub fn to_dict(&self) -> HashMap<String, serde_json::Value> {
        let mut map = HashMap::new();
        map.insert("code".to_string(), serde_json::Value::String(self.code.clone()));
        map.insert("summary".to_string(), serde_json::Value::String(self.summary.clone()));

        if let Some(ref hint) = self.fix_hint {
            map.insert("fix_hint".to_string(), serde_json::Value::String(hint.clone()));
        }
        if !self.context.is_empty() {
            let context_map: serde_json::Map<String, serde_json::Value> = self
                .context
                .iter()
                .map(|(k, v)| (k.clone(), serde_json::Value::String(v.clone())))
                .collect();
            map.insert("context".to_string(), serde_json::Value::Object(context_map));
        }

        map
    }
}

/// Error raised when a builder operation receives a malformed argument.
#[derive(Debug, Clone, Error)]
#[error("Invalid argument for '{operation}': {message}")]
pub struct ArgumentError {
    /// The builder operation that rejected the argument.
    pub operation: &'static str,
    /// The error message.
    pub message: String,
    /// Diagnostic info.
    pub error_info: ErrorInfo,
}

impl ArgumentError {
    /// Creates a new argument error.
    #[must_use]
    pub fn new(operation: &'static str, code: &str, message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            operation,
            error_info: ErrorInfo::new(code, message.clone())
                .with_context_entry("operation", operation),
            message,
        }
    }

    /// Sets the fix hint on the attached error info.
    #[must_use]
    pub fn with_fix_hint(mut self, hint: impl Into<String>) -> Self {
        self.error_info = self.error_info.with_fix_hint(hint);
        self
    }

    /// Builds the error for a size argument that must be positive.
    #[must_use]
    pub fn non_positive(operation: &'static str, argument: &str) -> Self {
        Self::new(
            operation,
            &format!("PIPELINE-ARG-{}", argument.to_uppercase()),
            format!("{argument} must be a positive integer, got 0"),
        )
        .with_fix_hint(format!("Pass a {argument} of at least 1."))
    }
}

/// Error raised when a user-supplied function fails during a pull.
#[derive(Debug, Error)]
#[error("Stage '{operation}' failed: {source}")]
pub struct StageError {
    /// The operation whose callback failed (e.g. "map", "reduce").
    pub operation: &'static str,
    /// The underlying error.
    #[source]
    pub source: anyhow::Error,
}

impl StageError {
    /// Creates a new stage error.
    pub fn new(operation: &'static str, source: impl Into<anyhow::Error>) -> Self {
        Self {
            operation,
            source: source.into(),
        }
    }
}
