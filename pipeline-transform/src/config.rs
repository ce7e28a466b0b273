//! Pipeline configuration.

use serde::{Deserialize, Serialize};

/// Configuration carried by a pipeline handle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Name used when logging passes.
    #[serde(default = "default_name")]
    pub name: String,
    /// Separator used by `join_default`.
    #[serde(default = "default_join_separator")]
    pub join_separator: String,
    /// Event type attached to inspect records.
    #[serde(default = "default_inspect_event_type")]
    pub inspect_event_type: String,
    /// Whether pass start/completion is logged.
    #[serde(default = "default_trace_passes")]
    pub trace_passes: bool,
}

fn default_name() -> String {
    "pipeline".to_string()
}

fn default_join_separator() -> String {
    ",".to_string()
}

fn default_inspect_event_type() -> String {
    "pipeline.inspect".to_string()
}

fn default_trace_passes() -> bool {
    true
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            join_separator: default_join_separator(),
            inspect_event_type: default_inspect_event_type(),
            trace_passes: default_trace_passes(),
        }
    }
}

impl PipelineConfig {
    /// Creates a new configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the pipeline name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the default join separator.
    #[must_use]
    pub fn with_join_separator(mut self, separator: impl Into<String>) -> Self {
        self.join_separator = separator.into();
        self
    }

    /// Sets the inspect event type.
    #[must_use]
    pub fn with_inspect_event_type(mut self, event_type: impl Into<String>) -> Self {
        self.inspect_event_type = event_type.into();
        self
    }

    /// Enables or disables pass logging.
    #[must_use]
    pub fn with_trace_passes(mut self, enabled: bool) -> Self {
        self.trace_passes = enabled;
        self
    }
}
