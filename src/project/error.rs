//! Error types for project scanning and configuration.

use thiserror::Error;

/// Errors raised while scanning a BitBake project.
#[derive(Debug, Error)]
pub enum ScanError {
    /// A single introspection command exited unsuccessfully; its category
    /// stays empty and the pipeline continues.
    #[error("{phase} failed: `{command}` exited with {status:?}: {stderr}")]
    PhaseFailure {
        phase: &'static str,
        command: String,
        status: Option<i32>,
        stderr: String,
    },

    /// The current run cannot continue; the snapshot is reset to empty.
    #[error("scan pipeline aborted during {phase}: {source}")]
    PipelineFailure {
        phase: &'static str,
        #[source]
        source: std::io::Error,
    },

    /// No BitBake driver is configured, nothing can be scanned.
    #[error("BitBake driver is not configured")]
    ToolNotConfigured,

    /// IO error while spawning a command or walking a layer.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ScanError {
    /// Wrap an IO failure of `phase` as a pipeline failure.
    pub fn pipeline(phase: &'static str, source: std::io::Error) -> Self {
        Self::PipelineFailure { phase, source }
    }
}

/// Errors raised while reading user settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Settings payload did not match the expected shape.
    #[error("invalid settings: {0}")]
    Invalid(#[from] serde_json::Error),
}
