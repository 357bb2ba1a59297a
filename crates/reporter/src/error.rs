//! Reporter error types

use contracts::ContractError;
use thiserror::Error;

/// Reporter-specific errors
#[derive(Debug, Error)]
pub enum ReporterError {
    /// Sink could not be built from its configuration
    #[error("failed to create sink '{name}': {source}")]
    SinkCreation {
        name: String,
        #[source]
        source: ContractError,
    },

    /// Two sinks share a name, so their metrics would collide
    #[error("duplicate sink name '{0}'")]
    DuplicateSink(String),
}

impl ReporterError {
    /// Create a sink creation error
    pub fn sink_creation(name: impl Into<String>, source: ContractError) -> Self {
        Self::SinkCreation {
            name: name.into(),
            source,
        }
    }
}
