//! Error types for authoring/load-time failures.
//!
//! The per-frame API never returns these: queries degrade to documented
//! defaults and unknown names are logged and ignored.

use thiserror::Error;

/// Errors produced while parsing or validating a network definition.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum NetworkError {
    #[error("network json parse error: {0}")]
    Parse(String),

    #[error("network definition has no root node")]
    MissingRoot,

    #[error("state machine default state '{default_state}' is not a declared state")]
    UnknownDefaultState { default_state: String },

    #[error("state '{state}' has a transition to unknown target '{target}'")]
    UnknownTransitionTarget { state: String, target: String },

    #[error("parameter '{name}' has an invalid range [{min}, {max}]")]
    InvalidParameterRange { name: String, min: f32, max: f32 },
}

impl From<serde_json::Error> for NetworkError {
    fn from(err: serde_json::Error) -> Self {
        NetworkError::Parse(err.to_string())
    }
}
