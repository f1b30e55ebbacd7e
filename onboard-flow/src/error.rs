use thiserror::Error;

use crate::route::Route;
use crate::session::UploadStatus;
use crate::validation::ValidationError;

#[derive(Debug, Error)]
pub enum FlowError {
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Cannot {operation} while session is {from:?}")]
    InvalidTransition {
        from: UploadStatus,
        operation: &'static str,
    },

    #[error("Stale backend response (expected generation {expected}, got {got})")]
    StaleResponse { expected: u64, got: u64 },

    #[error("Route {0:?} has no next step")]
    NoNextStep(Route),

    #[error("Context error: {0}")]
    Context(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<reqwest::Error> for FlowError {
    fn from(err: reqwest::Error) -> Self {
        FlowError::Transport(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, FlowError>;
