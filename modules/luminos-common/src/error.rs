use thiserror::Error;
use uuid::Uuid;

use crate::types::IssueStatus;

#[derive(Error, Debug)]
pub enum LuminosError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid coordinate {input:?}: {reason}")]
    InvalidCoordinate { input: String, reason: String },

    #[error("Invalid status transition: {from} -> {to}")]
    InvalidTransition { from: IssueStatus, to: IssueStatus },

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Not found: {0}")]
    NotFound(Uuid),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}
