//! Error type for the approval workflow

use common::error::DatabaseError;
use thiserror::Error;

/// Every way an approval operation can fail
#[derive(Error, Debug)]
pub enum ApprovalError {
    /// No caller identity was supplied
    #[error("Authentication required")]
    Unauthenticated,

    /// The caller's role may not read or decide the requested queue
    #[error("{0}")]
    Forbidden(String),

    /// Malformed filter, unknown role or incomplete payload
    #[error("{0}")]
    InvalidInput(String),

    /// Missing, or owned by another role or business
    #[error("{0}")]
    NotFound(String),

    /// The approval has already left `pending`
    #[error("{0}")]
    Conflict(String),

    /// The backing store failed
    #[error("Approval store error: {0}")]
    Store(#[from] DatabaseError),
}

impl ApprovalError {
    pub fn forbidden(msg: impl Into<String>) -> Self {
        ApprovalError::Forbidden(msg.into())
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        ApprovalError::InvalidInput(msg.into())
    }

    pub fn not_found() -> Self {
        ApprovalError::NotFound("Approval not found".to_string())
    }

    pub fn already_reviewed() -> Self {
        ApprovalError::Conflict("Approval has already been reviewed".to_string())
    }
}

/// Type alias for approval workflow results
pub type ApprovalResult<T> = Result<T, ApprovalError>;
