//! The module contains the error the engine can throw.
//!
//! The errors are:
//!
//! - [`InvalidInput`] thrown when a request does not satisfy the entity rules.
//! - [`AlreadyPaid`] thrown when a quick-pay targets a settled participant.
//! - [`KeyNotFound`] thrown when an item is not found.
//! - [`NoParticipants`] thrown when a stored event has an empty roster.
//! - [`Overflow`] thrown when stored amounts add up past `i64`.
//!
//!  [`InvalidInput`]: EngineError::InvalidInput
//!  [`AlreadyPaid`]: EngineError::AlreadyPaid
//!  [`KeyNotFound`]: EngineError::KeyNotFound
//!  [`NoParticipants`]: EngineError::NoParticipants
//!  [`Overflow`]: EngineError::Overflow
use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Already paid in full: {0}")]
    AlreadyPaid(String),
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
    #[error("Data error: {0}")]
    NoParticipants(String),
    #[error("Data error: {0}")]
    Overflow(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::InvalidInput(a), Self::InvalidInput(b)) => a == b,
            (Self::AlreadyPaid(a), Self::AlreadyPaid(b)) => a == b,
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::NoParticipants(a), Self::NoParticipants(b)) => a == b,
            (Self::Overflow(a), Self::Overflow(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
