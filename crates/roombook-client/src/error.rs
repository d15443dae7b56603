//! Client error types.

use thiserror::Error;

use roombook_core::{BookingError, StoreError};

use crate::form::ValidationError;

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors that can occur in the client.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// A form field is missing or malformed.
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// The booking store refused the operation.
    #[error("{0}")]
    Booking(#[from] BookingError),

    /// The key-value store could not be opened or decoded.
    #[error("storage error: {0}")]
    Storage(#[from] StoreError),

    /// No meeting at the given list position.
    #[error("no meeting at position {position} (the list has {len})")]
    NoSuchRow { position: usize, len: usize },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
