//! Podlens error abstractions.

use thiserror::Error;

/// Application error variants.
#[derive(Debug, Error)]
pub enum AppError {
    /// The caller presented no usable credentials.
    #[error("unauthorized to perform the requested action")]
    Unauthorized,
    /// The caller's role lacks access to the requested data.
    #[error("forbidden to access the requested resource")]
    Forbidden,
    /// The caller's credentials are malformed or invalid.
    #[error("the given authorization credentials are malformed or invalid: {0}")]
    InvalidCredentials(String),
    /// The given input was invalid.
    #[error("validation error: {0}")]
    InvalidInput(String),
    /// The resource specified in the path is not found.
    #[error("the resource specified in the path is not found")]
    ResourceNotFound,
    /// The server has hit an internal error, but will remain online.
    #[error("internal server error")]
    Ise(anyhow::Error),
}
