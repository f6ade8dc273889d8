//! Error types for the billed core library.

use thiserror::Error;

/// Errors returned by a [`crate::store::BillStore`] implementation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    /// The server answered with a non-success status
    #[error("Erreur {0}")]
    Status(u16),

    /// The request never got a response (DNS, refused, timeout)
    #[error("Transport error: {0}")]
    Transport(String),

    /// The response body did not match the expected shape
    #[error("Decode error: {0}")]
    Decode(String),

    /// An update referenced a bill the store does not know
    #[error("Bill not found: {0}")]
    NotFound(String),
}

/// Errors surfaced by the New Bill form.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FormError {
    /// The selected file is not a jpg, jpeg or png image
    #[error("Invalid file extension: {0}")]
    InvalidFileExtension(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Errors reading or writing the persisted session.
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// No user is logged in
    #[error("No user in session")]
    NoUser,
}
