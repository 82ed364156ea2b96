//! CLI command implementations.

pub mod admin;
pub mod session;
pub mod shop;

use pawshop_client::error::ClientError;
use thiserror::Error;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// The client rejected or failed the operation.
    #[error(transparent)]
    Client(#[from] ClientError),

    /// Writing output or reading input failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An argument could not be used.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The admin session is missing or no longer valid.
    #[error("Not signed in. Run `pawshop login` first")]
    NotSignedIn,
}

pub type Result<T> = std::result::Result<T, CommandError>;
