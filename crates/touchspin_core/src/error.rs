//! Spinner error types
//!
//! Only caller contract violations surface as errors. Bad configuration values
//! and bad typed text are recovered where they occur.

use thiserror::Error;

/// Contract violations reported to the adapter
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SpinnerError {
    /// Subscribed to an event name that does not exist
    #[error("Unknown event name: {0}")]
    UnknownEvent(String),

    /// Legacy command string not present in the translation table
    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    /// Legacy command given an argument of the wrong shape
    #[error("Invalid argument for {command}: {reason}")]
    InvalidCommandArgument { command: String, reason: String },

    /// A settings document that could not be parsed at all
    #[error("Settings document parse failed: {0}")]
    ConfigParse(String),
}

/// Result type for spinner operations
pub type Result<T> = std::result::Result<T, SpinnerError>;
