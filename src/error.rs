use std::io;
use thiserror::Error;

/// Error type for Scalaris operations.
///
/// The set of kinds is closed: transport failures and failures reported
/// by the store inside a well-formed response both end up here.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScalarisError {
    /// A read failed because the key did not exist.
    #[error("scalaris: key not found")]
    NotFound,

    /// The commit of a transaction failed.
    #[error("scalaris: abort")]
    Abort,

    /// The store could not be reached, or the connection broke.
    #[error("scalaris: connection error: {0}")]
    Connection(String),

    /// A test-and-set failed because the old value did not match.
    #[error("scalaris: key changed")]
    KeyChanged,

    /// A delete failed because no node was found.
    #[error("scalaris: node not found")]
    NodeNotFound,

    /// A list operation was applied to a value that is not a list.
    #[error("scalaris: not a list")]
    NotAList,

    /// A numeric operation was applied to a value that is not a number.
    #[error("scalaris: not a number")]
    NotANumber,

    /// The operation did not complete in time.
    #[error("scalaris: timeout reached")]
    Timeout,

    /// Anything the client could not make sense of.
    #[error("scalaris: unknown error: {0}")]
    Unknown(String),
}

impl From<io::Error> for ScalarisError {
    fn from(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => ScalarisError::Timeout,
            _ => ScalarisError::Connection(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for ScalarisError {
    fn from(err: serde_json::Error) -> Self {
        ScalarisError::Unknown(err.to_string())
    }
}

/// Result type alias for Scalaris operations.
pub type Result<T> = std::result::Result<T, ScalarisError>;
