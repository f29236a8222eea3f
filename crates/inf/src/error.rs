use thiserror::Error;

#[cfg(feature = "sqlite3")]
use crate::status::{StatusError, StatusKind};

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("Overflow: {0}")]
    Overflow(String),
    #[error("Underflow: {0}")]
    Underflow(String),
    #[error("Runtime error: {0}")]
    Runtime(String),
    #[cfg(feature = "sqlite3")]
    #[error("Database error: {0}")]
    DatabaseError(#[from] StatusError),
    #[error("Invalid string: {0}")]
    InvalidString(#[from] std::ffi::NulError),
    #[error("Invalid utf8: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),
    #[error("IO error: {0}")]
    IOError(#[from] std::io::Error),
}

#[cfg(feature = "sqlite3")]
impl Error {
    /// The classified engine status, `None` for errors raised by this layer itself
    pub fn status_kind(&self) -> Option<StatusKind> {
        match self {
            Error::DatabaseError(err) => Some(err.kind()),
            _ => None,
        }
    }

    /// True when this is an engine error whose kind is `kind` or one of its descendants
    pub fn is(&self, kind: StatusKind) -> bool {
        self.status_kind().is_some_and(|k| k.is_a(kind))
    }
}

impl From<std::num::TryFromIntError> for Error {
    fn from(err: std::num::TryFromIntError) -> Self {
        Error::Overflow(err.to_string())
    }
}
