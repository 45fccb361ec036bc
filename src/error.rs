//! Error types for termline.

use std::collections::TryReserveError;
use std::fmt;
use std::io;

/// Result type alias for termline operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for termline operations.
///
/// Overflowing the input line is deliberately not represented here: edits
/// that would exceed the line capacity are rejected locally and report
/// `false` instead.
#[derive(Debug)]
pub enum Error {
    /// I/O error from terminal or persistence operations.
    Io(io::Error),
    /// A blocking read was interrupted by the user.
    Interrupted,
    /// A buffer could not grow.
    OutOfMemory,
    /// Unknown mark attribute name.
    InvalidAttribute(String),
    /// Unknown edit command name.
    UnknownCommand(String),
    /// Key sequence name that cannot be decoded.
    InvalidKeySequence(String),
    /// Malformed persisted directive.
    Parse { line: usize, message: String },
}

impl Error {
    /// Whether this error aborts the current operation only because the
    /// user asked for it.
    #[must_use]
    pub fn is_interrupt(&self) -> bool {
        matches!(self, Self::Interrupted)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::Interrupted => write!(f, "user break"),
            Self::OutOfMemory => write!(f, "out of memory"),
            Self::InvalidAttribute(s) => write!(f, "invalid attribute: {s}"),
            Self::UnknownCommand(s) => write!(f, "unknown edit command: {s}"),
            Self::InvalidKeySequence(s) => write!(f, "invalid key sequence: {s}"),
            Self::Parse { line, message } => write!(f, "line {line}: {message}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        if e.kind() == io::ErrorKind::Interrupted {
            Self::Interrupted
        } else {
            Self::Io(e)
        }
    }
}

impl From<TryReserveError> for Error {
    fn from(_: TryReserveError) -> Self {
        Self::OutOfMemory
    }
}

/// Copy `bytes` into a fresh vector, reporting allocation failure instead of
/// aborting.
pub fn try_to_vec(bytes: &[u8]) -> Result<Vec<u8>> {
    let mut v = Vec::new();
    v.try_reserve_exact(bytes.len())?;
    v.extend_from_slice(bytes);
    Ok(v)
}
