//! Error types shared by every layer of the replay stream.
//!
//! [`FormatError`] covers everything that can go wrong while reading or
//! writing tokens; [`DiffError`] covers applying a delta to a base frame
//! that does not match it.

use std::error::Error;
use std::fmt;
use std::io;

/// Errors raised by the token grammar.
///
/// All variants are fatal for the stream being read: there is no way to
/// resynchronise a token stream after a bad token.
#[derive(Debug)]
pub enum FormatError {
    /// The underlying reader or writer failed.
    Io(io::Error),
    /// The stream ended before a complete value could be read.
    UnexpectedEof {
        /// What the reader was trying to read.
        expected: &'static str,
        /// Byte offset at which the stream ended.
        offset: u64,
    },
    /// A token could not be parsed as the expected type.
    InvalidToken {
        /// What the reader was trying to read.
        expected: &'static str,
        /// The offending token, lossily decoded.
        token: String,
        /// Byte offset of the first byte of the token.
        offset: u64,
    },
    /// The stream is well-formed at the token level but semantically
    /// invalid (bad enum tag, impossible flag value, ...).
    Corrupted {
        /// Human-readable description of what went wrong.
        detail: String,
    },
}

impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::UnexpectedEof { expected, offset } => {
                write!(f, "unexpected end of stream at byte {offset} reading {expected}")
            }
            Self::InvalidToken {
                expected,
                token,
                offset,
            } => write!(f, "invalid {expected} token {token:?} at byte {offset}"),
            Self::Corrupted { detail } => write!(f, "corrupted stream: {detail}"),
        }
    }
}

impl Error for FormatError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for FormatError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

/// Errors raised when a delta cannot be applied to its base frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DiffError {
    /// The delta refers to state the base frame does not have.
    StructuralMismatch {
        /// Description of the mismatch.
        detail: String,
    },
}

impl fmt::Display for DiffError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StructuralMismatch { detail } => {
                write!(f, "delta does not match base frame: {detail}")
            }
        }
    }
}

impl Error for DiffError {}
