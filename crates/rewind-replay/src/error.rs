//! Error types for the replay codec.

use std::error::Error;
use std::fmt;
use std::io;

use rewind_core::{DiffError, FormatError};
use rewind_map::MapError;

use crate::config::ConfigError;

/// Errors that can occur while writing or reading a replay.
///
/// Every error aborts the operation. A replay being read into is left
/// untouched; the caller discards the stream.
#[derive(Debug)]
pub enum ReplayError {
    /// File could not be opened or created.
    Io(io::Error),
    /// A token could not be read or written.
    Format(FormatError),
    /// The map buffer was rejected.
    Map(MapError),
    /// The codec configuration is invalid.
    Config(ConfigError),
    /// The header declares a non-positive map dimension.
    InvalidMapSize {
        /// Declared width.
        width: i64,
        /// Declared height.
        height: i64,
    },
    /// The unit-count trailer declares a negative entry count.
    NegativeEntryCount {
        /// The declared count.
        count: i64,
    },
    /// The replay has no map to write.
    MissingMap,
    /// A streaming writer was finished with the wrong number of frames.
    FrameCountMismatch {
        /// Frame count written in the header.
        declared: usize,
        /// Frames actually written.
        written: usize,
    },
    /// A declared size exceeds the configured decode limit.
    LimitExceeded {
        /// Which size.
        what: &'static str,
        /// Declared value.
        value: u64,
        /// Configured limit.
        limit: u64,
    },
    /// A diff frame could not be applied to its predecessor.
    Diff {
        /// Position of the diff frame.
        position: usize,
        /// Why the delta did not apply.
        source: DiffError,
    },
}

impl fmt::Display for ReplayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::Format(e) => write!(f, "{e}"),
            Self::Map(e) => write!(f, "invalid map: {e}"),
            Self::Config(e) => write!(f, "invalid codec config: {e}"),
            Self::InvalidMapSize { width, height } => {
                write!(f, "corrupted replay: invalid map size {width}x{height}")
            }
            Self::NegativeEntryCount { count } => {
                write!(f, "corrupted replay: negative unit entry count {count}")
            }
            Self::MissingMap => write!(f, "replay has no map"),
            Self::FrameCountMismatch { declared, written } => {
                write!(f, "declared {declared} frames but wrote {written}")
            }
            Self::LimitExceeded { what, value, limit } => {
                write!(f, "{what} {value} exceeds limit {limit}")
            }
            Self::Diff { position, source } => {
                write!(f, "diff frame {position}: {source}")
            }
        }
    }
}

impl Error for ReplayError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Format(e) => Some(e),
            Self::Map(e) => Some(e),
            Self::Config(e) => Some(e),
            Self::Diff { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<io::Error> for ReplayError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<FormatError> for ReplayError {
    fn from(e: FormatError) -> Self {
        Self::Format(e)
    }
}

impl From<MapError> for ReplayError {
    fn from(e: MapError) -> Self {
        Self::Map(e)
    }
}

impl From<ConfigError> for ReplayError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}
