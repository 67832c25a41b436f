//! Error types for map construction.

use std::error::Error;
use std::fmt;

/// Errors detected while building a packed map.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MapError {
    /// Width or height is zero or does not fit the grid.
    InvalidSize {
        /// Requested width (x extent).
        width: i64,
        /// Requested height (y extent).
        height: i64,
    },
    /// An attribute layer does not hold exactly `width * height` values.
    LayerLength {
        /// Which layer was wrong.
        layer: &'static str,
        /// Expected number of values.
        expected: usize,
        /// Number of values supplied.
        found: usize,
    },
    /// A start location lies outside the grid.
    StartLocationOutOfBounds {
        /// X coordinate of the start location.
        x: i32,
        /// Y coordinate of the start location.
        y: i32,
    },
    /// A raw tile byte has reserved bits set.
    ReservedBits {
        /// X coordinate of the tile.
        x: u32,
        /// Y coordinate of the tile.
        y: u32,
        /// The offending byte.
        byte: u8,
    },
}

impl fmt::Display for MapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidSize { width, height } => {
                write!(f, "invalid map size {width}x{height}")
            }
            Self::LayerLength {
                layer,
                expected,
                found,
            } => write!(
                f,
                "{layer} layer has {found} values, expected {expected}"
            ),
            Self::StartLocationOutOfBounds { x, y } => {
                write!(f, "start location ({x}, {y}) is outside the map")
            }
            Self::ReservedBits { x, y, byte } => {
                write!(f, "tile ({x}, {y}) has reserved bits set: {byte:#010b}")
            }
        }
    }
}

impl Error for MapError {}
