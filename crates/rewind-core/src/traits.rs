//! Capabilities the replay codec needs from a frame type.
//!
//! The codec never looks inside a frame. It only needs to write and read
//! one ([`StreamCodec`]) and to compute and apply deltas between two
//! temporally adjacent frames ([`Diffable`]).

use std::io::{BufRead, Write};

use crate::error::{DiffError, FormatError};
use crate::grammar::{TokenReader, TokenWriter};

/// A value that can be written to and read from the token stream.
pub trait StreamCodec: Sized {
    /// Write `self` as a sequence of tokens.
    fn encode<W: Write>(&self, out: &mut TokenWriter<W>) -> Result<(), FormatError>;

    /// Read a value previously written by [`encode`](StreamCodec::encode).
    fn decode<R: BufRead>(input: &mut TokenReader<R>) -> Result<Self, FormatError>;
}

/// A frame that can be stored as a delta against its predecessor.
///
/// Implementations must satisfy the inverse law
/// `Self::undiff(&current.diff(&previous), &previous) == Ok(current)`
/// for every pair of frames taken from the same sequence.
pub trait Diffable: StreamCodec {
    /// The delta representation.
    type Delta: StreamCodec;

    /// Compute the delta that turns `previous` into `self`.
    fn diff(&self, previous: &Self) -> Self::Delta;

    /// Rebuild a frame from `previous` and a delta produced by
    /// [`diff`](Diffable::diff).
    ///
    /// Returns [`DiffError::StructuralMismatch`] when the delta refers to
    /// state that `previous` does not have. A partially patched frame is
    /// never returned.
    fn undiff(delta: &Self::Delta, previous: &Self) -> Result<Self, DiffError>;
}
