//! Core types and traits for the Rewind replay format.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the token grammar shared by every layer of the stream, the two
//! capabilities a frame type must provide ([`StreamCodec`] and
//! [`Diffable`]), the keyframe role policy, and the error types.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod grammar;
pub mod keyframe;
pub mod traits;

pub use error::{DiffError, FormatError};
pub use grammar::{TokenReader, TokenWriter, MAX_TOKEN_LEN};
pub use keyframe::{effective_keyframe, FrameRole};
pub use traits::{Diffable, StreamCodec};
