//! Keyframed replay container and stream codec.
//!
//! A replay is a packed map, an ordered sequence of frames, and a small
//! side table of unit counts. Frames are written either in full or as
//! a diff from their predecessor, depending on the keyframe interval.
//!
//! # Architecture
//!
//! - [`Replay`] holds a whole replay in memory and reads/writes it in one go
//! - [`ReplayWriter`] streams frames to any `Write` sink
//! - [`ReplayReader`] streams materialised frames from any `BufRead` source
//! - [`codec`] has the layout functions the three share
//! - [`CodecConfig`] bounds the sizes a reader will accept
//!
//! # Format
//!
//! ```text
//! [0 <keyframe>] <width> <height> ' ' <raw map bytes>
//! <frame count> <frame or diff>*
//! <entry count> { <key> <value> }*
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod codec;
pub mod config;
pub mod error;
pub mod reader;
pub mod replay;
pub mod writer;

pub use codec::{ReplayHeader, UnitCounts};
pub use config::{CodecConfig, ConfigError};
pub use error::ReplayError;
pub use reader::{FrameIter, ReplayReader};
pub use replay::Replay;
pub use writer::ReplayWriter;
