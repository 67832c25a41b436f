//! Rewind: keyframed delta replay serialization for game frame streams.
//!
//! This is the top-level facade crate that re-exports the public API from
//! all Rewind sub-crates. For most users, adding `rewind` as a single
//! dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use rewind::prelude::*;
//!
//! let layers = MapLayers {
//!     width: 2,
//!     height: 3,
//!     walkability: vec![1, 1, 1, 0, 0, 1],
//!     ground_height: vec![0, 0, 1, 1, 2, 2],
//!     buildability: vec![1, 0, 1, 0, 1, 0],
//!     start_locations: vec![(0, 0), (1, 2)],
//! };
//!
//! let mut replay = Replay::with_keyframe(8);
//! replay.set_map(&layers).unwrap();
//! for tick in 0..20 {
//!     let mut frame = Frame::default();
//!     let mut marine = Unit::spawn(1);
//!     marine.x = tick;
//!     marine.health = 40;
//!     frame.units.insert(0, vec![marine]);
//!     replay.push(frame);
//! }
//! replay.set_num_units(0, 1);
//!
//! let mut buf = Vec::new();
//! replay.write_to(&mut buf).unwrap();
//!
//! let back: Replay = Replay::read_from(buf.as_slice()).unwrap();
//! assert_eq!(back.len(), 20);
//! assert_eq!(back.frame(19).unwrap().unit(0, 1).unwrap().x, 19);
//! assert_eq!(back.get_map().unwrap(), layers);
//! ```
//!
//! # Modules
//!
//! Each module corresponds to a sub-crate. Use them for types not in the prelude:
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `rewind-core` | Token grammar, codec traits, keyframe policy, errors |
//! | [`map`] | `rewind-map` | Packed per-tile map store |
//! | [`frame`] | `rewind-frame` | Frame model and the diff engine |
//! | [`replay`] | `rewind-replay` | Replay container, streaming writer and reader |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Token grammar, codec traits and keyframe policy (`rewind-core`).
///
/// Implement [`types::StreamCodec`] and [`types::Diffable`] to store
/// a custom frame type in a [`replay::Replay`].
pub use rewind_core as types;

/// Packed per-tile map store (`rewind-map`).
pub use rewind_map as map;

/// Frame model and diff engine (`rewind-frame`).
///
/// [`frame::Frame`] is the default frame type; [`frame::FrameDiff`] is
/// what a diff frame holds on the wire.
pub use rewind_frame as frame;

/// Replay container and stream codec (`rewind-replay`).
///
/// Hold a whole replay with [`replay::Replay`], or stream one with
/// [`replay::ReplayWriter`] and [`replay::ReplayReader`].
pub use rewind_replay as replay;

/// Common imports for typical Rewind usage.
///
/// ```rust
/// use rewind::prelude::*;
/// ```
pub mod prelude {
    // Codec traits and keyframe policy
    pub use rewind_core::{Diffable, FrameRole, StreamCodec};

    // Map
    pub use rewind_map::{MapLayers, PackedMap, PackedTile};

    // Frames
    pub use rewind_frame::{Action, Bullet, Frame, FrameDiff, Order, Resources, Unit, UnitAttr};

    // Replay
    pub use rewind_replay::{
        CodecConfig, Replay, ReplayError, ReplayReader, ReplayWriter, UnitCounts,
    };

    // Errors
    pub use rewind_core::{DiffError, FormatError};
    pub use rewind_map::MapError;
}
