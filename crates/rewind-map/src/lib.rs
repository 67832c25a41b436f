//! Packed per-tile map store for Rewind replays.
//!
//! A replay carries one static map: a `width × height` grid where each
//! tile packs four attributes into a single byte. This crate provides the
//! byte grid itself ([`ByteGrid`]), the tile bitfield ([`PackedTile`]),
//! and the conversion between separate attribute layers and the packed
//! form ([`PackedMap::encode`] / [`PackedMap::decode`]).
//!
//! # Tile layout
//!
//! ```text
//! bit  7 6 | 5     | 4 3 2         | 1         | 0
//!      0 0 | start | ground height | buildable | walkable
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod grid;
pub mod store;
pub mod tile;

pub use error::MapError;
pub use grid::ByteGrid;
pub use store::{MapLayers, PackedMap};
pub use tile::PackedTile;
