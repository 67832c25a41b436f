//! Frame model and structural diff engine for Rewind replays.
//!
//! A [`Frame`] is one simulation tick of a real-time strategy game: the
//! units each player owns, the actions they issued, their resources, the
//! bullets in flight, and the reward signal. Consecutive frames are
//! highly redundant, so [`Frame::diff`](rewind_core::Diffable::diff)
//! produces a compact [`FrameDiff`] that
//! [`Frame::undiff`](rewind_core::Diffable::undiff) turns back into the
//! exact frame.
//!
//! Both types implement [`StreamCodec`](rewind_core::StreamCodec) so the
//! replay codec can store either form.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod codec;
pub mod diff;
pub mod types;

pub use diff::{AttrDelta, FrameDiff, UnitDiff};
pub use types::{Action, Bullet, Frame, Order, Resources, Unit, UnitAttr};
