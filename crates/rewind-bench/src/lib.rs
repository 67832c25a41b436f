//! Benchmark profiles for the Rewind replay codec.
//!
//! - [`skirmish_replay`]: a scripted two-player replay on a checkerboard map
//! - [`ladder_map`]: a full-size 256x256 map

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use rewind_frame::Frame;
use rewind_map::{MapError, PackedMap};
use rewind_replay::Replay;
use rewind_test_utils::{checkerboard_layers, skirmish};

/// Side length of [`ladder_map`].
pub const LADDER_SIDE: u32 = 256;

/// A `frames`-long skirmish on a 64x64 map with the given keyframe interval.
pub fn skirmish_replay(frames: usize, keyframe: u32, seed: u64) -> Result<Replay, MapError> {
    let mut replay: Replay<Frame> = Replay::with_keyframe(keyframe);
    replay.set_map(&checkerboard_layers(64, 64))?;
    for frame in skirmish(frames, seed) {
        replay.push(frame);
    }
    replay.set_num_units(0, 4);
    replay.set_num_units(1, 4);
    Ok(replay)
}

/// A [`LADDER_SIDE`]-square checkerboard map.
pub fn ladder_map() -> Result<PackedMap, MapError> {
    PackedMap::encode(&checkerboard_layers(LADDER_SIDE, LADDER_SIDE))
}
