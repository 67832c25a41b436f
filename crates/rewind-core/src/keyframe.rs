//! Keyframe role policy.
//!
//! Every position in a frame sequence is either a [`FrameRole::Keyframe`],
//! stored as a complete snapshot, or a [`FrameRole::DiffFrame`], stored as
//! a delta against its immediate predecessor. The role depends only on
//! the position and the configured interval, so writer and reader always
//! agree without any per-frame tag in the stream.

/// Storage role of a frame at a given position.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FrameRole {
    /// Stored in full; decodable on its own.
    Keyframe,
    /// Stored as a delta against the previous frame.
    DiffFrame,
}

impl FrameRole {
    /// Role of the frame at `position` for the configured `keyframe`
    /// interval (`0` means every frame is a keyframe).
    pub fn at(position: usize, keyframe: u32) -> Self {
        if position % effective_keyframe(keyframe) == 0 {
            Self::Keyframe
        } else {
            Self::DiffFrame
        }
    }

    /// `true` for [`FrameRole::Keyframe`].
    pub fn is_keyframe(self) -> bool {
        self == Self::Keyframe
    }
}

/// Keyframe spacing actually used for role decisions.
///
/// An interval of `0` disables diffing, which is the same as an
/// interval of `1`.
pub fn effective_keyframe(keyframe: u32) -> usize {
    if keyframe == 0 {
        1
    } else {
        keyframe as usize
    }
}
