//! Streaming replay writer.
//!
//! [`ReplayWriter`] writes the header, map and frame count on
//! construction, then one frame per [`write_frame`](ReplayWriter::write_frame)
//! call. [`finish`](ReplayWriter::finish) appends the unit-count trailer.

use std::io::Write;

use rewind_core::{Diffable, FrameRole, TokenWriter};
use rewind_frame::Frame;
use rewind_map::PackedMap;

use crate::codec::{
    encode_frame_at, encode_header, encode_map, encode_unit_counts, ReplayHeader, UnitCounts,
};
use crate::error::ReplayError;

/// Writes a replay to a byte stream one frame at a time.
///
/// The frame count is part of the header, so it must be known up front;
/// [`finish`](Self::finish) fails if a different number of frames was
/// written.
///
/// # Examples
///
/// ```
/// use rewind_frame::Frame;
/// use rewind_map::PackedMap;
/// use rewind_replay::{ReplayReader, ReplayWriter, UnitCounts};
///
/// let map = PackedMap::from_raw(2, 2, vec![0x01, 0x03, 0x21, 0x00]).unwrap();
///
/// let mut buf = Vec::new();
/// let mut writer = ReplayWriter::new(&mut buf, &map, 2, 3).unwrap();
/// for tick in 0..3 {
///     let frame = Frame { reward: tick as f32, ..Frame::default() };
///     writer.write_frame(&frame).unwrap();
/// }
/// writer.finish(&UnitCounts::new()).unwrap();
///
/// let reader: ReplayReader<_> = ReplayReader::open(buf.as_slice()).unwrap();
/// assert_eq!(reader.map(), &map);
/// assert_eq!(reader.frame_count(), 3);
/// let last = reader.frames().last().unwrap().unwrap();
/// assert_eq!(last.reward, 2.0);
/// ```
pub struct ReplayWriter<W: Write, F = Frame> {
    tokens: TokenWriter<W>,
    keyframe: u32,
    frame_count: usize,
    frames_written: usize,
    previous: Option<F>,
}

impl<W: Write, F: Diffable + Clone> ReplayWriter<W, F> {
    /// Create a writer, immediately writing header, map and frame count.
    pub fn new(
        sink: W,
        map: &PackedMap,
        keyframe: u32,
        frame_count: usize,
    ) -> Result<Self, ReplayError> {
        let mut tokens = TokenWriter::new(sink);
        let header = ReplayHeader::for_map(map, keyframe);
        encode_header(&mut tokens, &header)?;
        encode_map(&mut tokens, map)?;
        tokens.write_len(frame_count)?;
        log::debug!(
            "writing replay: {}x{} map, {} frames, keyframe {}",
            header.width,
            header.height,
            frame_count,
            keyframe
        );
        Ok(Self {
            tokens,
            keyframe,
            frame_count,
            frames_written: 0,
            previous: None,
        })
    }

    /// Write the next frame, in full or as a diff from the last one.
    pub fn write_frame(&mut self, frame: &F) -> Result<(), ReplayError> {
        let position = self.frames_written;
        if position == self.frame_count {
            return Err(ReplayError::FrameCountMismatch {
                declared: self.frame_count,
                written: position + 1,
            });
        }
        let role = FrameRole::at(position, self.keyframe);
        log::trace!("frame {position}: {role:?}");
        encode_frame_at(
            &mut self.tokens,
            position,
            self.keyframe,
            frame,
            self.previous.as_ref(),
        )?;
        self.frames_written += 1;

        // Only a following diff frame needs this one as its base.
        self.previous = match FrameRole::at(self.frames_written, self.keyframe) {
            FrameRole::DiffFrame if self.frames_written < self.frame_count => Some(frame.clone()),
            _ => None,
        };
        Ok(())
    }

    /// Number of frames written so far.
    pub fn frames_written(&self) -> usize {
        self.frames_written
    }

    /// Number of bytes written so far.
    pub fn bytes_written(&self) -> u64 {
        self.tokens.bytes_written()
    }

    /// Write the unit-count trailer, flush, and return the sink.
    ///
    /// Fails without writing anything if fewer frames were written than
    /// declared.
    pub fn finish(mut self, num_units: &UnitCounts) -> Result<W, ReplayError> {
        if self.frames_written != self.frame_count {
            return Err(ReplayError::FrameCountMismatch {
                declared: self.frame_count,
                written: self.frames_written,
            });
        }
        encode_unit_counts(&mut self.tokens, num_units)?;
        self.tokens.flush()?;
        log::debug!(
            "replay written: {} frames, {} bytes",
            self.frames_written,
            self.tokens.bytes_written()
        );
        Ok(self.tokens.into_inner())
    }
}
