//! Streaming replay reader.
//!
//! [`ReplayReader`] decodes and validates the header, map and frame
//! count on open, then materialises frames one at a time. Diff frames
//! are applied to their predecessor as they are read, so callers only
//! ever see complete frames.

use std::io::BufRead;

use rewind_core::{Diffable, FrameRole, TokenReader};
use rewind_frame::Frame;
use rewind_map::PackedMap;

use crate::codec::{
    decode_frame_at, decode_frame_count, decode_header, decode_map, decode_unit_counts,
    ReplayHeader, UnitCounts,
};
use crate::config::CodecConfig;
use crate::error::ReplayError;
use crate::replay::Replay;

/// Reads a replay from a byte stream one frame at a time.
///
/// Generic over `R: BufRead` so tests can use `&[u8]` and production
/// code can use `BufReader<File>`.
pub struct ReplayReader<R: BufRead, F = Frame> {
    tokens: TokenReader<R>,
    config: CodecConfig,
    header: ReplayHeader,
    map: PackedMap,
    frame_count: usize,
    frames_read: usize,
    previous: Option<F>,
}

impl<R: BufRead, F: Diffable> ReplayReader<R, F> {
    /// Open a replay stream with the default decode limits.
    pub fn open(source: R) -> Result<Self, ReplayError> {
        Self::open_with_config(source, CodecConfig::default())
    }

    /// Open a replay stream, reading the header, map and frame count.
    pub fn open_with_config(source: R, config: CodecConfig) -> Result<Self, ReplayError> {
        config.validate()?;
        let mut tokens = TokenReader::new(source);
        let header = decode_header(&mut tokens)?;
        let map = decode_map(&mut tokens, &header, &config)?;
        let frame_count = decode_frame_count(&mut tokens, &config)?;
        log::debug!(
            "reading replay: {}x{} map, {} frames, keyframe {}",
            header.width,
            header.height,
            frame_count,
            header.keyframe
        );
        Ok(Self {
            tokens,
            config,
            header,
            map,
            frame_count,
            frames_read: 0,
            previous: None,
        })
    }

    /// Header fields of the stream.
    pub fn header(&self) -> &ReplayHeader {
        &self.header
    }

    /// Keyframe interval the stream was written with.
    pub fn keyframe(&self) -> u32 {
        self.header.keyframe
    }

    /// The replay's map.
    pub fn map(&self) -> &PackedMap {
        &self.map
    }

    /// Number of frames declared by the stream.
    pub fn frame_count(&self) -> usize {
        self.frame_count
    }

    /// Number of frames read so far.
    pub fn frames_read(&self) -> usize {
        self.frames_read
    }

    fn decode_next(&mut self, previous: Option<&F>) -> Result<F, ReplayError> {
        let position = self.frames_read;
        log::trace!(
            "frame {position}: {:?}",
            FrameRole::at(position, self.header.keyframe)
        );
        let frame = decode_frame_at(&mut self.tokens, position, self.header.keyframe, previous)?;
        self.frames_read += 1;
        Ok(frame)
    }

    /// Decode every remaining frame and the trailer into a [`Replay`].
    ///
    /// Must be called before any frame has been taken with
    /// [`next_frame`](Self::next_frame); frames are decoded against
    /// the already collected predecessor, so nothing is cloned.
    pub(crate) fn into_replay(mut self) -> Result<Replay<F>, ReplayError> {
        debug_assert_eq!(self.frames_read, 0);
        let mut frames: Vec<F> = Vec::with_capacity(self.frame_count.min(4096));
        while self.frames_read < self.frame_count {
            let frame = self.decode_next(frames.last())?;
            frames.push(frame);
        }
        let num_units = decode_unit_counts(&mut self.tokens, &self.config)?;
        log::debug!(
            "replay read: {} frames, {} unit count entries",
            frames.len(),
            num_units.len()
        );
        Ok(Replay::from_parts(
            self.map,
            frames,
            self.header.keyframe,
            num_units,
        ))
    }
}

impl<R: BufRead, F: Diffable + Clone> ReplayReader<R, F> {
    /// Read the next frame, or `None` once all declared frames are read.
    pub fn next_frame(&mut self) -> Result<Option<F>, ReplayError> {
        if self.frames_read == self.frame_count {
            return Ok(None);
        }
        let previous = self.previous.take();
        let frame = self.decode_next(previous.as_ref())?;

        // Keep a base only when the next frame is a diff.
        if self.frames_read < self.frame_count
            && !FrameRole::at(self.frames_read, self.header.keyframe).is_keyframe()
        {
            self.previous = Some(frame.clone());
        }
        Ok(Some(frame))
    }

    /// Convert into a frame iterator.
    pub fn frames(self) -> FrameIter<R, F> {
        FrameIter {
            reader: self,
            done: false,
        }
    }

    /// Skip any unread frames, then read the unit-count trailer.
    ///
    /// Returns the map together with the trailer.
    pub fn finish(mut self) -> Result<(PackedMap, UnitCounts), ReplayError> {
        while self.next_frame()?.is_some() {}
        let num_units = decode_unit_counts(&mut self.tokens, &self.config)?;
        Ok((self.map, num_units))
    }
}

/// Iterator adapter over replay frames.
///
/// Stops after the first error.
pub struct FrameIter<R: BufRead, F = Frame> {
    reader: ReplayReader<R, F>,
    done: bool,
}

impl<R: BufRead, F: Diffable + Clone> FrameIter<R, F> {
    /// Recover the reader, for example to call
    /// [`finish`](ReplayReader::finish).
    pub fn into_reader(self) -> ReplayReader<R, F> {
        self.reader
    }
}

impl<R: BufRead, F: Diffable + Clone> Iterator for FrameIter<R, F> {
    type Item = Result<F, ReplayError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.reader.next_frame() {
            Ok(Some(frame)) => Some(Ok(frame)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::writer::ReplayWriter;
    use rewind_frame::Unit;

    fn tiny_map() -> PackedMap {
        PackedMap::from_raw(2, 1, vec![0x01, 0x21]).unwrap()
    }

    fn frames(n: usize) -> Vec<Frame> {
        (0..n)
            .map(|tick| {
                let mut frame = Frame::default();
                let mut unit = Unit::spawn(1);
                unit.x = tick as i32;
                unit.health = 40 - tick as i32;
                frame.units.insert(0, vec![unit]);
                frame.reward = tick as f32 * 0.5;
                frame
            })
            .collect()
    }

    fn write(frames: &[Frame], keyframe: u32) -> Vec<u8> {
        let mut counts = UnitCounts::new();
        counts.insert(0, 1);
        let mut writer = ReplayWriter::new(Vec::new(), &tiny_map(), keyframe, frames.len()).unwrap();
        for frame in frames {
            writer.write_frame(frame).unwrap();
        }
        writer.finish(&counts).unwrap()
    }

    #[test]
    fn next_frame_materialises_diffs() {
        let expected = frames(5);
        let buf = write(&expected, 2);
        let mut reader: ReplayReader<_> = ReplayReader::open(buf.as_slice()).unwrap();
        assert_eq!(reader.keyframe(), 2);
        for frame in &expected {
            assert_eq!(reader.next_frame().unwrap().as_ref(), Some(frame));
        }
        assert!(reader.next_frame().unwrap().is_none());
        assert_eq!(reader.frames_read(), 5);
    }

    #[test]
    fn iterator_then_finish_reads_trailer() {
        let expected = frames(4);
        let buf = write(&expected, 3);
        let reader: ReplayReader<_> = ReplayReader::open(buf.as_slice()).unwrap();
        let mut iter = reader.frames();
        let got: Vec<Frame> = iter.by_ref().map(Result::unwrap).collect();
        assert_eq!(got, expected);
        let (map, counts) = iter.into_reader().finish().unwrap();
        assert_eq!(map, tiny_map());
        assert_eq!(counts.get(&0), Some(&1));
    }

    #[test]
    fn finish_skips_unread_frames() {
        let buf = write(&frames(6), 4);
        let mut reader: ReplayReader<_> = ReplayReader::open(buf.as_slice()).unwrap();
        reader.next_frame().unwrap();
        let (_, counts) = reader.finish().unwrap();
        assert_eq!(counts.len(), 1);
    }

    #[test]
    fn frame_limit_applies_on_open() {
        let buf = write(&frames(3), 0);
        let config = CodecConfig {
            max_frames: 2,
            ..CodecConfig::default()
        };
        let result: Result<ReplayReader<_>, _> =
            ReplayReader::open_with_config(buf.as_slice(), config);
        assert!(matches!(
            result,
            Err(ReplayError::LimitExceeded {
                what: "frame count",
                ..
            })
        ));
    }

    #[test]
    fn writer_rejects_extra_frames() {
        let mut writer = ReplayWriter::new(Vec::new(), &tiny_map(), 0, 1).unwrap();
        let frame = Frame::default();
        writer.write_frame(&frame).unwrap();
        assert!(matches!(
            writer.write_frame(&frame),
            Err(ReplayError::FrameCountMismatch {
                declared: 1,
                written: 2
            })
        ));
    }

    #[test]
    fn writer_finish_rejects_missing_frames() {
        let mut writer = ReplayWriter::new(Vec::new(), &tiny_map(), 0, 2).unwrap();
        writer.write_frame(&Frame::default()).unwrap();
        assert!(matches!(
            writer.finish(&UnitCounts::new()),
            Err(ReplayError::FrameCountMismatch {
                declared: 2,
                written: 1
            })
        ));
    }
}
