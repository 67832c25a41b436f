//! In-memory replay container.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use rewind_core::{effective_keyframe, Diffable, FrameRole, TokenWriter};
use rewind_frame::Frame;
use rewind_map::{MapError, MapLayers, PackedMap};

use crate::codec::{
    encode_frame_at, encode_header, encode_map, encode_unit_counts, ReplayHeader, UnitCounts,
};
use crate::config::CodecConfig;
use crate::error::ReplayError;
use crate::reader::ReplayReader;

/// An ordered frame sequence with its map and unit-count side table.
///
/// Frames are always held fully materialised; the keyframe interval
/// only affects how they are written.
///
/// # Examples
///
/// ```
/// use rewind_frame::Frame;
/// use rewind_map::MapLayers;
/// use rewind_replay::Replay;
///
/// let layers = MapLayers {
///     width: 2,
///     height: 2,
///     walkability: vec![1, 1, 0, 1],
///     ground_height: vec![0, 1, 2, 3],
///     buildability: vec![1, 0, 0, 0],
///     start_locations: vec![(1, 1)],
/// };
///
/// let mut replay = Replay::with_keyframe(4);
/// replay.set_map(&layers).unwrap();
/// replay.push(Frame::default());
/// replay.push(Frame { reward: 1.0, ..Frame::default() });
/// replay.set_num_units(0, 12);
///
/// let mut buf = Vec::new();
/// replay.write_to(&mut buf).unwrap();
///
/// let back: Replay = Replay::read_from(buf.as_slice()).unwrap();
/// assert_eq!(back, replay);
/// assert_eq!(back.get_map(), Some(layers));
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Replay<F = Frame> {
    map: Option<PackedMap>,
    frames: Vec<F>,
    keyframe: u32,
    num_units: UnitCounts,
}

impl<F> Default for Replay<F> {
    fn default() -> Self {
        Self {
            map: None,
            frames: Vec::new(),
            keyframe: 0,
            num_units: UnitCounts::new(),
        }
    }
}

impl<F> Replay<F> {
    /// An empty replay that stores every frame in full.
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty replay with the given keyframe interval.
    pub fn with_keyframe(keyframe: u32) -> Self {
        Self {
            keyframe,
            ..Self::default()
        }
    }

    pub(crate) fn from_parts(
        map: PackedMap,
        frames: Vec<F>,
        keyframe: u32,
        num_units: UnitCounts,
    ) -> Self {
        Self {
            map: Some(map),
            frames,
            keyframe,
            num_units,
        }
    }

    /// Configured keyframe interval.
    pub fn keyframe(&self) -> u32 {
        self.keyframe
    }

    /// Change the keyframe interval used by the next write.
    pub fn set_keyframe(&mut self, keyframe: u32) {
        self.keyframe = keyframe;
    }

    /// Interval actually used for role decisions.
    pub fn effective_keyframe(&self) -> usize {
        effective_keyframe(self.keyframe)
    }

    /// How frame `position` will be stored.
    pub fn frame_role(&self, position: usize) -> FrameRole {
        FrameRole::at(position, self.keyframe)
    }

    /// Append a frame.
    pub fn push(&mut self, frame: F) {
        self.frames.push(frame);
    }

    /// Frame at `position`, if any.
    pub fn frame(&self, position: usize) -> Option<&F> {
        self.frames.get(position)
    }

    /// All frames in order.
    pub fn frames(&self) -> &[F] {
        &self.frames
    }

    /// Consume the replay and return its frames.
    pub fn into_frames(self) -> Vec<F> {
        self.frames
    }

    /// Number of frames.
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// `true` when the replay holds no frames.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Pack and store a map, replacing any previous one.
    ///
    /// On error the previous map is kept.
    pub fn set_map(&mut self, layers: &MapLayers) -> Result<(), MapError> {
        self.map = Some(PackedMap::encode(layers)?);
        Ok(())
    }

    /// Store an already packed map, replacing any previous one.
    pub fn set_raw_map(&mut self, map: PackedMap) {
        self.map = Some(map);
    }

    /// The packed map, if one has been set.
    pub fn map(&self) -> Option<&PackedMap> {
        self.map.as_ref()
    }

    /// The map unpacked into layers, if one has been set.
    pub fn get_map(&self) -> Option<MapLayers> {
        self.map.as_ref().map(PackedMap::decode)
    }

    /// The unit-count side table.
    pub fn num_units(&self) -> &UnitCounts {
        &self.num_units
    }

    /// Set the unit count for `key`, overwriting any earlier value.
    pub fn set_num_units(&mut self, key: i32, value: i32) {
        self.num_units.insert(key, value);
    }

    /// Unit count for `key`, if recorded.
    pub fn num_units_of(&self, key: i32) -> Option<i32> {
        self.num_units.get(&key).copied()
    }
}

impl<F: Diffable> Replay<F> {
    /// Serialise the whole replay to `sink`.
    ///
    /// Fails with [`ReplayError::MissingMap`] before writing anything if
    /// no map has been set.
    pub fn write_to<W: Write>(&self, sink: W) -> Result<(), ReplayError> {
        let map = self.map.as_ref().ok_or(ReplayError::MissingMap)?;
        let header = ReplayHeader::for_map(map, self.keyframe);
        let mut out = TokenWriter::new(sink);

        encode_header(&mut out, &header)?;
        encode_map(&mut out, map)?;
        out.write_len(self.frames.len())?;
        log::debug!(
            "writing replay: {}x{} map, {} frames, keyframe {}",
            header.width,
            header.height,
            self.frames.len(),
            self.keyframe
        );

        let mut previous = None;
        for (position, frame) in self.frames.iter().enumerate() {
            log::trace!("frame {position}: {:?}", self.frame_role(position));
            encode_frame_at(&mut out, position, self.keyframe, frame, previous)?;
            previous = Some(frame);
        }

        encode_unit_counts(&mut out, &self.num_units)?;
        out.flush()?;
        log::debug!("replay written: {} bytes", out.bytes_written());
        Ok(())
    }

    /// Decode a replay with the default decode limits.
    pub fn read_from<R: BufRead>(source: R) -> Result<Self, ReplayError> {
        Self::read_with_config(source, CodecConfig::default())
    }

    /// Decode a replay with explicit decode limits.
    pub fn read_with_config<R: BufRead>(
        source: R,
        config: CodecConfig,
    ) -> Result<Self, ReplayError> {
        ReplayReader::open_with_config(source, config)?.into_replay()
    }

    /// Decode a replay into `self`, replacing its entire contents.
    ///
    /// On error `self` is left exactly as it was.
    pub fn read_into<R: BufRead>(&mut self, source: R) -> Result<(), ReplayError> {
        *self = Self::read_from(source)?;
        Ok(())
    }

    /// Write the replay to a file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ReplayError> {
        let file = File::create(path)?;
        self.write_to(BufWriter::new(file))
    }

    /// Read a replay from a file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ReplayError> {
        let file = File::open(path)?;
        Self::read_from(BufReader::new(file))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layers() -> MapLayers {
        MapLayers {
            width: 3,
            height: 1,
            walkability: vec![1, 0, 1],
            ground_height: vec![0, 2, 5],
            buildability: vec![1, 1, 0],
            start_locations: vec![(2, 0)],
        }
    }

    #[test]
    fn write_without_map_fails() {
        let mut replay: Replay = Replay::new();
        replay.push(Frame::default());
        let mut buf = Vec::new();
        assert!(matches!(
            replay.write_to(&mut buf),
            Err(ReplayError::MissingMap)
        ));
        assert!(buf.is_empty());
    }

    #[test]
    fn container_accessors() {
        let mut replay: Replay = Replay::with_keyframe(3);
        assert!(replay.is_empty());
        assert_eq!(replay.effective_keyframe(), 3);
        replay.set_keyframe(0);
        assert_eq!(replay.effective_keyframe(), 1);
        assert!(replay.frame_role(5).is_keyframe());

        replay.push(Frame::default());
        assert_eq!(replay.len(), 1);
        assert!(replay.frame(0).is_some());
        assert!(replay.frame(1).is_none());

        replay.set_num_units(4, 10);
        replay.set_num_units(4, 11);
        assert_eq!(replay.num_units_of(4), Some(11));
        assert_eq!(replay.num_units().len(), 1);
        assert_eq!(replay.num_units_of(5), None);
    }

    #[test]
    fn set_map_failure_keeps_previous() {
        let mut replay: Replay = Replay::new();
        replay.set_map(&layers()).unwrap();
        let mut bad = layers();
        bad.walkability.pop();
        assert!(replay.set_map(&bad).is_err());
        assert_eq!(replay.get_map(), Some(layers()));
    }

    #[test]
    fn header_and_map_bytes_on_the_wire() {
        let mut replay: Replay = Replay::new();
        replay.set_map(&layers()).unwrap();
        let mut buf = Vec::new();
        replay.write_to(&mut buf).unwrap();
        // walk|build, build|height 2, walk|height 5|start
        let mut expected = b"3 1 ".to_vec();
        expected.extend_from_slice(&[0x03, 0x0A, 0x35]);
        expected.extend_from_slice(b"0 0 ");
        assert_eq!(buf, expected);
    }

    #[test]
    fn save_and_load_file() {
        let path = std::env::temp_dir().join(format!("rewind-replay-{}.rpl", std::process::id()));
        let mut replay: Replay = Replay::with_keyframe(2);
        replay.set_map(&layers()).unwrap();
        replay.push(Frame::default());
        replay.push(Frame {
            is_terminal: true,
            ..Frame::default()
        });
        replay.save(&path).unwrap();
        let back: Replay = Replay::load(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(back, replay);
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let result: Result<Replay, _> = Replay::load("/nonexistent/rewind/replay.rpl");
        assert!(matches!(result, Err(ReplayError::Io(_))));
    }
}
