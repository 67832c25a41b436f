//! Replay stream layout.
//!
//! ```text
//! [0 <keyframe>] <width> <height> ' ' <width*height raw map bytes>
//! <n> <frame 0> <frame 1> ... <frame n-1>
//! <s> { <key> <value> }*s
//! ```
//!
//! The leading `0` marker is only written when the keyframe interval is
//! non-zero. A zero width is never valid, so a reader seeing `0` first
//! knows the keyframe follows. Readers also accept an explicit `0 0`,
//! which the writer never emits and which means the same as no marker.
//! Frame `i` is stored in full when
//! [`FrameRole::at`] calls it a keyframe, otherwise as the diff from
//! frame `i - 1`.
//!
//! The functions here operate on a [`TokenWriter`] / [`TokenReader`] and
//! are shared by [`ReplayWriter`](crate::ReplayWriter),
//! [`ReplayReader`](crate::ReplayReader) and
//! [`Replay`](crate::Replay).

use std::io::{BufRead, Write};

use indexmap::IndexMap;
use rewind_core::{DiffError, Diffable, FrameRole, StreamCodec, TokenReader, TokenWriter};
use rewind_map::PackedMap;

use crate::config::CodecConfig;
use crate::error::ReplayError;

/// Side table of per-key unit counts stored after the frames.
pub type UnitCounts = IndexMap<i32, i32>;

/// Leading fields of a replay stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReplayHeader {
    /// Keyframe interval; `0` stores every frame in full.
    pub keyframe: u32,
    /// Map extent along x.
    pub width: u32,
    /// Map extent along y.
    pub height: u32,
}

impl ReplayHeader {
    /// Header describing `map` with the given keyframe interval.
    pub fn for_map(map: &PackedMap, keyframe: u32) -> Self {
        Self {
            keyframe,
            width: map.width(),
            height: map.height(),
        }
    }

    /// Number of map cells, `width * height`.
    pub fn cells(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }
}

fn dimension(value: u32, header: &ReplayHeader) -> Result<i32, ReplayError> {
    i32::try_from(value).map_err(|_| ReplayError::InvalidMapSize {
        width: header.width.into(),
        height: header.height.into(),
    })
}

fn check_limit(what: &'static str, value: u64, limit: usize) -> Result<(), ReplayError> {
    let limit = limit as u64;
    if value > limit {
        return Err(ReplayError::LimitExceeded { what, value, limit });
    }
    Ok(())
}

// ── Header ──────────────────────────────────────────────────────

/// Write the keyframe marker (if any) and the map dimensions.
pub fn encode_header<W: Write>(
    out: &mut TokenWriter<W>,
    header: &ReplayHeader,
) -> Result<(), ReplayError> {
    let width = dimension(header.width, header)?;
    let height = dimension(header.height, header)?;
    if width == 0 || height == 0 {
        return Err(ReplayError::InvalidMapSize {
            width: width.into(),
            height: height.into(),
        });
    }
    if header.keyframe != 0 {
        out.write_i32(0)?;
        out.write_u32(header.keyframe)?;
    }
    out.write_i32(width)?;
    out.write_i32(height)?;
    Ok(())
}

/// Read the keyframe marker (if any) and the map dimensions.
///
/// Both dimensions must be strictly positive.
pub fn decode_header<R: BufRead>(
    input: &mut TokenReader<R>,
) -> Result<ReplayHeader, ReplayError> {
    let first = input.read_i32("keyframe marker or width")?;
    let (keyframe, width) = if first == 0 {
        let keyframe = input.read_u32("keyframe")?;
        (keyframe, input.read_i32("width")?)
    } else {
        (0, first)
    };
    let height = input.read_i32("height")?;
    if width <= 0 || height <= 0 {
        return Err(ReplayError::InvalidMapSize {
            width: width.into(),
            height: height.into(),
        });
    }
    Ok(ReplayHeader {
        keyframe,
        width: width as u32,
        height: height as u32,
    })
}

// ── Map ─────────────────────────────────────────────────────────

/// Write the packed map bytes verbatim.
///
/// The header's trailing space is the delimiter; nothing follows the
/// raw region before the frame count.
pub fn encode_map<W: Write>(out: &mut TokenWriter<W>, map: &PackedMap) -> Result<(), ReplayError> {
    out.write_raw(map.as_bytes())?;
    Ok(())
}

/// Read the packed map that follows a header.
pub fn decode_map<R: BufRead>(
    input: &mut TokenReader<R>,
    header: &ReplayHeader,
    config: &CodecConfig,
) -> Result<PackedMap, ReplayError> {
    check_limit("map cells", header.cells(), config.max_map_cells)?;
    input.skip_delimiter()?;
    let bytes = input.read_raw(header.cells() as usize, "map bytes")?;
    Ok(PackedMap::from_raw(header.width, header.height, bytes)?)
}

// ── Frames ──────────────────────────────────────────────────────

/// Read the frame count, bounded by the configured limit.
pub fn decode_frame_count<R: BufRead>(
    input: &mut TokenReader<R>,
    config: &CodecConfig,
) -> Result<usize, ReplayError> {
    let n = input.read_len("frame count")?;
    check_limit("frame count", n as u64, config.max_frames)?;
    Ok(n)
}

/// Write frame `position`, in full or as a diff from `previous`.
///
/// `previous` is ignored for keyframes and must be present otherwise.
pub fn encode_frame_at<F: Diffable, W: Write>(
    out: &mut TokenWriter<W>,
    position: usize,
    keyframe: u32,
    frame: &F,
    previous: Option<&F>,
) -> Result<(), ReplayError> {
    match (FrameRole::at(position, keyframe), previous) {
        (FrameRole::DiffFrame, Some(previous)) => frame.diff(previous).encode(out)?,
        (FrameRole::DiffFrame, None) => return Err(missing_predecessor(position)),
        (FrameRole::Keyframe, _) => frame.encode(out)?,
    }
    Ok(())
}

/// Read frame `position`, undiffing against `previous` when needed.
pub fn decode_frame_at<F: Diffable, R: BufRead>(
    input: &mut TokenReader<R>,
    position: usize,
    keyframe: u32,
    previous: Option<&F>,
) -> Result<F, ReplayError> {
    match FrameRole::at(position, keyframe) {
        FrameRole::Keyframe => Ok(F::decode(input)?),
        FrameRole::DiffFrame => {
            let delta = F::Delta::decode(input)?;
            let previous = previous.ok_or_else(|| missing_predecessor(position))?;
            F::undiff(&delta, previous).map_err(|source| ReplayError::Diff { position, source })
        }
    }
}

fn missing_predecessor(position: usize) -> ReplayError {
    ReplayError::Diff {
        position,
        source: DiffError::StructuralMismatch {
            detail: "diff frame has no predecessor".into(),
        },
    }
}

// ── Unit counts ─────────────────────────────────────────────────

/// Write the unit-count side table in insertion order.
pub fn encode_unit_counts<W: Write>(
    out: &mut TokenWriter<W>,
    counts: &UnitCounts,
) -> Result<(), ReplayError> {
    out.write_len(counts.len())?;
    for (key, value) in counts {
        out.write_i32(*key)?;
        out.write_i32(*value)?;
    }
    Ok(())
}

/// Read the unit-count side table.
///
/// A key that appears twice keeps its first position and its last value.
pub fn decode_unit_counts<R: BufRead>(
    input: &mut TokenReader<R>,
    config: &CodecConfig,
) -> Result<UnitCounts, ReplayError> {
    let count = input.read_i32("unit entry count")?;
    if count < 0 {
        return Err(ReplayError::NegativeEntryCount {
            count: count.into(),
        });
    }
    check_limit("unit entries", count as u64, config.max_unit_entries)?;

    let mut counts = UnitCounts::with_capacity(count as usize);
    for _ in 0..count {
        let key = input.read_i32("unit count key")?;
        let value = input.read_i32("unit count value")?;
        if let Some(old) = counts.insert(key, value) {
            log::warn!("duplicate unit count key {key}: {old} replaced by {value}");
        }
    }
    Ok(counts)
}
