//! Token encoding of frames and their parts.
//!
//! Layout of a full frame:
//!
//! ```text
//! <players> { <player> <n> <Unit>*n }*players
//! <players> { <player> <n> <Action>*n }*players
//! <players> { <player> <Resources> }*players
//! <n> <Bullet>*n
//! <reward> <is_terminal>
//! ```
//!
//! A unit is its id, the fourteen [`UnitAttr`] values in wire order, the
//! flags, both velocity components, and the order queue.

use std::io::{BufRead, Write};

use indexmap::IndexMap;
use rewind_core::{FormatError, StreamCodec, TokenReader, TokenWriter};

use crate::types::{Action, Bullet, Frame, Order, Resources, Unit, UnitAttr};

// Pre-allocation cap for counts read from the stream; a corrupt count
// must not trigger a huge allocation before the data runs out.
const MAX_PREALLOC: usize = 1024;

// ── Collection helpers ──────────────────────────────────────────

pub(crate) fn encode_vec<T: StreamCodec, W: Write>(
    out: &mut TokenWriter<W>,
    items: &[T],
) -> Result<(), FormatError> {
    out.write_len(items.len())?;
    for item in items {
        item.encode(out)?;
    }
    Ok(())
}

pub(crate) fn decode_vec<T: StreamCodec, R: BufRead>(
    input: &mut TokenReader<R>,
    what: &'static str,
) -> Result<Vec<T>, FormatError> {
    let n = input.read_len(what)?;
    let mut items = Vec::with_capacity(n.min(MAX_PREALLOC));
    for _ in 0..n {
        items.push(T::decode(input)?);
    }
    Ok(items)
}

pub(crate) fn encode_per_player<T: StreamCodec, W: Write>(
    out: &mut TokenWriter<W>,
    map: &IndexMap<i32, Vec<T>>,
) -> Result<(), FormatError> {
    out.write_len(map.len())?;
    for (player, items) in map {
        out.write_i32(*player)?;
        encode_vec(out, items)?;
    }
    Ok(())
}

pub(crate) fn decode_per_player<T: StreamCodec, R: BufRead>(
    input: &mut TokenReader<R>,
    what: &'static str,
) -> Result<IndexMap<i32, Vec<T>>, FormatError> {
    let n = input.read_len("player count")?;
    let mut map = IndexMap::with_capacity(n.min(MAX_PREALLOC));
    for _ in 0..n {
        let player = input.read_i32("player id")?;
        map.insert(player, decode_vec(input, what)?);
    }
    Ok(map)
}

pub(crate) fn encode_resources<W: Write>(
    out: &mut TokenWriter<W>,
    map: &IndexMap<i32, Resources>,
) -> Result<(), FormatError> {
    out.write_len(map.len())?;
    for (player, res) in map {
        out.write_i32(*player)?;
        res.encode(out)?;
    }
    Ok(())
}

pub(crate) fn decode_resources<R: BufRead>(
    input: &mut TokenReader<R>,
) -> Result<IndexMap<i32, Resources>, FormatError> {
    let n = input.read_len("player count")?;
    let mut map = IndexMap::with_capacity(n.min(MAX_PREALLOC));
    for _ in 0..n {
        let player = input.read_i32("player id")?;
        map.insert(player, Resources::decode(input)?);
    }
    Ok(map)
}

// ── Leaf records ────────────────────────────────────────────────

impl StreamCodec for Order {
    fn encode<W: Write>(&self, out: &mut TokenWriter<W>) -> Result<(), FormatError> {
        out.write_i32(self.first_frame)?;
        out.write_i32(self.kind)?;
        out.write_i32(self.target_id)?;
        out.write_i32(self.target_x)?;
        out.write_i32(self.target_y)
    }

    fn decode<R: BufRead>(input: &mut TokenReader<R>) -> Result<Self, FormatError> {
        Ok(Self {
            first_frame: input.read_i32("order first_frame")?,
            kind: input.read_i32("order kind")?,
            target_id: input.read_i32("order target_id")?,
            target_x: input.read_i32("order target_x")?,
            target_y: input.read_i32("order target_y")?,
        })
    }
}

impl StreamCodec for Unit {
    fn encode<W: Write>(&self, out: &mut TokenWriter<W>) -> Result<(), FormatError> {
        out.write_i32(self.id)?;
        for attr in UnitAttr::ALL {
            out.write_i32(self.get(attr))?;
        }
        out.write_u64(self.flags)?;
        out.write_f32(self.velocity_x)?;
        out.write_f32(self.velocity_y)?;
        encode_vec(out, &self.orders)
    }

    fn decode<R: BufRead>(input: &mut TokenReader<R>) -> Result<Self, FormatError> {
        let mut unit = Unit::spawn(input.read_i32("unit id")?);
        for attr in UnitAttr::ALL {
            *unit.get_mut(attr) = input.read_i32("unit attribute")?;
        }
        unit.flags = input.read_u64("unit flags")?;
        unit.velocity_x = input.read_f32("unit velocity_x")?;
        unit.velocity_y = input.read_f32("unit velocity_y")?;
        unit.orders = decode_vec(input, "order count")?;
        Ok(unit)
    }
}

impl StreamCodec for Action {
    fn encode<W: Write>(&self, out: &mut TokenWriter<W>) -> Result<(), FormatError> {
        out.write_i32(self.uid)?;
        out.write_i32(self.aid)?;
        out.write_len(self.args.len())?;
        for arg in &self.args {
            out.write_i32(*arg)?;
        }
        Ok(())
    }

    fn decode<R: BufRead>(input: &mut TokenReader<R>) -> Result<Self, FormatError> {
        let uid = input.read_i32("action uid")?;
        let aid = input.read_i32("action aid")?;
        let n = input.read_len("action arg count")?;
        let mut args = Vec::with_capacity(n.min(MAX_PREALLOC));
        for _ in 0..n {
            args.push(input.read_i32("action arg")?);
        }
        Ok(Self { uid, aid, args })
    }
}

impl StreamCodec for Resources {
    fn encode<W: Write>(&self, out: &mut TokenWriter<W>) -> Result<(), FormatError> {
        out.write_i32(self.ore)?;
        out.write_i32(self.gas)?;
        out.write_i32(self.used_psi)?;
        out.write_i32(self.total_psi)?;
        out.write_u64(self.upgrades)?;
        out.write_u64(self.upgrades_level)?;
        out.write_u64(self.techs)
    }

    fn decode<R: BufRead>(input: &mut TokenReader<R>) -> Result<Self, FormatError> {
        Ok(Self {
            ore: input.read_i32("ore")?,
            gas: input.read_i32("gas")?,
            used_psi: input.read_i32("used_psi")?,
            total_psi: input.read_i32("total_psi")?,
            upgrades: input.read_u64("upgrades")?,
            upgrades_level: input.read_u64("upgrades_level")?,
            techs: input.read_u64("techs")?,
        })
    }
}

impl StreamCodec for Bullet {
    fn encode<W: Write>(&self, out: &mut TokenWriter<W>) -> Result<(), FormatError> {
        out.write_i32(self.kind)?;
        out.write_i32(self.x)?;
        out.write_i32(self.y)
    }

    fn decode<R: BufRead>(input: &mut TokenReader<R>) -> Result<Self, FormatError> {
        Ok(Self {
            kind: input.read_i32("bullet kind")?,
            x: input.read_i32("bullet x")?,
            y: input.read_i32("bullet y")?,
        })
    }
}

// ── Frame ───────────────────────────────────────────────────────

impl StreamCodec for Frame {
    fn encode<W: Write>(&self, out: &mut TokenWriter<W>) -> Result<(), FormatError> {
        encode_per_player(out, &self.units)?;
        encode_per_player(out, &self.actions)?;
        encode_resources(out, &self.resources)?;
        encode_vec(out, &self.bullets)?;
        out.write_f32(self.reward)?;
        out.write_bool(self.is_terminal)
    }

    fn decode<R: BufRead>(input: &mut TokenReader<R>) -> Result<Self, FormatError> {
        Ok(Self {
            units: decode_per_player(input, "unit count")?,
            actions: decode_per_player(input, "action count")?,
            resources: decode_resources(input)?,
            bullets: decode_vec(input, "bullet count")?,
            reward: input.read_f32("reward")?,
            is_terminal: input.read_bool("is_terminal")?,
        })
    }
}
