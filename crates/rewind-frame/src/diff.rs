//! Structural diff between two frames.
//!
//! Units are the only temporally coherent part of a frame, so they are
//! the only part stored as a delta. For each player in the current frame
//! the diff lists one [`UnitDiff`] per current unit, in the current
//! order. A unit is matched to its base by id within the same player's
//! list; an unmatched unit is marked `spawned` and diffed against
//! [`Unit::spawn`]. Units and players absent from the current frame are
//! dropped simply by not appearing.
//!
//! Actions, resources, bullets, reward and the terminal flag change
//! wholesale between frames and are carried verbatim.
//!
//! ```text
//! UnitDiff: <id> <spawned> <n> { <attr> <delta> }*n <flags_xor>
//!           <has_velocity> [<vx> <vy>] <has_orders> [<Orders>]
//! ```

use std::collections::HashMap;
use std::io::{BufRead, Write};

use indexmap::IndexMap;
use rewind_core::{DiffError, Diffable, FormatError, StreamCodec, TokenReader, TokenWriter};
use smallvec::SmallVec;

use crate::codec::{
    decode_per_player, decode_resources, decode_vec, encode_per_player, encode_resources,
    encode_vec,
};
use crate::types::{Action, Bullet, Frame, Order, Resources, Unit, UnitAttr};

/// Change of one integer attribute, as a wrapping difference.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AttrDelta {
    /// Which attribute changed.
    pub attr: UnitAttr,
    /// `current.wrapping_sub(base)`.
    pub delta: i32,
}

/// Delta of a single unit against its base.
#[derive(Clone, Debug, PartialEq)]
pub struct UnitDiff {
    /// Unit id.
    pub id: i32,
    /// The unit had no counterpart in the base frame.
    pub spawned: bool,
    /// Attributes that changed.
    pub attrs: SmallVec<[AttrDelta; 4]>,
    /// XOR of current and base flags.
    pub flags: u64,
    /// Replacement velocity, if either component changed bitwise.
    pub velocity: Option<(f32, f32)>,
    /// Replacement order queue, if it changed.
    pub orders: Option<Vec<Order>>,
}

impl UnitDiff {
    fn between(current: &Unit, base: &Unit, spawned: bool) -> Self {
        let attrs = UnitAttr::ALL
            .iter()
            .filter_map(|&attr| {
                let delta = current.get(attr).wrapping_sub(base.get(attr));
                (delta != 0).then_some(AttrDelta { attr, delta })
            })
            .collect();

        let velocity_changed = current.velocity_x.to_bits() != base.velocity_x.to_bits()
            || current.velocity_y.to_bits() != base.velocity_y.to_bits();

        Self {
            id: current.id,
            spawned,
            attrs,
            flags: current.flags ^ base.flags,
            velocity: velocity_changed.then_some((current.velocity_x, current.velocity_y)),
            orders: (current.orders != base.orders).then(|| current.orders.clone()),
        }
    }

    fn apply(&self, base: &Unit) -> Unit {
        let mut unit = base.clone();
        unit.id = self.id;
        for d in &self.attrs {
            let v = unit.get_mut(d.attr);
            *v = v.wrapping_add(d.delta);
        }
        unit.flags ^= self.flags;
        if let Some((vx, vy)) = self.velocity {
            unit.velocity_x = vx;
            unit.velocity_y = vy;
        }
        if let Some(orders) = &self.orders {
            unit.orders = orders.clone();
        }
        unit
    }

    /// `true` when the unit is identical to its base.
    pub fn is_unchanged(&self) -> bool {
        !self.spawned
            && self.attrs.is_empty()
            && self.flags == 0
            && self.velocity.is_none()
            && self.orders.is_none()
    }
}

/// Delta between two consecutive frames.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FrameDiff {
    /// Per-player unit deltas, in the current frame's order.
    pub units: IndexMap<i32, Vec<UnitDiff>>,
    /// Actions of the current frame.
    pub actions: IndexMap<i32, Vec<Action>>,
    /// Resources of the current frame.
    pub resources: IndexMap<i32, Resources>,
    /// Bullets of the current frame.
    pub bullets: Vec<Bullet>,
    /// Reward of the current frame.
    pub reward: f32,
    /// Terminal flag of the current frame.
    pub is_terminal: bool,
}

impl FrameDiff {
    /// Number of units whose state differs from their base, including
    /// spawned units.
    pub fn changed_units(&self) -> usize {
        self.units
            .values()
            .flatten()
            .filter(|d| !d.is_unchanged())
            .count()
    }
}

/// Id lookup for one player's units. Both directions of the diff use
/// this so that duplicate ids resolve the same way (last one wins).
fn index_by_id(units: &[Unit]) -> HashMap<i32, &Unit> {
    units.iter().map(|u| (u.id, u)).collect()
}

impl Diffable for Frame {
    type Delta = FrameDiff;

    fn diff(&self, previous: &Self) -> FrameDiff {
        let units = self
            .units
            .iter()
            .map(|(player, current)| {
                let base = previous
                    .units
                    .get(player)
                    .map(|list| index_by_id(list))
                    .unwrap_or_default();
                let diffs = current
                    .iter()
                    .map(|unit| match base.get(&unit.id) {
                        Some(prev) => UnitDiff::between(unit, prev, false),
                        None => UnitDiff::between(unit, &Unit::spawn(unit.id), true),
                    })
                    .collect();
                (*player, diffs)
            })
            .collect();

        FrameDiff {
            units,
            actions: self.actions.clone(),
            resources: self.resources.clone(),
            bullets: self.bullets.clone(),
            reward: self.reward,
            is_terminal: self.is_terminal,
        }
    }

    fn undiff(delta: &FrameDiff, previous: &Self) -> Result<Self, DiffError> {
        let mut units = IndexMap::with_capacity(delta.units.len());
        for (player, diffs) in &delta.units {
            let base = previous
                .units
                .get(player)
                .map(|list| index_by_id(list))
                .unwrap_or_default();
            let mut rebuilt = Vec::with_capacity(diffs.len());
            for d in diffs {
                let unit = if d.spawned {
                    d.apply(&Unit::spawn(d.id))
                } else {
                    let prev = base.get(&d.id).ok_or_else(|| DiffError::StructuralMismatch {
                        detail: format!("unit {} of player {player} not in base frame", d.id),
                    })?;
                    d.apply(prev)
                };
                rebuilt.push(unit);
            }
            units.insert(*player, rebuilt);
        }

        Ok(Frame {
            units,
            actions: delta.actions.clone(),
            resources: delta.resources.clone(),
            bullets: delta.bullets.clone(),
            reward: delta.reward,
            is_terminal: delta.is_terminal,
        })
    }
}

// ── Encoding ────────────────────────────────────────────────────

impl StreamCodec for UnitDiff {
    fn encode<W: Write>(&self, out: &mut TokenWriter<W>) -> Result<(), FormatError> {
        out.write_i32(self.id)?;
        out.write_bool(self.spawned)?;
        out.write_len(self.attrs.len())?;
        for d in &self.attrs {
            out.write_u32(d.attr.index() as u32)?;
            out.write_i32(d.delta)?;
        }
        out.write_u64(self.flags)?;
        match self.velocity {
            Some((vx, vy)) => {
                out.write_bool(true)?;
                out.write_f32(vx)?;
                out.write_f32(vy)?;
            }
            None => out.write_bool(false)?,
        }
        match &self.orders {
            Some(orders) => {
                out.write_bool(true)?;
                encode_vec(out, orders)
            }
            None => out.write_bool(false),
        }
    }

    fn decode<R: BufRead>(input: &mut TokenReader<R>) -> Result<Self, FormatError> {
        let id = input.read_i32("unit id")?;
        let spawned = input.read_bool("spawned flag")?;
        let n = input.read_len("changed attribute count")?;
        if n > UnitAttr::ALL.len() {
            return Err(FormatError::Corrupted {
                detail: format!("unit {id} lists {n} changed attributes"),
            });
        }
        let mut attrs = SmallVec::with_capacity(n);
        for _ in 0..n {
            let index = input.read_u32("attribute index")?;
            let attr = u8::try_from(index)
                .ok()
                .and_then(UnitAttr::from_index)
                .ok_or_else(|| FormatError::Corrupted {
                    detail: format!("unknown unit attribute index {index}"),
                })?;
            let delta = input.read_i32("attribute delta")?;
            attrs.push(AttrDelta { attr, delta });
        }
        let flags = input.read_u64("flags mask")?;
        let velocity = if input.read_bool("velocity flag")? {
            Some((
                input.read_f32("velocity_x")?,
                input.read_f32("velocity_y")?,
            ))
        } else {
            None
        };
        let orders = if input.read_bool("orders flag")? {
            Some(decode_vec(input, "order count")?)
        } else {
            None
        };
        Ok(Self {
            id,
            spawned,
            attrs,
            flags,
            velocity,
            orders,
        })
    }
}

impl StreamCodec for FrameDiff {
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
            units: decode_per_player(input, "unit diff count")?,
            actions: decode_per_player(input, "action count")?,
            resources: decode_resources(input)?,
            bullets: decode_vec(input, "bullet count")?,
            reward: input.read_f32("reward")?,
            is_terminal: input.read_bool("is_terminal")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit(id: i32, x: i32, y: i32, health: i32) -> Unit {
        Unit {
            id,
            x,
            y,
            health,
            max_health: 40,
            ..Unit::default()
        }
    }

    fn frame_with(player: i32, units: Vec<Unit>) -> Frame {
        let mut f = Frame::default();
        f.units.insert(player, units);
        f
    }

    #[test]
    fn only_changed_attributes_recorded() {
        let prev = frame_with(0, vec![unit(1, 10, 10, 40)]);
        let cur = frame_with(0, vec![unit(1, 11, 10, 35)]);
        let delta = cur.diff(&prev);
        let d = &delta.units[&0][0];
        assert!(!d.spawned);
        assert_eq!(
            d.attrs.as_slice(),
            &[
                AttrDelta {
                    attr: UnitAttr::X,
                    delta: 1
                },
                AttrDelta {
                    attr: UnitAttr::Health,
                    delta: -5
                },
            ]
        );
        assert_eq!(d.flags, 0);
        assert!(d.velocity.is_none());
        assert!(d.orders.is_none());
        assert_eq!(Frame::undiff(&delta, &prev).unwrap(), cur);
    }

    #[test]
    fn identical_frames_give_unchanged_diffs() {
        let f = frame_with(0, vec![unit(1, 1, 1, 1), unit(2, 2, 2, 2)]);
        let delta = f.diff(&f);
        assert_eq!(delta.changed_units(), 0);
        assert_eq!(Frame::undiff(&delta, &f).unwrap(), f);
    }

    #[test]
    fn spawned_unit_diffs_against_zero() {
        let prev = frame_with(0, vec![unit(1, 0, 0, 10)]);
        let cur = frame_with(0, vec![unit(1, 0, 0, 10), unit(9, 5, 6, 40)]);
        let delta = cur.diff(&prev);
        let spawned = &delta.units[&0][1];
        assert!(spawned.spawned);
        assert_eq!(spawned.id, 9);
        assert_eq!(delta.changed_units(), 1);
        assert_eq!(Frame::undiff(&delta, &prev).unwrap(), cur);
    }

    #[test]
    fn dead_units_and_players_drop_out() {
        let mut prev = frame_with(0, vec![unit(1, 0, 0, 10), unit(2, 0, 0, 10)]);
        prev.units.insert(1, vec![unit(3, 0, 0, 10)]);
        let cur = frame_with(0, vec![unit(2, 0, 0, 10)]);
        let rebuilt = Frame::undiff(&cur.diff(&prev), &prev).unwrap();
        assert_eq!(rebuilt, cur);
        assert!(rebuilt.units.get(&1).is_none());
    }

    #[test]
    fn reordered_units_keep_current_order() {
        let prev = frame_with(0, vec![unit(1, 0, 0, 1), unit(2, 0, 0, 2)]);
        let cur = frame_with(0, vec![unit(2, 0, 0, 2), unit(1, 0, 0, 1)]);
        let rebuilt = Frame::undiff(&cur.diff(&prev), &prev).unwrap();
        let ids: Vec<i32> = rebuilt.units[&0].iter().map(|u| u.id).collect();
        assert_eq!(ids, vec![2, 1]);
    }

    #[test]
    fn extreme_values_wrap() {
        let prev = frame_with(0, vec![unit(1, i32::MIN, i32::MAX, 0)]);
        let cur = frame_with(0, vec![unit(1, i32::MAX, i32::MIN, 0)]);
        assert_eq!(Frame::undiff(&cur.diff(&prev), &prev).unwrap(), cur);
    }

    #[test]
    fn negative_zero_velocity_is_a_change() {
        let mut a = unit(1, 0, 0, 0);
        let mut b = a.clone();
        a.velocity_x = 0.0;
        b.velocity_x = -0.0;
        let prev = frame_with(0, vec![a]);
        let cur = frame_with(0, vec![b]);
        let delta = cur.diff(&prev);
        assert!(delta.units[&0][0].velocity.is_some());
        let rebuilt = Frame::undiff(&delta, &prev).unwrap();
        assert!(rebuilt.units[&0][0].velocity_x.is_sign_negative());
    }

    #[test]
    fn unknown_unit_is_structural_mismatch() {
        let prev = frame_with(0, vec![unit(1, 0, 0, 0)]);
        let cur = frame_with(0, vec![unit(1, 1, 0, 0)]);
        let delta = cur.diff(&prev);
        let other_base = frame_with(0, vec![unit(5, 0, 0, 0)]);
        match Frame::undiff(&delta, &other_base) {
            Err(DiffError::StructuralMismatch { detail }) => {
                assert!(detail.contains("unit 1"), "{detail}");
            }
            other => panic!("expected mismatch, got {other:?}"),
        }
    }

    #[test]
    fn unit_diff_rejects_bad_attribute_index() {
        let text = "4 0 1 14 3 0 0 0 ";
        let err = UnitDiff::decode(&mut TokenReader::new(text.as_bytes())).unwrap_err();
        assert!(matches!(err, FormatError::Corrupted { .. }));
    }

    #[test]
    fn unit_diff_encoding_is_sparse() {
        let prev = unit(1, 10, 10, 40);
        let cur = unit(1, 12, 10, 40);
        let d = UnitDiff::between(&cur, &prev, false);
        let mut out = TokenWriter::new(Vec::new());
        d.encode(&mut out).unwrap();
        assert_eq!(out.into_inner(), b"1 0 1 0 2 0 0 0 ");
    }

    #[test]
    fn non_unit_state_is_carried_verbatim() {
        let prev = Frame::default();
        let mut cur = Frame::default();
        cur.actions.insert(
            2,
            vec![Action {
                uid: 1,
                aid: 2,
                args: vec![3],
            }],
        );
        cur.bullets.push(Bullet { kind: 1, x: 1, y: 1 });
        cur.reward = -1.0;
        cur.is_terminal = true;
        let delta = cur.diff(&prev);
        assert_eq!(delta.actions, cur.actions);
        assert_eq!(Frame::undiff(&delta, &prev).unwrap(), cur);
    }
}
