//! Proptest strategies for frames.
//!
//! Unit ids are drawn from a small range so that two independently
//! generated frames share most ids, which is what exercises the
//! matched-unit path of the diff engine. Floats never include NaN since
//! NaN breaks `PartialEq`-based round-trip assertions.

use indexmap::IndexMap;
use proptest::prelude::*;
use rewind_frame::{Action, Bullet, Frame, Order, Resources, Unit, UnitAttr};

fn arb_f32() -> impl Strategy<Value = f32> {
    prop_oneof![
        Just(0.0f32),
        Just(-0.0f32),
        Just(f32::INFINITY),
        -64.0f32..64.0,
    ]
}

fn arb_order() -> impl Strategy<Value = Order> {
    (0..1000i32, 0..20i32, -1..16i32, 0..256i32, 0..256i32).prop_map(
        |(first_frame, kind, target_id, target_x, target_y)| Order {
            first_frame,
            kind,
            target_id,
            target_x,
            target_y,
        },
    )
}

pub fn arb_unit() -> impl Strategy<Value = Unit> {
    (
        0..12i32,
        prop::array::uniform14(prop_oneof![3 => -50..50i32, 1 => any::<i32>()]),
        any::<u64>(),
        arb_f32(),
        arb_f32(),
        prop::collection::vec(arb_order(), 0..3),
    )
        .prop_map(|(id, attrs, flags, vx, vy, orders)| {
            let mut unit = Unit::spawn(id);
            for (attr, v) in UnitAttr::ALL.iter().zip(attrs) {
                *unit.get_mut(*attr) = v;
            }
            unit.flags = flags;
            unit.velocity_x = vx;
            unit.velocity_y = vy;
            unit.orders = orders;
            unit
        })
}

fn arb_action() -> impl Strategy<Value = Action> {
    (0..12i32, 0..40i32, prop::collection::vec(any::<i32>(), 0..4))
        .prop_map(|(uid, aid, args)| Action { uid, aid, args })
}

fn arb_resources() -> impl Strategy<Value = Resources> {
    (
        0..5000i32,
        0..5000i32,
        0..400i32,
        0..400i32,
        any::<u64>(),
        any::<u64>(),
        any::<u64>(),
    )
        .prop_map(
            |(ore, gas, used_psi, total_psi, upgrades, upgrades_level, techs)| Resources {
                ore,
                gas,
                used_psi,
                total_psi,
                upgrades,
                upgrades_level,
                techs,
            },
        )
}

fn arb_bullet() -> impl Strategy<Value = Bullet> {
    (0..10i32, 0..256i32, 0..256i32).prop_map(|(kind, x, y)| Bullet { kind, x, y })
}

fn arb_per_player<T: std::fmt::Debug>(
    item: impl Strategy<Value = T>,
) -> impl Strategy<Value = IndexMap<i32, T>> {
    prop::collection::vec((0..3i32, item), 0..4)
        .prop_map(|pairs| pairs.into_iter().collect::<IndexMap<_, _>>())
}

pub fn arb_frame() -> impl Strategy<Value = Frame> {
    (
        arb_per_player(prop::collection::vec(arb_unit(), 0..6)),
        arb_per_player(prop::collection::vec(arb_action(), 0..3)),
        arb_per_player(arb_resources()),
        prop::collection::vec(arb_bullet(), 0..4),
        arb_f32(),
        any::<bool>(),
    )
        .prop_map(|(units, actions, resources, bullets, reward, is_terminal)| Frame {
            units,
            actions,
            resources,
            bullets,
            reward,
            is_terminal,
        })
}

/// A short sequence of frames drawn independently from [`arb_frame`].
pub fn arb_frames(max_len: usize) -> impl Strategy<Value = Vec<Frame>> {
    prop::collection::vec(arb_frame(), 0..=max_len)
}
