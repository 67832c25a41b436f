//! Deterministic scripted fixtures.
//!
//! [`skirmish`] plays out a small two-player fight: units walk toward
//! each other, trade damage, die, and get reinforced. Consecutive frames
//! share most of their state, which is what the diff engine is built
//! for, while still covering spawns, deaths, order changes and velocity
//! flips.

use indexmap::IndexMap;
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use rewind_frame::{Action, Bullet, Frame, Order, Resources, Unit};
use rewind_map::MapLayers;

const PLAYERS: [i32; 2] = [0, 1];

fn recruit(player: i32, id: i32, rng: &mut ChaCha8Rng) -> Unit {
    Unit {
        id,
        x: if player == 0 { 8 } else { 120 },
        y: rng.random_range(32..48),
        health: 40,
        max_health: 40,
        shield: if player == 1 { 20 } else { 0 },
        max_shield: if player == 1 { 20 } else { 0 },
        max_cooldown: 15,
        unit_type: player,
        armor: 1,
        player_id: player,
        flags: 1,
        ..Unit::default()
    }
}

/// `frames` ticks of a scripted two-player fight.
///
/// The same seed always yields the same sequence.
pub fn skirmish(frames: usize, seed: u64) -> Vec<Frame> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut next_id = 0;
    let mut armies: IndexMap<i32, Vec<Unit>> = IndexMap::new();
    for player in PLAYERS {
        let mut units = Vec::new();
        for _ in 0..4 {
            units.push(recruit(player, next_id, &mut rng));
            next_id += 1;
        }
        armies.insert(player, units);
    }
    let mut ore = [50, 50];

    let mut out = Vec::with_capacity(frames);
    for tick in 0..frames {
        let mut actions = IndexMap::new();
        let mut bullets = Vec::new();

        for (slot, (player, units)) in armies.iter_mut().enumerate() {
            let dir = if *player == 0 { 1 } else { -1 };
            for unit in units.iter_mut() {
                if unit.x != 64 {
                    unit.x += dir;
                    unit.velocity_x = dir as f32 * 1.5;
                } else {
                    unit.velocity_x = 0.0;
                }
                unit.ground_cooldown = (unit.ground_cooldown - 1).max(0);
                if rng.random_range(0..4) == 0 {
                    unit.health -= rng.random_range(0..12);
                    unit.ground_cooldown = unit.max_cooldown;
                    bullets.push(Bullet {
                        kind: *player,
                        x: unit.x,
                        y: unit.y,
                    });
                }
                if rng.random_range(0..8) == 0 {
                    unit.flags ^= 0b10;
                    unit.orders = vec![Order {
                        first_frame: tick as i32,
                        kind: rng.random_range(10..13),
                        target_id: -1,
                        target_x: 64,
                        target_y: unit.y,
                    }];
                }
            }
            units.retain(|u| u.health > 0);

            if tick % 5 == 4 {
                units.push(recruit(*player, next_id, &mut rng));
                next_id += 1;
                ore[slot] -= 50;
            }
            ore[slot] += 8;

            if let Some(first) = units.first() {
                actions.insert(
                    *player,
                    vec![Action {
                        uid: first.id,
                        aid: 2,
                        args: vec![64, first.y],
                    }],
                );
            }
        }

        let resources = PLAYERS
            .iter()
            .enumerate()
            .map(|(slot, &player)| {
                let army = armies[&player].len() as i32;
                (
                    player,
                    Resources {
                        ore: ore[slot],
                        gas: tick as i32,
                        used_psi: army * 2,
                        total_psi: 20,
                        ..Resources::default()
                    },
                )
            })
            .collect();

        let alive = [armies[&0].len() as f32, armies[&1].len() as f32];
        out.push(Frame {
            units: armies.clone(),
            actions,
            resources,
            bullets,
            reward: (alive[0] - alive[1]) / 10.0,
            is_terminal: tick + 1 == frames,
        });
    }
    out
}

/// A `width × height` map with alternating walkable tiles, a height
/// ramp along x, and start locations in two opposite corners.
pub fn checkerboard_layers(width: u32, height: u32) -> MapLayers {
    let n = (width * height) as usize;
    let mut layers = MapLayers {
        width,
        height,
        walkability: Vec::with_capacity(n),
        ground_height: Vec::with_capacity(n),
        buildability: Vec::with_capacity(n),
        start_locations: vec![(0, 0), (width as i32 - 1, height as i32 - 1)],
    };
    for x in 0..width {
        for y in 0..height {
            layers.walkability.push(((x + y) % 2) as u8);
            layers.buildability.push((x % 3 == 0) as u8);
            layers.ground_height.push((x % 6) as u8);
        }
    }
    layers
}
