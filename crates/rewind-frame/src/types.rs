//! Frame data model.

use indexmap::IndexMap;

/// Integer unit attributes that the diff engine tracks individually.
///
/// The discriminant is the attribute's index on the wire, so variants
/// must never be reordered.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum UnitAttr {
    /// Walk-tile x coordinate.
    X = 0,
    /// Walk-tile y coordinate.
    Y = 1,
    /// Current hit points.
    Health = 2,
    /// Maximum hit points.
    MaxHealth = 3,
    /// Current shield points.
    Shield = 4,
    /// Maximum shield points.
    MaxShield = 5,
    /// Current energy.
    Energy = 6,
    /// Longest weapon cooldown.
    MaxCooldown = 7,
    /// Remaining ground weapon cooldown.
    GroundCooldown = 8,
    /// Remaining air weapon cooldown.
    AirCooldown = 9,
    /// Unit type identifier.
    UnitType = 10,
    /// Armor value.
    Armor = 11,
    /// Owning player.
    PlayerId = 12,
    /// Carried or remaining resources.
    Resources = 13,
}

impl UnitAttr {
    /// Every attribute in wire order.
    pub const ALL: [UnitAttr; 14] = [
        UnitAttr::X,
        UnitAttr::Y,
        UnitAttr::Health,
        UnitAttr::MaxHealth,
        UnitAttr::Shield,
        UnitAttr::MaxShield,
        UnitAttr::Energy,
        UnitAttr::MaxCooldown,
        UnitAttr::GroundCooldown,
        UnitAttr::AirCooldown,
        UnitAttr::UnitType,
        UnitAttr::Armor,
        UnitAttr::PlayerId,
        UnitAttr::Resources,
    ];

    /// Wire index of this attribute.
    pub fn index(self) -> u8 {
        self as u8
    }

    /// Attribute for a wire index, or `None` if out of range.
    pub fn from_index(index: u8) -> Option<Self> {
        Self::ALL.get(index as usize).copied()
    }
}

/// One queued order of a unit.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Order {
    /// Frame at which the order was issued.
    pub first_frame: i32,
    /// Order type identifier.
    pub kind: i32,
    /// Target unit, or `-1`.
    pub target_id: i32,
    /// Target x position.
    pub target_x: i32,
    /// Target y position.
    pub target_y: i32,
}

/// State of a single unit.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Unit {
    /// Identifier, stable for the unit's lifetime.
    pub id: i32,
    /// Walk-tile x coordinate.
    pub x: i32,
    /// Walk-tile y coordinate.
    pub y: i32,
    /// Current hit points.
    pub health: i32,
    /// Maximum hit points.
    pub max_health: i32,
    /// Current shield points.
    pub shield: i32,
    /// Maximum shield points.
    pub max_shield: i32,
    /// Current energy.
    pub energy: i32,
    /// Longest weapon cooldown.
    pub max_cooldown: i32,
    /// Remaining ground weapon cooldown.
    pub ground_cooldown: i32,
    /// Remaining air weapon cooldown.
    pub air_cooldown: i32,
    /// Unit type identifier.
    pub unit_type: i32,
    /// Armor value.
    pub armor: i32,
    /// Owning player.
    pub player_id: i32,
    /// Carried or remaining resources.
    pub resources: i32,
    /// Status bitset (burrowed, cloaked, idle, ...).
    pub flags: u64,
    /// Horizontal velocity.
    pub velocity_x: f32,
    /// Vertical velocity.
    pub velocity_y: f32,
    /// Order queue, most recent first.
    pub orders: Vec<Order>,
}

impl Unit {
    /// A unit with the given id and every other field zeroed.
    ///
    /// Newly spawned units are diffed against this.
    pub fn spawn(id: i32) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }

    /// Read an integer attribute.
    pub fn get(&self, attr: UnitAttr) -> i32 {
        match attr {
            UnitAttr::X => self.x,
            UnitAttr::Y => self.y,
            UnitAttr::Health => self.health,
            UnitAttr::MaxHealth => self.max_health,
            UnitAttr::Shield => self.shield,
            UnitAttr::MaxShield => self.max_shield,
            UnitAttr::Energy => self.energy,
            UnitAttr::MaxCooldown => self.max_cooldown,
            UnitAttr::GroundCooldown => self.ground_cooldown,
            UnitAttr::AirCooldown => self.air_cooldown,
            UnitAttr::UnitType => self.unit_type,
            UnitAttr::Armor => self.armor,
            UnitAttr::PlayerId => self.player_id,
            UnitAttr::Resources => self.resources,
        }
    }

    /// Mutable access to an integer attribute.
    pub fn get_mut(&mut self, attr: UnitAttr) -> &mut i32 {
        match attr {
            UnitAttr::X => &mut self.x,
            UnitAttr::Y => &mut self.y,
            UnitAttr::Health => &mut self.health,
            UnitAttr::MaxHealth => &mut self.max_health,
            UnitAttr::Shield => &mut self.shield,
            UnitAttr::MaxShield => &mut self.max_shield,
            UnitAttr::Energy => &mut self.energy,
            UnitAttr::MaxCooldown => &mut self.max_cooldown,
            UnitAttr::GroundCooldown => &mut self.ground_cooldown,
            UnitAttr::AirCooldown => &mut self.air_cooldown,
            UnitAttr::UnitType => &mut self.unit_type,
            UnitAttr::Armor => &mut self.armor,
            UnitAttr::PlayerId => &mut self.player_id,
            UnitAttr::Resources => &mut self.resources,
        }
    }
}

/// A command issued by a player during the frame.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Action {
    /// Unit that received the command.
    pub uid: i32,
    /// Command identifier.
    pub aid: i32,
    /// Command arguments.
    pub args: Vec<i32>,
}

/// Economy of one player.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Resources {
    /// Minerals.
    pub ore: i32,
    /// Vespene gas.
    pub gas: i32,
    /// Supply in use.
    pub used_psi: i32,
    /// Supply available.
    pub total_psi: i32,
    /// Bitset of researched upgrades.
    pub upgrades: u64,
    /// Bitset encoding upgrade levels.
    pub upgrades_level: u64,
    /// Bitset of researched techs.
    pub techs: u64,
}

/// A projectile in flight.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Bullet {
    /// Bullet type identifier.
    pub kind: i32,
    /// Walk-tile x coordinate.
    pub x: i32,
    /// Walk-tile y coordinate.
    pub y: i32,
}

/// One simulation tick.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Frame {
    /// Units visible in this frame, keyed by owning player.
    pub units: IndexMap<i32, Vec<Unit>>,
    /// Actions issued in this frame, keyed by player.
    pub actions: IndexMap<i32, Vec<Action>>,
    /// Resources, keyed by player.
    pub resources: IndexMap<i32, Resources>,
    /// Bullets in flight.
    pub bullets: Vec<Bullet>,
    /// Reward signal for this frame.
    pub reward: f32,
    /// The game ended on this frame.
    pub is_terminal: bool,
}

impl Frame {
    /// Total number of units across all players.
    pub fn unit_count(&self) -> usize {
        self.units.values().map(Vec::len).sum()
    }

    /// Find a unit by player and id.
    pub fn unit(&self, player: i32, id: i32) -> Option<&Unit> {
        self.units.get(&player)?.iter().find(|u| u.id == id)
    }
}
