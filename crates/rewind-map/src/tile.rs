//! Single-byte tile bitfield.

const WALKABLE_BIT: u8 = 0;
const BUILDABLE_BIT: u8 = 1;
const HEIGHT_SHIFT: u8 = 2;
// Ground height is 0-5, so three bits.
const HEIGHT_MASK: u8 = 0b111;
const START_BIT: u8 = 5;

/// Mask of every bit a tile may use. Bits 6 and 7 stay zero.
pub const TILE_USED_BITS: u8 = 0b0011_1111;

/// One packed map tile.
///
/// The field layout is defined here and nowhere else; both map encoding
/// and decoding go through these accessors.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct PackedTile(u8);

impl PackedTile {
    /// Pack the three per-tile layers. Inputs are masked to their field
    /// width: `walkable & 1`, `buildable & 1`, `ground_height & 0b111`.
    /// Heights above 5 are not rejected, they simply keep their low three
    /// bits.
    pub fn pack(walkable: u8, buildable: u8, ground_height: u8) -> Self {
        Self(
            ((walkable & 1) << WALKABLE_BIT)
                | ((buildable & 1) << BUILDABLE_BIT)
                | ((ground_height & HEIGHT_MASK) << HEIGHT_SHIFT),
        )
    }

    /// Reinterpret a stored byte. Reserved bits are cleared.
    pub fn from_byte(byte: u8) -> Self {
        Self(byte & TILE_USED_BITS)
    }

    /// The packed byte.
    pub fn to_byte(self) -> u8 {
        self.0
    }

    /// Units can walk over this tile.
    pub fn walkable(self) -> bool {
        (self.0 >> WALKABLE_BIT) & 1 == 1
    }

    /// Structures can be placed on this tile.
    pub fn buildable(self) -> bool {
        (self.0 >> BUILDABLE_BIT) & 1 == 1
    }

    /// Ground height level.
    pub fn ground_height(self) -> u8 {
        (self.0 >> HEIGHT_SHIFT) & HEIGHT_MASK
    }

    /// Tile is a player start location.
    pub fn is_start_location(self) -> bool {
        (self.0 >> START_BIT) & 1 == 1
    }

    /// Copy with the start-location bit set or cleared.
    pub fn with_start_location(self, start: bool) -> Self {
        if start {
            Self(self.0 | (1 << START_BIT))
        } else {
            Self(self.0 & !(1 << START_BIT))
        }
    }
}
