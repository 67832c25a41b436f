//! Conversion between attribute layers and the packed map.
//!
//! Layers are flat arrays indexed `x * height + y`, the transposed
//! layout the game engine hands maps over in. The packed grid uses the
//! same layout: grid row `x`, column `y`.

use crate::error::MapError;
use crate::grid::ByteGrid;
use crate::tile::{PackedTile, TILE_USED_BITS};

/// Unpacked map attributes, one value per tile.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MapLayers {
    /// Extent along x.
    pub width: u32,
    /// Extent along y.
    pub height: u32,
    /// Walkability per tile (only bit 0 is kept).
    pub walkability: Vec<u8>,
    /// Ground height per tile (only bits 0-2 are kept).
    pub ground_height: Vec<u8>,
    /// Buildability per tile (only bit 0 is kept).
    pub buildability: Vec<u8>,
    /// Start locations as `(x, y)` pairs.
    pub start_locations: Vec<(i32, i32)>,
}

/// A map with every tile packed into one byte.
///
/// Immutable once built; replacing a replay's map swaps the whole value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PackedMap {
    grid: ByteGrid,
}

fn check_layer(layer: &'static str, values: &[u8], expected: usize) -> Result<(), MapError> {
    if values.len() != expected {
        return Err(MapError::LayerLength {
            layer,
            expected,
            found: values.len(),
        });
    }
    Ok(())
}

impl PackedMap {
    /// Pack attribute layers into a map.
    ///
    /// Tiles are packed first; start locations are then ORed in as a
    /// second pass, so listing the same location twice is harmless.
    pub fn encode(layers: &MapLayers) -> Result<Self, MapError> {
        let mut grid = ByteGrid::new(layers.width, layers.height)?;
        let n = grid.as_bytes().len();
        check_layer("walkability", &layers.walkability, n)?;
        check_layer("ground_height", &layers.ground_height, n)?;
        check_layer("buildability", &layers.buildability, n)?;

        for x in 0..layers.width {
            for y in 0..layers.height {
                let i = x as usize * layers.height as usize + y as usize;
                let tile = PackedTile::pack(
                    layers.walkability[i],
                    layers.buildability[i],
                    layers.ground_height[i],
                );
                if let Some(cell) = grid.get_mut(x, y) {
                    *cell = tile.to_byte();
                }
            }
        }

        for &(x, y) in &layers.start_locations {
            let cell = u32::try_from(x)
                .ok()
                .zip(u32::try_from(y).ok())
                .and_then(|(cx, cy)| grid.get_mut(cx, cy))
                .ok_or(MapError::StartLocationOutOfBounds { x, y })?;
            *cell = PackedTile::from_byte(*cell)
                .with_start_location(true)
                .to_byte();
        }

        Ok(Self { grid })
    }

    /// Adopt an already packed buffer, as read from a replay stream.
    ///
    /// Rejects buffers of the wrong length and tiles with reserved bits
    /// set.
    pub fn from_raw(width: u32, height: u32, bytes: Vec<u8>) -> Result<Self, MapError> {
        let grid = ByteGrid::from_raw(width, height, bytes)?;
        if let Some(i) = grid.as_bytes().iter().position(|b| b & !TILE_USED_BITS != 0) {
            return Err(MapError::ReservedBits {
                x: (i / height as usize) as u32,
                y: (i % height as usize) as u32,
                byte: grid.as_bytes()[i],
            });
        }
        Ok(Self { grid })
    }

    /// Unpack into separate layers.
    ///
    /// Start locations come out in increasing x, then increasing y.
    pub fn decode(&self) -> MapLayers {
        let (width, height) = (self.width(), self.height());
        let n = self.grid.as_bytes().len();
        let mut layers = MapLayers {
            width,
            height,
            walkability: Vec::with_capacity(n),
            ground_height: Vec::with_capacity(n),
            buildability: Vec::with_capacity(n),
            start_locations: Vec::new(),
        };

        // Grid bytes are already in x-major order, matching the layers.
        for (i, &byte) in self.grid.as_bytes().iter().enumerate() {
            let tile = PackedTile::from_byte(byte);
            layers.walkability.push(tile.walkable() as u8);
            layers.buildability.push(tile.buildable() as u8);
            layers.ground_height.push(tile.ground_height());
            if tile.is_start_location() {
                let x = i / height as usize;
                let y = i % height as usize;
                layers.start_locations.push((x as i32, y as i32));
            }
        }
        layers
    }

    /// Extent along x.
    pub fn width(&self) -> u32 {
        self.grid.rows()
    }

    /// Extent along y.
    pub fn height(&self) -> u32 {
        self.grid.cols()
    }

    /// Tile at `(x, y)`, or `None` when out of bounds.
    pub fn tile(&self, x: u32, y: u32) -> Option<PackedTile> {
        self.grid.get(x, y).map(PackedTile::from_byte)
    }

    /// All start locations in increasing x, then increasing y.
    pub fn start_locations(&self) -> Vec<(i32, i32)> {
        let height = self.height() as usize;
        self.grid
            .as_bytes()
            .iter()
            .enumerate()
            .filter(|&(_, &b)| PackedTile::from_byte(b).is_start_location())
            .map(|(i, _)| ((i / height) as i32, (i % height) as i32))
            .collect()
    }

    /// The packed bytes in grid order, as written to a replay stream.
    pub fn as_bytes(&self) -> &[u8] {
        self.grid.as_bytes()
    }

    /// The underlying byte grid.
    pub fn grid(&self) -> &ByteGrid {
        &self.grid
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn flat_layers(width: u32, height: u32) -> MapLayers {
        let n = (width * height) as usize;
        MapLayers {
            width,
            height,
            walkability: vec![1; n],
            ground_height: vec![2; n],
            buildability: vec![0; n],
            start_locations: vec![],
        }
    }

    #[test]
    fn transposed_indexing() {
        // 2 wide, 3 high: layer index x*3+y.
        let mut layers = flat_layers(2, 3);
        layers.ground_height = vec![0, 1, 2, 3, 4, 5];
        let map = PackedMap::encode(&layers).unwrap();
        assert_eq!(map.width(), 2);
        assert_eq!(map.height(), 3);
        assert_eq!(map.tile(1, 0).unwrap().ground_height(), 3);
        assert_eq!(map.tile(0, 2).unwrap().ground_height(), 2);
        assert!(map.tile(2, 0).is_none());
    }

    #[test]
    fn start_locations_or_into_tiles() {
        let mut layers = flat_layers(4, 4);
        layers.start_locations = vec![(3, 1), (0, 2), (3, 1)];
        let map = PackedMap::encode(&layers).unwrap();
        let tile = map.tile(3, 1).unwrap();
        assert!(tile.is_start_location());
        assert!(tile.walkable());
        assert_eq!(tile.ground_height(), 2);
        assert_eq!(map.start_locations(), vec![(0, 2), (3, 1)]);
    }

    #[test]
    fn decode_inverts_encode() {
        let mut layers = flat_layers(3, 2);
        layers.walkability = vec![1, 0, 1, 0, 1, 0];
        layers.buildability = vec![0, 0, 1, 1, 0, 1];
        layers.ground_height = vec![5, 4, 3, 2, 1, 0];
        layers.start_locations = vec![(0, 1), (2, 0)];
        let map = PackedMap::encode(&layers).unwrap();
        assert_eq!(map.decode(), layers);
    }

    #[test]
    fn tall_height_truncates_on_decode() {
        let mut layers = flat_layers(1, 2);
        layers.ground_height = vec![9, 14];
        let decoded = PackedMap::encode(&layers).unwrap().decode();
        assert_eq!(decoded.ground_height, vec![9 & 0b111, 14 & 0b111]);
    }

    #[test]
    fn wrong_layer_length_rejected() {
        let mut layers = flat_layers(2, 2);
        layers.buildability.pop();
        assert_eq!(
            PackedMap::encode(&layers),
            Err(MapError::LayerLength {
                layer: "buildability",
                expected: 4,
                found: 3
            })
        );
    }

    #[test]
    fn start_location_out_of_bounds_rejected() {
        let mut layers = flat_layers(2, 2);
        layers.start_locations = vec![(2, 0)];
        assert!(matches!(
            PackedMap::encode(&layers),
            Err(MapError::StartLocationOutOfBounds { x: 2, y: 0 })
        ));
        layers.start_locations = vec![(0, -1)];
        assert!(PackedMap::encode(&layers).is_err());
    }

    #[test]
    fn empty_map_rejected() {
        assert!(matches!(
            PackedMap::encode(&flat_layers(0, 5)),
            Err(MapError::InvalidSize { .. })
        ));
    }

    #[test]
    fn raw_reserved_bits_rejected() {
        let err = PackedMap::from_raw(2, 2, vec![0, 0, 0, 0x40]).unwrap_err();
        assert_eq!(
            err,
            MapError::ReservedBits {
                x: 1,
                y: 1,
                byte: 0x40
            }
        );
    }

    #[test]
    fn raw_preserves_bytes() {
        let bytes = vec![0x01, 0x23, 0x3F, 0x00, 0x14, 0x02];
        let map = PackedMap::from_raw(2, 3, bytes.clone()).unwrap();
        assert_eq!(map.as_bytes(), bytes.as_slice());
        assert_eq!(map.start_locations(), vec![(0, 1), (0, 2)]);
    }

    fn arb_layers() -> impl Strategy<Value = MapLayers> {
        (1u32..8, 1u32..8).prop_flat_map(|(w, h)| {
            let n = (w * h) as usize;
            (
                prop::collection::vec(0u8..=1, n),
                prop::collection::vec(0u8..=5, n),
                prop::collection::vec(0u8..=1, n),
                prop::collection::btree_set((0..w as i32, 0..h as i32), 0..4),
            )
                .prop_map(move |(walk, height, build, starts)| MapLayers {
                    width: w,
                    height: h,
                    walkability: walk,
                    ground_height: height,
                    buildability: build,
                    start_locations: starts.into_iter().collect(),
                })
        })
    }

    proptest! {
        #[test]
        fn valid_layers_round_trip(layers in arb_layers()) {
            let map = PackedMap::encode(&layers).unwrap();
            prop_assert_eq!(map.decode(), layers);
        }
    }
}
