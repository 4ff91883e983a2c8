//! Tile definitions and the [`TileStore`].
//!
//! A tile is a 16×16 indexed bitmap plus the flags the occlusion and
//! rendering code cares about. Animated tiles are handled by remapping an
//! id to its current frame; [`TileStore::get_original_tile`] bypasses the
//! remap.

use std::collections::HashMap;
use std::ops::{BitAnd, BitOr};

use nuvie_core::TILE_PIXELS;

// ---------------------------------------------------------------------------
// Flags
// ---------------------------------------------------------------------------

/// Per-tile behaviour flags.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TileFlags(pub u16);

impl TileFlags {
    pub const NONE: Self = Self(0);
    /// The wall-direction bits of the tile are meaningful.
    pub const WALL: Self = Self(1 << 0);
    /// Sight passes through when standing next to it.
    pub const WINDOW: Self = Self(1 << 1);
    /// Blocks line of sight.
    pub const BOUNDARY: Self = Self(1 << 2);
    /// Blocks thrown and fired objects.
    pub const MISSILE_BOUNDARY: Self = Self(1 << 3);
    pub const PASSABLE: Self = Self(1 << 4);
    /// Objects may be placed on top even though the tile is impassable.
    pub const CAN_PLACE_ONTOP: Self = Self(1 << 5);
    pub const DBL_WIDTH: Self = Self(1 << 6);
    pub const DBL_HEIGHT: Self = Self(1 << 7);
    /// Drawn after objects and actors.
    pub const TOPTILE: Self = Self(1 << 8);
    /// Object tile always drawn beneath other objects.
    pub const FORCE_LOWER: Self = Self(1 << 9);
    /// Palette index 0xFF is see-through.
    pub const TRANSPARENT: Self = Self(1 << 10);
    pub const WATER: Self = Self(1 << 11);

    #[inline]
    pub const fn contains(self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }

    #[inline]
    pub const fn intersects(self, other: Self) -> bool {
        (self.0 & other.0) != 0
    }
}

impl BitOr for TileFlags {
    type Output = Self;
    #[inline]
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitAnd for TileFlags {
    type Output = Self;
    #[inline]
    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

/// Which sides of a wall tile connect to a neighbouring wall.
///
/// The bit values match the original tile tables, so masks such as
/// `NORTH | SOUTH` (0xA0) can be compared to raw flag bytes.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WallMask(pub u8);

impl WallMask {
    pub const NONE: Self = Self(0);
    pub const NORTH: Self = Self(0x80);
    pub const EAST: Self = Self(0x40);
    pub const SOUTH: Self = Self(0x20);
    pub const WEST: Self = Self(0x10);
    pub const ALL: Self = Self(0xF0);

    #[inline]
    pub const fn contains(self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }

    #[inline]
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// The side facing back from a neighbour in the direction of `self`.
    pub const fn opposite(self) -> Self {
        match self.0 {
            0x80 => Self::SOUTH,
            0x40 => Self::WEST,
            0x20 => Self::NORTH,
            0x10 => Self::EAST,
            _ => Self::NONE,
        }
    }
}

impl BitOr for WallMask {
    type Output = Self;
    #[inline]
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

// ---------------------------------------------------------------------------
// Tile
// ---------------------------------------------------------------------------

/// One tile definition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tile {
    pub id: u16,
    pub name: String,
    pub data: [u8; TILE_PIXELS],
    pub flags: TileFlags,
    pub walls: WallMask,
    /// Light radius in tiles emitted by this tile. 0 for none.
    pub light: u8,
}

impl Tile {
    /// A solid-coloured tile with no flags.
    pub fn new(id: u16, name: &str, color: u8) -> Self {
        Self {
            id,
            name: name.to_string(),
            data: [color; TILE_PIXELS],
            flags: TileFlags::NONE,
            walls: WallMask::NONE,
            light: 0,
        }
    }

    pub fn with_flags(mut self, flags: TileFlags) -> Self {
        self.flags = self.flags | flags;
        self
    }

    pub fn with_walls(mut self, walls: WallMask) -> Self {
        self.walls = walls;
        self
    }

    pub fn with_light(mut self, light: u8) -> Self {
        self.light = light;
        self
    }

    #[inline]
    pub fn is(&self, flags: TileFlags) -> bool {
        self.flags.contains(flags)
    }

    #[inline]
    pub fn is_transparent(&self) -> bool {
        self.is(TileFlags::TRANSPARENT)
    }
}

// ---------------------------------------------------------------------------
// TileStore
// ---------------------------------------------------------------------------

/// An animated tile: `tile` shows `first_frame + n` for the current frame n.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TileAnim {
    pub tile: u16,
    pub first_frame: u16,
    pub frames: u16,
    pub ticks_per_frame: u16,
}

/// Tile ids 16..48 are shoreline tiles: animated water under a static
/// overlay. The renderer draws their base tile first.
pub const SHORELINE_TILES: std::ops::Range<u16> = 16..48;

/// The fixed table of tile definitions.
#[derive(Clone, Debug, Default)]
pub struct TileStore {
    tiles: Vec<Option<Tile>>,
    remap: HashMap<u16, u16>,
    anims: Vec<TileAnim>,
    anim_base: HashMap<u16, u16>,
    roof_tiles: Vec<[u8; TILE_PIXELS]>,
    cursor_tile: u16,
    use_tile: u16,
}

impl TileStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a tile at its own id.
    pub fn insert(&mut self, tile: Tile) {
        let idx = tile.id as usize;
        if self.tiles.len() <= idx {
            self.tiles.resize(idx + 1, None);
        }
        self.tiles[idx] = Some(tile);
    }

    /// The tile for `id`, following any animation remap.
    pub fn get_tile(&self, id: u16) -> Option<&Tile> {
        let id = self.remap.get(&id).copied().unwrap_or(id);
        self.get_original_tile(id)
    }

    /// The tile for `id` without the animation remap.
    pub fn get_original_tile(&self, id: u16) -> Option<&Tile> {
        self.tiles.get(id as usize).and_then(Option::as_ref)
    }

    pub fn set_cursor_tiles(&mut self, cursor: u16, use_cursor: u16) {
        self.cursor_tile = cursor;
        self.use_tile = use_cursor;
    }

    pub fn get_cursor_tile(&self) -> Option<&Tile> {
        self.get_original_tile(self.cursor_tile)
    }

    pub fn get_use_tile(&self) -> Option<&Tile> {
        self.get_original_tile(self.use_tile)
    }

    /// Declare the static base drawn beneath shoreline tile `id`.
    pub fn set_anim_base(&mut self, id: u16, base: u16) {
        self.anim_base.insert(id, base);
    }

    /// The static base of a shoreline tile, if it has one.
    pub fn get_anim_base_tile(&self, id: u16) -> Option<&Tile> {
        if !SHORELINE_TILES.contains(&id) {
            return None;
        }
        self.anim_base.get(&id).and_then(|&b| self.get_original_tile(b))
    }

    pub fn add_animation(&mut self, anim: TileAnim) {
        self.anims.push(anim);
    }

    /// Advance all animations to the frame for game tick `tick`.
    pub fn update_anims(&mut self, tick: u32) {
        for anim in &self.anims {
            if anim.frames == 0 {
                continue;
            }
            let step = tick / u32::from(anim.ticks_per_frame.max(1));
            let frame = (step % u32::from(anim.frames)) as u16;
            self.remap.insert(anim.tile, anim.first_frame + frame);
        }
    }

    /// Add a roof bitmap, returning its roof id.
    pub fn add_roof_tile(&mut self, data: [u8; TILE_PIXELS]) -> u16 {
        self.roof_tiles.push(data);
        (self.roof_tiles.len() - 1) as u16
    }

    pub fn get_roof_tile(&self, roof_id: u16) -> Option<&[u8; TILE_PIXELS]> {
        self.roof_tiles.get(roof_id as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_tile_is_none() {
        let mut ts = TileStore::new();
        ts.insert(Tile::new(4, "grass", 2));
        assert!(ts.get_tile(4).is_some());
        assert!(ts.get_tile(3).is_none(), "gap in the table");
        assert!(ts.get_tile(9000).is_none(), "id beyond the table");
    }

    #[test]
    fn test_animation_remaps_but_original_does_not() {
        let mut ts = TileStore::new();
        for id in 10..14 {
            ts.insert(Tile::new(id, "water", id as u8));
        }
        ts.add_animation(TileAnim {
            tile: 10,
            first_frame: 10,
            frames: 4,
            ticks_per_frame: 2,
        });
        ts.update_anims(5);
        assert_eq!(ts.get_tile(10).map(|t| t.id), Some(12));
        assert_eq!(ts.get_original_tile(10).map(|t| t.id), Some(10));
    }

    #[test]
    fn test_anim_base_only_for_shoreline() {
        let mut ts = TileStore::new();
        ts.insert(Tile::new(8, "water", 1));
        ts.set_anim_base(20, 8);
        ts.set_anim_base(60, 8);
        assert_eq!(ts.get_anim_base_tile(20).map(|t| t.id), Some(8));
        assert!(ts.get_anim_base_tile(60).is_none());
    }

    #[test]
    fn test_wall_mask_opposites() {
        assert_eq!(WallMask::NORTH.opposite(), WallMask::SOUTH);
        assert_eq!(WallMask::WEST.opposite(), WallMask::EAST);
        assert_eq!((WallMask::NORTH | WallMask::SOUTH).bits(), 0xA0);
        assert!(WallMask::ALL.contains(WallMask::EAST));
    }
}
