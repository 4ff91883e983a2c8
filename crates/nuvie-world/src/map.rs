//! The static terrain layer: one toroidal tile grid per level plus an
//! optional roof overlay.

use nuvie_core::{Grid, MapCoord, Point, wrap};

/// One level of the map.
#[derive(Clone, Debug)]
pub struct MapLevel {
    tiles: Grid<u16>,
    /// Roof ids stored +1 so that 0 means no roof.
    roofs: Grid<u16>,
}

impl MapLevel {
    #[inline]
    pub fn width(&self) -> u16 {
        self.tiles.width() as u16
    }

    #[inline]
    pub fn height(&self) -> u16 {
        self.tiles.height() as u16
    }

    #[inline]
    fn wrapped(&self, x: i32, y: i32) -> Point {
        Point::new(wrap(x, self.tiles.width()), wrap(y, self.tiles.height()))
    }
}

/// All levels of the world map. Level 0 is the surface; higher levels are
/// dungeons.
#[derive(Clone, Debug, Default)]
pub struct WorldMap {
    levels: Vec<MapLevel>,
}

impl WorldMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a level filled with tile `fill`, returning its z.
    pub fn add_level(&mut self, width: u16, height: u16, fill: u16) -> u8 {
        self.levels.push(MapLevel {
            tiles: Grid::filled(width as i32, height as i32, fill),
            roofs: Grid::new(width as i32, height as i32),
        });
        (self.levels.len() - 1) as u8
    }

    pub fn level(&self, z: u8) -> Option<&MapLevel> {
        self.levels.get(z as usize)
    }

    pub fn num_levels(&self) -> u8 {
        self.levels.len() as u8
    }

    /// Width of level `z`, 0 for an unknown level.
    pub fn width(&self, z: u8) -> u16 {
        self.level(z).map_or(0, MapLevel::width)
    }

    pub fn height(&self, z: u8) -> u16 {
        self.level(z).map_or(0, MapLevel::height)
    }

    /// Whether `z` is a dungeon level.
    #[inline]
    pub fn is_dungeon(&self, z: u8) -> bool {
        z > 0
    }

    /// Wrap arbitrary signed coordinates onto level `z`.
    pub fn wrap_coord(&self, x: i32, y: i32, z: u8) -> MapCoord {
        let w = self.width(z) as i32;
        let h = self.height(z) as i32;
        MapCoord::new(wrap(x, w) as u16, wrap(y, h) as u16, z)
    }

    /// Terrain tile id at a wrapped position. 0 for an unknown level.
    pub fn get_tile(&self, x: i32, y: i32, z: u8) -> u16 {
        self.level(z)
            .map_or(0, |l| l.tiles.at_or_default(l.wrapped(x, y)))
    }

    pub fn set_tile(&mut self, x: i32, y: i32, z: u8, id: u16) {
        if let Some(l) = self.levels.get_mut(z as usize) {
            let p = l.wrapped(x, y);
            l.tiles.set(p, id);
        }
    }

    /// Roof id at a wrapped position, if any.
    pub fn get_roof(&self, x: i32, y: i32, z: u8) -> Option<u16> {
        let l = self.level(z)?;
        match l.roofs.at_or_default(l.wrapped(x, y)) {
            0 => None,
            r => Some(r - 1),
        }
    }

    pub fn has_roof(&self, x: i32, y: i32, z: u8) -> bool {
        self.get_roof(x, y, z).is_some()
    }

    pub fn set_roof(&mut self, x: i32, y: i32, z: u8, roof: Option<u16>) {
        if let Some(l) = self.levels.get_mut(z as usize) {
            let p = l.wrapped(x, y);
            l.roofs.set(p, roof.map_or(0, |r| r.saturating_add(1)));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tiles_wrap() {
        let mut m = WorldMap::new();
        let z = m.add_level(16, 8, 1);
        m.set_tile(-1, -1, z, 9);
        assert_eq!(m.get_tile(15, 7, z), 9);
        assert_eq!(m.get_tile(31, 15, z), 9);
        assert_eq!(m.get_tile(0, 0, 3), 0, "unknown level");
        assert_eq!(m.wrap_coord(-2, 9, z), MapCoord::new(14, 1, 0));
    }

    #[test]
    fn test_roofs() {
        let mut m = WorldMap::new();
        let z = m.add_level(8, 8, 1);
        assert!(!m.has_roof(2, 2, z));
        m.set_roof(2, 2, z, Some(0));
        assert_eq!(m.get_roof(2, 2, z), Some(0));
        m.set_roof(2, 2, z, None);
        assert_eq!(m.get_roof(2, 2, z), None);
    }
}
