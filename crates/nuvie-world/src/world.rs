//! The [`World`] aggregate: tiles, terrain, objects and actors, and the
//! queries that need more than one of them (boundaries, passability,
//! multi-tile object lookup, line tests).

use std::ops::BitOr;

use nuvie_core::MapCoord;

use crate::actor::{ActorId, ActorTable};
use crate::map::WorldMap;
use crate::obj::{ObjId, ObjManager};
use crate::tile::{Tile, TileFlags, TileStore};

/// What a [`World::line_test`] stops at.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct LineTestFlags(pub u8);

impl LineTestFlags {
    pub const NONE: Self = Self(0);
    pub const HIT_ACTORS: Self = Self(1 << 0);
    pub const HIT_UNPASSABLE: Self = Self(1 << 1);
    pub const HIT_MISSILE_BOUNDARY: Self = Self(1 << 2);
    pub const HIT_OBJECTS: Self = Self(1 << 3);

    #[inline]
    pub const fn contains(self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }
}

impl BitOr for LineTestFlags {
    type Output = Self;
    #[inline]
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// Where a line test stopped.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct LineTestResult {
    pub hit: MapCoord,
    /// The last point before `hit`, or `hit` itself for the first point.
    pub pre: MapCoord,
    pub hit_actor: Option<ActorId>,
    pub hit_obj: Option<ObjId>,
}

/// Cells a multi-tile object anchored at (x+dx, y+dy) covers at (x, y),
/// with the tile flags it needs for that.
const MULTI_TILE_ANCHORS: [(i32, i32, TileFlags); 4] = [
    (0, 0, TileFlags::NONE),
    (1, 1, TileFlags(TileFlags::DBL_WIDTH.0 | TileFlags::DBL_HEIGHT.0)),
    (0, 1, TileFlags::DBL_HEIGHT),
    (1, 0, TileFlags::DBL_WIDTH),
];

/// Everything the map window and the action code read and mutate.
#[derive(Clone, Debug, Default)]
pub struct World {
    pub tiles: TileStore,
    pub map: WorldMap,
    pub objs: ObjManager,
    pub actors: ActorTable,
}

impl World {
    pub fn new() -> Self {
        Self::default()
    }

    /// Terrain tile at a wrapped position.
    pub fn tile_at(&self, x: i32, y: i32, z: u8) -> Option<&Tile> {
        self.tiles.get_tile(self.map.get_tile(x, y, z))
    }

    /// The tile an object is currently drawn with.
    pub fn obj_tile(&self, id: ObjId) -> Option<&Tile> {
        self.objs.tile_num(id).and_then(|t| self.tiles.get_tile(t))
    }

    pub fn player_pos(&self) -> Option<MapCoord> {
        self.actors.player().map(|a| a.pos)
    }

    /// The first (or top) object whose anchor is exactly this cell.
    pub fn get_obj_based_at(
        &self,
        x: i32,
        y: i32,
        z: u8,
        top: bool,
        exclude: Option<ObjId>,
    ) -> Option<ObjId> {
        let at = self.map.wrap_coord(x, y, z);
        let mut list = self.objs.objs_at(at).iter().copied().filter(|&o| Some(o) != exclude);
        if top { list.last() } else { list.next() }
    }

    /// The object covering a cell, including double-width/height objects
    /// anchored right of or below it.
    pub fn get_obj(&self, x: i32, y: i32, z: u8, top: bool, exclude: Option<ObjId>) -> Option<ObjId> {
        MULTI_TILE_ANCHORS.iter().find_map(|&(dx, dy, need)| {
            let id = self.get_obj_based_at(x + dx, y + dy, z, top, exclude)?;
            let covers = need == TileFlags::NONE || self.obj_tile(id).is_some_and(|t| t.is(need));
            covers.then_some(id)
        })
    }

    /// Whether any object covering this cell has a tile with `flag`.
    pub fn obj_flag_at(&self, x: i32, y: i32, z: u8, flag: TileFlags, exclude: Option<ObjId>) -> bool {
        MULTI_TILE_ANCHORS.iter().any(|&(dx, dy, need)| {
            let at = self.map.wrap_coord(x + dx, y + dy, z);
            self.objs.objs_at(at).iter().any(|&o| {
                Some(o) != exclude
                    && self
                        .obj_tile(o)
                        .is_some_and(|t| t.is(need) && t.flags.intersects(flag))
            })
        })
    }

    /// Whether the cell blocks line of sight.
    pub fn is_boundary(&self, x: i32, y: i32, z: u8) -> bool {
        self.tile_at(x, y, z).is_some_and(|t| t.is(TileFlags::BOUNDARY))
            || self.obj_flag_at(x, y, z, TileFlags::BOUNDARY, None)
    }

    pub fn is_missile_boundary(&self, x: i32, y: i32, z: u8, exclude: Option<ObjId>) -> bool {
        self.tile_at(x, y, z)
            .is_some_and(|t| t.is(TileFlags::MISSILE_BOUNDARY))
            || self.obj_flag_at(x, y, z, TileFlags::MISSILE_BOUNDARY, exclude)
    }

    /// Whether something could walk onto the cell, ignoring actors.
    ///
    /// An impassable object blocks; a passable object (a bridge) makes the
    /// cell passable regardless of terrain.
    pub fn is_passable(&self, x: i32, y: i32, z: u8, exclude: Option<ObjId>) -> bool {
        let at = self.map.wrap_coord(x, y, z);
        let mut any_passable_obj = false;
        for &o in self.objs.objs_at(at) {
            if Some(o) == exclude {
                continue;
            }
            match self.obj_tile(o) {
                Some(t) if t.is(TileFlags::PASSABLE) => any_passable_obj = true,
                Some(_) => return false,
                None => {}
            }
        }
        any_passable_obj || self.tile_at(x, y, z).is_some_and(|t| t.is(TileFlags::PASSABLE))
    }

    /// Walk a Bresenham line from `from` to (x1, y1) on the same level,
    /// skipping the first `skip` points, and report the first point that
    /// matches `flags`.
    pub fn line_test(
        &self,
        from: MapCoord,
        x1: i32,
        y1: i32,
        flags: LineTestFlags,
        skip: usize,
        exclude: Option<ObjId>,
    ) -> Option<LineTestResult> {
        let z = from.z;
        let (x0, y0) = (from.x as i32, from.y as i32);
        let mut pre = from;
        for (i, (x, y)) in bresenham(x0, y0, x1, y1).enumerate() {
            let at = self.map.wrap_coord(x, y, z);
            if i < skip {
                pre = at;
                continue;
            }
            let hit = |hit_actor: Option<ActorId>, hit_obj: Option<ObjId>| LineTestResult {
                hit: at,
                pre,
                hit_actor,
                hit_obj,
            };
            if flags.contains(LineTestFlags::HIT_UNPASSABLE) && !self.is_passable(x, y, z, exclude) {
                return Some(hit(None, self.get_obj(x, y, z, true, exclude)));
            }
            if flags.contains(LineTestFlags::HIT_MISSILE_BOUNDARY)
                && self.is_missile_boundary(x, y, z, exclude)
            {
                return Some(hit(None, self.get_obj(x, y, z, true, exclude)));
            }
            if flags.contains(LineTestFlags::HIT_ACTORS) {
                if let Some(a) = self.actors.actor_at(at) {
                    return Some(hit(Some(a), None));
                }
            }
            if flags.contains(LineTestFlags::HIT_OBJECTS) {
                if let Some(o) = self.get_obj(x, y, z, true, exclude) {
                    return Some(hit(None, Some(o)));
                }
            }
            pre = at;
        }
        None
    }
}

/// Points of the line from (x0, y0) to (x1, y1), both ends included.
fn bresenham(x0: i32, y0: i32, x1: i32, y1: i32) -> impl Iterator<Item = (i32, i32)> {
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;
    let (mut x, mut y) = (x0, y0);
    let mut done = false;
    std::iter::from_fn(move || {
        if done {
            return None;
        }
        let p = (x, y);
        if x == x1 && y == y1 {
            done = true;
        } else {
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
        Some(p)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::obj::{Obj, ObjType};

    const GRASS: u16 = 1;
    const ROCK: u16 = 2;
    const TABLE_LEFT: u16 = 50;
    const TABLE_RIGHT: u16 = 51;

    fn world() -> World {
        let mut w = World::new();
        w.tiles.insert(Tile::new(GRASS, "grass", 2).with_flags(TileFlags::PASSABLE));
        w.tiles.insert(
            Tile::new(ROCK, "rock", 8)
                .with_flags(TileFlags::BOUNDARY | TileFlags::MISSILE_BOUNDARY),
        );
        w.tiles.insert(Tile::new(TABLE_LEFT, "table", 4));
        w.tiles.insert(
            Tile::new(TABLE_RIGHT, "table", 4)
                .with_flags(TileFlags::DBL_WIDTH | TileFlags::MISSILE_BOUNDARY),
        );
        w.map.add_level(32, 32, GRASS);
        w.objs.register_type(7, ObjType::new("table", TABLE_RIGHT, 0));
        w
    }

    #[test]
    fn test_bresenham_includes_both_ends() {
        let pts: Vec<_> = bresenham(0, 0, 3, 1).collect();
        assert_eq!(pts.first(), Some(&(0, 0)));
        assert_eq!(pts.last(), Some(&(3, 1)));
        assert_eq!(pts.len(), 4);
        assert_eq!(bresenham(2, 2, 2, 2).count(), 1);
    }

    #[test]
    fn test_double_width_object_covers_left_cell() {
        let mut w = world();
        let table = w.objs.add_to_map(Obj::new(7, 0), MapCoord::new(5, 5, 0));
        assert_eq!(w.get_obj(5, 5, 0, true, None), Some(table));
        assert_eq!(w.get_obj(4, 5, 0, true, None), Some(table), "left half");
        assert_eq!(w.get_obj(5, 4, 0, true, None), None, "not double height");
        assert!(w.is_missile_boundary(4, 5, 0, None));
        assert!(!w.is_missile_boundary(4, 5, 0, Some(table)), "excluded");
    }

    #[test]
    fn test_line_test_hits_boundary() {
        let mut w = world();
        w.map.set_tile(4, 0, 0, ROCK);
        let from = MapCoord::new(0, 0, 0);
        let hit = w
            .line_test(from, 8, 0, LineTestFlags::HIT_MISSILE_BOUNDARY, 0, None)
            .map(|r| (r.hit, r.pre));
        assert_eq!(hit, Some((MapCoord::new(4, 0, 0), MapCoord::new(3, 0, 0))));
        assert!(w.line_test(from, 3, 3, LineTestFlags::HIT_UNPASSABLE, 0, None).is_none());
    }

    #[test]
    fn test_line_test_actors_and_skip() {
        let mut w = world();
        let me = w.actors.add("avatar", MapCoord::new(1, 1, 0), 100);
        let from = MapCoord::new(1, 1, 0);
        let r = w.line_test(from, 3, 1, LineTestFlags::HIT_ACTORS, 0, None);
        assert_eq!(r.and_then(|r| r.hit_actor), Some(me));
        assert!(w.line_test(from, 3, 1, LineTestFlags::HIT_ACTORS, 1, None).is_none());
    }

    #[test]
    fn test_passable_objects_override_terrain() {
        let mut w = world();
        w.map.set_tile(2, 2, 0, ROCK);
        assert!(!w.is_passable(2, 2, 0, None));
        w.tiles.insert(Tile::new(60, "bridge", 6).with_flags(TileFlags::PASSABLE));
        w.objs.register_type(8, ObjType::new("bridge", 60, 0));
        let bridge = w.objs.add_to_map(Obj::new(8, 0), MapCoord::new(2, 2, 0));
        assert!(w.is_passable(2, 2, 0, None));
        assert!(!w.is_passable(2, 2, 0, Some(bridge)));
    }
}
