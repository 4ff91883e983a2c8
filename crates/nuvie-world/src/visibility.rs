//! The visibility ("blacking") buffer.
//!
//! A scratch grid the size of the map window plus a fixed border on every
//! side. After [`VisibilityBuffer::regenerate`] each cell holds the tile id
//! to draw there, or 0 when the cell cannot be seen from the viewer.
//!
//! Visibility is an 8-connected flood fill from the centre of the view that
//! stops at boundary tiles. Walls hit by the fill stay visible; afterwards
//! they are reshaped so that they only connect to neighbours that are
//! visible too.

use log::{debug, trace};
use nuvie_core::{Grid, MapCoord, Point, wrap, wrapped_offset};

use crate::obj::ObjId;
use crate::tile::{Tile, TileFlags, WallMask};
use crate::world::World;

/// Cells of margin kept around the visible window on every side.
pub const BORDER: i32 = 3;

/// Id stored for cells that cannot be seen.
pub const BLACK: u16 = 0;

/// Whether roofs may be drawn this frame.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum RoofDisplay {
    #[default]
    Normal,
    /// The viewer can see inside a building; roofs are hidden.
    Off,
}

/// A run of wall tiles sharing one look, and the two corner tiles used
/// where a corner meets darkness.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct WallFamily {
    pub first: u16,
    pub last: u16,
    /// Drawn for a south-west corner whose north and east are black.
    pub dark_corner_sw: u16,
    /// Drawn for a north-east corner whose south and west are black.
    pub dark_corner_ne: u16,
}

impl WallFamily {
    #[inline]
    pub fn contains(&self, tile: u16) -> bool {
        (self.first..=self.last).contains(&tile)
    }
}

/// The Ultima VI wall families.
pub const U6_WALL_FAMILIES: [WallFamily; 3] = [
    WallFamily { first: 140, last: 159, dark_corner_sw: 266, dark_corner_ne: 267 },
    WallFamily { first: 160, last: 175, dark_corner_sw: 268, dark_corner_ne: 269 },
    WallFamily { first: 176, last: 187, dark_corner_sw: 270, dark_corner_ne: 271 },
];

/// Where the window looks and how the fill behaves.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ViewParams {
    /// Map coordinates of the window's top-left cell.
    pub cur_x: i32,
    pub cur_y: i32,
    pub level: u8,
    pub win_width: i32,
    pub win_height: i32,
    /// Columns on the right of the window hidden by other UI.
    pub center_xoff: i32,
    pub blacking: bool,
    pub xray: bool,
    /// Reuse the last fill seed instead of the window centre.
    pub freeze_seed: bool,
    pub roof_mode: bool,
    pub player: Option<MapCoord>,
}

/// Neighbour visiting order of the fill.
const FILL_ORDER: [(i32, i32); 8] = [
    (1, 0),
    (0, 1),
    (1, 1),
    (-1, -1),
    (-1, 0),
    (0, -1),
    (1, -1),
    (-1, 1),
];

/// The resolved tile ids of everything around the map window.
#[derive(Clone, Debug)]
pub struct VisibilityBuffer {
    buf: Grid<u16>,
    cur_x: i32,
    cur_y: i32,
    level: u8,
    map_width: i32,
    map_height: i32,
    last_seed: Option<(i32, i32)>,
    roof_display: RoofDisplay,
    families: Vec<WallFamily>,
}

impl VisibilityBuffer {
    /// An all-black buffer for a `win_width`×`win_height` window.
    pub fn new(win_width: i32, win_height: i32) -> Self {
        Self {
            buf: Grid::new(win_width.max(0) + 2 * BORDER, win_height.max(0) + 2 * BORDER),
            cur_x: 0,
            cur_y: 0,
            level: 0,
            map_width: 0,
            map_height: 0,
            last_seed: None,
            roof_display: RoofDisplay::Normal,
            families: U6_WALL_FAMILIES.to_vec(),
        }
    }

    /// Replace the wall families used by reshaping.
    pub fn set_wall_families(&mut self, families: Vec<WallFamily>) {
        self.families = families;
    }

    #[inline]
    pub fn grid(&self) -> &Grid<u16> {
        &self.buf
    }

    #[inline]
    pub fn width(&self) -> i32 {
        self.buf.width()
    }

    #[inline]
    pub fn height(&self) -> i32 {
        self.buf.height()
    }

    #[inline]
    pub fn roof_display(&self) -> RoofDisplay {
        self.roof_display
    }

    /// The seed of the last blacking fill, in map coordinates.
    pub fn last_seed(&self) -> Option<(i32, i32)> {
        self.last_seed
    }

    /// Tile id at buffer coordinates; out of range is black.
    #[inline]
    pub fn tile_at(&self, bx: i32, by: i32) -> u16 {
        self.buf.at(Point::new(bx, by)).unwrap_or(BLACK)
    }

    #[inline]
    pub fn is_black(&self, bx: i32, by: i32) -> bool {
        self.tile_at(bx, by) == BLACK
    }

    /// Map coordinates of a buffer cell.
    pub fn map_coord(&self, bx: i32, by: i32) -> MapCoord {
        MapCoord::new(
            wrap(self.cur_x - BORDER + bx, self.map_width) as u16,
            wrap(self.cur_y - BORDER + by, self.map_height) as u16,
            self.level,
        )
    }

    /// Buffer coordinates of a map position, if it lies within the buffer.
    pub fn to_buffer(&self, x: i32, y: i32, z: u8) -> Option<Point> {
        if z != self.level {
            return None;
        }
        let bx = wrapped_offset(self.cur_x - BORDER, x, self.map_width);
        let by = wrapped_offset(self.cur_y - BORDER, y, self.map_height);
        let p = Point::new(bx, by);
        self.buf.contains(p).then_some(p)
    }

    /// Whether an object at buffer cell (bx, by) may be drawn.
    ///
    /// Nothing is drawn in darkness. Wall cells whose right or lower
    /// neighbour is black hide their objects, so that things hung on the
    /// far side of a wall do not show through.
    pub fn can_display_obj(&self, world: &World, bx: i32, by: i32, obj: ObjId) -> bool {
        let tile_num = self.tile_at(bx, by);
        if tile_num == BLACK {
            return false;
        }
        if bx >= self.width() - 1 || by >= self.height() - 1 {
            return false;
        }
        if world.objs.get(obj).is_none() {
            return false;
        }
        if self.is_black(bx + 1, by) || self.is_black(bx, by + 1) {
            let wall = world
                .tiles
                .get_tile(tile_num)
                .is_some_and(|t| t.is(TileFlags::WALL));
            if wall {
                return false;
            }
        }
        true
    }

    /// Whether a map position (and optionally an object drawn there) is
    /// hidden from the viewer.
    ///
    /// A non-wall object also counts as hidden when the cell to its right
    /// or below is black.
    pub fn tile_is_black(&self, world: &World, x: i32, y: i32, z: u8, obj: Option<ObjId>) -> bool {
        let Some(p) = self.to_buffer(x, y, z) else {
            return true;
        };
        if self.is_black(p.x, p.y) {
            return true;
        }
        let Some(obj) = obj else {
            return false;
        };
        let tile = world
            .objs
            .tile_num(obj)
            .and_then(|t| world.tiles.get_original_tile(t));
        match tile {
            None => true,
            Some(t) if t.is(TileFlags::WALL) => false,
            Some(_) => self.is_black(p.x + 1, p.y) || self.is_black(p.x, p.y + 1),
        }
    }

    // -----------------------------------------------------------------------
    // Regeneration
    // -----------------------------------------------------------------------

    /// Recompute the buffer for the given view.
    ///
    /// Must be called whenever the view moves or anything that may change
    /// what blocks sight has been edited.
    pub fn regenerate(&mut self, world: &World, view: &ViewParams) {
        let (w, h) = (view.win_width.max(0) + 2 * BORDER, view.win_height.max(0) + 2 * BORDER);
        if self.buf.width() != w || self.buf.height() != h {
            self.buf = Grid::new(w, h);
        }
        self.cur_x = view.cur_x;
        self.cur_y = view.cur_y;
        self.level = view.level;
        self.map_width = world.map.width(view.level) as i32;
        self.map_height = world.map.height(view.level) as i32;

        if !view.blacking {
            for p in self.buf.bounds() {
                let c = self.map_coord(p.x, p.y);
                let id = world.map.get_tile(c.x as i32, c.y as i32, c.z);
                self.buf.set(p, id);
            }
            return;
        }

        self.roof_display = RoofDisplay::Normal;
        self.buf.fill(BLACK);
        if view.win_width <= 0 || view.win_height <= 0 {
            return;
        }

        let (mut x, mut y) = match (view.freeze_seed, self.last_seed) {
            (true, Some(seed)) => seed,
            _ => (
                view.cur_x + (view.win_width - 1 - view.center_xoff) / 2,
                view.cur_y + (view.win_height - 1) / 2,
            ),
        };
        x = wrap(x, self.map_width);
        y = wrap(y, self.map_height);

        // Some beings stand inside walls. Start beside the wall instead:
        // east of a north-south wall, south of anything else.
        if world.obj_flag_at(x, y, view.level, TileFlags::BOUNDARY, None) {
            let vertical = obj_tile_at(world, x, y, view.level, false)
                .is_some_and(|t| t.walls == WallMask::NORTH | WallMask::SOUTH);
            if vertical {
                x = wrap(x + 1, self.map_width);
            } else {
                y = wrap(y + 1, self.map_height);
            }
        }
        self.last_seed = Some((x, y));

        self.fill(world, view, x, y);
        self.reshape_boundary(world);

        if view.roof_mode && self.floor_tiles_visible(world, view.player) {
            self.roof_display = RoofDisplay::Off;
        }
        debug!(
            "visibility regenerated at ({}, {}, {}) seed ({x}, {y}) roof {:?}",
            view.cur_x, view.cur_y, view.level, self.roof_display
        );
    }

    fn fill(&mut self, world: &World, view: &ViewParams, seed_x: i32, seed_y: i32) {
        let start = Point::new(
            wrapped_offset(self.cur_x - BORDER, seed_x, self.map_width),
            wrapped_offset(self.cur_y - BORDER, seed_y, self.map_height),
        );
        let mut visited: Grid<bool> = Grid::new(self.width(), self.height());
        let mut stack = vec![start];
        let mut filled = 0usize;

        while let Some(p) = stack.pop() {
            // The outer ring is never filled.
            if p.x < 1 || p.y < 1 || p.x > self.width() - 2 || p.y > self.height() - 2 {
                continue;
            }
            if visited.at(p).unwrap_or(true) {
                continue;
            }
            visited.set(p, true);
            filled += 1;

            let c = self.map_coord(p.x, p.y);
            let (x, y) = (c.x as i32, c.y as i32);
            let id = world.map.get_tile(x, y, view.level);
            self.buf.set(p, id);

            if !view.xray && world.is_boundary(x, y, view.level) {
                if !self.look_through_window(world, id, x, y, view.player) {
                    continue;
                }
                self.roof_display = RoofDisplay::Off;
            }

            // Pushed in reverse so cells pop in visiting order.
            for &(dx, dy) in FILL_ORDER.iter().rev() {
                stack.push(p.shift(dx, dy));
            }
        }
        trace!("visibility fill reached {filled} cells");
    }

    /// Whether the viewer sees through a boundary cell: it must be a window
    /// (tile or object) and the player must stand orthogonally next to it.
    fn look_through_window(&self, world: &World, tile_num: u16, x: i32, y: i32, player: Option<MapCoord>) -> bool {
        let is_window = |t: Option<&Tile>| t.is_some_and(|t| t.is(TileFlags::WINDOW));
        if !is_window(world.tiles.get_tile(tile_num)) {
            let obj_window = world
                .get_obj_based_at(x, y, self.level, true, None)
                .is_some_and(|o| is_window(world.obj_tile(o)));
            if !obj_window {
                return false;
            }
        }
        let Some(a) = player else {
            return false;
        };
        let (ax, ay) = (a.x as i32, a.y as i32);
        let (xm1, xp1) = (wrap(x - 1, self.map_width), wrap(x + 1, self.map_width));
        let (ym1, yp1) = (wrap(y - 1, self.map_height), wrap(y + 1, self.map_height));
        (ax == x && (ay == ym1 || ay == yp1)) || (ay == y && (ax == xm1 || ax == xp1))
    }

    fn is_boundary_cell(&self, world: &World, bx: i32, by: i32) -> bool {
        let id = self.tile_at(bx, by);
        if id == BLACK {
            return false;
        }
        if world.tiles.get_tile(id).is_some_and(|t| t.is(TileFlags::BOUNDARY)) {
            return true;
        }
        let c = self.map_coord(bx, by);
        world.obj_flag_at(c.x as i32, c.y as i32, c.z, TileFlags::BOUNDARY, None)
    }

    /// Whether the cell at (bx, by) is a visible wall reaching back towards
    /// its neighbour on side `toward`.
    fn is_wall_towards(&self, world: &World, bx: i32, by: i32, toward: WallMask) -> bool {
        let id = self.tile_at(bx, by);
        if id == BLACK {
            return false;
        }
        let mask = toward.opposite();
        if world
            .tiles
            .get_tile(id)
            .is_some_and(|t| t.is(TileFlags::WALL) && t.walls.contains(mask))
        {
            return true;
        }
        let c = self.map_coord(bx, by);
        obj_tile_at(world, c.x as i32, c.y as i32, c.z, false)
            .is_some_and(|t| t.is(TileFlags::BOUNDARY) && t.walls.contains(mask))
    }

    fn reshape_boundary(&mut self, world: &World) {
        let sides = [
            (0, -1, WallMask::NORTH),
            (1, 0, WallMask::EAST),
            (0, 1, WallMask::SOUTH),
            (-1, 0, WallMask::WEST),
        ];
        for y in 1..self.height() - 1 {
            for x in 1..self.width() - 1 {
                if !self.is_boundary_cell(world, x, y) {
                    continue;
                }
                let id = self.tile_at(x, y);
                let Some(family) = self.families.iter().find(|f| f.contains(id)).copied() else {
                    continue;
                };
                let Some(tile) = world.tiles.get_tile(id) else {
                    continue;
                };
                let original = tile.walls;

                let mut flag = 0u8;
                for (dx, dy, side) in sides {
                    let (nx, ny) = (x + dx, y + dy);
                    // Keep a connector towards any visible neighbour the
                    // tile already pointed at, wall or not.
                    if self.is_wall_towards(world, nx, ny, side)
                        || (!self.is_black(nx, ny) && original.contains(side))
                    {
                        flag |= side.bits();
                    }
                }
                if flag == 0 {
                    continue;
                }

                let sw = (WallMask::SOUTH | WallMask::WEST).bits();
                let ne = (WallMask::NORTH | WallMask::EAST).bits();
                if flag == sw && self.is_black(x, y - 1) && self.is_black(x + 1, y) {
                    self.buf.set(Point::new(x, y), family.dark_corner_sw);
                    continue;
                }
                if flag == ne && self.is_black(x, y + 1) && self.is_black(x - 1, y) {
                    self.buf.set(Point::new(x, y), family.dark_corner_ne);
                    continue;
                }

                if original.bits() == flag {
                    continue;
                }
                let step: i32 = if original.bits() > flag && flag != (WallMask::NORTH | WallMask::WEST).bits() {
                    -1
                } else {
                    1
                };
                let mut cur = tile;
                while cur.walls.bits() != flag && cur.walls != WallMask::NONE {
                    let next = i32::from(cur.id) + step;
                    match u16::try_from(next).ok().and_then(|n| world.tiles.get_tile(n)) {
                        Some(t) => cur = t,
                        None => break,
                    }
                }
                if cur.walls.bits() == flag {
                    self.buf.set(Point::new(x, y), cur.id);
                }
            }
        }
    }

    /// Whether the viewer can see a building's floor right next to them,
    /// in which case roofs are hidden.
    fn floor_tiles_visible(&self, world: &World, player: Option<MapCoord>) -> bool {
        let Some(a) = player else {
            return false;
        };
        let z = self.level;
        (-1..=1).any(|dy| {
            (-1..=1).any(|dx| {
                let (x, y) = (a.x as i32 + dx, a.y as i32 + dy);
                world.map.has_roof(x, y, z)
                    && !world.is_boundary(x, y, z)
                    && obj_tile_at(world, x, y, z, false).is_some_and(|t| t.is(TileFlags::WALL))
            })
        })
    }
}

/// The tile of the object covering (x, y), picking the right part of a
/// multi-tile object.
pub fn obj_tile_at(world: &World, x: i32, y: i32, z: u8, top: bool) -> Option<&Tile> {
    let id = world.get_obj(x, y, z, top, None)?;
    let anchor = world.objs.get(id)?.map_coord()?;
    let tile = world.obj_tile(id)?;
    let at = world.map.wrap_coord(x, y, z);
    let part = match (anchor.x != at.x, anchor.y != at.y) {
        (false, false) => 0,
        (true, false) => 1,
        (false, true) if tile.is(TileFlags::DBL_WIDTH) => 2,
        (false, true) => 1,
        (true, true) => 3,
    };
    world.tiles.get_tile(tile.id.checked_sub(part)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::obj::{Obj, ObjType};
    use crate::tile::Tile;

    const GRASS: u16 = 1;
    const ROCK: u16 = 2;
    const WINDOW: u16 = 3;

    fn base_world() -> World {
        let mut w = World::new();
        for id in 1..300 {
            w.tiles.insert(Tile::new(id, "grass", 2).with_flags(TileFlags::PASSABLE));
        }
        w.tiles.insert(Tile::new(ROCK, "rock", 8).with_flags(TileFlags::BOUNDARY));
        w.tiles.insert(
            Tile::new(WINDOW, "window", 9).with_flags(TileFlags::BOUNDARY | TileFlags::WINDOW),
        );
        w.map.add_level(256, 256, GRASS);
        w
    }

    fn view(cur_x: i32, cur_y: i32, player: Option<MapCoord>) -> ViewParams {
        ViewParams {
            cur_x,
            cur_y,
            level: 0,
            win_width: 11,
            win_height: 11,
            center_xoff: 0,
            blacking: true,
            xray: false,
            freeze_seed: false,
            roof_mode: true,
            player,
        }
    }

    fn centred_on(p: MapCoord) -> ViewParams {
        view(p.x as i32 - 5, p.y as i32 - 5, Some(p))
    }

    fn ring_is_black(vis: &VisibilityBuffer) -> bool {
        vis.grid()
            .iter()
            .filter(|(p, _)| p.x == 0 || p.y == 0 || p.x == vis.width() - 1 || p.y == vis.height() - 1)
            .all(|(_, id)| id == BLACK)
    }

    #[test]
    fn test_open_field_fully_visible() {
        let mut w = base_world();
        for (i, x) in (95..106).enumerate() {
            w.map.set_tile(x, 97, 0, 10 + i as u16);
        }
        let player = MapCoord::new(100, 100, 0);
        let mut vis = VisibilityBuffer::new(11, 11);
        vis.regenerate(&w, &centred_on(player));
        for by in BORDER..BORDER + 11 {
            for bx in BORDER..BORDER + 11 {
                let c = vis.map_coord(bx, by);
                assert_eq!(
                    vis.tile_at(bx, by),
                    w.map.get_tile(c.x as i32, c.y as i32, 0),
                    "cell {bx},{by} should show the map tile"
                );
            }
        }
        assert!(ring_is_black(&vis));
    }

    #[test]
    fn test_wall_stops_the_fill() {
        let mut w = base_world();
        for y in 80..120 {
            w.map.set_tile(101, y, 0, ROCK);
        }
        let player = MapCoord::new(100, 100, 0);
        let mut vis = VisibilityBuffer::new(11, 11);
        vis.regenerate(&w, &centred_on(player));
        let wall = vis.to_buffer(101, 100, 0).unwrap();
        let beyond = vis.to_buffer(102, 100, 0).unwrap();
        assert_eq!(vis.tile_at(wall.x, wall.y), ROCK, "the wall itself is drawn");
        assert!(vis.is_black(beyond.x, beyond.y), "nothing east of the wall");
        assert!(vis.tile_is_black(&w, 103, 98, 0, None));
        assert!(!vis.tile_is_black(&w, 99, 98, 0, None));
    }

    #[test]
    fn test_window_needs_adjacent_viewer() {
        let mut w = base_world();
        for y in 80..120 {
            w.map.set_tile(101, y, 0, ROCK);
        }
        w.map.set_tile(101, 100, 0, WINDOW);
        w.map.set_roof(100, 100, 0, Some(0));

        let mut vis = VisibilityBuffer::new(11, 11);
        let next_to = MapCoord::new(100, 100, 0);
        vis.regenerate(&w, &centred_on(next_to));
        assert!(!vis.tile_is_black(&w, 102, 100, 0, None), "seen through the window");
        assert_eq!(vis.roof_display(), RoofDisplay::Off);

        let away = MapCoord::new(99, 100, 0);
        vis.regenerate(&w, &view(95, 95, Some(away)));
        assert!(vis.tile_is_black(&w, 102, 100, 0, None), "too far from the window");
        assert_eq!(vis.roof_display(), RoofDisplay::Normal);
    }

    #[test]
    fn test_xray_ignores_walls() {
        let mut w = base_world();
        for y in 80..120 {
            w.map.set_tile(101, y, 0, ROCK);
        }
        let mut vis = VisibilityBuffer::new(11, 11);
        let mut v = centred_on(MapCoord::new(100, 100, 0));
        v.xray = true;
        vis.regenerate(&w, &v);
        assert!(!vis.tile_is_black(&w, 103, 100, 0, None));
    }

    #[test]
    fn test_regenerate_is_idempotent() {
        let mut w = base_world();
        for y in 80..120 {
            w.map.set_tile(102, y, 0, ROCK);
        }
        let v = centred_on(MapCoord::new(100, 100, 0));
        let mut vis = VisibilityBuffer::new(11, 11);
        vis.regenerate(&w, &v);
        let first = vis.grid().clone();
        vis.regenerate(&w, &v);
        assert_eq!(&first, vis.grid());
    }

    #[test]
    fn test_border_ring_black_for_any_size() {
        let w = base_world();
        for (ww, wh) in [(1, 1), (3, 7), (5, 5), (11, 11), (20, 9)] {
            let mut vis = VisibilityBuffer::new(ww, wh);
            let mut v = view(50, 50, None);
            v.win_width = ww;
            v.win_height = wh;
            vis.regenerate(&w, &v);
            assert!(ring_is_black(&vis), "ring not black for {ww}x{wh}");
        }
    }

    #[test]
    fn test_zero_size_view_is_all_black() {
        let w = base_world();
        let mut vis = VisibilityBuffer::new(0, 0);
        let mut v = view(50, 50, None);
        v.win_width = 0;
        v.win_height = 0;
        vis.regenerate(&w, &v);
        assert_eq!(vis.grid().count_fn(|_, id| id != BLACK), 0);
    }

    #[test]
    fn test_view_across_the_seam() {
        let mut w = base_world();
        w.map.set_tile(0, 3, 0, 42);
        let mut vis = VisibilityBuffer::new(11, 11);
        vis.regenerate(&w, &view(250, 0, Some(MapCoord::new(255, 5, 0))));
        let p = vis.to_buffer(0, 3, 0).unwrap();
        assert_eq!(vis.tile_at(p.x, p.y), 42);
    }

    #[test]
    fn test_no_blacking_copies_everything() {
        let mut w = base_world();
        for y in 80..120 {
            w.map.set_tile(101, y, 0, ROCK);
        }
        let mut v = centred_on(MapCoord::new(100, 100, 0));
        v.blacking = false;
        let mut vis = VisibilityBuffer::new(11, 11);
        vis.regenerate(&w, &v);
        assert_eq!(vis.grid().count_fn(|_, id| id == BLACK), 0);
    }

    #[test]
    fn test_frozen_seed_is_reused() {
        let w = base_world();
        let mut vis = VisibilityBuffer::new(11, 11);
        let mut v = view(50, 50, None);
        vis.regenerate(&w, &v);
        let seed = vis.last_seed();
        v.cur_x = 60;
        v.freeze_seed = true;
        vis.regenerate(&w, &v);
        assert_eq!(vis.last_seed(), seed);
    }

    // --- wall reshaping ---

    fn wall_world() -> World {
        let mut w = base_world();
        let walls = [
            (140, WallMask::NONE),
            (141, WallMask::NORTH | WallMask::SOUTH),
            (142, WallMask::EAST | WallMask::WEST),
            (143, WallMask::SOUTH | WallMask::WEST),
            (145, WallMask::WEST),
            (146, WallMask::EAST | WallMask::WEST),
        ];
        for (id, mask) in walls {
            w.tiles.insert(
                Tile::new(id, "wall", 5)
                    .with_flags(TileFlags::WALL | TileFlags::BOUNDARY)
                    .with_walls(mask),
            );
        }
        w
    }

    #[test]
    fn test_isolated_wall_unchanged() {
        let mut w = wall_world();
        // A lone wall pointing east and west, with only floor around it.
        w.map.set_tile(102, 100, 0, 142);
        for y in 80..120 {
            w.map.set_tile(103, y, 0, ROCK);
        }
        let mut vis = VisibilityBuffer::new(11, 11);
        vis.regenerate(&w, &centred_on(MapCoord::new(100, 100, 0)));
        let p = vis.to_buffer(102, 100, 0).unwrap();
        assert_eq!(vis.tile_at(p.x, p.y), 142, "connectors to visible floor are kept");

        // An isolated island: the wall has no connectors at all.
        let mut w = wall_world();
        w.map.set_tile(102, 100, 0, 140);
        let mut vis = VisibilityBuffer::new(11, 11);
        vis.regenerate(&w, &centred_on(MapCoord::new(100, 100, 0)));
        let p = vis.to_buffer(102, 100, 0).unwrap();
        assert_eq!(vis.tile_at(p.x, p.y), 140);
    }

    #[test]
    fn test_wall_reshaped_to_visible_neighbours() {
        let mut w = wall_world();
        // An east-west wall set into a rock column: only its west side can
        // be seen, so it is redrawn as a west-only stub.
        for y in 80..120 {
            w.map.set_tile(102, y, 0, ROCK);
        }
        w.map.set_tile(102, 100, 0, 146);
        let mut vis = VisibilityBuffer::new(11, 11);
        vis.regenerate(&w, &centred_on(MapCoord::new(100, 100, 0)));
        let p = vis.to_buffer(102, 100, 0).unwrap();
        assert!(vis.is_black(p.x + 1, p.y), "east of the wall is hidden");
        assert_eq!(vis.tile_at(p.x, p.y), 145);
    }

    #[test]
    fn test_dark_corner_substitution() {
        let mut w = wall_world();
        // S|W corner at (102, 100): west neighbour is a visible E|W wall,
        // south neighbour a visible N|S wall, north and east are black.
        w.map.set_tile(102, 100, 0, 143);
        w.map.set_tile(101, 100, 0, 142);
        w.map.set_tile(102, 101, 0, 141);
        for x in 80..120 {
            w.map.set_tile(x, 99, 0, ROCK);
        }
        for y in 100..120 {
            w.map.set_tile(103, y, 0, ROCK);
        }
        let mut vis = VisibilityBuffer::new(11, 11);
        vis.regenerate(&w, &centred_on(MapCoord::new(100, 100, 0)));
        let p = vis.to_buffer(102, 100, 0).unwrap();
        assert!(vis.is_black(p.x, p.y - 1) && vis.is_black(p.x + 1, p.y));
        assert_eq!(vis.tile_at(p.x, p.y), 266);
    }

    #[test]
    fn test_seed_nudged_off_wall_object() {
        let mut w = base_world();
        w.tiles.insert(
            Tile::new(200, "wall", 3)
                .with_flags(TileFlags::BOUNDARY)
                .with_walls(WallMask::NORTH | WallMask::SOUTH),
        );
        w.objs.register_type(1, ObjType::new("wall", 200, 0));
        w.objs.add_to_map(Obj::new(1, 0), MapCoord::new(105, 105, 0));
        let mut vis = VisibilityBuffer::new(11, 11);
        vis.regenerate(&w, &view(100, 100, None));
        assert_eq!(vis.last_seed(), Some((106, 105)));
    }
}
