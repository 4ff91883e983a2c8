//! Map window renderer.
//!
//! Draws one frame in a fixed order of passes: terrain, objects below the
//! actors, actors, animations, top objects, roofs, weather, the cursor,
//! lighting, and finally overlays and the frame border.

use log::trace;
use nuvie_core::{Point, Range, Surface, TILE_PIXELS, TILE_SIZE};
use nuvie_world::{ActorStatus, BORDER, LightingStyle, Tile, TileFlags, World};
use rand::rngs::SmallRng;
use rand::{RngExt, SeedableRng};

use crate::clock::{GameClock, Timer};
use crate::config::XRayMode;
use crate::map_window::{CursorKind, MapWindow, OverlayLevel};
use crate::party::Party;

/// Rain speckle colour.
const RAIN_COLOR: u8 = 118;
const GRID_COLOR: u8 = 15;
/// Highest top-left row at which roofs are drawn.
const ROOF_MAX_Y: i32 = 760;
const THUMBNAIL_STEP: i32 = 4;

// Frame border tiles.
const BORDER_UL: u16 = 432;
const BORDER_TOP: u16 = 433;
const BORDER_UR: u16 = 434;
const BORDER_LL: u16 = 435;
const BORDER_BOTTOM: u16 = 436;
const BORDER_LR: u16 = 437;
const BORDER_LEFT: u16 = 438;
const BORDER_RIGHT: u16 = 439;

/// What is drawn in one frame.
pub struct Frame<'a> {
    pub world: &'a World,
    pub clock: &'a GameClock,
    pub party: &'a Party,
}

pub struct Renderer {
    rng: SmallRng,
    drawn: usize,
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new(0)
    }
}

impl Renderer {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
            drawn: 0,
        }
    }

    /// Draw the map window into `surface` with its top-left pixel at the
    /// origin. Returns the rectangle that should be presented.
    pub fn draw(&mut self, frame: &Frame<'_>, mw: &mut MapWindow, surface: &mut Surface) -> Range {
        self.drawn = 0;
        let clip = Range::with_size(0, 0, mw.win_width() * TILE_SIZE, mw.win_height() * TILE_SIZE);
        let (ax, ay) = mw.pixel_offset();
        let mut pass = Pass {
            world: frame.world,
            mw,
            surface,
            clip,
            offset: Point::new(ax, ay),
            drawn: &mut self.drawn,
        };

        pass.terrain();
        pass.objects(ObjLayer::ForceLower);
        pass.objects(ObjLayer::Lower);
        let infravision = frame.clock.is_active(Timer::Infravision);
        pass.actors(frame, infravision);
        pass.anims(false);
        pass.objects(ObjLayer::Top);
        pass.lenses();
        if pass.mw.roof_mode() && pass.mw.visibility().roof_display() != nuvie_world::RoofDisplay::Off {
            pass.roofs();
        }
        if frame.clock.is_active(Timer::Storm) {
            pass.rain(&mut self.rng);
        }
        if pass.mw.show_grid() {
            pass.grid();
        }
        pass.cursor();
        if pass.mw.alpha_map().style() != LightingStyle::None {
            pass.mw.alpha_map().apply(pass.surface, Point::ZERO);
        }
        if infravision {
            pass.actors(frame, true);
        }
        pass.overlay(OverlayLevel::Default);
        pass.anims(true);
        if pass.mw.thumbnail_requested() {
            let thumb = pass.surface.downsample(pass.clip, THUMBNAIL_STEP);
            pass.mw.store_thumbnail(thumb);
        }
        if pass.mw.is_wizard_eye_mode() {
            pass.wizard_eye();
        }
        if pass.mw.original_style() {
            pass.border();
        }
        pass.overlay(OverlayLevel::OnTop);

        trace!("map frame drew {} tiles", self.drawn);
        let (w, h) = (mw.win_width() * TILE_SIZE, mw.win_height() * TILE_SIZE);
        if mw.original_style() {
            Range::with_size(8, 8, w - 16, h - 16)
        } else {
            Range::with_size(0, 0, w, h)
        }
    }

    /// Tiles blitted in the last frame.
    pub fn drawn(&self) -> usize {
        self.drawn
    }
}

#[derive(Copy, Clone, PartialEq, Eq)]
enum ObjLayer {
    ForceLower,
    Lower,
    Top,
}

struct Pass<'a> {
    world: &'a World,
    mw: &'a mut MapWindow,
    surface: &'a mut Surface,
    clip: Range,
    offset: Point,
    drawn: &'a mut usize,
}

impl Pass<'_> {
    fn cell_origin(&self, wx: i32, wy: i32) -> Point {
        Point::new(wx * TILE_SIZE - self.offset.x, wy * TILE_SIZE - self.offset.y)
    }

    fn blit(&mut self, data: &[u8; TILE_PIXELS], at: Point, transparent: bool) {
        self.surface.blit_tile(data, at, transparent, self.clip);
        *self.drawn += 1;
    }

    fn blit_cell(&mut self, tile: &Tile, wx: i32, wy: i32) {
        let at = self.cell_origin(wx, wy);
        self.blit(&tile.data, at, tile.is_transparent());
    }

    fn terrain(&mut self) {
        let world = self.world;
        let vis = self.mw.visibility();
        let mut cells = Vec::new();
        for wy in 0..=self.mw.win_height() {
            for wx in 0..=self.mw.win_width() {
                cells.push((wx, wy, vis.tile_at(wx + BORDER, wy + BORDER)));
            }
        }
        for (wx, wy, id) in cells {
            if id == nuvie_world::BLACK {
                let at = self.cell_origin(wx, wy);
                let r = Range::with_size(at.x, at.y, TILE_SIZE, TILE_SIZE).intersect(self.clip);
                self.surface.fill_rect(r, 0);
                continue;
            }
            if let Some(base) = world.tiles.get_anim_base_tile(id) {
                self.blit_cell(base, wx, wy);
            }
            if let Some(t) = world.tiles.get_tile(id) {
                self.blit_cell(t, wx, wy);
            }
        }
    }

    /// Draw a tile and, for double-size tiles, the neighbouring parts to
    /// its left and above. Parts are drawn only if their own top flag
    /// matches `top`.
    fn draw_multi(&mut self, tile: &Tile, data: Option<&[u8; TILE_PIXELS]>, wx: i32, wy: i32, top: bool) {
        let (w, h) = (self.mw.win_width(), self.mw.win_height());
        let world = self.world;
        let mut id = tile.id;
        if wx <= w && wy <= h && tile.is(TileFlags::TOPTILE) == top {
            let at = self.cell_origin(wx, wy);
            let data = data.unwrap_or(&tile.data);
            self.blit(data, at, true);
        }
        let dbl_w = tile.is(TileFlags::DBL_WIDTH);
        let dbl_h = tile.is(TileFlags::DBL_HEIGHT);
        let part = |id: u16, x: i32, y: i32, this: &mut Self| {
            if let Some(t) = world.tiles.get_tile(id) {
                if t.is(TileFlags::TOPTILE) == top {
                    let at = this.cell_origin(x, y);
                    this.blit(&t.data, at, true);
                }
            }
        };
        if dbl_w {
            id = id.wrapping_sub(1);
            if wx > 0 && wy <= h {
                part(id, wx - 1, wy, self);
            }
        }
        if dbl_h {
            id = id.wrapping_sub(1);
            if wy > 0 && wx <= w {
                part(id, wx, wy - 1, self);
            }
        }
        if dbl_w && dbl_h && wx > 0 && wy > 0 {
            id = id.wrapping_sub(1);
            part(id, wx - 1, wy - 1, self);
        }
    }

    fn objects(&mut self, layer: ObjLayer) {
        let world = self.world;
        for wy in (0..=self.mw.win_height()).rev() {
            for wx in (0..=self.mw.win_width()).rev() {
                let at = self.mw.window_to_map(wx, wy);
                for &o in world.objs.objs_at(at) {
                    if world.objs.get(o).is_none_or(|obj| obj.is_invisible()) {
                        continue;
                    }
                    let Some(original) = world.objs.tile_num(o).and_then(|t| world.tiles.get_original_tile(t)) else {
                        continue;
                    };
                    let force_lower = original.is(TileFlags::FORCE_LOWER);
                    let top = match layer {
                        ObjLayer::ForceLower if force_lower => false,
                        ObjLayer::Lower if !force_lower => false,
                        ObjLayer::Top => true,
                        _ => continue,
                    };
                    if !self.mw.visibility().can_display_obj(world, wx + BORDER, wy + BORDER, o) {
                        continue;
                    }
                    if let Some(t) = world.obj_tile(o) {
                        self.draw_multi(t, None, wx, wy, top);
                    }
                }
            }
        }
    }

    /// Draw the actors. Under infravision the objects around each actor
    /// are drawn with it.
    fn actors(&mut self, frame: &Frame<'_>, infravision: bool) {
        let world = self.world;
        let player = world.actors.player_id();
        for actor in world.actors.iter() {
            if !actor.is_on_map() || actor.pos.z != self.mw.level() {
                continue;
            }
            let (x, y) = (i32::from(actor.pos.x), i32::from(actor.pos.y));
            if !self.mw.in_window(x, y, actor.pos.z) {
                continue;
            }
            let Some(b) = self.mw.visibility().to_buffer(x, y, actor.pos.z) else {
                continue;
            };
            if self.mw.visibility().is_black(b.x, b.y) {
                continue;
            }
            let invisible = actor.is(ActorStatus::INVISIBLE);
            if invisible && !(actor.id == player || frame.party.contains(actor.id)) {
                continue;
            }
            let Some(tile) = world.tiles.get_tile(actor.tile()) else {
                continue;
            };
            let (wx, wy) = (b.x - BORDER, b.y - BORDER);
            let remapped = remap_actor(tile, invisible, actor.status);
            self.draw_multi(tile, remapped.as_ref(), wx, wy, false);
            self.draw_multi(tile, remapped.as_ref(), wx, wy, true);
            if remapped.is_none() && infravision {
                for &o in &actor.surrounding_objs {
                    let Some(loc) = world.objs.get(o).and_then(|obj| obj.map_coord()) else {
                        continue;
                    };
                    let Some(t) = world.objs.tile_num(o).and_then(|t| world.tiles.get_original_tile(t)) else {
                        continue;
                    };
                    let Some(ob) = self.mw.visibility().to_buffer(loc.x.into(), loc.y.into(), loc.z) else {
                        continue;
                    };
                    self.draw_multi(t, None, ob.x - BORDER, ob.y - BORDER, false);
                    self.draw_multi(t, None, ob.x - BORDER, ob.y - BORDER, true);
                }
            }
        }
    }

    fn anims(&mut self, top: bool) {
        let world = self.world;
        let anims: Vec<_> = self.mw.anims().iter().filter(|a| a.top == top).copied().collect();
        for anim in anims {
            if let Some(t) = world.tiles.get_tile(anim.tile) {
                let at = Point::new(anim.at.x - self.offset.x, anim.at.y - self.offset.y);
                self.blit(&t.data, at, true);
            }
        }
    }

    fn lenses(&mut self) {
        let world = self.world;
        let lenses = self.mw.lenses().to_vec();
        for (i, lens) in lenses.iter().enumerate() {
            if lens.at.z != self.mw.level() {
                continue;
            }
            let (x, y) = (i32::from(lens.at.x), i32::from(lens.at.y));
            let present = self
                .world
                .objs
                .objs_at(lens.at)
                .iter()
                .any(|&o| self.world.objs.get(o).is_some_and(|obj| obj.obj_n == lens.obj_n));
            if !present || !self.mw.in_window(x, y, lens.at.z) || self.mw.tile_is_black(self.world, x, y, lens.at.z, None) {
                continue;
            }
            self.mw.set_lens_active(i);
            let Some(b) = self.mw.visibility().to_buffer(x, y, lens.at.z) else {
                continue;
            };
            let (wx, wy) = (b.x - BORDER, b.y - BORDER);
            for (tile, dx) in [(lens.left_tile, -1), (lens.right_tile, 1)] {
                if let Some(t) = world.tiles.get_tile(tile) {
                    self.blit_cell(t, wx + dx, wy);
                }
            }
        }
    }

    fn roofs(&mut self) {
        let (cur_x, cur_y) = self.mw.pos();
        if !(1..=ROOF_MAX_Y).contains(&cur_y) {
            return;
        }
        if self.mw.x_ray() != XRayMode::Off {
            return;
        }
        let world = self.world;
        let z = self.mw.level();
        let c = self.mw.center();
        if self.mw.visibility().roof_display() == nuvie_world::RoofDisplay::Normal
            && self.world.map.has_roof(cur_x + c.x, cur_y + c.y, z)
        {
            return;
        }
        // The frame border covers the outer half tile.
        let clip = if self.mw.original_style() {
            let (w, h) = (self.mw.win_width() * TILE_SIZE, self.mw.win_height() * TILE_SIZE);
            Range::with_size(8, 8, w - 16, h - 16).intersect(self.clip)
        } else {
            self.clip
        };
        for wy in 0..=self.mw.win_height() {
            for wx in 0..=self.mw.win_width() {
                let at = self.mw.window_to_map(wx, wy);
                let Some(roof) = self.world.map.get_roof(at.x.into(), at.y.into(), z) else {
                    continue;
                };
                if let Some(data) = world.tiles.get_roof_tile(roof) {
                    let at = self.cell_origin(wx, wy);
                    self.surface.blit_tile(data, at, true, clip);
                    *self.drawn += 1;
                }
            }
        }
    }

    fn rain(&mut self, rng: &mut SmallRng) {
        let (pw, ph) = (self.clip.width(), self.clip.height());
        if pw <= 0 || ph <= 0 {
            return;
        }
        let drops = self.mw.win_width() * self.mw.win_height();
        for _ in 0..drops {
            let x = rng.random_range(0..pw);
            let y = rng.random_range(0..ph);
            self.surface.put_pixel(x, y, RAIN_COLOR);
            self.surface.put_pixel(x + 1, y + 1, RAIN_COLOR);
            self.surface.put_pixel(x + 2, y + 2, 0);
        }
    }

    fn grid(&mut self) {
        let (pw, ph) = (self.clip.width(), self.clip.height());
        for i in 0..=self.mw.win_width() {
            let x = i * TILE_SIZE - self.offset.x;
            self.surface.fill_rect(Range::with_size(x, 0, 1, ph).intersect(self.clip), GRID_COLOR);
        }
        for j in 0..=self.mw.win_height() {
            let y = j * TILE_SIZE - self.offset.y;
            self.surface.fill_rect(Range::with_size(0, y, pw, 1).intersect(self.clip), GRID_COLOR);
        }
    }

    fn cursor(&mut self) {
        let state = self.mw.cursor_state();
        if !state.visible {
            return;
        }
        let world = self.world;
        let tile = match state.kind {
            CursorKind::Normal => world.tiles.get_cursor_tile(),
            CursorKind::Use => world.tiles.get_use_tile(),
        };
        if let Some(t) = tile {
            let at = Point::new(state.x * TILE_SIZE, state.y * TILE_SIZE);
            self.blit(&t.data, at, true);
        }
    }

    fn overlay(&mut self, level: OverlayLevel) {
        if let Some((s, l)) = self.mw.overlay() {
            if l == level {
                self.surface.blit_surface(s, Point::ZERO);
            }
        }
    }

    fn wizard_eye(&mut self) {
        let world = self.world;
        let c = self.mw.center();
        if let Some(t) = world.tiles.get_tile(self.mw.wizard_eye_tile()) {
            let at = Point::new(c.x * TILE_SIZE, c.y * TILE_SIZE);
            self.blit(&t.data, at, true);
        }
    }

    fn border(&mut self) {
        let (w, h) = (self.mw.win_width(), self.mw.win_height());
        let world = self.world;
        let put = |id: u16, x: i32, y: i32, this: &mut Self| {
            if let Some(t) = world.tiles.get_tile(id) {
                this.blit(&t.data, Point::new(x * TILE_SIZE, y * TILE_SIZE), true);
            }
        };
        put(BORDER_UL, 0, 0, self);
        put(BORDER_UR, w - 1, 0, self);
        put(BORDER_LL, 0, h - 1, self);
        put(BORDER_LR, w - 1, h - 1, self);
        for i in 1..w - 1 {
            put(BORDER_TOP, i, 0, self);
            put(BORDER_BOTTOM, i, h - 1, self);
        }
        for j in 1..h - 1 {
            put(BORDER_LEFT, 0, j, self);
            put(BORDER_RIGHT, w - 1, j, self);
        }
    }
}

/// Recolour an actor tile for its status: invisible actors become a
/// silhouette, protected and cursed actors get a coloured outline.
fn remap_actor(tile: &Tile, invisible: bool, status: ActorStatus) -> Option<[u8; TILE_PIXELS]> {
    let mut data = tile.data;
    if invisible {
        for p in &mut data {
            *p = if *p != 0 { 0xFF } else { 0x0B };
        }
    } else if status.contains(ActorStatus::PROTECTED) {
        data.iter_mut().filter(|p| **p == 0).for_each(|p| *p = 0x0C);
    } else if status.contains(ActorStatus::CURSED) {
        data.iter_mut().filter(|p| **p == 0).for_each(|p| *p = 0x09);
    } else {
        return None;
    }
    Some(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use nuvie_core::MapCoord;
    use nuvie_world::{ActorId, Obj, ObjType, WallMask};

    const GRASS: u16 = 1;
    const ROCK: u16 = 2;
    const AVATAR_TILE: u16 = 100;
    const TABLE_TILE: u16 = 60;

    fn setup() -> (World, ActorId, MapWindow) {
        let mut w = World::new();
        w.tiles.insert(Tile::new(GRASS, "grass", 2).with_flags(TileFlags::PASSABLE));
        w.tiles.insert(
            Tile::new(ROCK, "rock", 8)
                .with_flags(TileFlags::BOUNDARY | TileFlags::MISSILE_BOUNDARY | TileFlags::WALL)
                .with_walls(WallMask::ALL),
        );
        let mut avatar = Tile::new(AVATAR_TILE, "avatar", 0);
        avatar.data[0] = 30;
        w.tiles.insert(avatar);
        w.tiles.insert(Tile::new(TABLE_TILE, "table", 6));
        w.map.add_level(64, 64, GRASS);
        w.objs.register_type(1, ObjType::new("table", TABLE_TILE, 30));
        let me = w.actors.add("Avatar", MapCoord::new(20, 20, 0), AVATAR_TILE);
        w.actors.set_player(me);
        let config = Config {
            lighting: LightingStyle::None,
            ..Config::default()
        };
        let mut mw = MapWindow::new(&config);
        mw.center_map_on_actor(&w, me);
        (w, me, mw)
    }

    fn draw(w: &World, mw: &mut MapWindow, clock: &GameClock) -> (Surface, Range) {
        let party = Party::default();
        let mut s = Surface::new(11 * 16, 11 * 16);
        let frame = Frame { world: w, clock, party: &party };
        let r = Renderer::new(7).draw(&frame, mw, &mut s);
        (s, r)
    }

    #[test]
    fn test_terrain_and_actor() {
        let (w, _, mut mw) = setup();
        let (s, r) = draw(&w, &mut mw, &GameClock::new(12, 0));
        assert_eq!(r, Range::with_size(0, 0, 176, 176));
        assert_eq!(s.pixel(3, 3), Some(2), "grass");
        assert_eq!(s.pixel(5 * 16, 5 * 16), Some(30), "avatar pixel");
        assert_eq!(s.pixel(5 * 16 + 1, 5 * 16), Some(0), "avatar outline");
        assert_eq!(s.pixel(6 * 16, 5 * 16), Some(2), "grass beside");
    }

    #[test]
    fn test_hidden_cells_are_black() {
        let (mut w, _, mut mw) = setup();
        for y in 10..30 {
            w.map.set_tile(22, y, 0, ROCK);
        }
        mw.update_blacking(&w);
        let (s, _) = draw(&w, &mut mw, &GameClock::new(12, 0));
        assert_eq!(s.pixel(7 * 16 + 2, 5 * 16 + 2), Some(8), "the wall itself shows");
        assert_eq!(s.pixel(9 * 16 + 2, 5 * 16 + 2), Some(0), "behind the wall");
    }

    #[test]
    fn test_objects_hidden_in_darkness() {
        let (mut w, _, mut mw) = setup();
        for y in 10..30 {
            w.map.set_tile(22, y, 0, ROCK);
        }
        w.objs.add_to_map(Obj::new(1, 0), MapCoord::new(19, 20, 0));
        w.objs.add_to_map(Obj::new(1, 0), MapCoord::new(24, 20, 0));
        mw.update_blacking(&w);
        let (s, _) = draw(&w, &mut mw, &GameClock::new(12, 0));
        assert_eq!(s.pixel(4 * 16 + 2, 5 * 16 + 2), Some(6), "visible table");
        assert_eq!(s.pixel(9 * 16 + 2, 5 * 16 + 2), Some(0), "hidden table");
    }

    #[test]
    fn test_invisible_player_is_silhouette() {
        let (mut w, me, mut mw) = setup();
        if let Some(a) = w.actors.get_mut(me) {
            a.status = ActorStatus::INVISIBLE;
        }
        let (s, _) = draw(&w, &mut mw, &GameClock::new(12, 0));
        assert_eq!(s.pixel(5 * 16, 5 * 16), Some(2), "opaque pixels vanish");
        assert_eq!(s.pixel(5 * 16 + 1, 5 * 16), Some(0x0B), "background becomes outline");
    }

    #[test]
    fn test_remap_protected_and_cursed() {
        let mut t = Tile::new(5, "x", 0);
        t.data[1] = 7;
        let p = remap_actor(&t, false, ActorStatus::PROTECTED).unwrap();
        assert_eq!((p[0], p[1]), (0x0C, 7));
        let c = remap_actor(&t, false, ActorStatus::CURSED).unwrap();
        assert_eq!(c[0], 0x09);
        assert!(remap_actor(&t, false, ActorStatus::NONE).is_none());
    }

    #[test]
    fn test_rain_only_in_storms() {
        let (w, _, mut mw) = setup();
        let count = |s: &Surface| s.as_slice().iter().filter(|&&p| p == RAIN_COLOR).count();
        let (dry, _) = draw(&w, &mut mw, &GameClock::new(12, 0));
        assert_eq!(count(&dry), 0);
        let mut clock = GameClock::new(12, 0);
        clock.set_timer(Timer::Storm, 10);
        let (wet, _) = draw(&w, &mut mw, &clock);
        assert!(count(&wet) > 0, "rain drawn");
    }

    #[test]
    fn test_original_style_dirty_rect() {
        let (w, _, mut mw) = setup();
        let config = Config {
            original_style: true,
            lighting: LightingStyle::None,
            ..Config::default()
        };
        mw.apply_config(&w, &config);
        let (_, r) = draw(&w, &mut mw, &GameClock::new(12, 0));
        assert_eq!(r, Range::with_size(8, 8, 160, 160));
    }

    const ROOF_COLOR: u8 = 44;

    /// Roof every cell of level 0 except `open`.
    fn add_roofs(w: &mut World, open: Option<(i32, i32)>) {
        let roof = w.tiles.add_roof_tile([ROOF_COLOR; TILE_PIXELS]);
        for y in 0..64 {
            for x in 0..64 {
                if Some((x, y)) != open {
                    w.map.set_roof(x, y, 0, Some(roof));
                }
            }
        }
    }

    #[test]
    fn test_roofs_drawn_in_roof_mode() {
        let (mut w, _, mut mw) = setup();
        add_roofs(&mut w, Some((20, 20)));
        let (s, _) = draw(&w, &mut mw, &GameClock::new(12, 0));
        assert_eq!(s.pixel(3 * 16 + 2, 3 * 16 + 2), Some(2), "roof mode off");
        mw.set_roof_mode(true);
        let (s, _) = draw(&w, &mut mw, &GameClock::new(12, 0));
        assert_eq!(s.pixel(3 * 16 + 2, 3 * 16 + 2), Some(ROOF_COLOR), "roof over grass");
        assert_eq!(s.pixel(5 * 16 + 2, 5 * 16 + 2), Some(2), "no roof over the player");
    }

    #[test]
    fn test_roofs_hidden_when_player_is_under_one() {
        let (mut w, _, mut mw) = setup();
        add_roofs(&mut w, None);
        mw.set_roof_mode(true);
        let (s, _) = draw(&w, &mut mw, &GameClock::new(12, 0));
        assert_eq!(s.pixel(3 * 16 + 2, 3 * 16 + 2), Some(2), "roofs lifted");
    }

    #[test]
    fn test_roofs_hidden_by_x_ray() {
        let (mut w, _, mut mw) = setup();
        add_roofs(&mut w, Some((20, 20)));
        mw.set_roof_mode(true);
        mw.set_x_ray_view(&w, XRayMode::On, false);
        let (s, _) = draw(&w, &mut mw, &GameClock::new(12, 0));
        assert_eq!(s.pixel(3 * 16 + 2, 3 * 16 + 2), Some(2), "x-ray sees through roofs");
    }

    #[test]
    fn test_original_style_roofs_stay_inside_border() {
        let (mut w, _, mut mw) = setup();
        add_roofs(&mut w, Some((20, 20)));
        let config = Config {
            original_style: true,
            roof_mode: true,
            lighting: LightingStyle::None,
            ..Config::default()
        };
        mw.apply_config(&w, &config);
        let (s, _) = draw(&w, &mut mw, &GameClock::new(12, 0));
        assert_eq!(s.pixel(2, 2), Some(2), "border strip keeps the terrain");
        assert_eq!(s.pixel(8, 8), Some(ROOF_COLOR), "roof starts inside the border");
        assert_eq!(s.pixel(3 * 16 + 2, 3 * 16 + 2), Some(ROOF_COLOR));
    }

    #[test]
    fn test_infravision_draws_surrounding_objs_in_both_passes() {
        let tiles_drawn = |surrounding: bool| -> usize {
            let (mut w, me, mut mw) = setup();
            let table = w.objs.add_to_map(Obj::new(1, 0), MapCoord::new(21, 20, 0));
            if surrounding {
                if let Some(a) = w.actors.get_mut(me) {
                    a.surrounding_objs.push(table);
                }
            }
            let mut clock = GameClock::new(12, 0);
            clock.set_timer(Timer::Infravision, 10);
            let party = Party::default();
            let mut s = Surface::new(11 * 16, 11 * 16);
            let mut r = Renderer::new(7);
            r.draw(&Frame { world: &w, clock: &clock, party: &party }, &mut mw, &mut s);
            r.drawn()
        };
        assert_eq!(tiles_drawn(true) - tiles_drawn(false), 2, "drawn with the actor and again after lighting");
    }

    #[test]
    fn test_thumbnail_is_quarter_size() {
        let (w, _, mut mw) = setup();
        mw.request_thumbnail();
        draw(&w, &mut mw, &GameClock::new(12, 0));
        let thumb = mw.take_thumbnail().unwrap();
        assert_eq!((thumb.width(), thumb.height()), (44, 44));
    }
}
