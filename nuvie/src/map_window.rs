//! The map window: which part of the world is shown, the cursor, and the
//! reach and line-of-sight rules the action code asks about.

use log::debug;
use nuvie_core::{MapCoord, Point, Surface, TILE_SIZE, wrap};
use nuvie_world::{
    ActorId, AlphaMap, AmbientInput, LightingStyle, LineTestFlags, ObjId, TileFlags, ViewParams,
    VisibilityBuffer, World, accumulate_lights, ambient_level,
};

use crate::clock::GameClock;
use crate::config::{Config, InterfaceType, XRayMode};
use crate::error::ActionError;

/// Drop and move targets further than this from the actor are out of range.
const MAX_DROP_DISTANCE: u16 = 5;

/// Which cursor sprite is shown.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CursorKind {
    Normal,
    Use,
}

/// Cursor state handed to the renderer.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct CursorState {
    pub visible: bool,
    /// Window tile coordinates.
    pub x: i32,
    pub y: i32,
    pub kind: CursorKind,
}

/// Where an overlay surface is drawn relative to the lighting.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum OverlayLevel {
    /// Above the lighting, below foreground animations.
    Default,
    /// Above everything.
    OnTop,
}

/// A sprite played over the map, e.g. a projectile in flight.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct MapAnim {
    pub tile: u16,
    /// Pixel position relative to the window's top-left corner.
    pub at: Point,
    /// Drawn above the lighting.
    pub top: bool,
}

/// An object whose presence on screen makes two animated tiles appear
/// beside it.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Lens {
    pub obj_n: u16,
    pub at: MapCoord,
    pub left_tile: u16,
    pub right_tile: u16,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
struct WizardEye {
    moves_left: u16,
    prev_x: i32,
    prev_y: i32,
    prev_xray: XRayMode,
}

pub struct MapWindow {
    cur_x: i32,
    cur_y: i32,
    cur_x_add: i32,
    cur_y_add: i32,
    level: u8,
    map_width: i32,
    map_height: i32,
    win_width: i32,
    win_height: i32,
    center_xoff: i32,
    cursor: Point,
    show_cursor: bool,
    show_use_cursor: bool,
    enable_blacking: bool,
    x_ray: XRayMode,
    freeze_blacking: bool,
    roof_mode: bool,
    show_grid: bool,
    original_style: bool,
    interface: InterfaceType,
    map_tile_lighting: bool,
    vis: VisibilityBuffer,
    alpha: AlphaMap,
    lighting_update_required: bool,
    wizard_eye: Option<WizardEye>,
    eye_tile: u16,
    overlay: Option<(Surface, OverlayLevel)>,
    anims: Vec<MapAnim>,
    lenses: Vec<Lens>,
    lens_active: Vec<bool>,
    thumbnail_requested: bool,
    thumbnail: Option<Surface>,
}

impl MapWindow {
    pub fn new(config: &Config) -> Self {
        let (w, h) = (config.win_width.max(1), config.win_height.max(1));
        Self {
            cur_x: 0,
            cur_y: 0,
            cur_x_add: 0,
            cur_y_add: 0,
            level: 0,
            map_width: 0,
            map_height: 0,
            win_width: w,
            win_height: h,
            center_xoff: config.center_xoff,
            cursor: Point::ZERO,
            show_cursor: false,
            show_use_cursor: false,
            enable_blacking: config.enable_blacking,
            x_ray: config.x_ray,
            freeze_blacking: false,
            roof_mode: config.roof_mode,
            show_grid: config.show_grid,
            original_style: config.original_style,
            interface: config.interface,
            map_tile_lighting: config.map_tile_lighting,
            vis: VisibilityBuffer::new(w, h),
            alpha: AlphaMap::new(w, h, config.lighting),
            lighting_update_required: true,
            wizard_eye: None,
            eye_tile: 0,
            overlay: None,
            anims: Vec::new(),
            lenses: Vec::new(),
            lens_active: Vec::new(),
            thumbnail_requested: false,
            thumbnail: None,
        }
    }

    /// Take over changed settings and regenerate.
    pub fn apply_config(&mut self, world: &World, config: &Config) {
        self.center_xoff = config.center_xoff;
        self.enable_blacking = config.enable_blacking;
        self.x_ray = config.x_ray;
        self.roof_mode = config.roof_mode;
        self.show_grid = config.show_grid;
        self.original_style = config.original_style;
        self.interface = config.interface;
        self.map_tile_lighting = config.map_tile_lighting;
        if self.alpha.style() != config.lighting {
            self.alpha = AlphaMap::new(self.win_width, self.win_height, config.lighting);
        }
        self.set_window_size(world, config.win_width, config.win_height);
    }

    pub fn set_window_size(&mut self, world: &World, width: i32, height: i32) {
        let (w, h) = (width.max(1), height.max(1));
        if (w, h) != (self.win_width, self.win_height) {
            self.win_width = w;
            self.win_height = h;
            self.vis = VisibilityBuffer::new(w, h);
            self.alpha = AlphaMap::new(w, h, self.alpha.style());
            self.cursor = Point::new(self.cursor.x.min(w - 1), self.cursor.y.min(h - 1));
        }
        self.update_blacking(world);
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn win_width(&self) -> i32 {
        self.win_width
    }

    pub fn win_height(&self) -> i32 {
        self.win_height
    }

    /// Map coordinates of the top-left cell.
    pub fn pos(&self) -> (i32, i32) {
        (self.cur_x, self.cur_y)
    }

    /// Sub-tile pixel scroll offset.
    pub fn pixel_offset(&self) -> (i32, i32) {
        (self.cur_x_add, self.cur_y_add)
    }

    pub fn level(&self) -> u8 {
        self.level
    }

    pub fn visibility(&self) -> &VisibilityBuffer {
        &self.vis
    }

    pub fn alpha_map(&self) -> &AlphaMap {
        &self.alpha
    }

    pub fn interface(&self) -> InterfaceType {
        self.interface
    }

    pub fn x_ray(&self) -> XRayMode {
        self.x_ray
    }

    pub fn roof_mode(&self) -> bool {
        self.roof_mode
    }

    pub fn show_grid(&self) -> bool {
        self.show_grid
    }

    pub fn original_style(&self) -> bool {
        self.original_style
    }

    pub fn center_xoff(&self) -> i32 {
        self.center_xoff
    }

    /// Window cell the view is centred on.
    pub fn center(&self) -> Point {
        Point::new((self.win_width - 1 - self.center_xoff) / 2, (self.win_height - 1) / 2)
    }

    pub fn in_dungeon_level(&self) -> bool {
        self.level != 0
    }

    // -----------------------------------------------------------------------
    // View movement
    // -----------------------------------------------------------------------

    /// Show the window with its top-left cell at (x, y) on level `z`.
    pub fn move_map(&mut self, world: &World, x: i32, y: i32, z: u8, x_add: i32, y_add: i32) {
        self.map_width = i32::from(world.map.width(z));
        self.map_height = i32::from(world.map.height(z));
        self.cur_x = wrap(x, self.map_width);
        self.cur_y = y;
        self.level = z;
        self.cur_x_add = x_add;
        self.cur_y_add = y_add;
        self.update_blacking(world);
    }

    pub fn move_level(&mut self, world: &World, z: u8) {
        self.move_map(world, self.cur_x, self.cur_y, z, 0, 0);
    }

    pub fn move_map_relative(&mut self, world: &World, dx: i32, dy: i32) {
        self.move_map(world, self.cur_x + dx, self.cur_y + dy, self.level, 0, 0);
    }

    /// Scroll the view by a number of pixels.
    pub fn shift_map_relative(&mut self, world: &World, px: i32, py: i32) {
        let total_x = self.cur_x * TILE_SIZE + self.cur_x_add + px;
        let total_y = self.cur_y * TILE_SIZE + self.cur_y_add + py;
        self.move_map(
            world,
            total_x.div_euclid(TILE_SIZE),
            total_y.div_euclid(TILE_SIZE),
            self.level,
            total_x.rem_euclid(TILE_SIZE),
            total_y.rem_euclid(TILE_SIZE),
        );
    }

    pub fn center_map(&mut self, world: &World, at: MapCoord) {
        let c = self.center();
        self.move_map(world, i32::from(at.x) - c.x, i32::from(at.y) - c.y, at.z, 0, 0);
    }

    pub fn center_map_on_actor(&mut self, world: &World, actor: ActorId) {
        if let Some(pos) = world.actors.get(actor).map(|a| a.pos) {
            self.center_map(world, pos);
        }
    }

    // -----------------------------------------------------------------------
    // Cursor
    // -----------------------------------------------------------------------

    pub fn center_cursor(&mut self) {
        self.cursor = self.center();
    }

    /// Place the cursor on a window cell. Ignored outside the window.
    pub fn move_cursor(&mut self, x: i32, y: i32) {
        if x < 0 || y < 0 || x >= self.win_width || y >= self.win_height {
            return;
        }
        self.cursor = Point::new(x, y);
    }

    pub fn move_cursor_relative(&mut self, dx: i32, dy: i32) {
        self.move_cursor(self.cursor.x + dx, self.cursor.y + dy);
    }

    pub fn cursor(&self) -> Point {
        self.cursor
    }

    /// Map position under the cursor.
    pub fn cursor_coord(&self) -> MapCoord {
        self.window_to_map(self.cursor.x, self.cursor.y)
    }

    /// Map position of a window cell.
    pub fn window_to_map(&self, wx: i32, wy: i32) -> MapCoord {
        MapCoord::new(
            wrap(self.cur_x + wx, self.map_width) as u16,
            wrap(self.cur_y + wy, self.map_height) as u16,
            self.level,
        )
    }

    /// Window cell showing a map position, if it is inside the window.
    pub fn map_to_window(&self, at: MapCoord) -> Option<Point> {
        let (x, y) = (i32::from(at.x), i32::from(at.y));
        if !self.in_window(x, y, at.z) {
            return None;
        }
        Some(Point::new(wrap(x - self.cur_x, self.map_width), y - self.cur_y))
    }

    /// Window cell under a pixel position relative to the window.
    pub fn pixel_to_window(&self, px: i32, py: i32) -> Point {
        Point::new(
            (px + self.cur_x_add).div_euclid(TILE_SIZE),
            (py + self.cur_y_add).div_euclid(TILE_SIZE),
        )
    }

    pub fn set_show_cursor(&mut self, show: bool) {
        self.show_cursor = show;
    }

    pub fn set_show_use_cursor(&mut self, show: bool) {
        self.show_use_cursor = show;
    }

    pub fn cursor_state(&self) -> CursorState {
        CursorState {
            visible: self.show_cursor || self.show_use_cursor,
            x: self.cursor.x,
            y: self.cursor.y,
            kind: if self.show_use_cursor { CursorKind::Use } else { CursorKind::Normal },
        }
    }

    /// Unit step from the centre of the window towards a pixel position.
    /// (0, 0) when the position is on the centre cell.
    pub fn get_movement_direction(&self, px: i32, py: i32) -> (i32, i32) {
        let p = self.pixel_to_window(px, py);
        let c = self.center();
        ((p.x - c.x).signum(), (p.y - c.y).signum())
    }

    // -----------------------------------------------------------------------
    // Visibility
    // -----------------------------------------------------------------------

    /// Recompute the visibility buffer for the current view.
    pub fn update_blacking(&mut self, world: &World) {
        let view = ViewParams {
            cur_x: self.cur_x,
            cur_y: self.cur_y,
            level: self.level,
            win_width: self.win_width,
            win_height: self.win_height,
            center_xoff: self.center_xoff,
            blacking: self.enable_blacking,
            xray: self.x_ray != XRayMode::Off,
            freeze_seed: self.freeze_blacking,
            roof_mode: self.roof_mode,
            player: world.player_pos(),
        };
        self.vis.regenerate(world, &view);
        self.lighting_update_required = true;
        self.lens_active.clear();
    }

    pub fn set_enable_blacking(&mut self, world: &World, enable: bool) {
        self.enable_blacking = enable;
        self.update_blacking(world);
    }

    pub fn set_freeze_blacking_location(&mut self, freeze: bool) {
        self.freeze_blacking = freeze;
    }

    /// Change x-ray sight. Turning it off keeps the cheat on unless
    /// `cheat_off` is set.
    pub fn set_x_ray_view(&mut self, world: &World, mode: XRayMode, cheat_off: bool) {
        if self.x_ray == XRayMode::Cheat && mode == XRayMode::Off && !cheat_off {
            return;
        }
        self.x_ray = mode;
        self.update_blacking(world);
    }

    pub fn set_roof_mode(&mut self, roofs: bool) {
        self.roof_mode = roofs;
    }

    /// Whether a position is inside the window, ignoring darkness.
    pub fn in_window(&self, x: i32, y: i32, z: u8) -> bool {
        z == self.level
            && wrap(x - self.cur_x, self.map_width) < self.win_width
            && y >= self.cur_y
            && y < self.cur_y + self.win_height
    }

    /// Whether a position is inside the window and can be seen.
    pub fn is_on_screen(&self, world: &World, x: i32, y: i32, z: u8) -> bool {
        self.in_window(x, y, z) && !self.tile_is_black(world, x, y, z, None)
    }

    pub fn tile_is_black(&self, world: &World, x: i32, y: i32, z: u8, obj: Option<ObjId>) -> bool {
        self.vis.tile_is_black(world, x, y, z, obj)
    }

    /// Whether the window cell (wx, wy) is dark.
    pub fn window_cell_is_black(&self, wx: i32, wy: i32) -> bool {
        self.vis.is_black(wx + nuvie_world::BORDER, wy + nuvie_world::BORDER)
    }

    /// What the viewer sees at window cell (wx, wy).
    pub fn look(&self, world: &World, wx: i32, wy: i32) -> String {
        if self.window_cell_is_black(wx, wy) {
            return String::from("darkness.");
        }
        let at = self.window_to_map(wx, wy);
        if let Some(actor) = world.actors.actor_at(at).and_then(|a| world.actors.get(a)) {
            return actor.name.clone();
        }
        look_map(world, at)
    }

    pub fn get_obj_at_coord(&self, world: &World, at: MapCoord, top: bool) -> Option<ObjId> {
        if self.tile_is_black(world, i32::from(at.x), i32::from(at.y), at.z, None) {
            return None;
        }
        world.get_obj(i32::from(at.x), i32::from(at.y), at.z, top, None)
    }

    pub fn get_obj_at_cursor(&self, world: &World) -> Option<ObjId> {
        self.get_obj_at_coord(world, self.cursor_coord(), true)
    }

    pub fn get_actor_at_cursor(&self, world: &World) -> Option<ActorId> {
        if self.window_cell_is_black(self.cursor.x, self.cursor.y) {
            return None;
        }
        world.actors.actor_at(self.cursor_coord())
    }

    /// Whether wall tiles with direction bits are near the player.
    pub fn in_town(&self, world: &World) -> bool {
        let Some(player) = world.player_pos() else {
            return false;
        };
        (0..self.win_height).any(|wy| {
            (0..self.win_width).any(|wx| {
                let at = self.window_to_map(wx, wy);
                !self.window_cell_is_black(wx, wy)
                    && at.distance(player) <= 5
                    && world
                        .tile_at(i32::from(at.x), i32::from(at.y), at.z)
                        .is_some_and(|t| t.is(TileFlags::WALL) && t.walls.bits() != 0)
            })
        })
    }

    // -----------------------------------------------------------------------
    // Reach rules
    // -----------------------------------------------------------------------

    /// Whether `obj` may be dropped or pushed onto (x, y) by `actor`.
    pub fn can_drop_or_move_obj(
        &self,
        world: &World,
        x: i32,
        y: i32,
        actor: ActorId,
        obj: ObjId,
    ) -> Result<(), ActionError> {
        let o = world.objs.get(obj).ok_or(ActionError::NotPossible)?;
        let actor_loc = world.actors.get(actor).ok_or(ActionError::NotPossible)?.pos;
        let z = actor_loc.z;
        let target = world.map.wrap_coord(x, y, z);
        let holder = world.objs.holder_actor(obj);
        let in_inventory = holder.is_some();
        if !in_inventory && o.map_coord().is_some_and(|c| c.x == target.x && c.y == target.y) {
            return Err(ActionError::NotPossible);
        }

        if self.tile_is_black(world, x, y, z, Some(obj)) {
            return Err(if self.tile_is_black(world, x, y, z, None) {
                ActionError::NotPossible
            } else {
                ActionError::Blocked
            });
        }

        if world.actors.actor_at(target).is_some() {
            return Err(if in_inventory { ActionError::NotPossible } else { ActionError::Blocked });
        }

        let dest_obj = world.get_obj(x, y, z, true, None);

        if let Some(holder_pos) = holder.and_then(|a| world.actors.get(a)).map(|a| a.pos) {
            let on_screen = self.is_on_screen(world, holder_pos.x.into(), holder_pos.y.into(), holder_pos.z);
            if !on_screen && holder_pos.distance(target) > MAX_DROP_DISTANCE {
                return Err(ActionError::OutOfRange);
            }
        }

        if self.interface == InterfaceType::IgnoreBlock && can_put_obj(world, x, y, z) {
            return Ok(());
        }

        if actor_loc.distance(target) > MAX_DROP_DISTANCE && self.interface == InterfaceType::Normal {
            return Err(ActionError::OutOfRange);
        }

        let flags = LineTestFlags::HIT_MISSILE_BOUNDARY;
        let obj_loc = world.objs.root_map_coord(obj).unwrap_or(actor_loc);
        let mut hit = world.line_test(actor_loc, x, y, flags, 0, Some(obj));
        let mut blocked = false;
        if let Some(first) = hit {
            if in_inventory || obj_loc.distance(target) != 1 || first.hit.distance(target) != 1 {
                blocked = true;
            } else {
                // pushing one step away from the actor
                hit = world.line_test(obj_loc, x, y, flags, 0, Some(obj));
                blocked = hit.is_some();
            }
        }

        let container = if blocked {
            hit.and_then(|h| h.hit_obj)
                .filter(|&h| world.objs.get(h).and_then(|o| o.map_coord()) == Some(target))
        } else {
            dest_obj
        };
        if container.is_some_and(|c| world.objs.can_store_obj(c, obj)) {
            return Ok(());
        }
        if blocked {
            return Err(ActionError::Blocked);
        }

        let tile = match dest_obj {
            Some(d) => world.obj_tile(d),
            None => world.tile_at(x, y, z),
        }
        .ok_or(ActionError::NoTile)?;

        let water = world.tile_at(x, y, z).is_some_and(|t| t.is(TileFlags::WATER));
        if !water
            && (tile.is(TileFlags::CAN_PLACE_ONTOP)
                || (tile.is(TileFlags::PASSABLE) && !world.is_boundary(x, y, z)))
        {
            return Ok(());
        }
        Err(ActionError::NotPossible)
    }

    /// Whether `actor` can reach `obj` to pick it up.
    pub fn can_get_obj(&self, world: &World, actor: ActorId, obj: ObjId) -> bool {
        if world.objs.get(obj).is_none() {
            return false;
        }
        if self.interface == InterfaceType::IgnoreBlock {
            return true;
        }
        if world.objs.holder_actor(obj).is_some() {
            return false;
        }
        let Some(loc) = world.objs.root_map_coord(obj) else {
            return false;
        };
        let Some(actor_pos) = world.actors.get(actor).map(|a| a.pos) else {
            return false;
        };
        if actor_pos.z != loc.z {
            return false;
        }
        let root = outermost(world, obj);
        let hit = world.line_test(
            actor_pos,
            loc.x.into(),
            loc.y.into(),
            LineTestFlags::HIT_UNPASSABLE,
            0,
            Some(root),
        );
        if hit.is_some() {
            return false;
        }
        if world.objs.is_secret_door(obj) {
            return true;
        }
        !self.blocked_by_wall(world, actor, root)
    }

    /// Whether `obj` sits in a wall cell on the far side from `actor`.
    pub fn blocked_by_wall(&self, world: &World, actor: ActorId, obj: ObjId) -> bool {
        let (Some(loc), Some(a)) = (
            world.objs.root_map_coord(obj),
            world.actors.get(actor).map(|a| a.pos),
        ) else {
            return false;
        };
        let Some(tile) = world.tile_at(loc.x.into(), loc.y.into(), loc.z) else {
            return false;
        };
        if !tile.is(TileFlags::WALL) || world.objs.is_door(obj) {
            return false;
        }
        match tile.walls.bits() {
            0xD0 => a.y < loc.y,
            0xB0 => a.x < loc.x,
            0xF0 => a.y < loc.y || a.x < loc.x,
            _ => false,
        }
    }

    // -----------------------------------------------------------------------
    // Wizard eye
    // -----------------------------------------------------------------------

    pub fn set_wizard_eye_tile(&mut self, tile: u16) {
        self.eye_tile = tile;
    }

    pub fn wizard_eye_tile(&self) -> u16 {
        self.eye_tile
    }

    /// Look around `location` with x-ray sight for `duration` moves.
    pub fn wizard_eye_start(&mut self, world: &World, location: MapCoord, duration: u16) {
        self.wizard_eye = Some(WizardEye {
            moves_left: duration,
            prev_x: self.cur_x,
            prev_y: self.cur_y,
            prev_xray: self.x_ray,
        });
        self.freeze_blacking = true;
        self.x_ray = XRayMode::On;
        let x = i32::from(location.x) - self.win_width / 2;
        let y = i32::from(location.y) - self.win_height / 2;
        debug!("wizard eye at {location} for {duration} moves");
        self.move_map(world, x, y, self.level, 0, 0);
    }

    /// Count one move down; the eye closes when none are left.
    pub fn wizard_eye_update(&mut self, world: &World) {
        let Some(eye) = self.wizard_eye.as_mut() else {
            return;
        };
        eye.moves_left = eye.moves_left.saturating_sub(1);
        if eye.moves_left == 0 {
            let eye = *eye;
            self.wizard_eye = None;
            self.freeze_blacking = false;
            self.x_ray = eye.prev_xray;
            self.move_map(world, eye.prev_x, eye.prev_y, self.level, 0, 0);
        }
    }

    pub fn wizard_eye_stop(&mut self, world: &World) {
        if let Some(eye) = self.wizard_eye.as_mut() {
            eye.moves_left = 1;
            self.wizard_eye_update(world);
        }
    }

    pub fn is_wizard_eye_mode(&self) -> bool {
        self.wizard_eye.is_some()
    }

    // -----------------------------------------------------------------------
    // Lighting, overlays and animations
    // -----------------------------------------------------------------------

    /// Recompute the alpha map if the view or the time changed.
    pub fn update_lighting(&mut self, world: &World, clock: &GameClock, min_brightness: u8, party_light: bool) {
        if self.alpha.style() == LightingStyle::None {
            self.lighting_update_required = false;
            return;
        }
        let input = AmbientInput {
            hour: clock.hour(),
            minute: clock.minute(),
            dungeon: self.in_dungeon_level(),
            eclipse: clock.eclipse(),
            xray: self.x_ray != XRayMode::Off,
            style: self.alpha.style(),
            min_brightness,
            party_light,
        };
        let ambient = ambient_level(&input);
        let center = world
            .player_pos()
            .and_then(|p| self.vis.to_buffer(p.x.into(), p.y.into(), p.z))
            .map_or(self.center(), |b| {
                Point::new(b.x - nuvie_world::BORDER, b.y - nuvie_world::BORDER)
            });
        self.alpha.clear(&ambient, center);
        accumulate_lights(world, &self.vis, &mut self.alpha, self.map_tile_lighting);
        self.lighting_update_required = false;
    }

    /// Ask for the lighting to be recomputed on the next frame.
    pub fn update_ambience(&mut self) {
        self.lighting_update_required = true;
    }

    pub fn lighting_update_required(&self) -> bool {
        self.lighting_update_required
    }

    pub fn set_overlay(&mut self, overlay: Option<(Surface, OverlayLevel)>) {
        self.overlay = overlay;
    }

    pub fn overlay(&self) -> Option<(&Surface, OverlayLevel)> {
        self.overlay.as_ref().map(|(s, l)| (s, *l))
    }

    pub fn add_anim(&mut self, anim: MapAnim) {
        self.anims.push(anim);
    }

    pub fn clear_anims(&mut self) {
        self.anims.clear();
    }

    pub fn anims(&self) -> &[MapAnim] {
        &self.anims
    }

    pub fn add_lens(&mut self, lens: Lens) {
        self.lenses.push(lens);
    }

    pub fn lenses(&self) -> &[Lens] {
        &self.lenses
    }

    pub(crate) fn set_lens_active(&mut self, index: usize) {
        if self.lens_active.len() < self.lenses.len() {
            self.lens_active.resize(self.lenses.len(), false);
        }
        if let Some(a) = self.lens_active.get_mut(index) {
            *a = true;
        }
    }

    pub fn lens_active(&self, index: usize) -> bool {
        self.lens_active.get(index).copied().unwrap_or(false)
    }

    /// Capture a thumbnail of the next frame.
    pub fn request_thumbnail(&mut self) {
        self.thumbnail_requested = true;
    }

    pub(crate) fn thumbnail_requested(&self) -> bool {
        self.thumbnail_requested
    }

    pub(crate) fn store_thumbnail(&mut self, thumb: Surface) {
        self.thumbnail = Some(thumb);
        self.thumbnail_requested = false;
    }

    pub fn take_thumbnail(&mut self) -> Option<Surface> {
        self.thumbnail.take()
    }
}

/// What is at a map position: the top object, or the terrain.
pub fn look_map(world: &World, at: MapCoord) -> String {
    let (x, y) = (i32::from(at.x), i32::from(at.y));
    if let Some(o) = world.get_obj(x, y, at.z, true, None) {
        return world.objs.look_name(o);
    }
    world
        .tile_at(x, y, at.z)
        .map_or_else(|| String::from("nothing"), |t| t.name.clone())
}

fn outermost(world: &World, obj: ObjId) -> ObjId {
    let mut cur = obj;
    while let Some(nuvie_world::ObjLocation::Container(c)) = world.objs.get(cur).map(|o| o.location()) {
        cur = c;
    }
    cur
}

fn can_put_obj(world: &World, x: i32, y: i32, z: u8) -> bool {
    let at = world.map.wrap_coord(x, y, z);
    world.actors.actor_at(at).is_none()
        && (world.is_passable(x, y, z, None)
            || world.tile_at(x, y, z).is_some_and(|t| t.is(TileFlags::CAN_PLACE_ONTOP)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use nuvie_world::{Obj, ObjType, ObjTypeFlags, Tile, WallMask};

    const GRASS: u16 = 1;
    const ROCK: u16 = 2;
    const WALL_NEW: u16 = 3;
    const CHEST_TILE: u16 = 40;
    const COIN_TILE: u16 = 41;
    const CHEST: u16 = 1;
    const COIN: u16 = 2;

    fn world() -> (World, ActorId) {
        let mut w = World::new();
        w.tiles.insert(Tile::new(GRASS, "grass", 2).with_flags(TileFlags::PASSABLE));
        w.tiles.insert(
            Tile::new(ROCK, "rock", 8)
                .with_flags(TileFlags::BOUNDARY | TileFlags::MISSILE_BOUNDARY),
        );
        w.tiles.insert(
            Tile::new(WALL_NEW, "wall", 7)
                .with_flags(TileFlags::WALL | TileFlags::PASSABLE)
                .with_walls(WallMask::NORTH | WallMask::EAST | WallMask::WEST),
        );
        w.tiles.insert(Tile::new(CHEST_TILE, "chest", 5).with_flags(TileFlags::PASSABLE));
        w.tiles.insert(Tile::new(COIN_TILE, "coin", 14).with_flags(TileFlags::PASSABLE));
        w.map.add_level(64, 64, GRASS);
        w.objs.register_type(CHEST, ObjType::new("chest", CHEST_TILE, 20).with_flags(ObjTypeFlags::CONTAINER));
        w.objs.register_type(COIN, ObjType::new("gold coin", COIN_TILE, 1).with_flags(ObjTypeFlags::STACKABLE));
        let me = w.actors.add("Avatar", MapCoord::new(20, 20, 0), 100);
        w.actors.set_player(me);
        (w, me)
    }

    fn window(w: &World, me: ActorId) -> MapWindow {
        let mut mw = MapWindow::new(&Config::default());
        mw.center_map_on_actor(w, me);
        mw
    }

    #[test]
    fn test_center_and_cursor() {
        let (w, me) = world();
        let mut mw = window(&w, me);
        assert_eq!(mw.pos(), (15, 15));
        mw.center_cursor();
        assert_eq!(mw.cursor_coord(), MapCoord::new(20, 20, 0));
        mw.move_cursor_relative(1, -1);
        assert_eq!(mw.cursor_coord(), MapCoord::new(21, 19, 0));
        mw.move_cursor(11, 0);
        assert_eq!(mw.cursor(), Point::new(6, 4), "outside the window is ignored");
        assert_eq!(mw.map_to_window(MapCoord::new(21, 19, 0)), Some(Point::new(6, 4)));
        assert_eq!(mw.map_to_window(MapCoord::new(40, 19, 0)), None);
    }

    #[test]
    fn test_view_wraps_horizontally() {
        let (w, me) = world();
        let mut mw = window(&w, me);
        mw.move_map(&w, -3, 10, 0, 0, 0);
        assert_eq!(mw.pos(), (61, 10));
        assert!(mw.in_window(1, 12, 0), "across the seam");
        assert!(!mw.in_window(1, 12, 1), "other level");
        mw.shift_map_relative(&w, 20, -4);
        assert_eq!(mw.pos(), (62, 9));
        assert_eq!(mw.pixel_offset(), (4, 12));
    }

    #[test]
    fn test_drop_rules() {
        let (mut w, me) = world();
        let coin = w.objs.create(Obj::new(COIN, 0));
        w.objs.moveto_inventory(coin, me).unwrap();
        let mw = window(&w, me);
        assert_eq!(mw.can_drop_or_move_obj(&w, 21, 20, me, coin), Ok(()));
        assert_eq!(
            mw.can_drop_or_move_obj(&w, 20, 20, me, coin),
            Err(ActionError::NotPossible),
            "the actor stands there"
        );
        assert_eq!(
            mw.can_drop_or_move_obj(&w, 26, 20, me, coin),
            Err(ActionError::OutOfRange)
        );
    }

    #[test]
    fn test_drop_behind_rock_is_blocked_unless_container() {
        let (mut w, me) = world();
        w.map.set_tile(21, 20, 0, ROCK);
        let coin = w.objs.create(Obj::new(COIN, 0));
        w.objs.moveto_inventory(coin, me).unwrap();
        let mw = window(&w, me);
        assert_eq!(mw.can_drop_or_move_obj(&w, 22, 20, me, coin), Err(ActionError::Blocked));
        assert_eq!(mw.can_drop_or_move_obj(&w, 21, 20, me, coin), Err(ActionError::Blocked));
        w.objs.add_to_map(Obj::new(CHEST, 0), MapCoord::new(21, 20, 0));
        assert_eq!(mw.can_drop_or_move_obj(&w, 21, 20, me, coin), Ok(()), "into the chest");
    }

    #[test]
    fn test_get_rules() {
        let (mut w, me) = world();
        let near = w.objs.add_to_map(Obj::new(COIN, 0), MapCoord::new(21, 21, 0));
        let mw = window(&w, me);
        assert!(mw.can_get_obj(&w, me, near));
        w.map.set_tile(22, 20, 0, ROCK);
        let walled = w.objs.add_to_map(Obj::new(COIN, 0), MapCoord::new(23, 20, 0));
        assert!(!mw.can_get_obj(&w, me, walled), "rock in between");
        let carried = w.objs.create(Obj::new(COIN, 0));
        w.objs.moveto_inventory(carried, me).unwrap();
        assert!(!mw.can_get_obj(&w, me, carried));
    }

    #[test]
    fn test_blocked_by_wall_south() {
        let (mut w, me) = world();
        w.map.set_tile(20, 21, 0, WALL_NEW);
        let coin = w.objs.add_to_map(Obj::new(COIN, 0), MapCoord::new(20, 21, 0));
        let mw = window(&w, me);
        assert!(mw.blocked_by_wall(&w, me, coin), "item hangs on the far side");
        if let Some(a) = w.actors.get_mut(me) {
            a.pos = MapCoord::new(20, 22, 0);
        }
        assert!(!mw.blocked_by_wall(&w, me, coin));
    }

    #[test]
    fn test_look() {
        let (mut w, me) = world();
        w.objs.add_to_map(Obj::new(COIN, 0).with_qty(3), MapCoord::new(21, 20, 0));
        let mw = window(&w, me);
        assert_eq!(mw.look(&w, 5, 5), "Avatar");
        assert_eq!(mw.look(&w, 6, 5), "3 gold coins");
        assert_eq!(mw.look(&w, 5, 6), "grass");
    }

    #[test]
    fn test_wizard_eye_restores_view() {
        let (w, me) = world();
        let mut mw = window(&w, me);
        mw.wizard_eye_start(&w, MapCoord::new(40, 40, 0), 2);
        assert!(mw.is_wizard_eye_mode());
        assert_eq!(mw.pos(), (35, 35));
        assert_eq!(mw.x_ray(), XRayMode::On);
        mw.wizard_eye_update(&w);
        assert!(mw.is_wizard_eye_mode());
        mw.wizard_eye_update(&w);
        assert!(!mw.is_wizard_eye_mode());
        assert_eq!(mw.pos(), (15, 15));
        assert_eq!(mw.x_ray(), XRayMode::Off);
    }

    #[test]
    fn test_movement_direction() {
        let (w, me) = world();
        let mw = window(&w, me);
        assert_eq!(mw.get_movement_direction(5 * 16 + 3, 5 * 16 + 3), (0, 0));
        assert_eq!(mw.get_movement_direction(0, 0), (-1, -1));
        assert_eq!(mw.get_movement_direction(10 * 16, 5 * 16), (1, 0));
    }
}
