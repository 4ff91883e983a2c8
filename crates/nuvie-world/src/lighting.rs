//! Ambient light and the per-pixel alpha map.
//!
//! The ambient level depends on the time of day, the level and a few
//! effects. Light sources (tiles, objects, actors and the party's torch)
//! then brighten circular "globes" of the alpha map, which is finally
//! composited over the drawn map window.

use nuvie_core::{Point, Surface, TILE_SIZE};

use crate::visibility::{BORDER, VisibilityBuffer};
use crate::world::World;

/// How darkness is rendered.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LightingStyle {
    /// No darkness at all.
    None,
    /// Hard-edged light in a few brightness steps.
    #[default]
    Original,
    /// Continuous dusk and dawn, soft-edged globes.
    Smooth,
}

/// Everything the ambient level depends on.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct AmbientInput {
    pub hour: u8,
    pub minute: u8,
    pub dungeon: bool,
    pub eclipse: bool,
    pub xray: bool,
    pub style: LightingStyle,
    /// Floor brightness. Callers pass 0 unless cheats are enabled.
    pub min_brightness: u8,
    /// The party carries a light source or a light spell is running.
    pub party_light: bool,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Ambient {
    pub level: u8,
    pub dawn_or_dusk: bool,
    /// Draw the party's light globe at the centre of the view.
    pub party_light: bool,
}

/// Compute the ambient brightness.
///
/// Dusk runs through the 19th hour, dawn through the 5th.
pub fn ambient_level(input: &AmbientInput) -> Ambient {
    let min = u32::from(input.min_brightness);
    let minute = u32::from(input.minute.min(59));
    let smooth = input.style == LightingStyle::Smooth;
    let mut dawn_or_dusk = false;

    let mut a: u32 = if input.xray {
        255
    } else if input.dungeon || input.eclipse {
        min
    } else if input.hour == 19 {
        if smooth {
            dawn_or_dusk = true;
            255 - (255 - min) * minute / 59
        } else {
            (20 * (6 - minute / 10)).max(min)
        }
    } else if input.hour == 5 {
        if smooth {
            dawn_or_dusk = true;
            min + (255 - min) * minute / 59
        } else {
            (20 * (1 + minute / 10)).max(min)
        }
    } else if (6..19).contains(&input.hour) {
        255
    } else {
        min
    };
    a = a.min(255);

    let threshold = if smooth { 248 } else { 81 };
    let party_light = a < threshold && input.party_light;
    if party_light {
        if smooth {
            if !dawn_or_dusk {
                a = min;
            }
        } else {
            a = 80;
        }
    }
    Ambient { level: a as u8, dawn_or_dusk, party_light }
}

/// Globe radius in pixels for light levels 1 to 5.
pub const GLOBE_RADIUS: [i32; 5] = [18, 56, 74, 96, 224];

/// 4×4 ordered-dither matrix used when compositing.
const BAYER: [[u8; 4]; 4] = [[0, 8, 2, 10], [12, 4, 14, 6], [3, 11, 1, 9], [15, 7, 13, 5]];

// ---------------------------------------------------------------------------
// AlphaMap
// ---------------------------------------------------------------------------

/// Per-pixel brightness over the map window. 0 is black, 255 fully lit.
#[derive(Clone, Debug)]
pub struct AlphaMap {
    width: i32,
    height: i32,
    alpha: Vec<u8>,
    style: LightingStyle,
}

impl AlphaMap {
    /// A fully lit map covering `win_width`×`win_height` tiles.
    pub fn new(win_width: i32, win_height: i32, style: LightingStyle) -> Self {
        let width = win_width.max(0) * TILE_SIZE;
        let height = win_height.max(0) * TILE_SIZE;
        Self {
            width,
            height,
            alpha: vec![255; (width * height) as usize],
            style,
        }
    }

    #[inline]
    pub fn style(&self) -> LightingStyle {
        self.style
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn alpha_at(&self, x: i32, y: i32) -> Option<u8> {
        if x < 0 || y < 0 || x >= self.width || y >= self.height {
            return None;
        }
        self.alpha.get((x + y * self.width) as usize).copied()
    }

    /// Reset to the ambient level, with the party globe at tile `center`
    /// when the party carries light.
    pub fn clear(&mut self, ambient: &Ambient, center: Point) {
        self.alpha.fill(ambient.level);
        if ambient.party_light {
            let level = match self.style {
                LightingStyle::Smooth => (ambient.level / 20 + 4).min(5),
                _ => 2,
            };
            self.draw_globe(center.x, center.y, level);
        }
    }

    /// Brighten a globe of light `level` centred on tile (tx, ty), in
    /// window tile coordinates. Tiles outside the window still light the
    /// pixels their globe reaches.
    pub fn draw_globe(&mut self, tx: i32, ty: i32, level: u8) {
        if level == 0 || self.alpha.is_empty() {
            return;
        }
        let radius = GLOBE_RADIUS[usize::from(level.min(5)) - 1];
        let cx = tx * TILE_SIZE + TILE_SIZE / 2;
        let cy = ty * TILE_SIZE + TILE_SIZE / 2;
        let x0 = (cx - radius).max(0);
        let x1 = (cx + radius).min(self.width - 1);
        let y0 = (cy - radius).max(0);
        let y1 = (cy + radius).min(self.height - 1);
        let r2 = radius * radius;
        for y in y0..=y1 {
            for x in x0..=x1 {
                let (dx, dy) = (x - cx, y - cy);
                let d2 = dx * dx + dy * dy;
                if d2 >= r2 {
                    continue;
                }
                let idx = (x + y * self.width) as usize;
                let Some(px) = self.alpha.get_mut(idx) else {
                    continue;
                };
                match self.style {
                    LightingStyle::Smooth => {
                        let d = (d2 as f32).sqrt();
                        let add = (255.0 * (1.0 - d / radius as f32)) as u8;
                        *px = px.saturating_add(add);
                    }
                    _ => *px = 255,
                }
            }
        }
    }

    /// Darken the window area of `surface` whose top-left pixel is `at`.
    pub fn apply(&self, surface: &mut Surface, at: Point) {
        if self.style == LightingStyle::None {
            return;
        }
        for y in 0..self.height {
            for x in 0..self.width {
                let a = self.alpha[(x + y * self.width) as usize];
                let threshold = BAYER[(y & 3) as usize][(x & 3) as usize] * 16 + 8;
                if a < threshold {
                    surface.put_pixel(at.x + x, at.y + y, 0);
                }
            }
        }
    }
}

/// Draw the globes of every light source the viewer can see.
///
/// With `map_tile_lighting` off only actors give light.
pub fn accumulate_lights(world: &World, vis: &VisibilityBuffer, map: &mut AlphaMap, map_tile_lighting: bool) {
    if map_tile_lighting {
        for (p, id) in vis.grid().iter() {
            if id == 0 {
                continue;
            }
            let (tx, ty) = (p.x - BORDER, p.y - BORDER);
            if let Some(t) = world.tiles.get_tile(id) {
                if t.light > 0 {
                    map.draw_globe(tx, ty, t.light);
                }
            }
            let at = vis.map_coord(p.x, p.y);
            for &o in world.objs.objs_at(at) {
                let light = world.obj_tile(o).map_or(0, |t| t.light);
                if light > 0 && vis.can_display_obj(world, p.x, p.y, o) {
                    map.draw_globe(tx, ty, light);
                }
            }
        }
    }

    for actor in world.actors.iter() {
        if !actor.is_on_map() || actor.light == 0 {
            continue;
        }
        let p = actor.pos;
        let Some(b) = vis.to_buffer(p.x as i32, p.y as i32, p.z) else {
            continue;
        };
        if !vis.is_black(b.x, b.y) {
            map.draw_globe(b.x - BORDER, b.y - BORDER, actor.light);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tile::{Tile, TileFlags};
    use crate::visibility::ViewParams;
    use nuvie_core::MapCoord;

    fn at(hour: u8, minute: u8, style: LightingStyle) -> AmbientInput {
        AmbientInput { hour, minute, style, ..AmbientInput::default() }
    }

    #[test]
    fn test_day_and_night() {
        assert_eq!(ambient_level(&at(12, 0, LightingStyle::Original)).level, 255);
        assert_eq!(ambient_level(&at(23, 0, LightingStyle::Original)).level, 0);
        let mut dim = at(2, 0, LightingStyle::Original);
        dim.min_brightness = 40;
        assert_eq!(ambient_level(&dim).level, 40);
    }

    #[test]
    fn test_stepped_dusk_and_dawn() {
        let level = |h, m| ambient_level(&at(h, m, LightingStyle::Original)).level;
        assert_eq!(level(19, 0), 120);
        assert_eq!(level(19, 30), 60);
        assert_eq!(level(19, 59), 20);
        assert_eq!(level(5, 0), 20);
        assert_eq!(level(5, 59), 120);
    }

    #[test]
    fn test_smooth_dusk_and_dawn() {
        let dusk = ambient_level(&at(19, 0, LightingStyle::Smooth));
        assert_eq!(dusk.level, 255);
        assert!(dusk.dawn_or_dusk);
        assert_eq!(ambient_level(&at(19, 59, LightingStyle::Smooth)).level, 0);
        assert_eq!(ambient_level(&at(5, 59, LightingStyle::Smooth)).level, 255);
    }

    #[test]
    fn test_dungeon_eclipse_and_xray() {
        let mut i = at(12, 0, LightingStyle::Original);
        i.dungeon = true;
        assert_eq!(ambient_level(&i).level, 0, "dungeons are dark at noon");
        i.xray = true;
        assert_eq!(ambient_level(&i).level, 255, "x-ray sees everything");
        let mut e = at(12, 0, LightingStyle::Original);
        e.eclipse = true;
        e.min_brightness = 10;
        assert_eq!(ambient_level(&e).level, 10);
    }

    #[test]
    fn test_party_light() {
        let mut i = at(23, 0, LightingStyle::Original);
        i.party_light = true;
        let a = ambient_level(&i);
        assert!(a.party_light);
        assert_eq!(a.level, 80);

        let mut s = at(19, 30, LightingStyle::Smooth);
        s.party_light = true;
        let a = ambient_level(&s);
        assert!(a.party_light && a.dawn_or_dusk);
        assert_eq!(a.level, (255 - 255u32 * 30 / 59) as u8, "dusk level is kept");

        let mut day = at(12, 0, LightingStyle::Original);
        day.party_light = true;
        assert!(!ambient_level(&day).party_light, "no torch needed by day");
    }

    #[test]
    fn test_stepped_globe() {
        let mut m = AlphaMap::new(11, 11, LightingStyle::Original);
        m.clear(&Ambient::default(), Point::new(5, 5));
        m.draw_globe(5, 5, 1);
        assert_eq!(m.alpha_at(88, 88), Some(255), "centre lit");
        assert_eq!(m.alpha_at(88 + 17, 88), Some(255));
        assert_eq!(m.alpha_at(88 + 30, 88), Some(0), "outside the radius");
    }

    #[test]
    fn test_smooth_globe_fades() {
        let mut m = AlphaMap::new(11, 11, LightingStyle::Smooth);
        m.clear(&Ambient::default(), Point::new(5, 5));
        m.draw_globe(5, 5, 2);
        let near = m.alpha_at(90, 88).unwrap_or(0);
        let far = m.alpha_at(130, 88).unwrap_or(0);
        assert!(near > far && far > 0, "near {near} far {far}");
    }

    #[test]
    fn test_party_globe_on_clear() {
        let mut m = AlphaMap::new(11, 11, LightingStyle::Original);
        let a = Ambient { level: 80, dawn_or_dusk: false, party_light: true };
        m.clear(&a, Point::new(5, 5));
        assert_eq!(m.alpha_at(88, 88), Some(255));
        assert_eq!(m.alpha_at(0, 0), Some(80));
    }

    #[test]
    fn test_apply_dither() {
        let mut s = Surface::new(176, 176);
        s.fill_rect(s.bounds(), 7);
        let mut m = AlphaMap::new(11, 11, LightingStyle::Original);
        m.apply(&mut s, Point::new(0, 0));
        assert!(s.as_slice().iter().all(|&p| p == 7), "full light keeps everything");

        m.clear(&Ambient { level: 128, ..Ambient::default() }, Point::new(5, 5));
        m.apply(&mut s, Point::new(0, 0));
        let dark = s.as_slice().iter().filter(|&&p| p == 0).count();
        assert_eq!(dark, s.as_slice().len() / 2, "half the pattern is dark");

        m.clear(&Ambient::default(), Point::new(5, 5));
        m.apply(&mut s, Point::new(0, 0));
        assert!(s.as_slice().iter().all(|&p| p == 0));
    }

    #[test]
    fn test_style_none_leaves_surface() {
        let mut s = Surface::new(16, 16);
        s.fill_rect(s.bounds(), 7);
        let mut m = AlphaMap::new(1, 1, LightingStyle::None);
        m.clear(&Ambient::default(), Point::new(0, 0));
        m.apply(&mut s, Point::new(0, 0));
        assert!(s.as_slice().iter().all(|&p| p == 7));
    }

    #[test]
    fn test_lights_from_tiles_and_actors() {
        let mut w = World::new();
        w.tiles.insert(Tile::new(1, "grass", 2).with_flags(TileFlags::PASSABLE));
        w.tiles.insert(Tile::new(2, "brazier", 4).with_light(1));
        w.map.add_level(64, 64, 1);
        w.map.set_tile(22, 20, 0, 2);
        let torch = w.actors.add("avatar", MapCoord::new(18, 20, 0), 100);
        if let Some(a) = w.actors.get_mut(torch) {
            a.light = 1;
        }
        let view = ViewParams {
            cur_x: 15,
            cur_y: 15,
            level: 0,
            win_width: 11,
            win_height: 11,
            center_xoff: 0,
            blacking: true,
            xray: false,
            freeze_seed: false,
            roof_mode: false,
            player: Some(MapCoord::new(18, 20, 0)),
        };
        let mut vis = VisibilityBuffer::new(11, 11);
        vis.regenerate(&w, &view);
        let mut m = AlphaMap::new(11, 11, LightingStyle::Original);
        m.clear(&Ambient::default(), Point::new(5, 5));
        accumulate_lights(&w, &vis, &mut m, true);
        // Brazier at window tile (7, 5), actor at (3, 5).
        assert_eq!(m.alpha_at(7 * 16 + 8, 5 * 16 + 8), Some(255));
        assert_eq!(m.alpha_at(3 * 16 + 8, 5 * 16 + 8), Some(255));
        assert_eq!(m.alpha_at(5 * 16 + 8, 0), Some(0));

        m.clear(&Ambient::default(), Point::new(5, 5));
        accumulate_lights(&w, &vis, &mut m, false);
        assert_eq!(m.alpha_at(7 * 16 + 8, 5 * 16 + 8), Some(0), "tile lighting off");
        assert_eq!(m.alpha_at(3 * 16 + 8, 5 * 16 + 8), Some(255));
    }
}
