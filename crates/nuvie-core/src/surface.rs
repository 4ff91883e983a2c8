//! An 8-bit indexed pixel [`Surface`].
//!
//! Palette lookup happens in the frontend; everything the game draws is a
//! palette index. Tiles are 16×16 and index 0xFF is the transparent colour.

use crate::geom::{Point, Range};

/// Width and height of one map tile in pixels.
pub const TILE_SIZE: i32 = 16;

/// Number of pixels in one tile bitmap.
pub const TILE_PIXELS: usize = (TILE_SIZE * TILE_SIZE) as usize;

/// Palette index treated as see-through when blitting transparent tiles.
pub const TRANSPARENT: u8 = 0xFF;

/// A row-major buffer of palette indices.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Surface {
    pixels: Vec<u8>,
    width: i32,
    height: i32,
}

impl Surface {
    /// A surface of the given pixel size, cleared to index 0.
    pub fn new(width: i32, height: i32) -> Self {
        let width = width.max(0);
        let height = height.max(0);
        Self {
            pixels: vec![0; (width * height) as usize],
            width,
            height,
        }
    }

    #[inline]
    pub fn width(&self) -> i32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> i32 {
        self.height
    }

    #[inline]
    pub fn bounds(&self) -> Range {
        Range::new(0, 0, self.width, self.height)
    }

    #[inline]
    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x >= 0 && y >= 0 && x < self.width && y < self.height {
            Some((y * self.width + x) as usize)
        } else {
            None
        }
    }

    /// Palette index at (x, y), or `None` outside the surface.
    #[inline]
    pub fn pixel(&self, x: i32, y: i32) -> Option<u8> {
        self.index(x, y).map(|i| self.pixels[i])
    }

    /// Set one pixel. Ignored outside the surface.
    #[inline]
    pub fn put_pixel(&mut self, x: i32, y: i32, color: u8) {
        if let Some(i) = self.index(x, y) {
            self.pixels[i] = color;
        }
    }

    /// Fill a rectangle, clipped to the surface.
    pub fn fill_rect(&mut self, r: Range, color: u8) {
        let r = r.intersect(self.bounds());
        for y in r.min.y..r.max.y {
            let start = (y * self.width + r.min.x) as usize;
            let end = (y * self.width + r.max.x) as usize;
            self.pixels[start..end].fill(color);
        }
    }

    /// Blit a 16×16 tile bitmap with its top-left corner at `at`.
    ///
    /// Only pixels inside `clip` are written. With `transparent` set,
    /// [`TRANSPARENT`] source pixels are skipped.
    pub fn blit_tile(&mut self, data: &[u8; TILE_PIXELS], at: Point, transparent: bool, clip: Range) {
        self.blit_tile_part(data, at, Range::new(0, 0, TILE_SIZE, TILE_SIZE), transparent, clip);
    }

    /// Blit the `src` sub-rectangle of a tile bitmap, placing the tile's own
    /// origin at `at`.
    pub fn blit_tile_part(
        &mut self,
        data: &[u8; TILE_PIXELS],
        at: Point,
        src: Range,
        transparent: bool,
        clip: Range,
    ) {
        let clip = clip.intersect(self.bounds());
        let src = src.intersect(Range::new(0, 0, TILE_SIZE, TILE_SIZE));
        for p in src {
            let (dx, dy) = (at.x + p.x, at.y + p.y);
            if !clip.contains(Point::new(dx, dy)) {
                continue;
            }
            let c = data[(p.y * TILE_SIZE + p.x) as usize];
            if transparent && c == TRANSPARENT {
                continue;
            }
            self.put_pixel(dx, dy, c);
        }
    }

    /// Copy another surface with its top-left corner at `at`, skipping
    /// [`TRANSPARENT`] pixels.
    pub fn blit_surface(&mut self, src: &Surface, at: Point) {
        for p in src.bounds() {
            if let Some(c) = src.pixel(p.x, p.y) {
                if c != TRANSPARENT {
                    self.put_pixel(at.x + p.x, at.y + p.y, c);
                }
            }
        }
    }

    /// A copy of the `r` sub-rectangle keeping every `step`-th pixel.
    pub fn downsample(&self, r: Range, step: i32) -> Surface {
        let step = step.max(1);
        let r = r.intersect(self.bounds());
        let mut out = Surface::new(r.width() / step, r.height() / step);
        for p in out.bounds() {
            let c = self.pixel(r.min.x + p.x * step, r.min.y + p.y * step).unwrap_or(0);
            out.put_pixel(p.x, p.y, c);
        }
        out
    }

    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.pixels
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checker() -> [u8; TILE_PIXELS] {
        let mut data = [TRANSPARENT; TILE_PIXELS];
        for (i, px) in data.iter_mut().enumerate() {
            if i % 2 == 0 {
                *px = 7;
            }
        }
        data
    }

    #[test]
    fn blit_skips_transparent_pixels() {
        let mut s = Surface::new(32, 32);
        s.fill_rect(s.bounds(), 3);
        s.blit_tile(&checker(), Point::new(16, 0), true, s.bounds());
        assert_eq!(s.pixel(16, 0), Some(7));
        assert_eq!(s.pixel(17, 0), Some(3), "transparent pixel kept background");
        s.blit_tile(&checker(), Point::new(16, 0), false, s.bounds());
        assert_eq!(s.pixel(17, 0), Some(TRANSPARENT));
    }

    #[test]
    fn blit_is_clipped() {
        let mut s = Surface::new(32, 32);
        let clip = Range::new(0, 0, 8, 8);
        s.blit_tile(&[9; TILE_PIXELS], Point::new(-4, -4), false, clip);
        assert_eq!(s.pixel(7, 7), Some(9));
        assert_eq!(s.pixel(8, 8), Some(0), "outside the clip rect");
        assert_eq!(s.as_slice().iter().filter(|&&c| c == 9).count(), 64);
    }

    #[test]
    fn downsample_keeps_every_step() {
        let mut s = Surface::new(8, 8);
        s.put_pixel(4, 4, 5);
        let small = s.downsample(s.bounds(), 4);
        assert_eq!((small.width(), small.height()), (2, 2));
        assert_eq!(small.pixel(1, 1), Some(5));
    }
}
