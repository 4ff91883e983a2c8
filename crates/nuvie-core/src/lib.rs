//! **nuvie-core** — core types for the Nuvie map engine.
//!
//! Geometry on a toroidal tile map, dense grids, an indexed pixel surface,
//! input messages and the [`Model`] contract a frontend drives.

pub mod app;
pub mod geom;
pub mod grid;
pub mod messages;
pub mod surface;

pub use app::{Effect, Model};
pub use geom::{Direction, MapCoord, Point, Range, direction_name, wrap, wrapped_offset};
pub use grid::Grid;
pub use messages::*;
pub use surface::{Surface, TILE_PIXELS, TILE_SIZE, TRANSPARENT};
