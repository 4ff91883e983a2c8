//! **nuvie-world** — the world model behind the map window.
//!
//! Tiles and their flags, the toroidal terrain map, the object arena, the
//! actor table and the queries across them. The [`visibility`] module
//! computes what the viewer can see; [`lighting`] computes how bright it is.

pub mod actor;
pub mod lighting;
pub mod map;
pub mod obj;
pub mod tile;
pub mod visibility;
pub mod world;

pub use actor::{Actor, ActorId, ActorStatus, ActorTable, Alignment};
pub use lighting::{AlphaMap, Ambient, AmbientInput, LightingStyle, accumulate_lights, ambient_level};
pub use map::{MapLevel, WorldMap};
pub use obj::{Obj, ObjError, ObjId, ObjLocation, ObjManager, ObjStatus, ObjType, ObjTypeFlags};
pub use tile::{SHORELINE_TILES, Tile, TileAnim, TileFlags, TileStore, WallMask};
pub use visibility::{
    BLACK, BORDER, RoofDisplay, U6_WALL_FAMILIES, ViewParams, VisibilityBuffer, WallFamily, obj_tile_at,
};
pub use world::{LineTestFlags, LineTestResult, World};
