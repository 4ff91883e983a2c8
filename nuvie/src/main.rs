//! A small hand-built world on the terminal.
//!
//! Arguments of the form `config/path=value` override settings, e.g.
//! `nuvie-demo config/general/lighting=smooth`.

use std::time::Duration;

use nuvie::{Config, GameContext, Hooks, Party, Session};
use nuvie_core::{MapCoord, Point, TILE_SIZE};
use nuvie_world::{Alignment, Obj, ObjType, ObjTypeFlags, Tile, TileFlags, WallMask, World};

const GRASS: u16 = 1;
const ROCK: u16 = 2;
const WALL_N: u16 = 3;
const WALL_S: u16 = 4;
const WALL_E: u16 = 5;
const WALL_W: u16 = 6;
const FLOOR: u16 = 7;
const WATER: u16 = 8;
const AVATAR_TILE: u16 = 100;
const DUPRE_TILE: u16 = 101;
const GARGOYLE_TILE: u16 = 102;

const CHEST: u16 = 1;
const COIN: u16 = 2;
const BOOK: u16 = 3;
const TORCH: u16 = 4;

fn demo_world() -> World {
    let mut w = World::new();
    let wall = |id, name, walls| {
        Tile::new(id, name, 7)
            .with_flags(TileFlags::WALL | TileFlags::BOUNDARY | TileFlags::MISSILE_BOUNDARY)
            .with_walls(walls)
    };
    w.tiles.insert(Tile::new(GRASS, "grass", 2).with_flags(TileFlags::PASSABLE));
    w.tiles.insert(
        Tile::new(ROCK, "rock", 8).with_flags(TileFlags::BOUNDARY | TileFlags::MISSILE_BOUNDARY),
    );
    w.tiles.insert(wall(WALL_N, "wall", WallMask::NORTH));
    w.tiles.insert(wall(WALL_S, "wall", WallMask::SOUTH));
    w.tiles.insert(wall(WALL_E, "wall", WallMask::EAST));
    w.tiles.insert(wall(WALL_W, "wall", WallMask::WEST));
    w.tiles.insert(Tile::new(FLOOR, "floor", 94).with_flags(TileFlags::PASSABLE));
    w.tiles.insert(
        Tile::new(WATER, "water", 4).with_flags(TileFlags::WATER | TileFlags::BOUNDARY | TileFlags::TRANSPARENT),
    );
    w.tiles.insert(Tile::new(AVATAR_TILE, "avatar", 15));
    w.tiles.insert(Tile::new(DUPRE_TILE, "dupre", 11));
    w.tiles.insert(Tile::new(GARGOYLE_TILE, "gargoyle", 12));
    w.tiles.insert(Tile::new(40, "chest", 6).with_flags(TileFlags::PASSABLE));
    w.tiles.insert(Tile::new(41, "coins", 14).with_flags(TileFlags::PASSABLE));
    w.tiles.insert(Tile::new(42, "book", 5).with_flags(TileFlags::PASSABLE));
    w.tiles.insert(Tile::new(43, "torch", 14).with_flags(TileFlags::PASSABLE).with_light(4));

    let z = w.map.add_level(64, 64, GRASS);
    for i in 0..64 {
        w.map.set_tile(i, 0, z, ROCK);
        w.map.set_tile(0, i, z, ROCK);
    }
    for x in 8..14 {
        w.map.set_tile(x, 26, z, WATER);
        w.map.set_tile(x, 27, z, WATER);
    }

    // a one-room house with a door gap on the south side
    for x in 24..31 {
        w.map.set_tile(x, 16, z, WALL_S);
        if x != 27 {
            w.map.set_tile(x, 22, z, WALL_N);
        }
    }
    for y in 17..22 {
        w.map.set_tile(24, y, z, WALL_E);
        w.map.set_tile(30, y, z, WALL_W);
        for x in 25..30 {
            w.map.set_tile(x, y, z, FLOOR);
        }
    }

    w.objs.register_type(CHEST, ObjType::new("chest", 40, 20).with_flags(ObjTypeFlags::CONTAINER));
    w.objs.register_type(COIN, ObjType::new("gold coin", 41, 1).with_flags(ObjTypeFlags::STACKABLE));
    w.objs.register_type(BOOK, ObjType::new("book", 42, 2).with_flags(ObjTypeFlags::READABLE));
    w.objs.register_type(TORCH, ObjType::new("torch", 43, 1));

    let chest = w.objs.add_to_map(Obj::new(CHEST, 0), MapCoord::new(27, 19, z));
    let gold = w.objs.create(Obj::new(COIN, 0).with_qty(40));
    if let Err(e) = w.objs.moveto_container(gold, chest) {
        log::warn!("demo chest: {e}");
    }
    w.objs.add_to_map(Obj::new(BOOK, 0), MapCoord::new(26, 18, z));
    w.objs.add_to_map(Obj::new(TORCH, 0), MapCoord::new(29, 20, z));
    w.objs.add_to_map(Obj::new(COIN, 0).with_qty(7), MapCoord::new(21, 24, z));

    let avatar = w.actors.add("Avatar", MapCoord::new(20, 24, z), AVATAR_TILE);
    w.actors.set_player(avatar);
    let dupre = w.actors.add("Dupre", MapCoord::new(19, 25, z), DUPRE_TILE);
    if let Some(d) = w.actors.get_mut(dupre) {
        d.alignment = Alignment::Good;
    }
    let gargoyle = w.actors.add("gargoyle", MapCoord::new(40, 30, z), GARGOYLE_TILE);
    if let Some(g) = w.actors.get_mut(gargoyle) {
        g.alignment = Alignment::Evil;
    }
    w
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut config = Config::default();
    for arg in std::env::args().skip(1) {
        let Some((key, value)) = arg.split_once('=') else {
            return Err(format!("expected key=value, got {arg:?}").into());
        };
        config.set(key, value)?;
    }

    let world = demo_world();
    let party = Party::new(world.actors.iter().filter(|a| a.alignment != Alignment::Evil).map(|a| a.id).collect());
    let size = Point::new(config.win_width * TILE_SIZE, config.win_height * TILE_SIZE);
    let ctx = GameContext::new(world, config, party, Hooks::default(), 0x6e75_7669);
    let mut session = Session::new(ctx, 0x6e75_7669);

    nuvie_crossterm::run(&mut session, size, Duration::from_millis(100), |s| {
        s.ctx.scroll.recent_lines(44, 4)
    })
}
