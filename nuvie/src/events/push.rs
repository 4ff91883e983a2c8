//! Move: push an object or actor, or hand an inventory item over.

use log::warn;
use nuvie_core::{MapCoord, direction_name};
use nuvie_world::{ActorId, ActorStatus, LineTestFlags, ObjId, TileFlags};
use rand::RngExt;

use super::{Events, InputValue, ModeState, player_offset};
use crate::config::InterfaceType;
use crate::script::SelectAction;
use crate::session::GameContext;

const PUSH_COST: i16 = 5;

impl Events {
    pub(super) fn push_action(&mut self, ctx: &mut GameContext) {
        let holding = self.state.push_obj().is_some() || self.state.push_actor().is_some();
        match self.input.value {
            InputValue::Direction { dx, dy, .. } => {
                if holding {
                    self.push_to(ctx, dx, dy);
                } else if let Some(at) = player_offset(ctx, dx, dy) {
                    self.push_from(ctx, at);
                } else {
                    self.end_action(ctx, true);
                }
            }
            InputValue::Target { loc, .. } => {
                if !holding {
                    self.push_from(ctx, loc);
                    return;
                }
                match self.push_source(ctx) {
                    Some(from) => {
                        let w = i32::from(ctx.world.map.width(loc.z));
                        let h = i32::from(ctx.world.map.height(loc.z));
                        let dx = nuvie_core::wrapped_offset(i32::from(from.x), i32::from(loc.x), w);
                        let dy = nuvie_core::wrapped_offset(i32::from(from.y), i32::from(loc.y), h);
                        self.push_to(ctx, dx, dy);
                    }
                    None => self.end_action(ctx, true),
                }
            }
            InputValue::Obj { obj, .. } => {
                if self.state.push_obj().is_none() {
                    self.push_from_obj(ctx, obj);
                } else {
                    self.push_to_obj(ctx, obj);
                }
            }
            _ => {
                ctx.scroll.display_string("what?\n");
                self.end_action(ctx, true);
            }
        }
    }

    /// Where the held object or actor is.
    fn push_source(&self, ctx: &GameContext) -> Option<MapCoord> {
        if let Some(a) = self.state.push_actor() {
            return ctx.world.actors.get(a).map(|a| a.pos);
        }
        let obj = self.state.push_obj()?;
        ctx.world.objs.root_map_coord(obj).or_else(|| {
            ctx.world
                .objs
                .holder_actor(obj)
                .and_then(|a| ctx.world.actors.get(a))
                .map(|a| a.pos)
        })
    }

    /// First half: pick up what is at `target` and ask where it goes.
    fn push_from(&mut self, ctx: &mut GameContext, target: MapCoord) {
        ctx.map_window.set_show_use_cursor(false);
        let (x, y) = (i32::from(target.x), i32::from(target.y));
        let player_pos = ctx.player_pos();
        let obj = if player_pos != Some(target) {
            ctx.world.get_obj(x, y, target.z, true, None)
        } else {
            None
        };
        let actor = ctx.world.actors.actor_at(target);

        if ctx.map_window.tile_is_black(&ctx.world, x, y, target.z, obj) {
            ctx.scroll.display_string("nothing.\n");
            self.end_action(ctx, true);
            return;
        }
        let obj = obj.filter(|&o| ctx.world.objs.weight(o) != 0);
        let actor = actor.filter(|&a| ctx.actor_visible(a));
        if let Some(a) = actor {
            let name = ctx.world.actors.get(a).map(|a| a.name.clone()).unwrap_or_default();
            ctx.scroll.display_string(&name);
        } else if let Some(o) = obj {
            ctx.scroll.display_string(&ctx.world.objs.look_name(o));
        } else {
            ctx.scroll.display_string("nothing.\n");
            self.end_action(ctx, true);
            return;
        }
        self.state = ModeState::Push {
            obj: if actor.is_some() { None } else { obj },
            actor,
            in_inventory: false,
        };

        let ranged = Self::is_ranged(ctx, SelectAction::Move);
        let too_far = player_pos.is_some_and(|p| p.distance(target) > 1);
        let normal = ctx.map_window.interface() == InterfaceType::Normal;
        if too_far && !ranged && normal {
            ctx.scroll.display_string("\n\nOut of range!\n");
            self.end_action(ctx, true);
            return;
        }
        let player = ctx.player();
        if !normal && actor.is_none() && obj.is_some_and(|o| !ctx.map_window.can_get_obj(&ctx.world, player, o)) {
            ctx.scroll.display_string("\n\nCan't reach it\n");
            self.end_action(ctx, true);
            return;
        }
        self.get_direction_from(ctx, target, "\nTo ");
    }

    /// First half for an object picked from an inventory.
    fn push_from_obj(&mut self, ctx: &mut GameContext, obj: ObjId) {
        let in_inventory = ctx.world.objs.holder_actor(obj).is_some();
        self.state = ModeState::Push {
            obj: Some(obj),
            actor: None,
            in_inventory,
        };
        ctx.scroll.display_string(&ctx.world.objs.look_name(obj));
        self.get_target(ctx, "\nTo ");
    }

    /// Second half: move the held thing by (dx, dy).
    fn push_to(&mut self, ctx: &mut GameContext, dx: i32, dy: i32) {
        let ModeState::Push {
            obj,
            actor,
            in_inventory,
        } = self.state
        else {
            self.end_action(ctx, true);
            return;
        };
        let player = ctx.player();
        if obj.is_none() && actor.is_none() {
            ctx.scroll.display_string("what?\n\n");
            ctx.scroll.display_prompt();
            self.end_action(ctx, false);
            return;
        }
        let immobile = actor
            .and_then(|a| ctx.world.actors.get(a))
            .is_some_and(|a| a.is(ActorStatus::IMMOBILE));
        if immobile {
            ctx.scroll.display_string("Not possible\n\n");
            ctx.scroll.display_prompt();
            self.end_action(ctx, false);
            return;
        }
        let Some(from) = self.push_source(ctx) else {
            self.end_action(ctx, true);
            return;
        };
        if let (Some(obj), true) = (obj, in_inventory) {
            let to = ctx
                .world
                .map
                .wrap_coord(i32::from(from.x) + dx, i32::from(from.y) + dy, from.z);
            give_obj(ctx, obj, from, to);
            ctx.scroll.display_string("\n\n");
            ctx.scroll.display_prompt();
            self.end_action(ctx, false);
            return;
        }

        let (dx, dy) = if ctx.map_window.interface() == InterfaceType::Normal || actor.is_some() {
            (dx.signum(), dy.signum())
        } else {
            (dx, dy)
        };
        ctx.scroll.display_string(&format!("{}.\n\n", direction_name(dx, dy)));
        if (dx, dy) == (0, 0) {
            ctx.scroll.display_prompt();
            self.end_action(ctx, false);
            return;
        }
        let (x, y) = (i32::from(from.x) + dx, i32::from(from.y) + dy);
        let to = ctx.world.map.wrap_coord(x, y, from.z);

        if let Some(obj) = obj {
            if let Err(e) = ctx.map_window.can_drop_or_move_obj(&ctx.world, x, y, player, obj) {
                ctx.scroll.display_string(&format!("{e}\n"));
                self.end_action(ctx, true);
                return;
            }
        }

        if let Some(a) = actor {
            if a == player {
                self.walk(ctx, dx, dy);
            } else {
                push_actor(ctx, a, to);
            }
        } else if let Some(obj) = obj {
            let walled = ctx.map_window.interface() != InterfaceType::IgnoreBlock
                && ctx.map_window.blocked_by_wall(&ctx.world, player, obj);
            if walled {
                ctx.scroll.display_string("Blocked.\n\n");
            } else if ctx.run_usecode(|u, s| u.move_obj(s, obj, dx, dy)) {
                if move_obj_to(ctx, obj, from, to) {
                    ctx.subtract_movement_points(player, PUSH_COST);
                } else {
                    ctx.scroll.display_string("Blocked.\n\n");
                }
            }
        }
        ctx.scroll.display_prompt();
        self.end_action(ctx, false);
    }

    /// Second half when the destination is another object: put the held
    /// object inside it.
    fn push_to_obj(&mut self, ctx: &mut GameContext, target: ObjId) {
        let Some(obj) = self.state.push_obj() else {
            self.end_action(ctx, true);
            return;
        };
        ctx.scroll.display_string(&format!("{}.\n\n", ctx.world.objs.look_name(target)));
        if ctx.world.objs.can_store_obj(target, obj) {
            match ctx.world.objs.moveto_container(obj, target) {
                Ok(()) => ctx.subtract_movement_points(ctx.player(), PUSH_COST),
                Err(e) => warn!("move refused: {e}"),
            }
        } else {
            ctx.scroll.display_string("Not possible\n\n");
        }
        ctx.scroll.display_prompt();
        self.end_action(ctx, false);
    }
}

/// Hand an inventory object to the actor standing at `to`.
fn give_obj(ctx: &mut GameContext, obj: ObjId, from: MapCoord, to: MapCoord) {
    let holder = ctx.world.objs.holder_actor(obj);
    let receiver = ctx
        .world
        .actors
        .actor_at(to)
        .filter(|&a| ctx.actor_visible(a) && Some(a) != holder);
    let Some(receiver) = receiver else {
        ctx.scroll.display_string("nobody.");
        return;
    };
    let name = ctx.world.actors.get(receiver).map(|a| a.name.clone()).unwrap_or_default();
    ctx.scroll.display_string(&format!("{name}."));
    if from.distance(to) > 1 && ctx.map_window.interface() == InterfaceType::Normal {
        ctx.scroll.display_string("\n\nOut of range!");
        return;
    }
    if let Err(e) = ctx.world.objs.moveto_inventory(obj, receiver) {
        warn!("give refused: {e}");
        return;
    }
    if let Some(h) = holder {
        ctx.subtract_movement_points(h, PUSH_COST);
    }
}

/// Shove another actor one cell. Sleeping or paralysed actors only
/// budge half the time.
fn push_actor(ctx: &mut GameContext, actor: ActorId, to: MapCoord) {
    let player = ctx.player();
    let flags = LineTestFlags::HIT_ACTORS | LineTestFlags::HIT_UNPASSABLE;
    if ctx
        .world
        .line_test(to, i32::from(to.x), i32::from(to.y), flags, 0, None)
        .is_some()
    {
        ctx.scroll.display_string("Blocked.\n\n");
        return;
    }
    let helpless = ctx
        .world
        .actors
        .get(actor)
        .is_some_and(|a| a.is(ActorStatus::ASLEEP) || a.is(ActorStatus::PARALYZED));
    if helpless && ctx.rng.random_range(0..2u8) != 0 {
        ctx.scroll.display_string("Failed.\n\n");
        return;
    }
    if let Some(a) = ctx.world.actors.get_mut(actor) {
        a.pos = to;
    }
    ctx.subtract_movement_points(player, PUSH_COST);
}

/// Place a pushed object at `to`, dropping it into a container there
/// when one takes it.
fn move_obj_to(ctx: &mut GameContext, obj: ObjId, from: MapCoord, to: MapCoord) -> bool {
    let (x, y) = (i32::from(to.x), i32::from(to.y));
    let world = &mut ctx.world;
    let hit = world.line_test(from, x, y, LineTestFlags::HIT_UNPASSABLE, 1, Some(obj));
    let moved = match hit {
        Some(hit) => match hit.hit_obj {
            Some(dest) if world.objs.can_store_obj(dest, obj) => world.objs.moveto_container(obj, dest),
            Some(dest)
                if world.obj_tile(dest).is_some_and(|t| {
                    t.is(TileFlags::CAN_PLACE_ONTOP)
                        || (t.is(TileFlags::PASSABLE) && !world.is_boundary(x, y, to.z))
                }) =>
            {
                world.objs.moveto_map(obj, to)
            }
            _ => return false,
        },
        None => {
            let ignore_block = ctx.map_window.interface() == InterfaceType::IgnoreBlock;
            let dest = if ignore_block && world.actors.actor_at(to).is_some() {
                None
            } else {
                world.get_obj(x, y, to.z, true, Some(obj))
            };
            match dest {
                Some(d) if world.objs.can_store_obj(d, obj) => world.objs.moveto_container(obj, d),
                _ => world.objs.moveto_map(obj, to),
            }
        }
    };
    match moved {
        Ok(()) => true,
        Err(e) => {
            warn!("push refused: {e}");
            false
        }
    }
}
