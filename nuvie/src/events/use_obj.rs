use nuvie_core::MapCoord;
use nuvie_world::{LineTestFlags, ObjId};

use super::{Events, InputValue, Mode, ScriptOwner, player_offset, seen_obj};
use crate::config::InterfaceType;
use crate::script::{ScriptResult, SelectAction};
use crate::session::GameContext;

const USE_COST: i16 = 5;

impl Events {
    pub(super) fn use_action(&mut self, ctx: &mut GameContext) {
        if self.owns_continuation(ScriptOwner::Usecode) {
            if let Some(prompt) = self.resume_with_input(ctx, ScriptOwner::Usecode) {
                self.end_action(ctx, prompt);
            }
            return;
        }
        match self.input.value {
            InputValue::Obj { obj, .. } => self.use_obj(ctx, Some(obj)),
            InputValue::Direction { dx, dy, actor, .. } => {
                let usable_actor = actor.is_some_and(|a| {
                    ctx.actor_visible(a) && ctx.hooks.usecode.has_actor_usecode(&ctx.world, a)
                });
                match player_offset(ctx, dx, dy) {
                    Some(at) if usable_actor => self.use_actor(ctx, at),
                    _ => self.use_dir(ctx, dx, dy),
                }
            }
            InputValue::Target { loc, .. } => self.use_at(ctx, loc),
            _ => {
                ctx.scroll.display_string("what?\n");
                self.end_action(ctx, true);
            }
        }
    }

    fn use_dir(&mut self, ctx: &mut GameContext, dx: i32, dy: i32) {
        ctx.map_window.center_cursor();
        ctx.map_window.move_cursor_relative(dx, dy);
        let at = ctx.map_window.cursor_coord();
        self.use_at(ctx, at);
    }

    /// Use what is at a cell: an actor with its own usecode, otherwise
    /// the top object.
    fn use_at(&mut self, ctx: &mut GameContext, at: MapCoord) {
        let (x, y) = (i32::from(at.x), i32::from(at.y));
        if !ctx.map_window.tile_is_black(&ctx.world, x, y, at.z, None) {
            let obj = seen_obj(ctx, ctx.world.get_obj(x, y, at.z, true, None));
            let actor = ctx.world.actors.actor_at(at).filter(|&a| ctx.actor_visible(a));
            let actor_usable = actor.is_some_and(|a| ctx.hooks.usecode.has_actor_usecode(&ctx.world, a));
            if obj.is_some() && !actor_usable {
                self.use_obj(ctx, obj);
                return;
            }
            if actor.is_some() {
                self.use_actor(ctx, at);
                return;
            }
        }
        ctx.scroll.display_string("nothing\n");
        self.end_action(ctx, true);
    }

    pub(super) fn use_obj(&mut self, ctx: &mut GameContext, obj: Option<ObjId>) {
        let Some(obj) = seen_obj(ctx, obj) else {
            ctx.scroll.display_string("nothing\n");
            self.end_action(ctx, true);
            return;
        };
        let name = ctx.world.objs.look_name(obj);
        ctx.scroll.display_string(&format!("{name}\n"));

        let player = ctx.player();
        let player_pos = ctx.player_pos();
        let in_inventory = ctx.world.objs.holder_actor(obj).is_some();
        let ranged = Self::is_ranged(ctx, SelectAction::Use);
        let loc = ctx.world.objs.root_map_coord(obj);
        let too_far = match (loc, player_pos) {
            (Some(l), Some(p)) => p.distance(l) > 1,
            _ => false,
        };

        if !ctx.hooks.usecode.has_usecode(&ctx.world, obj) {
            ctx.scroll.display_string("\nNot usable\n");
        } else if !in_inventory
            && !ranged
            && ctx.map_window.interface() == InterfaceType::Normal
            && too_far
        {
            ctx.scroll.display_string("\nOut of range!\n");
        } else if !in_inventory
            && !ranged
            && !ctx.map_window.can_get_obj(&ctx.world, player, obj)
            && loc != player_pos
        {
            ctx.scroll.display_string("\nCan't reach it\n");
        } else {
            let result = ctx.run_usecode(|u, s| u.use_obj(s, obj));
            ctx.subtract_movement_points(player, USE_COST);
            self.finish_use(ctx, result);
            return;
        }
        self.end_action(ctx, true);
    }

    /// Use an actor that has usecode of its own, e.g. a horse to mount.
    pub(super) fn use_actor(&mut self, ctx: &mut GameContext, at: MapCoord) {
        let (x, y) = (i32::from(at.x), i32::from(at.y));
        let actor = ctx.world.actors.actor_at(at).filter(|&a| {
            !ctx.map_window.tile_is_black(&ctx.world, x, y, at.z, None)
                && ctx.hooks.usecode.has_actor_usecode(&ctx.world, a)
        });
        let Some(actor) = actor else {
            ctx.scroll.display_string("nothing\n");
            self.end_action(ctx, true);
            return;
        };
        let name = ctx.world.actors.get(actor).map(|a| a.name.clone()).unwrap_or_default();
        ctx.scroll.display_string(&format!("{name}\n"));

        let player = ctx.player();
        let Some(from) = ctx.player_pos() else {
            self.end_action(ctx, true);
            return;
        };
        let blocked = ctx
            .world
            .line_test(from, x, y, LineTestFlags::HIT_UNPASSABLE, 0, None)
            .is_some_and(|hit| hit.hit != at);
        if from.distance(at) > 1 && ctx.map_window.interface() == InterfaceType::Normal {
            ctx.scroll.display_string("\nOut of range!\n");
        } else if blocked {
            ctx.scroll.display_string("\nBlocked.\n");
        } else {
            let result = ctx.run_usecode(|u, s| u.use_actor(s, actor));
            ctx.subtract_movement_points(player, USE_COST);
            self.finish_use(ctx, result);
            return;
        }
        self.end_action(ctx, true);
    }

    fn finish_use(&mut self, ctx: &mut GameContext, result: ScriptResult) {
        if let Some(prompt) = self.continue_script(ctx, ScriptOwner::Usecode, result) {
            if self.mode == Mode::Use {
                self.end_action(ctx, prompt);
            }
        }
    }
}
