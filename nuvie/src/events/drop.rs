use log::warn;
use nuvie_core::MapCoord;
use nuvie_world::{ObjId, ObjStatus};

use super::{DIGITS, Events, InputValue, Mode, ModeState};
use crate::session::GameContext;

impl Events {
    pub(super) fn drop_action(&mut self, ctx: &mut GameContext) {
        let ModeState::Drop { obj, qty, .. } = self.state else {
            self.end_action(ctx, true);
            return;
        };
        let Some(obj) = obj else {
            if !self.input.select_from_inventory {
                self.end_action(ctx, true);
                return;
            }
            match self.input.value {
                InputValue::Obj { obj, .. } => self.drop_select(ctx, obj),
                _ => {
                    ctx.scroll.display_string("nothing\n");
                    self.end_action(ctx, true);
                }
            }
            return;
        };
        let Some(qty) = qty else {
            let count = match &self.input.value {
                InputValue::Text(t) if t.trim().is_empty() => {
                    let all = ctx.world.objs.get(obj).map_or(0, |o| o.qty);
                    ctx.scroll.display_string(&all.to_string());
                    all
                }
                InputValue::Text(t) => t.trim().parse().unwrap_or(0),
                _ => 0,
            };
            self.drop_count(ctx, count);
            return;
        };
        match self.input.value {
            InputValue::Target { loc, .. } => self.drop(ctx, obj, qty, loc),
            _ => {
                ctx.scroll.display_string("Not possible\n");
                self.end_action(ctx, true);
            }
        }
    }

    /// The object to drop is known; ask how many when it is a stack.
    fn drop_select(&mut self, ctx: &mut GameContext, obj: ObjId) {
        if let ModeState::Drop { obj: held, .. } = &mut self.state {
            *held = Some(obj);
        }
        ctx.scroll
            .display_string(&format!("{}\n", ctx.world.objs.look_name(obj)));
        let qty = ctx.world.objs.get(obj).map_or(1, |o| o.qty);
        if ctx.world.objs.is_stackable(obj) && qty > 1 {
            ctx.scroll.display_string("How many? ");
            self.get_scroll_input(ctx, Some(DIGITS), false);
        } else {
            self.drop_count(ctx, 1);
        }
    }

    /// The quantity is known; ask where, unless the target came with a drag.
    fn drop_count(&mut self, ctx: &mut GameContext, count: u16) {
        ctx.scroll.display_string("\n");
        let ModeState::Drop {
            obj: Some(obj),
            target,
            ..
        } = self.state
        else {
            self.end_action(ctx, true);
            return;
        };
        if count == 0 {
            self.end_action(ctx, true);
            return;
        }
        let available = ctx.world.objs.get(obj).map_or(0, |o| o.qty);
        let count = count.min(available.max(1));
        if let ModeState::Drop { qty, .. } = &mut self.state {
            *qty = Some(count);
        }
        match target {
            Some(at) => {
                ctx.scroll.display_string("Location:");
                self.drop(ctx, obj, count, at);
            }
            None => self.get_target(ctx, "Location:"),
        }
    }

    /// Put `qty` of `obj` down at `at`: into a container lying there, or
    /// onto the map.
    fn drop(&mut self, ctx: &mut GameContext, obj: ObjId, qty: u16, at: MapCoord) {
        let player = ctx.player();
        let actor = ctx.world.objs.holder_actor(obj).unwrap_or(player);
        let (x, y) = (i32::from(at.x), i32::from(at.y));
        if let Err(e) = ctx.map_window.can_drop_or_move_obj(&ctx.world, x, y, actor, obj) {
            ctx.scroll.display_string(&format!("\n\n{e}\n"));
            self.end_action(ctx, true);
            return;
        }
        if !ctx.run_usecode(|u, s| u.drop_obj(s, obj, at)) {
            self.end_action(ctx, true);
            return;
        }

        let from_map = ctx.world.objs.get(obj).is_some_and(|o| o.is_on_map());
        let source = ctx.world.objs.root_map_coord(obj);
        let dropped = match ctx.world.objs.get_obj_from_stack(obj, qty) {
            Ok(d) => d,
            Err(e) => {
                warn!("drop refused: {e}");
                self.end_action(ctx, true);
                return;
            }
        };
        let world = &mut ctx.world;
        let moved = match world.get_obj(x, y, at.z, true, Some(dropped)) {
            Some(dest) if world.objs.can_store_obj(dest, dropped) => world.objs.moveto_container(dropped, dest),
            _ => world.objs.moveto_map(dropped, at),
        };
        if let Err(e) = moved {
            warn!("drop refused: {e}");
        }
        if !from_map {
            if let Some(o) = world.objs.get_mut(dropped) {
                o.status = o.status | ObjStatus::OK_TO_TAKE;
            }
        }

        match source {
            Some(src) if from_map => {
                let cost = if src.distance(at) > 1 { 6 } else { 5 };
                ctx.subtract_movement_points(player, cost);
            }
            _ => ctx.subtract_movement_points(actor, 3),
        }
        ctx.scroll.display_string("\n\n");
        ctx.scroll.display_prompt();
        self.end_action(ctx, false);
    }

    /// Drop by dragging an object onto a map cell.
    pub fn drop_drag(&mut self, ctx: &mut GameContext, obj: ObjId, at: MapCoord) {
        if !self.new_action(ctx, Mode::Drop) {
            return;
        }
        if let ModeState::Drop { target, .. } = &mut self.state {
            *target = Some(at);
        }
        let holder = ctx.world.objs.holder_actor(obj);
        self.select_obj(ctx, obj, holder);
    }
}
