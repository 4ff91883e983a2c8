use log::warn;
use nuvie_world::ObjId;

use super::{Events, InputValue, player_offset, seen_obj};
use crate::config::InterfaceType;
use crate::script::SelectAction;
use crate::session::GameContext;

const GET_COST: i16 = 3;

impl Events {
    pub(super) fn get_action(&mut self, ctx: &mut GameContext) {
        let obj = match self.input.value {
            InputValue::Obj { obj, .. } => Some(obj),
            InputValue::Direction { dx, dy, .. } => player_offset(ctx, dx, dy)
                .and_then(|at| ctx.map_window.get_obj_at_coord(&ctx.world, at, true)),
            InputValue::Target { loc, .. } => ctx.map_window.get_obj_at_coord(&ctx.world, loc, true),
            _ => None,
        };
        self.perform_get(ctx, obj);
        self.end_action(ctx, false);
    }

    /// Pick an object up into the player's inventory.
    fn perform_get(&mut self, ctx: &mut GameContext, obj: Option<ObjId>) {
        match seen_obj(ctx, obj) {
            None => ctx.scroll.display_string("nothing"),
            Some(obj) => {
                ctx.scroll.display_string(&ctx.world.objs.look_name(obj));
                let player = ctx.player();
                let ranged = Self::is_ranged(ctx, SelectAction::Get);
                let on_map = ctx.world.objs.get(obj).is_some_and(|o| o.is_on_map());
                let too_far = match (ctx.world.objs.root_map_coord(obj), ctx.player_pos()) {
                    (Some(l), Some(p)) => p.distance(l) > 1,
                    _ => false,
                };

                if !ctx.map_window.can_get_obj(&ctx.world, player, obj) {
                    ctx.scroll.display_string("\n\nCan't reach it.");
                } else if on_map
                    && !ranged
                    && too_far
                    && ctx.map_window.interface() == InterfaceType::Normal
                {
                    ctx.scroll.display_string("\n\nOut of range!");
                } else if !ctx.run_usecode(|u, s| u.get_obj(s, obj)) {
                    // the usecode explained the refusal
                    ctx.subtract_movement_points(player, GET_COST);
                    ctx.scroll.display_string("\n");
                    ctx.scroll.display_prompt();
                    return;
                } else if !ctx.world.objs.is_gettable(obj) {
                    ctx.scroll.display_string("\n\nNot possible");
                } else {
                    if let Err(e) = ctx.world.objs.moveto_inventory(obj, player) {
                        warn!("get refused: {e}");
                    }
                    ctx.subtract_movement_points(player, GET_COST);
                }
            }
        }
        ctx.scroll.display_string("\n\n");
        ctx.scroll.display_prompt();
        ctx.update_blacking();
    }
}
