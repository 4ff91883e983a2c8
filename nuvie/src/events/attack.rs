//! Attack and the combat toggle.

use super::{ATTACK_PASS_COST, Events, Mode};
use crate::session::GameContext;

impl Events {
    /// Put the cursor on the nearest foe the readied weapon reaches.
    pub(super) fn attack_select_init(&mut self, ctx: &mut GameContext) {
        ctx.map_window.center_cursor();
        let player = ctx.player();
        let Some(pos) = ctx.player_pos() else {
            return;
        };
        let foe = ctx
            .world
            .actors
            .iter()
            .filter(|a| {
                a.id != player
                    && a.is_on_map()
                    && a.alignment.is_hostile()
                    && ctx.actor_visible(a.id)
                    && ctx
                        .map_window
                        .is_on_screen(&ctx.world, i32::from(a.pos.x), i32::from(a.pos.y), a.pos.z)
                    && ctx.hooks.script.weapon_can_hit(&ctx.world, player, a.pos)
            })
            .min_by_key(|a| pos.distance(a.pos))
            .map(|a| a.pos);
        if let Some(p) = foe.and_then(|f| ctx.map_window.map_to_window(f)) {
            ctx.map_window.move_cursor(p.x, p.y);
        }
    }

    /// Attack whatever is under the cursor.
    pub(super) fn attack(&mut self, ctx: &mut GameContext) {
        let target = ctx.map_window.cursor_coord();
        let player = ctx.player();
        let (x, y) = (i32::from(target.x), i32::from(target.y));
        let black = ctx.map_window.tile_is_black(&ctx.world, x, y, target.z, None);
        let foe = ctx.map_window.get_actor_at_cursor(&ctx.world);

        if black {
            ctx.scroll.display_string("nothing!\n");
        } else {
            if foe == Some(player) {
                ctx.scroll.display_string("pass.\n");
                ctx.subtract_movement_points(player, ATTACK_PASS_COST);
                self.end_action(ctx, true);
                return;
            }
            match foe.filter(|&a| ctx.actor_visible(a)) {
                Some(a) => {
                    let name = ctx.world.actors.get(a).map(|a| a.name.clone()).unwrap_or_default();
                    ctx.scroll.display_string(&format!("{name}.\n"));
                }
                None => {
                    let what = Self::attack_target_name(ctx, x, y, target.z);
                    ctx.scroll.display_string(&format!("{what}.\n"));
                }
            }
        }
        ctx.map_window.set_show_cursor(false);
        ctx.run_script(|g, s| g.attack(s, target, foe));
        self.try_next_attack(ctx);
    }

    /// Name of the object under the cursor if its own cell is lit, else
    /// the terrain there.
    fn attack_target_name(ctx: &GameContext, x: i32, y: i32, z: u8) -> String {
        let world = &ctx.world;
        let named = ctx
            .map_window
            .get_obj_at_cursor(world)
            .filter(|&o| {
                world.objs.get(o).and_then(|obj| obj.map_coord()).is_none_or(|at| {
                    !ctx.map_window.tile_is_black(world, i32::from(at.x), i32::from(at.y), at.z, Some(o))
                })
            })
            .and_then(|o| world.objs.type_name(o));
        match named {
            Some(name) => name.to_owned(),
            None => world.tile_at(x, y, z).map_or_else(|| String::from("nothing"), |t| t.name.clone()),
        }
    }

    /// Chain into another attack with the next weapon, or end the turn.
    fn try_next_attack(&mut self, ctx: &mut GameContext) {
        let player = ctx.player();
        let alive = ctx.world.actors.get(player).is_some_and(|a| a.hp > 0);
        if !alive {
            self.end_action(ctx, true);
            return;
        }
        if !ctx.run_script(|g, s| g.select_next_weapon(s)) {
            ctx.subtract_movement_points(player, ATTACK_PASS_COST);
            self.end_action(ctx, true);
            return;
        }
        ctx.scroll.display_string("\nAttack-");
        ctx.map_window.set_show_cursor(true);
        self.mode = Mode::Attack;
    }

    /// Flip the party between combat and peace.
    pub(super) fn toggle_combat(&mut self, ctx: &mut GameContext) {
        let fight = !ctx.party.is_in_combat();
        ctx.party.set_in_combat(fight);
        if fight {
            ctx.scroll.display_string("Begin combat!\n\n");
        } else {
            ctx.scroll.display_string("Break off combat!\n\n");
            ctx.center_on_player();
        }
        ctx.scroll.display_prompt();
    }
}
