//! One click that does the obvious thing with a cell.

use nuvie_core::MapCoord;
use nuvie_world::Alignment;

use super::{Events, InputValue, Mode, seen_obj};
use crate::session::GameContext;

impl Events {
    pub(super) fn multiuse_action(&mut self, ctx: &mut GameContext) {
        match self.input.value {
            InputValue::Target { loc, .. } => {
                self.set_mode(Mode::Move);
                self.multiuse(ctx, loc);
            }
            InputValue::Obj { obj, .. } => {
                if ctx.world.objs.is_readable(obj) {
                    self.set_mode(Mode::Look);
                    let prompt = self.look_obj(ctx, obj);
                    self.end_action(ctx, prompt);
                } else {
                    self.set_mode(Mode::Use);
                    self.use_obj(ctx, Some(obj));
                }
            }
            _ => self.end_action(ctx, true),
        }
    }

    /// Resolve a cell to one command: attack in combat, use an actor with
    /// usecode, talk to an actor, read a book, speak to a shrine, or use
    /// the top object.
    pub fn multiuse(&mut self, ctx: &mut GameContext, at: MapCoord) {
        if ctx.paused || self.mode != Mode::Move {
            return;
        }
        let (x, y) = (i32::from(at.x), i32::from(at.y));
        if ctx.map_window.tile_is_black(&ctx.world, x, y, at.z, None) {
            return;
        }
        let player = ctx.player();
        let in_combat = ctx.party.is_in_combat();
        let obj = seen_obj(ctx, ctx.world.get_obj(x, y, at.z, true, None));
        let actor = ctx
            .world
            .actors
            .actor_at(at)
            .filter(|&a| in_combat || ctx.actor_visible(a));

        if in_combat && (obj.is_some() || actor.is_some()) && actor != Some(player) {
            let friendly = actor
                .and_then(|a| ctx.world.actors.get(a))
                .is_some_and(|a| a.alignment == Alignment::Good);
            if !friendly {
                self.new_action(ctx, Mode::Attack);
                if self.mode == Mode::Attack {
                    if let Some(p) = ctx.map_window.map_to_window(at) {
                        ctx.map_window.move_cursor(p.x, p.y);
                    }
                    self.select_target(ctx, at);
                }
                return;
            }
        }

        if let Some(a) = actor {
            if ctx.hooks.usecode.has_actor_usecode(&ctx.world, a) {
                ctx.scroll.display_string("Use-");
                self.set_mode(Mode::Use);
                self.use_actor(ctx, at);
                return;
            }
            if a != player {
                if self.new_action(ctx, Mode::Talk) {
                    self.talk(ctx, Some(a));
                }
                return;
            }
        }

        let Some(obj) = obj else {
            return;
        };
        if ctx.world.objs.is_readable(obj) {
            ctx.scroll.display_string("Look-");
            self.set_mode(Mode::Look);
            let prompt = self.look_obj(ctx, obj);
            self.end_action(ctx, prompt);
        } else if ctx.world.objs.talks(obj) {
            ctx.scroll.display_string("Talk-");
            self.set_mode(Mode::Talk);
            self.talk_obj(ctx, obj);
        } else if self.new_action(ctx, Mode::Use) {
            self.select_obj(ctx, obj, None);
        }
    }
}
