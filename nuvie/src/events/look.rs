use nuvie_core::MapCoord;
use nuvie_world::{ActorId, ObjId};

use super::{Events, InputValue, seen_obj};
use crate::map_window::look_map;
use crate::session::GameContext;

impl Events {
    pub(super) fn look_action(&mut self, ctx: &mut GameContext) {
        match self.input.value {
            InputValue::Obj { obj, .. } if seen_obj(ctx, Some(obj)).is_some() => {
                let prompt = self.look_obj(ctx, obj);
                self.end_action(ctx, prompt);
            }
            InputValue::Target { actor: Some(a), .. } if ctx.actor_visible(a) => {
                look_actor(ctx, a);
                self.end_action(ctx, true);
            }
            InputValue::Target { loc, .. } => {
                let prompt = self.look_at(ctx, loc);
                self.end_action(ctx, prompt);
            }
            _ => {
                let at = ctx.map_window.cursor_coord();
                let prompt = self.look_at(ctx, at);
                self.end_action(ctx, prompt);
            }
        }
    }

    /// Describe whatever is seen at a cell: an actor before the top
    /// object before the terrain.
    fn look_at(&mut self, ctx: &mut GameContext, at: MapCoord) -> bool {
        let (x, y) = (i32::from(at.x), i32::from(at.y));
        let obj = seen_obj(ctx, ctx.world.get_obj(x, y, at.z, true, None));
        if ctx.map_window.tile_is_black(&ctx.world, x, y, at.z, None) && obj.is_none() {
            ctx.scroll.display_string("Thou dost see darkness.\n");
            return true;
        }
        if let Some(a) = ctx.world.actors.actor_at(at).filter(|&a| ctx.actor_visible(a)) {
            look_actor(ctx, a);
            return true;
        }
        if let Some(obj) = obj {
            return self.look_obj(ctx, obj);
        }
        let what = look_map(&ctx.world, at);
        ctx.scroll.display_string(&format!("Thou dost see {what}\n"));
        true
    }

    /// Describe an object and search it when the player stands next to it.
    /// False when the description already ended with a prompt.
    pub(super) fn look_obj(&mut self, ctx: &mut GameContext, obj: ObjId) -> bool {
        if !ctx.run_script(|g, s| g.look_obj(s, obj)) {
            ctx.scroll.display_prompt();
            return false;
        }
        search(ctx, obj);
        true
    }
}

fn look_actor(ctx: &mut GameContext, actor: ActorId) {
    let name = ctx.world.actors.get(actor).map(|a| a.name.clone()).unwrap_or_default();
    ctx.scroll.display_string(&format!("Thou dost see {name}\n"));
}

fn search(ctx: &mut GameContext, obj: ObjId) {
    if !ctx.world.objs.is_searchable(obj) {
        return;
    }
    let Some(loc) = ctx.world.objs.get(obj).and_then(|o| o.map_coord()) else {
        return;
    };
    if !ctx.player_pos().is_some_and(|p| p.z == loc.z && p.distance(loc) <= 1) {
        return;
    }
    ctx.scroll.display_string("\nSearching here, you find ");
    if ctx.run_usecode(|u, s| u.search_obj(s, obj)) {
        ctx.scroll.display_string(".\n");
        ctx.update_blacking();
    } else {
        ctx.scroll.display_string("nothing.\n");
    }
}
