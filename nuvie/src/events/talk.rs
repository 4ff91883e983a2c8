use nuvie_world::{ActorId, ActorStatus, ObjId};

use super::{Events, InputValue, seen_obj};
use crate::session::GameContext;

impl Events {
    pub(super) fn talk_action(&mut self, ctx: &mut GameContext) {
        match self.input.value {
            InputValue::Obj { obj, .. } => self.talk_obj(ctx, obj),
            InputValue::Target { actor: Some(a), .. } if ctx.actor_visible(a) => self.talk(ctx, Some(a)),
            _ => self.talk_cursor(ctx),
        }
    }

    fn talk_cursor(&mut self, ctx: &mut GameContext) {
        let actor = ctx
            .map_window
            .get_actor_at_cursor(&ctx.world)
            .filter(|&a| ctx.actor_visible(a));
        if actor.is_some() {
            self.talk(ctx, actor);
            return;
        }
        let obj = seen_obj(ctx, ctx.map_window.get_obj_at_cursor(&ctx.world));
        match obj {
            Some(o) if ctx.world.objs.talks(o) => self.talk_obj(ctx, o),
            _ => self.talk(ctx, None),
        }
    }

    /// Hold a conversation. Conversations run to completion before this
    /// returns, so the command always ends here.
    pub(super) fn talk(&mut self, ctx: &mut GameContext, actor: Option<ActorId>) {
        self.end_action(ctx, false);
        match actor {
            Some(a) => {
                self.perform_talk(ctx, a);
            }
            None => ctx.scroll.display_string("nothing!\n"),
        }
        self.end_action(ctx, true);
    }

    /// Talk to an actor. False if no conversation took place.
    pub(super) fn perform_talk(&mut self, ctx: &mut GameContext, actor: ActorId) -> bool {
        let Some(a) = ctx.world.actors.get(actor) else {
            return false;
        };
        let name = a.name.clone();
        let unresponsive =
            a.is(ActorStatus::ASLEEP) || a.is(ActorStatus::PARALYZED) || a.alignment.is_hostile();
        let pos = a.pos;

        if actor == ctx.player() {
            ctx.scroll.display_string(&format!("{name}\nTalking to yourself?\n"));
            return false;
        }
        let (x, y) = (i32::from(pos.x), i32::from(pos.y));
        if ctx.party.contains(actor) && !ctx.map_window.is_on_screen(&ctx.world, x, y, pos.z) {
            ctx.scroll.display_string(&format!("{name}\nNot on screen.\n"));
            return false;
        }
        if unresponsive {
            ctx.scroll.display_string(&format!("{name}\n\nNo response\n"));
            return false;
        }
        ctx.scroll.display_string(&format!("{name}\n"));
        if !ctx.run_script(|g, s| g.start_conversation(s, actor)) {
            ctx.scroll.display_string("Funny, no response.\n");
            return false;
        }
        true
    }

    /// Shrines and statues speak for the actor numbered by their quality.
    pub(super) fn talk_obj(&mut self, ctx: &mut GameContext, obj: ObjId) {
        if ctx.world.objs.talks(obj) {
            let speaker = ctx
                .world
                .objs
                .get(obj)
                .and_then(|o| ctx.world.actors.by_number(o.quality));
            self.talk(ctx, speaker);
            return;
        }
        ctx.scroll.display_string("nothing!\n");
        self.end_action(ctx, true);
    }
}
