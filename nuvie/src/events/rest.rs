use log::debug;

use super::{DIGITS, Events, InputValue, Mode, ModeState};
use crate::party::RestPlan;
use crate::session::GameContext;

impl Events {
    /// Ask how long to rest, if the party may rest here.
    pub(super) fn rest(&mut self, ctx: &mut GameContext) {
        ctx.scroll.display_string("Rest");
        if let Err(why) = ctx.party.can_rest(&ctx.world) {
            ctx.scroll.display_string(&format!("{why}\n"));
            self.end_action(ctx, true);
            return;
        }
        ctx.scroll.display_string("\nHow many hours? ");
        self.get_scroll_input(ctx, Some(DIGITS), false);
    }

    pub(super) fn rest_action(&mut self, ctx: &mut GameContext) {
        let hours = self.state.rest_hours();
        let n = match &self.input.value {
            InputValue::Text(t) if t.trim().is_empty() => {
                if hours == 0 {
                    ctx.scroll.display_string("0");
                }
                0
            }
            InputValue::Text(t) => t.trim().parse().unwrap_or(0),
            v if hours != 0 => {
                // guard picked on the map
                v.actor()
                    .and_then(|a| ctx.party.index_of(a))
                    .map_or(0, |i| u16::try_from(i + 1).unwrap_or(0))
            }
            _ => 0,
        };
        self.rest_input(ctx, n);
    }

    /// Take the answer to the current rest prompt: hours first, then the
    /// 1-based party member keeping watch.
    fn rest_input(&mut self, ctx: &mut GameContext, n: u16) {
        ctx.scroll.cancel_input();
        ctx.scroll.display_string("\n");
        let ModeState::Rest { hours, .. } = self.state else {
            self.end_action(ctx, true);
            return;
        };
        if hours == 0 {
            self.state = ModeState::Rest { hours: n, guard: 0 };
            if n == 0 {
                self.end_action(ctx, true);
                return;
            }
            if ctx.party.size() > 1 {
                ctx.scroll.display_string("Who will guard? ");
                self.get_target(ctx, "");
                self.get_scroll_input(ctx, Some(DIGITS), true);
                return;
            }
        } else {
            let guard = if usize::from(n) > ctx.party.size() { 0 } else { n };
            self.state = ModeState::Rest { hours, guard };
            let name = (guard > 0)
                .then(|| ctx.party.member(usize::from(guard - 1)))
                .flatten()
                .and_then(|a| ctx.world.actors.get(a))
                .map(|a| a.name.clone());
            match name {
                Some(name) => ctx.scroll.display_string(&format!("{name}\n")),
                None => ctx.scroll.display_string("none\n"),
            }
            ctx.scroll.display_string("\n");
        }
        self.rest_gather(ctx);
    }

    fn rest_gather(&mut self, ctx: &mut GameContext) {
        let ModeState::Rest { hours, guard } = self.state else {
            return;
        };
        ctx.party.rest_gather(RestPlan {
            hours,
            guard: (guard > 0).then(|| usize::from(guard - 1)),
        });
        self.set_mode(Mode::Wait);
    }

    /// Called on each tick while in [`Mode::Wait`]: the party has
    /// gathered, so carry out what it was waiting for.
    pub fn finish_wait(&mut self, ctx: &mut GameContext) {
        if self.mode != Mode::Wait {
            return;
        }
        self.mode = self.last_mode;
        if self.mode == Mode::Rest {
            if let Some(plan) = ctx.party.rest_sleep(&mut ctx.world, &mut ctx.clock) {
                debug!("party rested {} hours", plan.hours);
            }
        }
        self.end_action(ctx, true);
    }
}
