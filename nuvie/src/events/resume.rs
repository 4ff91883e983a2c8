//! Driving suspended scripts: arming the capture a script asks for and
//! feeding the captured value back.

use log::warn;
use nuvie_core::Point;

use super::{Continuation, DIGITS, Events, InputValue, Mode, ScriptOwner};
use crate::script::{ContinuationToken, ResumeValue, ScriptResult, SuspendReason};
use crate::session::GameContext;

impl Events {
    /// Follow a script result until it finishes or needs input.
    ///
    /// Returns `Some(prompt)` once the script is done, `None` while it is
    /// suspended waiting for a capture.
    pub(super) fn continue_script(
        &mut self,
        ctx: &mut GameContext,
        owner: ScriptOwner,
        mut result: ScriptResult,
    ) -> Option<bool> {
        loop {
            match result {
                ScriptResult::Done { prompt } => {
                    self.continuation = None;
                    return Some(prompt);
                }
                ScriptResult::Suspended {
                    reason: SuspendReason::Talk(actor),
                    token,
                } => {
                    self.perform_talk(ctx, actor);
                    result = resume_owner(ctx, owner, token, ResumeValue::Nil);
                }
                ScriptResult::Suspended { reason, token } => {
                    self.continuation = Some(Continuation { owner, reason, token });
                    self.arm_capture(ctx, reason);
                    return None;
                }
            }
        }
    }

    fn arm_capture(&mut self, ctx: &mut GameContext, reason: SuspendReason) {
        match reason {
            SuspendReason::Direction => self.get_direction(ctx, ""),
            SuspendReason::Obj | SuspendReason::Location => self.get_target(ctx, ""),
            SuspendReason::InventoryObj => {
                self.get_target(ctx, "");
                self.move_cursor_to_inventory(ctx);
            }
            SuspendReason::SpellNum => self.get_scroll_input(ctx, Some(DIGITS), false),
            SuspendReason::Talk(_) => {}
        }
    }

    /// Resume `owner`'s suspended script with the captured input.
    /// `None` if it suspended again or there was nothing to resume.
    pub(super) fn resume_with_input(&mut self, ctx: &mut GameContext, owner: ScriptOwner) -> Option<bool> {
        let cont = self.continuation.take_if(|c| c.owner == owner)?;
        let value = self.resume_value(cont.reason);
        let result = resume_owner(ctx, owner, cont.token, value);
        self.continue_script(ctx, owner, result)
    }

    /// Resume `owner`'s script with no value so it can clean up. Returns
    /// false if it had nothing suspended.
    pub(super) fn resume_with_nil(&mut self, ctx: &mut GameContext, owner: ScriptOwner) -> bool {
        let Some(cont) = self.continuation.take_if(|c| c.owner == owner) else {
            return false;
        };
        let result = resume_owner(ctx, owner, cont.token, ResumeValue::Nil);
        if result.is_suspended() {
            warn!("{owner:?} script suspended again after being cancelled; dropping it");
        }
        true
    }

    fn resume_value(&self, reason: SuspendReason) -> ResumeValue {
        let value = match reason {
            SuspendReason::Direction => match self.input.value {
                InputValue::Direction { dx, dy, .. } => Some(ResumeValue::Direction(Point::new(dx, dy))),
                _ => None,
            },
            SuspendReason::Obj | SuspendReason::InventoryObj => self.input.value.obj().map(ResumeValue::Obj),
            SuspendReason::Location => match self.input.value {
                InputValue::Target { loc, .. } => Some(ResumeValue::Location(loc)),
                _ => None,
            },
            SuspendReason::SpellNum => match &self.input.value {
                InputValue::SpellNum(n) => n.map(ResumeValue::SpellNum),
                InputValue::Text(t) => t.trim().parse().ok().map(ResumeValue::SpellNum),
                _ => None,
            },
            SuspendReason::Talk(_) => None,
        };
        value.unwrap_or_else(|| {
            warn!("script waiting for {reason:?} got {:?}", self.input.value);
            ResumeValue::Nil
        })
    }

    // -----------------------------------------------------------------------
    // Script mode
    // -----------------------------------------------------------------------

    /// Run a free-standing script started outside any command, such as a
    /// timed event. Only starts from Move. Returns whether it was taken.
    pub fn run_script(&mut self, ctx: &mut GameContext, result: ScriptResult) -> bool {
        if ctx.paused || self.mode != Mode::Move {
            return false;
        }
        self.set_mode(Mode::Script);
        if let Some(prompt) = self.continue_script(ctx, ScriptOwner::Script, result) {
            self.end_action(ctx, prompt);
        }
        true
    }

    pub(super) fn script_action(&mut self, ctx: &mut GameContext) {
        if !self.owns_continuation(ScriptOwner::Script) {
            self.end_action(ctx, true);
            return;
        }
        if let Some(prompt) = self.resume_with_input(ctx, ScriptOwner::Script) {
            self.end_action(ctx, prompt);
        }
    }
}

fn resume_owner(
    ctx: &mut GameContext,
    owner: ScriptOwner,
    token: ContinuationToken,
    value: ResumeValue,
) -> ScriptResult {
    match owner {
        ScriptOwner::Usecode => ctx.run_usecode(|u, s| u.resume(s, token, value)),
        ScriptOwner::Magic => ctx.run_magic(|m, s| m.resume(s, token, value)),
        ScriptOwner::Script => ctx.run_script(|g, s| g.resume(s, token, value)),
    }
}
