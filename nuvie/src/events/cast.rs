use super::{Events, InputValue, Mode, ScriptOwner};
use crate::session::GameContext;

impl Events {
    /// A key typed while the spell selector owns the keyboard.
    pub fn key_input(&mut self, ctx: &mut GameContext, c: char) {
        if ctx.paused || self.mode != Mode::KeyInput {
            return;
        }
        if ctx.run_magic(|m, s| m.spell_key(s, c)) {
            self.end_action(ctx, false);
            self.do_action(ctx);
        }
    }

    pub(super) fn cast_action(&mut self, ctx: &mut GameContext) {
        let done = if self.owns_continuation(ScriptOwner::Magic) {
            self.resume_with_input(ctx, ScriptOwner::Magic)
        } else if self.mode == Mode::Spell {
            match self.input.value {
                InputValue::SpellNum(Some(spell)) => {
                    let result = ctx.run_magic(|m, s| m.cast_spell_directly(s, spell));
                    self.continue_script(ctx, ScriptOwner::Magic, result)
                }
                _ => {
                    ctx.scroll.display_string("nothing\n");
                    Some(true)
                }
            }
        } else {
            let result = ctx.run_magic(|m, s| m.cast(s));
            self.continue_script(ctx, ScriptOwner::Magic, result)
        };
        if let Some(prompt) = done {
            self.end_action(ctx, prompt);
        }
    }

    /// Cast a known spell without going through the spell selector, e.g.
    /// from a scroll or wand.
    pub fn cast_spell_directly(&mut self, ctx: &mut GameContext, spell: u8) {
        if self.mode.is_input() {
            self.end_action(ctx, false);
        }
        if !self.new_action(ctx, Mode::Spell) {
            return;
        }
        self.input.value = InputValue::SpellNum(Some(spell));
        self.do_action(ctx);
    }
}
