//! The action state machine.
//!
//! Every player command runs as a [`Mode`]. A mode either completes at once
//! or asks for a target by switching into [`Mode::Input`] (or
//! [`Mode::KeyInput`]) with the command remembered in `last_mode`.
//! Confirming the target calls [`Events::do_action`], which returns to the
//! remembered mode and completes it; [`Events::cancel_action`] unwinds the
//! same way. Scripts that need input mid-way suspend and are resumed from
//! `do_action` once the capture they asked for is filled.

mod attack;
mod cast;
mod drop;
mod get;
mod input;
mod look;
mod mode;
mod multiuse;
mod push;
mod rest;
mod resume;
mod talk;
mod use_obj;

pub use input::{InputValue, PendingInput};
pub use mode::{Mode, ModeState};

use log::debug;
use nuvie_core::{MapCoord, wrapped_offset};
use nuvie_world::{ActorId, ObjId};

use crate::config::InterfaceType;
use crate::script::{ContinuationToken, SelectAction, SuspendReason};
use crate::session::GameContext;

/// Characters accepted at numeric prompts.
const DIGITS: &str = "0123456789";

/// Furthest a spell target may be from the caster.
const MAX_CAST_RANGE: u16 = 7;

/// Movement points lost by an attack that hits nothing or is passed.
const ATTACK_PASS_COST: i16 = 10;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum ScriptOwner {
    Usecode,
    Magic,
    Script,
}

/// A suspended script and what it is waiting for.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) struct Continuation {
    pub owner: ScriptOwner,
    pub reason: SuspendReason,
    pub token: ContinuationToken,
}

#[derive(Debug, Default)]
pub struct Events {
    mode: Mode,
    last_mode: Mode,
    state: ModeState,
    input: PendingInput,
    continuation: Option<Continuation>,
}

impl Events {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// The command an input capture is gathering for.
    #[inline]
    pub fn last_mode(&self) -> Mode {
        self.last_mode
    }

    pub fn state(&self) -> &ModeState {
        &self.state
    }

    pub fn input(&self) -> &PendingInput {
        &self.input
    }

    /// Whether a script is suspended waiting for input.
    pub fn has_continuation(&self) -> bool {
        self.continuation.is_some()
    }

    pub fn is_selecting_from_inventory(&self) -> bool {
        self.mode == Mode::Input && self.input.select_from_inventory
    }

    pub(crate) fn set_mode(&mut self, new: Mode) {
        if new == Mode::Wait && matches!(self.last_mode, Mode::Equip | Mode::Rest) {
            self.last_mode = self.mode;
        } else if new.is_input() {
            self.last_mode = self.mode;
        } else {
            self.last_mode = Mode::Move;
        }
        debug!(
            "mode {} -> {} (last {})",
            self.mode.name(),
            new.name(),
            self.last_mode.name()
        );
        self.mode = new;
        if new.is_input() {
            self.input.reset();
        }
    }

    fn owns_continuation(&self, owner: ScriptOwner) -> bool {
        self.continuation.is_some_and(|c| c.owner == owner)
    }

    // -----------------------------------------------------------------------
    // Input capture
    // -----------------------------------------------------------------------

    /// Ask for a single step away from the player.
    fn get_direction(&mut self, ctx: &mut GameContext, prompt: &str) {
        self.set_mode(Mode::Input);
        ctx.scroll.display_string(prompt);
        self.input.get_direction = true;
        self.input.select_from_inventory = false;
        ctx.map_window.center_cursor();
        ctx.map_window.set_show_cursor(false);
        ctx.map_window.set_show_use_cursor(true);
        self.input.target_init = Some(ctx.map_window.cursor_coord());
    }

    /// Ask for a step away from `from` instead of the player.
    fn get_direction_from(&mut self, ctx: &mut GameContext, from: MapCoord, prompt: &str) {
        self.get_direction(ctx, prompt);
        if let Some(p) = ctx.map_window.map_to_window(from) {
            ctx.map_window.move_cursor(p.x, p.y);
        }
        self.input.target_init = Some(from);
        if self.input_really_needs_direction(ctx) {
            if !ctx.config.direction_selects_target {
                ctx.map_window.set_show_cursor(true);
            }
            ctx.map_window.set_show_use_cursor(false);
        }
    }

    /// Ask for any map cell.
    fn get_target(&mut self, ctx: &mut GameContext, prompt: &str) {
        self.set_mode(Mode::Input);
        ctx.scroll.display_string(prompt);
        self.input.get_direction = false;
        self.input.select_from_inventory = false;
        ctx.map_window.center_cursor();
        ctx.map_window.set_show_cursor(true);
    }

    /// Read a line of text. With `with_cursor` the map cursor stays armed
    /// from a previous capture.
    fn get_scroll_input(&mut self, ctx: &mut GameContext, allowed: Option<&str>, with_cursor: bool) {
        if !with_cursor {
            self.set_mode(Mode::Input);
        }
        self.input.get_text = true;
        ctx.scroll.set_input_mode(allowed);
    }

    fn move_cursor_to_inventory(&mut self, ctx: &mut GameContext) {
        self.input.select_from_inventory = true;
        ctx.map_window.set_show_cursor(false);
        ctx.map_window.set_show_use_cursor(false);
    }

    /// Whether the capture wants one step rather than a free cell.
    fn input_really_needs_direction(&self, ctx: &GameContext) -> bool {
        (self.input.get_direction
            && (ctx.map_window.interface() == InterfaceType::Normal || self.last_mode == Mode::Cast))
            || self.state.push_actor().is_some()
    }

    fn is_ranged(ctx: &GameContext, action: SelectAction) -> bool {
        ctx.hooks.script.is_ranged_select(action)
    }

    // -----------------------------------------------------------------------
    // Protocol
    // -----------------------------------------------------------------------

    /// Start a command. Returns false when nothing was started: the game is
    /// paused, or another command was in progress and has been cancelled.
    pub fn new_action(&mut self, ctx: &mut GameContext, new: Mode) -> bool {
        if ctx.paused {
            return false;
        }
        if self.mode == Mode::Attack && new == Mode::Attack {
            self.do_action(ctx);
            return self.mode == Mode::Attack;
        }
        if self.mode == Mode::Input && new == self.last_mode {
            self.do_action(ctx);
            return self.mode != Mode::Move;
        }
        if !matches!(self.mode, Mode::Move | Mode::Equip) {
            self.cancel_action(ctx);
            return false;
        }

        self.set_mode(new);
        self.input.reset();
        match new {
            Mode::Cast => {
                ctx.scroll.display_string("Cast-");
                if ctx.run_magic(|m, s| m.start_new_spell(s)) {
                    self.set_mode(Mode::KeyInput);
                } else {
                    self.end_action(ctx, true);
                    return false;
                }
            }
            Mode::Spell => {}
            Mode::Look => self.get_target(ctx, "Look-"),
            Mode::Talk => self.get_target(ctx, "Talk-"),
            Mode::Use => {
                if Self::is_ranged(ctx, SelectAction::Use) {
                    self.get_target(ctx, "Use-");
                } else {
                    self.get_direction(ctx, "Use-");
                }
            }
            Mode::Get => {
                if Self::is_ranged(ctx, SelectAction::Get) {
                    self.get_target(ctx, "Get-");
                } else {
                    self.get_direction(ctx, "Get-");
                }
            }
            Mode::MultiUse => {
                self.get_target(ctx, "");
                if ctx.party.is_in_combat() {
                    self.attack_select_init(ctx);
                }
            }
            Mode::Attack => {
                ctx.scroll.display_string("Attack-");
                self.attack_select_init(ctx);
                ctx.map_window.set_show_cursor(true);
            }
            Mode::Push => {
                self.state = ModeState::Push {
                    obj: None,
                    actor: None,
                    in_inventory: false,
                };
                if Self::is_ranged(ctx, SelectAction::Move) {
                    self.get_target(ctx, "Move-");
                } else {
                    self.get_direction(ctx, "Move-");
                }
            }
            Mode::Drop => {
                self.state = ModeState::Drop {
                    obj: None,
                    qty: None,
                    target: None,
                };
                self.get_target(ctx, "Drop-");
                self.move_cursor_to_inventory(ctx);
            }
            Mode::Equip => self.move_cursor_to_inventory(ctx),
            Mode::Rest => {
                self.state = ModeState::Rest { hours: 0, guard: 0 };
                self.rest(ctx);
            }
            Mode::Combat => {
                self.toggle_combat(ctx);
                self.set_mode(Mode::Move);
            }
            Mode::Move | Mode::Wait | Mode::Input | Mode::KeyInput | Mode::Script => {
                self.cancel_action(ctx);
                return false;
            }
        }
        true
    }

    /// Complete the current step with whatever has been captured.
    pub fn do_action(&mut self, ctx: &mut GameContext) {
        if ctx.paused {
            return;
        }
        match self.mode {
            Mode::Move => {
                ctx.scroll.display_string("what?\n");
                self.end_action(ctx, true);
            }
            Mode::Input => self.do_input(ctx),
            Mode::KeyInput => {
                self.end_action(ctx, false);
                self.do_action(ctx);
            }
            Mode::Look => self.look_action(ctx),
            Mode::Talk => self.talk_action(ctx),
            Mode::Use => self.use_action(ctx),
            Mode::Get => self.get_action(ctx),
            Mode::Attack => self.attack(ctx),
            Mode::Push => self.push_action(ctx),
            Mode::Drop => self.drop_action(ctx),
            Mode::Rest => self.rest_action(ctx),
            Mode::Cast | Mode::Spell => self.cast_action(ctx),
            Mode::MultiUse => self.multiuse_action(ctx),
            Mode::Script => self.script_action(ctx),
            // finishes on the next tick
            Mode::Wait => {}
            Mode::Equip | Mode::Combat => self.cancel_action(ctx),
        }
    }

    fn do_input(&mut self, ctx: &mut GameContext) {
        if self.input.get_text {
            if self.last_mode == Mode::Rest && self.state.rest_hours() != 0 && !ctx.scroll.has_input() {
                // the guard was picked on the map
                let at = ctx.map_window.cursor_coord();
                self.select_target(ctx, at);
            } else {
                self.input.value = InputValue::Text(ctx.scroll.take_input());
                self.end_action(ctx, false);
                self.do_action(ctx);
            }
        } else if self.input.select_from_inventory {
            let player = ctx.player();
            match ctx.world.objs.inventory(player).first().copied() {
                Some(obj) => self.select_obj(ctx, obj, Some(player)),
                None => {
                    self.input.value = InputValue::None;
                    self.end_action(ctx, false);
                    self.do_action(ctx);
                }
            }
        } else {
            let at = ctx.map_window.cursor_coord();
            self.select_target(ctx, at);
        }
    }

    /// Abort the current step. Inside an input capture this unwinds to the
    /// command that asked for it and cancels that too.
    pub fn cancel_action(&mut self, ctx: &mut GameContext) {
        if ctx.paused {
            return;
        }
        match self.mode {
            Mode::Input => {
                let holding = self.state.push_obj().is_some() || self.state.push_actor().is_some();
                if self.last_mode == Mode::Push && holding {
                    let in_inventory = matches!(self.state, ModeState::Push { in_inventory: true, .. });
                    ctx.scroll
                        .display_string(if in_inventory { "nobody.\n" } else { "nowhere.\n" });
                    self.end_action(ctx, false);
                    self.end_action(ctx, true);
                    return;
                }
                self.end_action(ctx, false);
                self.cancel_action(ctx);
                return;
            }
            Mode::KeyInput => {
                self.end_action(ctx, false);
                self.cancel_action(ctx);
                return;
            }
            Mode::Wait => return,
            Mode::Move => {
                let player = ctx.player();
                if let Some(a) = ctx.world.actors.get_mut(player) {
                    a.movement_points = 0;
                }
            }
            Mode::Cast | Mode::Spell => {
                if !self.resume_with_nil(ctx, ScriptOwner::Magic) {
                    ctx.scroll.display_string("nothing\n");
                }
            }
            Mode::Use => {
                if !self.resume_with_nil(ctx, ScriptOwner::Usecode) {
                    ctx.scroll.display_string("what?\n");
                }
            }
            Mode::Script => {
                self.resume_with_nil(ctx, ScriptOwner::Script);
            }
            Mode::Equip => {
                self.end_action(ctx, false);
                return;
            }
            Mode::Attack => {
                ctx.scroll.display_string("what?\n");
                let player = ctx.player();
                ctx.subtract_movement_points(player, ATTACK_PASS_COST);
            }
            _ => ctx.scroll.display_string("what?\n"),
        }
        self.end_action(ctx, true);
    }

    /// Common epilogue of every step. Leaves an input capture for the
    /// command that armed it, anything else for Move, and always
    /// regenerates visibility.
    pub fn end_action(&mut self, ctx: &mut GameContext, prompt: bool) {
        if prompt {
            ctx.scroll.display_string("\n");
            ctx.scroll.display_prompt();
        }
        if !self.mode.is_input() {
            self.state = ModeState::Idle;
        }
        if matches!(self.mode, Mode::Equip | Mode::Attack) {
            ctx.map_window.set_show_cursor(false);
        }
        if self.mode.is_input() {
            if self.input.get_text && ctx.scroll.is_input_active() {
                ctx.scroll.cancel_input();
            }
            self.mode = self.last_mode;
            self.input.get_text = false;
            self.input.get_direction = false;
            ctx.map_window.set_show_cursor(false);
            ctx.map_window.set_show_use_cursor(false);
        } else {
            self.set_mode(Mode::Move);
        }
        ctx.update_blacking();
    }

    // -----------------------------------------------------------------------
    // Selection
    // -----------------------------------------------------------------------

    /// Confirm a step (dx, dy) from the capture origin.
    pub fn select_direction(&mut self, ctx: &mut GameContext, dx: i32, dy: i32) {
        if self.mode != Mode::Input {
            return;
        }
        self.input.value = InputValue::Direction {
            dx,
            dy,
            actor: ctx.map_window.get_actor_at_cursor(&ctx.world),
            obj: ctx.map_window.get_obj_at_cursor(&ctx.world),
        };
        self.end_action(ctx, false);
        self.do_action(ctx);
    }

    /// Confirm a map cell. Direction captures convert it to a step from
    /// their origin.
    pub fn select_target(&mut self, ctx: &mut GameContext, at: MapCoord) {
        if self.mode == Mode::Input && self.input.get_direction {
            let origin = self.input.target_init.or_else(|| ctx.player_pos()).unwrap_or(at);
            let w = i32::from(ctx.world.map.width(at.z));
            let h = i32::from(ctx.world.map.height(at.z));
            let dx = wrapped_offset(i32::from(origin.x), i32::from(at.x), w);
            let dy = wrapped_offset(i32::from(origin.y), i32::from(at.y), h);
            self.select_direction(ctx, dx, dy);
            return;
        }
        if self.mode == Mode::Input {
            let (x, y) = (i32::from(at.x), i32::from(at.y));
            let black = ctx.map_window.tile_is_black(&ctx.world, x, y, at.z, None);
            self.input.value = InputValue::Target {
                loc: at,
                actor: if black { None } else { ctx.world.actors.actor_at(at) },
                obj: ctx.map_window.get_obj_at_coord(&ctx.world, at, true),
            };
            self.end_action(ctx, false);
        }
        self.do_action(ctx);
    }

    /// Confirm an object picked from an inventory or container.
    pub fn select_obj(&mut self, ctx: &mut GameContext, obj: ObjId, actor: Option<ActorId>) {
        if self.mode != Mode::Input {
            return;
        }
        self.input.value = InputValue::Obj { obj, actor };
        self.end_action(ctx, false);
        self.do_action(ctx);
    }

    /// Confirm the nth item of the player's inventory.
    pub fn select_inventory_slot(&mut self, ctx: &mut GameContext, slot: usize) {
        let player = ctx.player();
        if let Some(obj) = ctx.world.objs.inventory(player).get(slot).copied() {
            self.select_obj(ctx, obj, Some(player));
        }
    }

    /// Confirm an actor, e.g. from a party portrait.
    pub fn select_actor(&mut self, ctx: &mut GameContext, actor: ActorId) {
        if self.mode != Mode::Input {
            return;
        }
        let Some(loc) = ctx.world.actors.get(actor).map(|a| a.pos) else {
            return;
        };
        self.input.value = InputValue::Target {
            loc,
            actor: Some(actor),
            obj: None,
        };
        self.end_action(ctx, false);
        self.do_action(ctx);
    }

    pub fn select_party_member(&mut self, ctx: &mut GameContext, index: usize) {
        if let Some(actor) = ctx.party.member(index) {
            self.select_actor(ctx, actor);
        }
    }

    /// Confirm a spell number, or none.
    pub fn select_spell_num(&mut self, ctx: &mut GameContext, spell: Option<u8>) {
        if self.mode == Mode::Input {
            self.end_action(ctx, false);
        }
        self.input.value = InputValue::SpellNum(spell);
        self.do_action(ctx);
    }

    // -----------------------------------------------------------------------
    // Movement
    // -----------------------------------------------------------------------

    /// A direction key: moves the cursor while a target is wanted,
    /// otherwise walks the player.
    pub fn move_relative(&mut self, ctx: &mut GameContext, dx: i32, dy: i32) {
        if ctx.paused {
            return;
        }
        let current = if self.last_mode == Mode::MultiUse && ctx.party.is_in_combat() {
            Mode::Attack
        } else {
            self.mode
        };
        let cursor = ctx.map_window.cursor();
        let next = ctx.map_window.window_to_map(cursor.x + dx, cursor.y + dy);
        match current {
            Mode::Attack => {
                let player = ctx.player();
                if ctx.hooks.script.weapon_can_hit(&ctx.world, player, next) {
                    ctx.map_window.move_cursor_relative(dx, dy);
                }
            }
            Mode::Equip => ctx.map_window.move_cursor_relative(dx, dy),
            Mode::Input => {
                let selects = ctx.config.direction_selects_target;
                let needs_dir = self.input_really_needs_direction(ctx);
                if !selects && needs_dir && self.input.target_init.is_some_and(|t| t.distance(next) > 1) {
                    return;
                }
                if self.last_mode == Mode::Cast
                    && ctx.player_pos().is_some_and(|p| p.distance(next) > MAX_CAST_RANGE)
                {
                    return;
                }
                ctx.map_window.move_cursor_relative(dx, dy);
                if selects && needs_dir {
                    self.select_direction(ctx, dx, dy);
                }
            }
            Mode::Move => self.walk(ctx, dx, dy),
            _ => {}
        }
    }

    /// Step the player onto a free neighbouring cell.
    fn walk(&mut self, ctx: &mut GameContext, dx: i32, dy: i32) {
        let player = ctx.player();
        let Some(pos) = ctx.player_pos() else {
            return;
        };
        let to = ctx
            .world
            .map
            .wrap_coord(i32::from(pos.x) + dx, i32::from(pos.y) + dy, pos.z);
        let (x, y) = (i32::from(to.x), i32::from(to.y));
        if !ctx.world.is_passable(x, y, to.z, None) || ctx.world.actors.actor_at(to).is_some() {
            return;
        }
        if let Some(a) = ctx.world.actors.get_mut(player) {
            a.pos = to;
        }
        ctx.center_on_player();
        ctx.update_blacking();
    }

    /// Walk one step towards a pixel position in the window.
    pub fn walk_to_mouse(&mut self, ctx: &mut GameContext, px: i32, py: i32) {
        if ctx.paused || self.mode != Mode::Move {
            return;
        }
        let (dx, dy) = ctx.map_window.get_movement_direction(px, py);
        if (dx, dy) != (0, 0) {
            self.walk(ctx, dx, dy);
        }
    }
}

/// The object as the viewer sees it: hidden objects and objects in the
/// dark are ignored, except secret doors, which sit inside wall cells.
fn seen_obj(ctx: &GameContext, obj: Option<ObjId>) -> Option<ObjId> {
    let id = obj?;
    let o = ctx.world.objs.get(id)?;
    let Some(at) = o.map_coord() else {
        return Some(id);
    };
    if o.is_invisible() {
        return None;
    }
    if ctx.world.objs.is_secret_door(id) {
        return Some(id);
    }
    let black = ctx
        .map_window
        .tile_is_black(&ctx.world, i32::from(at.x), i32::from(at.y), at.z, Some(id));
    (!black).then_some(id)
}

/// The player's position moved by (dx, dy).
fn player_offset(ctx: &GameContext, dx: i32, dy: i32) -> Option<MapCoord> {
    let pos = ctx.player_pos()?;
    Some(
        ctx.world
            .map
            .wrap_coord(i32::from(pos.x) + dx, i32::from(pos.y) + dy, pos.z),
    )
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use nuvie_core::Point;
    use nuvie_world::{Obj, ObjType, ObjTypeFlags, Tile, TileFlags, World};

    use super::*;
    use crate::config::Config;
    use crate::party::{Party, RestPlan};
    use crate::script::{ContinuationToken, Hooks, ResumeValue, ScriptCtx, ScriptResult, SuspendReason, Usecode};

    const GRASS: u16 = 1;
    const CHEST_TILE: u16 = 40;
    const COIN_TILE: u16 = 41;
    const LEVER_TILE: u16 = 42;
    const CHEST: u16 = 1;
    const COIN: u16 = 2;
    const LEVER: u16 = 3;

    fn world() -> World {
        let mut w = World::new();
        w.tiles.insert(Tile::new(GRASS, "grass", 2).with_flags(TileFlags::PASSABLE));
        w.tiles.insert(Tile::new(CHEST_TILE, "chest", 5).with_flags(TileFlags::PASSABLE));
        w.tiles.insert(Tile::new(COIN_TILE, "coin", 14).with_flags(TileFlags::PASSABLE));
        w.tiles.insert(Tile::new(LEVER_TILE, "lever", 7).with_flags(TileFlags::PASSABLE));
        w.map.add_level(64, 64, GRASS);
        w.objs.register_type(CHEST, ObjType::new("chest", CHEST_TILE, 20).with_flags(ObjTypeFlags::CONTAINER));
        w.objs.register_type(COIN, ObjType::new("gold coin", COIN_TILE, 1).with_flags(ObjTypeFlags::STACKABLE));
        w.objs.register_type(LEVER, ObjType::new("lever", LEVER_TILE, 0));
        w
    }

    /// Avatar at (20,20) and Dupre at (18,18), both in the party.
    fn game(mut w: World, hooks: Hooks) -> GameContext {
        let me = w.actors.add("Avatar", MapCoord::new(20, 20, 0), 100);
        let dupre = w.actors.add("Dupre", MapCoord::new(18, 18, 0), 101);
        w.actors.set_player(me);
        GameContext::new(w, Config::default(), Party::new(vec![me, dupre]), hooks, 1)
    }

    /// Usecode for one lever that asks for a direction and records the
    /// answer.
    struct Lever {
        seen: Rc<RefCell<Vec<ResumeValue>>>,
    }

    impl Usecode for Lever {
        fn has_usecode(&self, _world: &World, _obj: ObjId) -> bool {
            true
        }

        fn use_obj(&mut self, ctx: &mut ScriptCtx<'_>, _obj: ObjId) -> ScriptResult {
            ctx.scroll.display_string("Which way? ");
            ScriptResult::Suspended {
                reason: SuspendReason::Direction,
                token: ContinuationToken(7),
            }
        }

        fn resume(&mut self, _ctx: &mut ScriptCtx<'_>, token: ContinuationToken, value: ResumeValue) -> ScriptResult {
            assert_eq!(token, ContinuationToken(7));
            self.seen.borrow_mut().push(value);
            ScriptResult::done()
        }
    }

    fn lever_game() -> (GameContext, Rc<RefCell<Vec<ResumeValue>>>) {
        let mut w = world();
        w.objs.add_to_map(Obj::new(LEVER, 0), MapCoord::new(21, 20, 0));
        let seen = Rc::new(RefCell::new(Vec::new()));
        let hooks = Hooks {
            usecode: Box::new(Lever { seen: Rc::clone(&seen) }),
            ..Hooks::default()
        };
        (game(w, hooks), seen)
    }

    #[test]
    fn test_second_command_cancels_first() {
        let mut ctx = game(world(), Hooks::default());
        let mut ev = Events::new();
        assert!(ev.new_action(&mut ctx, Mode::Look));
        assert_eq!(ev.mode(), Mode::Input);
        assert_eq!(ev.last_mode(), Mode::Look);
        assert!(!ev.new_action(&mut ctx, Mode::Use), "a pending Look is cancelled, not replaced");
        assert_eq!(ev.mode(), Mode::Move);
        assert!(ctx.scroll.text().contains("Look-what?"));
    }

    #[test]
    fn test_paused_ignores_commands() {
        let mut ctx = game(world(), Hooks::default());
        let mut ev = Events::new();
        ctx.paused = true;
        assert!(!ev.new_action(&mut ctx, Mode::Look));
        assert_eq!(ev.mode(), Mode::Move);
        assert_eq!(ctx.scroll.text(), "");
    }

    #[test]
    fn test_get_coins_from_next_cell() {
        let mut w = world();
        let coins = w.objs.add_to_map(Obj::new(COIN, 0).with_qty(3), MapCoord::new(21, 20, 0));
        let mut ctx = game(w, Hooks::default());
        let mut ev = Events::new();
        ev.new_action(&mut ctx, Mode::Get);
        ev.move_relative(&mut ctx, 1, 0);
        assert_eq!(ev.mode(), Mode::Move);
        let player = ctx.player();
        assert_eq!(ctx.world.objs.inventory(player), &[coins]);
        assert_eq!(ctx.world.actors.get(player).map(|a| a.movement_points), Some(-3));
    }

    #[test]
    fn test_drop_part_of_stack() {
        let mut w = world();
        let coins = w.objs.create(Obj::new(COIN, 0).with_qty(5));
        let mut ctx = game(w, Hooks::default());
        let player = ctx.player();
        ctx.world.objs.moveto_inventory(coins, player).unwrap();
        let mut ev = Events::new();

        assert!(ev.new_action(&mut ctx, Mode::Drop));
        assert!(ev.is_selecting_from_inventory());
        ev.do_action(&mut ctx);
        assert!(ctx.scroll.text().contains("How many? "));
        ctx.scroll.input_char('2');
        ev.do_action(&mut ctx);
        assert!(ctx.scroll.text().ends_with("Location:"));
        ev.move_relative(&mut ctx, 1, 0);
        ev.do_action(&mut ctx);

        assert_eq!(ev.mode(), Mode::Move);
        let dropped = ctx.world.objs.objs_at(MapCoord::new(21, 20, 0)).to_vec();
        assert_eq!(dropped.len(), 1);
        assert_eq!(ctx.world.objs.get(dropped[0]).map(|o| o.qty), Some(2));
        assert_eq!(ctx.world.objs.get(coins).map(|o| o.qty), Some(3));
        let text = ctx.scroll.text();
        let tail = text.rsplit("Location:").next().unwrap_or_default();
        assert_eq!(tail.matches('>').count(), 1, "exactly one prompt after the drop");
    }

    #[test]
    fn test_use_suspends_for_direction_then_resumes() {
        let (mut ctx, seen) = lever_game();
        let mut ev = Events::new();
        ev.new_action(&mut ctx, Mode::Use);
        ev.move_relative(&mut ctx, 1, 0);

        assert_eq!(ev.mode(), Mode::Input);
        assert_eq!(ev.last_mode(), Mode::Use);
        assert!(ev.has_continuation());
        assert!(seen.borrow().is_empty());

        ev.move_relative(&mut ctx, 0, 1);
        assert_eq!(*seen.borrow(), vec![ResumeValue::Direction(Point::new(0, 1))]);
        assert_eq!(ev.mode(), Mode::Move);
        assert!(!ev.has_continuation());
    }

    #[test]
    fn test_cancel_resumes_script_with_nil() {
        let (mut ctx, seen) = lever_game();
        let mut ev = Events::new();
        ev.new_action(&mut ctx, Mode::Use);
        ev.move_relative(&mut ctx, 1, 0);
        assert!(ev.has_continuation());

        ev.cancel_action(&mut ctx);
        assert_eq!(*seen.borrow(), vec![ResumeValue::Nil]);
        assert_eq!(ev.mode(), Mode::Move);
        assert!(!ev.has_continuation());
    }

    #[test]
    fn test_push_then_cancel_leaves_chest() {
        let mut w = world();
        let chest = w.objs.add_to_map(Obj::new(CHEST, 0), MapCoord::new(21, 20, 0));
        let mut ctx = game(w, Hooks::default());
        let mut ev = Events::new();
        ev.new_action(&mut ctx, Mode::Push);
        ev.move_relative(&mut ctx, 1, 0);
        assert_eq!(ev.mode(), Mode::Input);
        assert_eq!(ev.state().push_obj(), Some(chest));

        ev.cancel_action(&mut ctx);
        assert_eq!(ev.mode(), Mode::Move);
        assert!(ctx.scroll.text().contains("Move-chest\nTo nowhere.\n"));
        assert_eq!(ctx.world.objs.root_map_coord(chest), Some(MapCoord::new(21, 20, 0)));
    }

    #[test]
    fn test_push_chest_one_step() {
        let mut w = world();
        let chest = w.objs.add_to_map(Obj::new(CHEST, 0), MapCoord::new(21, 20, 0));
        let mut ctx = game(w, Hooks::default());
        let mut ev = Events::new();
        ev.new_action(&mut ctx, Mode::Push);
        ev.move_relative(&mut ctx, 1, 0);
        ev.move_relative(&mut ctx, 1, 0);

        assert_eq!(ev.mode(), Mode::Move);
        assert_eq!(ctx.world.objs.root_map_coord(chest), Some(MapCoord::new(22, 20, 0)));
        assert!(ctx.scroll.text().contains("Move-chest\nTo East.\n"));
    }

    #[test]
    fn test_rest_cancelled_at_guard_prompt() {
        let mut ctx = game(world(), Hooks::default());
        let mut ev = Events::new();
        ev.new_action(&mut ctx, Mode::Rest);
        assert!(ctx.scroll.text().contains("How many hours? "));
        ctx.scroll.input_char('2');
        ev.do_action(&mut ctx);
        assert!(ctx.scroll.text().contains("Who will guard? "));
        assert_eq!(ev.mode(), Mode::Input);

        ev.cancel_action(&mut ctx);
        assert_eq!(ev.mode(), Mode::Move);
        assert_eq!(ctx.party.gathering(), None);
    }

    #[test]
    fn test_rest_with_guard_picked_on_map() {
        let mut ctx = game(world(), Hooks::default());
        let mut ev = Events::new();
        ev.new_action(&mut ctx, Mode::Rest);
        ctx.scroll.input_char('2');
        ev.do_action(&mut ctx);
        // cursor starts on the Avatar
        ev.do_action(&mut ctx);

        assert_eq!(ev.mode(), Mode::Wait);
        assert_eq!(
            ctx.party.gathering(),
            Some(RestPlan {
                hours: 2,
                guard: Some(0)
            })
        );
        ev.do_action(&mut ctx);
        assert_eq!(ev.mode(), Mode::Wait, "waiting ignores further actions");

        ev.finish_wait(&mut ctx);
        assert_eq!(ev.mode(), Mode::Move);
        assert_eq!(ctx.clock.hour(), 14);
        assert_eq!(ctx.party.gathering(), None);
    }

    #[test]
    fn test_attack_names_object_under_cursor() {
        let mut w = world();
        w.objs.add_to_map(Obj::new(COIN, 0).with_qty(3), MapCoord::new(21, 20, 0));
        let mut ctx = game(w, Hooks::default());
        let mut ev = Events::new();
        assert!(ev.new_action(&mut ctx, Mode::Attack));
        ev.move_relative(&mut ctx, 1, 0);
        ev.do_action(&mut ctx);
        let text = ctx.scroll.text();
        assert!(text.contains("Attack-gold coin.\n"), "type name without quantity: {text}");
        assert_eq!(ev.mode(), Mode::Move);
    }

    #[test]
    fn test_attack_empty_ground_names_terrain() {
        let mut ctx = game(world(), Hooks::default());
        let mut ev = Events::new();
        ev.new_action(&mut ctx, Mode::Attack);
        ev.move_relative(&mut ctx, 0, 1);
        ev.do_action(&mut ctx);
        assert!(ctx.scroll.text().contains("Attack-grass.\n"));
    }

    #[test]
    fn test_combat_toggle() {
        let mut ctx = game(world(), Hooks::default());
        let mut ev = Events::new();
        assert!(ev.new_action(&mut ctx, Mode::Combat));
        assert!(ctx.party.is_in_combat());
        assert_eq!(ev.mode(), Mode::Move);
        ev.new_action(&mut ctx, Mode::Combat);
        assert!(!ctx.party.is_in_combat());
        let text = ctx.scroll.text();
        assert!(text.contains("Begin combat!"));
        assert!(text.contains("Break off combat!"));
    }

    #[test]
    fn test_cast_without_magic() {
        let mut ctx = game(world(), Hooks::default());
        let mut ev = Events::new();
        assert!(!ev.new_action(&mut ctx, Mode::Cast));
        assert_eq!(ev.mode(), Mode::Move);
        assert!(ctx.scroll.text().starts_with("Cast-"));
    }

    #[test]
    fn test_talk_to_party_member_and_self() {
        let mut ctx = game(world(), Hooks::default());
        let mut ev = Events::new();
        ev.new_action(&mut ctx, Mode::Talk);
        ev.move_relative(&mut ctx, -1, -1);
        ev.move_relative(&mut ctx, -1, -1);
        ev.do_action(&mut ctx);
        assert_eq!(ev.mode(), Mode::Move);
        assert!(ctx.scroll.text().contains("Talk-Dupre\nFunny, no response.\n"));

        ev.new_action(&mut ctx, Mode::Talk);
        ev.do_action(&mut ctx);
        assert!(ctx.scroll.text().contains("Talk-Avatar\nTalking to yourself?\n"));
    }

    #[test]
    fn test_cancel_in_move_spends_turn() {
        let mut ctx = game(world(), Hooks::default());
        let mut ev = Events::new();
        let player = ctx.player();
        if let Some(a) = ctx.world.actors.get_mut(player) {
            a.movement_points = 9;
        }
        ev.cancel_action(&mut ctx);
        assert_eq!(ctx.world.actors.get(player).map(|a| a.movement_points), Some(0));
    }
}
