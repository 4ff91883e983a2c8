//! The game session: everything the action code and the renderer share,
//! and the [`Model`] a frontend drives.

use log::{debug, trace};
use nuvie_core::{Effect, Key, MapCoord, Model, ModMask, MouseAction, Msg, Point, Range, Surface};
use nuvie_world::{ActorId, World};
use rand::SeedableRng;
use rand::rngs::SmallRng;

use crate::clock::GameClock;
use crate::config::Config;
use crate::events::{Events, Mode};
use crate::map_window::MapWindow;
use crate::party::Party;
use crate::render::{Frame, Renderer};
use crate::script::{GameScript, Hooks, Magic, ScriptCtx, Usecode};
use crate::scroll::MsgScroll;

/// Mutable game state passed to every action handler.
pub struct GameContext {
    pub world: World,
    pub map_window: MapWindow,
    pub scroll: MsgScroll,
    pub clock: GameClock,
    pub party: Party,
    pub config: Config,
    pub hooks: Hooks,
    pub rng: SmallRng,
    /// A modal dialog is open; gameplay input is ignored.
    pub paused: bool,
}

impl GameContext {
    /// Build a session around a populated world, centred on its player.
    pub fn new(world: World, config: Config, party: Party, hooks: Hooks, seed: u64) -> Self {
        let mut map_window = MapWindow::new(&config);
        map_window.center_map_on_actor(&world, world.actors.player_id());
        map_window.update_blacking(&world);
        Self {
            world,
            map_window,
            scroll: MsgScroll::new(),
            clock: GameClock::new(12, 0),
            party,
            config,
            hooks,
            rng: SmallRng::seed_from_u64(seed),
            paused: false,
        }
    }

    pub fn player(&self) -> ActorId {
        self.world.actors.player_id()
    }

    pub fn player_pos(&self) -> Option<MapCoord> {
        self.world.player_pos()
    }

    /// Whether the actor can currently be seen.
    pub fn actor_visible(&self, actor: ActorId) -> bool {
        self.world
            .actors
            .get(actor)
            .is_some_and(|a| !a.is(nuvie_world::ActorStatus::INVISIBLE))
    }

    pub fn subtract_movement_points(&mut self, actor: ActorId, points: i16) {
        if let Some(a) = self.world.actors.get_mut(actor) {
            a.movement_points = a.movement_points.saturating_sub(points);
        }
    }

    pub fn update_blacking(&mut self) {
        self.map_window.update_blacking(&self.world);
    }

    /// Recentre the view on the player.
    pub fn center_on_player(&mut self) {
        let player = self.player();
        self.map_window.center_map_on_actor(&self.world, player);
    }

    /// Apply a changed configuration to the map window.
    pub fn apply_config(&mut self, config: Config) {
        self.config = config;
        self.map_window.apply_config(&self.world, &self.config);
    }

    // --- collaborator calls ---

    pub(crate) fn run_usecode<R>(
        &mut self,
        f: impl FnOnce(&mut Box<dyn Usecode>, &mut ScriptCtx<'_>) -> R,
    ) -> R {
        let actor = self.world.actors.player_id();
        let mut sctx = ScriptCtx {
            world: &mut self.world,
            scroll: &mut self.scroll,
            actor,
        };
        f(&mut self.hooks.usecode, &mut sctx)
    }

    pub(crate) fn run_magic<R>(
        &mut self,
        f: impl FnOnce(&mut Box<dyn Magic>, &mut ScriptCtx<'_>) -> R,
    ) -> R {
        let actor = self.world.actors.player_id();
        let mut sctx = ScriptCtx {
            world: &mut self.world,
            scroll: &mut self.scroll,
            actor,
        };
        f(&mut self.hooks.magic, &mut sctx)
    }

    pub(crate) fn run_script<R>(
        &mut self,
        f: impl FnOnce(&mut Box<dyn GameScript>, &mut ScriptCtx<'_>) -> R,
    ) -> R {
        let actor = self.world.actors.player_id();
        let mut sctx = ScriptCtx {
            world: &mut self.world,
            scroll: &mut self.scroll,
            actor,
        };
        f(&mut self.hooks.script, &mut sctx)
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// A running game: state, action state machine and renderer.
pub struct Session {
    pub ctx: GameContext,
    pub events: Events,
    renderer: Renderer,
}

impl Session {
    pub fn new(ctx: GameContext, seed: u64) -> Self {
        Self {
            ctx,
            events: Events::new(),
            renderer: Renderer::new(seed),
        }
    }

    fn handle_key(&mut self, key: Key, modifiers: ModMask) -> Option<Effect> {
        let ctx = &mut self.ctx;
        let ev = &mut self.events;
        if modifiers.contains(ModMask::CTRL) && key == Key::Char('q') {
            return Some(Effect::End);
        }
        if ctx.paused {
            return None;
        }

        if let Some(d) = key.delta() {
            ev.move_relative(ctx, d.x, d.y);
            return Some(Effect::Redraw);
        }
        match key {
            Key::Escape => ev.cancel_action(ctx),
            Key::Enter | Key::Space => ev.do_action(ctx),
            Key::Backspace => ctx.scroll.input_backspace(),
            Key::Char(c) if ev.mode() == Mode::KeyInput => ev.key_input(ctx, c),
            Key::Char(c) if ctx.scroll.is_input_active() => {
                ctx.scroll.input_char(c);
            }
            Key::Char(c) if ev.is_selecting_from_inventory() && c.is_ascii_digit() => {
                let n = c.to_digit(10).unwrap_or(0) as usize;
                ev.select_inventory_slot(ctx, n.saturating_sub(1));
            }
            Key::Char(c) => {
                let mode = match c {
                    'l' => Mode::Look,
                    'u' => Mode::Use,
                    'g' => Mode::Get,
                    'd' => Mode::Drop,
                    't' => Mode::Talk,
                    'a' => Mode::Attack,
                    'm' => Mode::Push,
                    'r' => Mode::Rest,
                    'c' => Mode::Cast,
                    'b' => Mode::Combat,
                    'i' => Mode::Equip,
                    'Q' if ev.mode() == Mode::Move => return Some(Effect::End),
                    _ => return None,
                };
                ev.new_action(ctx, mode);
            }
            _ => return None,
        }
        Some(Effect::Redraw)
    }

    fn handle_mouse(&mut self, action: MouseAction, pos: Point) -> Option<Effect> {
        let ctx = &mut self.ctx;
        let ev = &mut self.events;
        if ctx.paused {
            return None;
        }
        let cell = ctx.map_window.pixel_to_window(pos.x, pos.y);
        match action {
            MouseAction::Main => match ev.mode() {
                Mode::Input | Mode::Attack => {
                    ctx.map_window.move_cursor(cell.x, cell.y);
                    let at = ctx.map_window.cursor_coord();
                    ev.select_target(ctx, at);
                }
                Mode::Move => ev.walk_to_mouse(ctx, pos.x, pos.y),
                _ => return None,
            },
            MouseAction::Secondary => ev.cancel_action(ctx),
            MouseAction::Auxiliary => {
                let at = ctx.map_window.window_to_map(cell.x, cell.y);
                ev.multiuse(ctx, at);
            }
            MouseAction::Move => {
                if ev.mode() != Mode::Input || ev.input().get_direction {
                    return None;
                }
                ctx.map_window.move_cursor(cell.x, cell.y);
            }
            MouseAction::Release => return None,
        }
        Some(Effect::Redraw)
    }

    fn tick(&mut self) -> Option<Effect> {
        let ctx = &mut self.ctx;
        ctx.clock.tick();
        ctx.world.tiles.update_anims(ctx.clock.ticks());
        if ctx.map_window.is_wizard_eye_mode() {
            ctx.map_window.wizard_eye_update(&ctx.world);
        }
        if self.events.mode() == Mode::Wait {
            self.events.finish_wait(ctx);
        }
        ctx.map_window.update_ambience();
        Some(Effect::Redraw)
    }
}

impl Model for Session {
    fn update(&mut self, msg: Msg) -> Option<Effect> {
        match msg {
            Msg::Init => {
                debug!("session starts");
                self.ctx.center_on_player();
                self.ctx.scroll.display_prompt();
                Some(Effect::Redraw)
            }
            Msg::Quit => Some(Effect::End),
            Msg::Tick { .. } => self.tick(),
            Msg::KeyDown { key, modifiers, .. } => self.handle_key(key, modifiers),
            Msg::Mouse { action, pos, .. } => self.handle_mouse(action, pos),
        }
    }

    fn draw(&mut self, surface: &mut Surface) -> Range {
        let ctx = &mut self.ctx;
        if ctx.map_window.lighting_update_required() {
            ctx.map_window.update_lighting(
                &ctx.world,
                &ctx.clock,
                ctx.config.effective_min_brightness(),
                ctx.party.light_source,
            );
        }
        let frame = Frame {
            world: &ctx.world,
            clock: &ctx.clock,
            party: &ctx.party,
        };
        let dirty = self.renderer.draw(&frame, &mut ctx.map_window, surface);
        trace!("drew {} objects", self.renderer.drawn());
        dirty
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nuvie_world::{Tile, TileFlags};

    fn session() -> Session {
        let mut w = World::new();
        w.tiles.insert(Tile::new(1, "grass", 2).with_flags(TileFlags::PASSABLE));
        w.map.add_level(64, 64, 1);
        let me = w.actors.add("Avatar", MapCoord::new(20, 20, 0), 100);
        w.actors.set_player(me);
        let ctx = GameContext::new(w, Config::default(), Party::new(vec![me]), Hooks::default(), 7);
        Session::new(ctx, 7)
    }

    #[test]
    fn test_arrow_walks_in_move_mode() {
        let mut s = session();
        s.update(Msg::Init);
        assert_eq!(s.update(Msg::key(Key::ArrowRight)), Some(Effect::Redraw));
        assert_eq!(s.ctx.player_pos(), Some(MapCoord::new(21, 20, 0)));
        assert_eq!(s.ctx.map_window.pos(), (16, 15), "view follows the player");
    }

    #[test]
    fn test_hotkey_and_escape() {
        let mut s = session();
        s.update(Msg::key(Key::Char('l')));
        assert_eq!(s.events.mode(), Mode::Input);
        assert_eq!(s.events.last_mode(), Mode::Look);
        s.update(Msg::key(Key::Escape));
        assert_eq!(s.events.mode(), Mode::Move);
        assert!(s.ctx.scroll.text().contains("Look-what?"));
    }

    #[test]
    fn test_paused_ignores_input() {
        let mut s = session();
        s.ctx.paused = true;
        assert_eq!(s.update(Msg::key(Key::Char('l'))), None);
        assert_eq!(s.events.mode(), Mode::Move);
        assert_eq!(s.update(Msg::key_mod(Key::Char('q'), ModMask::CTRL)), Some(Effect::End));
    }

    #[test]
    fn test_draw_returns_map_area() {
        let mut s = session();
        let mut surface = Surface::new(176, 176);
        let dirty = s.draw(&mut surface);
        assert_eq!(dirty, Range::new(0, 0, 176, 176));
    }
}
