//! The scripting collaborators: object usecode, magic and the general game
//! script, with the suspend/resume protocol they share with the action
//! state machine.
//!
//! A collaborator either finishes ([`ScriptResult::Done`]) or suspends,
//! naming what it needs next and handing back an opaque
//! [`ContinuationToken`]. The state machine arms the matching input
//! capture and later calls `resume` with the token and the captured value.
//! Cancelling resumes with [`ResumeValue::Nil`] so the script can clean up.

use nuvie_core::{MapCoord, Point};
use nuvie_world::{ActorId, ObjId, World};

use crate::scroll::MsgScroll;

/// What a suspended script is waiting for.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SuspendReason {
    Direction,
    Obj,
    InventoryObj,
    Location,
    SpellNum,
    /// Run a conversation with this actor, then resume.
    Talk(ActorId),
}

/// The value a suspended script is resumed with.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ResumeValue {
    Direction(Point),
    Obj(ObjId),
    Location(MapCoord),
    SpellNum(u8),
    /// No value: the action was cancelled or the capture produced nothing.
    Nil,
}

/// Opaque handle naming one suspended script.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ContinuationToken(pub u32);

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ScriptResult {
    /// Finished; `prompt` says whether the command prompt should follow.
    Done { prompt: bool },
    Suspended {
        reason: SuspendReason,
        token: ContinuationToken,
    },
}

impl ScriptResult {
    pub const fn done() -> Self {
        Self::Done { prompt: true }
    }

    pub fn is_suspended(&self) -> bool {
        matches!(self, Self::Suspended { .. })
    }
}

/// Actions whose target selection may be ranged instead of one step.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SelectAction {
    Use,
    Get,
    Move,
}

/// What a script may touch while it runs.
pub struct ScriptCtx<'a> {
    pub world: &'a mut World,
    pub scroll: &'a mut MsgScroll,
    /// The actor performing the action.
    pub actor: ActorId,
}

// ---------------------------------------------------------------------------
// Usecode
// ---------------------------------------------------------------------------

/// Per-object-type behaviour.
pub trait Usecode {
    fn has_usecode(&self, world: &World, obj: ObjId) -> bool;

    fn has_actor_usecode(&self, _world: &World, _actor: ActorId) -> bool {
        false
    }

    fn use_obj(&mut self, ctx: &mut ScriptCtx<'_>, obj: ObjId) -> ScriptResult;

    fn use_actor(&mut self, _ctx: &mut ScriptCtx<'_>, _target: ActorId) -> ScriptResult {
        ScriptResult::done()
    }

    /// Called before an object is picked up. False refuses.
    fn get_obj(&mut self, _ctx: &mut ScriptCtx<'_>, _obj: ObjId) -> bool {
        true
    }

    /// Called before an object is dropped. False means the usecode handled
    /// the drop itself.
    fn drop_obj(&mut self, _ctx: &mut ScriptCtx<'_>, _obj: ObjId, _at: MapCoord) -> bool {
        true
    }

    /// Called before an object is pushed by (dx, dy). False refuses.
    fn move_obj(&mut self, _ctx: &mut ScriptCtx<'_>, _obj: ObjId, _dx: i32, _dy: i32) -> bool {
        true
    }

    /// Search an object for hidden things. True if something turned up.
    fn search_obj(&mut self, _ctx: &mut ScriptCtx<'_>, _obj: ObjId) -> bool {
        false
    }

    fn resume(
        &mut self,
        _ctx: &mut ScriptCtx<'_>,
        _token: ContinuationToken,
        _value: ResumeValue,
    ) -> ScriptResult {
        ScriptResult::done()
    }
}

// ---------------------------------------------------------------------------
// Magic
// ---------------------------------------------------------------------------

/// Spell selection and casting.
pub trait Magic {
    /// Begin reading a spell. False if the caster cannot cast now.
    fn start_new_spell(&mut self, _ctx: &mut ScriptCtx<'_>) -> bool {
        true
    }

    /// A key typed while a spell is being chosen. Returns true once the
    /// spell is complete and ready to cast.
    fn spell_key(&mut self, _ctx: &mut ScriptCtx<'_>, _c: char) -> bool {
        true
    }

    fn cast(&mut self, ctx: &mut ScriptCtx<'_>) -> ScriptResult;

    fn cast_spell_directly(&mut self, ctx: &mut ScriptCtx<'_>, spell: u8) -> ScriptResult;

    fn resume(
        &mut self,
        _ctx: &mut ScriptCtx<'_>,
        _token: ContinuationToken,
        _value: ResumeValue,
    ) -> ScriptResult {
        ScriptResult::done()
    }
}

// ---------------------------------------------------------------------------
// GameScript
// ---------------------------------------------------------------------------

/// Game rules that are not tied to one object type.
pub trait GameScript {
    fn is_ranged_select(&self, _action: SelectAction) -> bool {
        false
    }

    /// Describe an object. False suppresses the follow-up search.
    fn look_obj(&mut self, ctx: &mut ScriptCtx<'_>, obj: ObjId) -> bool {
        let name = ctx.world.objs.look_name(obj);
        ctx.scroll.display_string(&format!("Thou dost see {name}\n"));
        true
    }

    /// Whether `actor`'s readied weapon reaches `target`.
    fn weapon_can_hit(&self, world: &World, actor: ActorId, target: MapCoord) -> bool {
        world
            .actors
            .get(actor)
            .is_some_and(|a| a.pos.z == target.z && a.pos.distance(target) <= 1)
    }

    /// Resolve one attack on a map cell.
    fn attack(&mut self, ctx: &mut ScriptCtx<'_>, _target: MapCoord, foe: Option<ActorId>) {
        if let Some(a) = foe.and_then(|f| ctx.world.actors.get_mut(f)) {
            a.hp = a.hp.saturating_sub(1);
        }
    }

    /// Ready the next weapon for another attack this turn.
    fn select_next_weapon(&mut self, _ctx: &mut ScriptCtx<'_>) -> bool {
        false
    }

    /// Start a conversation. False if the actor will not talk.
    fn start_conversation(&mut self, _ctx: &mut ScriptCtx<'_>, _actor: ActorId) -> bool {
        false
    }

    fn resume(
        &mut self,
        _ctx: &mut ScriptCtx<'_>,
        _token: ContinuationToken,
        _value: ResumeValue,
    ) -> ScriptResult {
        ScriptResult::done()
    }
}

/// Usecode that knows no objects.
#[derive(Debug, Default)]
pub struct NoUsecode;

impl Usecode for NoUsecode {
    fn has_usecode(&self, _world: &World, _obj: ObjId) -> bool {
        false
    }

    fn use_obj(&mut self, _ctx: &mut ScriptCtx<'_>, _obj: ObjId) -> ScriptResult {
        ScriptResult::done()
    }
}

/// Magic that fizzles.
#[derive(Debug, Default)]
pub struct NoMagic;

impl Magic for NoMagic {
    fn start_new_spell(&mut self, _ctx: &mut ScriptCtx<'_>) -> bool {
        false
    }

    fn cast(&mut self, ctx: &mut ScriptCtx<'_>) -> ScriptResult {
        ctx.scroll.display_string("\nNo effect\n");
        ScriptResult::done()
    }

    fn cast_spell_directly(&mut self, ctx: &mut ScriptCtx<'_>, _spell: u8) -> ScriptResult {
        self.cast(ctx)
    }
}

/// The built-in rules with no game data behind them.
#[derive(Debug, Default)]
pub struct BasicScript;

impl GameScript for BasicScript {}

/// The collaborators a session runs with.
pub struct Hooks {
    pub usecode: Box<dyn Usecode>,
    pub magic: Box<dyn Magic>,
    pub script: Box<dyn GameScript>,
}

impl Default for Hooks {
    fn default() -> Self {
        Self {
            usecode: Box::new(NoUsecode),
            magic: Box::new(NoMagic),
            script: Box::new(BasicScript),
        }
    }
}
