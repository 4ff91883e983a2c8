//! Interaction modes and the scratch state each one carries.

use nuvie_core::MapCoord;
use nuvie_world::{ActorId, ObjId};

/// The interaction the state machine is performing.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Mode {
    Look,
    Use,
    Get,
    /// Walking around; the idle mode.
    #[default]
    Move,
    Drop,
    /// Finding an actor to talk to.
    Talk,
    Attack,
    Push,
    Rest,
    Cast,
    /// Only used to toggle combat; never stays current.
    Combat,
    /// Casting a known spell number directly.
    Spell,
    Equip,
    /// Waiting for something to finish, e.g. the party gathering to rest.
    Wait,
    Input,
    MultiUse,
    /// Keys are redirected to the spell selector.
    KeyInput,
    /// A free-standing resumable script is running.
    Script,
}

impl Mode {
    pub const fn name(self) -> &'static str {
        match self {
            Mode::Look => "look",
            Mode::Use => "use",
            Mode::Get => "get",
            Mode::Move => "move",
            Mode::Drop => "drop",
            Mode::Talk => "talk",
            Mode::Attack => "attack",
            Mode::Push => "push",
            Mode::Rest => "rest",
            Mode::Cast => "cast",
            Mode::Combat => "combat",
            Mode::Spell => "spell",
            Mode::Equip => "equip",
            Mode::Wait => "wait",
            Mode::Input => "input",
            Mode::MultiUse => "multiuse",
            Mode::KeyInput => "keyinput",
            Mode::Script => "script",
        }
    }

    /// Whether this mode gathers input for the mode saved in `last_mode`.
    #[inline]
    pub const fn is_input(self) -> bool {
        matches!(self, Mode::Input | Mode::KeyInput)
    }
}

/// State held between the steps of a multi-step action.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum ModeState {
    #[default]
    Idle,
    Push {
        obj: Option<ObjId>,
        actor: Option<ActorId>,
        /// The object was picked from an inventory rather than the map.
        in_inventory: bool,
    },
    Drop {
        obj: Option<ObjId>,
        /// `None` until the quantity is known.
        qty: Option<u16>,
        /// Destination chosen up front by dragging.
        target: Option<MapCoord>,
    },
    Rest {
        hours: u16,
        /// 1-based party index of the guard; 0 for nobody.
        guard: u16,
    },
}

impl ModeState {
    pub(crate) fn push_obj(&self) -> Option<ObjId> {
        match *self {
            ModeState::Push { obj, .. } => obj,
            _ => None,
        }
    }

    pub(crate) fn push_actor(&self) -> Option<ActorId> {
        match *self {
            ModeState::Push { actor, .. } => actor,
            _ => None,
        }
    }

    pub(crate) fn rest_hours(&self) -> u16 {
        match *self {
            ModeState::Rest { hours, .. } => hours,
            _ => 0,
        }
    }
}
