//! **nuvie** — the map window of a tile-based RPG engine and the action
//! state machine that drives it.
//!
//! [`MapWindow`] owns the viewport, cursor and occlusion state;
//! [`Renderer`] turns it into pixels; [`Events`] turns key presses and
//! clicks into look, use, get, move, drop, talk, attack, cast and rest
//! commands. [`Session`] ties them together as a [`nuvie_core::Model`].

pub mod clock;
pub mod config;
pub mod error;
pub mod events;
pub mod map_window;
pub mod party;
pub mod render;
pub mod script;
pub mod scroll;
pub mod session;

pub use clock::{GameClock, Timer};
pub use config::{Config, InterfaceType, XRayMode};
pub use error::{ActionError, ConfigError};
pub use events::{Events, InputValue, Mode, ModeState, PendingInput};
pub use map_window::{CursorKind, CursorState, MapWindow, look_map};
pub use party::{Party, RestPlan};
pub use render::{Frame, Renderer};
pub use script::{
    BasicScript, ContinuationToken, GameScript, Hooks, Magic, NoMagic, NoUsecode, ResumeValue, ScriptCtx,
    ScriptResult, SelectAction, SuspendReason, Usecode,
};
pub use scroll::MsgScroll;
pub use session::{GameContext, Session};
