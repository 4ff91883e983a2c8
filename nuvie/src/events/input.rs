//! The single in-flight input an action is waiting for.

use nuvie_core::MapCoord;
use nuvie_world::{ActorId, ObjId};

/// A captured target.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum InputValue {
    #[default]
    None,
    Key(char),
    /// A map cell, with whatever was under the cursor.
    Target {
        loc: MapCoord,
        actor: Option<ActorId>,
        obj: Option<ObjId>,
    },
    /// A step relative to the capture origin.
    Direction {
        dx: i32,
        dy: i32,
        actor: Option<ActorId>,
        obj: Option<ObjId>,
    },
    /// An object picked from an inventory or container.
    Obj { obj: ObjId, actor: Option<ActorId> },
    SpellNum(Option<u8>),
    Text(String),
}

impl InputValue {
    pub fn actor(&self) -> Option<ActorId> {
        match *self {
            InputValue::Target { actor, .. }
            | InputValue::Direction { actor, .. }
            | InputValue::Obj { actor, .. } => actor,
            _ => None,
        }
    }

    pub fn obj(&self) -> Option<ObjId> {
        match *self {
            InputValue::Target { obj, .. } | InputValue::Direction { obj, .. } => obj,
            InputValue::Obj { obj, .. } => Some(obj),
            _ => None,
        }
    }
}

/// What kind of input is being captured, and what was captured.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PendingInput {
    pub value: InputValue,
    /// A single step is wanted rather than an arbitrary cell.
    pub get_direction: bool,
    /// A line of text is being typed into the scroll.
    pub get_text: bool,
    /// The target comes from the player's inventory.
    pub select_from_inventory: bool,
    /// Origin of a direction capture.
    pub target_init: Option<MapCoord>,
}

impl PendingInput {
    /// Forget the previous capture. The kind flags are left alone.
    pub(crate) fn reset(&mut self) {
        self.value = InputValue::None;
        self.target_init = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_accessors() {
        let v = InputValue::Direction {
            dx: 1,
            dy: 0,
            actor: Some(ActorId(2)),
            obj: None,
        };
        assert_eq!(v.actor(), Some(ActorId(2)));
        assert_eq!(v.obj(), None);
        let v = InputValue::Obj {
            obj: ObjId(9),
            actor: None,
        };
        assert_eq!(v.obj(), Some(ObjId(9)));
        assert_eq!(InputValue::Text("3".into()).obj(), None);
    }

    #[test]
    fn test_reset_keeps_flags() {
        let mut p = PendingInput {
            value: InputValue::Key('a'),
            get_text: true,
            target_init: Some(MapCoord::new(1, 2, 0)),
            ..PendingInput::default()
        };
        p.reset();
        assert_eq!(p.value, InputValue::None);
        assert_eq!(p.target_init, None);
        assert!(p.get_text);
    }
}
