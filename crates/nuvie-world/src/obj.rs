//! Objects: the [`Obj`] arena and the [`ObjManager`] ownership graph.
//!
//! Every object lives in one arena slot addressed by a stable [`ObjId`].
//! Exactly one holder lists it at a time: a map cell, an actor inventory or
//! another object's contents. All moves go through [`ObjManager`], which
//! unlinks from the old holder before linking to the new one.

use std::collections::HashMap;
use std::fmt;
use std::ops::BitOr;

use nuvie_core::MapCoord;

use crate::actor::ActorId;

/// Stable handle to an object. Ids are never reused.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ObjId(pub u32);

/// Where an object currently is.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ObjLocation {
    /// Created but not yet placed, or removed from the world.
    Detached,
    Map(MapCoord),
    Inventory(ActorId),
    Container(ObjId),
}

/// Per-object status flags.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct ObjStatus(pub u8);

impl ObjStatus {
    pub const NONE: Self = Self(0);
    pub const INVISIBLE: Self = Self(1 << 0);
    /// Taking it is not stealing.
    pub const OK_TO_TAKE: Self = Self(1 << 1);
    pub const TEMPORARY: Self = Self(1 << 2);

    #[inline]
    pub const fn contains(self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }
}

impl BitOr for ObjStatus {
    type Output = Self;
    #[inline]
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// Behaviour flags shared by every object of a type.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct ObjTypeFlags(pub u16);

impl ObjTypeFlags {
    pub const NONE: Self = Self(0);
    pub const STACKABLE: Self = Self(1 << 0);
    pub const CONTAINER: Self = Self(1 << 1);
    pub const DOOR: Self = Self(1 << 2);
    pub const SECRET_DOOR: Self = Self(1 << 3);
    pub const READABLE: Self = Self(1 << 4);
    /// Shrines and statues: talking to one talks to the actor numbered by
    /// its quality.
    pub const TALKS: Self = Self(1 << 5);
    /// Looking at it may reveal hidden things.
    pub const SEARCHABLE: Self = Self(1 << 6);

    #[inline]
    pub const fn contains(self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }
}

impl BitOr for ObjTypeFlags {
    type Output = Self;
    #[inline]
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// Static description of an object type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ObjType {
    pub name: String,
    pub plural: String,
    /// First tile of the type; the frame number is added to it.
    pub tile_num: u16,
    /// Weight in tenths of a stone. 0 and 255 mean it cannot be picked up.
    pub weight: u8,
    pub flags: ObjTypeFlags,
}

impl ObjType {
    pub fn new(name: &str, tile_num: u16, weight: u8) -> Self {
        Self {
            name: name.to_string(),
            plural: format!("{name}s"),
            tile_num,
            weight,
            flags: ObjTypeFlags::NONE,
        }
    }

    pub fn with_flags(mut self, flags: ObjTypeFlags) -> Self {
        self.flags = self.flags | flags;
        self
    }
}

// ---------------------------------------------------------------------------
// Obj
// ---------------------------------------------------------------------------

/// A map or inventory entity.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Obj {
    pub obj_n: u16,
    pub frame_n: u8,
    /// Meaning depends on the type: key number, actor number of a shrine...
    pub quality: u8,
    pub qty: u16,
    pub status: ObjStatus,
    location: ObjLocation,
    contents: Vec<ObjId>,
    script_refs: u16,
}

impl Obj {
    pub fn new(obj_n: u16, frame_n: u8) -> Self {
        Self {
            obj_n,
            frame_n,
            quality: 0,
            qty: 1,
            status: ObjStatus::NONE,
            location: ObjLocation::Detached,
            contents: Vec::new(),
            script_refs: 0,
        }
    }

    pub fn with_qty(mut self, qty: u16) -> Self {
        self.qty = qty;
        self
    }

    pub fn with_quality(mut self, quality: u8) -> Self {
        self.quality = quality;
        self
    }

    #[inline]
    pub fn location(&self) -> ObjLocation {
        self.location
    }

    /// Map position when the object lies directly on the map.
    #[inline]
    pub fn map_coord(&self) -> Option<MapCoord> {
        match self.location {
            ObjLocation::Map(c) => Some(c),
            _ => None,
        }
    }

    #[inline]
    pub fn is_on_map(&self) -> bool {
        matches!(self.location, ObjLocation::Map(_))
    }

    #[inline]
    pub fn is_in_inventory(&self) -> bool {
        matches!(self.location, ObjLocation::Inventory(_))
    }

    #[inline]
    pub fn is_in_container(&self) -> bool {
        matches!(self.location, ObjLocation::Container(_))
    }

    #[inline]
    pub fn is_invisible(&self) -> bool {
        self.status.contains(ObjStatus::INVISIBLE)
    }

    pub fn contents(&self) -> &[ObjId] {
        &self.contents
    }

    /// Whether a script currently holds a handle to this object.
    pub fn is_script_referenced(&self) -> bool {
        self.script_refs > 0
    }
}

/// Errors from object moves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObjError {
    NoSuchObj(ObjId),
    /// The object would end up inside itself.
    SelfContainment { obj: ObjId, container: ObjId },
}

impl fmt::Display for ObjError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoSuchObj(id) => write!(f, "no object with id {}", id.0),
            Self::SelfContainment { obj, container } => {
                write!(f, "object {} cannot go into {}", obj.0, container.0)
            }
        }
    }
}

impl std::error::Error for ObjError {}

// ---------------------------------------------------------------------------
// ObjManager
// ---------------------------------------------------------------------------

/// Owns every object and the holder lists that reference them.
#[derive(Clone, Debug, Default)]
pub struct ObjManager {
    objs: Vec<Option<Obj>>,
    types: HashMap<u16, ObjType>,
    cells: HashMap<MapCoord, Vec<ObjId>>,
    inventories: HashMap<ActorId, Vec<ObjId>>,
}

impl ObjManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_type(&mut self, obj_n: u16, ty: ObjType) {
        self.types.insert(obj_n, ty);
    }

    pub fn obj_type(&self, obj_n: u16) -> Option<&ObjType> {
        self.types.get(&obj_n)
    }

    /// Add a detached object to the arena.
    pub fn create(&mut self, mut obj: Obj) -> ObjId {
        obj.location = ObjLocation::Detached;
        obj.contents.clear();
        self.objs.push(Some(obj));
        ObjId((self.objs.len() - 1) as u32)
    }

    /// Create an object and place it on the map.
    pub fn add_to_map(&mut self, obj: Obj, at: MapCoord) -> ObjId {
        let id = self.create(obj);
        self.link(id, ObjLocation::Map(at));
        id
    }

    pub fn get(&self, id: ObjId) -> Option<&Obj> {
        self.objs.get(id.0 as usize).and_then(Option::as_ref)
    }

    pub fn get_mut(&mut self, id: ObjId) -> Option<&mut Obj> {
        self.objs.get_mut(id.0 as usize).and_then(Option::as_mut)
    }

    fn type_of(&self, id: ObjId) -> Option<&ObjType> {
        self.get(id).and_then(|o| self.types.get(&o.obj_n))
    }

    fn has_type_flag(&self, id: ObjId, flag: ObjTypeFlags) -> bool {
        self.type_of(id).is_some_and(|t| t.flags.contains(flag))
    }

    /// Tile used to draw the object's current frame.
    pub fn tile_num(&self, id: ObjId) -> Option<u16> {
        let obj = self.get(id)?;
        let ty = self.types.get(&obj.obj_n)?;
        Some(ty.tile_num + u16::from(obj.frame_n))
    }

    /// Type name, ignoring quantity.
    pub fn type_name(&self, id: ObjId) -> Option<&str> {
        self.type_of(id).map(|t| t.name.as_str())
    }

    /// Display name including the quantity of stacks, e.g. "3 arrows".
    pub fn look_name(&self, id: ObjId) -> String {
        let (Some(obj), Some(ty)) = (self.get(id), self.type_of(id)) else {
            return String::from("nothing");
        };
        if ty.flags.contains(ObjTypeFlags::STACKABLE) && obj.qty != 1 {
            format!("{} {}", obj.qty, ty.plural)
        } else {
            ty.name.clone()
        }
    }

    pub fn is_stackable(&self, id: ObjId) -> bool {
        self.has_type_flag(id, ObjTypeFlags::STACKABLE)
    }

    pub fn is_container(&self, id: ObjId) -> bool {
        self.has_type_flag(id, ObjTypeFlags::CONTAINER)
    }

    pub fn is_door(&self, id: ObjId) -> bool {
        self.has_type_flag(id, ObjTypeFlags::DOOR)
    }

    pub fn is_secret_door(&self, id: ObjId) -> bool {
        self.has_type_flag(id, ObjTypeFlags::SECRET_DOOR)
    }

    pub fn is_readable(&self, id: ObjId) -> bool {
        self.has_type_flag(id, ObjTypeFlags::READABLE)
    }

    pub fn talks(&self, id: ObjId) -> bool {
        self.has_type_flag(id, ObjTypeFlags::TALKS)
    }

    pub fn is_searchable(&self, id: ObjId) -> bool {
        self.has_type_flag(id, ObjTypeFlags::SEARCHABLE)
    }

    pub fn weight(&self, id: ObjId) -> u8 {
        self.type_of(id).map_or(0, |t| t.weight)
    }

    /// Whether the object's type can be picked up at all.
    pub fn is_gettable(&self, id: ObjId) -> bool {
        !matches!(self.weight(id), 0 | 255)
    }

    // --- holder lists ---

    /// Objects on a map cell, bottom of the pile first.
    pub fn objs_at(&self, at: MapCoord) -> &[ObjId] {
        self.cells.get(&at).map_or(&[], Vec::as_slice)
    }

    pub fn inventory(&self, actor: ActorId) -> &[ObjId] {
        self.inventories.get(&actor).map_or(&[], Vec::as_slice)
    }

    /// All map cells that currently hold objects.
    pub fn occupied_cells(&self) -> impl Iterator<Item = MapCoord> + '_ {
        self.cells.iter().filter(|(_, v)| !v.is_empty()).map(|(c, _)| *c)
    }

    /// The actor carrying this object, directly or inside containers.
    pub fn holder_actor(&self, id: ObjId) -> Option<ActorId> {
        let mut cur = id;
        loop {
            match self.get(cur)?.location {
                ObjLocation::Inventory(a) => return Some(a),
                ObjLocation::Container(c) => cur = c,
                _ => return None,
            }
        }
    }

    /// The map position of this object or of the outermost container
    /// lying on the map.
    pub fn root_map_coord(&self, id: ObjId) -> Option<MapCoord> {
        let mut cur = id;
        loop {
            match self.get(cur)?.location {
                ObjLocation::Map(c) => return Some(c),
                ObjLocation::Container(c) => cur = c,
                _ => return None,
            }
        }
    }

    /// Whether `inner` is `outer` or nested somewhere inside it.
    pub fn is_inside(&self, inner: ObjId, outer: ObjId) -> bool {
        let mut cur = inner;
        loop {
            if cur == outer {
                return true;
            }
            match self.get(cur).map(|o| o.location) {
                Some(ObjLocation::Container(c)) => cur = c,
                _ => return false,
            }
        }
    }

    // --- moves ---

    fn unlink(&mut self, id: ObjId) {
        let Some(loc) = self.get(id).map(|o| o.location) else {
            return;
        };
        let list = match loc {
            ObjLocation::Detached => None,
            ObjLocation::Map(c) => self.cells.get_mut(&c),
            ObjLocation::Inventory(a) => self.inventories.get_mut(&a),
            ObjLocation::Container(c) => self.get_mut(c).map(|o| &mut o.contents),
        };
        if let Some(list) = list {
            list.retain(|&o| o != id);
        }
        if let ObjLocation::Map(c) = loc {
            if self.cells.get(&c).is_some_and(Vec::is_empty) {
                self.cells.remove(&c);
            }
        }
        if let Some(o) = self.get_mut(id) {
            o.location = ObjLocation::Detached;
        }
    }

    fn link(&mut self, id: ObjId, loc: ObjLocation) {
        match loc {
            ObjLocation::Detached => {}
            ObjLocation::Map(c) => self.cells.entry(c).or_default().push(id),
            ObjLocation::Inventory(a) => self.inventories.entry(a).or_default().push(id),
            ObjLocation::Container(c) => {
                if let Some(o) = self.get_mut(c) {
                    o.contents.push(id);
                }
            }
        }
        if let Some(o) = self.get_mut(id) {
            o.location = loc;
        }
    }

    fn relocate(&mut self, id: ObjId, loc: ObjLocation) -> Result<(), ObjError> {
        if self.get(id).is_none() {
            return Err(ObjError::NoSuchObj(id));
        }
        self.unlink(id);
        self.link(id, loc);
        Ok(())
    }

    /// Move an object onto the top of a map cell's pile.
    pub fn moveto_map(&mut self, id: ObjId, at: MapCoord) -> Result<(), ObjError> {
        self.relocate(id, ObjLocation::Map(at))
    }

    pub fn moveto_inventory(&mut self, id: ObjId, actor: ActorId) -> Result<(), ObjError> {
        self.relocate(id, ObjLocation::Inventory(actor))
    }

    /// Move an object into another object's contents.
    ///
    /// Refuses to put an object into itself or into anything it contains.
    pub fn moveto_container(&mut self, id: ObjId, container: ObjId) -> Result<(), ObjError> {
        if self.get(container).is_none() {
            return Err(ObjError::NoSuchObj(container));
        }
        if self.is_inside(container, id) {
            return Err(ObjError::SelfContainment { obj: id, container });
        }
        self.relocate(id, ObjLocation::Container(container))
    }

    /// Remove an object and everything inside it from the world.
    ///
    /// Objects still held by a script stay in the arena, detached, until
    /// their last [`release`](Self::release).
    pub fn delete(&mut self, id: ObjId) {
        let children = self.get(id).map(|o| o.contents.clone()).unwrap_or_default();
        for child in children {
            self.delete(child);
        }
        self.unlink(id);
        let referenced = self.get(id).is_some_and(Obj::is_script_referenced);
        if !referenced {
            if let Some(slot) = self.objs.get_mut(id.0 as usize) {
                *slot = None;
            }
        }
    }

    /// Mark the object as referenced by a script handle.
    pub fn retain(&mut self, id: ObjId) {
        if let Some(o) = self.get_mut(id) {
            o.script_refs += 1;
        }
    }

    /// Drop one script reference. A detached object with no references
    /// left is freed.
    pub fn release(&mut self, id: ObjId) {
        let Some(o) = self.get_mut(id) else {
            return;
        };
        o.script_refs = o.script_refs.saturating_sub(1);
        if o.script_refs == 0 && o.location == ObjLocation::Detached {
            if let Some(slot) = self.objs.get_mut(id.0 as usize) {
                *slot = None;
            }
        }
    }

    /// Take `count` items off a stack.
    ///
    /// Returns the same object when the whole stack is taken or the object
    /// does not stack; otherwise a new detached object holding `count`
    /// items, with the original reduced by that amount.
    pub fn get_obj_from_stack(&mut self, id: ObjId, count: u16) -> Result<ObjId, ObjError> {
        let obj = self.get(id).ok_or(ObjError::NoSuchObj(id))?;
        if count == 0 || obj.qty <= count || !self.is_stackable(id) {
            return Ok(id);
        }
        let mut split = obj.clone();
        split.qty = count;
        split.script_refs = 0;
        if let Some(o) = self.get_mut(id) {
            o.qty -= count;
        }
        Ok(self.create(split))
    }

    /// Whether `src` may be stored inside `target`.
    pub fn can_store_obj(&self, target: ObjId, src: ObjId) -> bool {
        target != src
            && self.get(target).is_some()
            && self.is_gettable(src)
            && self.is_container(target)
            && !self.is_inside(target, src)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BAG: u16 = 1;
    const GOLD: u16 = 2;

    fn manager() -> ObjManager {
        let mut om = ObjManager::new();
        om.register_type(BAG, ObjType::new("bag", 300, 5).with_flags(ObjTypeFlags::CONTAINER));
        om.register_type(
            GOLD,
            ObjType::new("gold coin", 310, 1).with_flags(ObjTypeFlags::STACKABLE),
        );
        om
    }

    fn holders(om: &ObjManager, id: ObjId, at: MapCoord, actor: ActorId, bag: ObjId) -> usize {
        let on_map = om.objs_at(at).iter().filter(|&&o| o == id).count();
        let carried = om.inventory(actor).iter().filter(|&&o| o == id).count();
        let contained = om
            .get(bag)
            .map_or(0, |b| b.contents().iter().filter(|&&o| o == id).count());
        on_map + carried + contained
    }

    #[test]
    fn test_single_ownership_across_moves() {
        let mut om = manager();
        let at = MapCoord::new(5, 5, 0);
        let actor = ActorId(1);
        let bag = om.add_to_map(Obj::new(BAG, 0), MapCoord::new(9, 9, 0));
        let coin = om.add_to_map(Obj::new(GOLD, 0), at);
        assert_eq!(holders(&om, coin, at, actor, bag), 1);

        om.moveto_inventory(coin, actor).unwrap();
        assert_eq!(holders(&om, coin, at, actor, bag), 1);
        assert!(om.objs_at(at).is_empty(), "map cell emptied");

        om.moveto_container(coin, bag).unwrap();
        assert_eq!(holders(&om, coin, at, actor, bag), 1);
        assert!(om.inventory(actor).is_empty());

        om.moveto_map(coin, at).unwrap();
        assert_eq!(holders(&om, coin, at, actor, bag), 1);
        assert_eq!(om.get(coin).and_then(Obj::map_coord), Some(at));
    }

    #[test]
    fn test_container_refuses_self() {
        let mut om = manager();
        let outer = om.add_to_map(Obj::new(BAG, 0), MapCoord::new(1, 1, 0));
        let inner = om.add_to_map(Obj::new(BAG, 0), MapCoord::new(1, 1, 0));
        om.moveto_container(inner, outer).unwrap();
        assert_eq!(
            om.moveto_container(outer, outer),
            Err(ObjError::SelfContainment { obj: outer, container: outer })
        );
        assert!(om.moveto_container(outer, inner).is_err(), "cycle");
        assert!(!om.can_store_obj(inner, outer));
        assert_eq!(om.root_map_coord(inner), Some(MapCoord::new(1, 1, 0)));
    }

    #[test]
    fn test_stack_split() {
        let mut om = manager();
        let coins = om.add_to_map(Obj::new(GOLD, 0).with_qty(5), MapCoord::new(0, 0, 0));
        let part = om.get_obj_from_stack(coins, 2).unwrap();
        assert_ne!(part, coins);
        assert_eq!(om.get(part).map(|o| o.qty), Some(2));
        assert_eq!(om.get(coins).map(|o| o.qty), Some(3));
        assert_eq!(om.get_obj_from_stack(coins, 3).unwrap(), coins, "whole stack");
        assert_eq!(om.look_name(coins), "3 gold coins");
    }

    #[test]
    fn test_delete_respects_script_refs() {
        let mut om = manager();
        let bag = om.add_to_map(Obj::new(BAG, 0), MapCoord::new(0, 0, 0));
        let coin = om.create(Obj::new(GOLD, 0));
        om.moveto_container(coin, bag).unwrap();
        om.retain(bag);
        om.delete(bag);
        assert!(om.get(bag).is_some(), "still referenced by a script");
        assert!(om.get(coin).is_none(), "contents are freed");
        om.release(bag);
        assert!(om.get(bag).is_none());
    }
}
