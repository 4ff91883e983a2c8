//! Actors and the fixed-size [`ActorTable`].

use std::ops::BitOr;

use nuvie_core::MapCoord;

use crate::obj::ObjId;

/// Index into the actor table.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActorId(pub u16);

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Alignment {
    #[default]
    Neutral,
    Good,
    Evil,
    Chaotic,
}

impl Alignment {
    /// Whether an actor of this alignment fights the party.
    pub const fn is_hostile(self) -> bool {
        matches!(self, Alignment::Evil | Alignment::Chaotic)
    }
}

/// Actor status flags.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct ActorStatus(pub u8);

impl ActorStatus {
    pub const NONE: Self = Self(0);
    /// Not drawn normally; shown with the invisibility remap.
    pub const INVISIBLE: Self = Self(1 << 0);
    pub const PROTECTED: Self = Self(1 << 1);
    pub const CURSED: Self = Self(1 << 2);
    pub const ASLEEP: Self = Self(1 << 3);
    pub const PARALYZED: Self = Self(1 << 4);
    /// Cannot be pushed out of the way.
    pub const IMMOBILE: Self = Self(1 << 5);

    #[inline]
    pub const fn contains(self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }
}

impl BitOr for ActorStatus {
    type Output = Self;
    #[inline]
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// A creature or person on the map.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Actor {
    pub id: ActorId,
    pub name: String,
    pub pos: MapCoord,
    pub tile_num: u16,
    pub frame_n: u8,
    pub alignment: Alignment,
    pub status: ActorStatus,
    /// Light radius carried by the actor.
    pub light: u8,
    pub hp: u8,
    pub movement_points: i16,
    /// Objects drawn around a multi-tile actor (e.g. a dragon's body).
    pub surrounding_objs: Vec<ObjId>,
    /// False for table slots not currently in the world.
    pub alive: bool,
}

impl Actor {
    pub fn new(id: ActorId, name: &str, pos: MapCoord, tile_num: u16) -> Self {
        Self {
            id,
            name: name.to_string(),
            pos,
            tile_num,
            frame_n: 0,
            alignment: Alignment::Neutral,
            status: ActorStatus::NONE,
            light: 0,
            hp: 30,
            movement_points: 0,
            surrounding_objs: Vec::new(),
            alive: true,
        }
    }

    /// Tile drawn for the actor's current pose.
    #[inline]
    pub fn tile(&self) -> u16 {
        self.tile_num + u16::from(self.frame_n)
    }

    #[inline]
    pub fn is(&self, status: ActorStatus) -> bool {
        self.status.contains(status)
    }

    #[inline]
    pub fn is_on_map(&self) -> bool {
        self.alive && self.hp > 0
    }
}

/// The fixed table of actors, with a designated player.
#[derive(Clone, Debug, Default)]
pub struct ActorTable {
    actors: Vec<Actor>,
    player: ActorId,
}

impl ActorTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an actor, returning its id.
    pub fn add(&mut self, name: &str, pos: MapCoord, tile_num: u16) -> ActorId {
        let id = ActorId(self.actors.len() as u16);
        self.actors.push(Actor::new(id, name, pos, tile_num));
        id
    }

    pub fn get(&self, id: ActorId) -> Option<&Actor> {
        self.actors.get(id.0 as usize)
    }

    pub fn get_mut(&mut self, id: ActorId) -> Option<&mut Actor> {
        self.actors.get_mut(id.0 as usize)
    }

    pub fn set_player(&mut self, id: ActorId) {
        self.player = id;
    }

    pub fn player_id(&self) -> ActorId {
        self.player
    }

    pub fn player(&self) -> Option<&Actor> {
        self.get(self.player)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Actor> {
        self.actors.iter()
    }

    /// The living actor standing at `at`, if any.
    pub fn actor_at(&self, at: MapCoord) -> Option<ActorId> {
        self.actors
            .iter()
            .find(|a| a.is_on_map() && a.pos == at)
            .map(|a| a.id)
    }

    /// Actor number `n` as used by shrine and statue objects.
    pub fn by_number(&self, n: u8) -> Option<ActorId> {
        self.get(ActorId(u16::from(n))).map(|a| a.id)
    }
}
