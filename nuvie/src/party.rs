//! The player's party: members, combat state and resting.

use log::debug;
use nuvie_world::{ActorId, World};

use crate::clock::GameClock;

/// Hostile actors closer than this prevent resting.
const FOES_NEAR_DISTANCE: u16 = 8;

/// Hit points regained per hour of sleep.
const HP_PER_HOUR: u8 = 2;

/// A rest the party has agreed on and is gathering for.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct RestPlan {
    pub hours: u16,
    /// Index of the member keeping watch.
    pub guard: Option<usize>,
}

#[derive(Clone, Debug, Default)]
pub struct Party {
    members: Vec<ActorId>,
    in_combat: bool,
    /// A torch or similar is lit.
    pub light_source: bool,
    gathering: Option<RestPlan>,
}

impl Party {
    pub fn new(members: Vec<ActorId>) -> Self {
        Self {
            members,
            ..Self::default()
        }
    }

    pub fn size(&self) -> usize {
        self.members.len()
    }

    pub fn member(&self, index: usize) -> Option<ActorId> {
        self.members.get(index).copied()
    }

    pub fn index_of(&self, actor: ActorId) -> Option<usize> {
        self.members.iter().position(|&a| a == actor)
    }

    pub fn contains(&self, actor: ActorId) -> bool {
        self.index_of(actor).is_some()
    }

    pub fn add_member(&mut self, actor: ActorId) {
        if !self.contains(actor) {
            self.members.push(actor);
        }
    }

    pub fn is_in_combat(&self) -> bool {
        self.in_combat
    }

    pub fn set_in_combat(&mut self, in_combat: bool) {
        self.in_combat = in_combat;
    }

    /// Why the party cannot rest here, if it cannot.
    pub fn can_rest(&self, world: &World) -> Result<(), &'static str> {
        if self.in_combat {
            return Err("\nNot while in combat!");
        }
        let Some(leader) = world.player_pos() else {
            return Err("\nNot possible");
        };
        let foes = world.actors.iter().any(|a| {
            a.is_on_map()
                && a.alignment.is_hostile()
                && a.pos.z == leader.z
                && a.pos.distance(leader) < FOES_NEAR_DISTANCE
        });
        if foes {
            return Err("\nNot while foes are near!");
        }
        Ok(())
    }

    /// Start gathering around the campfire.
    pub fn rest_gather(&mut self, plan: RestPlan) {
        debug!("party gathers to rest for {} hours", plan.hours);
        self.gathering = Some(plan);
    }

    pub fn gathering(&self) -> Option<RestPlan> {
        self.gathering
    }

    /// Sleep through the gathered rest: time passes and everyone but the
    /// guard heals.
    pub fn rest_sleep(&mut self, world: &mut World, clock: &mut GameClock) -> Option<RestPlan> {
        let plan = self.gathering.take()?;
        clock.advance_hours(u32::from(plan.hours));
        let heal = HP_PER_HOUR.saturating_mul(plan.hours.min(255) as u8);
        for (i, &id) in self.members.iter().enumerate() {
            if Some(i) == plan.guard {
                continue;
            }
            if let Some(a) = world.actors.get_mut(id) {
                a.hp = a.hp.saturating_add(heal);
            }
        }
        Some(plan)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nuvie_core::MapCoord;
    use nuvie_world::Alignment;

    fn world() -> (World, ActorId, ActorId) {
        let mut w = World::new();
        w.map.add_level(64, 64, 1);
        let avatar = w.actors.add("Avatar", MapCoord::new(10, 10, 0), 100);
        let dupre = w.actors.add("Dupre", MapCoord::new(11, 10, 0), 101);
        w.actors.set_player(avatar);
        (w, avatar, dupre)
    }

    #[test]
    fn test_foes_prevent_rest() {
        let (mut w, avatar, _) = world();
        let party = Party::new(vec![avatar]);
        assert!(party.can_rest(&w).is_ok());
        let troll = w.actors.add("troll", MapCoord::new(14, 10, 0), 200);
        if let Some(t) = w.actors.get_mut(troll) {
            t.alignment = Alignment::Evil;
        }
        assert_eq!(party.can_rest(&w), Err("\nNot while foes are near!"));
    }

    #[test]
    fn test_sleep_heals_all_but_guard() {
        let (mut w, avatar, dupre) = world();
        let mut party = Party::new(vec![avatar, dupre]);
        let mut clock = GameClock::new(20, 0);
        party.rest_gather(RestPlan { hours: 3, guard: Some(1) });
        let before = w.actors.get(dupre).map(|a| a.hp);
        assert!(party.rest_sleep(&mut w, &mut clock).is_some());
        assert_eq!(clock.hour(), 23);
        assert_eq!(w.actors.get(avatar).map(|a| a.hp), Some(36));
        assert_eq!(w.actors.get(dupre).map(|a| a.hp), before, "guard stays awake");
        assert!(party.rest_sleep(&mut w, &mut clock).is_none(), "plan consumed");
    }
}
