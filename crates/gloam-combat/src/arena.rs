//! Ownership and spatial queries for everything that fights.

use ahash::AHashMap;
use gloam_common::{Aabb, Circle, EntityId};

use crate::enemy::Enemy;
use crate::entity::{CombatCapable, Combatant, Role};
use crate::player::Player;

/// A combat participant.
#[derive(Debug, Clone)]
pub enum Actor {
    /// The player
    Player(Box<Player>),
    /// A hostile agent
    Enemy(Box<Enemy>),
}

impl Actor {
    /// Returns the enemy, if this is one.
    #[must_use]
    pub fn as_enemy(&self) -> Option<&Enemy> {
        match self {
            Self::Enemy(enemy) => Some(&**enemy),
            Self::Player(_) => None,
        }
    }

    /// Returns the enemy mutably, if this is one.
    pub fn as_enemy_mut(&mut self) -> Option<&mut Enemy> {
        match self {
            Self::Enemy(enemy) => Some(&mut **enemy),
            Self::Player(_) => None,
        }
    }

    /// Returns the player, if this is it.
    #[must_use]
    pub fn as_player(&self) -> Option<&Player> {
        match self {
            Self::Player(player) => Some(&**player),
            Self::Enemy(_) => None,
        }
    }

    /// Returns the player mutably, if this is it.
    pub fn as_player_mut(&mut self) -> Option<&mut Player> {
        match self {
            Self::Player(player) => Some(&mut **player),
            Self::Enemy(_) => None,
        }
    }
}

impl CombatCapable for Actor {
    fn combatant(&self) -> &Combatant {
        match self {
            Self::Player(player) => player.combatant(),
            Self::Enemy(enemy) => enemy.combatant(),
        }
    }

    fn combatant_mut(&mut self) -> &mut Combatant {
        match self {
            Self::Player(player) => player.combatant_mut(),
            Self::Enemy(enemy) => enemy.combatant_mut(),
        }
    }
}

impl From<Player> for Actor {
    fn from(player: Player) -> Self {
        Self::Player(Box::new(player))
    }
}

impl From<Enemy> for Actor {
    fn from(enemy: Enemy) -> Self {
        Self::Enemy(Box::new(enemy))
    }
}

/// All actors in the current encounter.
#[derive(Debug, Clone, Default)]
pub struct CombatArena {
    actors: AHashMap<EntityId, Actor>,
    player: Option<EntityId>,
}

impl CombatArena {
    /// Creates an empty arena.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an actor. Returns its id.
    pub fn spawn(&mut self, actor: impl Into<Actor>) -> EntityId {
        let actor = actor.into();
        let id = actor.id();
        if actor.role() == Role::Player {
            self.player = Some(id);
        }
        self.actors.insert(id, actor);
        id
    }

    /// Removes an actor.
    pub fn despawn(&mut self, id: EntityId) -> Option<Actor> {
        if self.player == Some(id) {
            self.player = None;
        }
        self.actors.remove(&id)
    }

    /// Looks up an actor.
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&Actor> {
        self.actors.get(&id)
    }

    /// Looks up an actor mutably.
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Actor> {
        self.actors.get_mut(&id)
    }

    /// Combat state of an actor.
    #[must_use]
    pub fn combatant(&self, id: EntityId) -> Option<&Combatant> {
        self.actors.get(&id).map(CombatCapable::combatant)
    }

    /// Combat state of an actor, mutably.
    pub fn combatant_mut(&mut self, id: EntityId) -> Option<&mut Combatant> {
        self.actors.get_mut(&id).map(CombatCapable::combatant_mut)
    }

    /// Enemy by id.
    pub fn enemy_mut(&mut self, id: EntityId) -> Option<&mut Enemy> {
        self.actors.get_mut(&id).and_then(Actor::as_enemy_mut)
    }

    /// Returns true if the actor exists.
    #[must_use]
    pub fn contains(&self, id: EntityId) -> bool {
        self.actors.contains_key(&id)
    }

    /// Id of the player, if spawned.
    #[must_use]
    pub fn player_id(&self) -> Option<EntityId> {
        self.player
    }

    /// The player, if spawned.
    #[must_use]
    pub fn player(&self) -> Option<&Player> {
        self.player
            .and_then(|id| self.actors.get(&id))
            .and_then(Actor::as_player)
    }

    /// The player mutably, if spawned.
    pub fn player_mut(&mut self) -> Option<&mut Player> {
        let id = self.player?;
        self.actors.get_mut(&id).and_then(Actor::as_player_mut)
    }

    /// Ids of all enemies, in spawn order.
    #[must_use]
    pub fn enemy_ids(&self) -> Vec<EntityId> {
        let mut ids: Vec<_> = self
            .actors
            .iter()
            .filter(|(_, actor)| actor.role() == Role::Enemy)
            .map(|(id, _)| *id)
            .collect();
        ids.sort_unstable();
        ids
    }

    /// Iterates all actors.
    pub fn iter(&self) -> impl Iterator<Item = &Actor> {
        self.actors.values()
    }

    /// Iterates all actors mutably.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Actor> {
        self.actors.values_mut()
    }

    /// Number of actors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.actors.len()
    }

    /// Returns true if no actors exist.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.actors.is_empty()
    }

    /// Active actors whose movement collider overlaps `circle`, by id.
    #[must_use]
    pub fn bodies_in_radius(&self, circle: &Circle) -> Vec<EntityId> {
        let mut ids: Vec<_> = self
            .actors
            .values()
            .map(CombatCapable::combatant)
            .filter(|c| c.active && circle.overlaps_aabb(&c.body()))
            .map(|c| c.id)
            .collect();
        ids.sort_unstable();
        ids
    }

    /// Active actors of `role` whose hit zone overlaps `bounds`, by id.
    #[must_use]
    pub fn hit_zones_overlapping(&self, bounds: &Aabb, role: Role) -> Vec<EntityId> {
        let mut ids: Vec<_> = self
            .actors
            .values()
            .map(CombatCapable::combatant)
            .filter(|c| c.active && c.role == role && bounds.overlaps(&c.hit_zone()))
            .map(|c| c.id)
            .collect();
        ids.sort_unstable();
        ids
    }
}
