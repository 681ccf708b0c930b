//! Event bus for combat notifications.
//!
//! HUD, audio, VFX and floating-text systems subscribe by draining the bus
//! once per frame. Publishing never blocks; when the bus is full the event
//! is dropped.

use crossbeam_channel::{bounded, Receiver, Sender};
use gloam_common::{EntityId, ItemTypeId, Vec2};
use serde::{Deserialize, Serialize};

use crate::animation::Direction;
use crate::battle::SwingId;
use crate::combat_math::HitKind;

/// Feedback cue for a damaged entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Feedback {
    /// Brief sprite flash
    Flash,
    /// Damage sound
    Sound,
}

/// Event types published by the combat engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CombatEvent {
    /// Attack animation started playing
    SwingStarted {
        /// Swing id
        swing: SwingId,
        /// Attacker
        attacker: EntityId,
    },
    /// Hitbox became collision-testable
    HitboxSpawned {
        /// Swing id
        swing: SwingId,
        /// Attacker
        attacker: EntityId,
        /// Facing the hitbox was aimed at
        direction: Direction,
    },
    /// Hitbox destroyed
    HitboxRetired {
        /// Swing id
        swing: SwingId,
        /// Attacker
        attacker: EntityId,
    },
    /// Swing ended normally and the attacker is restored
    SwingComplete {
        /// Swing id
        swing: SwingId,
        /// Attacker
        attacker: EntityId,
        /// Number of victims hit
        victims: usize,
    },
    /// Swing torn down because the attacker died or left
    SwingCancelled {
        /// Swing id
        swing: SwingId,
        /// Attacker
        attacker: EntityId,
    },
    /// Damage landed
    DamageApplied {
        /// Attacker
        attacker: EntityId,
        /// Victim
        target: EntityId,
        /// Damage dealt
        damage: u32,
        /// Critical or regular
        kind: HitKind,
        /// Victim was blocking
        blocked: bool,
    },
    /// Attack evaded
    AttackMissed {
        /// Attacker
        attacker: EntityId,
        /// Victim
        target: EntityId,
    },
    /// Health bar observers should refresh
    HealthChanged {
        /// Entity
        entity: EntityId,
        /// Current health
        current: i32,
        /// Maximum health
        max: i32,
    },
    /// Visual or audio cue
    Feedback {
        /// Entity
        entity: EntityId,
        /// Cue
        cue: Feedback,
    },
    /// Floating combat text above an entity
    FloatingText {
        /// Entity
        entity: EntityId,
        /// Text, a damage number or `"MISS"`
        text: String,
    },
    /// Experience awarded for a killing blow
    ExperienceAwarded {
        /// Recipient
        recipient: EntityId,
        /// Amount
        amount: u32,
        /// Levels gained
        levels_gained: u32,
    },
    /// Health reached zero
    EntityDefeated {
        /// Entity
        entity: EntityId,
        /// Killer
        by: EntityId,
    },
    /// Entity removed after the teardown delay
    EntityTornDown {
        /// Entity
        entity: EntityId,
    },
    /// Pickup spawned from a drop table
    LootDropped {
        /// Dropping entity
        entity: EntityId,
        /// Item
        item: ItemTypeId,
        /// Pickup position
        position: Vec2,
    },
    /// Guard raised
    BlockStarted {
        /// Entity
        entity: EntityId,
    },
    /// Guard lowered
    BlockEnded {
        /// Entity
        entity: EntityId,
    },
}

/// Event bus for broadcasting combat events.
#[derive(Debug)]
pub struct EventBus {
    /// Sender for broadcasting events
    sender: Sender<CombatEvent>,
    /// Receiver for collecting events
    receiver: Receiver<CombatEvent>,
    /// Channel capacity
    capacity: usize,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(1024)
    }
}

impl EventBus {
    /// Creates a new event bus with the given capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, receiver) = bounded(capacity);
        Self {
            sender,
            receiver,
            capacity,
        }
    }

    /// Publishes an event to the bus.
    pub fn publish(&self, event: CombatEvent) {
        // Non-blocking send - if full, event is dropped
        let _ = self.sender.try_send(event);
    }

    /// Drains all pending events.
    pub fn drain(&self) -> Vec<CombatEvent> {
        self.receiver.try_iter().collect()
    }

    /// Returns the number of pending events.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.receiver.len()
    }

    /// Returns the channel capacity.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Creates a new sender handle for publishing events.
    #[must_use]
    pub fn sender(&self) -> Sender<CombatEvent> {
        self.sender.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_publish_and_drain() {
        let bus = EventBus::new(8);
        let entity = EntityId::from_raw(4);
        bus.publish(CombatEvent::BlockStarted { entity });
        bus.publish(CombatEvent::BlockEnded { entity });
        assert_eq!(bus.pending_count(), 2);

        let events = bus.drain();
        assert_eq!(events[0], CombatEvent::BlockStarted { entity });
        assert_eq!(bus.pending_count(), 0);
    }

    #[test]
    fn test_full_bus_drops_events() {
        let bus = EventBus::new(1);
        let entity = EntityId::from_raw(1);
        bus.publish(CombatEvent::BlockStarted { entity });
        bus.publish(CombatEvent::BlockEnded { entity });
        assert_eq!(bus.drain().len(), 1);
        assert_eq!(bus.capacity(), 1);
    }
}
