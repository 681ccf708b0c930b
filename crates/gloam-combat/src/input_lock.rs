//! Reference-counted input locks.
//!
//! Several systems (combat, dialog, cutscenes) need to suspend an entity's
//! movement or attacks. Each pushes a named lock and pops the same lock on
//! its own exit path. `can_move` and `can_attack` are true only while no
//! lock with the matching scope is held, so one system releasing its lock
//! never re-enables input another system still holds.

use ahash::AHashMap;

/// Why input is locked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LockReason {
    /// An attack swing is in progress.
    Swing,
    /// The entity is guarding.
    Block,
    /// A dialog window is open.
    Dialog,
    /// A scripted scene is playing.
    Cutscene,
    /// Game-specific lock owned by an outside system.
    Custom(&'static str),
}

/// Which inputs a lock suspends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockScope {
    /// Lock suspends movement.
    pub movement: bool,
    /// Lock suspends attacking.
    pub attack: bool,
}

impl LockReason {
    /// Returns the inputs this lock suspends.
    ///
    /// A swing only blocks further attacks; movement during a swing is
    /// frozen through the entity's max speed instead.
    #[must_use]
    pub const fn scope(self) -> LockScope {
        match self {
            Self::Swing => LockScope {
                movement: false,
                attack: true,
            },
            Self::Block | Self::Dialog | Self::Cutscene | Self::Custom(_) => LockScope {
                movement: true,
                attack: true,
            },
        }
    }
}

/// Set of currently held input locks.
#[derive(Debug, Clone, Default)]
pub struct InputLocks {
    counts: AHashMap<LockReason, u32>,
}

impl InputLocks {
    /// Creates an empty lock set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquires one reference to `reason`.
    pub fn push(&mut self, reason: LockReason) {
        *self.counts.entry(reason).or_insert(0) += 1;
    }

    /// Releases one reference to `reason`. Returns false if it was not held.
    pub fn pop(&mut self, reason: LockReason) -> bool {
        match self.counts.get_mut(&reason) {
            Some(count) if *count > 1 => {
                *count -= 1;
                true
            },
            Some(_) => {
                self.counts.remove(&reason);
                true
            },
            None => false,
        }
    }

    /// Acquires `reason` only if it is not already held.
    pub fn ensure(&mut self, reason: LockReason) {
        self.counts.entry(reason).or_insert(1);
    }

    /// Drops every reference to `reason`.
    pub fn release_all(&mut self, reason: LockReason) {
        self.counts.remove(&reason);
    }

    /// Returns true if `reason` is held at least once.
    #[must_use]
    pub fn holds(&self, reason: LockReason) -> bool {
        self.counts.contains_key(&reason)
    }

    /// Returns how many references to `reason` are held.
    #[must_use]
    pub fn count(&self, reason: LockReason) -> u32 {
        self.counts.get(&reason).copied().unwrap_or(0)
    }

    /// Returns true if no held lock suspends movement.
    #[must_use]
    pub fn can_move(&self) -> bool {
        !self.counts.keys().any(|reason| reason.scope().movement)
    }

    /// Returns true if no held lock suspends attacking.
    #[must_use]
    pub fn can_attack(&self) -> bool {
        !self.counts.keys().any(|reason| reason.scope().attack)
    }

    /// Returns true if no locks are held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_locks_are_permissive() {
        let locks = InputLocks::new();
        assert!(locks.can_move());
        assert!(locks.can_attack());
    }

    #[test]
    fn test_swing_lock_blocks_attack_only() {
        let mut locks = InputLocks::new();
        locks.push(LockReason::Swing);
        assert!(locks.can_move());
        assert!(!locks.can_attack());
    }

    #[test]
    fn test_locks_are_reference_counted() {
        let mut locks = InputLocks::new();
        locks.push(LockReason::Dialog);
        locks.push(LockReason::Dialog);
        assert!(locks.pop(LockReason::Dialog));
        assert!(!locks.can_move());
        assert!(locks.pop(LockReason::Dialog));
        assert!(locks.can_move());
        assert!(!locks.pop(LockReason::Dialog));
    }

    #[test]
    fn test_releasing_one_owner_keeps_other_locks() {
        let mut locks = InputLocks::new();
        locks.push(LockReason::Dialog);
        locks.push(LockReason::Block);
        locks.pop(LockReason::Block);
        assert!(!locks.can_move());
        assert!(!locks.can_attack());
        assert!(locks.holds(LockReason::Dialog));
    }

    #[test]
    fn test_ensure_does_not_stack() {
        let mut locks = InputLocks::new();
        locks.ensure(LockReason::Swing);
        locks.ensure(LockReason::Swing);
        assert_eq!(locks.count(LockReason::Swing), 1);
        locks.release_all(LockReason::Swing);
        assert!(locks.is_empty());
    }
}
