//! Guarding stance.
//!
//! Raising a guard pushes a [`LockReason::Block`] input lock, which
//! suspends movement and attacks. Lowering it pops only that lock, so locks
//! held by dialogs or cutscenes stay in force.

use tracing::trace;

use crate::entity::Combatant;
use crate::input_lock::LockReason;

/// Raises the guard. Returns false if a guard rejects the request.
pub fn begin_block(defender: &mut Combatant) -> bool {
    if defender.is_blocking
        || defender.is_attacking
        || !defender.can_block
        || !defender.can_move()
    {
        trace!(entity = %defender.id, "block rejected");
        return false;
    }

    defender.is_blocking = true;
    defender.locks.push(LockReason::Block);
    defender.movement.stop();
    defender.block_tint = true;
    true
}

/// Lowers the guard. Returns false if the defender was not blocking.
pub fn end_block(defender: &mut Combatant) -> bool {
    if !defender.is_blocking {
        return false;
    }

    defender.is_blocking = false;
    defender.locks.pop(LockReason::Block);
    defender.block_tint = false;
    true
}
