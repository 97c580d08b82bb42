use soroban_sdk::Env;

use crate::{
    errors::PairError,
    storage::{get_reentrancy_guard, set_reentrancy_guard, ReentrancyGuard},
};

/// Acquires the pair lock. Reverts with `Locked` if already held.
///
/// Taken by every mutating entrypoint before the engine runs, so a token
/// contract called during an optimistic transfer cannot re-enter the pair.
/// A failed invocation rolls back all state, the lock write included.
pub fn acquire(env: &Env) -> Result<(), PairError> {
    let guard = get_reentrancy_guard(env);
    if guard.locked {
        return Err(PairError::Locked);
    }
    set_reentrancy_guard(env, &ReentrancyGuard { locked: true });
    Ok(())
}

/// Releases the pair lock once the engine's effects are committed.
pub fn release(env: &Env) {
    set_reentrancy_guard(env, &ReentrancyGuard { locked: false });
}
