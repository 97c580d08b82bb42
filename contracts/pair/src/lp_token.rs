//! LP share ledger: balances, allowances and total supply.
//!
//! `mint` and `burn` are crate-private. Supply only changes through the
//! pair engine's settlement operations.

use soroban_sdk::Address;

use crate::{
    errors::PairError,
    math::MAX_NATIVE_BALANCE,
    storage::{LedgerKey, LedgerStore, PoolState},
};

/// Allowance value that is never decremented.
pub const INFINITE_ALLOWANCE: i128 = MAX_NATIVE_BALANCE;

pub fn balance<S: LedgerStore>(ledger: &S, id: &Address) -> i128 {
    ledger.get_or_zero(&LedgerKey::Balance(id.clone()))
}

pub fn allowance<S: LedgerStore>(ledger: &S, owner: &Address, spender: &Address) -> i128 {
    ledger.get_or_zero(&LedgerKey::Allowance(owner.clone(), spender.clone()))
}

pub(crate) fn mint<S: LedgerStore>(
    ledger: &mut S,
    state: &mut PoolState,
    to: &Address,
    amount: i128,
) -> Result<(), PairError> {
    let supply = state
        .total_supply
        .checked_add(amount)
        .ok_or(PairError::Overflow)?;
    let to_balance = balance(ledger, to)
        .checked_add(amount)
        .ok_or(PairError::Overflow)?;

    ledger.put(&LedgerKey::Balance(to.clone()), to_balance);
    state.total_supply = supply;
    Ok(())
}

pub(crate) fn burn<S: LedgerStore>(
    ledger: &mut S,
    state: &mut PoolState,
    from: &Address,
    amount: i128,
) -> Result<(), PairError> {
    let from_balance = balance(ledger, from);
    if from_balance < amount {
        return Err(PairError::InsufficientBalance);
    }
    let supply = state
        .total_supply
        .checked_sub(amount)
        .ok_or(PairError::Overflow)?;

    ledger.put(&LedgerKey::Balance(from.clone()), from_balance - amount);
    state.total_supply = supply;
    Ok(())
}

pub fn transfer<S: LedgerStore>(
    ledger: &mut S,
    from: &Address,
    to: &Address,
    amount: i128,
) -> Result<(), PairError> {
    if amount < 0 {
        return Err(PairError::NegativeAmount);
    }
    let from_balance = balance(ledger, from);
    if from_balance < amount {
        return Err(PairError::InsufficientBalance);
    }
    ledger.put(&LedgerKey::Balance(from.clone()), from_balance - amount);

    // Read after the debit so a self-transfer nets to zero.
    let to_balance = balance(ledger, to)
        .checked_add(amount)
        .ok_or(PairError::Overflow)?;
    ledger.put(&LedgerKey::Balance(to.clone()), to_balance);
    Ok(())
}

pub fn approve<S: LedgerStore>(
    ledger: &mut S,
    owner: &Address,
    spender: &Address,
    amount: i128,
) -> Result<(), PairError> {
    if amount < 0 {
        return Err(PairError::NegativeAmount);
    }
    ledger.put(&LedgerKey::Allowance(owner.clone(), spender.clone()), amount);
    Ok(())
}

/// Charges `amount` against `spender`'s allowance from `owner`.
/// An infinite allowance is left untouched.
pub fn spend_allowance<S: LedgerStore>(
    ledger: &mut S,
    owner: &Address,
    spender: &Address,
    amount: i128,
) -> Result<(), PairError> {
    let current = allowance(ledger, owner, spender);
    if current == INFINITE_ALLOWANCE {
        return Ok(());
    }
    if current < amount {
        return Err(PairError::InsufficientAllowance);
    }
    ledger.put(
        &LedgerKey::Allowance(owner.clone(), spender.clone()),
        current - amount,
    );
    Ok(())
}
