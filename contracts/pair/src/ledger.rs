//! Pending deposits: funds that have reached the pool but are not yet
//! priced into its reserves.

use soroban_sdk::Address;

use crate::{
    errors::PairError,
    math::MAX_BALANCE,
    storage::{LedgerKey, LedgerStore, PoolState},
};

/// Which of the pool's two assets an amount refers to.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Side {
    Token0,
    Token1,
}

/// Where a caller's deposited funds stand.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DepositState {
    /// Nothing pending. Every deposit has been minted, swapped or withdrawn.
    Settled,
    /// Funds have arrived and wait for `mint`, `swap` or `withdraw`.
    Deposited { amount_0: i128, amount_1: i128 },
}

impl DepositState {
    pub fn amounts(&self) -> (i128, i128) {
        match *self {
            DepositState::Settled => (0, 0),
            DepositState::Deposited { amount_0, amount_1 } => (amount_0, amount_1),
        }
    }
}

fn deposit_key(side: Side, owner: &Address) -> LedgerKey {
    match side {
        Side::Token0 => LedgerKey::PendingDeposit0(owner.clone()),
        Side::Token1 => LedgerKey::PendingDeposit1(owner.clone()),
    }
}

pub fn pending_deposit<S: LedgerStore>(ledger: &S, owner: &Address) -> DepositState {
    let amount_0 = ledger.get_or_zero(&deposit_key(Side::Token0, owner));
    let amount_1 = ledger.get_or_zero(&deposit_key(Side::Token1, owner));
    if amount_0 == 0 && amount_1 == 0 {
        DepositState::Settled
    } else {
        DepositState::Deposited { amount_0, amount_1 }
    }
}

/// Adds `amount` to `owner`'s pending deposit on `side` and to the pool-wide
/// aggregate for that asset. Returns the owner's new pending amount.
pub fn credit_deposit<S: LedgerStore>(
    ledger: &mut S,
    state: &mut PoolState,
    side: Side,
    owner: &Address,
    amount: i128,
) -> Result<i128, PairError> {
    let key = deposit_key(side, owner);
    let aggregate = match side {
        Side::Token0 => state.deposit_total_0,
        Side::Token1 => state.deposit_total_1,
    };

    let owner_total = ledger
        .get_or_zero(&key)
        .checked_add(amount)
        .filter(|v| *v <= MAX_BALANCE)
        .ok_or(PairError::AmountOverflow)?;
    let aggregate = aggregate
        .checked_add(amount)
        .filter(|v| *v <= MAX_BALANCE)
        .ok_or(PairError::AmountOverflow)?;

    ledger.put(&key, owner_total);
    match side {
        Side::Token0 => state.deposit_total_0 = aggregate,
        Side::Token1 => state.deposit_total_1 = aggregate,
    }
    Ok(owner_total)
}

/// Moves `owner` from `Deposited` to `Settled`, releasing the amounts from
/// the pool-wide aggregates. Returns what was pending.
pub fn settle_deposit<S: LedgerStore>(
    ledger: &mut S,
    state: &mut PoolState,
    owner: &Address,
) -> Result<(i128, i128), PairError> {
    let (amount_0, amount_1) = match pending_deposit(ledger, owner) {
        DepositState::Settled => return Ok((0, 0)),
        DepositState::Deposited { amount_0, amount_1 } => (amount_0, amount_1),
    };

    let total_0 = state
        .deposit_total_0
        .checked_sub(amount_0)
        .ok_or(PairError::Overflow)?;
    let total_1 = state
        .deposit_total_1
        .checked_sub(amount_1)
        .ok_or(PairError::Overflow)?;

    ledger.remove(&deposit_key(Side::Token0, owner));
    ledger.remove(&deposit_key(Side::Token1, owner));
    state.deposit_total_0 = total_0;
    state.deposit_total_1 = total_1;
    Ok((amount_0, amount_1))
}
