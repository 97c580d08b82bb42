#![cfg_attr(not(test), no_std)]

mod engine;
mod errors;
mod events;
mod host;
mod ledger;
mod lp_token;
mod math;
mod reentrancy;
mod storage;

#[cfg(test)]
extern crate std;

#[cfg(test)]
mod test;

use soroban_sdk::{contract, contractimpl, token::TokenClient, Address, Env, String};
use soroban_token_sdk::{metadata::TokenMetadata, TokenUtils};

pub use errors::PairError;

use engine::PairEngine;
use host::{CallContext, TokenHost};
use storage::{PersistentLedger, PoolState};

/// LP shares follow the Stellar asset convention.
const LP_DECIMALS: u32 = 7;

#[contract]
pub struct Pair;

/// Runs one engine operation against contract storage under the pair lock,
/// committing the pool state only if it succeeds.
fn run<T>(
    env: &Env,
    op: impl FnOnce(&mut PairEngine<PersistentLedger, TokenHost>) -> Result<T, PairError>,
) -> Result<T, PairError> {
    let mut state = storage::get_pool_state(env).ok_or(PairError::NotInitialized)?;
    reentrancy::acquire(env)?;

    let mut ledger = PersistentLedger::new(env);
    let assets = TokenHost::new(env);
    let out = op(&mut PairEngine::new(env, &mut state, &mut ledger, &assets))?;

    storage::set_pool_state(env, &state);
    storage::extend_instance_ttl(env);
    reentrancy::release(env);
    Ok(out)
}

fn pool_state(env: &Env) -> Result<PoolState, PairError> {
    storage::get_pool_state(env).ok_or(PairError::NotInitialized)
}

#[contractimpl]
impl Pair {
    pub fn initialize(
        env: Env,
        token_0: Address,
        token_1: Address,
        fee_recipient: Address,
        name: String,
        symbol: String,
    ) -> Result<(), PairError> {
        if storage::has_pool_state(&env) {
            return Err(PairError::AlreadyInitialized);
        }
        if token_0 == token_1 {
            return Err(PairError::IdenticalTokens);
        }

        storage::set_pool_state(&env, &PoolState::new(token_0, token_1, fee_recipient));
        TokenUtils::new(&env).metadata().set_metadata(&TokenMetadata {
            decimal: LP_DECIMALS,
            name,
            symbol,
        });
        storage::extend_instance_ttl(&env);
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Deposit state machine
    // -----------------------------------------------------------------------

    /// Pulls `amount` of `token` from `from` into the pool and credits it to
    /// `to` as a pending deposit. Returns `to`'s pending amount of `token`.
    pub fn deposit(
        env: Env,
        from: Address,
        token: Address,
        amount: i128,
        to: Address,
    ) -> Result<i128, PairError> {
        from.require_auth();
        if amount < 0 {
            return Err(PairError::NegativeAmount);
        }
        let ctx = CallContext::new(&env, from.clone()).with_transfer(token.clone(), amount);
        TokenClient::new(&env, &token).transfer(&from, &ctx.recipient, &amount);
        run(&env, |engine| engine.deposit(&ctx, &to))
    }

    pub fn withdraw(env: Env, sender: Address, to: Address) -> Result<(i128, i128), PairError> {
        sender.require_auth();
        let ctx = CallContext::new(&env, sender);
        run(&env, |engine| engine.withdraw(&ctx, &to))
    }

    // -----------------------------------------------------------------------
    // Liquidity and swaps
    // -----------------------------------------------------------------------

    pub fn mint(env: Env, sender: Address, to: Address) -> Result<i128, PairError> {
        sender.require_auth();
        let ctx = CallContext::new(&env, sender);
        run(&env, |engine| engine.mint(&ctx, &to))
    }

    pub fn burn(
        env: Env,
        sender: Address,
        amount: i128,
        to: Address,
    ) -> Result<(i128, i128), PairError> {
        sender.require_auth();
        let ctx = CallContext::new(&env, sender);
        run(&env, |engine| engine.burn(&ctx, amount, &to))
    }

    /// Sends the requested outputs to `to`. The caller's pending deposits
    /// are consumed as the swap input.
    pub fn swap(
        env: Env,
        sender: Address,
        amount_0_out: i128,
        amount_1_out: i128,
        to: Address,
    ) -> Result<(), PairError> {
        sender.require_auth();
        let ctx = CallContext::new(&env, sender);
        run(&env, |engine| engine.swap(&ctx, amount_0_out, amount_1_out, &to))
    }

    pub fn skim(env: Env, sender: Address, to: Address) -> Result<(i128, i128), PairError> {
        sender.require_auth();
        let ctx = CallContext::new(&env, sender);
        run(&env, |engine| engine.skim(&ctx, &to))
    }

    pub fn sync(env: Env, sender: Address) -> Result<(), PairError> {
        sender.require_auth();
        let ctx = CallContext::new(&env, sender);
        run(&env, |engine| engine.sync(&ctx))
    }

    // -----------------------------------------------------------------------
    // LP token
    // -----------------------------------------------------------------------

    pub fn transfer(env: Env, from: Address, to: Address, amount: i128) -> Result<bool, PairError> {
        from.require_auth();
        let ctx = CallContext::new(&env, from);
        run(&env, |engine| engine.transfer(&ctx, &to, amount))
    }

    pub fn approve(
        env: Env,
        from: Address,
        spender: Address,
        amount: i128,
    ) -> Result<bool, PairError> {
        from.require_auth();
        let ctx = CallContext::new(&env, from);
        run(&env, |engine| engine.approve(&ctx, &spender, amount))
    }

    pub fn transfer_from(
        env: Env,
        spender: Address,
        from: Address,
        to: Address,
        amount: i128,
    ) -> Result<bool, PairError> {
        spender.require_auth();
        let ctx = CallContext::new(&env, spender);
        run(&env, |engine| engine.transfer_from(&ctx, &from, &to, amount))
    }

    pub fn balance(env: Env, id: Address) -> i128 {
        lp_token::balance(&PersistentLedger::new(&env), &id)
    }

    pub fn allowance(env: Env, from: Address, spender: Address) -> i128 {
        lp_token::allowance(&PersistentLedger::new(&env), &from, &spender)
    }

    pub fn total_supply(env: Env) -> Result<i128, PairError> {
        Ok(pool_state(&env)?.total_supply)
    }

    pub fn decimals(env: Env) -> u32 {
        TokenUtils::new(&env).metadata().get_metadata().decimal
    }

    pub fn name(env: Env) -> String {
        TokenUtils::new(&env).metadata().get_metadata().name
    }

    pub fn symbol(env: Env) -> String {
        TokenUtils::new(&env).metadata().get_metadata().symbol
    }

    // -----------------------------------------------------------------------
    // Views
    // -----------------------------------------------------------------------

    pub fn get_reserves(env: Env) -> Result<(i128, i128), PairError> {
        let state = pool_state(&env)?;
        Ok((state.reserve_0, state.reserve_1))
    }

    pub fn get_pending_deposits(env: Env, owner: Address) -> (i128, i128) {
        ledger::pending_deposit(&PersistentLedger::new(&env), &owner).amounts()
    }

    pub fn get_deposit_totals(env: Env) -> Result<(i128, i128), PairError> {
        let state = pool_state(&env)?;
        Ok((state.deposit_total_0, state.deposit_total_1))
    }

    pub fn k_last(env: Env) -> Result<u128, PairError> {
        Ok(pool_state(&env)?.k_last)
    }

    pub fn token_0(env: Env) -> Result<Address, PairError> {
        Ok(pool_state(&env)?.token_0)
    }

    pub fn token_1(env: Env) -> Result<Address, PairError> {
        Ok(pool_state(&env)?.token_1)
    }

    pub fn fee_recipient(env: Env) -> Result<Address, PairError> {
        Ok(pool_state(&env)?.fee_recipient)
    }

    pub fn get_amount_out(
        _env: Env,
        amount_in: i128,
        reserve_in: i128,
        reserve_out: i128,
    ) -> Result<i128, PairError> {
        math::get_amount_out(amount_in, reserve_in, reserve_out)
    }

    pub fn get_amount_in(
        _env: Env,
        amount_out: i128,
        reserve_in: i128,
        reserve_out: i128,
    ) -> Result<i128, PairError> {
        math::get_amount_in(amount_out, reserve_in, reserve_out)
    }
}
