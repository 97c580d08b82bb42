//! Pair engine: every value-changing operation of the pool.
//!
//! The engine is independent of how state is persisted and how assets
//! move. It works on a `PoolState` borrowed for the duration of one call,
//! a `LedgerStore` for the per-address maps and an `AssetHost` for external
//! balances and transfers. Preconditions are checked before the first
//! write; anything that fails afterwards relies on the host rolling the
//! call back.

use soroban_sdk::{Address, Env};
use soroban_token_sdk::TokenUtils;

use crate::{
    errors::PairError,
    events::PairEvents,
    host::{AssetHost, CallContext},
    ledger::{self, DepositState, Side},
    lp_token,
    math::{
        self, check_k, mul_div, reserve_product, sqrt, to_unsigned, MAX_BALANCE,
        MINIMUM_LIQUIDITY, PROTOCOL_FEE_DIVISOR,
    },
    storage::{LedgerStore, PoolState},
};

/// Approvals carry no expiry.
const NO_EXPIRATION: u32 = u32::MAX;

pub struct PairEngine<'a, S: LedgerStore, A: AssetHost> {
    env: &'a Env,
    state: &'a mut PoolState,
    ledger: &'a mut S,
    assets: &'a A,
}

impl<'a, S: LedgerStore, A: AssetHost> PairEngine<'a, S, A> {
    pub fn new(env: &'a Env, state: &'a mut PoolState, ledger: &'a mut S, assets: &'a A) -> Self {
        Self {
            env,
            state,
            ledger,
            assets,
        }
    }

    // -----------------------------------------------------------------------
    // Deposit state machine
    // -----------------------------------------------------------------------

    /// Credits the value attached to `ctx` to `to`'s pending deposit.
    /// Returns `to`'s new pending amount for that asset.
    pub fn deposit(&mut self, ctx: &CallContext, to: &Address) -> Result<i128, PairError> {
        if ctx.recipient != ctx.pool {
            return Err(PairError::WrongRecipient);
        }
        if ctx.amount < 0 {
            return Err(PairError::NegativeAmount);
        }
        if ctx.amount > MAX_BALANCE {
            return Err(PairError::AmountOverflow);
        }
        let (side, asset) = match &ctx.asset {
            Some(asset) if *asset == self.state.token_0 => (Side::Token0, asset),
            Some(asset) if *asset == self.state.token_1 => (Side::Token1, asset),
            _ => return Err(PairError::InvalidDepositToken),
        };

        let pending = ledger::credit_deposit(self.ledger, self.state, side, to, ctx.amount)?;
        PairEvents::deposit(self.env, to, asset, ctx.amount);
        Ok(pending)
    }

    /// Refunds the caller's pending deposits to `to` without pricing them
    /// into the pool.
    pub fn withdraw(&mut self, ctx: &CallContext, to: &Address) -> Result<(i128, i128), PairError> {
        require_no_value(ctx)?;
        if ledger::pending_deposit(self.ledger, &ctx.sender) == DepositState::Settled {
            return Err(PairError::NoPendingDeposit);
        }

        let (amount_0, amount_1) = ledger::settle_deposit(self.ledger, self.state, &ctx.sender)?;
        if amount_0 > 0 {
            self.assets.send(&self.state.token_0, to, amount_0)?;
        }
        if amount_1 > 0 {
            self.assets.send(&self.state.token_1, to, amount_1)?;
        }
        self.update()?;

        PairEvents::withdraw(self.env, &ctx.sender, amount_0, amount_1, to);
        Ok((amount_0, amount_1))
    }

    // -----------------------------------------------------------------------
    // Liquidity
    // -----------------------------------------------------------------------

    /// Converts the caller's pending deposits into reserves and mints the
    /// matching LP shares to `to`.
    pub fn mint(&mut self, ctx: &CallContext, to: &Address) -> Result<i128, PairError> {
        require_no_value(ctx)?;
        let (amount_0, amount_1) = ledger::pending_deposit(self.ledger, &ctx.sender).amounts();
        let deposit_0 = to_unsigned(amount_0)?;
        let deposit_1 = to_unsigned(amount_1)?;

        let first_mint = self.state.total_supply == 0;
        let liquidity = if first_mint {
            let root = sqrt(deposit_0.checked_mul(deposit_1).ok_or(PairError::Overflow)?);
            i128::try_from(root).map_err(|_| PairError::Overflow)? - MINIMUM_LIQUIDITY
        } else {
            if self.state.reserve_0 == 0 || self.state.reserve_1 == 0 {
                return Err(PairError::InsufficientLiquidity);
            }
            // The smaller share wins; excess on the other side stays in the
            // pool.
            let supply = to_unsigned(self.state.total_supply)?;
            let share_0 = mul_div(self.env, deposit_0, supply, to_unsigned(self.state.reserve_0)?)
                .ok_or(PairError::Overflow)?;
            let share_1 = mul_div(self.env, deposit_1, supply, to_unsigned(self.state.reserve_1)?)
                .ok_or(PairError::Overflow)?;
            i128::try_from(math::min(share_0, share_1)).map_err(|_| PairError::Overflow)?
        };
        if liquidity <= 0 {
            return Err(PairError::InsufficientLiquidityMinted);
        }

        if first_mint {
            let pool = ctx.pool.clone();
            self.mint_shares(&pool, MINIMUM_LIQUIDITY)?;
        }
        self.mint_shares(to, liquidity)?;
        ledger::settle_deposit(self.ledger, self.state, &ctx.sender)?;
        self.update()?;
        self.state.k_last = reserve_product(self.state.reserve_0, self.state.reserve_1)?;

        PairEvents::mint(self.env, &ctx.sender, amount_0, amount_1, liquidity);
        Ok(liquidity)
    }

    /// Redeems `amount` of the caller's LP shares for a proportional slice of
    /// the settled balances, sent to `to`.
    pub fn burn(
        &mut self,
        ctx: &CallContext,
        amount: i128,
        to: &Address,
    ) -> Result<(i128, i128), PairError> {
        require_no_value(ctx)?;
        if amount < 0 {
            return Err(PairError::NegativeAmount);
        }
        if lp_token::balance(self.ledger, &ctx.sender) < amount {
            return Err(PairError::InsufficientBalance);
        }

        let (balance_0, balance_1) = self.settled_balances()?;
        // Protocol dilution is priced in before this redemption.
        let fee_liquidity = self.protocol_fee_liquidity()?;
        let supply = self
            .state
            .total_supply
            .checked_add(fee_liquidity)
            .ok_or(PairError::Overflow)?;
        if supply == 0 {
            return Err(PairError::InsufficientLiquidityBurned);
        }

        let redeem = |balance: i128| -> Result<i128, PairError> {
            let share = mul_div(
                self.env,
                to_unsigned(amount)?,
                to_unsigned(balance)?,
                to_unsigned(supply)?,
            )
            .ok_or(PairError::Overflow)?;
            i128::try_from(share).map_err(|_| PairError::Overflow)
        };
        let amount_0 = redeem(balance_0)?;
        let amount_1 = redeem(balance_1)?;
        if amount_0 <= 0 || amount_1 <= 0 {
            return Err(PairError::InsufficientLiquidityBurned);
        }

        if fee_liquidity > 0 {
            let fee_recipient = self.state.fee_recipient.clone();
            self.mint_shares(&fee_recipient, fee_liquidity)?;
        }
        self.burn_shares(&ctx.sender, amount)?;
        self.assets.send(&self.state.token_0, to, amount_0)?;
        self.assets.send(&self.state.token_1, to, amount_1)?;
        self.update()?;
        self.state.k_last = reserve_product(self.state.reserve_0, self.state.reserve_1)?;

        PairEvents::burn(self.env, &ctx.sender, amount_0, amount_1, to);
        Ok((amount_0, amount_1))
    }

    /// LP shares owed to the fee recipient for invariant growth since
    /// `k_last`: `supply * (√k - √k_last) / (5·√k + √k_last)`.
    fn protocol_fee_liquidity(&self) -> Result<i128, PairError> {
        if self.state.k_last == 0 {
            return Ok(0);
        }
        let root_k = sqrt(reserve_product(self.state.reserve_0, self.state.reserve_1)?);
        let root_k_last = sqrt(self.state.k_last);
        if root_k <= root_k_last {
            return Ok(0);
        }

        let denominator = root_k
            .checked_mul(PROTOCOL_FEE_DIVISOR)
            .and_then(|v| v.checked_add(root_k_last))
            .ok_or(PairError::Overflow)?;
        let liquidity = mul_div(
            self.env,
            to_unsigned(self.state.total_supply)?,
            root_k - root_k_last,
            denominator,
        )
        .ok_or(PairError::Overflow)?;
        i128::try_from(liquidity).map_err(|_| PairError::Overflow)
    }

    // -----------------------------------------------------------------------
    // Swap
    // -----------------------------------------------------------------------

    /// Sends the requested outputs to `to`, then prices the caller's pending
    /// deposits in as the swap input and enforces the fee-adjusted invariant.
    pub fn swap(
        &mut self,
        ctx: &CallContext,
        amount_0_out: i128,
        amount_1_out: i128,
        to: &Address,
    ) -> Result<(), PairError> {
        require_no_value(ctx)?;
        if amount_0_out < 0 || amount_1_out < 0 {
            return Err(PairError::NegativeAmount);
        }
        if amount_0_out == 0 && amount_1_out == 0 {
            return Err(PairError::InsufficientOutputAmount);
        }
        let reserves = (self.state.reserve_0, self.state.reserve_1);
        if amount_0_out >= reserves.0 || amount_1_out >= reserves.1 {
            return Err(PairError::InsufficientLiquidity);
        }
        if *to == self.state.token_0 || *to == self.state.token_1 {
            return Err(PairError::InvalidTo);
        }

        // Optimistic transfer: outputs leave before the input is checked.
        if amount_0_out > 0 {
            self.assets.send(&self.state.token_0, to, amount_0_out)?;
        }
        if amount_1_out > 0 {
            self.assets.send(&self.state.token_1, to, amount_1_out)?;
        }

        let (amount_0_in, amount_1_in) =
            ledger::pending_deposit(self.ledger, &ctx.sender).amounts();
        if amount_0_in <= 0 && amount_1_in <= 0 {
            return Err(PairError::InsufficientInputAmount);
        }
        ledger::settle_deposit(self.ledger, self.state, &ctx.sender)?;

        let balances = self.settled_balances()?;
        check_balance_ceiling(balances)?;
        check_k(self.env, balances, (amount_0_in, amount_1_in), reserves)?;
        self.update()?;

        PairEvents::swap(
            self.env,
            &ctx.sender,
            amount_0_in,
            amount_1_in,
            amount_0_out,
            amount_1_out,
            to,
        );
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Reserve maintenance
    // -----------------------------------------------------------------------

    /// Pays out to `to` whatever the pool holds beyond its reserves and
    /// pending deposits. Reserves are left as they are.
    pub fn skim(&mut self, ctx: &CallContext, to: &Address) -> Result<(i128, i128), PairError> {
        require_no_value(ctx)?;
        let excess = |asset: &Address, reserve: i128, pending: i128| -> Result<i128, PairError> {
            let tracked = reserve.checked_add(pending).ok_or(PairError::Overflow)?;
            Ok((self.assets.balance(asset) - tracked).max(0))
        };
        let amount_0 = excess(
            &self.state.token_0,
            self.state.reserve_0,
            self.state.deposit_total_0,
        )?;
        let amount_1 = excess(
            &self.state.token_1,
            self.state.reserve_1,
            self.state.deposit_total_1,
        )?;

        if amount_0 > 0 {
            self.assets.send(&self.state.token_0, to, amount_0)?;
        }
        if amount_1 > 0 {
            self.assets.send(&self.state.token_1, to, amount_1)?;
        }

        PairEvents::skim(self.env, to, amount_0, amount_1);
        Ok((amount_0, amount_1))
    }

    /// Forces reserves to match the settled balances.
    pub fn sync(&mut self, ctx: &CallContext) -> Result<(), PairError> {
        require_no_value(ctx)?;
        self.update()
    }

    /// External balance of each asset minus what is earmarked for pending
    /// depositors.
    pub fn settled_balances(&self) -> Result<(i128, i128), PairError> {
        let balance_0 = self
            .assets
            .balance(&self.state.token_0)
            .checked_sub(self.state.deposit_total_0)
            .filter(|v| *v >= 0)
            .ok_or(PairError::Overflow)?;
        let balance_1 = self
            .assets
            .balance(&self.state.token_1)
            .checked_sub(self.state.deposit_total_1)
            .filter(|v| *v >= 0)
            .ok_or(PairError::Overflow)?;
        Ok((balance_0, balance_1))
    }

    /// Rewrites the reserves from the settled balances.
    fn update(&mut self) -> Result<(), PairError> {
        let balances = self.settled_balances()?;
        check_balance_ceiling(balances)?;
        self.state.reserve_0 = balances.0;
        self.state.reserve_1 = balances.1;
        PairEvents::sync(self.env, balances.0, balances.1);
        Ok(())
    }

    // -----------------------------------------------------------------------
    // LP token surface
    // -----------------------------------------------------------------------

    pub fn transfer(&mut self, ctx: &CallContext, to: &Address, amount: i128) -> Result<bool, PairError> {
        require_no_value(ctx)?;
        lp_token::transfer(self.ledger, &ctx.sender, to, amount)?;
        TokenUtils::new(self.env)
            .events()
            .transfer(ctx.sender.clone(), to.clone(), amount);
        Ok(true)
    }

    pub fn approve(
        &mut self,
        ctx: &CallContext,
        spender: &Address,
        amount: i128,
    ) -> Result<bool, PairError> {
        require_no_value(ctx)?;
        lp_token::approve(self.ledger, &ctx.sender, spender, amount)?;
        TokenUtils::new(self.env).events().approve(
            ctx.sender.clone(),
            spender.clone(),
            amount,
            NO_EXPIRATION,
        );
        Ok(true)
    }

    /// Moves `amount` of `from`'s shares to `to` on the authority of the
    /// caller's allowance.
    pub fn transfer_from(
        &mut self,
        ctx: &CallContext,
        from: &Address,
        to: &Address,
        amount: i128,
    ) -> Result<bool, PairError> {
        require_no_value(ctx)?;
        if amount < 0 {
            return Err(PairError::NegativeAmount);
        }
        if lp_token::balance(self.ledger, from) < amount {
            return Err(PairError::InsufficientBalance);
        }
        lp_token::spend_allowance(self.ledger, from, &ctx.sender, amount)?;
        lp_token::transfer(self.ledger, from, to, amount)?;
        TokenUtils::new(self.env)
            .events()
            .transfer(from.clone(), to.clone(), amount);
        Ok(true)
    }

    fn mint_shares(&mut self, to: &Address, amount: i128) -> Result<(), PairError> {
        lp_token::mint(self.ledger, self.state, to, amount)?;
        TokenUtils::new(self.env)
            .events()
            .mint(self.env.current_contract_address(), to.clone(), amount);
        Ok(())
    }

    fn burn_shares(&mut self, from: &Address, amount: i128) -> Result<(), PairError> {
        lp_token::burn(self.ledger, self.state, from, amount)?;
        TokenUtils::new(self.env).events().burn(from.clone(), amount);
        Ok(())
    }
}

fn require_no_value(ctx: &CallContext) -> Result<(), PairError> {
    if ctx.amount != 0 {
        return Err(PairError::AmountNotZero);
    }
    Ok(())
}

fn check_balance_ceiling(balances: (i128, i128)) -> Result<(), PairError> {
    if balances.0 > MAX_BALANCE || balances.1 > MAX_BALANCE {
        return Err(PairError::TokenBalanceOverflow);
    }
    Ok(())
}
