//! Exact integer arithmetic for reserve and share accounting.
//!
//! There is no fractional representation anywhere in the pair: every
//! division floors, and products that can outgrow `u128` are carried in the
//! host's 256-bit integer.

use soroban_sdk::{Env, U256};

use crate::errors::PairError;

/// Minimum liquidity locked forever on the first mint.
pub const MINIMUM_LIQUIDITY: i128 = 1_000;
/// Ceiling for reserves, pending-deposit totals and single deposits.
pub const MAX_BALANCE: i128 = u64::MAX as i128;
/// Widest amount the token interface can carry. Doubles as the
/// "infinite" allowance sentinel.
pub const MAX_NATIVE_BALANCE: i128 = i128::MAX;

/// Swap fee is `FEE_NUMERATOR / FEE_DENOMINATOR` of the input amount (0.3%).
pub const FEE_NUMERATOR: u128 = 3;
pub const FEE_DENOMINATOR: u128 = 1_000;
/// The protocol receives `1 / (PROTOCOL_FEE_DIVISOR + 1)` of invariant growth.
pub const PROTOCOL_FEE_DIVISOR: u128 = 5;

/// Babylonian refinement rounds. Seven rounds from the range-check estimate
/// below reach the floor root for every 128-bit input.
const SQRT_ROUNDS: u32 = 7;

/// Floor square root of `x`.
///
/// The estimate halves the remaining bit width at each threshold, so the
/// starting root is within a small constant factor of the answer before the
/// fixed Newton rounds run.
pub fn sqrt(x: u128) -> u128 {
    if x == 0 {
        return 0;
    }

    let mut xx = x;
    let mut r: u128 = 1;
    if xx >= 1 << 64 {
        xx >>= 64;
        r <<= 32;
    }
    if xx >= 1 << 32 {
        xx >>= 32;
        r <<= 16;
    }
    if xx >= 1 << 16 {
        xx >>= 16;
        r <<= 8;
    }
    if xx >= 1 << 8 {
        xx >>= 8;
        r <<= 4;
    }
    if xx >= 1 << 4 {
        xx >>= 4;
        r <<= 2;
    }
    if xx >= 1 << 3 {
        r <<= 1;
    }

    for _ in 0..SQRT_ROUNDS {
        r = (r + x / r) >> 1;
    }

    // The last round can land one above the floor.
    min(r, x / r)
}

pub fn min(a: u128, b: u128) -> u128 {
    if a < b {
        a
    } else {
        b
    }
}

#[allow(dead_code)]
pub fn max(a: u128, b: u128) -> u128 {
    if a > b {
        a
    } else {
        b
    }
}

/// `floor(a * b / denominator)` with a 256-bit intermediate.
///
/// Returns `None` on a zero denominator or when the quotient does not fit
/// in `u128`.
pub fn mul_div(env: &Env, a: u128, b: u128, denominator: u128) -> Option<u128> {
    if denominator == 0 {
        return None;
    }
    U256::from_u128(env, a)
        .mul(&U256::from_u128(env, b))
        .div(&U256::from_u128(env, denominator))
        .to_u128()
}

/// Converts a ledger amount into the unsigned domain used for products.
pub fn to_unsigned(amount: i128) -> Result<u128, PairError> {
    u128::try_from(amount).map_err(|_| PairError::NegativeAmount)
}

/// Product of two reserves. Cannot overflow while both sit under
/// `MAX_BALANCE`.
pub fn reserve_product(reserve_0: i128, reserve_1: i128) -> Result<u128, PairError> {
    to_unsigned(reserve_0)?
        .checked_mul(to_unsigned(reserve_1)?)
        .ok_or(PairError::Overflow)
}

/// Fee-adjusted constant-product check for a swap.
///
/// Each post-swap balance is scaled by `FEE_DENOMINATOR` and charged
/// `FEE_NUMERATOR` times the input consumed on that side. The product of
/// the adjusted balances must not fall below the pre-swap reserve product
/// scaled by `FEE_DENOMINATOR^2`.
pub fn check_k(
    env: &Env,
    balances: (i128, i128),
    amounts_in: (i128, i128),
    reserves: (i128, i128),
) -> Result<(), PairError> {
    let adjusted = |balance: i128, amount_in: i128| -> Result<u128, PairError> {
        let scaled = to_unsigned(balance)?
            .checked_mul(FEE_DENOMINATOR)
            .ok_or(PairError::Overflow)?;
        let fee = to_unsigned(amount_in)?
            .checked_mul(FEE_NUMERATOR)
            .ok_or(PairError::Overflow)?;
        scaled.checked_sub(fee).ok_or(PairError::InvalidK)
    };

    let adjusted_0 = adjusted(balances.0, amounts_in.0)?;
    let adjusted_1 = adjusted(balances.1, amounts_in.1)?;

    let lhs = U256::from_u128(env, adjusted_0).mul(&U256::from_u128(env, adjusted_1));
    let rhs = U256::from_u128(env, reserve_product(reserves.0, reserves.1)?)
        .mul(&U256::from_u128(env, FEE_DENOMINATOR * FEE_DENOMINATOR));

    if lhs < rhs {
        return Err(PairError::InvalidK);
    }
    Ok(())
}

/// Output received for an exact input after the 0.3% fee.
///
/// amount_out = amount_in * 997 * reserve_out / (reserve_in * 1000 + amount_in * 997)
pub fn get_amount_out(
    amount_in: i128,
    reserve_in: i128,
    reserve_out: i128,
) -> Result<i128, PairError> {
    if amount_in <= 0 {
        return Err(PairError::InsufficientInputAmount);
    }
    if reserve_in <= 0 || reserve_out <= 0 {
        return Err(PairError::InsufficientLiquidity);
    }

    let amount_in_with_fee = to_unsigned(amount_in)?
        .checked_mul(FEE_DENOMINATOR - FEE_NUMERATOR)
        .ok_or(PairError::Overflow)?;
    let numerator = amount_in_with_fee
        .checked_mul(to_unsigned(reserve_out)?)
        .ok_or(PairError::Overflow)?;
    let denominator = to_unsigned(reserve_in)?
        .checked_mul(FEE_DENOMINATOR)
        .ok_or(PairError::Overflow)?
        .checked_add(amount_in_with_fee)
        .ok_or(PairError::Overflow)?;

    let amount_out = numerator / denominator;
    if amount_out == 0 {
        return Err(PairError::InsufficientOutputAmount);
    }
    i128::try_from(amount_out).map_err(|_| PairError::Overflow)
}

/// Input required for an exact output after the 0.3% fee, rounded up.
///
/// amount_in = reserve_in * amount_out * 1000 / ((reserve_out - amount_out) * 997) + 1
pub fn get_amount_in(
    amount_out: i128,
    reserve_in: i128,
    reserve_out: i128,
) -> Result<i128, PairError> {
    if amount_out <= 0 {
        return Err(PairError::InsufficientOutputAmount);
    }
    if reserve_in <= 0 || reserve_out <= amount_out {
        return Err(PairError::InsufficientLiquidity);
    }

    let numerator = to_unsigned(reserve_in)?
        .checked_mul(to_unsigned(amount_out)?)
        .ok_or(PairError::Overflow)?
        .checked_mul(FEE_DENOMINATOR)
        .ok_or(PairError::Overflow)?;
    let denominator = to_unsigned(reserve_out - amount_out)?
        .checked_mul(FEE_DENOMINATOR - FEE_NUMERATOR)
        .ok_or(PairError::Overflow)?;

    let amount_in = (numerator / denominator)
        .checked_add(1)
        .ok_or(PairError::Overflow)?;
    i128::try_from(amount_in).map_err(|_| PairError::Overflow)
}
