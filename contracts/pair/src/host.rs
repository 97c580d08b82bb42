//! Seams between the pair engine and the host it runs in.

use soroban_sdk::{token::TokenClient, Address, Env};

use crate::errors::PairError;

/// Facts the host supplies about the current call.
#[derive(Clone, Debug)]
pub struct CallContext {
    /// Authenticated initiator of the call.
    pub sender: Address,
    /// Where the call's attached value was sent.
    pub recipient: Address,
    /// Value attached to the call. Zero unless the call carries a deposit.
    pub amount: i128,
    /// Asset of the attached value.
    pub asset: Option<Address>,
    /// The pool's own address.
    pub pool: Address,
}

impl CallContext {
    /// Context for a call that carries no value.
    pub fn new(env: &Env, sender: Address) -> Self {
        let pool = env.current_contract_address();
        Self {
            sender,
            recipient: pool.clone(),
            amount: 0,
            asset: None,
            pool,
        }
    }

    /// Attaches a transfer of `amount` of `asset` that the host has already
    /// moved into the pool.
    pub fn with_transfer(mut self, asset: Address, amount: i128) -> Self {
        self.asset = Some(asset);
        self.amount = amount;
        self
    }
}

/// Balance oracle and transfer requester for the pool's two assets.
pub trait AssetHost {
    /// The pool's current external balance of `asset`.
    fn balance(&self, asset: &Address) -> i128;

    /// Moves `amount` of `asset` from the pool to `to`.
    fn send(&self, asset: &Address, to: &Address, amount: i128) -> Result<(), PairError>;
}

/// `AssetHost` over SEP-41 token contracts.
pub struct TokenHost {
    env: Env,
    pool: Address,
}

impl TokenHost {
    pub fn new(env: &Env) -> Self {
        Self {
            env: env.clone(),
            pool: env.current_contract_address(),
        }
    }
}

impl AssetHost for TokenHost {
    fn balance(&self, asset: &Address) -> i128 {
        TokenClient::new(&self.env, asset).balance(&self.pool)
    }

    fn send(&self, asset: &Address, to: &Address, amount: i128) -> Result<(), PairError> {
        match TokenClient::new(&self.env, asset).try_transfer(&self.pool, to, &amount) {
            Ok(Ok(())) => Ok(()),
            _ => Err(PairError::TransferFailed),
        }
    }
}
