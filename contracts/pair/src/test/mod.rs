#![cfg(test)]

// ---------------------------------------------------------------------------
// Pair test suite
//
// Structure
// ─────────
// math      : sqrt/min/max/mul_div, the fee-adjusted K check and the quote
//             helpers, with proptest properties (no contract needed)
// ledger    : deposit state machine and LP primitives over an in-memory
//             LedgerStore
// engine    : engine preconditions the contract binding cannot reach
// deposit   : deposit/withdraw through the contract client
// liquidity : mint/burn and the protocol fee
// swap      : swap preconditions and the invariant boundary
// sync      : skim and sync
// lp_token  : transfer/approve/transfer_from and metadata
// reentrancy: lock cycle and re-entry through a hostile token
// events    : PairEvents emission
// ---------------------------------------------------------------------------

mod ledger;

use soroban_sdk::{
    testutils::Address as _,
    token::{StellarAssetClient, TokenClient},
    Address, Env, String,
};

use crate::{Pair, PairClient};

/// A pair wired to two fresh Stellar asset contracts.
pub struct PairTest<'a> {
    pub env: Env,
    pub pair: PairClient<'a>,
    pub token_0: TokenClient<'a>,
    pub token_1: TokenClient<'a>,
    pub asset_0: StellarAssetClient<'a>,
    pub asset_1: StellarAssetClient<'a>,
    pub fee_recipient: Address,
}

impl<'a> PairTest<'a> {
    pub fn setup() -> Self {
        let env = Env::default();
        env.mock_all_auths();
        env.budget().reset_unlimited();

        let admin = Address::generate(&env);
        let token_0 = env.register_stellar_asset_contract_v2(admin.clone()).address();
        let token_1 = env.register_stellar_asset_contract_v2(admin).address();

        let pair_id = env.register_contract(None, Pair);
        let pair = PairClient::new(&env, &pair_id);
        let fee_recipient = Address::generate(&env);
        pair.initialize(
            &token_0,
            &token_1,
            &fee_recipient,
            &String::from_str(&env, "Tidepool LP"),
            &String::from_str(&env, "TIDE-LP"),
        );

        PairTest {
            pair,
            token_0: TokenClient::new(&env, &token_0),
            token_1: TokenClient::new(&env, &token_1),
            asset_0: StellarAssetClient::new(&env, &token_0),
            asset_1: StellarAssetClient::new(&env, &token_1),
            fee_recipient,
            env,
        }
    }

    /// A new account holding `amount_0` / `amount_1` of the pair's assets.
    pub fn funded_user(&self, amount_0: i128, amount_1: i128) -> Address {
        let user = Address::generate(&self.env);
        if amount_0 > 0 {
            self.asset_0.mint(&user, &amount_0);
        }
        if amount_1 > 0 {
            self.asset_1.mint(&user, &amount_1);
        }
        user
    }

    /// Deposits both amounts from `user`, credited to `user`.
    pub fn deposit(&self, user: &Address, amount_0: i128, amount_1: i128) {
        if amount_0 > 0 {
            self.pair
                .deposit(user, &self.token_0.address, &amount_0, user);
        }
        if amount_1 > 0 {
            self.pair
                .deposit(user, &self.token_1.address, &amount_1, user);
        }
    }

    /// Funds a new provider, deposits and mints. Returns (provider, liquidity).
    pub fn provide(&self, amount_0: i128, amount_1: i128) -> (Address, i128) {
        let provider = self.funded_user(amount_0, amount_1);
        self.deposit(&provider, amount_0, amount_1);
        let liquidity = self.pair.mint(&provider, &provider);
        (provider, liquidity)
    }

    /// Sends assets straight to the pair, bypassing `deposit`.
    pub fn donate(&self, amount_0: i128, amount_1: i128) {
        if amount_0 > 0 {
            self.asset_0.mint(&self.pair.address, &amount_0);
        }
        if amount_1 > 0 {
            self.asset_1.mint(&self.pair.address, &amount_1);
        }
    }

    /// Seeds reserves without minting any LP supply.
    pub fn seed_reserves(&self, amount_0: i128, amount_1: i128) {
        self.donate(amount_0, amount_1);
        self.pair.sync(&Address::generate(&self.env));
    }
}
