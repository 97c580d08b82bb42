//! Ledger rules over an in-memory `LedgerStore`, independent of contract
//! storage.

use soroban_sdk::{testutils::Address as _, Address, Env, Map};

use crate::{
    errors::PairError,
    ledger::{credit_deposit, pending_deposit, settle_deposit, DepositState, Side},
    lp_token::{self, INFINITE_ALLOWANCE},
    math::MAX_BALANCE,
    storage::{LedgerKey, LedgerStore, PoolState},
};

/// `LedgerStore` backed by a host map.
pub struct MapLedger {
    entries: Map<LedgerKey, i128>,
}

impl MapLedger {
    pub fn new(env: &Env) -> Self {
        Self {
            entries: Map::new(env),
        }
    }

    pub fn len(&self) -> u32 {
        self.entries.len()
    }
}

impl LedgerStore for MapLedger {
    fn get(&self, key: &LedgerKey) -> Option<i128> {
        self.entries.get(key.clone())
    }

    fn insert(&mut self, key: &LedgerKey, value: i128) {
        self.entries.set(key.clone(), value);
    }

    fn remove(&mut self, key: &LedgerKey) {
        self.entries.remove(key.clone());
    }
}

fn fresh_state(env: &Env) -> PoolState {
    PoolState::new(
        Address::generate(env),
        Address::generate(env),
        Address::generate(env),
    )
}

mod deposits {
    use super::*;

    #[test]
    fn new_address_is_settled() {
        let env = Env::default();
        let ledger = MapLedger::new(&env);
        let owner = Address::generate(&env);
        assert_eq!(pending_deposit(&ledger, &owner), DepositState::Settled);
        assert_eq!(pending_deposit(&ledger, &owner).amounts(), (0, 0));
    }

    #[test]
    fn credits_accumulate_per_side() {
        let env = Env::default();
        let mut ledger = MapLedger::new(&env);
        let mut state = fresh_state(&env);
        let owner = Address::generate(&env);

        assert_eq!(credit_deposit(&mut ledger, &mut state, Side::Token0, &owner, 100), Ok(100));
        assert_eq!(credit_deposit(&mut ledger, &mut state, Side::Token0, &owner, 50), Ok(150));
        assert_eq!(credit_deposit(&mut ledger, &mut state, Side::Token1, &owner, 7), Ok(7));

        assert_eq!(
            pending_deposit(&ledger, &owner),
            DepositState::Deposited { amount_0: 150, amount_1: 7 }
        );
        assert_eq!((state.deposit_total_0, state.deposit_total_1), (150, 7));
    }

    #[test]
    fn aggregates_span_owners() {
        let env = Env::default();
        let mut ledger = MapLedger::new(&env);
        let mut state = fresh_state(&env);
        let alice = Address::generate(&env);
        let bob = Address::generate(&env);

        credit_deposit(&mut ledger, &mut state, Side::Token0, &alice, 30).unwrap();
        credit_deposit(&mut ledger, &mut state, Side::Token0, &bob, 12).unwrap();
        assert_eq!(state.deposit_total_0, 42);

        assert_eq!(settle_deposit(&mut ledger, &mut state, &alice), Ok((30, 0)));
        assert_eq!(state.deposit_total_0, 12);
        assert_eq!(pending_deposit(&ledger, &bob).amounts(), (12, 0));
    }

    #[test]
    fn settle_removes_entries() {
        let env = Env::default();
        let mut ledger = MapLedger::new(&env);
        let mut state = fresh_state(&env);
        let owner = Address::generate(&env);

        credit_deposit(&mut ledger, &mut state, Side::Token0, &owner, 5).unwrap();
        credit_deposit(&mut ledger, &mut state, Side::Token1, &owner, 9).unwrap();
        assert_eq!(ledger.len(), 2);

        assert_eq!(settle_deposit(&mut ledger, &mut state, &owner), Ok((5, 9)));
        assert_eq!(ledger.len(), 0);
        assert_eq!(pending_deposit(&ledger, &owner), DepositState::Settled);
        assert_eq!((state.deposit_total_0, state.deposit_total_1), (0, 0));
    }

    #[test]
    fn settling_a_settled_owner_is_a_no_op() {
        let env = Env::default();
        let mut ledger = MapLedger::new(&env);
        let mut state = fresh_state(&env);
        let owner = Address::generate(&env);

        assert_eq!(settle_deposit(&mut ledger, &mut state, &owner), Ok((0, 0)));
        assert_eq!(state, fresh_state_like(&state));
    }

    fn fresh_state_like(state: &PoolState) -> PoolState {
        PoolState::new(
            state.token_0.clone(),
            state.token_1.clone(),
            state.fee_recipient.clone(),
        )
    }

    #[test]
    fn credit_past_ceiling_leaves_ledger_untouched() {
        let env = Env::default();
        let mut ledger = MapLedger::new(&env);
        let mut state = fresh_state(&env);
        let owner = Address::generate(&env);

        credit_deposit(&mut ledger, &mut state, Side::Token1, &owner, MAX_BALANCE).unwrap();
        assert_eq!(
            credit_deposit(&mut ledger, &mut state, Side::Token1, &owner, 1),
            Err(PairError::AmountOverflow)
        );
        assert_eq!(pending_deposit(&ledger, &owner).amounts(), (0, MAX_BALANCE));
        assert_eq!(state.deposit_total_1, MAX_BALANCE);
    }
}

mod shares {
    use super::*;

    #[test]
    fn mint_and_burn_move_supply_in_lockstep() {
        let env = Env::default();
        let mut ledger = MapLedger::new(&env);
        let mut state = fresh_state(&env);
        let holder = Address::generate(&env);

        lp_token::mint(&mut ledger, &mut state, &holder, 500).unwrap();
        assert_eq!(lp_token::balance(&ledger, &holder), 500);
        assert_eq!(state.total_supply, 500);

        lp_token::burn(&mut ledger, &mut state, &holder, 200).unwrap();
        assert_eq!(lp_token::balance(&ledger, &holder), 300);
        assert_eq!(state.total_supply, 300);
    }

    #[test]
    fn burn_beyond_balance_fails() {
        let env = Env::default();
        let mut ledger = MapLedger::new(&env);
        let mut state = fresh_state(&env);
        let holder = Address::generate(&env);

        lp_token::mint(&mut ledger, &mut state, &holder, 10).unwrap();
        assert_eq!(
            lp_token::burn(&mut ledger, &mut state, &holder, 11),
            Err(PairError::InsufficientBalance)
        );
        assert_eq!(state.total_supply, 10);
    }

    #[test]
    fn transfer_is_checked() {
        let env = Env::default();
        let mut ledger = MapLedger::new(&env);
        let mut state = fresh_state(&env);
        let alice = Address::generate(&env);
        let bob = Address::generate(&env);

        lp_token::mint(&mut ledger, &mut state, &alice, 100).unwrap();
        lp_token::transfer(&mut ledger, &alice, &bob, 40).unwrap();
        assert_eq!(lp_token::balance(&ledger, &alice), 60);
        assert_eq!(lp_token::balance(&ledger, &bob), 40);

        assert_eq!(
            lp_token::transfer(&mut ledger, &bob, &alice, 41),
            Err(PairError::InsufficientBalance)
        );
        assert_eq!(
            lp_token::transfer(&mut ledger, &bob, &alice, -1),
            Err(PairError::NegativeAmount)
        );
    }

    #[test]
    fn self_transfer_keeps_balance() {
        let env = Env::default();
        let mut ledger = MapLedger::new(&env);
        let mut state = fresh_state(&env);
        let alice = Address::generate(&env);

        lp_token::mint(&mut ledger, &mut state, &alice, 100).unwrap();
        lp_token::transfer(&mut ledger, &alice, &alice, 100).unwrap();
        assert_eq!(lp_token::balance(&ledger, &alice), 100);
    }

    #[test]
    fn allowance_is_spent_unless_infinite() {
        let env = Env::default();
        let mut ledger = MapLedger::new(&env);
        let owner = Address::generate(&env);
        let spender = Address::generate(&env);

        lp_token::approve(&mut ledger, &owner, &spender, 50).unwrap();
        lp_token::spend_allowance(&mut ledger, &owner, &spender, 20).unwrap();
        assert_eq!(lp_token::allowance(&ledger, &owner, &spender), 30);
        assert_eq!(
            lp_token::spend_allowance(&mut ledger, &owner, &spender, 31),
            Err(PairError::InsufficientAllowance)
        );

        lp_token::approve(&mut ledger, &owner, &spender, INFINITE_ALLOWANCE).unwrap();
        lp_token::spend_allowance(&mut ledger, &owner, &spender, 1_000_000).unwrap();
        assert_eq!(lp_token::allowance(&ledger, &owner, &spender), INFINITE_ALLOWANCE);
    }

    #[test]
    fn zero_allowance_drops_the_entry() {
        let env = Env::default();
        let mut ledger = MapLedger::new(&env);
        let owner = Address::generate(&env);
        let spender = Address::generate(&env);

        lp_token::approve(&mut ledger, &owner, &spender, 5).unwrap();
        assert_eq!(ledger.len(), 1);
        lp_token::approve(&mut ledger, &owner, &spender, 0).unwrap();
        assert_eq!(ledger.len(), 0);
    }
}
