use soroban_sdk::{contracttype, Address, Env};

pub(crate) const DAY_IN_LEDGERS: u32 = 17280; // ~1 day in 5s ledgers

const INSTANCE_LIFETIME_THRESHOLD: u32 = DAY_IN_LEDGERS;
const INSTANCE_BUMP_AMOUNT: u32 = 30 * DAY_IN_LEDGERS;
const LEDGER_LIFETIME_THRESHOLD: u32 = DAY_IN_LEDGERS;
const LEDGER_BUMP_AMOUNT: u32 = 30 * DAY_IN_LEDGERS;

/// Pool singleton. Loaded once per call, mutated in place by the engine
/// and written back only when the call succeeds.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PoolState {
    pub token_0: Address,
    pub token_1: Address,
    pub fee_recipient: Address,
    pub reserve_0: i128,
    pub reserve_1: i128,
    /// `reserve_0 * reserve_1` as of the last liquidity-supply change.
    pub k_last: u128,
    pub total_supply: i128,
    /// Sum of every caller's pending deposit of `token_0`.
    pub deposit_total_0: i128,
    /// Sum of every caller's pending deposit of `token_1`.
    pub deposit_total_1: i128,
}

impl PoolState {
    pub fn new(token_0: Address, token_1: Address, fee_recipient: Address) -> Self {
        Self {
            token_0,
            token_1,
            fee_recipient,
            reserve_0: 0,
            reserve_1: 0,
            k_last: 0,
            total_supply: 0,
            deposit_total_0: 0,
            deposit_total_1: 0,
        }
    }
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct ReentrancyGuard {
    pub locked: bool,
}

#[contracttype]
#[derive(Clone, Debug)]
pub enum DataKey {
    PoolState,
    ReentrancyGuard,
}

/// Keys of the per-address ledger maps.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum LedgerKey {
    Balance(Address),
    /// (owner, spender)
    Allowance(Address, Address),
    PendingDeposit0(Address),
    PendingDeposit1(Address),
}

/// Associative store behind the ledger maps.
///
/// Absent keys read as zero. Implementations only need key uniqueness; no
/// iteration order is relied upon.
pub trait LedgerStore {
    fn get(&self, key: &LedgerKey) -> Option<i128>;
    fn insert(&mut self, key: &LedgerKey, value: i128);
    fn remove(&mut self, key: &LedgerKey);

    fn get_or_zero(&self, key: &LedgerKey) -> i128 {
        self.get(key).unwrap_or(0)
    }

    /// Writes `value`, dropping the entry once it reaches zero.
    fn put(&mut self, key: &LedgerKey, value: i128) {
        if value == 0 {
            self.remove(key);
        } else {
            self.insert(key, value);
        }
    }
}

/// Ledger maps kept in the contract's persistent storage.
pub struct PersistentLedger {
    env: Env,
}

impl PersistentLedger {
    pub fn new(env: &Env) -> Self {
        Self { env: env.clone() }
    }
}

impl LedgerStore for PersistentLedger {
    fn get(&self, key: &LedgerKey) -> Option<i128> {
        self.env.storage().persistent().get(key)
    }

    fn insert(&mut self, key: &LedgerKey, value: i128) {
        let persistent = self.env.storage().persistent();
        persistent.set(key, &value);
        persistent.extend_ttl(key, LEDGER_LIFETIME_THRESHOLD, LEDGER_BUMP_AMOUNT);
    }

    fn remove(&mut self, key: &LedgerKey) {
        self.env.storage().persistent().remove(key);
    }
}

pub fn get_pool_state(env: &Env) -> Option<PoolState> {
    env.storage().instance().get(&DataKey::PoolState)
}

pub fn set_pool_state(env: &Env, state: &PoolState) {
    env.storage().instance().set(&DataKey::PoolState, state);
}

pub fn has_pool_state(env: &Env) -> bool {
    env.storage().instance().has(&DataKey::PoolState)
}

pub fn get_reentrancy_guard(env: &Env) -> ReentrancyGuard {
    env.storage()
        .instance()
        .get(&DataKey::ReentrancyGuard)
        .unwrap_or(ReentrancyGuard { locked: false })
}

pub fn set_reentrancy_guard(env: &Env, guard: &ReentrancyGuard) {
    env.storage().instance().set(&DataKey::ReentrancyGuard, guard);
}

/// Extend instance storage TTL to keep contract alive.
pub fn extend_instance_ttl(env: &Env) {
    env.storage()
        .instance()
        .extend_ttl(INSTANCE_LIFETIME_THRESHOLD, INSTANCE_BUMP_AMOUNT);
}
