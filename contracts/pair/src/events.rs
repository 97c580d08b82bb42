use soroban_sdk::{symbol_short, Address, Env};

pub struct PairEvents;

impl PairEvents {
    /// Emits a `deposit` event when funds are credited as pending.
    ///
    /// Topics: `("deposit", to)`
    /// Data:   `(asset, amount)`
    pub fn deposit(env: &Env, to: &Address, asset: &Address, amount: i128) {
        env.events()
            .publish((symbol_short!("deposit"), to), (asset, amount));
    }

    /// Topics: `("withdraw", sender)`
    /// Data:   `(amount_0, amount_1, to)`
    pub fn withdraw(env: &Env, sender: &Address, amount_0: i128, amount_1: i128, to: &Address) {
        env.events()
            .publish((symbol_short!("withdraw"), sender), (amount_0, amount_1, to));
    }

    /// Topics: `("mint", sender)`
    /// Data:   `(amount_0, amount_1, liquidity)`
    pub fn mint(env: &Env, sender: &Address, amount_0: i128, amount_1: i128, liquidity: i128) {
        env.events()
            .publish((symbol_short!("mint"), sender), (amount_0, amount_1, liquidity));
    }

    pub fn burn(env: &Env, sender: &Address, amount_0: i128, amount_1: i128, to: &Address) {
        env.events()
            .publish((symbol_short!("burn"), sender), (amount_0, amount_1, to));
    }

    /// Emits a `swap` event after the invariant check passes.
    ///
    /// Topics: `("swap", sender)`
    /// Data:   `(amount_0_in, amount_1_in, amount_0_out, amount_1_out, to)`
    ///
    /// Inputs are the pending deposits the swap consumed.
    pub fn swap(
        env: &Env,
        sender: &Address,
        amount_0_in: i128,
        amount_1_in: i128,
        amount_0_out: i128,
        amount_1_out: i128,
        to: &Address,
    ) {
        env.events().publish(
            (symbol_short!("swap"), sender),
            (amount_0_in, amount_1_in, amount_0_out, amount_1_out, to),
        );
    }

    pub fn sync(env: &Env, reserve_0: i128, reserve_1: i128) {
        env.events()
            .publish((symbol_short!("sync"),), (reserve_0, reserve_1));
    }

    pub fn skim(env: &Env, to: &Address, amount_0: i128, amount_1: i128) {
        env.events()
            .publish((symbol_short!("skim"), to), (amount_0, amount_1));
    }
}
